//! Mapping catalog for the HealthPro work-queue export.
//!
//! The catalog is data: an ordered list of one-to-one rules, plus the sample
//! groups whose HealthPro column is fed by one of several aliased API fields.
//! Target names and codec assignments must match HealthPro's export exactly.

use std::collections::HashSet;

use aou_model::{PARTICIPANT_ID_FIELD, PMI_ID_COLUMN};

use crate::codec::Codec;
use crate::error::CatalogError;

/// Derived column holding the saliva order status.
pub const SALIVA_ORDER_STATUS: &str = "Saliva Sample Order Status";

/// Derived column holding the consent cohort label.
pub const CONSENT_COHORT: &str = "Consent Cohort";

/// Derived column holding the retention date.
pub const ACTIVE_RETENTION_DATE: &str = "Active Retention Date";

/// Columns filled by the mapper outside the rule tables, in output order.
pub const DERIVED_COLUMNS: &[&str] = &[SALIVA_ORDER_STATUS, CONSENT_COHORT];

/// One target column read from one source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub target: &'static str,
    pub source: &'static str,
    pub codec: Codec,
}

const fn rule(target: &'static str, source: &'static str, codec: Codec) -> FieldRule {
    FieldRule {
        target,
        source,
        codec,
    }
}

/// A status/date column pair fed by aliased sample fields.
///
/// `sources` lists `(status field, time field)` pairs in decreasing
/// precedence; the first pair whose status is `RECEIVED` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGroup {
    pub status_target: &'static str,
    pub time_target: &'static str,
    pub sources: &'static [(&'static str, &'static str)],
}

pub const HEALTHPRO_RULES: &[FieldRule] = &[
    rule(PMI_ID_COLUMN, PARTICIPANT_ID_FIELD, Codec::Raw),
    rule("Biobank ID", "biobankId", Codec::Raw),
    rule("Last Name", "lastName", Codec::Raw),
    rule("First Name", "firstName", Codec::Raw),
    rule("Date of Birth", "dateOfBirth", Codec::Date),
    rule("Language", "language", Codec::Codebook),
    rule("Language of General Consent", "primaryLanguage", Codec::Language),

    // Enrollment, consent and withdrawal
    rule("Participant Status", "enrollmentStatus", Codec::Codebook),
    rule("General Consent Status", "consentForStudyEnrollment", Codec::Status),
    rule("General Consent Date", "consentForStudyEnrollmentAuthored", Codec::DateTime),
    rule("EHR Consent Status", "consentForElectronicHealthRecords", Codec::Status),
    rule("EHR Consent Date", "consentForElectronicHealthRecordsAuthored", Codec::DateTime),
    rule("CABoR Consent Status", "consentForCABoR", Codec::Status),
    rule("CABoR Consent Date", "consentForCABoRTime", Codec::DateTime),
    rule("Withdrawal Status", "withdrawalStatus", Codec::Withdrawal),
    rule("Withdrawal Reason", "withdrawalReason", Codec::Codebook),
    rule("Withdrawal Date", "withdrawalTime", Codec::DateTime),

    // Contact and demographics
    rule("Street Address", "streetAddress", Codec::Basic),
    rule("Street Address2", "streetAddress2", Codec::Basic),
    rule("City", "city", Codec::Basic),
    rule("State", "state", Codec::State),
    rule("ZIP", "zipCode", Codec::Basic),
    rule("Email", "email", Codec::Basic),
    rule("Phone", "phoneNumber", Codec::Basic),
    rule("Sex", "sex", Codec::Codebook),
    rule("Gender Identity", "genderIdentity", Codec::Codebook),
    rule("Race/Ethnicity", "race", Codec::Codebook),
    rule("Education", "education", Codec::Codebook),

    // Baseline surveys
    rule("Required PPI Surveys Complete", "numCompletedBaselinePPIModules", Codec::RequiredSurveysCompleted),
    rule("Completed Surveys", "numCompletedPPIModules", Codec::CountOrZero),
    rule("Basics PPI Survey Complete", "questionnaireOnTheBasics", Codec::Status),
    rule("Basics PPI Survey Completion Date", "questionnaireOnTheBasicsTime", Codec::DateTime),
    rule("Health PPI Survey Complete", "questionnaireOnOverallHealth", Codec::Status),
    rule("Health PPI Survey Completion Date", "questionnaireOnOverallHealthTime", Codec::DateTime),
    rule("Lifestyle PPI Survey Complete", "questionnaireOnLifestyle", Codec::Status),
    rule("Lifestyle PPI Survey Completion Date", "questionnaireOnLifestyleTime", Codec::DateTime),
    rule("Hist PPI Survey Complete", "questionnaireOnMedicalHistory", Codec::Status),
    rule("Hist PPI Survey Completion Date", "questionnaireOnMedicalHistoryTime", Codec::DateTime),
    rule("Meds PPI Survey Complete", "questionnaireOnMedications", Codec::Status),
    rule("Meds PPI Survey Completion Date", "questionnaireOnMedicationsTime", Codec::DateTime),
    rule("Family PPI Survey Complete", "questionnaireOnFamilyHealth", Codec::Status),
    rule("Family PPI Survey Completion Date", "questionnaireOnFamilyHealthTime", Codec::DateTime),
    rule("Access PPI Survey Complete", "questionnaireOnHealthcareAccess", Codec::Status),
    rule("Access PPI Survey Completion Date", "questionnaireOnHealthcareAccessTime", Codec::DateTime),

    // Physical measurements and pairing
    rule("Physical Measurements Status", "physicalMeasurementsStatus", Codec::Completed),
    rule("Physical Measurements Completion Date", "physicalMeasurementsFinalizedTime", Codec::DateTime),
    rule("Physical Measurements Site", "physicalMeasurementsFinalizedSite", Codec::Site),
    rule("Paired Site", "site", Codec::Site),
    rule("Paired Organization", "organization", Codec::Raw),
    rule("Samples for DNA Received", "samplesToIsolateDNA", Codec::Received),
    rule("Biospecimens", "numBaselineSamplesArrived", Codec::CountOrZero),

    // Biospecimens with a single source field; see HEALTHPRO_SAMPLE_GROUPS for the aliased ones
    rule("4 mL Na-Hep Collected", "sampleStatus1HEP4", Codec::Received),
    rule("4 mL Na-Hep Collection Date", "sampleStatus1HEP4Time", Codec::DateTime),
    rule("4 mL EDTA Collected", "sampleStatus1ED04", Codec::Received),
    rule("4 mL EDTA Collection Date", "sampleStatus1ED04Time", Codec::DateTime),
    rule("1st 10 mL EDTA Collected", "sampleStatus1ED10", Codec::Received),
    rule("1st 10 mL EDTA Collection Date", "sampleStatus1ED10Time", Codec::DateTime),
    rule("2nd 10 mL EDTA Collected", "sampleStatus2ED10", Codec::Received),
    rule("2nd 10 mL EDTA Collection Date", "sampleStatus2ED10Time", Codec::DateTime),
    rule("Urine 10 mL Collected", "sampleStatus1UR10", Codec::Received),
    rule("Urine 10 mL Collection Date", "sampleStatus1UR10Time", Codec::DateTime),
    rule("Biospecimens Site", "biospecimenSourceSite", Codec::Site),
    rule("2 mL EDTA Collected", "sampleStatus1ED02", Codec::Received),
    rule("2 mL EDTA Collection Date", "sampleStatus1ED02Time", Codec::DateTime),
    rule("Cell-Free DNA Collected", "sampleStatus1CFD9", Codec::Received),
    rule("Cell-Free DNA Collection Date", "sampleStatus1CFD9Time", Codec::DateTime),
    rule("Paxgene RNA Collected", "sampleStatus1PXR2", Codec::Received),
    rule("Paxgene RNA Collection Date", "sampleStatus1PXR2Time", Codec::DateTime),
    rule("Urine 90 mL Collected", "sampleStatus1UR90", Codec::Received),
    rule("Urine 90 mL Collection Date", "sampleStatus1UR90Time", Codec::DateTime),

    // Direct volunteer EHR sharing
    rule("DV-only EHR Sharing Status", "consentForDvElectronicHealthRecordsSharing", Codec::Status),
    rule("DV-only EHR Sharing Date", "consentForDvElectronicHealthRecordsSharingTime", Codec::DateTime),
    rule("Login Phone", "loginPhoneNumber", Codec::Basic),

    // Core participant and ordered samples
    rule("Core Participant Date", "enrollmentStatusCoreStoredSampleTime", Codec::DateTime),
    rule("enrollmentStatusCoreOrderedSampleTime", "enrollmentStatusCoreOrderedSampleTime", Codec::DateTime),
    rule("Biospecimen Status", "biospecimenStatus", Codec::Basic),
    rule("4 mL EDTA Sample Order Status", "sampleOrderStatus1ED04", Codec::Basic),
    rule("gRoR Consent Status", "consentForGenomicsROR", Codec::Status),
    rule("gRoR Consent Date", "consentForGenomicsRORAuthored", Codec::DateTime),

    // COPE surveys
    rule("COPE May PPI Survey Complete", "questionnaireOnCopeMay", Codec::Status),
    rule("COPE May PPI Survey Completion Date", "questionnaireOnCopeMayAuthored", Codec::DateTime),
    rule("COPE June PPI Survey Complete", "questionnaireOnCopeJune", Codec::Status),
    rule("COPE June PPI Survey Completion Date", "questionnaireOnCopeJuneAuthored", Codec::DateTime),
    rule("COPE July PPI Survey Complete", "questionnaireOnCopeJuly", Codec::Status),
    rule("COPE July PPI Survey Completion Date", "questionnaireOnCopeJulyAuthored", Codec::DateTime),
    rule("income", "income", Codec::Basic),
    rule("retentionEligibleStatus", "retentionEligibleStatus", Codec::Basic),

    // Retention
    rule("Retention Status", "retentionType", Codec::RetentionStatus),
    rule("COPE Nov PPI Survey Complete", "questionnaireOnCopeNov", Codec::Status),
    rule("COPE Nov PPI Survey Completion Date", "questionnaireOnCopeNovAuthored", Codec::DateTime),
    rule("COPE Dec PPI Survey Complete", "questionnaireOnCopeDec", Codec::Status),
    rule("COPE Dec PPI Survey Completion Date", "questionnaireOnCopeDecAuthored", Codec::DateTime),

    // First affirmative consents
    rule("Date of First Primary Consent", "consentForStudyEnrollmentFirstYesAuthored", Codec::DateTime),
    rule("Date of First EHR Consent", "consentForElectronicHealthRecordsFirstYesAuthored", Codec::DateTime),
    rule("COPE Feb PPI Survey Complete", "questionnaireOnCopeFeb", Codec::Status),
    rule("COPE Feb PPI Survey Completion Date", "questionnaireOnCopeFebAuthored", Codec::DateTime),

    // Lab fields carried through under their API names
    rule("biospecimenCollectedSite", "biospecimenCollectedSite", Codec::Basic),
    rule("biospecimenSourceSite", "biospecimenSourceSite", Codec::Basic),
    rule("enrollmentSite", "enrollmentSite", Codec::Basic),
    rule("numBaselineSamplesArrived", "numBaselineSamplesArrived", Codec::Basic),
    rule("participantId", "participantId", Codec::Basic),
    rule("physicalMeasurementsFinalizedSite", "physicalMeasurementsFinalizedSite", Codec::Basic),
    rule("sampleStatus1CFD9", "sampleStatus1CFD9", Codec::Basic),
    rule("sampleStatus1CFD9Time", "sampleStatus1CFD9Time", Codec::Basic),
    rule("sampleStatus1ED02", "sampleStatus1ED02", Codec::Basic),
    rule("sampleStatus1ED04", "sampleStatus1ED04", Codec::Basic),
    rule("sampleStatus1ED04Time", "sampleStatus1ED04Time", Codec::Basic),
    rule("sampleStatus1ED10", "sampleStatus1ED10", Codec::Basic),
    rule("sampleStatus1ED10Time", "sampleStatus1ED10Time", Codec::Basic),
    rule("sampleStatus1HEP4", "sampleStatus1HEP4", Codec::Basic),
    rule("sampleStatus1HEP4Time", "sampleStatus1HEP4Time", Codec::Basic),
    rule("sampleStatus1PS08", "sampleStatus1PS08", Codec::Basic),
    rule("sampleStatus1PST8", "sampleStatus1PST8", Codec::Basic),
    rule("sampleStatus1PST8Time", "sampleStatus1PST8Time", Codec::Basic),
    rule("sampleStatus1PXR2", "sampleStatus1PXR2", Codec::Basic),
    rule("sampleStatus1PXR2Time", "sampleStatus1PXR2Time", Codec::Basic),
    rule("sampleStatus1SAL", "sampleStatus1SAL", Codec::Basic),
    rule("sampleStatus1SAL2", "sampleStatus1SAL2", Codec::Basic),
    rule("sampleStatus1SAL2Time", "sampleStatus1SAL2Time", Codec::Basic),
    rule("sampleStatus1SALTime", "sampleStatus1SALTime", Codec::Basic),
    rule("sampleStatus1SS08", "sampleStatus1SS08", Codec::Basic),
    rule("sampleStatus1SST8", "sampleStatus1SST8", Codec::Basic),
    rule("sampleStatus1SST8Time", "sampleStatus1SST8Time", Codec::Basic),
    rule("sampleStatus1UR10", "sampleStatus1UR10", Codec::Basic),
    rule("sampleStatus1UR10Time", "sampleStatus1UR10Time", Codec::Basic),
    rule("sampleStatus1UR90", "sampleStatus1UR90", Codec::Basic),
    rule("sampleStatus2ED10", "sampleStatus2ED10", Codec::Basic),
    rule("sampleStatus2ED10Time", "sampleStatus2ED10Time", Codec::Basic),
    rule("sampleStatus2PST8", "sampleStatus2PST8", Codec::Basic),
    rule("sampleStatus2SST8", "sampleStatus2SST8", Codec::Basic),
    rule("sampleStatusDV1SAL2", "sampleStatusDV1SAL2", Codec::Basic),
    rule("samplesToIsolateDNA", "samplesToIsolateDNA", Codec::Basic),
    rule("site", "site", Codec::Basic),

    // Vaccine minute surveys
    rule("Summer Meeting Survey Complete", "questionnaireOnCopeVaccineMinute1", Codec::Status),
    rule("Summer Meeting Survey Complete Date", "questionnaireOnCopeVaccineMinute1Authored", Codec::DateTime),
    rule("Fall Meeting Survey Complete", "questionnaireOnCopeVaccineMinute2", Codec::Status),
    rule("Fall Meeting Survey Complete Date", "questionnaireOnCopeVaccineMinute2Authored", Codec::DateTime),

    // Later surveys, digital health and clinic measurements
    rule("Personal & Family Hx PPI Survey Complete", "questionnaireOnPersonalAndFamilyHealthHistory", Codec::Status),
    rule("Personal & Family Hx PPI Survey Completion Date", "questionnaireOnPersonalAndFamilyHealthHistoryAuthored", Codec::DateTime),
    rule("SDOH PPI Survey Complete", "questionnaireOnSocialDeterminantsOfHealth", Codec::Status),
    rule("SDOH PPI Survey Completion Date", "questionnaireOnSocialDeterminantsOfHealthAuthored", Codec::DateTime),
    rule("Winter Minute PPI Survey Complete", "questionnaireOnCopeVaccineMinute3", Codec::Status),
    rule("Winter Minute PPI Survey Completion Date", "questionnaireOnCopeVaccineMinute3Authored", Codec::DateTime),
    rule("Digital Health Consent", "digitalHealthSharingStatus", Codec::IntoString),
    rule("New Year Minute PPI Survey Complete", "questionnaireOnCopeVaccineMinute4", Codec::Status),
    rule("New Year Minute PPI Survey Completion Date", "questionnaireOnCopeVaccineMinute4Authored", Codec::DateTime),
    rule("Enrollment Site", "enrollmentSite", Codec::IntoString),
    rule("Physical Measurements Collection Type", "physicalMeasurementsCollectType", Codec::IntoString),
    rule("ID Verification Date", "onSiteIdVerificationTime", Codec::DateTime),
    rule("Incentive Date", "participantIncentives", Codec::DateTime),
    rule("Remote Physical Measurements Status", "selfReportedPhysicalMeasurementsStatus", Codec::IntoString),
    rule("Remote Physical Measurements Completion Date", "selfReportedPhysicalMeasurementsAuthored", Codec::DateTime),
    rule("Clinic Physical Measurements Status", "clinicPhysicalMeasurementsStatus", Codec::IntoString),
    rule("Clinic Physical Measurements Completion Date", "clinicPhysicalMeasurementsFinalizedTime", Codec::DateTime),
    rule("Clinic Physical Measurements Site", "clinicPhysicalMeasurementsFinalizedSite", Codec::IntoString),
    rule("Clinic Physical Measurements Date", "clinicPhysicalMeasurementsTime", Codec::DateTime),
    rule("Clinic Physical Measurements Creation Site", "clinicPhysicalMeasurementsCreatedSite", Codec::IntoString),
    rule("Date of Primary Re-Consent", "reconsentForStudyEnrollmentAuthored", Codec::DateTime),
    rule("Date of EHR Re-Consent", "reconsentForElectronicHealthRecordsAuthored", Codec::DateTime),
];

pub const HEALTHPRO_SAMPLE_GROUPS: &[SampleGroup] = &[
    SampleGroup {
        status_target: "8 mL SST Collected",
        time_target: "8 mL SST Collection Date",
        sources: &[
            ("sampleStatus2SST8", "sampleStatus2SST8Time"),
            ("sampleStatus1SS08", "sampleStatus1SS08Time"),
            ("sampleStatus1SST8", "sampleStatus1SST8Time"),
        ],
    },
    SampleGroup {
        status_target: "8 mL PST Collected",
        time_target: "8 mL PST Collection Date",
        sources: &[
            ("sampleStatus2PST8", "sampleStatus2PST8Time"),
            ("sampleStatus1PS08", "sampleStatus1PS08Time"),
            ("sampleStatus1PST8", "sampleStatus1PST8Time"),
        ],
    },
    SampleGroup {
        status_target: "Saliva Collected",
        time_target: "Saliva Collection Date",
        sources: &[
            ("sampleStatus1SAL2", "sampleStatus1SAL2Time"),
            ("sampleStatus1SAL", "sampleStatus1SALTime"),
        ],
    },
];

static HEALTHPRO: Catalog = Catalog::new(HEALTHPRO_RULES, HEALTHPRO_SAMPLE_GROUPS);

/// A complete set of mapping rules.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    rules: &'static [FieldRule],
    groups: &'static [SampleGroup],
}

impl Catalog {
    pub const fn new(rules: &'static [FieldRule], groups: &'static [SampleGroup]) -> Self {
        Self { rules, groups }
    }

    /// The HealthPro work-queue catalog.
    pub fn healthpro() -> &'static Catalog {
        &HEALTHPRO
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        self.rules
    }

    pub fn groups(&self) -> &'static [SampleGroup] {
        self.groups
    }

    /// Columns produced by the mapper, in output order.
    pub fn mapped_columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(self.rules.len() + self.groups.len() * 2 + 2);
        columns.extend(self.rules.iter().map(|rule| rule.target));
        for group in self.groups {
            columns.push(group.status_target);
            columns.push(group.time_target);
        }
        columns.extend_from_slice(DERIVED_COLUMNS);
        columns
    }

    /// Every column of a finished output record, retention date last.
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut columns = self.mapped_columns();
        columns.push(ACTIVE_RETENTION_DATE);
        columns
    }

    /// Checks target uniqueness and that every sample group has sources.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(group) = self.groups.iter().find(|group| group.sources.is_empty()) {
            return Err(CatalogError::EmptyGroup {
                column: group.status_target.to_string(),
            });
        }
        let mut seen = HashSet::new();
        for column in self.output_columns() {
            if !seen.insert(column) {
                return Err(CatalogError::DuplicateTarget {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
