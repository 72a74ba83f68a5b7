//! End-to-end tests for the transformation pipeline.

use aou_model::{RawRecord, UNSET};
use aou_transform::{
    ACTIVE_RETENTION_DATE, Catalog, Codec, RetentionPolicy, TransformError, Transformer,
};
use chrono::NaiveDate;
use proptest::prelude::*;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn transformer() -> Transformer<'static> {
    Transformer::new(Catalog::healthpro(), RetentionPolicy::current(), as_of())
        .expect("valid catalog")
}

fn participant(id: &str) -> RawRecord {
    RawRecord::new()
        .with("participantId", id)
        .with("retentionEligibleStatus", "ELIGIBLE")
        .with("consentCohort", "COHORT_2")
        .with("cohort2PilotFlag", UNSET)
        .with("questionnaireOnTheBasics", "SUBMITTED")
        .with("questionnaireOnTheBasicsTime", "2023-11-20T15:00:00Z")
        .with("questionnaireOnFamilyHealth", "SUBMITTED")
        .with("questionnaireOnFamilyHealthTime", "2023-05-02T16:45:00Z")
        .with("questionnaireOnCopeJuly", "SUBMITTED")
        .with("questionnaireOnCopeJulyAuthored", "2020-07-20T12:00:00Z")
}

#[test]
fn attaches_retention_date_last() {
    let record = transformer().transform(&participant("P1")).expect("transform");

    let columns: Vec<&str> = record.columns().collect();
    assert_eq!(columns, Catalog::healthpro().output_columns());
    assert_eq!(columns.last(), Some(&ACTIVE_RETENTION_DATE));
    assert_eq!(record.get("Consent Cohort"), Some("Cohort 2"));
    assert_eq!(record.get("Family PPI Survey Completion Date"), Some("05/02/2023 12:45 PM"));
    // COPE July is outside the window; Basics is not a retention candidate.
    assert_eq!(record.get(ACTIVE_RETENTION_DATE), Some("2023-05-02"));
}

#[test]
fn evening_timestamps_use_the_eastern_day() {
    let raw = participant("P1")
        .with("questionnaireOnFamilyHealthTime", "2023-05-03T02:30:00Z");
    let record = transformer().transform(&raw).expect("transform");
    assert_eq!(record.get("Family PPI Survey Completion Date"), Some("05/02/2023 10:30 PM"));
    assert_eq!(record.get(ACTIVE_RETENTION_DATE), Some("2023-05-02"));
}

#[test]
fn transform_all_preserves_order() {
    let records = vec![participant("P1"), RawRecord::new(), participant("P3")];
    let rows = transformer().transform_all(&records).expect("transform all");

    let ids: Vec<_> = rows.iter().map(|row| row.get("PMI ID").unwrap()).collect();
    assert_eq!(ids, vec!["P1", "", "P3"]);
    assert_eq!(rows[1].get(ACTIVE_RETENTION_DATE), Some(""));
}

#[test]
fn transform_all_reports_failing_record() {
    let records = vec![
        participant("P1"),
        participant("P2").with("dateOfBirth", "31/12/1970"),
    ];
    let err = transformer().transform_all(&records).unwrap_err();
    match err {
        TransformError::Record {
            index,
            participant,
            source,
        } => {
            assert_eq!(index, 1);
            assert_eq!(participant, "P2");
            assert!(matches!(*source, TransformError::Field { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn baseline_policy_is_selectable() {
    let transformer =
        Transformer::new(Catalog::healthpro(), RetentionPolicy::baseline(), as_of()).unwrap();
    let raw = participant("P1")
        .with("questionnaireOnCopeNov", "SUBMITTED")
        .with("questionnaireOnCopeNovAuthored", "2023-01-10T15:00:00Z");
    let record = transformer.transform(&raw).expect("transform");
    assert_eq!(record.get(ACTIVE_RETENTION_DATE), Some("2023-05-02"));
}

const TOKENS: &[&str] = &[
    UNSET,
    "",
    "SUBMITTED",
    "SUBMITTED_NOT_SURE",
    "SUBMITTED_NO_CONSENT",
    "COMPLETED",
    "RECEIVED",
    "NO_USE",
    "ELIGIBLE",
    "COHORT_1",
    "COHORT_2",
    "COHORT_2_PILOT",
    "hpo-site-columbia",
    "PIIState_NY",
    "en",
    "MEMBER",
    "ACTIVE",
    "3",
];

const TIMESTAMPS: &[&str] = &[
    "",
    "2023-05-02T16:45:00Z",
    "2022-12-31T23:59:59",
    "2024-02-29 08:00:00",
    "1999-01-01",
];

/// Source fields whose codecs accept any token, and those expecting dates.
fn source_fields() -> (Vec<&'static str>, Vec<&'static str>) {
    let catalog = Catalog::healthpro();
    let mut plain = Vec::new();
    let mut dated = Vec::new();
    for rule in catalog.rules() {
        match rule.codec {
            Codec::Date | Codec::DateTime => dated.push(rule.source),
            _ => plain.push(rule.source),
        }
    }
    for group in catalog.groups() {
        for &(status, time) in group.sources {
            plain.push(status);
            dated.push(time);
        }
    }
    plain.extend(["sampleOrderStatus1SAL", "sampleOrderStatus1SAL2", "cohort2PilotFlag"]);
    // Some time fields also feed a raw column; they only ever hold timestamps.
    plain.retain(|field| !dated.contains(field));
    (plain, dated)
}

fn raw_record() -> impl Strategy<Value = RawRecord> {
    let (plain, dated) = source_fields();
    let plain = prop::collection::btree_map(
        prop::sample::select(plain),
        prop::sample::select(TOKENS),
        0..40,
    );
    let dated = prop::collection::btree_map(
        prop::sample::select(dated),
        prop::sample::select(TIMESTAMPS),
        0..20,
    );
    (plain, dated).prop_map(|(plain, dated)| plain.into_iter().chain(dated).collect::<RawRecord>())
}

proptest! {
    #[test]
    fn every_record_gets_every_column(raw in raw_record()) {
        let record = transformer().transform(&raw).expect("transform");
        let columns: Vec<&str> = record.columns().collect();
        prop_assert_eq!(columns, Catalog::healthpro().output_columns());
    }

    #[test]
    fn transform_is_deterministic(raw in raw_record()) {
        let transformer = transformer();
        let first = transformer.transform(&raw).expect("first run");
        let second = transformer.transform(&raw).expect("second run");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn retention_date_is_blank_or_in_window(raw in raw_record()) {
        let record = transformer().transform(&raw).expect("transform");
        let value = record.get(ACTIVE_RETENTION_DATE).unwrap_or_default();
        if !value.is_empty() {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("ISO date");
            let (start, end) = RetentionPolicy::current().window(as_of());
            prop_assert!(start <= date && date <= end);
        }
    }
}
