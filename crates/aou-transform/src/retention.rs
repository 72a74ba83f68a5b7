//! Active Retention Date derivation.
//!
//! A participant flagged retention-eligible gets the earliest date, within a
//! trailing 547-day window, on which they completed one of the tracked
//! surveys or consents. Ineligible participants, and eligible ones with no
//! qualifying date, get the empty string.
//!
//! The calculator reads the already-decoded HealthPro columns: completion
//! flags are `"1"`, dates are `MM/DD/YYYY[ hh:mm AM]` in the reporting
//! timezone.

use std::fmt;

use aou_model::OutputRecord;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::CONSENT_COHORT;
use crate::error::RetentionError;

/// Column carrying the API's retention eligibility flag.
pub const RETENTION_ELIGIBLE_COLUMN: &str = "retentionEligibleStatus";

/// Value of [`RETENTION_ELIGIBLE_COLUMN`] that passes the gate.
pub const RETENTION_ELIGIBLE: &str = "ELIGIBLE";

/// Length of the trailing window, both ends inclusive.
pub const WINDOW_DAYS: u64 = 547;

const COMPLETE_FLAG: &str = "1";
const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One date column that may supply the retention date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRule {
    pub date_column: &'static str,
    /// Completion flag that must read `"1"`; `None` means the date alone counts.
    pub flag_column: Option<&'static str>,
    /// `Consent Cohort` labels the candidate is limited to.
    pub cohorts: Option<&'static [&'static str]>,
}

impl CandidateRule {
    const fn survey(flag_column: &'static str, date_column: &'static str) -> Self {
        Self {
            date_column,
            flag_column: Some(flag_column),
            cohorts: None,
        }
    }

    fn applies(&self, record: &OutputRecord, cohort: &str) -> bool {
        let flagged = self
            .flag_column
            .is_none_or(|column| record.get(column) == Some(COMPLETE_FLAG));
        let in_cohort = self
            .cohorts
            .is_none_or(|cohorts| cohorts.contains(&cohort));
        flagged && in_cohort
    }
}

const ACCESS: CandidateRule = CandidateRule::survey(
    "Access PPI Survey Complete",
    "Access PPI Survey Completion Date",
);
const FAMILY: CandidateRule = CandidateRule::survey(
    "Family PPI Survey Complete",
    "Family PPI Survey Completion Date",
);
const HISTORY: CandidateRule = CandidateRule::survey(
    "Hist PPI Survey Complete",
    "Hist PPI Survey Completion Date",
);
const COPE_MAY: CandidateRule = CandidateRule::survey(
    "COPE May PPI Survey Complete",
    "COPE May PPI Survey Completion Date",
);
const COPE_JUNE: CandidateRule = CandidateRule::survey(
    "COPE June PPI Survey Complete",
    "COPE June PPI Survey Completion Date",
);
const COPE_JULY: CandidateRule = CandidateRule::survey(
    "COPE July PPI Survey Complete",
    "COPE July PPI Survey Completion Date",
);
const COPE_NOV: CandidateRule = CandidateRule::survey(
    "COPE Nov PPI Survey Complete",
    "COPE Nov PPI Survey Completion Date",
);
const COPE_DEC: CandidateRule = CandidateRule::survey(
    "COPE Dec PPI Survey Complete",
    "COPE Dec PPI Survey Completion Date",
);
const COPE_FEB: CandidateRule = CandidateRule::survey(
    "COPE Feb PPI Survey Complete",
    "COPE Feb PPI Survey Completion Date",
);
const GENOMICS_ROR: CandidateRule = CandidateRule {
    date_column: "gRoR Consent Date",
    flag_column: None,
    cohorts: Some(&["Cohort 1", "Cohort 2", "Cohort 2 Pilot"]),
};
const GENERAL_CONSENT: CandidateRule = CandidateRule {
    date_column: "General Consent Date",
    flag_column: Some("General Consent Status"),
    cohorts: Some(&["Cohort 1"]),
};

const CURRENT_CANDIDATES: &[CandidateRule] = &[
    ACCESS,
    FAMILY,
    HISTORY,
    COPE_MAY,
    COPE_JUNE,
    COPE_JULY,
    COPE_NOV,
    COPE_DEC,
    COPE_FEB,
    GENOMICS_ROR,
    GENERAL_CONSENT,
];

const BASELINE_CANDIDATES: &[CandidateRule] =
    &[ACCESS, FAMILY, HISTORY, COPE_MAY, COPE_JUNE, COPE_JULY];

/// Named retention policy version, as selected in site configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyVersion {
    /// Surveys, all COPE waves, gRoR and cohort-1 general consent.
    #[default]
    Current,
    /// Healthcare access, family, history and the first three COPE waves.
    Baseline,
}

impl PolicyVersion {
    pub fn policy(self) -> RetentionPolicy {
        match self {
            Self::Current => RetentionPolicy::current(),
            Self::Baseline => RetentionPolicy::baseline(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Baseline => "baseline",
        }
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of candidate dates evaluated against the retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    version: PolicyVersion,
    candidates: &'static [CandidateRule],
}

impl RetentionPolicy {
    pub fn current() -> Self {
        Self {
            version: PolicyVersion::Current,
            candidates: CURRENT_CANDIDATES,
        }
    }

    pub fn baseline() -> Self {
        Self {
            version: PolicyVersion::Baseline,
            candidates: BASELINE_CANDIDATES,
        }
    }

    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    pub fn candidates(&self) -> &'static [CandidateRule] {
        self.candidates
    }

    /// Inclusive `(start, end)` of the window ending on `as_of`.
    pub fn window(&self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = as_of
            .checked_sub_days(Days::new(WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        (start, as_of)
    }

    /// Computes the `Active Retention Date` for one mapped record.
    ///
    /// Returns `YYYY-MM-DD` or the empty string. A non-empty candidate date
    /// that does not parse is an error.
    pub fn active_retention_date(
        &self,
        record: &OutputRecord,
        as_of: NaiveDate,
    ) -> Result<String, RetentionError> {
        if record.get(RETENTION_ELIGIBLE_COLUMN) != Some(RETENTION_ELIGIBLE) {
            return Ok(String::new());
        }

        let (start, end) = self.window(as_of);
        let cohort = record.get(CONSENT_COHORT).unwrap_or("");
        let mut earliest: Option<NaiveDate> = None;
        for candidate in self.candidates {
            let Some(date) = read_date(record, candidate.date_column)? else {
                continue;
            };
            if date < start || date > end || !candidate.applies(record, cohort) {
                continue;
            }
            earliest = Some(earliest.map_or(date, |current| current.min(date)));
        }

        Ok(earliest
            .map(|date| date.format(OUTPUT_DATE_FORMAT).to_string())
            .unwrap_or_default())
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::current()
    }
}

/// Reads a decoded date column; blank means "no value".
fn read_date(record: &OutputRecord, column: &str) -> Result<Option<NaiveDate>, RetentionError> {
    let value = record.get(column).unwrap_or("").trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_reported_date(value)
        .map(Some)
        .ok_or_else(|| RetentionError::InvalidDate {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Accepts `MM/DD/YYYY`, optionally followed by a time, or `YYYY-MM-DD`.
fn parse_reported_date(value: &str) -> Option<NaiveDate> {
    let day = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(day, OUTPUT_DATE_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reported_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 2, 3);
        assert_eq!(parse_reported_date("02/03/2021 04:05 PM"), expected);
        assert_eq!(parse_reported_date("02/03/2021"), expected);
        assert_eq!(parse_reported_date("2021-02-03"), expected);
        assert_eq!(parse_reported_date("Feb 3rd"), None);
    }

    #[test]
    fn window_spans_547_days() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let (start, end) = RetentionPolicy::current().window(as_of);
        assert_eq!(end, as_of);
        assert_eq!((end - start).num_days(), 547);
    }

    #[test]
    fn policies_are_versioned() {
        assert_eq!(RetentionPolicy::current().candidates().len(), 11);
        assert_eq!(RetentionPolicy::baseline().candidates().len(), 6);
        assert_eq!(PolicyVersion::Baseline.policy(), RetentionPolicy::baseline());
        assert_eq!(PolicyVersion::default().to_string(), "current");
    }
}
