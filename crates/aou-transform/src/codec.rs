//! Value codecs.
//!
//! Each codec converts one raw API value into the string HealthPro expects
//! for that column. All codecs are pure; an absent field reads as the empty
//! string. Only the date codecs can fail, and only on non-blank input that
//! does not parse.

use aou_model::{RawValue, UNSET};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::codebook;
use crate::error::CodecError;

/// Reporting timezone for every converted timestamp.
pub const REPORTING_TZ: Tz = chrono_tz::US::Eastern;

/// Number of baseline surveys that counts as "all required surveys done".
pub const REQUIRED_BASELINE_SURVEYS: i64 = 3;

const SITE_PREFIX: &str = "hpo-site-";
const STATE_PREFIX: &str = "PIIState_";

const DATE_FORMAT: &str = "%m/%d/%Y";
const DATETIME_FORMAT: &str = "%m/%d/%Y %I:%M %p";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Conversion applied by a mapping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// No conversion; the value is stringified as-is (`UNSET` included).
    Raw,
    Basic,
    Status,
    Completed,
    Received,
    Withdrawal,
    CountOrZero,
    Date,
    DateTime,
    Site,
    State,
    Language,
    RetentionStatus,
    Codebook,
    RequiredSurveysCompleted,
    IntoString,
}

impl Codec {
    /// Applies the codec to a raw value (`None` when the API omitted the field).
    pub fn apply(self, value: Option<&RawValue>) -> Result<String, CodecError> {
        let text = value.map(RawValue::as_text).unwrap_or_default();
        let converted = match self {
            Self::Raw => text.into_owned(),
            Self::Basic => basic(&text),
            Self::Status => status(&text).to_string(),
            Self::Completed => completed(&text).to_string(),
            Self::Received => received(&text).to_string(),
            Self::Withdrawal => withdrawal(&text).to_string(),
            Self::CountOrZero => count_or_zero(value),
            Self::Date => date(&text)?,
            Self::DateTime => datetime(&text)?,
            Self::Site => site(&text),
            Self::State => state(&text),
            Self::Language => language(&text),
            Self::RetentionStatus => retention_status(&text).to_string(),
            Self::Codebook => codebook_lookup(&text).to_string(),
            Self::RequiredSurveysCompleted => required_surveys_completed(value).to_string(),
            Self::IntoString => into_string(value),
        };
        Ok(converted)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Basic => "basic",
            Self::Status => "status",
            Self::Completed => "completed",
            Self::Received => "received",
            Self::Withdrawal => "withdrawal",
            Self::CountOrZero => "count_or_zero",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Site => "site",
            Self::State => "state",
            Self::Language => "language",
            Self::RetentionStatus => "retention_status",
            Self::Codebook => "codebook",
            Self::RequiredSurveysCompleted => "required_surveys_completed",
            Self::IntoString => "into_string",
        }
    }
}

pub fn basic(value: &str) -> String {
    if value == UNSET {
        String::new()
    } else {
        value.to_string()
    }
}

/// Questionnaire and consent status.
pub fn status(value: &str) -> &'static str {
    match value {
        "SUBMITTED" => "1",
        "SUBMITTED_NOT_SURE" => "2",
        _ => "0",
    }
}

pub fn completed(value: &str) -> &'static str {
    if value == "COMPLETED" { "1" } else { "0" }
}

pub fn received(value: &str) -> &'static str {
    if value == "RECEIVED" { "1" } else { "0" }
}

pub fn withdrawal(value: &str) -> &'static str {
    if value == "NO_USE" { "1" } else { "0" }
}

/// Stringified count, with a missing count reported as zero.
pub fn count_or_zero(value: Option<&RawValue>) -> String {
    let text = into_string(value);
    if text.is_empty() { "0".to_string() } else { text }
}

/// `YYYY-MM-DD` into `MM/DD/YYYY`.
pub fn date(value: &str) -> Result<String, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let parsed = parse_calendar_date(trimmed).ok_or_else(|| CodecError::InvalidDate {
        value: trimmed.to_string(),
    })?;
    Ok(parsed.format(DATE_FORMAT).to_string())
}

/// Timestamp into reporting-timezone `MM/DD/YYYY hh:mm AM`.
///
/// An explicit offset is honored; timestamps without one are UTC.
pub fn datetime(value: &str) -> Result<String, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let instant = parse_utc_instant(trimmed).ok_or_else(|| CodecError::InvalidDateTime {
        value: trimmed.to_string(),
    })?;
    Ok(instant
        .with_timezone(&REPORTING_TZ)
        .format(DATETIME_FORMAT)
        .to_string())
}

pub fn site(value: &str) -> String {
    if value == UNSET {
        String::new()
    } else {
        value.replace(SITE_PREFIX, "")
    }
}

pub fn state(value: &str) -> String {
    if value == UNSET {
        String::new()
    } else {
        value.replace(STATE_PREFIX, "")
    }
}

pub fn language(value: &str) -> String {
    match value {
        UNSET => String::new(),
        "en" => "English".to_string(),
        "es" => "Spanish".to_string(),
        other => other.to_string(),
    }
}

/// Retention type code. Unknown input is `""`, which is not the same as
/// `UNSET` (`"0"`).
pub fn retention_status(value: &str) -> &'static str {
    match value {
        "PASSIVE" => "1",
        "ACTIVE" => "2",
        "ACTIVE_AND_PASSIVE" => "3",
        UNSET => "0",
        _ => "",
    }
}

pub fn codebook_lookup(value: &str) -> &'static str {
    codebook::lookup(value).unwrap_or("")
}

pub fn required_surveys_completed(value: Option<&RawValue>) -> &'static str {
    match value.and_then(RawValue::as_i64) {
        Some(REQUIRED_BASELINE_SURVEYS) => "1",
        _ => "0",
    }
}

pub fn into_string(value: Option<&RawValue>) -> String {
    value.map(RawValue::as_text).unwrap_or_default().into_owned()
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_utc_instant(value).map(|instant| instant.date_naive()))
}

/// Parses an API timestamp. Offset-less values are UTC.
fn parse_utc_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
