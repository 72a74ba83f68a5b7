//! Field mapper: one raw participant summary into one HealthPro row.

use aou_model::{OutputRecord, RawRecord, RawValue};

use crate::catalog::{CONSENT_COHORT, Catalog, SALIVA_ORDER_STATUS, SampleGroup};
use crate::codec;
use crate::error::{CodecError, TransformError};

const SAMPLE_RECEIVED: &str = "RECEIVED";

const SALIVA_ORDER_PRIMARY: &str = "sampleOrderStatus1SAL";
const SALIVA_ORDER_SECONDARY: &str = "sampleOrderStatus1SAL2";

const COHORT_FIELD: &str = "consentCohort";
const COHORT_PILOT_FIELD: &str = "cohort2PilotFlag";
const COHORT_2: &str = "COHORT_2";
const COHORT_2_PILOT: &str = "COHORT_2_PILOT";

/// Applies every rule of `catalog` to `raw`.
///
/// The result holds exactly the columns of [`Catalog::mapped_columns`], in
/// that order.
pub fn map_record(catalog: &Catalog, raw: &RawRecord) -> Result<OutputRecord, TransformError> {
    let mut out = OutputRecord::with_capacity(catalog.mapped_columns().len() + 1);

    for rule in catalog.rules() {
        let value = rule
            .codec
            .apply(raw.get(rule.source))
            .map_err(|source| TransformError::field(rule.target, rule.source, source))?;
        out.set(rule.target, value);
    }

    for group in catalog.groups() {
        let (status, time) = resolve_sample_group(raw, group).map_err(|source| {
            let time_fields: Vec<&str> = group.sources.iter().map(|(_, time)| *time).collect();
            TransformError::field(group.time_target, &time_fields.join("|"), source)
        })?;
        out.set(group.status_target, status);
        out.set(group.time_target, time);
    }

    out.set(SALIVA_ORDER_STATUS, saliva_order_status(raw));
    out.set(CONSENT_COHORT, consent_cohort(raw));
    Ok(out)
}

/// Resolves one aliased sample group to its `(status, collection date)` pair.
///
/// The first source pair in precedence order whose status is `RECEIVED`
/// supplies the converted time; otherwise `("0", "")`.
pub fn resolve_sample_group(
    raw: &RawRecord,
    group: &SampleGroup,
) -> Result<(String, String), CodecError> {
    let winner = group.sources.iter().find(|(status_field, _)| {
        raw.get(status_field).and_then(RawValue::as_str) == Some(SAMPLE_RECEIVED)
    });
    match winner {
        Some((_, time_field)) => {
            let time = raw.get(time_field).map(RawValue::as_text).unwrap_or_default();
            Ok(("1".to_string(), codec::datetime(&time)?))
        }
        None => Ok(("0".to_string(), String::new())),
    }
}

/// The secondary saliva order status wins when set; otherwise the primary
/// one is passed through unconverted.
pub fn saliva_order_status(raw: &RawRecord) -> String {
    match raw.get(SALIVA_ORDER_SECONDARY) {
        Some(value) if !value.is_unset() => value.as_text().into_owned(),
        _ => raw
            .get(SALIVA_ORDER_PRIMARY)
            .map(RawValue::as_text)
            .unwrap_or_default()
            .into_owned(),
    }
}

/// HealthPro's consent cohort label.
pub fn consent_cohort(raw: &RawRecord) -> &'static str {
    let cohort = raw.get(COHORT_FIELD).and_then(RawValue::as_str).unwrap_or("");
    let pilot = raw
        .get(COHORT_PILOT_FIELD)
        .and_then(RawValue::as_str)
        .unwrap_or("");
    if cohort == COHORT_2 && pilot == COHORT_2_PILOT {
        return "Cohort 2 Pilot";
    }
    match cohort {
        "COHORT_1" => "Cohort 1",
        "COHORT_2" => "Cohort 2",
        "COHORT_3" => "Cohort 3",
        _ => "",
    }
}
