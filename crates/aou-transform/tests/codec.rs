//! Tests for the value codecs.

use aou_model::RawValue;
use aou_transform::codec::{self, Codec};
use aou_transform::CodecError;

#[test]
fn basic_strips_unset() {
    assert_eq!(codec::basic("UNSET"), "");
    assert_eq!(codec::basic("abc"), "abc");
    assert_eq!(codec::basic(""), "");
}

#[test]
fn status_codes() {
    assert_eq!(codec::status("SUBMITTED"), "1");
    assert_eq!(codec::status("SUBMITTED_NOT_SURE"), "2");
    assert_eq!(codec::status("SUBMITTED_NO_CONSENT"), "0");
    assert_eq!(codec::status("anything else"), "0");
    assert_eq!(codec::status(""), "0");
}

#[test]
fn single_token_flags() {
    assert_eq!(codec::completed("COMPLETED"), "1");
    assert_eq!(codec::completed("UNSET"), "0");
    assert_eq!(codec::received("RECEIVED"), "1");
    assert_eq!(codec::received("DISPOSED"), "0");
    assert_eq!(codec::withdrawal("NO_USE"), "1");
    assert_eq!(codec::withdrawal("NOT_WITHDRAWN"), "0");
}

#[test]
fn date_reformats_calendar_dates() {
    assert_eq!(codec::date("").unwrap(), "");
    assert_eq!(codec::date("   ").unwrap(), "");
    assert_eq!(codec::date("1980-07-04").unwrap(), "07/04/1980");
}

#[test]
fn date_rejects_malformed_input() {
    assert_eq!(
        codec::date("07/04/1980"),
        Err(CodecError::InvalidDate {
            value: "07/04/1980".to_string()
        })
    );
}

#[test]
fn datetime_converts_to_eastern_daylight_time() {
    assert_eq!(codec::datetime("").unwrap(), "");
    assert_eq!(
        codec::datetime("2020-06-15T14:30:00Z").unwrap(),
        "06/15/2020 10:30 AM"
    );
}

#[test]
fn datetime_converts_to_eastern_standard_time() {
    assert_eq!(
        codec::datetime("2020-01-15T14:30:00Z").unwrap(),
        "01/15/2020 09:30 AM"
    );
    assert_eq!(
        codec::datetime("2020-01-15T19:05:00Z").unwrap(),
        "01/15/2020 02:05 PM"
    );
}

#[test]
fn datetime_treats_naive_timestamps_as_utc() {
    // Crosses midnight going back to Eastern.
    assert_eq!(
        codec::datetime("2019-03-01T03:05:00").unwrap(),
        "02/28/2019 10:05 PM"
    );
    assert_eq!(
        codec::datetime("2019-03-01T03:05:00.123").unwrap(),
        "02/28/2019 10:05 PM"
    );
}

#[test]
fn datetime_honors_explicit_offsets() {
    assert_eq!(
        codec::datetime("2023-05-02T12:45:00-04:00").unwrap(),
        "05/02/2023 12:45 PM"
    );
    assert_eq!(
        codec::datetime("2023-05-02T16:45:00+00:00").unwrap(),
        codec::datetime("2023-05-02T16:45:00Z").unwrap()
    );
}

#[test]
fn datetime_rejects_malformed_input() {
    assert!(matches!(
        codec::datetime("yesterday"),
        Err(CodecError::InvalidDateTime { .. })
    ));
}

#[test]
fn site_and_state_strip_prefixes() {
    assert_eq!(codec::site("hpo-site-weillcornell"), "weillcornell");
    assert_eq!(codec::site("UNSET"), "");
    assert_eq!(codec::state("PIIState_NY"), "NY");
    assert_eq!(codec::state("UNSET"), "");
}

#[test]
fn language_names() {
    assert_eq!(codec::language("UNSET"), "");
    assert_eq!(codec::language("en"), "English");
    assert_eq!(codec::language("es"), "Spanish");
    assert_eq!(codec::language("fr"), "fr");
}

#[test]
fn retention_status_keeps_unset_and_unknown_apart() {
    assert_eq!(codec::retention_status("PASSIVE"), "1");
    assert_eq!(codec::retention_status("ACTIVE"), "2");
    assert_eq!(codec::retention_status("ACTIVE_AND_PASSIVE"), "3");
    assert_eq!(codec::retention_status("UNSET"), "0");
    assert_eq!(codec::retention_status("SOMETIMES"), "");
}

#[test]
fn codebook_lookup_defaults_to_empty() {
    assert_eq!(codec::codebook_lookup("MEMBER"), "Fully Consented");
    assert_eq!(codec::codebook_lookup("GenderIdentity_NonBinary"), "Non-binary");
    assert_eq!(codec::codebook_lookup("NOT_A_TOKEN"), "");
}

#[test]
fn required_surveys_compares_numerically() {
    assert_eq!(codec::required_surveys_completed(Some(&RawValue::Integer(3))), "1");
    assert_eq!(codec::required_surveys_completed(Some(&RawValue::from("3"))), "1");
    assert_eq!(codec::required_surveys_completed(Some(&RawValue::Integer(2))), "0");
    assert_eq!(codec::required_surveys_completed(None), "0");
}

#[test]
fn apply_treats_missing_fields_as_empty() {
    for codec in [
        Codec::Basic,
        Codec::Date,
        Codec::DateTime,
        Codec::Site,
        Codec::State,
        Codec::Language,
        Codec::Codebook,
        Codec::IntoString,
        Codec::Raw,
    ] {
        assert_eq!(codec.apply(None).unwrap(), "", "codec {}", codec.name());
    }
    assert_eq!(Codec::Status.apply(None).unwrap(), "0");
    assert_eq!(Codec::RetentionStatus.apply(None).unwrap(), "");
    assert_eq!(Codec::CountOrZero.apply(None).unwrap(), "0");
}

#[test]
fn apply_stringifies_non_text_values() {
    assert_eq!(Codec::CountOrZero.apply(Some(&RawValue::Integer(7))).unwrap(), "7");
    assert_eq!(Codec::IntoString.apply(Some(&RawValue::Bool(true))).unwrap(), "true");
    assert_eq!(Codec::Raw.apply(Some(&RawValue::from("UNSET"))).unwrap(), "UNSET");
    assert_eq!(Codec::Basic.apply(Some(&RawValue::Integer(10023))).unwrap(), "10023");
}
