//! Refresh stages shared by the `refresh` and `transform` commands.

use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info_span};

use aou_load::{CsvSink, LoadSummary, RecordSink, SqlScriptSink, TableName};
use aou_model::{OutputRecord, RawRecord};
use aou_transform::codec::REPORTING_TZ;
use aou_transform::{ACTIVE_RETENTION_DATE, Catalog, RetentionPolicy, TransformError, Transformer};

use crate::config::LoadFormat;
use crate::logging::redact_value;

/// Today's date in the reporting timezone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&REPORTING_TZ).date_naive()
}

/// Maps every record to the HealthPro schema and derives its retention date.
///
/// The failing participant's identifier is redacted from the error unless
/// participant-level logging is enabled.
pub fn transform_records(
    records: &[RawRecord],
    policy: RetentionPolicy,
    as_of: NaiveDate,
) -> Result<Vec<OutputRecord>> {
    let span = info_span!("transform", records = records.len(), policy = %policy.version());
    let _guard = span.enter();

    let transformer = Transformer::new(Catalog::healthpro(), policy, as_of)?;
    transformer.transform_all(records).map_err(|err| match err {
        TransformError::Record {
            index,
            participant,
            source,
        } => anyhow!(
            "record {index} ({}): {source}",
            redact_value(&participant)
        ),
        other => other.into(),
    })
}

pub fn count_with_retention_date(records: &[OutputRecord]) -> usize {
    records
        .iter()
        .filter(|record| record.get(ACTIVE_RETENTION_DATE).is_some_and(|v| !v.is_empty()))
        .count()
}

/// Sinks for `format`, writing `<output_dir>/<table>.csv` and `.sql`.
pub fn output_sinks(
    format: LoadFormat,
    output_dir: &Path,
    table: &TableName,
) -> Vec<Box<dyn RecordSink>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if format.writes_csv() {
        sinks.push(Box::new(CsvSink::new(
            output_dir.join(format!("{}.csv", table.table())),
        )));
    }
    if format.writes_sql() {
        sinks.push(Box::new(
            SqlScriptSink::new(output_dir.join(format!("{}.sql", table.table())))
                .ensure_columns([ACTIVE_RETENTION_DATE]),
        ));
    }
    sinks
}

/// Writes `records` through every sink, in the catalog's column order.
pub fn write_outputs(
    sinks: &mut [Box<dyn RecordSink>],
    table: &TableName,
    records: &[OutputRecord],
) -> Result<Vec<LoadSummary>> {
    let columns = Catalog::healthpro().output_columns();
    let mut summaries = Vec::with_capacity(sinks.len());
    for sink in sinks.iter_mut() {
        let span = info_span!("load", sink = sink.name(), table = %table);
        let _guard = span.enter();
        let summary = sink.load(table, &columns, records)?;
        debug!(path = %summary.path.display(), rows = summary.rows, "output written");
        summaries.push(summary);
    }
    Ok(summaries)
}
