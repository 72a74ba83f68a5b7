//! Transformation pipeline: raw participant summaries into finished rows.

use aou_model::{OutputRecord, RawRecord};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::catalog::{ACTIVE_RETENTION_DATE, Catalog};
use crate::error::{CatalogError, TransformError};
use crate::mapper::map_record;
use crate::retention::RetentionPolicy;

/// Maps records through a validated catalog and attaches the retention date.
///
/// `as_of` is the processing date the retention window ends on. Pinning it
/// makes a run reproducible.
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    catalog: &'a Catalog,
    policy: RetentionPolicy,
    as_of: NaiveDate,
}

impl<'a> Transformer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        policy: RetentionPolicy,
        as_of: NaiveDate,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            catalog,
            policy,
            as_of,
        })
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Output columns, in the order every record carries them.
    pub fn columns(&self) -> Vec<&'static str> {
        self.catalog.output_columns()
    }

    pub fn transform(&self, raw: &RawRecord) -> Result<OutputRecord, TransformError> {
        let mut record = map_record(self.catalog, raw)?;
        let retention_date = self.policy.active_retention_date(&record, self.as_of)?;
        record.set(ACTIVE_RETENTION_DATE, retention_date);
        Ok(record)
    }

    /// Transforms every record in order, stopping at the first failure.
    pub fn transform_all<'r, I>(&self, records: I) -> Result<Vec<OutputRecord>, TransformError>
    where
        I: IntoIterator<Item = &'r RawRecord>,
    {
        let records = records.into_iter();
        let mut out = Vec::with_capacity(records.size_hint().0);
        for (index, raw) in records.enumerate() {
            let record = self.transform(raw).map_err(|source| TransformError::Record {
                index,
                participant: raw.participant_id().unwrap_or("<unknown>").to_string(),
                source: Box::new(source),
            })?;
            out.push(record);
        }

        let with_retention_date = out
            .iter()
            .filter(|record| record.get(ACTIVE_RETENTION_DATE).is_some_and(|v| !v.is_empty()))
            .count();
        info!(
            records = out.len(),
            with_retention_date,
            policy = %self.policy.version(),
            as_of = %self.as_of,
            "transformed participant records"
        );
        debug!(columns = self.catalog.output_columns().len(), "output schema");
        Ok(out)
    }
}
