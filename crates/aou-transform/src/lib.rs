//! HealthPro transformation core.
//!
//! This crate turns participant summaries from the API into rows of the
//! HealthPro work-queue export:
//!
//! - **codec**: per-field value conversions (status codes, dates, sites)
//! - **codebook**: HealthPro CodeBook token-to-label table
//! - **catalog**: the static one-to-one and one-to-many mapping rules
//! - **mapper**: applies the catalog to one record
//! - **retention**: derives the `Active Retention Date` column
//! - **pipeline**: mapper + retention over a sequence of records

pub mod catalog;
pub mod codebook;
pub mod codec;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod retention;

pub use catalog::{ACTIVE_RETENTION_DATE, Catalog, FieldRule, SampleGroup};
pub use codec::Codec;
pub use error::{CatalogError, CodecError, RetentionError, TransformError};
pub use mapper::map_record;
pub use pipeline::Transformer;
pub use retention::{CandidateRule, PolicyVersion, RetentionPolicy};
