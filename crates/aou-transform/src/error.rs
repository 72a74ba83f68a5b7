//! Error types for the transformation core.

use thiserror::Error;

/// A raw value could not be converted by its codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid date: '{value}'")]
    InvalidDate { value: String },

    #[error("invalid timestamp: '{value}'")]
    InvalidDateTime { value: String },
}

/// The mapping catalog violates one of its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate target column: {column}")]
    DuplicateTarget { column: String },

    #[error("sample group '{column}' has no source fields")]
    EmptyGroup { column: String },
}

/// A decoded column could not be read by the retention calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetentionError {
    #[error("column '{column}' holds an unparseable date: '{value}'")]
    InvalidDate { column: String, value: String },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column '{column}' (from '{source_field}'): {source}")]
    Field {
        column: String,
        source_field: String,
        #[source]
        source: CodecError,
    },

    #[error("active retention date: {0}")]
    Retention(#[from] RetentionError),

    #[error("invalid mapping catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("record {index} ({participant}): {source}")]
    Record {
        index: usize,
        participant: String,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    pub(crate) fn field(column: &str, source_field: &str, source: CodecError) -> Self {
        Self::Field {
            column: column.to_string(),
            source_field: source_field.to_string(),
            source,
        }
    }
}
