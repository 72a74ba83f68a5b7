//! Error types for API retrieval.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// The API spec file could not be read.
    #[error("failed to read API spec {path}: {source}")]
    ReadSpec {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API spec file is not valid JSON or misses a required key.
    #[error("failed to parse API spec {path}: {source}")]
    ParseSpec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The environment variable named by `token-env` is unset or empty.
    #[error("API token variable {name} is not set")]
    MissingToken { name: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// A page body was not a participant-summary bundle.
    #[error("malformed bundle from {url}: {source}")]
    Bundle {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// True for errors raised before any request was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ReadSpec { .. }
                | Self::ParseSpec { .. }
                | Self::InvalidUrl { .. }
                | Self::MissingToken { .. }
        )
    }
}
