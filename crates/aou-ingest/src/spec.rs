//! API endpoint description and participant-summary queries.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

const SUMMARY_RESOURCE: &str = "ParticipantSummary";

/// Page size the API is queried with unless the spec overrides it.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

pub const DEFAULT_TOKEN_ENV: &str = "AOU_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Contents of the API spec file.
///
/// ```json
/// {"base-url": "https://example.org/rdr/v1/", "awardee": "EXAMPLE"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiSpec {
    pub base_url: String,
    pub awardee: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ApiSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::ReadSpec {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| IngestError::ParseSpec {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the bearer token from the configured environment variable.
    pub fn token(&self) -> Result<String> {
        match env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(IngestError::MissingToken {
                name: self.token_env.clone(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Query for every participant of the spec's awardee.
    pub fn query(&self) -> ParticipantQuery {
        ParticipantQuery::new(&self.awardee).page_size(self.page_size)
    }
}

/// A participant-summary search: awardee, page size and extra filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantQuery {
    awardee: String,
    page_size: u32,
    filters: BTreeMap<String, String>,
}

impl ParticipantQuery {
    pub fn new(awardee: impl Into<String>) -> Self {
        Self {
            awardee: awardee.into(),
            page_size: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds filter parameters, such as the site's paired organization.
    #[must_use]
    pub fn filters<I, K, V>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.filters
            .extend(filters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// URL of the first page under `base_url`.
    pub fn first_page_url(&self, base_url: &str) -> Result<Url> {
        let invalid = |message: String| IngestError::InvalidUrl {
            url: base_url.to_string(),
            message,
        };
        let mut base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base
            .join(SUMMARY_RESOURCE)
            .map_err(|err| invalid(err.to_string()))?;

        url.query_pairs_mut()
            .append_pair("awardee", &self.awardee)
            .append_pair("count", &self.page_size.to_string())
            .extend_pairs(&self.filters);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_defaults() {
        let spec: ApiSpec =
            serde_json::from_str(r#"{"base-url": "https://api/rdr/v1/", "awardee": "PITT"}"#)
                .unwrap();
        assert_eq!(spec.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(spec.token_env, DEFAULT_TOKEN_ENV);
        assert_eq!(spec.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn first_page_url_carries_filters() {
        let url = ParticipantQuery::new("PITT")
            .filters([("organization", "PITT_UPMC")])
            .first_page_url("https://api.example.org/rdr/v1/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/rdr/v1/ParticipantSummary?awardee=PITT&count=200&organization=PITT_UPMC"
        );
    }

    #[test]
    fn base_without_trailing_slash() {
        let url = ParticipantQuery::new("PITT")
            .page_size(50)
            .first_page_url("https://api.example.org/rdr/v1")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/rdr/v1/ParticipantSummary?awardee=PITT&count=50"
        );
    }

    #[test]
    fn rejects_relative_base() {
        let err = ParticipantQuery::new("PITT")
            .first_page_url("rdr/v1/")
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
