//! HTTP client for the participant-summary API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

use crate::bundle::Bundle;
use crate::error::{IngestError, Result};
use crate::spec::ApiSpec;

const CLIENT_NAME: &str = "aou-refresh";

/// Source of bundle pages.
///
/// [`ApiClient`] talks to the live API; tests substitute canned pages.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<Bundle>;
}

/// Authenticated blocking client.
pub struct ApiClient {
    client: Client,
    token: String,
}

impl ApiClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// Builds a client from the spec's timeout and token variable.
    pub fn from_spec(spec: &ApiSpec) -> Result<Self> {
        Self::new(spec.token()?, spec.timeout())
    }
}

impl PageFetcher for ApiClient {
    fn fetch(&self, url: &str) -> Result<Bundle> {
        debug!(url, "fetching bundle page");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, format!("{CLIENT_NAME}/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(IngestError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = response.text()?;
        Bundle::from_json(&body).map_err(|source| IngestError::Bundle {
            url: url.to_string(),
            source,
        })
    }
}
