//! FHIR-style search bundles returned by the participant-summary endpoint.
//!
//! Each page is a bundle whose `entry` list wraps one participant summary per
//! `resource`. Pages link onward through `link`; the last page has none.

use aou_model::RawRecord;
use serde::{Deserialize, Serialize};

const NEXT_RELATION: &str = "next";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
    #[serde(default)]
    pub link: Vec<BundleLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default)]
    pub resource: RawRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    pub url: String,
}

impl Bundle {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// URL of the following page.
    ///
    /// Prefers the `next` relation; a link without a relation also counts as
    /// the continuation.
    pub fn next_url(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation.as_deref() == Some(NEXT_RELATION))
            .or_else(|| self.link.iter().find(|link| link.relation.is_none()))
            .map(|link| link.url.as_str())
    }

    pub fn is_last_page(&self) -> bool {
        self.next_url().is_none()
    }

    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.entry.into_iter().map(|entry| entry.resource).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SavedRecords {
    Records(Vec<RawRecord>),
    Bundle(Bundle),
}

/// Reads participant records saved either as a bundle or as a bare array.
pub fn records_from_json(text: &str) -> serde_json::Result<Vec<RawRecord>> {
    Ok(match serde_json::from_str(text)? {
        SavedRecords::Records(records) => records,
        SavedRecords::Bundle(bundle) => bundle.into_records(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_relation_wins_over_unlabelled_link() {
        let bundle = Bundle::from_json(
            r#"{"link": [
                {"url": "https://api/first"},
                {"relation": "next", "url": "https://api/next"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(bundle.next_url(), Some("https://api/next"));
    }

    #[test]
    fn unlabelled_link_is_followed() {
        let bundle = Bundle::from_json(r#"{"link": [{"url": "https://api/p2"}]}"#).unwrap();
        assert_eq!(bundle.next_url(), Some("https://api/p2"));
    }

    #[test]
    fn self_link_alone_ends_paging() {
        let bundle =
            Bundle::from_json(r#"{"link": [{"relation": "self", "url": "https://api/p1"}]}"#)
                .unwrap();
        assert!(bundle.is_last_page());
        assert!(Bundle::default().is_last_page());
    }
}
