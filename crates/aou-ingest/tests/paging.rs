//! Paging tests against an in-memory page source.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use aou_ingest::{
    ApiSpec, Bundle, BundleEntry, BundleLink, IngestError, PageFetcher, Result, fetch_all,
    records_from_json,
};
use aou_model::RawRecord;

struct CannedPages {
    pages: HashMap<String, Bundle>,
    requested: RefCell<Vec<String>>,
}

impl CannedPages {
    /// `count` pages of `per_page` records, chained by unlabelled links.
    fn chain(count: usize, per_page: usize) -> Self {
        let mut pages = HashMap::new();
        for page in 0..count {
            let entry = (0..per_page)
                .map(|i| BundleEntry {
                    resource: RawRecord::new().with("participantId", format!("P{page}-{i}")),
                    full_url: None,
                })
                .collect();
            let link = if page + 1 < count {
                vec![BundleLink {
                    relation: None,
                    url: format!("page-{}", page + 1),
                }]
            } else {
                Vec::new()
            };
            pages.insert(
                format!("page-{page}"),
                Bundle {
                    entry,
                    link,
                    total: None,
                },
            );
        }
        Self {
            pages,
            requested: RefCell::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl PageFetcher for CannedPages {
    fn fetch(&self, url: &str) -> Result<Bundle> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| IngestError::Api {
            status: 404,
            url: url.to_string(),
            message: "no such page".to_string(),
        })
    }
}

fn ids(records: &[RawRecord]) -> Vec<&str> {
    records.iter().filter_map(RawRecord::participant_id).collect()
}

#[test]
fn follows_links_to_the_last_page() {
    let pages = CannedPages::chain(3, 2);
    let mut seen = Vec::new();
    let records = fetch_all(&pages, "page-0", None, |progress| seen.push(progress)).unwrap();

    assert_eq!(
        ids(&records),
        vec!["P0-0", "P0-1", "P1-0", "P1-1", "P2-0", "P2-1"]
    );
    assert_eq!(pages.requested(), vec!["page-0", "page-1", "page-2"]);
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2].page, 3);
    assert_eq!(seen[2].total_records, 6);
}

#[test]
fn max_rows_stops_after_reaching_limit() {
    let pages = CannedPages::chain(5, 2);
    let records = fetch_all(&pages, "page-0", Some(3), |_| {}).unwrap();

    assert_eq!(ids(&records), vec!["P0-0", "P0-1", "P1-0"]);
    assert_eq!(pages.requested(), vec!["page-0", "page-1"]);
}

#[test]
fn empty_page_ends_without_error() {
    let pages = CannedPages::chain(1, 0);
    let records = fetch_all(&pages, "page-0", None, |_| {}).unwrap();
    assert!(records.is_empty());
}

#[test]
fn fetch_errors_propagate() {
    let pages = CannedPages::chain(1, 1);
    let err = fetch_all(&pages, "missing", None, |_| {}).unwrap_err();
    assert!(matches!(err, IngestError::Api { status: 404, .. }));
    assert!(!err.is_configuration());
}

#[test]
fn saved_records_accept_bundle_or_array() {
    let bundle = r#"{"entry": [
        {"fullUrl": "https://api/P1", "resource": {"participantId": "P1", "numCompletedBaselinePPIModules": 3}},
        {"resource": {"participantId": "P2"}}
    ]}"#;
    let array = r#"[{"participantId": "P1"}, {"participantId": "P2"}]"#;

    assert_eq!(ids(&records_from_json(bundle).unwrap()), vec!["P1", "P2"]);
    assert_eq!(ids(&records_from_json(array).unwrap()), vec!["P1", "P2"]);
    assert!(records_from_json("42").is_err());
}

#[test]
fn api_spec_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"base-url": "https://api.example.org/rdr/v1/", "awardee": "PITT", "page-size": 50,
            "token-env": "AOU_INGEST_TEST_TOKEN_UNSET"}}"#
    )
    .unwrap();

    let spec = ApiSpec::load(file.path()).unwrap();
    assert_eq!(spec.awardee, "PITT");
    assert_eq!(spec.page_size, 50);

    let url = spec.query().first_page_url(&spec.base_url).unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.example.org/rdr/v1/ParticipantSummary?awardee=PITT&count=50"
    );

    let err = spec.token().unwrap_err();
    assert!(matches!(err, IngestError::MissingToken { ref name } if name == "AOU_INGEST_TEST_TOKEN_UNSET"));
}

#[test]
fn api_spec_reports_missing_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"awardee": "PITT"}}"#).unwrap();

    let err = ApiSpec::load(file.path()).unwrap_err();
    assert!(matches!(err, IngestError::ParseSpec { .. }));
    assert!(err.is_configuration());
}
