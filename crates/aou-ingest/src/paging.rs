//! Walking a chain of bundle pages.

use aou_model::RawRecord;
use tracing::{debug, info};

use crate::client::PageFetcher;
use crate::error::Result;

/// Progress after one page has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based page number.
    pub page: usize,
    pub page_records: usize,
    pub total_records: usize,
}

/// Fetches `first_url` and every page it links to, collecting the resources.
///
/// With `max_rows`, paging stops after the page that reaches the limit and
/// the result is truncated to it. `on_page` is called after each page.
pub fn fetch_all<F, P>(
    fetcher: &F,
    first_url: &str,
    max_rows: Option<usize>,
    mut on_page: P,
) -> Result<Vec<RawRecord>>
where
    F: PageFetcher + ?Sized,
    P: FnMut(PageProgress),
{
    let mut records = Vec::new();
    let mut next = Some(first_url.to_string());
    let mut page = 0;

    while let Some(url) = next.take() {
        let bundle = fetcher.fetch(&url)?;
        page += 1;
        next = bundle.next_url().map(str::to_string);

        let page_records = bundle.len();
        records.extend(bundle.into_records());
        debug!(page, page_records, total = records.len(), "read bundle page");
        on_page(PageProgress {
            page,
            page_records,
            total_records: records.len(),
        });

        if let Some(limit) = max_rows
            && records.len() >= limit
        {
            records.truncate(limit);
            debug!(limit, "row limit reached; stopping");
            break;
        }
    }

    info!(pages = page, records = records.len(), "fetched participant summaries");
    Ok(records)
}
