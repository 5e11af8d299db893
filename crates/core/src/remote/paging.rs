//! Generic pagination loop over a remote listing endpoint.
//!
//! The CRM's listing endpoints disagree on pagination semantics: contacts use
//! an id + timestamp cursor taken from the last record of the previous page,
//! invoices use a plain offset, and the server-reported total is sometimes
//! missing entirely. This loop accumulates records in encounter order and
//! terminates on the first of: empty page, reported total reached, short
//! page, or the hard page cap.

use std::future::Future;
use std::time::Duration;

use log::warn;
use serde_json::Value;
use tokio::time::sleep;

use crate::errors::Result;
use crate::utils::coerce::parse_epoch_millis;

/// Remote-documented maximum page size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Hard safety cap on page count to prevent runaway loops.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Fixed delay between page requests to respect remote rate limits.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Tuning for one paginated fetch.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    pub limit: u32,
    pub max_pages: u32,
    pub page_delay: Duration,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Request parameters for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u64,
    pub start_after_id: Option<String>,
    /// Epoch-milliseconds timestamp cursor; omitted when the last record's
    /// timestamp could not be coerced.
    pub start_after: Option<i64>,
}

/// One page of records plus the server-reported total, when present.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: Option<u64>,
}

/// Result of a full paginated fetch.
///
/// `truncated` is set when the page cap stopped the loop before the remote
/// reported end-of-data; callers must treat the record set as incomplete
/// and in particular must not run delete-by-absence against it.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub records: Vec<T>,
    pub pages: u32,
    pub truncated: bool,
}

/// Raw cursor material extracted from the last record of a page.
#[derive(Debug, Clone, Default)]
pub struct CursorSeed {
    pub id: Option<String>,
    pub raw_timestamp: Option<Value>,
}

/// How the next page request is derived from the previous page.
pub enum Advance<T> {
    /// Plain offset pagination.
    Offset,
    /// Cursor pagination seeded from the last record of the previous page.
    Cursor(fn(&T) -> CursorSeed),
}

/// Fetch every page from a listing endpoint, accumulating records in
/// encounter order. A failed page fetch aborts the whole loop; an
/// incomplete remote set would corrupt delete-by-absence downstream.
pub async fn fetch_all_pages<T, F, Fut>(
    config: &PagingConfig,
    advance: Advance<T>,
    mut fetch_page: F,
) -> Result<FetchOutcome<T>>
where
    F: FnMut(PageQuery) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut query = PageQuery {
        limit: config.limit,
        ..Default::default()
    };
    let mut records: Vec<T> = Vec::new();
    let mut pages = 0u32;
    let mut truncated = false;

    loop {
        let page = fetch_page(query.clone()).await?;
        pages += 1;
        let count = page.records.len();
        if count == 0 {
            break;
        }
        records.extend(page.records);

        if let Some(total) = page.total {
            if records.len() as u64 >= total {
                break;
            }
        }
        // Short page means last page even without an explicit total.
        if (count as u32) < config.limit {
            break;
        }
        if pages >= config.max_pages {
            warn!(
                "pagination stopped at hard cap of {} pages with {} records; remote set is truncated",
                config.max_pages,
                records.len()
            );
            truncated = true;
            break;
        }

        match &advance {
            Advance::Offset => query.offset += u64::from(config.limit),
            Advance::Cursor(extract) => {
                if let Some(last) = records.last() {
                    // A record missing cursor fields must not wipe the
                    // previous cursor; keep the last good value instead.
                    let seed = extract(last);
                    if seed.id.is_some() {
                        query.start_after_id = seed.id;
                    }
                    if let Some(ts) = seed.raw_timestamp.as_ref().and_then(parse_epoch_millis) {
                        query.start_after = Some(ts);
                    }
                }
            }
        }

        sleep(config.page_delay).await;
    }

    Ok(FetchOutcome {
        records,
        pages,
        truncated,
    })
}
