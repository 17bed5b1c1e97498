//! Catalog crawling: list-page pagination, detail-page fetching, and the
//! bounded-concurrency enrichment coordinator.
//!
//! This crate provides:
//! - [`paginator`] — sequential walk over one catalog partition's list pages
//! - [`detail`] — single detail-page fetch with data-driven field extraction
//! - [`enrich`] — fixed worker pool that fans detail fetches out and merges
//!   results back into their source listings

pub mod detail;
pub mod enrich;
pub mod paginator;

pub use detail::{HttpFetcher, extract_detail_fields, fetch_details};
pub use enrich::{DetailFetcher, EnrichProgress, PROGRESS_EVERY, SilentEnrich, enrich};
pub use paginator::paginate;

use std::time::Duration;

use catscout_shared::{CatscoutError, Result};
use reqwest::Client;

/// Fixed User-Agent attached to every catalog request. The source serves an
/// empty catalog to clients without a browser-shaped UA.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36";

/// Build the HTTP client shared by the paginator and the detail fetchers.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| CatscoutError::Network(format!("failed to build HTTP client: {e}")))
}
