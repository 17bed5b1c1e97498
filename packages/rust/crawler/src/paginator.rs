//! Sequential list-page walk over one catalog partition.
//!
//! Pages are requested one at a time with a fixed pacing delay; page N+1 is
//! never requested before page N's outcome is known. Running out of pages is
//! normal exhaustion, never an error: a failed fetch, a missing results
//! table, or a page with zero valid rows all stop the walk and return
//! whatever was accumulated so far.

use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use catscout_shared::{CrawlPartition, Listing, PAGE_STRIDE, ScrapeConfig};

/// Walk the list pages of `partition` and return the partial listings found.
///
/// Each listing has its identity fields (`name`, `url`) and list-page flags
/// populated; the four detail fields stay at their sentinel until enrichment.
#[instrument(skip_all, fields(partition = %partition.label))]
pub async fn paginate(
    client: &Client,
    partition: &CrawlPartition,
    config: &ScrapeConfig,
) -> Vec<Listing> {
    let mut all_listings = Vec::new();

    for page_index in 0..partition.max_pages {
        let start = page_index * PAGE_STRIDE;
        let page_url = format!(
            "{}?start={start}&type={}",
            config.catalog_url, partition.type_param
        );

        let response = match client.get(&page_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %page_url, error = %e, "list-page fetch failed, stopping");
                break;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %page_url, %status, "list page returned non-success, stopping");
            break;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %page_url, error = %e, "list-page body read failed, stopping");
                break;
            }
        };

        info!(url = %page_url, "scraping list page");

        let doc = Html::parse_document(&body);
        let table_sel = Selector::parse("table").unwrap();
        let Some(table) = doc.select(&table_sel).next() else {
            info!(url = %page_url, "no results table found, stopping");
            break;
        };

        let listings = scrape_table(table, &config.site_origin);
        if listings.is_empty() {
            info!(url = %page_url, "no listings found, stopping");
            break;
        }

        debug!(count = listings.len(), page = page_index, "page scraped");
        all_listings.extend(listings);

        // Fixed pacing between successful page fetches.
        if config.page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.page_delay_ms)).await;
        }
    }

    info!(total = all_listings.len(), "partition walk finished");
    all_listings
}

/// Extract listings from one results table.
///
/// The first row is the header. Rows with fewer than 4 cells, or without an
/// anchor in the name column, are expected table noise and skipped silently.
fn scrape_table(table: ElementRef<'_>, site_origin: &str) -> Vec<Listing> {
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();
    let anchor_sel = Selector::parse("a").unwrap();
    let circle_sel = Selector::parse("span.catalogue__circle.-yes").unwrap();
    let key_sel = Selector::parse("span.product-catalogue__key").unwrap();

    let mut listings = Vec::new();

    for row in table.select(&tr_sel).skip(1) {
        let cols: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
        if cols.len() < 4 {
            continue;
        }

        let Some(anchor) = cols[0].select(&anchor_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let name = anchor.text().collect::<String>().trim().to_string();
        let url = format!("{site_origin}{href}");

        let mut listing = Listing::new(name, url);
        listing.remote_testing = cols[1].select(&circle_sel).next().is_some();
        listing.adaptive_irt = cols[2].select(&circle_sel).next().is_some();

        let keys: Vec<String> = cols[3]
            .select(&key_sel)
            .map(|key| key.text().collect::<String>().trim().to_string())
            .collect();
        if !keys.is_empty() {
            listing.test_type = keys.join(", ");
        }

        listings.push(listing);
    }

    listings
}
