//! Single detail-page fetch and labeled-section field extraction.
//!
//! A detail page carries a series of labeled sections (heading + body). The
//! label-to-field mapping is a data-driven rule table so it can be tested in
//! isolation from document traversal. Any transport or parse failure is
//! absorbed here: the caller gets [`FetchOutcome::Failed`] and the source
//! listing keeps its sentinel fields.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use catscout_shared::{CatscoutError, DetailFields, FetchOutcome, Listing, Result};

/// Which listing field a matched section populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    Description,
    JobLevels,
    Languages,
    AssessmentLength,
}

/// Ordered extraction rules: a section heading is classified by the first
/// rule whose label it contains (case-insensitive).
const EXTRACTION_RULES: &[(&str, DetailField)] = &[
    ("description", DetailField::Description),
    ("job levels", DetailField::JobLevels),
    ("languages", DetailField::Languages),
    ("assessment length", DetailField::AssessmentLength),
];

/// Fetch and extract detail fields for one listing.
///
/// Never fails past this boundary: on any error a diagnostic naming the url
/// is logged and [`FetchOutcome::Failed`] is returned.
pub async fn fetch_details(client: &Client, listing: &Listing) -> FetchOutcome {
    match try_fetch(client, &listing.url).await {
        Ok(fields) => {
            debug!(url = %listing.url, "detail page scanned");
            FetchOutcome::Fetched(fields)
        }
        Err(e) => {
            warn!(url = %listing.url, error = %e, "detail fetch failed");
            FetchOutcome::Failed
        }
    }
}

async fn try_fetch(client: &Client, url: &str) -> Result<DetailFields> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatscoutError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatscoutError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CatscoutError::Network(format!("{url}: body read failed: {e}")))?;

    let doc = Html::parse_document(&body);
    Ok(extract_detail_fields(&doc))
}

/// Scan a detail document's labeled sections and apply the extraction rules.
///
/// A document may supply zero, some, or all labels; unmatched sections are
/// ignored and absent labels leave the corresponding field `None`.
pub fn extract_detail_fields(doc: &Html) -> DetailFields {
    let section_sel = Selector::parse("div.product-catalogue-training-calendar__row").unwrap();
    let heading_sel = Selector::parse("h4").unwrap();
    let body_sel = Selector::parse("p").unwrap();

    let mut fields = DetailFields::default();

    for section in doc.select(&section_sel) {
        let Some(heading) = section.select(&heading_sel).next() else {
            continue;
        };
        let Some(body) = section.select(&body_sel).next() else {
            continue;
        };

        let heading_text = heading.text().collect::<String>().trim().to_lowercase();
        let body_text = body.text().collect::<String>().trim().to_string();

        for (label, field) in EXTRACTION_RULES {
            if heading_text.contains(label) {
                apply_rule(&mut fields, *field, &body_text);
                break;
            }
        }
    }

    fields
}

fn apply_rule(fields: &mut DetailFields, field: DetailField, body: &str) {
    match field {
        DetailField::Description => fields.description = Some(body.to_string()),
        DetailField::JobLevels => fields.job_levels = Some(body.to_string()),
        DetailField::Languages => fields.languages = Some(body.to_string()),
        DetailField::AssessmentLength => {
            if let Some(minutes) = first_integer(body) {
                fields.duration = Some(format!("{minutes} minutes"));
            }
        }
    }
}

/// First embedded integer in a string, e.g. "Approx. 45 minutes" → "45".
fn first_integer(text: &str) -> Option<&str> {
    let digits = Regex::new(r"\d+").unwrap();
    digits.find(text).map(|m| m.as_str())
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`crate::enrich::DetailFetcher`] backed by the real HTTP client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl crate::enrich::DetailFetcher for HttpFetcher {
    fn fetch(&self, listing: &Listing) -> impl Future<Output = FetchOutcome> + Send {
        fetch_details(&self.client, listing)
    }
}
