//! End-to-end catalog pipeline: partitions → paginate → concatenate → enrich.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use catscout_crawler::{HttpFetcher, build_client, enrich, paginate};
use catscout_shared::{Listing, Result, ScrapeConfig};

/// Result of one full catalog scrape.
#[derive(Debug)]
pub struct ScrapeRunResult {
    /// The enriched catalog, in discovery order. May contain duplicate URLs
    /// if a product appears in more than one partition; that is accepted,
    /// not reconciled.
    pub listings: Vec<Listing>,
    /// Listings found per partition, in walk order.
    pub partition_counts: Vec<(String, usize)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each partition's list pages have been walked.
    fn partition_scraped(&self, label: &str, count: usize);
    /// Called on coarse enrichment progress (`completed / total`).
    fn enriched(&self, done: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ScrapeRunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn partition_scraped(&self, _label: &str, _count: usize) {}
    fn enriched(&self, _done: usize, _total: usize) {}
    fn done(&self, _result: &ScrapeRunResult) {}
}

/// Bridges the crawler's enrichment progress onto the pipeline reporter.
struct EnrichForward(Arc<dyn ProgressReporter>);

impl catscout_crawler::EnrichProgress for EnrichForward {
    fn completed(&self, done: usize, total: usize) {
        self.0.enriched(done, total);
    }
}

/// Run the full catalog scrape.
///
/// Walks every configured partition in order, concatenates the partial
/// listings without deduplication, and enriches the union with the
/// configured concurrency. Early pagination stops have already been absorbed
/// by the paginator, so the only fatal failure left at this level is
/// orchestration itself (e.g. the HTTP client refusing to build).
#[instrument(skip_all)]
pub async fn scrape_catalog(
    config: &ScrapeConfig,
    progress: Arc<dyn ProgressReporter>,
) -> Result<ScrapeRunResult> {
    let start = Instant::now();
    let client = build_client()?;

    let mut all_listings: Vec<Listing> = Vec::new();
    let mut partition_counts = Vec::with_capacity(config.partitions.len());

    for partition in &config.partitions {
        progress.phase(&format!("Scraping {} solutions", partition.label));
        let listings = paginate(&client, partition, config).await;
        info!(
            partition = %partition.label,
            count = listings.len(),
            "partition scraped"
        );
        progress.partition_scraped(&partition.label, listings.len());
        partition_counts.push((partition.label.clone(), listings.len()));
        all_listings.extend(listings);
    }

    progress.phase("Fetching assessment details");
    let fetcher = Arc::new(HttpFetcher::new(client));
    let forward = Arc::new(EnrichForward(Arc::clone(&progress)));
    let listings = enrich(fetcher, all_listings, config.concurrency, forward).await;

    let result = ScrapeRunResult {
        listings,
        partition_counts,
        elapsed: start.elapsed(),
    };

    info!(
        listings = result.listings.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "catalog scrape completed"
    );
    progress.done(&result);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catscout_shared::{CrawlPartition, UNKNOWN};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn list_page(rows: &str) -> String {
        format!("<html><body><table><tr><th>h</th></tr>{rows}</table></body></html>")
    }

    fn row(name: &str, href: &str) -> String {
        format!(
            r#"<tr><td><a href="{href}">{name}</a></td><td><span class="catalogue__circle -yes"></span></td><td></td><td><span class="product-catalogue__key">A</span></td></tr>"#
        )
    }

    fn detail_page(description: &str, minutes: u32) -> String {
        format!(
            r#"<html><body>
            <div class="product-catalogue-training-calendar__row"><h4>Description</h4><p>{description}</p></div>
            <div class="product-catalogue-training-calendar__row"><h4>Assessment length</h4><p>Approx. {minutes} minutes to complete</p></div>
            </body></html>"#
        )
    }

    async fn mount_list(server: &MockServer, start: usize, type_param: u8, body: String) {
        Mock::given(method("GET"))
            .and(path("/catalog/"))
            .and(query_param("start", start.to_string()))
            .and(query_param("type", type_param.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn test_config(server: &MockServer) -> ScrapeConfig {
        ScrapeConfig {
            catalog_url: format!("{}/catalog/", server.uri()),
            site_origin: server.uri(),
            partitions: vec![
                CrawlPartition::new(2, 2, "Prepackaged"),
                CrawlPartition::new(1, 2, "Individual"),
            ],
            concurrency: 3,
            page_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn scrapes_both_partitions_and_enriches() {
        let server = MockServer::start().await;

        mount_list(&server, 0, 2, list_page(&row("Pack A", "/view/pack-a"))).await;
        mount_list(&server, 12, 2, list_page("")).await;
        mount_list(&server, 0, 1, list_page(&row("Solo B", "/view/solo-b"))).await;
        mount_list(&server, 12, 1, list_page("")).await;

        Mock::given(method("GET"))
            .and(path("/view/pack-a"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(detail_page("Bundled solution.", 30)),
            )
            .mount(&server)
            .await;
        // Solo B's detail page fails: its listing must survive unenriched.
        Mock::given(method("GET"))
            .and(path("/view/solo-b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = scrape_catalog(&test_config(&server), Arc::new(SilentProgress))
            .await
            .expect("pipeline should not fail");

        assert_eq!(result.listings.len(), 2);
        assert_eq!(
            result.partition_counts,
            vec![("Prepackaged".to_string(), 1), ("Individual".to_string(), 1)]
        );

        let pack = &result.listings[0];
        assert_eq!(pack.name, "Pack A");
        assert_eq!(pack.description, "Bundled solution.");
        assert_eq!(pack.duration, "30 minutes");
        assert!(pack.remote_testing);

        let solo = &result.listings[1];
        assert_eq!(solo.name, "Solo B");
        assert_eq!(solo.url, format!("{}/view/solo-b", server.uri()));
        assert_eq!(solo.description, UNKNOWN);
        assert_eq!(solo.duration, UNKNOWN);
    }

    #[tokio::test]
    async fn empty_catalog_completes_with_no_listings() {
        let server = MockServer::start().await;
        // Every list page 404s: both partitions stop on their first request.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = scrape_catalog(&test_config(&server), Arc::new(SilentProgress))
            .await
            .expect("early stops are not run-level errors");

        assert!(result.listings.is_empty());
        assert_eq!(
            result.partition_counts,
            vec![("Prepackaged".to_string(), 0), ("Individual".to_string(), 0)]
        );
    }
}
