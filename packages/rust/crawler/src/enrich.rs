//! Bounded-concurrency enrichment coordinator.
//!
//! A fixed pool of worker tasks drains a bounded queue of one fetch job per
//! input listing and merges each result back into its source listing as it
//! completes. Each listing is exclusively owned by the one task fetching it,
//! so no locking is needed around the merge; the only shared state is the
//! atomic completion counter behind progress reporting.
//!
//! Failure of one fetch degrades that one listing to its sentinel fields and
//! never propagates. There is no retry and no circuit-breaker.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use catscout_shared::{FetchOutcome, Listing};

/// A progress line is emitted after every this-many completions.
pub const PROGRESS_EVERY: usize = 10;

/// Boundary between the coordinator and whatever fetches one listing's
/// details. The production implementation is
/// [`HttpFetcher`](crate::detail::HttpFetcher); tests substitute instrumented
/// fetchers to observe concurrency.
pub trait DetailFetcher: Send + Sync + 'static {
    /// Fetch detail fields for one listing. Must not panic; failures are
    /// reported as [`FetchOutcome::Failed`].
    fn fetch(&self, listing: &Listing) -> impl Future<Output = FetchOutcome> + Send;
}

/// Observer for coarse enrichment progress (`completed / total`).
///
/// This is an observability signal only; correctness never depends on it.
pub trait EnrichProgress: Send + Sync {
    fn completed(&self, done: usize, total: usize);
}

/// No-op progress observer for headless/test usage.
pub struct SilentEnrich;

impl EnrichProgress for SilentEnrich {
    fn completed(&self, _done: usize, _total: usize) {}
}

/// Enrich every listing by fanning detail fetches out to `concurrency`
/// workers.
///
/// The returned collection has the same length as the input and contains
/// every input listing exactly once, in input order. Listings whose fetch
/// failed come back with their sentinel fields intact. An empty input
/// returns immediately without starting a worker.
pub async fn enrich<F: DetailFetcher>(
    fetcher: Arc<F>,
    listings: Vec<Listing>,
    concurrency: usize,
    progress: Arc<dyn EnrichProgress>,
) -> Vec<Listing> {
    let total = listings.len();
    if total == 0 {
        return listings;
    }
    let workers = concurrency.max(1).min(total);

    info!(total, workers, "starting enrichment");

    // Bounded job queue: a saturated pool backpressures the feeder instead
    // of buffering every job at once.
    let (job_tx, job_rx) = mpsc::channel::<(usize, Listing)>(workers);
    let (result_tx, mut result_rx) = mpsc::channel::<(usize, Listing)>(workers);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let fetcher = Arc::clone(&fetcher);
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let completed = Arc::clone(&completed);
        let progress = Arc::clone(&progress);

        handles.push(tokio::spawn(async move {
            loop {
                // Hold the queue lock only while dequeuing, never across a fetch.
                let job = { job_rx.lock().await.recv().await };
                let Some((index, mut listing)) = job else {
                    debug!(worker_id, "job queue drained, worker exiting");
                    break;
                };

                if let FetchOutcome::Fetched(fields) = fetcher.fetch(&listing).await {
                    listing.merge_details(fields);
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if done % PROGRESS_EVERY == 0 || done == total {
                    info!(completed = done, total, "enrichment progress");
                    progress.completed(done, total);
                }

                if result_tx.send((index, listing)).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let feeder = tokio::spawn(async move {
        for job in listings.into_iter().enumerate() {
            if job_tx.send(job).await.is_err() {
                break;
            }
        }
    });

    // Merge completions back by origin index, independent of completion order.
    let mut slots: Vec<Option<Listing>> = (0..total).map(|_| None).collect();
    while let Some((index, listing)) = result_rx.recv().await {
        slots[index] = Some(listing);
    }

    let _ = feeder.await;
    for handle in handles {
        let _ = handle.await;
    }

    info!(total, "enrichment finished");
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use catscout_shared::{DetailFields, UNKNOWN};

    fn listings(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| Listing::new(format!("Test {i}"), format!("https://example.com/{i}")))
            .collect()
    }

    /// Fetcher that resolves every listing to a fixed description.
    struct FixedFetcher;

    impl DetailFetcher for FixedFetcher {
        fn fetch(&self, listing: &Listing) -> impl Future<Output = FetchOutcome> + Send {
            let url = listing.url.clone();
            async move {
                FetchOutcome::Fetched(DetailFields {
                    description: Some(format!("details for {url}")),
                    ..Default::default()
                })
            }
        }
    }

    /// Fetcher that fails for every odd-numbered listing.
    struct OddFailFetcher;

    impl DetailFetcher for OddFailFetcher {
        fn fetch(&self, listing: &Listing) -> impl Future<Output = FetchOutcome> + Send {
            let odd = listing.url.ends_with(['1', '3', '5', '7', '9']);
            async move {
                if odd {
                    FetchOutcome::Failed
                } else {
                    FetchOutcome::Fetched(DetailFields {
                        duration: Some("10 minutes".into()),
                        ..Default::default()
                    })
                }
            }
        }
    }

    /// Fetcher that tracks how many fetches are in flight at once.
    struct CountingFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl DetailFetcher for CountingFetcher {
        fn fetch(&self, _listing: &Listing) -> impl Future<Output = FetchOutcome> + Send {
            async {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                FetchOutcome::Fetched(DetailFields::default())
            }
        }
    }

    #[tokio::test]
    async fn every_listing_comes_back_exactly_once_in_order() {
        let input = listings(23);
        let output = enrich(Arc::new(FixedFetcher), input.clone(), 4, Arc::new(SilentEnrich)).await;

        assert_eq!(output.len(), input.len());
        for (i, listing) in output.iter().enumerate() {
            assert_eq!(listing.url, input[i].url);
            assert_eq!(listing.name, input[i].name);
            assert_eq!(listing.description, format!("details for {}", listing.url));
        }
    }

    #[tokio::test]
    async fn failed_fetches_keep_sentinels_and_are_not_dropped() {
        let output = enrich(Arc::new(OddFailFetcher), listings(10), 3, Arc::new(SilentEnrich)).await;

        assert_eq!(output.len(), 10);
        for (i, listing) in output.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(listing.duration, "10 minutes");
            } else {
                assert_eq!(listing.duration, UNKNOWN);
                assert_eq!(listing.description, UNKNOWN);
            }
        }
    }

    #[tokio::test]
    async fn in_flight_fetches_never_exceed_concurrency() {
        let fetcher = Arc::new(CountingFetcher::new());
        let output = enrich(Arc::clone(&fetcher), listings(40), 5, Arc::new(SilentEnrich)).await;

        assert_eq!(output.len(), 40);
        let peak = fetcher.peak.load(Ordering::SeqCst);
        assert!(peak <= 5, "peak in-flight fetches was {peak}");
        assert!(peak >= 2, "expected some parallelism, peak was {peak}");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let output = enrich(Arc::new(FixedFetcher), Vec::new(), 5, Arc::new(SilentEnrich)).await;
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn progress_fires_on_every_tenth_and_final_completion() {
        struct Recording(std::sync::Mutex<Vec<usize>>);
        impl EnrichProgress for Recording {
            fn completed(&self, done: usize, _total: usize) {
                self.0.lock().unwrap().push(done);
            }
        }

        let progress = Arc::new(Recording(std::sync::Mutex::new(Vec::new())));
        enrich(Arc::new(FixedFetcher), listings(25), 3, Arc::clone(&progress) as Arc<dyn EnrichProgress>).await;

        let mut seen = progress.0.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![10, 20, 25]);
    }
}
