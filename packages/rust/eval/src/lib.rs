//! Recall/precision scoring of a recommender over the scraped catalog.
//!
//! The recommender itself is a black box behind the [`Recommender`] trait:
//! given a free-text query it returns a ranked list of catalog URLs. This
//! crate only measures how well those rankings recover known-relevant
//! listings.

use tracing::info;

use catscout_shared::{Listing, UNKNOWN};

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Catalog URL of the recommended listing.
    pub url: String,
}

/// Black-box ranking capability under evaluation.
pub trait Recommender {
    /// Return up to `top_k` recommendations for `query`, best first.
    fn recommend(&self, query: &str, top_k: usize) -> Vec<Recommendation>;
}

/// A single evaluation sample: a query and the URLs considered relevant.
#[derive(Debug, Clone)]
pub struct TestQuery {
    pub query: String,
    pub relevant_urls: Vec<String>,
}

/// Per-query and aggregate evaluation scores.
#[derive(Debug)]
pub struct EvalSummary {
    /// `(recall@k, ap@k)` per query, in input order.
    pub per_query: Vec<(f64, f64)>,
    pub mean_recall: f64,
    pub mean_ap: f64,
    pub k: usize,
}

/// Fraction of the relevant set recovered in the top `k` predictions.
/// An empty relevant set scores 0.0.
pub fn recall_at_k(relevant: &[String], predicted: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let top_k = &predicted[..predicted.len().min(k)];
    let hits = relevant.iter().filter(|url| top_k.contains(url)).count();
    hits as f64 / relevant.len() as f64
}

/// Average precision over the top `k` predictions, normalized by
/// `min(|relevant|, k)`. An empty relevant set scores 0.0.
pub fn average_precision_at_k(relevant: &[String], predicted: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut score = 0.0;
    for (i, prediction) in predicted.iter().take(k).enumerate() {
        if relevant.contains(prediction) {
            hits += 1;
            score += hits as f64 / (i + 1) as f64;
        }
    }
    score / relevant.len().min(k) as f64
}

/// Build self-retrieval test queries from the catalog: each eligible
/// listing's description queries for its own URL. Listings whose description
/// or url never got populated are skipped. Takes the first `n` eligible
/// listings, which keeps the evaluation deterministic across runs.
pub fn build_test_queries(catalog: &[Listing], n: usize) -> Vec<TestQuery> {
    catalog
        .iter()
        .filter(|listing| listing.description != UNKNOWN && !listing.url.is_empty())
        .take(n)
        .map(|listing| TestQuery {
            query: listing.description.clone(),
            relevant_urls: vec![listing.url.clone()],
        })
        .collect()
}

/// Score `recommender` over `queries` at cutoff `k`.
pub fn evaluate<R: Recommender>(recommender: &R, queries: &[TestQuery], k: usize) -> EvalSummary {
    let mut per_query = Vec::with_capacity(queries.len());

    for sample in queries {
        let predicted: Vec<String> = recommender
            .recommend(&sample.query, k)
            .into_iter()
            .map(|rec| rec.url)
            .collect();

        let recall = recall_at_k(&sample.relevant_urls, &predicted, k);
        let ap = average_precision_at_k(&sample.relevant_urls, &predicted, k);

        info!(
            query = %truncate(&sample.query, 80),
            recall, ap, k,
            "query scored"
        );
        per_query.push((recall, ap));
    }

    let count = per_query.len().max(1) as f64;
    let summary = EvalSummary {
        mean_recall: per_query.iter().map(|(r, _)| r).sum::<f64>() / count,
        mean_ap: per_query.iter().map(|(_, a)| a).sum::<f64>() / count,
        per_query,
        k,
    };

    info!(
        mean_recall = summary.mean_recall,
        mean_ap = summary.mean_ap,
        k,
        "evaluation finished"
    );
    summary
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
