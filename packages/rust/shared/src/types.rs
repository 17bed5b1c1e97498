//! Core domain types for the assessment catalog.

use serde::{Deserialize, Serialize};

/// Sentinel for a detail field that was never successfully populated.
pub const UNKNOWN: &str = "unknown";

/// Items per list page at the catalog source.
pub const PAGE_STRIDE: usize = 12;

/// Short test-type code → full category name, as printed in the catalog key.
pub const TEST_TYPE_MAP: &[(&str, &str)] = &[
    ("A", "Ability & Aptitude"),
    ("B", "Biodata & Situational Judgement"),
    ("C", "Competencies"),
    ("D", "Development & 360"),
    ("E", "Assessment Exercises"),
    ("K", "Knowledge & Skills"),
    ("P", "Personality & Behavior"),
    ("S", "Simulations"),
];

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One catalog entry.
///
/// `name` and `url` are populated at discovery time by the paginator and never
/// change afterwards. The four detail fields (`duration`, `description`,
/// `job_levels`, `languages`) start at [`UNKNOWN`] and are replaced in place,
/// at most once, during enrichment. A listing is never touched by more than
/// one fetch task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Product name, from the list-page anchor text.
    pub name: String,
    /// Absolute detail-page URL; unique key within a completed crawl.
    pub url: String,
    /// Assessment length, normalized to `"<N> minutes"`, or [`UNKNOWN`].
    pub duration: String,
    /// Product description, or [`UNKNOWN`].
    pub description: String,
    /// Targeted job levels, or [`UNKNOWN`].
    pub job_levels: String,
    /// Available languages, or [`UNKNOWN`].
    pub languages: String,
    /// Short category codes joined with `", "` (e.g. `"A, K"`), or [`UNKNOWN`].
    pub test_type: String,
    /// Whether the product supports remote testing.
    pub remote_testing: bool,
    /// Whether the product uses adaptive/IRT item selection.
    pub adaptive_irt: bool,
}

impl Listing {
    /// Create a listing with identity fields set and all detail fields at
    /// their sentinel.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            duration: UNKNOWN.into(),
            description: UNKNOWN.into(),
            job_levels: UNKNOWN.into(),
            languages: UNKNOWN.into(),
            test_type: UNKNOWN.into(),
            remote_testing: false,
            adaptive_irt: false,
        }
    }

    /// Merge extracted detail fields into this listing.
    ///
    /// Only fields the detail page actually supplied are replaced; absent
    /// fields keep their prior sentinel value.
    pub fn merge_details(&mut self, fields: DetailFields) {
        if let Some(duration) = fields.duration {
            self.duration = duration;
        }
        if let Some(description) = fields.description {
            self.description = description;
        }
        if let Some(job_levels) = fields.job_levels {
            self.job_levels = job_levels;
        }
        if let Some(languages) = fields.languages {
            self.languages = languages;
        }
    }
}

// ---------------------------------------------------------------------------
// CrawlPartition
// ---------------------------------------------------------------------------

/// One catalog segment to walk: which subset of the catalog to traverse,
/// how many pages at most, and a label for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPartition {
    /// Value of the `type` query parameter selecting this segment.
    pub type_param: u8,
    /// Maximum number of list pages to request.
    pub max_pages: usize,
    /// Human-readable label used in log lines.
    pub label: String,
}

impl CrawlPartition {
    pub fn new(type_param: u8, max_pages: usize, label: impl Into<String>) -> Self {
        Self {
            type_param,
            max_pages,
            label: label.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DetailFields / FetchOutcome
// ---------------------------------------------------------------------------

/// Fields extracted from one detail page. `None` means the page did not
/// supply that label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub duration: Option<String>,
    pub description: Option<String>,
    pub job_levels: Option<String>,
    pub languages: Option<String>,
}

/// Transient result of one detail fetch. Consumed immediately by the merge
/// step, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The detail page was fetched and scanned; zero or more fields found.
    Fetched(DetailFields),
    /// Transport or parse failure; the source listing stays unmodified.
    Failed,
}
