//! Catalog pipeline orchestration for catscout.

pub mod pipeline;

pub use pipeline::{ProgressReporter, ScrapeRunResult, SilentProgress, scrape_catalog};
