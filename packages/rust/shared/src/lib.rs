//! Shared types, error model, and configuration for catscout.
//!
//! This crate is the foundation depended on by all other catscout crates.
//! It provides:
//! - [`CatscoutError`] — the unified error type
//! - Domain types ([`Listing`], [`CrawlPartition`], [`DetailFields`], [`FetchOutcome`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, CrawlSection, OutputSection, ScrapeConfig, init_config,
    load_config, load_config_from,
};
pub use error::{CatscoutError, Result};
pub use types::{
    CrawlPartition, DetailFields, FetchOutcome, Listing, PAGE_STRIDE, TEST_TYPE_MAP, UNKNOWN,
};
