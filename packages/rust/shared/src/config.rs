//! Application configuration for catscout.
//!
//! Config lives in `catscout.toml` in the working directory. CLI flags
//! override config file values, which override defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatscoutError, Result};
use crate::types::CrawlPartition;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "catscout.toml";

// ---------------------------------------------------------------------------
// Config structs (matching catscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Catalog list-page URL, paginated with `start`/`type` parameters.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Origin prefix joined onto relative detail-page hrefs.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Catalog partitions to walk, in order.
    #[serde(default = "default_partitions")]
    pub partitions: Vec<CrawlPartition>,

    /// Concurrent detail-fetch workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Fixed pause between successful list-page fetches, in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            site_origin: default_site_origin(),
            partitions: default_partitions(),
            concurrency: default_concurrency(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://www.shl.com/solutions/products/product-catalog/".into()
}
fn default_site_origin() -> String {
    "https://www.shl.com".into()
}
fn default_partitions() -> Vec<CrawlPartition> {
    vec![
        CrawlPartition::new(2, 12, "Prepackaged"),
        CrawlPartition::new(1, 32, "Individual"),
    ]
}
fn default_concurrency() -> usize {
    5
}
fn default_page_delay_ms() -> u64 {
    1000
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Path of the catalog CSV written after a scrape.
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

fn default_csv_path() -> String {
    "shl_assessments.csv".into()
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Catalog list-page URL.
    pub catalog_url: String,
    /// Origin prefix for relative detail hrefs.
    pub site_origin: String,
    /// Partitions to walk, in order.
    pub partitions: Vec<CrawlPartition>,
    /// Concurrent detail-fetch workers.
    pub concurrency: usize,
    /// Pause between successful list-page fetches, in milliseconds.
    pub page_delay_ms: u64,
}

impl From<&AppConfig> for ScrapeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            catalog_url: config.crawl.catalog_url.clone(),
            site_origin: config.crawl.site_origin.clone(),
            partitions: config.crawl.partitions.clone(),
            concurrency: config.crawl.concurrency,
            page_delay_ms: config.crawl.page_delay_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from the working directory. Returns defaults
/// if `catscout.toml` does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = Path::new(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CatscoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CatscoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file to the working directory and return its path.
pub fn init_config() -> Result<std::path::PathBuf> {
    let path = std::path::PathBuf::from(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| CatscoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CatscoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("catalog_url"));
        assert!(toml_str.contains("shl_assessments.csv"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawl.concurrency, 5);
        assert_eq!(parsed.crawl.page_delay_ms, 1000);
        assert_eq!(parsed.crawl.partitions.len(), 2);
    }

    #[test]
    fn default_partitions_match_catalog_segments() {
        let partitions = default_partitions();
        assert_eq!(partitions[0].type_param, 2);
        assert_eq!(partitions[0].max_pages, 12);
        assert_eq!(partitions[0].label, "Prepackaged");
        assert_eq!(partitions[1].type_param, 1);
        assert_eq!(partitions[1].max_pages, 32);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[crawl]
concurrency = 3

[[crawl.partitions]]
type_param = 1
max_pages = 2
label = "Individual"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.concurrency, 3);
        assert_eq!(config.crawl.partitions.len(), 1);
        assert_eq!(config.crawl.site_origin, "https://www.shl.com");
        assert_eq!(config.output.csv_path, "shl_assessments.csv");
    }

    #[test]
    fn scrape_config_from_app_config() {
        let app = AppConfig::default();
        let scrape = ScrapeConfig::from(&app);
        assert_eq!(scrape.concurrency, 5);
        assert!(scrape.catalog_url.contains("product-catalog"));
    }
}
