//! Persistence and reshaping of the scraped catalog.
//!
//! - [`write_catalog`] / [`read_catalog`] — the flat CSV record set, one row
//!   per listing
//! - [`export_json`] — CSV → JSON records with list-shaped `test_type` and
//!   normalized `duration`
//! - [`map_test_types`] — CSV → CSV with an added column expanding the short
//!   category codes to their full names

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use catscout_shared::{CatscoutError, Listing, Result, TEST_TYPE_MAP, UNKNOWN};

/// Write the catalog as a flat CSV, one row per listing.
///
/// An empty catalog is a no-op, not an error: nothing is written and `Ok(0)`
/// is returned.
pub fn write_catalog(path: &Path, listings: &[Listing]) -> Result<usize> {
    if listings.is_empty() {
        info!(?path, "no listings to save, skipping write");
        return Ok(0);
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| CatscoutError::Csv(e.to_string()))?;
    for listing in listings {
        writer
            .serialize(listing)
            .map_err(|e| CatscoutError::Csv(e.to_string()))?;
    }
    writer.flush().map_err(|e| CatscoutError::io(path, e))?;

    info!(?path, count = listings.len(), "catalog written");
    Ok(listings.len())
}

/// Read a catalog CSV back into listings.
pub fn read_catalog(path: &Path) -> Result<Vec<Listing>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| CatscoutError::Csv(e.to_string()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<Listing>, _>>()
        .map_err(|e| CatscoutError::Csv(e.to_string()))
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// A listing reshaped for the JSON consumer: `test_type` becomes a list and
/// `duration` is normalized to `"<N> minutes"`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRecord {
    pub name: String,
    pub url: String,
    pub duration: String,
    pub description: String,
    pub job_levels: String,
    pub languages: String,
    pub test_type: Vec<String>,
    pub remote_testing: bool,
    pub adaptive_irt: bool,
}

impl From<&Listing> for JsonRecord {
    fn from(listing: &Listing) -> Self {
        Self {
            name: listing.name.clone(),
            url: listing.url.clone(),
            duration: normalize_duration(&listing.duration),
            description: listing.description.clone(),
            job_levels: listing.job_levels.clone(),
            languages: listing.languages.clone(),
            test_type: split_codes(&listing.test_type),
            remote_testing: listing.remote_testing,
            adaptive_irt: listing.adaptive_irt,
        }
    }
}

/// Reshape a catalog CSV into pretty-printed JSON records.
pub fn export_json(input: &Path, output: &Path) -> Result<usize> {
    let listings = read_catalog(input)?;
    let records: Vec<JsonRecord> = listings.iter().map(JsonRecord::from).collect();

    let file = std::fs::File::create(output).map_err(|e| CatscoutError::io(output, e))?;
    serde_json::to_writer_pretty(file, &records)
        .map_err(|e| CatscoutError::validation(format!("JSON write failed: {e}")))?;

    info!(?output, count = records.len(), "JSON export written");
    Ok(records.len())
}

/// Normalize any duration string to `"<digits> minutes"`, `"0 minutes"` when
/// no digits are present.
fn normalize_duration(duration: &str) -> String {
    let digits = Regex::new(r"\d+").unwrap();
    let minutes = digits.find(duration).map(|m| m.as_str()).unwrap_or("0");
    format!("{minutes} minutes")
}

fn split_codes(test_type: &str) -> Vec<String> {
    test_type
        .split(',')
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Test-type code mapping
// ---------------------------------------------------------------------------

/// A catalog row with the mapped test-type column appended.
#[derive(Debug, Serialize, Deserialize)]
pub struct MappedRecord {
    pub name: String,
    pub url: String,
    pub duration: String,
    pub description: String,
    pub job_levels: String,
    pub languages: String,
    pub test_type: String,
    pub remote_testing: bool,
    pub adaptive_irt: bool,
    pub test_type_mapped: String,
}

/// Expand a `", "`-joined code string via [`TEST_TYPE_MAP`]. Codes without a
/// mapping pass through unchanged; the sentinel maps to itself.
pub fn map_codes(test_type: &str) -> String {
    if test_type == UNKNOWN {
        return UNKNOWN.into();
    }
    split_codes(test_type)
        .iter()
        .map(|code| {
            TEST_TYPE_MAP
                .iter()
                .find(|(short, _)| short == code)
                .map(|(_, full)| (*full).to_string())
                .unwrap_or_else(|| code.clone())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rewrite a catalog CSV with a `test_type_mapped` column appended.
pub fn map_test_types(input: &Path, output: &Path) -> Result<usize> {
    let listings = read_catalog(input)?;

    let mut writer =
        csv::Writer::from_path(output).map_err(|e| CatscoutError::Csv(e.to_string()))?;
    for listing in &listings {
        let record = MappedRecord {
            name: listing.name.clone(),
            url: listing.url.clone(),
            duration: listing.duration.clone(),
            description: listing.description.clone(),
            job_levels: listing.job_levels.clone(),
            languages: listing.languages.clone(),
            test_type: listing.test_type.clone(),
            remote_testing: listing.remote_testing,
            adaptive_irt: listing.adaptive_irt,
            test_type_mapped: map_codes(&listing.test_type),
        };
        writer
            .serialize(record)
            .map_err(|e| CatscoutError::Csv(e.to_string()))?;
    }
    writer.flush().map_err(|e| CatscoutError::io(output, e))?;

    info!(?output, count = listings.len(), "mapped catalog written");
    Ok(listings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catscout_shared::DetailFields;

    fn sample_catalog() -> Vec<Listing> {
        let mut enriched = Listing::new("Verify Numerical", "https://www.shl.com/verify-numerical");
        enriched.test_type = "A, K".into();
        enriched.remote_testing = true;
        enriched.merge_details(DetailFields {
            duration: Some("25 minutes".into()),
            description: Some("Numerical reasoning under time pressure.".into()),
            job_levels: Some("Graduate".into()),
            languages: Some("English".into()),
        });

        // Second listing never got enriched.
        let bare = Listing::new("OPQ32", "https://www.shl.com/opq32");
        vec![enriched, bare]
    }

    #[test]
    fn csv_roundtrip_preserves_all_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.csv");

        let catalog = sample_catalog();
        assert_eq!(write_catalog(&path, &catalog).unwrap(), 2);

        let read_back = read_catalog(&path).unwrap();
        assert_eq!(read_back, catalog);
    }

    #[test]
    fn empty_catalog_write_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.csv");

        assert_eq!(write_catalog(&path, &[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn json_export_reshapes_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("catalog.csv");
        let json_path = dir.path().join("catalog.json");

        write_catalog(&csv_path, &sample_catalog()).unwrap();
        assert_eq!(export_json(&csv_path, &json_path).unwrap(), 2);

        let content = std::fs::read_to_string(&json_path).unwrap();
        let records: Vec<JsonRecord> = serde_json::from_str(&content).unwrap();

        assert_eq!(records[0].test_type, vec!["A", "K"]);
        assert_eq!(records[0].duration, "25 minutes");
        // The unenriched listing normalizes to zero minutes.
        assert_eq!(records[1].duration, "0 minutes");
        assert_eq!(records[1].test_type, vec![UNKNOWN.to_string()]);
    }

    #[test]
    fn code_mapping_expands_known_codes() {
        assert_eq!(map_codes("A, K"), "Ability & Aptitude, Knowledge & Skills");
        assert_eq!(map_codes("P"), "Personality & Behavior");
        // Unknown codes pass through.
        assert_eq!(map_codes("A, Z"), "Ability & Aptitude, Z");
        assert_eq!(map_codes(UNKNOWN), UNKNOWN);
    }

    #[test]
    fn mapped_csv_has_extra_column() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("catalog.csv");
        let mapped_path = dir.path().join("mapped.csv");

        write_catalog(&csv_path, &sample_catalog()).unwrap();
        assert_eq!(map_test_types(&csv_path, &mapped_path).unwrap(), 2);

        let content = std::fs::read_to_string(&mapped_path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().ends_with("test_type_mapped"));
        assert!(content.contains("Ability & Aptitude, Knowledge & Skills"));
    }

    #[test]
    fn duration_normalization() {
        assert_eq!(normalize_duration("45 minutes"), "45 minutes");
        assert_eq!(normalize_duration("Approx. 17 min"), "17 minutes");
        assert_eq!(normalize_duration(UNKNOWN), "0 minutes");
    }
}
