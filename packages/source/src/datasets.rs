//! Dataset registry, loaded from the embedded `datasets.toml`.
//!
//! Each entry is one GeoJSON layer the backend serves. Adding a layer means
//! adding a `[[dataset]]` table; nothing else needs to change.

use serde::{Deserialize, Serialize};

use crate::SourceError;

const DATASETS_TOML: &str = include_str!("../datasets.toml");

/// A backend GeoJSON layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Stable identifier used on the command line.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Endpoint path relative to the API base URL.
    pub path: String,
    /// Append a `_=<epoch ms>` query parameter so caches are bypassed.
    #[serde(default)]
    pub cache_bust: bool,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default, rename = "dataset")]
    datasets: Vec<DatasetDefinition>,
}

/// Parses a registry document.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed.
pub fn parse_datasets_toml(toml_str: &str) -> Result<Vec<DatasetDefinition>, SourceError> {
    let file: DatasetFile = toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
        message: format!("invalid dataset registry: {e}"),
    })?;
    Ok(file.datasets)
}

/// Returns every configured dataset in registry order.
///
/// # Panics
///
/// Panics if the embedded registry is malformed (this is a compile-time
/// guarantee since the file is embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    parse_datasets_toml(DATASETS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse datasets.toml: {e}"))
}

/// Looks up a dataset by id.
///
/// # Errors
///
/// Returns [`SourceError::Config`] listing the known ids when `id` is not
/// configured.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    let datasets = all_datasets();
    if let Some(found) = datasets.iter().find(|d| d.id == id) {
        return Ok(found.clone());
    }
    let known: Vec<&str> = datasets.iter().map(|d| d.id.as_str()).collect();
    Err(SourceError::Config {
        message: format!("unknown dataset '{id}' (known: {})", known.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_DATASET_COUNT: usize = 7;

    #[test]
    fn loads_all_datasets() {
        assert_eq!(all_datasets().len(), EXPECTED_DATASET_COUNT);
    }

    #[test]
    fn dataset_ids_are_unique() {
        let datasets = all_datasets();
        let mut ids: Vec<&str> = datasets.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_DATASET_COUNT);
    }

    #[test]
    fn all_paths_are_absolute() {
        for dataset in &all_datasets() {
            assert!(dataset.path.starts_with('/'), "{}: relative path", dataset.id);
            assert!(!dataset.name.is_empty(), "{}: empty name", dataset.id);
        }
    }

    #[test]
    fn only_stray_intakes_bust_the_cache() {
        let busting: Vec<String> = all_datasets()
            .into_iter()
            .filter(|d| d.cache_bust)
            .map(|d| d.id)
            .collect();
        assert_eq!(busting, ["stray_intakes"]);
    }

    #[test]
    fn unknown_dataset_lists_known_ids() {
        let err = find_dataset("nope").unwrap_err();
        let SourceError::Config { message } = err else {
            panic!("expected config error");
        };
        assert!(message.contains("stray_intakes"));
        assert_eq!(find_dataset("red_zones").unwrap().path, "/api/geojson/zone_rosse");
    }
}
