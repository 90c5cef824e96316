//! Feature sources named on the command line.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use shelter_map_source::datasets::find_dataset;
use shelter_map_source::feed::{FeedClient, FileDataset};
use shelter_map_source::{FeatureSource, SourceError};
use shelter_map_source_models::RawRecord;

const DATASET_PREFIX: &str = "dataset:";

/// A GeoJSON file path, or `dataset:<id>` for a backend layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Dataset(String),
}

impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix(DATASET_PREFIX) {
            if id.is_empty() {
                return Err(format!("missing dataset id after '{DATASET_PREFIX}'"));
            }
            Ok(Self::Dataset(id.to_string()))
        } else if s.is_empty() {
            Err("empty source".to_string())
        } else {
            Ok(Self::File(PathBuf::from(s)))
        }
    }
}

impl SourceSpec {
    /// # Errors
    ///
    /// * [`SourceError::Config`] for an unknown dataset id or a bad API URL
    pub fn open(&self) -> Result<Arc<dyn FeatureSource>, SourceError> {
        Ok(match self {
            Self::File(path) => Arc::new(FileDataset::new(path.clone())),
            Self::Dataset(id) => {
                let dataset = find_dataset(id)?;
                Arc::new(FeedClient::from_env()?.source(dataset))
            }
        })
    }
}

/// Fetches every feature of `spec`.
///
/// # Errors
///
/// Propagates open and fetch failures.
pub async fn fetch_features(spec: &SourceSpec) -> Result<Vec<RawRecord>, SourceError> {
    let source = spec.open()?;
    let collection = source.fetch().await?;
    log::info!("{}: {} features", source.id(), collection.len());
    Ok(collection.features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_datasets() {
        assert_eq!(
            "data/strays.geojson".parse::<SourceSpec>().unwrap(),
            SourceSpec::File(PathBuf::from("data/strays.geojson"))
        );
        assert_eq!(
            "dataset:wildlife".parse::<SourceSpec>().unwrap(),
            SourceSpec::Dataset("wildlife".to_string())
        );
        assert!("dataset:".parse::<SourceSpec>().is_err());
        assert!("  ".parse::<SourceSpec>().is_err());
    }

    #[test]
    fn unknown_dataset_fails_to_open() {
        let spec = SourceSpec::Dataset("nope".to_string());
        assert!(matches!(spec.open(), Err(SourceError::Config { .. })));
    }
}
