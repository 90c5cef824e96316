//! GeoJSON feed loading.
//!
//! [`FeedClient`] fetches registry datasets from the backend and
//! [`FileDataset`] reads a collection from disk. Both implement
//! [`FeatureSource`], so views and the CLI do not care which one they get.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use shelter_map_source_models::RawFeatureCollection;

use crate::datasets::DatasetDefinition;
use crate::{FeatureSource, SourceError, retry};

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "SHELTER_MAP_API_URL";

/// Base URL used when [`API_URL_ENV`] is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Parses a GeoJSON document into a raw collection.
///
/// Features that are not objects are skipped. Features lacking geometry or
/// properties are kept.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if `text` is not JSON at all.
pub fn parse_collection(text: &str) -> Result<RawFeatureCollection, SourceError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(RawFeatureCollection::from_json_value(value))
}

/// HTTP client for the backend's GeoJSON endpoints.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    base_url: Url,
}

impl FeedClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if `base_url` is not a valid
    /// absolute URL, or [`SourceError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url).map_err(|e| SourceError::Config {
            message: format!("invalid API base URL '{base_url}': {e}"),
        })?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Creates a client from [`API_URL_ENV`], falling back to
    /// [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// See [`FeedClient::new`].
    pub fn from_env() -> Result<Self, SourceError> {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    /// The backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `dataset`, with the cache-busting parameter set to
    /// `now_ms` when the dataset asks for it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the dataset path cannot be joined
    /// onto the base URL.
    pub fn dataset_url(&self, dataset: &DatasetDefinition, now_ms: i64) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join(&dataset.path)
            .map_err(|e| SourceError::Config {
                message: format!("invalid path for dataset '{}': {e}", dataset.id),
            })?;
        if dataset.cache_bust {
            url.query_pairs_mut()
                .append_pair("_", &now_ms.to_string());
        }
        Ok(url)
    }

    /// Fetches and parses `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, a non-success status
    /// after retries, or an unparsable body.
    pub async fn fetch(&self, dataset: &DatasetDefinition) -> Result<RawFeatureCollection, SourceError> {
        let url = self.dataset_url(dataset, chrono::Utc::now().timestamp_millis())?;
        log::debug!("Fetching {} from {url}", dataset.id);

        let body = retry::send_json(|| self.client.get(url.clone())).await?;
        let collection = RawFeatureCollection::from_json_value(body);

        log::info!("{}: {} features", dataset.id, collection.len());
        Ok(collection)
    }

    /// Binds `dataset` to this client as a [`FeatureSource`].
    #[must_use]
    pub fn source(&self, dataset: DatasetDefinition) -> RemoteDataset {
        RemoteDataset {
            client: self.clone(),
            dataset,
        }
    }
}

/// A registry dataset fetched over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteDataset {
    client: FeedClient,
    dataset: DatasetDefinition,
}

#[async_trait]
impl FeatureSource for RemoteDataset {
    fn id(&self) -> &str {
        &self.dataset.id
    }

    async fn fetch(&self) -> Result<RawFeatureCollection, SourceError> {
        self.client.fetch(&self.dataset).await
    }
}

/// A GeoJSON file on disk.
#[derive(Debug, Clone)]
pub struct FileDataset {
    id: String,
    path: PathBuf,
}

impl FileDataset {
    /// Creates a source for `path`. The id is the path as given.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl FeatureSource for FileDataset {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> Result<RawFeatureCollection, SourceError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let collection = parse_collection(&text)?;
        log::info!("{}: {} features", self.id, collection.len());
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::find_dataset;

    #[test]
    fn dataset_urls_are_encoded_and_cache_busted() {
        let client = FeedClient::new("http://localhost:5000").unwrap();

        let strays = find_dataset("stray_intakes").unwrap();
        assert_eq!(
            client.dataset_url(&strays, 1_700_000_000_000).unwrap().as_str(),
            "http://localhost:5000/api/geojson/animali_randagi?_=1700000000000"
        );

        let domestic = find_dataset("owner_surrender").unwrap();
        assert_eq!(
            client.dataset_url(&domestic, 1).unwrap().as_str(),
            "http://localhost:5000/api/geojson/Animali%20Domestici.geojson"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            FeedClient::new("not a url"),
            Err(SourceError::Config { .. })
        ));
    }

    #[test]
    fn parse_collection_is_tolerant() {
        let collection = parse_collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"Animal Nam":"Rex"}},
                42,
                {"type":"Feature","geometry":{"type":"Point","coordinates":[12.5,41.9]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection.features[1].properties.is_empty());

        assert!(parse_collection(r#"{"type":"FeatureCollection","features":[]}"#).unwrap().is_empty());
        assert!(matches!(parse_collection("<html>"), Err(SourceError::Json(_))));
    }

    #[tokio::test]
    async fn file_dataset_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("shelter_map_feed_{}.geojson", std::process::id()));
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{}}]}"#,
        )
        .unwrap();

        let source = FileDataset::new(path.clone());
        let collection = source.fetch().await.unwrap();
        assert_eq!(collection.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = FileDataset::new("/definitely/not/here.geojson");
        assert!(matches!(source.fetch().await, Err(SourceError::Io(_))));
    }
}
