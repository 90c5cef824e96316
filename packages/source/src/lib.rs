#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shelter feed access and tolerant field resolution.
//!
//! The backend serves GeoJSON layers whose property names differ by
//! source file (truncated shapefile columns, mixed casing, Italian
//! labels). This crate turns those bags into typed values: property
//! lookup via candidate-key lists, a representative point per geometry,
//! and the species taxonomy. Each layer is reachable through the
//! [`FeatureSource`] trait, over HTTP or from a local file.

pub mod datasets;
pub mod feed;
pub mod fields;
pub mod geometry;
pub mod parsing;
pub mod properties;
pub mod retry;
pub mod shelters;
pub mod type_mapping;

use async_trait::async_trait;
use shelter_map_source_models::RawFeatureCollection;

/// Errors that can occur while loading feeds or configuration.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (field table, dataset registry, base URL).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Anything that can produce a raw feature collection.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Returns an identifier for logs (dataset id or file path).
    fn id(&self) -> &str;

    /// Loads the full collection.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the transport or the document fails.
    /// A well-formed but empty collection is not an error.
    async fn fetch(&self) -> Result<RawFeatureCollection, SourceError>;
}
