#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw feature bags and the resolved record format.
//!
//! Every dataset the backend serves is a GeoJSON `FeatureCollection` whose
//! property names vary by source file. [`RawRecord`] keeps that bag exactly
//! as received; [`ResolvedRecord`] is the typed view the analytics engine
//! derives from it.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shelter_map_animal_models::{Sex, SpeciesKey};

/// Property bag of a GeoJSON feature.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A WGS84 position in `(lat, lon)` order.
///
/// Only constructible with in-range, finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, `-90..=90`.
    pub lat: f64,
    /// Longitude in degrees, `-180..=180`.
    pub lon: f64,
}

impl LatLon {
    /// Builds a position, rejecting non-finite or out-of-range values.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// An externally supplied feature: arbitrary geometry plus an unordered
/// property bag. Never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// The raw `geometry` member, `None` when absent or `null`.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    /// The `properties` member; `null` or missing becomes an empty bag.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

/// The features of a GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureCollection {
    /// Features in document order.
    #[serde(default)]
    pub features: Vec<RawRecord>,
}

impl RawFeatureCollection {
    /// Builds a collection from an arbitrary JSON document.
    ///
    /// Entries of `features` that are not objects, or whose members have
    /// the wrong shape, are skipped rather than failing the whole document.
    #[must_use]
    pub fn from_json_value(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut root) = value else {
            return Self::default();
        };
        let Some(serde_json::Value::Array(items)) = root.remove("features") else {
            return Self::default();
        };

        let features = items
            .into_iter()
            .filter(serde_json::Value::is_object)
            .filter_map(|item| serde_json::from_value::<RawRecord>(item).ok())
            .collect();

        Self { features }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Composite identity used to detect duplicate real-world records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wraps an already-normalized identity string.
    #[must_use]
    pub const fn from_normalized(value: String) -> Self {
        Self(value)
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const MONTHS_IT: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Year-month bucket key: `"YYYY-MM"`, or [`MonthKey::UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Key for records whose date could not be parsed.
    pub const UNKNOWN: &'static str = "Unknown";

    /// Builds the key for a UTC instant.
    #[must_use]
    pub fn from_date(date: DateTime<Utc>) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// The `"Unknown"` key.
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Wraps an arbitrary key. Empty strings become [`Self::UNKNOWN`].
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::unknown()
        } else {
            Self(value)
        }
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `"Unknown"` bucket.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Whether the key has the exact `YYYY-MM` shape (four digits, dash,
    /// two digits).
    #[must_use]
    pub fn is_conforming(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit)
    }

    /// Italian display label, e.g. `"Maggio 2023"`.
    #[must_use]
    pub fn label_it(&self) -> String {
        if self.is_unknown() {
            return "Data Sconosciuta".to_string();
        }
        if self.is_conforming()
            && let Ok(month) = self.0[5..].parse::<usize>()
            && (1..=12).contains(&month)
        {
            return format!("{} {}", MONTHS_IT[month - 1], &self.0[..4]);
        }
        self.0.clone()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed view of a [`RawRecord`] after property, geometry, taxonomy and
/// date resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    /// Representative point; `None` when the geometry is unusable.
    pub coordinates: Option<LatLon>,
    /// Canonical species bucket.
    pub species_key: SpeciesKey,
    /// The raw species string, un-normalized.
    pub display_label: String,
    /// Year-month bucket.
    pub month_key: MonthKey,
    /// Deduplication identity.
    pub identity_key: IdentityKey,
    /// Animal name, or a placeholder.
    pub name: String,
    /// Shelter name, or a placeholder.
    pub shelter: String,
    /// Collapsed sex.
    pub sex: Sex,
    /// Date text exactly as found in the properties.
    pub raw_date: Option<String>,
    /// Parsed date.
    pub date: Option<DateTime<Utc>>,
    /// Source feature, kept for debugging only.
    #[serde(skip)]
    pub raw: RawRecord,
}

/// A shelter location from the shelters table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterSite {
    /// Shelter name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Position.
    pub location: LatLon,
}
