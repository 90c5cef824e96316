//! Semantic field table.
//!
//! Maps each [`Field`] the engine reads to the ordered list of property
//! keys it may appear under. The defaults live in `fields.toml` and are
//! baked in with [`include_str!`]; an override file only needs to list the
//! fields it changes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelter_map_source_models::Properties;
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::SourceError;
use crate::properties;

const DEFAULT_FIELDS_TOML: &str = include_str!("../fields.toml");

/// A semantic field looked up in raw property bags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// Animal name
    Name,
    /// Free-text species / animal type
    Species,
    /// Intake or sighting date
    Date,
    /// Shelter, kennel or jurisdiction
    Shelter,
    /// Recorded sex
    Sex,
    /// Intake condition
    Condition,
    /// Primary coat color
    Color,
    /// Hotspot cluster identifier
    ClusterId,
    /// Mean days before adoption for an area
    IntakeDuration,
    /// Area name on choropleth layers
    AreaName,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    #[serde(default)]
    fields: BTreeMap<Field, Vec<String>>,
}

/// Candidate-key lists for every [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTable {
    fields: BTreeMap<Field, Vec<String>>,
}

impl Default for FieldTable {
    /// Parses the embedded `fields.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time guarantee
    /// since it is embedded).
    fn default() -> Self {
        let file: FieldFile = toml::de::from_str(DEFAULT_FIELDS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse fields.toml: {e}"));
        Self {
            fields: file.fields,
        }
    }
}

impl FieldTable {
    /// Parses an override table. Fields it omits keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is malformed or names an
    /// unknown field.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SourceError> {
        let file: FieldFile = toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
            message: format!("invalid field table: {e}"),
        })?;

        let mut table = Self::default();
        for (field, candidates) in file.fields {
            log::debug!("Field table override for {field}: {candidates:?}");
            table.fields.insert(field, candidates);
        }
        Ok(table)
    }

    /// Reads an override table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Config`] if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Ordered candidate keys for `field`. Empty if the table has none.
    #[must_use]
    pub fn candidates(&self, field: Field) -> &[String] {
        self.fields
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolves `field` in a property bag.
    #[must_use]
    pub fn resolve<'a>(&self, props: &'a Properties, field: Field) -> Option<&'a Value> {
        properties::resolve(props, self.candidates(field))
    }

    /// Resolves `field` as display text.
    #[must_use]
    pub fn text(&self, props: &Properties, field: Field) -> Option<String> {
        properties::resolve_text(props, self.candidates(field))
    }

    /// Resolves `field` as a number.
    #[must_use]
    pub fn number(&self, props: &Properties, field: Field) -> Option<f64> {
        properties::resolve_number(props, self.candidates(field))
    }

    /// Fields that have no candidate keys at all.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::iter()
            .filter(|f| self.candidates(*f).is_empty())
            .collect()
    }
}
