#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the analytics engine.
//!
//! Rendering collaborators (map layers, tables, charts) consume these
//! directly, so every type serializes with camelCase field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shelter_map_animal_models::{AdoptionDifficulty, Palette, Sex, SpeciesKey};
use shelter_map_source_models::{LatLon, MonthKey, ResolvedRecord, ShelterSite};
use strum_macros::{AsRefStr, Display, EnumString};

/// Outcome of a two-category density comparison.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Nothing of either category in range.
    NoActivity,
    /// Category A outnumbers B by more than the dominance ratio.
    DominantA,
    /// Category B outnumbers A by more than the dominance ratio.
    DominantB,
    /// Mixed, contested zone.
    Conflict,
}

impl Verdict {
    /// Badge color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::NoActivity => "#333333",
            Self::DominantA => "#ff7b7b",
            Self::DominantB => "#7bdcff",
            Self::Conflict => "#8e44ad",
        }
    }

    /// Italian badge text for the domestic (A) vs wildlife (B) comparison.
    #[must_use]
    pub const fn label_it(self) -> &'static str {
        match self {
            Self::NoActivity => "Nessuna attività rilevata",
            Self::DominantA => "Prevalenza: owner surrender",
            Self::DominantB => "Prevalenza: fauna selvatica",
            Self::Conflict => "Zona di conflitto",
        }
    }
}

/// Counts and verdict for one radar query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarReading {
    /// Category A records within the radius.
    pub count_a: usize,
    /// Category B records within the radius.
    pub count_b: usize,
    /// Classification of the pair.
    #[serde(rename = "classification")]
    pub verdict: Verdict,
}

/// Per-species record counts. Always lists all five keys, in canonical
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesTally(BTreeMap<SpeciesKey, usize>);

impl Default for SpeciesTally {
    fn default() -> Self {
        Self(SpeciesKey::all().iter().map(|key| (*key, 0)).collect())
    }
}

impl SpeciesTally {
    /// Counts one record of `key`.
    pub fn add(&mut self, key: SpeciesKey) {
        *self.0.entry(key).or_default() += 1;
    }

    /// Count for `key`.
    #[must_use]
    pub fn get(&self, key: SpeciesKey) -> usize {
        self.0.get(&key).copied().unwrap_or_default()
    }

    /// Sum over every key.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// `(key, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SpeciesKey, usize)> + '_ {
        self.0.iter().map(|(key, count)| (*key, *count))
    }
}

impl<'a> FromIterator<&'a ResolvedRecord> for SpeciesTally {
    fn from_iter<I: IntoIterator<Item = &'a ResolvedRecord>>(iter: I) -> Self {
        let mut tally = Self::default();
        for record in iter {
            tally.add(record.species_key);
        }
        tally
    }
}

/// Male / female / unknown counts for the sex pie chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SexTally {
    /// Male records.
    pub male: usize,
    /// Female records.
    pub female: usize,
    /// Records with missing or unrecognised sex.
    pub unknown: usize,
}

impl SexTally {
    /// Counts one record.
    pub const fn add(&mut self, sex: Sex) {
        match sex {
            Sex::Male => self.male += 1,
            Sex::Female => self.female += 1,
            Sex::Unknown => self.unknown += 1,
        }
    }

    /// Sum of all three counts.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.male + self.female + self.unknown
    }
}

impl<'a> FromIterator<&'a ResolvedRecord> for SexTally {
    fn from_iter<I: IntoIterator<Item = &'a ResolvedRecord>>(iter: I) -> Self {
        let mut tally = Self::default();
        for record in iter {
            tally.add(record.sex);
        }
        tally
    }
}

/// What a view shows for one month: the deduplicated records plus the
/// derived tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketView {
    /// Position of the bucket in the sorted key list.
    pub index: usize,
    /// Bucket key.
    pub month_key: MonthKey,
    /// Display label, e.g. `"Maggio 2023"`.
    pub label: String,
    /// Records, first-seen duplicates removed.
    pub records: Vec<ResolvedRecord>,
    /// Species counts over `records`.
    pub species: SpeciesTally,
    /// Sex counts over `records`.
    pub sex: SexTally,
}

impl BucketView {
    /// Builds the view, computing the tallies from `records`.
    #[must_use]
    pub fn new(index: usize, month_key: MonthKey, records: Vec<ResolvedRecord>) -> Self {
        let species = records.iter().collect();
        let sex = records.iter().collect();
        Self {
            index,
            label: month_key.label_it(),
            month_key,
            records,
            species,
            sex,
        }
    }
}

/// The closest shelter to a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestShelter {
    /// The shelter.
    pub site: ShelterSite,
    /// Great-circle distance in km, rounded to two decimals.
    pub distance_km: f64,
}

/// An area on the adoption-difficulty choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyZone {
    /// Area name, `"Zona"` when missing.
    pub name: String,
    /// Mean stay before adoption, rounded to whole days.
    pub days: i64,
    /// Band for the unrounded mean.
    pub difficulty: AdoptionDifficulty,
}

/// A disease hotspot centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSite {
    /// Display title.
    pub label: String,
    /// Source cluster id, if the feature carried one.
    pub cluster_id: Option<String>,
    /// Centre.
    pub location: LatLon,
}

/// A sick animal shown around hotspots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SickAnimal {
    /// Position.
    pub location: LatLon,
    /// Canonical species.
    pub species_key: SpeciesKey,
    /// Raw species string.
    pub display_label: String,
    /// Name or placeholder.
    pub name: String,
    /// Intake condition or placeholder.
    pub condition: String,
    /// Primary color or placeholder.
    pub color: String,
}

/// One row of a species legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Species.
    pub key: SpeciesKey,
    /// Italian label.
    pub label: &'static str,
    /// Marker colors.
    pub palette: Palette,
    /// Markers of this species.
    pub count: usize,
    /// Whether markers of this species are shown.
    pub visible: bool,
}
