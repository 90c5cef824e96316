#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical animal taxonomy and static display configuration.
//!
//! Every free-text species string coming out of the shelter datasets is
//! normalized into one of the five [`SpeciesKey`] buckets. The palette and
//! localized label attached to each key are fixed configuration, not
//! derived data.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical species bucket used for grouping, coloring and filtering.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpeciesKey {
    /// Dogs (`dog`, `cane`)
    Dog,
    /// Cats (`cat`, `gatto`)
    Cat,
    /// Birds (`bird`, `uccello`)
    Bird,
    /// Rabbits (`rabbit`, `coniglio`)
    Rabbit,
    /// Anything that matched no keyword
    Other,
}

impl SpeciesKey {
    /// Returns all variants in canonical (priority) order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Dog, Self::Cat, Self::Bird, Self::Rabbit, Self::Other]
    }

    /// Returns the two-tone display palette for this key.
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Dog => Palette::new("#ef4444", "#991b1b"),
            Self::Cat => Palette::new("#3b82f6", "#1e3a8a"),
            Self::Bird => Palette::new("#eab308", "#854d0e"),
            Self::Rabbit => Palette::new("#a855f7", "#581c87"),
            Self::Other => Palette::new("#6b7280", "#1f2937"),
        }
    }

    /// Returns the Italian display label.
    #[must_use]
    pub const fn label_it(self) -> &'static str {
        match self {
            Self::Dog => "Cane",
            Self::Cat => "Gatto",
            Self::Bird => "Uccello",
            Self::Rabbit => "Coniglio",
            Self::Other => "Altro",
        }
    }

    /// Returns the English display label.
    #[must_use]
    pub const fn label_en(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Bird => "Bird",
            Self::Rabbit => "Rabbit",
            Self::Other => "Other",
        }
    }

    /// Position of this key in [`Self::all`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fill (primary) and stroke (secondary) colors for a species marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Primary fill color, CSS hex.
    pub primary: &'static str,
    /// Secondary (darker) tone, CSS hex.
    pub secondary: &'static str,
}

impl Palette {
    const fn new(primary: &'static str, secondary: &'static str) -> Self {
        Self { primary, secondary }
    }
}

/// Recorded sex of an animal, collapsed from free text.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sex {
    /// `Male`, `M`, `maschio`, ...
    Male,
    /// `Female`, `F`, `femmina`, ...
    Female,
    /// Missing or anything else
    Unknown,
}

impl Sex {
    /// Classifies a raw sex string by its first letter.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('m') => Self::Male,
            Some('f') => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Returns the Italian display label.
    #[must_use]
    pub const fn label_it(self) -> &'static str {
        match self {
            Self::Male => "Maschio",
            Self::Female => "Femmina",
            Self::Unknown => "Sconosciuto",
        }
    }
}

/// How long animals in an area wait before adoption, bucketed by mean days.
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
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdoptionDifficulty {
    /// No stay recorded (0 days or missing)
    NoData,
    /// Under 15 days
    VeryFast,
    /// 15-30 days
    Fast,
    /// 30-45 days
    Medium,
    /// 45-60 days
    Slow,
    /// 60-90 days
    Difficult,
    /// Over 90 days
    Critical,
}

impl AdoptionDifficulty {
    /// Buckets a mean length of stay in days. Thresholds are exclusive
    /// lower bounds.
    #[must_use]
    pub fn from_days(days: f64) -> Self {
        if days > 90.0 {
            Self::Critical
        } else if days > 60.0 {
            Self::Difficult
        } else if days > 45.0 {
            Self::Slow
        } else if days > 30.0 {
            Self::Medium
        } else if days > 15.0 {
            Self::Fast
        } else if days > 0.0 {
            Self::VeryFast
        } else {
            Self::NoData
        }
    }

    /// Choropleth fill color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Critical => "#800026",
            Self::Difficult => "#BD0026",
            Self::Slow => "#E31A1C",
            Self::Medium => "#FC4E2A",
            Self::Fast => "#FD8D3C",
            Self::VeryFast => "#FEB24C",
            Self::NoData => "#FFEDA0",
        }
    }

    /// Italian legend label.
    #[must_use]
    pub const fn label_it(self) -> &'static str {
        match self {
            Self::VeryFast => "Molto veloce (<15 gg)",
            Self::Fast => "Veloce (15-30 gg)",
            Self::Medium => "Medio (30-45 gg)",
            Self::Slow => "Lento (45-60 gg)",
            Self::Difficult => "Difficile (60-90 gg)",
            Self::Critical => "Critico (>90 gg)",
            Self::NoData => "Nessun dato",
        }
    }

    /// Legend rows, fastest first. [`Self::NoData`] is not part of the legend.
    #[must_use]
    pub const fn legend() -> &'static [Self] {
        &[
            Self::VeryFast,
            Self::Fast,
            Self::Medium,
            Self::Slow,
            Self::Difficult,
            Self::Critical,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn species_index_matches_all_order() {
        for (i, key) in SpeciesKey::all().iter().enumerate() {
            assert_eq!(key.index(), i, "{key:?} index out of order");
        }
    }

    #[test]
    fn species_key_string_roundtrip() {
        assert_eq!(SpeciesKey::Rabbit.to_string(), "rabbit");
        assert_eq!(SpeciesKey::from_str("bird").unwrap(), SpeciesKey::Bird);
    }

    #[test]
    fn every_species_has_distinct_primary_color() {
        let mut colors: Vec<&str> = SpeciesKey::all()
            .iter()
            .map(|k| k.palette().primary)
            .collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), SpeciesKey::all().len());
    }

    #[test]
    fn sex_parses_first_letter() {
        assert_eq!(Sex::parse(Some("Male")), Sex::Male);
        assert_eq!(Sex::parse(Some("  femmina")), Sex::Female);
        assert_eq!(Sex::parse(Some("F")), Sex::Female);
        assert_eq!(Sex::parse(Some("Neutered")), Sex::Unknown);
        assert_eq!(Sex::parse(Some("")), Sex::Unknown);
        assert_eq!(Sex::parse(None), Sex::Unknown);
    }

    #[test]
    fn difficulty_thresholds_are_exclusive() {
        assert_eq!(AdoptionDifficulty::from_days(0.0), AdoptionDifficulty::NoData);
        assert_eq!(AdoptionDifficulty::from_days(0.5), AdoptionDifficulty::VeryFast);
        assert_eq!(AdoptionDifficulty::from_days(15.0), AdoptionDifficulty::VeryFast);
        assert_eq!(AdoptionDifficulty::from_days(15.1), AdoptionDifficulty::Fast);
        assert_eq!(AdoptionDifficulty::from_days(45.0), AdoptionDifficulty::Medium);
        assert_eq!(AdoptionDifficulty::from_days(90.0), AdoptionDifficulty::Difficult);
        assert_eq!(AdoptionDifficulty::from_days(120.0), AdoptionDifficulty::Critical);
        assert_eq!(AdoptionDifficulty::from_days(-3.0), AdoptionDifficulty::NoData);
    }

    #[test]
    fn legend_is_ordered_by_severity() {
        let legend = AdoptionDifficulty::legend();
        assert!(legend.windows(2).all(|w| w[0] < w[1]));
    }
}
