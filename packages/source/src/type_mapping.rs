//! Species type mapping.
//!
//! Maps the free-text animal type strings found in shelter datasets to the
//! canonical [`SpeciesKey`] taxonomy. Sources mix English and Italian
//! ("Dog", "CANE", "Gatto europeo"), so classification is keyword based.

use serde::{Deserialize, Serialize};
use shelter_map_animal_models::SpeciesKey;

/// Keywords per canonical key, checked in priority order.
const KEYWORDS: &[(SpeciesKey, &[&str])] = &[
    (SpeciesKey::Dog, &["dog", "cane"]),
    (SpeciesKey::Cat, &["cat", "gatto"]),
    (SpeciesKey::Bird, &["bird", "uccello"]),
    (SpeciesKey::Rabbit, &["rabbit", "coniglio"]),
];

/// Result of classifying a raw type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Canonical bucket used for grouping, coloring and filtering.
    pub key: SpeciesKey,
    /// The raw string, un-normalized.
    pub display_label: String,
}

/// Classifies a raw type string, keeping it as the display label.
#[must_use]
pub fn classify(raw: &str) -> Classification {
    Classification {
        key: map_species(raw),
        display_label: raw.to_string(),
    }
}

/// Maps a raw type string to its canonical key.
///
/// Matching is a case-insensitive substring test. The first key (in
/// `dog, cat, bird, rabbit` order) with a matching keyword wins; no match
/// returns [`SpeciesKey::Other`].
#[must_use]
pub fn map_species(raw: &str) -> SpeciesKey {
    let lower = raw.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map_or(SpeciesKey::Other, |(key, _)| *key)
}

/// Returns `true` if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
