//! Composite record identity.
//!
//! Two records describe the same animal when name, species, intake date
//! and shelter all normalize to the same text. Distinct animals sharing
//! all four collide; that is accepted.

use chrono::{DateTime, Utc};
use shelter_map_animal_models::SpeciesKey;
use shelter_map_source::parsing::iso_date;
use shelter_map_source::properties::normalize_key;
use shelter_map_source_models::IdentityKey;

/// Name component used when no name resolves.
pub const MISSING_NAME: &str = "unknown";
/// Date component used when the date is missing or unparsable.
pub const MISSING_DATE: &str = "nodate";
/// Shelter component used when no shelter resolves.
pub const MISSING_SHELTER: &str = "unknown";

/// Composes the identity of a record.
///
/// Each component is lower-cased and stripped of non-alphanumerics, then
/// the four are concatenated without separators.
#[must_use]
pub fn identity_of(
    name: Option<&str>,
    species: SpeciesKey,
    date: Option<&DateTime<Utc>>,
    shelter: Option<&str>,
) -> IdentityKey {
    let date = date.map_or_else(|| MISSING_DATE.to_string(), iso_date);
    let mut key = String::new();
    key.push_str(&normalize_key(name.unwrap_or(MISSING_NAME)));
    key.push_str(species.as_ref());
    key.push_str(&normalize_key(&date));
    key.push_str(&normalize_key(shelter.unwrap_or(MISSING_SHELTER)));
    IdentityKey::from_normalized(key)
}
