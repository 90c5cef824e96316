//! Adoption-difficulty choropleth grading.

use shelter_map_analytics_models::DifficultyZone;
use shelter_map_animal_models::AdoptionDifficulty;
use shelter_map_source::fields::{Field, FieldTable};
use shelter_map_source_models::{Properties, RawRecord};

/// Area name used when none resolves.
pub const DEFAULT_ZONE_NAME: &str = "Zona";

/// Mean days before adoption for an area; 0 when missing or not numeric.
#[must_use]
pub fn intake_duration(props: &Properties, fields: &FieldTable) -> f64 {
    fields
        .number(props, Field::IntakeDuration)
        .unwrap_or_default()
}

/// Grades every area feature. Geometry is not needed.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn grade_zones(features: &[RawRecord], fields: &FieldTable) -> Vec<DifficultyZone> {
    features
        .iter()
        .map(|feature| {
            let days = intake_duration(&feature.properties, fields);
            DifficultyZone {
                name: fields
                    .text(&feature.properties, Field::AreaName)
                    .unwrap_or_else(|| DEFAULT_ZONE_NAME.to_string()),
                days: days.round() as i64,
                difficulty: AdoptionDifficulty::from_days(days),
            }
        })
        .collect()
}
