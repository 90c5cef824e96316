//! Disease hotspot view: cluster centres, sick animals and the species
//! legend with per-species visibility.

use std::collections::BTreeMap;

use shelter_map_analytics_models::{ClusterSite, LegendEntry, SickAnimal};
use shelter_map_animal_models::SpeciesKey;
use shelter_map_source::fields::{Field, FieldTable};
use shelter_map_source::geometry::extract_point;
use shelter_map_source::type_mapping::classify;
use shelter_map_source_models::RawRecord;

use crate::resolve::{OTHER_SPECIES, UNNAMED};

/// Condition shown when none resolves.
pub const UNSPECIFIED_CONDITION: &str = "Not specified";
/// Color shown when none resolves.
pub const UNSPECIFIED_COLOR: &str = "N/A";

/// Labels red-zone features.
///
/// Features with a cluster id become `"FOCOLAIO {id}"`; the rest are
/// numbered `"ZONA ROSSA #n"` from 1 in feature order. Features without a
/// usable point are skipped and do not consume a number.
#[must_use]
pub fn label_clusters(features: &[RawRecord], fields: &FieldTable) -> Vec<ClusterSite> {
    let mut unlabelled = 0;
    features
        .iter()
        .filter_map(|feature| {
            let location = feature.geometry.as_ref().and_then(extract_point)?;
            let cluster_id = fields.text(&feature.properties, Field::ClusterId);
            let label = if let Some(id) = &cluster_id {
                format!("FOCOLAIO {id}")
            } else {
                unlabelled += 1;
                format!("ZONA ROSSA #{unlabelled}")
            };
            Some(ClusterSite {
                label,
                cluster_id,
                location,
            })
        })
        .collect()
}

/// Sick animals with a usable point, with display placeholders filled in.
#[must_use]
pub fn sick_animals(features: &[RawRecord], fields: &FieldTable) -> Vec<SickAnimal> {
    features
        .iter()
        .filter_map(|feature| {
            let location = feature.geometry.as_ref().and_then(extract_point)?;
            let props = &feature.properties;
            let species = fields
                .text(props, Field::Species)
                .unwrap_or_else(|| OTHER_SPECIES.to_string());
            let classification = classify(&species);
            let name = fields
                .text(props, Field::Name)
                .filter(|n| !n.trim().eq_ignore_ascii_case("unknown"))
                .unwrap_or_else(|| UNNAMED.to_string());

            Some(SickAnimal {
                location,
                species_key: classification.key,
                display_label: classification.display_label,
                name,
                condition: fields
                    .text(props, Field::Condition)
                    .unwrap_or_else(|| UNSPECIFIED_CONDITION.to_string()),
                color: fields
                    .text(props, Field::Color)
                    .unwrap_or_else(|| UNSPECIFIED_COLOR.to_string()),
            })
        })
        .collect()
}

/// Legend over the species present in a marker set, with a visibility
/// toggle per species.
#[derive(Debug, Clone, Default)]
pub struct SpeciesLegend {
    counts: BTreeMap<SpeciesKey, usize>,
    hidden: Vec<SpeciesKey>,
}

impl SpeciesLegend {
    /// Builds the legend from the species of each marker.
    #[must_use]
    pub fn from_keys<I: IntoIterator<Item = SpeciesKey>>(keys: I) -> Self {
        let mut counts = BTreeMap::new();
        for key in keys {
            *counts.entry(key).or_default() += 1;
        }
        Self {
            counts,
            hidden: Vec::new(),
        }
    }

    /// Flips visibility of `key`; returns the new visibility.
    pub fn toggle(&mut self, key: SpeciesKey) -> bool {
        if let Some(pos) = self.hidden.iter().position(|k| *k == key) {
            self.hidden.remove(pos);
            true
        } else {
            self.hidden.push(key);
            false
        }
    }

    /// Species are visible until toggled off.
    #[must_use]
    pub fn is_visible(&self, key: SpeciesKey) -> bool {
        !self.hidden.contains(&key)
    }

    /// Rows for species present, in canonical order.
    #[must_use]
    pub fn entries(&self) -> Vec<LegendEntry> {
        self.counts
            .iter()
            .map(|(key, count)| LegendEntry {
                key: *key,
                label: key.label_it(),
                palette: key.palette(),
                count: *count,
                visible: self.is_visible(*key),
            })
            .collect()
    }

    /// Markers that should currently be drawn.
    #[must_use]
    pub fn visible<'a>(&self, animals: &'a [SickAnimal]) -> Vec<&'a SickAnimal> {
        animals
            .iter()
            .filter(|a| self.is_visible(a.species_key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn feature(coordinates: Value, properties: Value) -> RawRecord {
        serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": coordinates},
            "properties": properties
        }))
        .unwrap()
    }

    #[test]
    fn clusters_numbered_only_when_unlabelled() {
        let features = vec![
            feature(json!([-118.1, 34.1]), json!({"CLUSTER_ID": 7})),
            feature(json!([-118.2, 34.2]), json!({})),
            feature(json!(["bad", 0]), json!({})),
            feature(json!([-118.3, 34.3]), json!({"CLUSTER_ID": null})),
        ];
        let sites = label_clusters(&features, &FieldTable::default());
        let labels: Vec<&str> = sites.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["FOCOLAIO 7", "ZONA ROSSA #1", "ZONA ROSSA #2"]);
        assert_eq!(sites[0].cluster_id.as_deref(), Some("7"));
        assert_eq!(sites[2].location.to_string(), "34.30000, -118.30000");
    }

    #[test]
    fn sick_animals_fill_placeholders() {
        let features = vec![
            feature(
                json!([12.5, 41.9]),
                json!({"Animal Typ": "Cane", "Animal Nam": "unknown", "Intake Con": "Injured"}),
            ),
            feature(json!([12.6, 41.8]), json!({"Primary Co": "Black"})),
        ];
        let animals = sick_animals(&features, &FieldTable::default());
        assert_eq!(animals.len(), 2);
        assert_eq!(animals[0].species_key, SpeciesKey::Dog);
        assert_eq!(animals[0].name, UNNAMED);
        assert_eq!(animals[0].condition, "Injured");
        assert_eq!(animals[0].color, UNSPECIFIED_COLOR);
        assert_eq!(animals[1].species_key, SpeciesKey::Other);
        assert_eq!(animals[1].condition, UNSPECIFIED_CONDITION);
        assert_eq!(animals[1].color, "Black");
    }

    #[test]
    fn legend_lists_present_species_and_toggles() {
        let mut legend = SpeciesLegend::from_keys([
            SpeciesKey::Cat,
            SpeciesKey::Dog,
            SpeciesKey::Cat,
        ]);
        let entries = legend.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, SpeciesKey::Dog);
        assert_eq!(entries[1].count, 2);
        assert!(entries.iter().all(|e| e.visible));

        assert!(!legend.toggle(SpeciesKey::Cat));
        assert!(!legend.is_visible(SpeciesKey::Cat));
        assert!(legend.is_visible(SpeciesKey::Bird));
        assert!(legend.toggle(SpeciesKey::Cat));
        assert!(legend.is_visible(SpeciesKey::Cat));
    }

    #[test]
    fn hidden_species_are_filtered() {
        let features = vec![
            feature(json!([0.0, 0.0]), json!({"species": "cat"})),
            feature(json!([0.1, 0.1]), json!({"species": "dog"})),
        ];
        let animals = sick_animals(&features, &FieldTable::default());
        let mut legend = SpeciesLegend::from_keys(animals.iter().map(|a| a.species_key));
        legend.toggle(SpeciesKey::Dog);
        let shown = legend.visible(&animals);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].species_key, SpeciesKey::Cat);
    }
}
