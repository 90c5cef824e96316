//! Raw feature to [`ResolvedRecord`].

use shelter_map_animal_models::Sex;
use shelter_map_source::fields::{Field, FieldTable};
use shelter_map_source::geometry::extract_point;
use shelter_map_source::parsing::parse_date;
use shelter_map_source::properties::{is_truthy, value_text};
use shelter_map_source::type_mapping::classify;
use shelter_map_source_models::{MonthKey, RawFeatureCollection, RawRecord, ResolvedRecord};

use crate::identity::identity_of;

/// Display name for records without one.
pub const UNNAMED: &str = "Unnamed";
/// Display shelter for records without one.
pub const UNSPECIFIED_SHELTER: &str = "Unspecified shelter";
/// Species text for records without one. Classifies as `other`.
pub const OTHER_SPECIES: &str = "Other";

/// Resolves raw features through a [`FieldTable`].
#[derive(Debug, Clone, Default)]
pub struct RecordResolver {
    fields: FieldTable,
}

impl RecordResolver {
    #[must_use]
    pub const fn new(fields: FieldTable) -> Self {
        Self { fields }
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldTable {
        &self.fields
    }

    /// Resolves one feature. Never fails: unresolvable parts get
    /// placeholders, an unparsable date lands in the `"Unknown"` month and
    /// unusable geometry leaves `coordinates` empty.
    #[must_use]
    pub fn resolve(&self, raw: RawRecord) -> ResolvedRecord {
        let props = &raw.properties;

        let coordinates = raw.geometry.as_ref().and_then(extract_point);

        let species_text = self.fields.text(props, Field::Species);
        let classification = classify(species_text.as_deref().unwrap_or(OTHER_SPECIES));

        // A falsy date (0, "", false) counts as missing, not as the epoch.
        let date_value = self
            .fields
            .resolve(props, Field::Date)
            .filter(|value| is_truthy(value));
        let raw_date = date_value.and_then(value_text);
        let date = date_value.and_then(parse_date);
        let month_key = date.map_or_else(MonthKey::unknown, MonthKey::from_date);

        let name = self.fields.text(props, Field::Name);
        let shelter = self.fields.text(props, Field::Shelter);
        let sex = Sex::parse(self.fields.text(props, Field::Sex).as_deref());

        let identity_key = identity_of(
            name.as_deref(),
            classification.key,
            date.as_ref(),
            shelter.as_deref(),
        );

        ResolvedRecord {
            coordinates,
            species_key: classification.key,
            display_label: classification.display_label,
            month_key,
            identity_key,
            name: display_name(name),
            shelter: shelter.unwrap_or_else(|| UNSPECIFIED_SHELTER.to_string()),
            sex,
            raw_date,
            date,
            raw,
        }
    }

    /// Resolves every feature of a collection, in order.
    #[must_use]
    pub fn resolve_all(&self, collection: RawFeatureCollection) -> Vec<ResolvedRecord> {
        let records: Vec<ResolvedRecord> = collection
            .features
            .into_iter()
            .map(|raw| self.resolve(raw))
            .collect();

        let unlocated = records.iter().filter(|r| r.coordinates.is_none()).count();
        if unlocated > 0 {
            log::debug!("{unlocated} of {} records have no usable geometry", records.len());
        }
        records
    }
}

/// A literal `"unknown"` name counts as missing for display.
fn display_name(name: Option<String>) -> String {
    name.filter(|n| !n.trim().eq_ignore_ascii_case("unknown"))
        .unwrap_or_else(|| UNNAMED.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use shelter_map_animal_models::SpeciesKey;

    use super::*;

    fn raw(geometry: Value, properties: Value) -> RawRecord {
        serde_json::from_value(json!({"geometry": geometry, "properties": properties})).unwrap()
    }

    #[test]
    fn resolves_truncated_shapefile_record() {
        let record = RecordResolver::default().resolve(raw(
            json!({"type": "Point", "coordinates": [-118.16, 33.93]}),
            json!({
                "Animal Nam": "Rex",
                "Animal Typ": "DOG",
                "Intake Dat": "2023-05-14",
                "Shelter_Na": "Downey",
                "Sex": "Neutered Male"
            }),
        ));

        let point = record.coordinates.unwrap();
        assert!((point.lat - 33.93).abs() < 1e-9);
        assert_eq!(record.species_key, SpeciesKey::Dog);
        assert_eq!(record.display_label, "DOG");
        assert_eq!(record.month_key.as_str(), "2023-05");
        assert_eq!(record.name, "Rex");
        assert_eq!(record.shelter, "Downey");
        assert_eq!(record.sex, Sex::Unknown);
        assert_eq!(record.raw_date.as_deref(), Some("2023-05-14"));
        assert_eq!(record.identity_key.as_str(), "rexdog20230514downey");
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let record = RecordResolver::default().resolve(raw(Value::Null, json!({})));
        assert!(record.coordinates.is_none());
        assert_eq!(record.species_key, SpeciesKey::Other);
        assert_eq!(record.display_label, OTHER_SPECIES);
        assert!(record.month_key.is_unknown());
        assert_eq!(record.name, UNNAMED);
        assert_eq!(record.shelter, UNSPECIFIED_SHELTER);
        assert_eq!(record.sex, Sex::Unknown);
        assert!(record.raw_date.is_none());
    }

    #[test]
    fn literal_unknown_name_is_displayed_as_unnamed() {
        let record = RecordResolver::default().resolve(raw(Value::Null, json!({"name": "UNKNOWN"})));
        assert_eq!(record.name, UNNAMED);
    }

    #[test]
    fn unparsable_date_keeps_raw_text() {
        let record = RecordResolver::default().resolve(raw(Value::Null, json!({"Date": "garbage"})));
        assert!(record.month_key.is_unknown());
        assert_eq!(record.raw_date.as_deref(), Some("garbage"));
        assert!(record.date.is_none());
    }

    #[test]
    fn falsy_date_is_unknown_not_epoch() {
        let resolver = RecordResolver::default();
        for date in [json!(0), json!(""), json!(false)] {
            let record = resolver.resolve(raw(
                Value::Null,
                json!({"name": "Rex", "species": "dog", "Intake Dat": date}),
            ));
            assert!(record.month_key.is_unknown(), "{date} bucketed as {}", record.month_key.as_str());
            assert!(record.date.is_none());
            assert!(record.raw_date.is_none());
            assert_eq!(record.identity_key.as_str(), "rexdognodateunknown");
        }
    }

    #[test]
    fn italian_record_with_sex() {
        let record = RecordResolver::default().resolve(raw(
            json!({"type": "Point", "coordinates": [12.49, 41.89]}),
            json!({"type": "Gatto europeo", "sesso": "femmina", "Location": "Roma"}),
        ));
        assert_eq!(record.species_key, SpeciesKey::Cat);
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.shelter, "Roma");
    }

    #[test]
    fn resolve_all_keeps_order() {
        let collection = RawFeatureCollection {
            features: vec![
                raw(Value::Null, json!({"name": "A"})),
                raw(Value::Null, json!({"name": "B"})),
            ],
        };
        let names: Vec<String> = RecordResolver::default()
            .resolve_all(collection)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["A", "B"]);
    }
}
