//! Representative point extraction for GeoJSON geometries.
//!
//! Well-formed geometries go through the typed [`geojson::Geometry`]
//! parser. Anything it rejects (numeric strings, a flat `MultiPoint`,
//! unknown `type` values) falls back to walking the raw JSON.

use serde_json::Value;
use shelter_map_source_models::LatLon;

use crate::properties::value_number;

/// Extracts a single `(lat, lon)` from a raw geometry member.
///
/// - `Point`: the coordinates themselves
/// - `MultiPoint` / `LineString`: the first position
/// - `Polygon`: the first position of the outer ring
/// - anything else: the first element of `coordinates`, if it is a pair
///
/// A missing `type` is treated as `Point`. Returns `None` for missing,
/// malformed, non-numeric or out-of-range coordinates.
#[must_use]
pub fn extract_point(geometry: &Value) -> Option<LatLon> {
    if !geometry.is_object() {
        return None;
    }

    if let Ok(typed) = geojson::Geometry::from_json_value(geometry.clone())
        && let Some(point) = extract_typed(&typed.value)
    {
        return Some(point);
    }

    extract_raw(geometry)
}

fn extract_typed(value: &geojson::Value) -> Option<LatLon> {
    let position = match value {
        geojson::Value::Point(p) => p,
        geojson::Value::MultiPoint(points) => points.first()?,
        geojson::Value::LineString(line) => line.first()?,
        geojson::Value::Polygon(rings) => rings.first()?.first()?,
        geojson::Value::MultiLineString(_)
        | geojson::Value::MultiPolygon(_)
        | geojson::Value::GeometryCollection(_) => return None,
    };
    from_lon_lat(*position.first()?, *position.get(1)?)
}

fn extract_raw(geometry: &Value) -> Option<LatLon> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("Point");
    let coords = geometry.get("coordinates")?.as_array()?;

    let pair = match kind {
        "Point" => coords,
        "MultiPoint" | "LineString" => match coords.first()? {
            Value::Array(inner) => inner,
            _ => coords,
        },
        "Polygon" => coords.first()?.as_array()?.first()?.as_array()?,
        _ => coords.first()?.as_array()?,
    };

    let lon = value_number(pair.first()?)?;
    let lat = value_number(pair.get(1)?)?;
    from_lon_lat(lon, lat)
}

fn from_lon_lat(lon: f64, lat: f64) -> Option<LatLon> {
    LatLon::new(lat, lon)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn assert_point(geometry: &Value, lat: f64, lon: f64) {
        let point = extract_point(geometry).expect("expected a point");
        assert!((point.lat - lat).abs() < 1e-9, "lat {} != {lat}", point.lat);
        assert!((point.lon - lon).abs() < 1e-9, "lon {} != {lon}", point.lon);
    }

    #[test]
    fn point_is_reversed() {
        assert_point(
            &json!({"type": "Point", "coordinates": [-118.25, 34.05]}),
            34.05,
            -118.25,
        );
    }

    #[test]
    fn point_reversal_holds_across_range() {
        for (lon, lat) in [(-180.0, -90.0), (180.0, 90.0), (0.0, 0.0), (12.49, 41.9)] {
            let geometry = json!({"type": "Point", "coordinates": [lon, lat]});
            assert_point(&geometry, lat, lon);
        }
    }

    #[test]
    fn multipoint_and_linestring_take_first_position() {
        assert_point(
            &json!({"type": "MultiPoint", "coordinates": [[10.0, 45.0], [11.0, 46.0]]}),
            45.0,
            10.0,
        );
        assert_point(
            &json!({"type": "LineString", "coordinates": [[9.5, 44.5], [9.6, 44.6]]}),
            44.5,
            9.5,
        );
    }

    #[test]
    fn flat_multipoint_is_treated_as_a_pair() {
        assert_point(&json!({"type": "MultiPoint", "coordinates": [7.0, 8.0]}), 8.0, 7.0);
    }

    #[test]
    fn polygon_takes_first_ring_vertex() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[12.0, 41.0], [12.1, 41.0], [12.1, 41.1], [12.0, 41.0]]]
        });
        assert_point(&polygon, 41.0, 12.0);
    }

    #[test]
    fn missing_type_defaults_to_point() {
        assert_point(&json!({"coordinates": [1.5, 2.5]}), 2.5, 1.5);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        assert_point(
            &json!({"type": "Point", "coordinates": ["-73.98", "40.75"]}),
            40.75,
            -73.98,
        );
    }

    #[test]
    fn unknown_type_takes_first_pair() {
        assert_point(
            &json!({"type": "Curve", "coordinates": [[3.0, 4.0], [5.0, 6.0]]}),
            4.0,
            3.0,
        );
    }

    #[test]
    fn deeper_nesting_for_unknown_types_fails() {
        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[12.0, 41.0], [12.1, 41.0], [12.0, 41.0]]]]
        });
        assert!(extract_point(&multi).is_none());
    }

    #[test]
    fn malformed_geometries_yield_none() {
        assert!(extract_point(&Value::Null).is_none());
        assert!(extract_point(&json!({"type": "Point"})).is_none());
        assert!(extract_point(&json!({"type": "Point", "coordinates": []})).is_none());
        assert!(extract_point(&json!({"type": "Point", "coordinates": [1.0]})).is_none());
        assert!(extract_point(&json!({"type": "Point", "coordinates": ["a", "b"]})).is_none());
        assert!(extract_point(&json!({"type": "Polygon", "coordinates": []})).is_none());
        assert!(extract_point(&json!({"type": "Polygon", "coordinates": [[]]})).is_none());
        assert!(extract_point(&json!({"type": "GeometryCollection", "geometries": []})).is_none());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(extract_point(&json!({"type": "Point", "coordinates": [200.0, 10.0]})).is_none());
        assert!(extract_point(&json!({"type": "Point", "coordinates": [10.0, -95.0]})).is_none());
    }
}
