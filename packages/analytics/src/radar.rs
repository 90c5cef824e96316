//! Conflict radar: two-category density comparison around a point.
//!
//! Counts category A and category B records within [`RADIUS_KM`] of a
//! clicked point and classifies the pair. Recomputed per query with a
//! linear scan.

use shelter_map_analytics_models::{RadarReading, Verdict};
use shelter_map_source::geometry::extract_point;
use shelter_map_source_models::{LatLon, RawRecord};

use crate::distance::haversine_km;

/// Search radius in km.
pub const RADIUS_KM: f64 = 1.5;

/// One side dominates when its count exceeds the other's times this.
pub const DOMINANCE_RATIO: f64 = 1.5;

/// Counts and classifies both categories around `center`.
#[must_use]
pub fn analyze(center: LatLon, category_a: &[RawRecord], category_b: &[RawRecord]) -> RadarReading {
    let count_a = count_within(center, category_a, RADIUS_KM);
    let count_b = count_within(center, category_b, RADIUS_KM);
    let reading = RadarReading {
        count_a,
        count_b,
        verdict: verdict(count_a, count_b),
    };
    log::debug!("Radar at {center}: {count_a} vs {count_b} -> {}", reading.verdict);
    reading
}

/// Records whose geometry resolves to a point within `radius_km`
/// (inclusive) of `center`. Records without a usable point are skipped.
#[must_use]
pub fn count_within(center: LatLon, records: &[RawRecord], radius_km: f64) -> usize {
    records
        .iter()
        .filter_map(|record| record.geometry.as_ref().and_then(extract_point))
        .filter(|point| haversine_km(center, *point) <= radius_km)
        .count()
}

/// Classifies a pair of counts. Rules apply in order: both zero, A
/// dominant, B dominant, otherwise conflict.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn verdict(count_a: usize, count_b: usize) -> Verdict {
    let a = count_a as f64;
    let b = count_b as f64;

    if count_a == 0 && count_b == 0 {
        Verdict::NoActivity
    } else if a > b * DOMINANCE_RATIO {
        Verdict::DominantA
    } else if b > a * DOMINANCE_RATIO {
        Verdict::DominantB
    } else {
        Verdict::Conflict
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CENTER_LAT: f64 = 34.05;
    const CENTER_LON: f64 = -118.25;

    fn center() -> LatLon {
        LatLon::new(CENTER_LAT, CENTER_LON).unwrap()
    }

    /// A record `dlat` degrees north of the center (0.009 deg is ~1 km).
    fn north(dlat: f64) -> RawRecord {
        serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": [CENTER_LON, CENTER_LAT + dlat]},
            "properties": {}
        }))
        .unwrap()
    }

    fn inside(n: usize) -> Vec<RawRecord> {
        (0..n).map(|_| north(0.005)).collect()
    }

    #[test]
    fn two_against_one_is_dominant_a() {
        let reading = analyze(center(), &inside(2), &inside(1));
        assert_eq!(reading.count_a, 2);
        assert_eq!(reading.count_b, 1);
        assert_eq!(reading.verdict, Verdict::DominantA);
    }

    #[test]
    fn equal_counts_conflict() {
        assert_eq!(analyze(center(), &inside(5), &inside(5)).verdict, Verdict::Conflict);
    }

    #[test]
    fn nothing_in_range_is_no_activity() {
        let far = vec![north(0.05), north(-0.05)];
        let reading = analyze(center(), &far, &[]);
        assert_eq!(reading.count_a, 0);
        assert_eq!(reading.verdict, Verdict::NoActivity);
    }

    #[test]
    fn ratio_threshold_is_strict() {
        assert_eq!(verdict(3, 2), Verdict::Conflict);
        assert_eq!(verdict(4, 2), Verdict::DominantA);
        assert_eq!(verdict(2, 3), Verdict::Conflict);
        assert_eq!(verdict(0, 1), Verdict::DominantB);
        assert_eq!(verdict(1, 0), Verdict::DominantA);
        assert_eq!(verdict(0, 0), Verdict::NoActivity);
    }

    #[test]
    fn radius_is_inclusive_and_bounded() {
        // ~1.45 km in, ~1.56 km out.
        let records = vec![north(0.013), north(0.014)];
        assert_eq!(count_within(center(), &records, RADIUS_KM), 1);
    }

    #[test]
    fn unresolvable_geometry_is_skipped() {
        let broken: RawRecord = serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": ["x", "y"]},
            "properties": {}
        }))
        .unwrap();
        let mut records = inside(1);
        records.push(broken);
        records.push(RawRecord::default());
        assert_eq!(count_within(center(), &records, RADIUS_KM), 1);
    }
}
