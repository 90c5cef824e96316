//! Nearest shelter lookup.

use shelter_map_analytics_models::NearestShelter;
use shelter_map_source_models::{LatLon, ShelterSite};

use crate::distance::haversine_km;

/// Returns the site closest to `origin`, or `None` when `sites` is empty.
/// Ties keep the earlier site.
#[must_use]
pub fn nearest_shelter(origin: LatLon, sites: &[ShelterSite]) -> Option<NearestShelter> {
    let (site, distance) = sites
        .iter()
        .map(|site| (site, haversine_km(origin, site.location)))
        .fold(None, |best: Option<(&ShelterSite, f64)>, (site, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((site, d)),
        })?;

    Some(NearestShelter {
        site: site.clone(),
        distance_km: (distance * 100.0).round() / 100.0,
    })
}
