//! Shelter locations table.
//!
//! A CSV with (at least) the columns `Latitude`, `Longitude`,
//! `Shelter_Name`, `Address` and `City`. Extra columns are ignored.

use std::io::Read;
use std::path::Path;

use shelter_map_source_models::{LatLon, ShelterSite};

use crate::SourceError;

const REQUIRED_COLUMNS: [&str; 5] = ["Latitude", "Longitude", "Shelter_Name", "Address", "City"];

/// Parses shelter sites from CSV.
///
/// Rows whose coordinates do not parse (or are out of range) are skipped.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if a required column is missing, or
/// [`SourceError::Csv`] if the CSV itself is malformed.
pub fn load_shelters<R: Read>(reader: R) -> Result<Vec<ShelterSite>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SourceError::Config {
                message: format!("shelters CSV is missing the '{name}' column"),
            })?;
    }
    let [lat_col, lon_col, name_col, address_col, city_col] = columns;

    let mut sites = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let location = field(lat_col)
            .parse::<f64>()
            .ok()
            .zip(field(lon_col).parse::<f64>().ok())
            .and_then(|(lat, lon)| LatLon::new(lat, lon));
        let Some(location) = location else {
            log::debug!("Skipping shelter row {}: unusable coordinates", row + 1);
            continue;
        };

        sites.push(ShelterSite {
            name: field(name_col).to_string(),
            address: field(address_col).to_string(),
            city: field(city_col).to_string(),
            location,
        });
    }

    log::info!("Loaded {} shelter sites", sites.len());
    Ok(sites)
}

/// Reads shelter sites from a CSV file.
///
/// # Errors
///
/// See [`load_shelters`]; also [`SourceError::Io`] if the file cannot be
/// opened.
pub fn load_shelters_from_path(path: &Path) -> Result<Vec<ShelterSite>, SourceError> {
    let file = std::fs::File::open(path)?;
    load_shelters(file)
}
