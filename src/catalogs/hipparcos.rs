//! The Hipparcos ('hip_main') and Tycho ('tyc_main') catalogs: pipe
//! ('|') delimited text, no header row, one record per line, epoch
//! J1991.25

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::{Catalog, Error, Star};

const EPOCH: f64 = 1991.25;

//ti Record
/// One hip_main/tyc_main row, by column position (the file carries no
/// header): only the columns this crate needs are named, the rest are
/// skipped over positionally
#[derive(Debug, Deserialize)]
struct Record {
    _field0: Option<String>,
    _field1: Option<String>,
    _field2: Option<String>,
    _field3: Option<String>,
    _field4: Option<String>,
    mag: Option<f32>,
    _field6: Option<String>,
    _field7: Option<String>,
    ra_deg: Option<f64>,
    dec_deg: Option<f64>,
    _field10: Option<String>,
    _field11: Option<String>,
    pm_ra_mas: Option<f64>,
    pm_dec_mas: Option<f64>,
}

//fp load
/// Load a hip_main/tyc_main-formatted catalog, applying proper motion to
/// `current_year` and keeping only stars at or brighter than
/// `star_max_magnitude`. Records missing any required field are skipped
pub fn load(path: &Path, star_max_magnitude: f32, current_year: f64) -> Result<Catalog, Error> {
    let f = std::fs::File::open(path).map_err(|source| Error::CatalogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(f);

    let mut catalog = Catalog::default();
    let mut incomplete = 0usize;
    let mut loaded = 0usize;
    for result in reader.deserialize() {
        let record: Record = result?;
        let (Some(mag), Some(ra_deg), Some(dec_deg), Some(pm_ra_mas), Some(pm_dec_mas)) = (
            record.mag,
            record.ra_deg,
            record.dec_deg,
            record.pm_ra_mas,
            record.pm_dec_mas,
        ) else {
            incomplete += 1;
            continue;
        };
        if mag > star_max_magnitude {
            continue;
        }
        let pm_ra_deg_per_year = pm_ra_mas / 1000.0 / 3600.0;
        let pm_dec_deg_per_year = pm_dec_mas / 1000.0 / 3600.0;
        let years = current_year - EPOCH;
        let ra = (ra_deg + pm_ra_deg_per_year * years).to_radians();
        let dec = (dec_deg + pm_dec_deg_per_year * years).to_radians();
        catalog.add_star(Star::new(ra, dec, mag));
        loaded += 1;
    }
    if incomplete > 0 {
        info!("Skipped {incomplete} incomplete entries.");
    }
    info!("Loaded {loaded} stars, magnitude <= {star_max_magnitude}");
    Ok(catalog)
}
