//! A generic augmented catalog format: a delimited text file with named
//! columns `ra_deg, dec_deg, mag, pm_ra_deg_per_year, pm_dec_deg_per_year,
//! epoch`, for sources other than BSC5/Hipparcos/Tycho
//!
//! Rows missing any required column are skipped, and the count of
//! skipped rows is logged

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::{Catalog, Error, Star};

//ti Record
#[derive(Debug, Deserialize)]
struct Record {
    ra_deg: Option<f64>,
    dec_deg: Option<f64>,
    mag: Option<f32>,
    pm_ra_deg_per_year: Option<f64>,
    pm_dec_deg_per_year: Option<f64>,
    epoch: Option<f64>,
}

//fp load
/// Read a generic augmented-format catalog file, applying each row's own
/// proper motion and epoch to `current_year`
pub fn load(path: &Path, star_max_magnitude: f32, current_year: f64) -> Result<Catalog, Error> {
    let f = std::fs::File::open(path).map_err(|source| Error::CatalogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(f);

    let mut catalog = Catalog::default();
    let mut skipped = 0usize;
    let mut loaded = 0usize;
    for result in reader.deserialize() {
        let record: Record = result?;
        let (Some(ra_deg), Some(dec_deg), Some(mag), Some(pm_ra), Some(pm_dec), Some(epoch)) = (
            record.ra_deg,
            record.dec_deg,
            record.mag,
            record.pm_ra_deg_per_year,
            record.pm_dec_deg_per_year,
            record.epoch,
        ) else {
            skipped += 1;
            continue;
        };
        if mag > star_max_magnitude {
            continue;
        }
        let years = current_year - epoch;
        let ra = (ra_deg + pm_ra * years).to_radians();
        let dec = (dec_deg + pm_dec * years).to_radians();
        catalog.add_star(Star::new(ra, dec, mag));
        loaded += 1;
    }
    if skipped > 0 {
        info!("Skipped {skipped} incomplete entries.");
    }
    info!("Loaded {loaded} stars, magnitude <= {star_max_magnitude}");
    Ok(catalog)
}
