//! Star catalog loaders
//!
//! Three on-disk formats are recognized: the BSC5 fixed-record binary
//! format ([bsc5]), the pipe-delimited Hipparcos/Tycho text formats
//! ([hipparcos]), and a generic delimited format for augmented sources
//! ([generic]). Each loader reduces its input to a common
//! `(ra, dec, mag, pmRA, pmDec, epoch)` view, applies proper motion to a
//! caller-supplied current year, and returns a [crate::Catalog] sorted
//! ascending by magnitude with its spatial index built
//!
//! An unused "Brightest.csv" format appeared in the system this crate is
//! modeled on but was never in its supported-catalog list; it is not
//! implemented here (see DESIGN.md)

pub mod bsc5;
#[cfg(feature = "csv")]
pub mod generic;
#[cfg(feature = "csv")]
pub mod hipparcos;

use std::path::Path;

use crate::{Catalog, Error};

//fp load
/// Load a named catalog format from `path`, filter to `star_max_magnitude`
/// and an optional RA/Dec range (both in radians), and sort/index the
/// result
///
/// `current_year` drives proper-motion correction; pass the year the
/// observation (or solve) is being made for, e.g. from `chrono::Utc::now`
pub fn load(
    name: &str,
    path: &Path,
    star_max_magnitude: f32,
    current_year: f64,
    range_ra: Option<(f64, f64)>,
    range_dec: Option<(f64, f64)>,
) -> Result<Catalog, Error> {
    let mut catalog = match name {
        "bsc5" => bsc5::load(path, star_max_magnitude, current_year)?,
        #[cfg(feature = "csv")]
        "hip_main" | "tyc_main" => hipparcos::load(path, star_max_magnitude, current_year)?,
        #[cfg(feature = "csv")]
        "generic" => generic::load(path, star_max_magnitude, current_year)?,
        other => return Err(Error::UnknownCatalog(other.to_string())),
    };

    if let Some((lo, hi)) = range_ra {
        if lo < hi {
            catalog.retain(|s| s.ra() > lo && s.ra() < hi);
        } else {
            catalog.retain(|s| s.ra() > lo || s.ra() < hi);
        }
    }
    if let Some((lo, hi)) = range_dec {
        if lo < hi {
            catalog.retain(|s| s.dec() > lo && s.dec() < hi);
        } else {
            catalog.retain(|s| s.dec() > lo || s.dec() < hi);
        }
    }

    catalog.sort();
    catalog.derive_data();
    Ok(catalog)
}
