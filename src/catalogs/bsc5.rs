//! The Yale Bright Star Catalog, 'BSC5' binary format: a 28-byte header
//! followed by 9,110 fixed-width records

use std::io::Read;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::info;

use crate::{Catalog, Error, Star};

const HEADER_LENGTH: usize = 28;
const NUM_ENTRIES: usize = 9110;

/// One on-disk BSC5 record: catalog id, 1950-epoch RA/Dec, spectral type
/// code, magnitude ×100, and RA/Dec proper motion in degrees/year
struct Bsc5Record {
    ra1950: f64,
    dec1950: f64,
    mag: f32,
    ra_pm: f32,
    dec_pm: f32,
}

fn read_record<R: Read>(r: &mut R) -> std::io::Result<Bsc5Record> {
    let _id = r.read_f32::<LittleEndian>()?;
    let ra1950 = r.read_f64::<LittleEndian>()?;
    let dec1950 = r.read_f64::<LittleEndian>()?;
    let _spectral_type = r.read_i16::<LittleEndian>()?;
    let mag_hundredths = r.read_i16::<LittleEndian>()?;
    let ra_pm = r.read_f32::<LittleEndian>()?;
    let dec_pm = r.read_f32::<LittleEndian>()?;
    Ok(Bsc5Record {
        ra1950,
        dec1950,
        mag: mag_hundredths as f32 / 100.0,
        ra_pm,
        dec_pm,
    })
}

//fp load
/// Load the BSC5 catalog, applying proper motion to `current_year` and
/// keeping only stars at or brighter than `star_max_magnitude`
pub fn load(path: &Path, star_max_magnitude: f32, current_year: f64) -> Result<Catalog, Error> {
    let mut f = std::fs::File::open(path).map_err(|source| Error::CatalogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut header = [0u8; HEADER_LENGTH];
    f.read_exact(&mut header).map_err(|source| Error::CatalogFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut catalog = Catalog::default();
    let years_since_epoch = current_year - 1950.0;
    let mut loaded = 0;
    for _ in 0..NUM_ENTRIES {
        let record = match read_record(&mut f) {
            Ok(r) => r,
            Err(_) => break,
        };
        if record.mag > star_max_magnitude {
            continue;
        }
        // A zero RA and Dec marks an unused catalog slot (e.g. a star
        // dropped from the Yale catalog after BSC5 was laid out)
        if record.ra1950 == 0.0 && record.dec1950 == 0.0 {
            continue;
        }
        let ra = record.ra1950 + (record.ra_pm as f64) * years_since_epoch;
        let dec = record.dec1950 + (record.dec_pm as f64) * years_since_epoch;
        catalog.add_star(Star::new(ra, dec, record.mag));
        loaded += 1;
    }
    info!(
        "Loaded {loaded} stars from BSC5 catalog (of {NUM_ENTRIES} entries), magnitude <= {star_max_magnitude}"
    );
    Ok(catalog)
}
