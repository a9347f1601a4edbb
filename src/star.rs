//a Imports
use geo_nd::Vector;
use serde::{Deserialize, Serialize};

use crate::{Subcube, Vec3};

//a Star and StarSerialized
//tp StarSerialized
/// The on-disk representation of a [Star], matching the `star_table`
/// archive schema: six 32-bit floats `[ra, dec, x, y, z, mag]`
///
/// A tuple rather than a struct so the field names are not repeated in
/// every serialized row. `From<Star>`/`From<StarSerialized>` convert to
/// and from the richer in-memory [Star], which additionally carries a
/// derived [Subcube] and neighbor list that are never persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StarSerialized(f32, f32, f32, f32, f32, f32);

//tp Star
/// A star record: celestial position, unit bearing vector, and visual
/// magnitude
///
/// Rows of a [crate::Catalog] are kept sorted ascending by magnitude
/// (brightest first); code throughout the crate refers to stars by
/// their position in that ordering, via [crate::CatalogIndex]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StarSerialized", into = "StarSerialized")]
pub struct Star {
    ra: f64,
    dec: f64,
    mag: f32,
    vector: Vec3,
    subcube: Subcube,
}

//ip From<Star> for StarSerialized
impl From<Star> for StarSerialized {
    fn from(star: Star) -> StarSerialized {
        StarSerialized(
            star.ra as f32,
            star.dec as f32,
            star.vector[0] as f32,
            star.vector[1] as f32,
            star.vector[2] as f32,
            star.mag,
        )
    }
}

//ip From<StarSerialized> for Star
impl From<StarSerialized> for Star {
    fn from(star: StarSerialized) -> Star {
        Star::new(star.0 as f64, star.1 as f64, star.5)
    }
}

//ip Star
impl Star {
    //fi vec_of_ra_de
    /// Calculate a unit vector from a right ascension and declination,
    /// both in radians
    pub fn vec_of_ra_de(ra: f64, dec: f64) -> Vec3 {
        let vx = ra.cos() * dec.cos();
        let vy = ra.sin() * dec.cos();
        let vz = dec.sin();
        [vx, vy, vz].into()
    }

    //cp new
    /// Create a new [Star] from its right ascension, declination (both
    /// radians) and visual magnitude; the unit vector and subcube are
    /// derived
    pub fn new(ra: f64, dec: f64, mag: f32) -> Self {
        let vector = Self::vec_of_ra_de(ra, dec);
        let subcube = Subcube::of_vector(&vector);
        Self {
            ra,
            dec,
            mag,
            vector,
            subcube,
        }
    }

    //ap ra
    /// Right ascension in radians
    pub fn ra(&self) -> f64 {
        self.ra
    }

    //ap dec
    /// Declination in radians
    pub fn dec(&self) -> f64 {
        self.dec
    }

    //ap subcube
    /// The [Subcube] this star's vector falls in
    pub fn subcube(&self) -> Subcube {
        self.subcube
    }

    //ap mag
    /// Visual magnitude
    pub fn mag(&self) -> f32 {
        self.mag
    }

    //ap vector
    /// The unit bearing vector of the star
    pub fn vector(&self) -> &Vec3 {
        &self.vector
    }

    //mp cos_angle_between
    /// Cosine of the angle between this [Star] and another
    pub fn cos_angle_between(&self, other: &Star) -> f64 {
        self.vector.dot(&other.vector)
    }
}
