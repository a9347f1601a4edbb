//a Imports
use geo_nd::Vector;
use serde::{Deserialize, Serialize};

use crate::{Star, Subcube, Vec3};

//a CatalogIndex
//tp CatalogIndex
/// An index into a [Catalog], identifying a particular star by its
/// position in the magnitude-sorted star table
///
/// A [CatalogIndex] is only valid for the [Catalog] it was obtained from,
/// and becomes invalid if that catalog is sorted or retained again
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct CatalogIndex(usize);

//ip CatalogIndex
impl CatalogIndex {
    /// The raw row index; callers persisting pattern tuples use this
    pub fn as_usize(&self) -> usize {
        self.0
    }
}
impl From<usize> for CatalogIndex {
    fn from(i: usize) -> Self {
        Self(i)
    }
}

//a Catalog
//tp Catalog
/// A star table together with a spatial index over unit bearing vectors
///
/// Stars are kept sorted ascending by magnitude (brightest first); this
/// ordering is relied upon by the Density Thinner and Pattern Enumerator,
/// both of which process stars brightest-first, and by the persisted
/// archive schema, which stores rows in this order
#[derive(Default, Serialize, Deserialize)]
pub struct Catalog {
    stars: Vec<Star>,
    sorted: bool,
    #[serde(skip)]
    subcubes: Vec<Vec<CatalogIndex>>,
}

//ip Catalog
impl Catalog {
    //mp retain
    /// Retain only the stars matching a predicate; clears derived data and
    /// the sorted flag
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Star) -> bool,
    {
        self.sorted = false;
        self.clear_derived_data();
        self.stars.retain(f);
    }

    //mp len
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    //mp is_empty
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    //mp is_sorted
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    //mi has_derived_data
    fn has_derived_data(&self) -> bool {
        !self.subcubes.is_empty()
    }

    //mi clear_derived_data
    fn clear_derived_data(&mut self) {
        if self.has_derived_data() {
            self.subcubes.clear();
        }
    }

    //mp add_star
    /// Add a star to the catalog; clears derived data and the sorted flag
    pub fn add_star(&mut self, star: Star) {
        self.clear_derived_data();
        self.sorted = false;
        self.stars.push(star);
    }

    //cp from_sorted_stars
    /// Build a catalog directly from a star list already sorted ascending
    /// by magnitude, e.g. a subset filtered out of another catalog
    ///
    /// [Catalog::derive_data] must still be called before any geometric
    /// query is made against the result
    pub fn from_sorted_stars(stars: Vec<Star>) -> Self {
        Self {
            stars,
            sorted: true,
            subcubes: vec![],
        }
    }

    //mi allocate_subcubes
    fn allocate_subcubes(&mut self) {
        if self.has_derived_data() {
            return;
        }
        self.subcubes = vec![Vec::new(); Subcube::NUM_SUBCUBES];
        for (i, s) in self.stars.iter().enumerate() {
            self.subcubes[s.subcube().as_usize()].push(CatalogIndex(i));
        }
    }

    //mp derive_data
    /// Build the spatial index over the current star list; a no-op if
    /// already built. Must be called (after [Catalog::sort]) before any
    /// geometric query
    pub fn derive_data(&mut self) {
        self.allocate_subcubes();
    }

    //mp sort
    /// Sort stars ascending by magnitude (brightest first) and invalidate
    /// any derived spatial index
    pub fn sort(&mut self) {
        self.stars
            .sort_by(|a, b| a.mag().partial_cmp(&b.mag()).unwrap());
        self.clear_derived_data();
        self.sorted = true;
    }

    //mp star
    /// Borrow the star at a given index
    pub fn star(&self, index: CatalogIndex) -> &Star {
        &self.stars[index.0]
    }

    //mp iter_stars
    /// Iterate over all stars with their catalog index
    pub fn iter_stars(&self) -> impl Iterator<Item = (CatalogIndex, &Star)> {
        self.stars
            .iter()
            .enumerate()
            .map(|(i, s)| (CatalogIndex(i), s))
    }

    //mp neighbors_within
    /// Find all stars within angular distance `radius` (radians) of a
    /// query vector, as `(cos_angle, index)` pairs
    ///
    /// Requires [Catalog::derive_data] to have been called. This is the
    /// primitive both the Density Thinner and the Pattern Enumerator build
    /// on: the former asks whether a closer-than-`d` neighbor already
    /// exists (by checking whether the returned set is non-empty), the
    /// latter collects every neighbor within `pattern_fov`
    pub fn neighbors_within(&self, v: &Vec3, radius: f64) -> Vec<(f64, CatalogIndex)> {
        assert!(
            self.has_derived_data(),
            "neighbors_within requires derive_data to have been called"
        );
        let cos_min = radius.cos();
        let range = Subcube::range_for_angle(radius);
        let s = Subcube::of_vector(v);
        let mut result = vec![];
        for sc in s.iter_range(range) {
            for index in self[sc].iter() {
                let c = v.dot(self.stars[index.0].vector());
                if c >= cos_min {
                    result.push((c, *index));
                }
            }
        }
        result
    }
}

//ip Index<CatalogIndex> for Catalog
impl std::ops::Index<CatalogIndex> for Catalog {
    type Output = Star;
    fn index(&self, s: CatalogIndex) -> &Star {
        &self.stars[s.0]
    }
}

//ip Index<Subcube> for Catalog
impl std::ops::Index<Subcube> for Catalog {
    type Output = Vec<CatalogIndex>;
    fn index(&self, q: Subcube) -> &Vec<CatalogIndex> {
        &self.subcubes[q.as_usize()]
    }
}
