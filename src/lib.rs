/*!
# star_tracker

A lost-in-space plate solver: given star centroids extracted from an
uncalibrated camera image and an approximate field of view, recover the
absolute celestial pointing (right ascension, declination, roll) and a
refined field of view.

The crate is split into the offline half, which builds a pattern-hash
database from a star catalog ([`catalogs`], [`pattern`], [`db`]), and the
online half, which matches image centroids against that database
([`solver`], [`geometry`]).

Centroid extraction from raw pixels, catalog file download/management and
image crop/downsample are treated as external concerns and are not provided
here; callers supply centroids and a parsed catalog.
*/

pub type Vec3 = geo_nd::FArray<f64, 3>;
pub type Vec4 = geo_nd::FArray<f64, 4>;
pub type Quat = geo_nd::QArray<f64, Vec3, Vec4>;

mod error;
pub use error::Error;

mod subcube;
pub use subcube::Subcube;

mod star;
pub use star::Star;

mod catalog;
pub use catalog::{Catalog, CatalogIndex};

pub mod catalogs;

pub mod pattern;

pub mod db;
pub use db::{Database, DatabaseProperties};

pub mod geometry;

pub mod solver;
pub use solver::{SolveResult, Solver};

pub mod cmdline;
