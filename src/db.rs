//! Database generation and persistence
//!
//! Ties the offline pipeline together: a loaded [Catalog] is thinned at a
//! series of field-of-view tiers, 4-star patterns are enumerated and
//! hashed into a [PatternCatalog], and the trimmed verification-star table
//! plus pattern catalog plus generation properties are persisted as a
//! single compressed archive

#[cfg(feature = "postcard")]
use std::io::{Read, Write};
#[cfg(feature = "postcard")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pattern::{self, PatternCatalog};
use crate::{Catalog, Error};

//a DatabaseProperties
//tp DatabaseProperties
/// The parameters a database was generated with, persisted alongside the
/// star table and pattern catalog so a solver can interpret them
///
/// Immutable once a [Database] has been generated. Two legacy key names
/// are accepted when deserializing an older archive:
/// `catalog_stars_per_fov` for `verification_stars_per_fov`, and
/// `star_min_magnitude` for `star_max_magnitude`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseProperties {
    /// Always `"edge_ratio"`; recorded for forward compatibility with a
    /// hypothetical alternative fingerprint scheme
    pub pattern_mode: String,
    /// Always 4
    pub pattern_size: u16,
    /// Number of quantization bins per edge-ratio dimension
    pub pattern_bins: u16,
    /// Quantization tolerance an edge ratio is probed within, e.g. 0.01
    pub pattern_max_error: f32,
    /// Largest field of view (radians) patterns were enumerated at
    pub max_fov: f64,
    /// Smallest field of view (radians) patterns were enumerated at
    pub min_fov: f64,
    /// Name of the catalog format the star data was loaded from
    pub star_catalog: String,
    /// Target density (stars per field of view) for pattern stars
    pub pattern_stars_per_fov: u16,
    /// Target density (stars per field of view) for verification stars
    #[serde(alias = "catalog_stars_per_fov")]
    pub verification_stars_per_fov: u16,
    /// Faintest magnitude admitted during catalog loading
    #[serde(alias = "star_min_magnitude")]
    pub star_max_magnitude: f32,
    /// Whether patterns were centered on the pivot at half the query
    /// radius rather than verified against the full `pattern_fov`
    pub simplify_pattern: bool,
    /// Optional right-ascension filter applied at load time, radians
    pub range_ra: Option<(f64, f64)>,
    /// Optional declination filter applied at load time, radians
    pub range_dec: Option<(f64, f64)>,
}

//ip DatabaseProperties
impl DatabaseProperties {
    //cp new
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        star_catalog: String,
        max_fov: f64,
        min_fov: f64,
        pattern_max_error: f32,
        pattern_stars_per_fov: u16,
        verification_stars_per_fov: u16,
        star_max_magnitude: f32,
        simplify_pattern: bool,
        range_ra: Option<(f64, f64)>,
        range_dec: Option<(f64, f64)>,
    ) -> Self {
        let pattern_bins = (1.0 / (4.0 * pattern_max_error as f64)).round() as u16;
        Self {
            pattern_mode: "edge_ratio".to_string(),
            pattern_size: 4,
            pattern_bins,
            pattern_max_error,
            max_fov,
            min_fov,
            star_catalog,
            pattern_stars_per_fov,
            verification_stars_per_fov,
            star_max_magnitude,
            simplify_pattern,
            range_ra,
            range_dec,
        }
    }
}

//a PatternSlots
//tp PatternSlots
/// The pattern catalog's slot table, persisted at the narrowest unsigned
/// width that holds the largest star index present
#[derive(Debug, Clone, Serialize, Deserialize)]
enum PatternSlots {
    W8(Vec<[u8; 4]>),
    W16(Vec<[u16; 4]>),
    W32(Vec<[u32; 4]>),
}

//ip PatternSlots
impl PatternSlots {
    //cp pack
    fn pack(slots: &[[u32; 4]]) -> Self {
        let max = slots.iter().flatten().copied().max().unwrap_or(0);
        if max < 256 {
            Self::W8(
                slots
                    .iter()
                    .map(|s| [s[0] as u8, s[1] as u8, s[2] as u8, s[3] as u8])
                    .collect(),
            )
        } else if max < 65536 {
            Self::W16(
                slots
                    .iter()
                    .map(|s| [s[0] as u16, s[1] as u16, s[2] as u16, s[3] as u16])
                    .collect(),
            )
        } else {
            Self::W32(slots.to_vec())
        }
    }

    //mp unpack
    fn unpack(self) -> Vec<[u32; 4]> {
        match self {
            Self::W8(v) => v
                .into_iter()
                .map(|s| [s[0] as u32, s[1] as u32, s[2] as u32, s[3] as u32])
                .collect(),
            Self::W16(v) => v
                .into_iter()
                .map(|s| [s[0] as u32, s[1] as u32, s[2] as u32, s[3] as u32])
                .collect(),
            Self::W32(v) => v,
        }
    }
}

//a Archive
//tp ArchiveRef
/// Borrowed view of a [Database] used to serialize it without cloning the
/// star table
#[derive(Serialize)]
struct ArchiveRef<'a> {
    properties: &'a DatabaseProperties,
    catalog: &'a Catalog,
    pattern_slots: PatternSlots,
}

//tp Archive
/// Owned form an archive is deserialized into
#[derive(Deserialize)]
struct Archive {
    properties: DatabaseProperties,
    catalog: Catalog,
    pattern_slots: PatternSlots,
}

//a Database
//tp Database
/// A generated pattern-hash database: the (thinned) verification-star
/// table, the pattern catalog hashed over it, and the properties used to
/// generate both
pub struct Database {
    properties: DatabaseProperties,
    catalog: Catalog,
    patterns: PatternCatalog,
}

//ip Database
impl Database {
    //ap properties
    pub fn properties(&self) -> &DatabaseProperties {
        &self.properties
    }

    //ap catalog
    /// The verification-star table; a superset of the pattern stars
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    //ap patterns
    pub fn patterns(&self) -> &PatternCatalog {
        &self.patterns
    }

    //fp generate
    /// Build a database from a magnitude-sorted, spatially-indexed source
    /// catalog according to `properties`
    ///
    /// Runs the Density Thinner across the geometrically spaced FOV tiers
    /// between `properties.min_fov` and `properties.max_fov`
    /// (largest-first, so each tier's selection mask extends the previous
    /// one), enumerates patterns at every tier, thins a second,
    /// independent verification-star selection seeded from the
    /// pattern-star mask, remaps pattern star indices into the trimmed
    /// verification-star table, and hashes every pattern into a fresh
    /// [PatternCatalog]
    pub fn generate(properties: DatabaseProperties, source: &Catalog) -> Result<Self, Error> {
        let tiers = pattern::enumerator::fov_tiers(properties.min_fov, properties.max_fov);

        let mut pattern_keep = vec![];
        let mut patterns: std::collections::HashSet<[u32; 4]> = std::collections::HashSet::new();
        for &fov in tiers.iter().rev() {
            pattern::density::thin(
                source,
                &mut pattern_keep,
                properties.pattern_stars_per_fov as f64,
                fov,
            );
            pattern::enumerator::enumerate_patterns(
                source,
                &pattern_keep,
                fov,
                properties.simplify_pattern,
                &mut patterns,
            );
        }

        let mut verification_keep = pattern_keep.clone();
        pattern::density::thin(
            source,
            &mut verification_keep,
            properties.verification_stars_per_fov as f64,
            properties.min_fov,
        );

        // Cumulative reindex: old catalog index -> new verification-table index
        let mut reindex = vec![usize::MAX; verification_keep.len()];
        let mut next = 0;
        let mut kept_stars = vec![];
        for (old_index, &kept) in verification_keep.iter().enumerate() {
            if kept {
                reindex[old_index] = next;
                next += 1;
                kept_stars.push(source.star(old_index.into()).clone());
            }
        }

        let mut catalog = Catalog::from_sorted_stars(kept_stars);
        catalog.derive_data();

        let mut remapped: std::collections::HashSet<[u32; 4]> =
            std::collections::HashSet::with_capacity(patterns.len());
        for tuple in &patterns {
            let mut new_tuple = [0u32; 4];
            for (i, &old) in tuple.iter().enumerate() {
                new_tuple[i] = reindex[old as usize] as u32;
            }
            new_tuple.sort_unstable();
            remapped.insert(new_tuple);
        }

        let mut table = PatternCatalog::with_capacity(remapped.len());
        let table_size = table.len();
        for tuple in remapped {
            let vectors = [
                *catalog.star((tuple[0] as usize).into()).vector(),
                *catalog.star((tuple[1] as usize).into()).vector(),
                *catalog.star((tuple[2] as usize).into()).vector(),
                *catalog.star((tuple[3] as usize).into()).vector(),
            ];
            let (ratios, _) = pattern::fingerprint::edge_ratios(&vectors);
            let key = pattern::fingerprint::quantize(&ratios, properties.pattern_bins as usize);
            let hash_index =
                PatternCatalog::key_to_index(&key, properties.pattern_bins as usize, table_size);
            table.insert(tuple, hash_index)?;
        }

        log::info!(
            "generated database: {} verification stars, {} patterns, table size {}",
            catalog.len(),
            table.slots().iter().filter(|s| **s != [0; 4]).count(),
            table.len()
        );

        Ok(Self {
            properties,
            catalog,
            patterns: table,
        })
    }

    //fp save
    #[cfg(feature = "postcard")]
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let archive = ArchiveRef {
            properties: &self.properties,
            catalog: &self.catalog,
            pattern_slots: PatternSlots::pack(self.patterns.slots()),
        };
        let bytes = postcard::to_allocvec(&archive)?;
        let file = std::fs::File::create(path).map_err(|source| Error::CatalogFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?;
        Ok(())
    }

    //fp load
    #[cfg(feature = "postcard")]
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(|source| Error::CatalogFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut decoder = flate2::read::GzDecoder::new(file);
        let mut bytes = vec![];
        decoder.read_to_end(&mut bytes)?;
        let archive: Archive =
            postcard::from_bytes(&bytes).map_err(|e| Error::DatabaseFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut catalog = archive.catalog;
        catalog.derive_data();
        Ok(Self {
            properties: archive.properties,
            catalog,
            patterns: PatternCatalog::from_slots(archive.pattern_slots.unpack()),
        })
    }
}
