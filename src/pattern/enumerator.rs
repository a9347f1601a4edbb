//! Enumeration of 4-star patterns from a thinned catalog
//!
//! For each pattern star in turn, every 3-subset of its not-yet-consumed
//! neighbors is combined with it to form a candidate 4-set. Multi-scale
//! databases repeat this at a series of geometrically spaced field-of-view
//! tiers so the catalog carries overlapping patterns at multiple scales

use std::collections::HashSet;

use geo_nd::Vector;

use crate::{Catalog, CatalogIndex};

//fp fov_tiers
/// The geometrically spaced field-of-view tiers a multi-scale database is
/// built at, from `min_fov` to `max_fov` inclusive
pub fn fov_tiers(min_fov: f64, max_fov: f64) -> Vec<f64> {
    if max_fov <= min_fov {
        return vec![max_fov];
    }
    let divisions = (max_fov / min_fov).log2().ceil() as usize + 1;
    if divisions <= 1 {
        return vec![max_fov];
    }
    let log_min = min_fov.log2();
    let log_max = max_fov.log2();
    (0..divisions)
        .map(|i| {
            let t = i as f64 / (divisions - 1) as f64;
            2f64.powf(log_min + t * (log_max - log_min))
        })
        .collect()
}

//fi combinations3
/// All 3-element subsets of `items`, as index triples into `items`
fn combinations3(items: &[usize]) -> Vec<[usize; 3]> {
    let mut out = vec![];
    let n = items.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                out.push([items[i], items[j], items[k]]);
            }
        }
    }
    out
}

//fi min_pairwise_dot
fn min_pairwise_dot(vectors: &[crate::Vec3; 4]) -> f64 {
    let mut min = 1.0f64;
    for i in 0..4 {
        for j in (i + 1)..4 {
            min = min.min(vectors[i].dot(&vectors[j]));
        }
    }
    min
}

//fp enumerate_patterns
/// Enumerate 4-star patterns centered on every star in `pattern_keep`,
/// inserting the sorted star-index tuples into `patterns`
///
/// Neighbors are queried within `pattern_fov` (or `pattern_fov/2` when
/// `simplify_pattern`, which trades symmetry for speed by skipping the
/// exact pairwise-max verification). A star already used as a pivot is
/// excluded from later pivots' neighbor sets, matching the reference
/// algorithm's "available stars" bookkeeping
pub fn enumerate_patterns(
    catalog: &Catalog,
    pattern_keep: &[bool],
    pattern_fov: f64,
    simplify_pattern: bool,
    patterns: &mut HashSet<[u32; 4]>,
) {
    let n = catalog.len();
    let mut available = pattern_keep.to_vec();
    let query_radius = if simplify_pattern {
        pattern_fov / 2.0
    } else {
        pattern_fov
    };
    let cos_fov = pattern_fov.cos();

    for pivot_raw in 0..n {
        if !pattern_keep[pivot_raw] {
            continue;
        }
        available[pivot_raw] = false;
        let pivot = CatalogIndex::from(pivot_raw);
        let pivot_vec = *catalog.star(pivot).vector();

        let neighbors: Vec<usize> = catalog
            .neighbors_within(&pivot_vec, query_radius)
            .into_iter()
            .map(|(_, idx)| idx.as_usize())
            .filter(|&i| i != pivot_raw && available[i])
            .collect();

        for triple in combinations3(&neighbors) {
            if !simplify_pattern {
                let vectors = [
                    pivot_vec,
                    *catalog.star(CatalogIndex::from(triple[0])).vector(),
                    *catalog.star(CatalogIndex::from(triple[1])).vector(),
                    *catalog.star(CatalogIndex::from(triple[2])).vector(),
                ];
                if min_pairwise_dot(&vectors) <= cos_fov {
                    continue;
                }
            }
            let mut tuple = [
                pivot_raw as u32,
                triple[0] as u32,
                triple[1] as u32,
                triple[2] as u32,
            ];
            tuple.sort_unstable();
            patterns.insert(tuple);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Star;

    fn spiral_catalog(n: usize) -> Catalog {
        let mut catalog = Catalog::default();
        let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        for i in 0..n {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / (n as f64);
            let r = (1.0 - z * z).max(0.0).sqrt();
            let theta = golden * i as f64;
            let (x, y) = (theta.cos() * r, theta.sin() * r);
            let ra = y.atan2(x);
            let dec = z.asin();
            catalog.add_star(Star::new(ra, dec, i as f32 * 0.01));
        }
        catalog.sort();
        catalog.derive_data();
        catalog
    }

    #[test]
    fn fov_tiers_span_min_to_max() {
        let tiers = fov_tiers(5f64.to_radians(), 40f64.to_radians());
        assert!(tiers.len() >= 2);
        assert!((tiers[0] - 5f64.to_radians()).abs() < 1e-9);
        assert!((*tiers.last().unwrap() - 40f64.to_radians()).abs() < 1e-9);
        for w in tiers.windows(2) {
            assert!(w[1] > w[0], "tiers must increase");
        }
    }

    #[test]
    fn fov_tiers_single_when_equal() {
        let tiers = fov_tiers(10f64.to_radians(), 10f64.to_radians());
        assert_eq!(tiers, vec![10f64.to_radians()]);
    }

    #[test]
    fn patterns_respect_max_pairwise_separation() {
        let catalog = spiral_catalog(300);
        let keep = vec![true; catalog.len()];
        let pattern_fov = 15f64.to_radians();
        let cos_fov = pattern_fov.cos();
        let mut patterns = HashSet::new();
        enumerate_patterns(&catalog, &keep, pattern_fov, false, &mut patterns);
        assert!(!patterns.is_empty());

        for tuple in &patterns {
            let vectors: [crate::Vec3; 4] = std::array::from_fn(|i| {
                *catalog.star(CatalogIndex::from(tuple[i] as usize)).vector()
            });
            for i in 0..4 {
                for j in (i + 1)..4 {
                    let dot = vectors[i].dot(&vectors[j]);
                    assert!(
                        dot > cos_fov - 1e-9,
                        "pattern {:?} has a pair exceeding max_fov",
                        tuple
                    );
                }
            }
        }
    }
}
