//! Greedy angular-density thinning
//!
//! Reduces a brightness-sorted star list to a subset with approximately
//! uniform density across the sky: a star is kept only if no
//! already-kept star lies within a density-derived angular threshold

use crate::Catalog;

//fp threshold
/// The angular separation threshold for `stars_per_fov` stars spread
/// uniformly over a field of view `fov` (radians)
pub fn threshold(stars_per_fov: f64, fov: f64) -> f64 {
    0.6 * fov / stars_per_fov.sqrt()
}

//fp thin
/// Extend a keep-mask with a greedy maximal-independent-set selection at
/// threshold `threshold(stars_per_fov, fov)`
///
/// `keep` is grown to `catalog.len()` on first use, with index 0 (the
/// brightest star) always retained. Passing the mask from a previous,
/// larger-FOV call lets the multi-scale Pattern Enumerator build nested
/// selections: each call only adds stars not already kept, never removes
/// one, so a star kept at a coarse tier stays kept at every finer tier
pub fn thin(catalog: &Catalog, keep: &mut Vec<bool>, stars_per_fov: f64, fov: f64) {
    let n = catalog.len();
    if keep.len() != n {
        *keep = vec![false; n];
        if n > 0 {
            keep[0] = true;
        }
    }
    let d = threshold(stars_per_fov, fov);
    for (index, star) in catalog.iter_stars() {
        let i = index.as_usize();
        if keep[i] {
            continue;
        }
        let occupied = catalog
            .neighbors_within(star.vector(), d)
            .iter()
            .any(|(_, n)| keep[n.as_usize()]);
        if !occupied {
            keep[i] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Star;
    use geo_nd::Vector;

    /// A near-uniform sphere of stars via a golden-angle spiral, brightest
    /// (index 0) first
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
    fn kept_stars_respect_minimum_separation() {
        let catalog = spiral_catalog(400);
        let stars_per_fov = 10.0;
        let fov = 20f64.to_radians();
        let mut keep = vec![];
        thin(&catalog, &mut keep, stars_per_fov, fov);
        let d = threshold(stars_per_fov, fov);

        let kept: Vec<_> = catalog
            .iter_stars()
            .filter(|(i, _)| keep[i.as_usize()])
            .map(|(_, s)| *s.vector())
            .collect();
        assert!(kept.len() > 1, "thinning should not collapse to one star");
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                let cos_sep = kept[i].dot(&kept[j]).clamp(-1.0, 1.0);
                let sep = cos_sep.acos();
                assert!(
                    sep > d - 1e-9,
                    "kept stars {} and {} are {} rad apart, below threshold {}",
                    i,
                    j,
                    sep,
                    d
                );
            }
        }
    }

    #[test]
    fn brightest_star_is_always_kept() {
        let catalog = spiral_catalog(50);
        let mut keep = vec![];
        thin(&catalog, &mut keep, 10.0, 20f64.to_radians());
        assert!(keep[0]);
    }
}
