//! The online plate solver: matches image centroids against a generated
//! [Database] and recovers celestial pointing

use std::time::Instant;

use geo_nd::Vector;

use crate::pattern::fingerprint;
use crate::{CatalogIndex, Database, Vec3};

//a SolverConfig
//tp SolverConfig
/// Tunables governing candidate enumeration and acceptance
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Only the brightest `pattern_checking_stars` centroids participate
    /// in candidate pattern enumeration; every centroid participates in
    /// verification
    pub pattern_checking_stars: usize,
    /// Angular match tolerance, as a fraction of the field of view
    pub match_radius: f64,
    /// Maximum acceptable mismatch probability
    pub match_threshold: f64,
}

//ip Default for SolverConfig
impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pattern_checking_stars: 8,
            match_radius: 0.01,
            match_threshold: 1e-9,
        }
    }
}

//a Solution and SolveResult
//tp Solution
/// A successful solve's astrometric result
#[derive(Debug, Clone, Copy)]
pub struct Solution {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub roll_deg: f64,
    pub fov_deg: f64,
    pub rmse_arcsec: f64,
    pub matches: usize,
    pub prob_mismatch: f64,
    pub t_solve_ms: f64,
}

//tp SolveResult
/// The outcome of a solve attempt
///
/// A plain struct with optional astrometric fields would require every
/// caller to remember which fields are meaningless on failure; the
/// `NotSolved` variant makes that unrepresentable instead
#[derive(Debug, Clone, Copy)]
pub enum SolveResult {
    Solved(Solution),
    /// No candidate pattern's mismatch probability fell below
    /// `match_threshold`, or fewer than 4 centroids were supplied
    NotSolved { t_solve_ms: f64 },
}

//ip SolveResult
impl SolveResult {
    pub fn t_solve_ms(&self) -> f64 {
        match self {
            Self::Solved(s) => s.t_solve_ms,
            Self::NotSolved { t_solve_ms } => *t_solve_ms,
        }
    }
}

//a Solver
//tp Solver
/// Binds a [Database] to a [SolverConfig] for repeated solves
pub struct Solver<'db> {
    database: &'db Database,
    config: SolverConfig,
}

//ip Solver
impl<'db> Solver<'db> {
    //cp new
    pub fn new(database: &'db Database, config: SolverConfig) -> Self {
        Self { database, config }
    }

    //mp solve
    /// Solve for celestial pointing from brightness-ordered pixel
    /// centroids `(y, x)`
    ///
    /// `size = (height, width)` in pixels. `fov_estimate`/`fov_max_error`
    /// are in degrees, matching the external interface; `None` lets the
    /// solver try the midpoint of the database's FOV range with no
    /// rejection on mismatch
    pub fn solve(
        &self,
        centroids: &[(f64, f64)],
        size: (f64, f64),
        fov_estimate: Option<f64>,
        fov_max_error: Option<f64>,
    ) -> SolveResult {
        let start = Instant::now();
        let not_solved = || SolveResult::NotSolved {
            t_solve_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        if centroids.len() < 4 {
            return not_solved();
        }

        let props = self.database.properties();
        let fov_estimate_rad = fov_estimate.map(f64::to_radians);
        let fov_max_error_rad = fov_max_error.map(f64::to_radians);
        let trial_fov = fov_estimate_rad.unwrap_or((props.min_fov + props.max_fov) / 2.0);

        let k = self.config.pattern_checking_stars.min(centroids.len());
        let table_size = self.database.patterns().len();

        for quad in CandidateQuadruples::new(k) {
            let image_vectors: [Vec3; 4] =
                std::array::from_fn(|i| crate::geometry::lift(
                    centroids[quad[i]].0,
                    centroids[quad[i]].1,
                    size,
                    trial_fov,
                ));
            let (image_ratios, image_largest_edge) = fingerprint::edge_ratios(&image_vectors);
            let probe_keys =
                fingerprint::probe_box(&image_ratios, props.pattern_bins as usize, props.pattern_max_error as f64);

            for key in probe_keys {
                let hash_index =
                    crate::pattern::PatternCatalog::key_to_index(&key, props.pattern_bins as usize, table_size);
                for pattern in self.database.patterns().probe(hash_index) {
                    let catalog_vectors: [Vec3; 4] = std::array::from_fn(|i| {
                        *self
                            .database
                            .catalog()
                            .star(CatalogIndex::from(pattern[i] as usize))
                            .vector()
                    });
                    let (catalog_ratios, catalog_largest_edge) =
                        fingerprint::edge_ratios(&catalog_vectors);
                    let within_tolerance = (0..5).all(|i| {
                        (catalog_ratios[i] - image_ratios[i]).abs()
                            <= props.pattern_max_error as f64
                    });
                    if !within_tolerance {
                        continue;
                    }

                    let refined_fov = match fov_estimate_rad {
                        Some(est) => est * catalog_largest_edge / image_largest_edge,
                        None => {
                            let d = max_edge_pixel_distance(&[
                                centroids[quad[0]],
                                centroids[quad[1]],
                                centroids[quad[2]],
                                centroids[quad[3]],
                            ]);
                            let focal = d / (2.0 * (catalog_largest_edge / 2.0).tan());
                            2.0 * (size.1 / (2.0 * focal)).atan()
                        }
                    };
                    if let (Some(est), Some(max_err)) = (fov_estimate_rad, fov_max_error_rad) {
                        if (refined_fov - est).abs() > max_err {
                            continue;
                        }
                    }

                    if let Some(solution) = self.try_pose(
                        centroids,
                        size,
                        refined_fov,
                        &quad,
                        pattern,
                        start,
                    ) {
                        return SolveResult::Solved(solution);
                    }
                }
            }
        }

        not_solved()
    }

    //mi try_pose
    /// Attempt pose estimation and verification for one surviving
    /// catalog pattern candidate; `None` if verification fails
    fn try_pose(
        &self,
        centroids: &[(f64, f64)],
        size: (f64, f64),
        refined_fov: f64,
        quad: &[usize; 4],
        pattern: [u32; 4],
        start: Instant,
    ) -> Option<Solution> {
        let mut image_vectors: [Vec3; 4] =
            std::array::from_fn(|i| crate::geometry::lift(
                centroids[quad[i]].0,
                centroids[quad[i]].1,
                size,
                refined_fov,
            ));
        let mut catalog_vectors: [Vec3; 4] = std::array::from_fn(|i| {
            *self
                .database
                .catalog()
                .star(CatalogIndex::from(pattern[i] as usize))
                .vector()
        });

        sort_by_distance_from_centroid(&mut image_vectors);
        sort_by_distance_from_centroid(&mut catalog_vectors);

        let r = crate::geometry::solve_wahba(&image_vectors, &catalog_vectors);

        let pointing: Vec3 = [r[(0, 0)], r[(0, 1)], r[(0, 2)]].into();
        let diag_fov = refined_fov * (size.0 * size.0 + size.1 * size.1).sqrt() / size.1;
        let mut nearby = self
            .database
            .catalog()
            .neighbors_within(&pointing, diag_fov / 2.0);
        nearby.sort_by_key(|(_, idx)| idx.as_usize());
        let verification_cap = self.database.properties().verification_stars_per_fov as usize;
        nearby.truncate(verification_cap);
        let k_nearby = nearby.len();

        let cos_match = (self.config.match_radius * refined_fov).cos();
        let r_t = r.transpose();
        let mut matched_image = vec![];
        let mut matched_catalog = vec![];
        for &(y, x) in centroids {
            let v_img = crate::geometry::lift(y, x, size, refined_fov);
            let v_img_n = nalgebra::Vector3::new(v_img[0], v_img[1], v_img[2]);
            let rotated = r_t * v_img_n;
            let rotated: Vec3 = [rotated.x, rotated.y, rotated.z].into();
            let mut hit = None;
            let mut count = 0;
            for &(_, idx) in &nearby {
                let c = *self.database.catalog().star(idx).vector();
                if rotated.dot(&c) >= cos_match {
                    count += 1;
                    hit = Some(c);
                }
            }
            if count == 1 {
                matched_image.push(v_img);
                matched_catalog.push(hit.unwrap());
            }
        }
        let m = matched_image.len();

        let prob = mismatch_probability(
            centroids.len(),
            m,
            k_nearby,
            self.config.match_radius,
        );
        if prob >= self.config.match_threshold {
            return None;
        }

        let r_final = crate::geometry::solve_wahba(&matched_image, &matched_catalog);
        let rmse = crate::geometry::residual_rms_arcsec(&matched_image, &matched_catalog, &r_final);
        let (ra, dec, roll) = crate::geometry::ra_dec_roll(&r_final);

        Some(Solution {
            ra_deg: ra.to_degrees(),
            dec_deg: dec.to_degrees(),
            roll_deg: roll.to_degrees(),
            fov_deg: refined_fov.to_degrees(),
            rmse_arcsec: rmse,
            matches: m,
            prob_mismatch: prob,
            t_solve_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

//fi sort_by_distance_from_centroid
/// Sort 4 vectors ascending by Euclidean distance from their arithmetic
/// mean; congruent patterns share this rank order regardless of which
/// concrete indices they start at, giving a canonical correspondence
/// without a combinatorial search over all 4! pairings
fn sort_by_distance_from_centroid(vectors: &mut [Vec3; 4]) {
    let mut centroid: Vec3 = [0.0, 0.0, 0.0].into();
    for v in vectors.iter() {
        centroid = [centroid[0] + v[0], centroid[1] + v[1], centroid[2] + v[2]].into();
    }
    let centroid: Vec3 = [centroid[0] / 4.0, centroid[1] / 4.0, centroid[2] / 4.0].into();
    let dist = |v: &Vec3| {
        let d = [v[0] - centroid[0], v[1] - centroid[1], v[2] - centroid[2]];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    };
    vectors.sort_by(|a, b| dist(a).partial_cmp(&dist(b)).unwrap());
}

//fi max_edge_pixel_distance
/// The largest Euclidean pixel distance between any two of the 4
/// centroids
///
/// Computed purely over raw pixel coordinates, with no reference to the
/// lifted bearing vectors: those were lifted at the trial FOV, which, in
/// the no-`fov_estimate` path that calls this function, is only the
/// midpoint of the database's FOV range and can be far from the image's
/// true FOV. Ranking pairs by angle under a wrong trial FOV need not
/// agree with ranking them by pixel distance, which would make the very
/// FOV refinement this computes circular on the guess it is meant to
/// replace.
fn max_edge_pixel_distance(centroids: &[(f64, f64); 4]) -> f64 {
    let mut best = 0.0f64;
    for i in 0..4 {
        for j in (i + 1)..4 {
            let dy = centroids[i].0 - centroids[j].0;
            let dx = centroids[i].1 - centroids[j].1;
            let d = (dy * dy + dx * dx).sqrt();
            if d > best {
                best = d;
            }
        }
    }
    best
}

//fi mismatch_probability
/// Probability that the observed match count would arise by chance
/// between `n` image centroids and a pattern match against `k` nearby
/// catalog stars, given `m` verified matches
///
/// Lower is better: a small probability means the observed run of
/// matches is very unlikely under the null hypothesis of random
/// alignment, i.e. the match is very likely genuine. Two of the `m`
/// matches are treated as "free" (already consumed fitting the pose to
/// the originating 4-star pattern) when counting allowed non-matches
fn mismatch_probability(n: usize, m: usize, k: usize, match_radius: f64) -> f64 {
    let p_match = (k as f64) * match_radius * match_radius;
    let p_non_match = (1.0 - p_match).clamp(1e-15, 1.0 - 1e-15);
    let allowed_non_matches = n as isize - (m as isize - 2);
    binomial_cdf(allowed_non_matches, n, p_non_match)
}

//fi binomial_cdf
/// `P(X <= x)` for `X ~ Binomial(n, p)`, via the iterative PMF-term
/// recurrence `term(i+1) = term(i) * (n-i)/(i+1) * p/(1-p)`, avoiding
/// repeated large binomial-coefficient evaluation
fn binomial_cdf(x: isize, n: usize, p: f64) -> f64 {
    if x < 0 {
        return 0.0;
    }
    if x as usize >= n {
        return 1.0;
    }
    let x = x as usize;
    let mut term = (1.0 - p).powi(n as i32);
    let mut sum = term;
    for i in 0..x {
        term *= (n - i) as f64 / (i + 1) as f64 * p / (1.0 - p);
        sum += term;
    }
    sum.clamp(0.0, 1.0)
}

//a CandidateQuadruples
//tp CandidateQuadruples
/// Brightness-biased lexicographic enumeration of 4-index combinations
/// from `0..k`: `{0,1,2,3}` first, then indices increment from the right
/// while remaining strictly increasing, cascading a reset leftward when
/// an index reaches its maximum
///
/// Identical in order to iterating `itertools.combinations(range(k), 4)`,
/// which front-loads combinations drawn from the brightest centroids
struct CandidateQuadruples {
    k: usize,
    indices: Option<[usize; 4]>,
}

//ip CandidateQuadruples
impl CandidateQuadruples {
    fn new(k: usize) -> Self {
        let indices = if k >= 4 {
            Some([0, 1, 2, 3])
        } else {
            None
        };
        Self { k, indices }
    }
}

//ip Iterator for CandidateQuadruples
impl Iterator for CandidateQuadruples {
    type Item = [usize; 4];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.indices?;

        let mut i = 3isize;
        while i >= 0 && current[i as usize] == i as usize + self.k - 4 {
            i -= 1;
        }
        self.indices = if i < 0 {
            None
        } else {
            let mut next = current;
            next[i as usize] += 1;
            for j in (i as usize + 1)..4 {
                next[j] = next[j - 1] + 1;
            }
            Some(next)
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_starts_brightest() {
        let mut iter = CandidateQuadruples::new(5);
        assert_eq!(iter.next(), Some([0, 1, 2, 3]));
        assert_eq!(iter.next(), Some([0, 1, 2, 4]));
        assert_eq!(iter.next(), Some([0, 1, 3, 4]));
        assert_eq!(iter.next(), Some([0, 2, 3, 4]));
        assert_eq!(iter.next(), Some([1, 2, 3, 4]));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn candidate_count_matches_choose() {
        let count = CandidateQuadruples::new(8).count();
        assert_eq!(count, 70);
    }

    #[test]
    fn binomial_cdf_matches_boundaries() {
        assert_eq!(binomial_cdf(-1, 10, 0.5), 0.0);
        assert_eq!(binomial_cdf(10, 10, 0.5), 1.0);
        let mid = binomial_cdf(5, 10, 0.5);
        assert!(mid > 0.6 && mid < 1.0);
    }
}
