//! End-to-end generate-then-solve scenarios against a small synthetic sky
//!
//! Six tight clusters of 8 stars each are placed on mutually orthogonal
//! axes, far enough apart (90 degrees) that no cross-cluster pattern can
//! form. Every 4-subset of a single cluster is a valid stored pattern
//! (the cluster's neighbor graph is complete within `max_fov`), so the
//! image centroids of one cluster are guaranteed to hash to a stored
//! pattern regardless of presentation order.

use approx::assert_abs_diff_eq;

use star_tracker::geometry;
use star_tracker::solver::{SolveResult, SolverConfig};
use star_tracker::{Catalog, CatalogIndex, Database, DatabaseProperties, Solver, Star};

const CLUSTER_RADIUS_DEG: f64 = 4.0;
const MAX_FOV_DEG: f64 = 10.0;
const IMAGE_SIZE: (f64, f64) = (1000.0, 1000.0);

/// Unit vector offset from an axis-aligned cluster center by small tangent
/// coordinates `(da, db)`
fn unit_vec(axis: usize, da: f64, db: f64) -> [f64; 3] {
    let raw = match axis {
        0 => [1.0, da, db],
        1 => [-1.0, da, db],
        2 => [da, 1.0, db],
        3 => [da, -1.0, db],
        4 => [da, db, 1.0],
        _ => [da, db, -1.0],
    };
    let norm = (raw[0] * raw[0] + raw[1] * raw[1] + raw[2] * raw[2]).sqrt();
    [raw[0] / norm, raw[1] / norm, raw[2] / norm]
}

fn star_at(axis: usize, da: f64, db: f64, mag: f32) -> Star {
    let v = unit_vec(axis, da, db);
    let ra = v[1].atan2(v[0]);
    let dec = v[2].asin();
    Star::new(ra, dec, mag)
}

/// 8 points on a circle of angular radius `CLUSTER_RADIUS_DEG` around a
/// cluster's axis, asymmetric distances from their own centroid so that
/// the solver's canonical "sort by distance from centroid" pairing is
/// never ambiguous between the image and catalog copies
fn octagon_offsets() -> [(f64, f64); 8] {
    let r = CLUSTER_RADIUS_DEG.to_radians();
    std::array::from_fn(|k| {
        let angle = k as f64 * std::f64::consts::FRAC_PI_4;
        (r * angle.cos(), r * angle.sin())
    })
}

/// Six 90-degree-separated clusters of 8 stars each (48 stars total);
/// cluster 0 (axis +X) is used as the test image, with camera frame
/// coinciding with the celestial frame (pointing (1,0,0), zero roll)
fn build_catalog() -> Catalog {
    let offsets = octagon_offsets();
    let mut catalog = Catalog::default();
    let mut i = 0u32;
    for axis in 0..6 {
        for &(da, db) in &offsets {
            catalog.add_star(star_at(axis, da, db, 1.0 + i as f32 * 0.01));
            i += 1;
        }
    }
    catalog.sort();
    catalog.derive_data();
    catalog
}

fn build_database(catalog: &Catalog) -> Database {
    let properties = DatabaseProperties::new(
        "synthetic".to_string(),
        MAX_FOV_DEG.to_radians(),
        MAX_FOV_DEG.to_radians(),
        0.01,
        10,
        20,
        2.0,
        false,
        None,
        None,
    );
    Database::generate(properties, catalog).expect("tiny synthetic database always fits its table")
}

/// The 8 true pixel centroids of cluster 0, brightest-first, as they would
/// appear under an ideal pinhole camera pointed exactly at axis 0 with
/// zero roll (camera frame == celestial frame, since cluster 0's stars
/// were constructed directly as `[1, a, b]` offsets)
fn cluster0_centroids(catalog: &Catalog, image_fov_deg: f64) -> Vec<(f64, f64)> {
    let fov = image_fov_deg.to_radians();
    (0..8)
        .map(|i| {
            let v = *catalog.star(CatalogIndex::from(i)).vector();
            geometry::project(&v, IMAGE_SIZE, fov)
        })
        .collect()
}

#[test]
fn solves_synthetic_cluster_from_ideal_centroids() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    let centroids = cluster0_centroids(&catalog, MAX_FOV_DEG);
    match solver.solve(&centroids, IMAGE_SIZE, None, None) {
        SolveResult::Solved(solution) => {
            assert_abs_diff_eq!(solution.ra_deg, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(solution.dec_deg, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(solution.roll_deg, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(solution.fov_deg, MAX_FOV_DEG, epsilon = 0.05);
            assert_eq!(solution.matches, 8);
            assert!(solution.prob_mismatch < 1e-9);
            assert!(solution.rmse_arcsec < 10.0);
        }
        SolveResult::NotSolved { .. } => panic!("expected a solve from an exact, noiseless image"),
    }
}

#[test]
fn permuted_centroid_order_yields_the_same_solution() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    let centroids = cluster0_centroids(&catalog, MAX_FOV_DEG);
    // Every 4-subset of this cluster is itself a stored pattern, so the
    // very first candidate quadruple tried always matches regardless of
    // how the centroids are ordered.
    let order = [3usize, 0, 5, 1, 7, 2, 6, 4];
    let shuffled: Vec<(f64, f64)> = order.iter().map(|&i| centroids[i]).collect();

    match solver.solve(&shuffled, IMAGE_SIZE, None, None) {
        SolveResult::Solved(solution) => {
            assert_abs_diff_eq!(solution.ra_deg, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(solution.dec_deg, 0.0, epsilon = 1e-3);
            assert_eq!(solution.matches, 8);
        }
        SolveResult::NotSolved { .. } => panic!("reordering centroids must not change the set solved"),
    }
}

#[test]
fn spurious_centroid_is_excluded_from_the_match() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    let mut centroids = cluster0_centroids(&catalog, MAX_FOV_DEG);
    // A ninth, dimmest centroid with no corresponding catalog star, placed
    // near an image corner far from the cluster's own footprint.
    centroids.push((50.0, 50.0));

    match solver.solve(&centroids, IMAGE_SIZE, None, None) {
        SolveResult::Solved(solution) => {
            assert_eq!(solution.matches, 8, "the spurious centroid must not count as a match");
            assert!(solution.prob_mismatch < 1e-9);
        }
        SolveResult::NotSolved { .. } => panic!("a spurious extra centroid must not block the solve"),
    }
}

#[test]
fn unrelated_centroid_pattern_does_not_solve() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    // A generic square, unrelated to any star pattern this tiny catalog
    // ever enumerated.
    let centroids = vec![(200.0, 200.0), (200.0, 800.0), (800.0, 200.0), (800.0, 800.0)];
    match solver.solve(&centroids, IMAGE_SIZE, None, None) {
        SolveResult::Solved(_) => panic!("an unrelated 4-point pattern should not hash-match"),
        SolveResult::NotSolved { t_solve_ms } => {
            assert!(t_solve_ms >= 0.0, "T_solve must always be populated");
        }
    }
}

#[test]
fn mismatched_fov_estimate_is_rejected() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    // The image was actually captured at half the database's field of
    // view, but the caller (wrongly) asserts the database's own FOV with
    // a tight error bound: the refined FOV computed from the pattern's
    // own geometry cannot match within that bound.
    let centroids = cluster0_centroids(&catalog, MAX_FOV_DEG / 2.0);
    match solver.solve(&centroids, IMAGE_SIZE, Some(MAX_FOV_DEG), Some(0.5)) {
        SolveResult::Solved(_) => panic!("a mismatched fov_estimate must reject every candidate"),
        SolveResult::NotSolved { .. } => {}
    }
}

#[test]
fn mirrored_image_does_not_reproduce_the_true_pointing() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    // Mirroring every centroid's x pixel coordinate about the image
    // center reflects the camera-frame bearing vectors (negates their
    // second component) while leaving every pairwise angle, and so every
    // edge ratio, unchanged: the mirrored pattern hashes to exactly the
    // same table slot as the true one. Since `solve_wahba` does not
    // correct for a reflected correspondence, this is the scenario that
    // exercises the uncorrected-reflection path: the fit is not the
    // identity rotation the true image produces.
    let centroids: Vec<(f64, f64)> = cluster0_centroids(&catalog, MAX_FOV_DEG)
        .into_iter()
        .map(|(y, x)| (y, IMAGE_SIZE.1 - x))
        .collect();

    match solver.solve(&centroids, IMAGE_SIZE, None, None) {
        SolveResult::NotSolved { .. } => {}
        SolveResult::Solved(solution) => {
            let near_true_pointing = solution.ra_deg.abs() < 1e-3
                && solution.dec_deg.abs() < 1e-3
                && solution.roll_deg.abs() < 1e-3
                && solution.rmse_arcsec < 10.0;
            assert!(
                !near_true_pointing,
                "a mirrored image must not be accepted as the true, unreflected pointing"
            );
        }
    }
}

#[test]
fn fewer_than_four_centroids_never_solves() {
    let catalog = build_catalog();
    let db = build_database(&catalog);
    let solver = Solver::new(&db, SolverConfig::default());

    let centroids = cluster0_centroids(&catalog, MAX_FOV_DEG);
    match solver.solve(&centroids[..3], IMAGE_SIZE, None, None) {
        SolveResult::NotSolved { t_solve_ms } => assert!(t_solve_ms >= 0.0),
        SolveResult::Solved(_) => panic!("fewer than 4 centroids is a degenerate input"),
    }
}
