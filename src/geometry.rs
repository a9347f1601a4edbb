//! Pinhole camera model, Wahba's problem, and rotation-matrix conventions
//!
//! `R` throughout this module maps catalog (celestial-frame) unit vectors
//! to their corresponding image (camera-frame) unit vectors: `R * v_cat ≈
//! v_img`. Its transpose maps camera vectors back to the celestial frame,
//! so the celestial-frame pointing direction of the camera's principal ray
//! is `R^T * (1,0,0)`, whose components are exactly `R`'s first row

use geo_nd::Vector;
use nalgebra::{Matrix3, Rotation3, SVD};

use crate::Vec3;

//fp pinhole_scale
/// Pixel-to-angle scale factor for a pinhole camera of `width` pixels and
/// horizontal field of view `fov` (radians)
pub fn pinhole_scale(fov: f64, width: f64) -> f64 {
    2.0 * (fov / 2.0).tan() / width
}

//fp lift
/// Lift a pixel centroid `(y, x)` to a camera-frame unit bearing vector
/// under an ideal pinhole model of `size = (height, width)` and field of
/// view `fov` (radians, horizontal)
///
/// The image +x axis maps to the camera -y axis; the principal ray
/// (centroid at the image center) is +x
pub fn lift(y: f64, x: f64, size: (f64, f64), fov: f64) -> Vec3 {
    let (height, width) = size;
    let scale = pinhole_scale(fov, width);
    let v: Vec3 = [
        1.0,
        (width / 2.0 - x) * scale,
        (height / 2.0 - y) * scale,
    ]
    .into();
    v.normalize()
}

//fp project
/// Inverse of [lift]: project a camera-frame unit vector to a pixel
/// centroid `(y, x)` under the same pinhole model
///
/// Only meaningful for vectors with a positive first (principal-ray)
/// component
pub fn project(v: &Vec3, size: (f64, f64), fov: f64) -> (f64, f64) {
    let (height, width) = size;
    let scale = pinhole_scale(fov, width);
    let x = width / 2.0 - (v[1] / v[0]) / scale;
    let y = height / 2.0 - (v[2] / v[0]) / scale;
    (y, x)
}

//fp solve_wahba
/// Solve Wahba's problem for the rotation `R` best aligning corresponding
/// unit vector sets, `R * reference[i] ≈ measured[i]`, by SVD of the
/// cross-covariance matrix
///
/// Deliberately does not enforce `det(R) = +1`: a mirrored correspondence
/// yields a reflection (`det(R) = -1`) rather than the nearest proper
/// rotation, so that such candidates are rejected by the downstream
/// verification step instead of being silently forced into an incorrect
/// proper rotation
pub fn solve_wahba(measured: &[Vec3], reference: &[Vec3]) -> Matrix3<f64> {
    let mut h = Matrix3::zeros();
    for (m, c) in measured.iter().zip(reference.iter()) {
        let m = nalgebra::Vector3::new(m[0], m[1], m[2]);
        let c = nalgebra::Vector3::new(c[0], c[1], c[2]);
        h += m * c.transpose();
    }
    let svd = SVD::new(h, true, true);
    let u = svd.u.expect("SVD::new(.., true, true) always computes u");
    let v_t = svd
        .v_t
        .expect("SVD::new(.., true, true) always computes v_t");
    u * v_t
}

//fp ra_dec_roll
/// Extract `(RA, Dec, Roll)` in radians from `R`, `RA` and `Roll` wrapped
/// to `[0, 2*pi)`
pub fn ra_dec_roll(r: &Matrix3<f64>) -> (f64, f64, f64) {
    let two_pi = std::f64::consts::TAU;
    let ra = r[(0, 1)].atan2(r[(0, 0)]).rem_euclid(two_pi);
    let dec = r[(0, 2)].atan2((r[(1, 2)] * r[(1, 2)] + r[(2, 2)] * r[(2, 2)]).sqrt());
    let roll = r[(1, 2)].atan2(r[(2, 2)]).rem_euclid(two_pi);
    (ra, dec, roll)
}

//fp rotation_of_ra_dec_roll
/// Reconstruct `R` from `(RA, Dec, Roll)` in radians; the inverse of
/// [ra_dec_roll]
///
/// `R`'s first row depends only on `ra` and `dec` (it is the pointing
/// direction); `roll` is a rotation about the camera's own principal ray,
/// applied as the leftmost factor so it leaves that row unchanged
pub fn rotation_of_ra_dec_roll(ra: f64, dec: f64, roll: f64) -> Matrix3<f64> {
    let rx = Rotation3::from_axis_angle(&nalgebra::Vector3::x_axis(), -roll);
    let ry = Rotation3::from_axis_angle(&nalgebra::Vector3::y_axis(), dec);
    let rz = Rotation3::from_axis_angle(&nalgebra::Vector3::z_axis(), -ra);
    (rx * ry * rz).into_inner()
}

//fp residual_rms_arcsec
/// Root-mean-square angular residual, in arcseconds, between rotated
/// measured vectors and their matched reference vectors
pub fn residual_rms_arcsec(measured: &[Vec3], reference: &[Vec3], r: &Matrix3<f64>) -> f64 {
    let r_t = r.transpose();
    let mut sum_sq = 0.0;
    let n = measured.len().min(reference.len());
    for i in 0..n {
        let m = nalgebra::Vector3::new(measured[i][0], measured[i][1], measured[i][2]);
        let rotated = r_t * m;
        let rotated: Vec3 = [rotated.x, rotated.y, rotated.z].into();
        let c = reference[i];
        let cross = cross3(&rotated, &c);
        let cross_mag = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
        let angle = (cross_mag / rotated.length() / c.length()).asin();
        sum_sq += angle * angle;
    }
    if n == 0 {
        return 0.0;
    }
    let rms_rad = (sum_sq / n as f64).sqrt();
    rms_rad * 180.0 / std::f64::consts::PI * 3600.0
}

//fi cross3
fn cross3(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinhole_round_trip() {
        let fov: f64 = 20.0_f64.to_radians();
        let size = (480.0, 640.0);
        for &(y, x) in &[(240.0, 320.0), (100.0, 200.0), (50.0, 600.0)] {
            let v = lift(y, x, size, fov);
            let (y2, x2) = project(&v, size, fov);
            assert!((y - y2).abs() < 1e-6, "y round-trip {} vs {}", y, y2);
            assert!((x - x2).abs() < 1e-6, "x round-trip {} vs {}", x, x2);
        }
    }

    #[test]
    fn ra_dec_roll_round_trip() {
        for &(ra, dec, roll) in &[
            (0.3, 0.2, 1.1),
            (5.9, -0.5, 0.01),
            (3.14159, 1.0, 4.0),
        ] {
            let r = rotation_of_ra_dec_roll(ra, dec, roll);
            let (ra2, dec2, roll2) = ra_dec_roll(&r);
            let r2 = rotation_of_ra_dec_roll(ra2, dec2, roll2);
            for i in 0..3 {
                for j in 0..3 {
                    assert!(
                        (r[(i, j)] - r2[(i, j)]).abs() < 1e-9,
                        "matrix mismatch at ({},{})",
                        i,
                        j
                    );
                }
            }
        }
    }
}
