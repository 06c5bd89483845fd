//! Two-body motion: Kepler's equation for every conic, and rotation of
//! orbital-plane coordinates into the ecliptic.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::errors::{AppError, AppResult};

/// Gaussian gravitational constant, radians per day
pub const GAUSS_K: f64 = 0.017_202_098_95;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-12;
/// Eccentricities this close to 1 are treated as parabolic
const PARABOLIC_BAND: f64 = 1e-6;

/// Orbital plane orientation, degrees, referred to an ecliptic and equinox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub inclination: f64,
    pub node: f64,
    pub arg_perihelion: f64,
}

impl Orientation {
    /// Orbital-plane (x toward perihelion) to ecliptic coordinates
    pub fn to_ecliptic(&self, x: f64, y: f64) -> Vector3<f64> {
        let (si, ci) = self.inclination.to_radians().sin_cos();
        let (so, co) = self.node.to_radians().sin_cos();
        let (sw, cw) = self.arg_perihelion.to_radians().sin_cos();
        Vector3::new(
            (cw * co - sw * so * ci) * x + (-sw * co - cw * so * ci) * y,
            (cw * so + sw * co * ci) * x + (-sw * so + cw * co * ci) * y,
            (sw * si) * x + (cw * si) * y,
        )
    }
}

/// Eccentric anomaly (radians) for mean anomaly `m` (radians)
pub fn solve_elliptic(m: f64, e: f64) -> AppResult<f64> {
    let m = m.rem_euclid(2.0 * PI);
    let mut ea = if e > 0.8 { PI } else { m + e * m.sin() };
    for _ in 0..MAX_ITERATIONS {
        let delta = (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < TOLERANCE {
            return Ok(ea);
        }
    }
    Err(AppError::Search(format!(
        "Kepler equation did not converge (M={m}, e={e})"
    )))
}

/// Hyperbolic anomaly for `e sinh H - H = m`
pub fn solve_hyperbolic(m: f64, e: f64) -> AppResult<f64> {
    let mut h = (m / e).asinh();
    for _ in 0..MAX_ITERATIONS {
        let delta = (e * h.sinh() - h - m) / (e * h.cosh() - 1.0);
        h -= delta;
        if delta.abs() < TOLERANCE * h.abs().max(1.0) {
            return Ok(h);
        }
    }
    Err(AppError::Search(format!(
        "hyperbolic Kepler equation did not converge (M={m}, e={e})"
    )))
}

/// Orbital-plane position (AU) for an elliptic orbit given its mean anomaly
pub fn elliptic_position(a: f64, e: f64, mean_anomaly_deg: f64) -> AppResult<(f64, f64)> {
    let ea = solve_elliptic(mean_anomaly_deg.to_radians(), e)?;
    Ok((a * (ea.cos() - e), a * (1.0 - e * e).sqrt() * ea.sin()))
}

/// Orbital-plane position (AU) for any conic given perihelion distance `q`
/// and days elapsed since perihelion passage
pub fn position_from_perihelion(q: f64, e: f64, days: f64) -> AppResult<(f64, f64)> {
    if q <= 0.0 || e < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "perihelion distance {q} / eccentricity {e} out of range"
        )));
    }
    if (e - 1.0).abs() < PARABOLIC_BAND {
        // Barker's equation
        let w = 3.0 * GAUSS_K / (2.0 * q * q * q).sqrt() * days;
        let y = (w / 2.0 + (w * w / 4.0 + 1.0).sqrt()).cbrt();
        let s = y - 1.0 / y;
        let nu = 2.0 * s.atan();
        let r = q * (1.0 + s * s);
        return Ok((r * nu.cos(), r * nu.sin()));
    }
    if e < 1.0 {
        let a = q / (1.0 - e);
        let n = GAUSS_K / a.powf(1.5);
        return elliptic_position(a, e, (n * days).to_degrees());
    }
    let a = q / (e - 1.0);
    let m = GAUSS_K / a.powf(1.5) * days;
    let h = solve_hyperbolic(m, e)?;
    Ok((a * (e - h.cosh()), a * (e * e - 1.0).sqrt() * h.sinh()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_elliptic_meeus_example() {
        // Meeus example 30.a: e = 0.1, M = 5 deg -> E = 5.554589 deg
        let ea = solve_elliptic(5f64.to_radians(), 0.1).unwrap();
        assert!((ea.to_degrees() - 5.554_589).abs() < 1e-6);
    }

    #[test]
    fn test_high_eccentricity_converges() {
        let ea = solve_elliptic(0.01, 0.99).unwrap();
        assert!((ea - 0.99 * ea.sin() - 0.01).abs() < 1e-10);
    }

    #[test]
    fn test_perihelion_at_zero_days() {
        for e in [0.5, 1.0, 1.5] {
            let (x, y) = position_from_perihelion(0.8, e, 0.0).unwrap();
            assert!((x - 0.8).abs() < 1e-9, "e={e} x={x}");
            assert!(y.abs() < 1e-9);
        }
    }

    #[test]
    fn test_conics_agree_near_parabolic() {
        let (xp, yp) = position_from_perihelion(1.0, 1.0, 30.0).unwrap();
        let (xe, ye) = position_from_perihelion(1.0, 0.9999, 30.0).unwrap();
        let (xh, yh) = position_from_perihelion(1.0, 1.0001, 30.0).unwrap();
        assert!((xp - xe).abs() < 1e-3 && (yp - ye).abs() < 1e-3);
        assert!((xp - xh).abs() < 1e-3 && (yp - yh).abs() < 1e-3);
    }

    #[test]
    fn test_zero_inclination_orientation_is_plane_rotation() {
        let o = Orientation {
            inclination: 0.0,
            node: 30.0,
            arg_perihelion: 60.0,
        };
        let v = o.to_ecliptic(1.0, 0.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
        assert!(v.z.abs() < 1e-12);
    }
}
