//! Low-accuracy solar theory (Meeus, Astronomical Algorithms ch. 25).

use nalgebra::Vector3;

use super::frames;
use super::time::Epoch;
use super::AU_KM;

/// Apparent solar semidiameter at 1 AU, degrees
const SEMIDIAMETER_1AU: f64 = 959.63 / 3600.0;

#[derive(Debug, Clone, Copy)]
pub struct SolarPosition {
    /// Apparent ecliptic longitude of date, degrees
    pub longitude: f64,
    pub distance_au: f64,
}

impl SolarPosition {
    pub fn semidiameter(&self) -> f64 {
        SEMIDIAMETER_1AU / self.distance_au
    }
}

pub fn position(epoch: &Epoch) -> SolarPosition {
    let t = epoch.centuries();
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let true_longitude = l0 + c;
    let nu = m + c.to_radians();
    let distance_au = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * nu.cos());
    let (dpsi, _) = frames::nutation(t);
    // 20.4898" annual aberration at 1 AU
    let longitude =
        frames::normalize_degrees(true_longitude - 0.005_691_6 / distance_au + dpsi);
    SolarPosition {
        longitude,
        distance_au,
    }
}

/// True obliquity of date, degrees
pub fn true_obliquity(t: f64) -> f64 {
    frames::mean_obliquity(t) + frames::nutation(t).1
}

/// Geocentric Sun in km, equatorial of date
pub fn geocentric_vector(epoch: &Epoch) -> Vector3<f64> {
    let sun = position(epoch);
    let ecliptic = frames::from_spherical(sun.longitude, 0.0, sun.distance_au * AU_KM);
    frames::ecliptic_to_equatorial(&ecliptic, true_obliquity(epoch.centuries()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_meeus_example_25a() {
        // 1992 October 13.0 TD: λ = 199°54'21.818", R = 0.99766 AU
        let t = Utc.with_ymd_and_hms(1992, 10, 13, 0, 0, 0).unwrap();
        let sun = position(&Epoch::from_utc(t));
        let expected = 199.0 + 54.0 / 60.0 + 21.818 / 3600.0;
        assert!((sun.longitude - expected).abs() < 0.02, "λ = {}", sun.longitude);
        assert!((sun.distance_au - 0.99766).abs() < 1e-4);
    }

    #[test]
    fn test_june_solstice_declination() {
        let t = Utc.with_ymd_and_hms(2024, 6, 20, 20, 51, 0).unwrap();
        let v = geocentric_vector(&Epoch::from_utc(t));
        let (_, dec, _) = frames::to_spherical(&v);
        assert!((dec - 23.44).abs() < 0.02, "dec = {dec}");
    }
}
