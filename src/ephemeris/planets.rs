//! Planet positions from the JPL approximate Keplerian elements
//! (Standish, valid 1800-2050) and Mallama & Hilton magnitudes.

use nalgebra::Vector3;

use super::orbit::{self, Orientation};
use super::time::Epoch;
use super::{frames, GeocentricState, AU_KM, LIGHT_DAYS_PER_AU};
use crate::domain::StandardBody;
use crate::errors::AppResult;

/// Saturn's north pole in J2000 equatorial coordinates
const SATURN_POLE: [f64; 3] = [0.085_478_83, 0.073_235_76, 0.993_644_75];

/// a, e, I, L, long. perihelion, long. node and their rates per century
struct KeplerianElements {
    base: [f64; 6],
    rate: [f64; 6],
}

const MERCURY: KeplerianElements = KeplerianElements {
    base: [0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_50, 77.457_796_28, 48.330_765_93],
    rate: [0.000_000_37, 0.000_019_06, -0.005_947_49, 149_472.674_111_75, 0.160_476_89, -0.125_340_81],
};
const VENUS: KeplerianElements = KeplerianElements {
    base: [0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_50, 131.602_467_18, 76.679_842_55],
    rate: [0.000_003_90, -0.000_041_07, -0.000_788_90, 58_517.815_387_29, 0.002_683_29, -0.277_694_18],
};
const EARTH_MOON_BARYCENTER: KeplerianElements = KeplerianElements {
    base: [1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.0],
    rate: [0.000_005_62, -0.000_043_92, -0.012_946_68, 35_999.372_449_81, 0.323_273_64, 0.0],
};
const MARS: KeplerianElements = KeplerianElements {
    base: [1.523_710_34, 0.093_394_10, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91],
    rate: [0.000_018_47, 0.000_078_82, -0.008_131_31, 19_140.302_684_99, 0.444_410_88, -0.292_573_43],
};
const JUPITER: KeplerianElements = KeplerianElements {
    base: [5.202_887_00, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09],
    rate: [-0.000_116_07, -0.000_132_53, -0.001_837_14, 3_034.746_127_75, 0.212_526_68, 0.204_691_06],
};
const SATURN: KeplerianElements = KeplerianElements {
    base: [9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48],
    rate: [-0.001_250_60, -0.000_509_91, 0.001_936_09, 1_222.493_622_01, -0.418_972_16, -0.288_677_94],
};
const URANUS: KeplerianElements = KeplerianElements {
    base: [19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_30, 74.016_925_03],
    rate: [-0.001_961_76, -0.000_043_97, -0.002_429_39, 428.482_027_85, 0.408_052_81, 0.042_405_89],
};
const NEPTUNE: KeplerianElements = KeplerianElements {
    base: [30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74],
    rate: [0.000_262_91, 0.000_051_05, 0.000_353_72, 218.459_453_25, -0.322_414_64, -0.005_086_64],
};
const PLUTO: KeplerianElements = KeplerianElements {
    base: [39.482_116_75, 0.248_827_30, 17.140_012_06, 238.929_038_33, 224.068_916_29, 110.303_936_84],
    rate: [-0.000_315_96, 0.000_051_70, 0.000_048_18, 145.207_805_15, -0.040_629_42, -0.011_834_82],
};

impl KeplerianElements {
    /// Heliocentric J2000 ecliptic position in AU, `t` in TT centuries
    fn heliocentric(&self, t: f64) -> AppResult<Vector3<f64>> {
        let at = |i: usize| self.base[i] + self.rate[i] * t;
        let (a, e, incl, l, peri, node) = (at(0), at(1), at(2), at(3), at(4), at(5));
        let (x, y) = orbit::elliptic_position(a, e, l - peri)?;
        let orientation = Orientation {
            inclination: incl,
            node,
            arg_perihelion: peri - node,
        };
        Ok(orientation.to_ecliptic(x, y))
    }
}

fn elements(body: StandardBody) -> Option<&'static KeplerianElements> {
    match body {
        StandardBody::Mercury => Some(&MERCURY),
        StandardBody::Venus => Some(&VENUS),
        StandardBody::Mars => Some(&MARS),
        StandardBody::Jupiter => Some(&JUPITER),
        StandardBody::Saturn => Some(&SATURN),
        StandardBody::Uranus => Some(&URANUS),
        StandardBody::Neptune => Some(&NEPTUNE),
        StandardBody::Pluto => Some(&PLUTO),
        StandardBody::Sun | StandardBody::Moon => None,
    }
}

/// Earth's heliocentric J2000 ecliptic position in AU. The Earth-Moon
/// barycenter stands in for Earth.
pub fn earth_heliocentric(t: f64) -> AppResult<Vector3<f64>> {
    EARTH_MOON_BARYCENTER.heliocentric(t)
}

/// Distances and phase angle needed by the magnitude laws
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    /// Sun to body, AU
    pub r: f64,
    /// Earth to body, AU
    pub delta: f64,
    /// Sun-body-Earth angle, degrees
    pub phase_angle: f64,
}

impl Geometry {
    pub fn new(heliocentric: &Vector3<f64>, geocentric: &Vector3<f64>) -> Self {
        let cos_phase = heliocentric.normalize().dot(&geocentric.normalize());
        Self {
            r: heliocentric.norm(),
            delta: geocentric.norm(),
            phase_angle: cos_phase.clamp(-1.0, 1.0).acos().to_degrees(),
        }
    }
}

/// Light-time corrected geocentric J2000 ecliptic vector (AU) for any body
/// whose heliocentric position is known as a function of TT centuries.
/// Returns (heliocentric, geocentric).
pub fn light_time_corrected<F>(t: f64, heliocentric: F) -> AppResult<(Vector3<f64>, Vector3<f64>)>
where
    F: Fn(f64) -> AppResult<Vector3<f64>>,
{
    let earth = earth_heliocentric(t)?;
    let mut helio = heliocentric(t)?;
    let mut geo = helio - earth;
    // one iteration is well under an arc-second for planets
    let tau = geo.norm() * LIGHT_DAYS_PER_AU / super::time::DAYS_PER_CENTURY;
    helio = heliocentric(t - tau)?;
    geo = helio - earth;
    Ok((helio, geo))
}

pub fn geocentric_state(body: StandardBody, epoch: &Epoch) -> AppResult<Option<GeocentricState>> {
    let Some(el) = elements(body) else {
        return Ok(None);
    };
    let t = epoch.centuries();
    let (helio, geo) = light_time_corrected(t, |tc| el.heliocentric(tc))?;
    let geometry = Geometry::new(&helio, &geo);
    let year = 2000.0 + t * 100.0;
    let magnitude = magnitude(body, &geometry, &geo, year);
    Ok(Some(GeocentricState {
        position: frames::j2000_ecliptic_to_date_equatorial(&(geo * AU_KM), t),
        magnitude: magnitude.filter(|m| m.is_finite()),
        semidiameter: 0.0,
    }))
}

fn magnitude(body: StandardBody, g: &Geometry, geocentric: &Vector3<f64>, year: f64) -> Option<f64> {
    let distance = 5.0 * (g.r * g.delta).log10();
    let a = g.phase_angle;
    let mag = match body {
        StandardBody::Mercury => {
            -0.613 + distance + 6.3280e-02 * a - 1.6336e-03 * a.powi(2) + 3.3644e-05 * a.powi(3)
                - 3.4265e-07 * a.powi(4)
                + 1.6893e-09 * a.powi(5)
                - 3.0334e-12 * a.powi(6)
        }
        StandardBody::Venus => {
            if a < 163.7 {
                -4.384 + distance
                    + a * (-1.044e-03 + a * (3.687e-04 + a * (-2.814e-06 + a * 8.938e-09)))
            } else {
                236.058_28 + distance - 2.819_14 * a + 8.390_34e-03 * a * a
            }
        }
        StandardBody::Mars => {
            if a <= 50.0 {
                -1.601 + distance + 2.267e-02 * a - 1.302e-04 * a * a
            } else {
                -0.367 + distance - 0.025_73 * a + 0.000_344_5 * a * a
            }
        }
        StandardBody::Jupiter => {
            if a <= 12.0 {
                -9.395 + distance + (6.16e-04 * a - 3.7e-04) * a
            } else {
                let p = a / 180.0;
                let inner = 1.0 - 1.507 * p - 0.363 * p.powi(2) - 0.062 * p.powi(3)
                    + 2.809 * p.powi(4)
                    - 1.876 * p.powi(5);
                -9.428 + distance - 2.5 * inner.log10()
            }
        }
        StandardBody::Saturn => {
            // ring opening angle as seen from Earth
            let pole_eq = Vector3::from_column_slice(&SATURN_POLE);
            let pole = frames::equatorial_to_ecliptic(&pole_eq, frames::OBLIQUITY_J2000);
            let sin_b = pole.dot(&(-geocentric).normalize()).abs();
            -8.88 + distance + 0.044 * a - 2.60 * sin_b + 1.25 * sin_b * sin_b
        }
        StandardBody::Uranus => {
            let mut m = -7.110 + distance;
            if a > 3.1 {
                m += (1.045e-4 * a + 6.587e-3) * a;
            }
            m
        }
        StandardBody::Neptune => {
            let mut m = (-6.89 - 0.0054 * (year - 1980.0)).clamp(-7.00, -6.89) + distance;
            if a > 1.9 && year >= 2000.0 {
                m += 7.944e-3 * a + 9.617e-5 * a * a;
            }
            m
        }
        StandardBody::Pluto => -1.01 + distance,
        StandardBody::Sun | StandardBody::Moon => return None,
    };
    Some(mag)
}

/// Apparent magnitude of the Sun at `distance_au`
pub fn sun_magnitude(distance_au: f64) -> f64 {
    -26.74 + 5.0 * distance_au.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_earth_one_au() {
        let r = earth_heliocentric(0.24).unwrap().norm();
        assert!((r - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_every_planet_has_a_position() {
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        let epoch = Epoch::from_utc(t);
        for body in StandardBody::ALL.iter().filter(|b| b.is_planet()) {
            let state = geocentric_state(*body, &epoch).unwrap().unwrap();
            assert!(state.position.norm() > 0.2 * AU_KM, "{body:?}");
            assert!(state.magnitude.is_some(), "{body:?}");
        }
        assert!(geocentric_state(StandardBody::Sun, &epoch).unwrap().is_none());
    }

    #[test]
    fn test_jupiter_brightness_plausible() {
        let t = Utc.with_ymd_and_hms(2024, 12, 7, 0, 0, 0).unwrap();
        let state = geocentric_state(StandardBody::Jupiter, &Epoch::from_utc(t))
            .unwrap()
            .unwrap();
        // Opposition 2024-12-07 at about -2.8
        let mag = state.magnitude.unwrap();
        assert!((mag + 2.8).abs() < 0.2, "mag = {mag}");
    }

    #[test]
    fn test_mars_position_near_opposition_2020() {
        // Mars opposition 2020-10-13: RA about 1h22m, Dec about +5.4
        let t = Utc.with_ymd_and_hms(2020, 10, 13, 23, 0, 0).unwrap();
        let state = geocentric_state(StandardBody::Mars, &Epoch::from_utc(t))
            .unwrap()
            .unwrap();
        let (ra, dec, _) = frames::to_spherical(&state.position);
        assert!((ra - 20.5).abs() < 1.5, "ra = {ra}");
        assert!((dec - 5.4).abs() < 1.5, "dec = {dec}");
    }

    #[test]
    fn test_sun_magnitude() {
        assert!((sun_magnitude(1.0) + 26.74).abs() < 1e-12);
    }
}
