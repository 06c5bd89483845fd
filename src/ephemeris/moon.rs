//! Lunar position from the main terms of Meeus ch. 47 (ELP-2000/82 truncated).

use nalgebra::Vector3;

use super::frames;
use super::sun;
use super::time::Epoch;

const MOON_RADIUS_KM: f64 = 1737.4;

/// D, M, M', F multipliers with Σl (1e-6 deg) and Σr (1e-3 km)
const LONGITUDE_DISTANCE: [(i8, i8, i8, i8, f64, f64); 60] = [
    (0, 0, 1, 0, 6288774.0, -20905355.0),
    (2, 0, -1, 0, 1274027.0, -3699111.0),
    (2, 0, 0, 0, 658314.0, -2955968.0),
    (0, 0, 2, 0, 213618.0, -569925.0),
    (0, 1, 0, 0, -185116.0, 48888.0),
    (0, 0, 0, 2, -114332.0, -3149.0),
    (2, 0, -2, 0, 58793.0, 246158.0),
    (2, -1, -1, 0, 57066.0, -152138.0),
    (2, 0, 1, 0, 53322.0, -170733.0),
    (2, -1, 0, 0, 45758.0, -204586.0),
    (0, 1, -1, 0, -40923.0, -129620.0),
    (1, 0, 0, 0, -34720.0, 108743.0),
    (0, 1, 1, 0, -30383.0, 104755.0),
    (2, 0, 0, -2, 15327.0, 10321.0),
    (0, 0, 1, 2, -12528.0, 0.0),
    (0, 0, 1, -2, 10980.0, 79661.0),
    (4, 0, -1, 0, 10675.0, -34782.0),
    (0, 0, 3, 0, 10034.0, -23210.0),
    (4, 0, -2, 0, 8548.0, -21636.0),
    (2, 1, -1, 0, -7888.0, 24208.0),
    (2, 1, 0, 0, -6766.0, 30824.0),
    (1, 0, -1, 0, -5163.0, -8379.0),
    (1, 1, 0, 0, 4987.0, -16675.0),
    (2, -1, 1, 0, 4036.0, -12831.0),
    (2, 0, 2, 0, 3994.0, -10445.0),
    (4, 0, 0, 0, 3861.0, -11650.0),
    (2, 0, -3, 0, 3665.0, 14403.0),
    (0, 1, -2, 0, -2689.0, -7003.0),
    (2, 0, -1, 2, -2602.0, 0.0),
    (2, -1, -2, 0, 2390.0, 10056.0),
    (1, 0, 1, 0, -2348.0, 6322.0),
    (2, -2, 0, 0, 2236.0, -9884.0),
    (0, 1, 2, 0, -2120.0, 5751.0),
    (0, 2, 0, 0, -2069.0, 0.0),
    (2, -2, -1, 0, 2048.0, -4950.0),
    (2, 0, 1, -2, -1773.0, 4130.0),
    (2, 0, 0, 2, -1595.0, 0.0),
    (4, -1, -1, 0, 1215.0, -3958.0),
    (0, 0, 2, 2, -1110.0, 0.0),
    (3, 0, -1, 0, -892.0, 3258.0),
    (2, 1, 1, 0, -810.0, 2616.0),
    (4, -1, -2, 0, 759.0, -1897.0),
    (0, 2, -1, 0, -713.0, -2117.0),
    (2, 2, -1, 0, -700.0, 2354.0),
    (2, 1, -2, 0, 691.0, 0.0),
    (2, -1, 0, -2, 596.0, 0.0),
    (4, 0, 1, 0, 549.0, -1423.0),
    (0, 0, 4, 0, 537.0, -1117.0),
    (4, -1, 0, 0, 520.0, -1571.0),
    (1, 0, -2, 0, -487.0, -1739.0),
    (2, 1, 0, -2, -399.0, 0.0),
    (0, 0, 2, -2, -381.0, -4421.0),
    (1, 1, 1, 0, 351.0, 0.0),
    (3, 0, -2, 0, -340.0, 0.0),
    (4, 0, -3, 0, 330.0, 0.0),
    (2, -1, 2, 0, 327.0, 0.0),
    (0, 2, 1, 0, -323.0, 1165.0),
    (1, 1, -1, 0, 299.0, 0.0),
    (2, 0, 3, 0, 294.0, 0.0),
    (2, 0, -1, -2, 0.0, 8752.0),
];

/// D, M, M', F multipliers with Σb (1e-6 deg)
const LATITUDE: [(i8, i8, i8, i8, f64); 30] = [
    (0, 0, 0, 1, 5128122.0),
    (0, 0, 1, 1, 280602.0),
    (0, 0, 1, -1, 277693.0),
    (2, 0, 0, -1, 173237.0),
    (2, 0, -1, 1, 55413.0),
    (2, 0, -1, -1, 46271.0),
    (2, 0, 0, 1, 32573.0),
    (0, 0, 2, 1, 17198.0),
    (2, 0, 1, -1, 9266.0),
    (0, 0, 2, -1, 8822.0),
    (2, -1, 0, -1, 8216.0),
    (2, 0, -2, -1, 4324.0),
    (2, 0, 1, 1, 4200.0),
    (2, 1, 0, -1, -3359.0),
    (2, -1, -1, 1, 2463.0),
    (2, -1, 0, 1, 2211.0),
    (2, -1, -1, -1, 2065.0),
    (0, 1, -1, -1, -1870.0),
    (4, 0, -1, -1, 1828.0),
    (0, 1, 0, 1, -1794.0),
    (0, 0, 0, 3, -1749.0),
    (0, 1, -1, 1, -1565.0),
    (1, 0, 0, 1, -1491.0),
    (0, 1, 1, 1, -1475.0),
    (0, 1, 1, -1, -1410.0),
    (0, 1, 0, -1, -1344.0),
    (1, 0, 0, -1, -1335.0),
    (0, 0, 3, 1, 1107.0),
    (4, 0, 0, -1, 1021.0),
    (4, 0, -1, 1, 833.0),
];

#[derive(Debug, Clone, Copy)]
pub struct LunarPosition {
    /// Apparent ecliptic longitude of date, degrees
    pub longitude: f64,
    pub latitude: f64,
    pub distance_km: f64,
}

impl LunarPosition {
    pub fn semidiameter(&self) -> f64 {
        (MOON_RADIUS_KM / self.distance_km).asin().to_degrees()
    }
}

pub fn position(epoch: &Epoch) -> LunarPosition {
    let t = epoch.centuries();
    let (t2, t3, t4) = (t * t, t * t * t, t * t * t * t);

    let lp = 218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
        - t4 / 65_194_000.0;
    let d = 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
        - t4 / 113_065_000.0;
    let m = 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0;
    let mp = 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
        - t4 / 14_712_000.0;
    let f = 93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
        + t4 / 863_310_000.0;
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    let a3 = 313.45 + 481_266.484 * t;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

    let eccentricity_factor = |m_mult: i8| match m_mult.abs() {
        1 => e,
        2 => e * e,
        _ => 1.0,
    };
    let argument = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        (cd as f64 * d + cm as f64 * m + cmp as f64 * mp + cf as f64 * f).to_radians()
    };

    let (mut sum_l, mut sum_r) = (0.0, 0.0);
    for &(cd, cm, cmp, cf, l, r) in LONGITUDE_DISTANCE.iter() {
        let arg = argument(cd, cm, cmp, cf);
        let k = eccentricity_factor(cm);
        sum_l += k * l * arg.sin();
        sum_r += k * r * arg.cos();
    }
    let mut sum_b = 0.0;
    for &(cd, cm, cmp, cf, b) in LATITUDE.iter() {
        sum_b += eccentricity_factor(cm) * b * argument(cd, cm, cmp, cf).sin();
    }

    let rad = f64::to_radians;
    sum_l += 3958.0 * rad(a1).sin() + 1962.0 * rad(lp - f).sin() + 318.0 * rad(a2).sin();
    sum_b += -2235.0 * rad(lp).sin()
        + 382.0 * rad(a3).sin()
        + 175.0 * rad(a1 - f).sin()
        + 175.0 * rad(a1 + f).sin()
        + 127.0 * rad(lp - mp).sin()
        - 115.0 * rad(lp + mp).sin();

    let (dpsi, _) = frames::nutation(t);
    LunarPosition {
        longitude: frames::normalize_degrees(lp + sum_l / 1e6 + dpsi),
        latitude: sum_b / 1e6,
        distance_km: 385_000.56 + sum_r / 1000.0,
    }
}

/// Geocentric Moon in km, equatorial of date
pub fn geocentric_vector(moon: &LunarPosition, epoch: &Epoch) -> Vector3<f64> {
    let ecliptic = frames::from_spherical(moon.longitude, moon.latitude, moon.distance_km);
    frames::ecliptic_to_equatorial(&ecliptic, sun::true_obliquity(epoch.centuries()))
}

/// Selenocentric Sun-Earth angle in degrees (Meeus 48.2-48.3)
pub fn phase_angle(moon: &LunarPosition, sun: &sun::SolarPosition) -> f64 {
    let sun_km = sun.distance_au * super::AU_KM;
    let psi = (moon.latitude.to_radians().cos()
        * (moon.longitude - sun.longitude).to_radians().cos())
    .clamp(-1.0, 1.0)
    .acos();
    (sun_km * psi.sin())
        .atan2(moon.distance_km - sun_km * psi.cos())
        .to_degrees()
}

/// Illuminated fraction of the disk
pub fn illuminated_fraction(phase_angle_deg: f64) -> f64 {
    (1.0 + phase_angle_deg.to_radians().cos()) / 2.0
}

pub fn magnitude(phase_angle_deg: f64) -> f64 {
    let i = phase_angle_deg.abs();
    -12.73 + 0.026 * i + 4.0e-9 * i.powi(4)
}

/// Moon minus Sun apparent longitude, in [0, 360)
pub fn elongation(epoch: &Epoch) -> f64 {
    frames::normalize_degrees(position(epoch).longitude - sun::position(epoch).longitude)
}
