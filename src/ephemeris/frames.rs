//! Reference frame rotations and the observer's place on the WGS-84 ellipsoid.
//!
//! Vectors are right-handed cartesian; "equatorial of date" is the frame all
//! geocentric states are delivered in.

use nalgebra::{Rotation3, Vector3};

use crate::domain::Location;

const WGS84_A_KM: f64 = 6378.137;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Mean obliquity at J2000, degrees
pub const OBLIQUITY_J2000: f64 = 23.439_291_1;

pub fn normalize_degrees(x: f64) -> f64 {
    x.rem_euclid(360.0)
}

/// Wrap into (-180, 180]
pub fn wrap_180(x: f64) -> f64 {
    let y = normalize_degrees(x);
    if y > 180.0 {
        y - 360.0
    } else {
        y
    }
}

pub fn mean_obliquity(t: f64) -> f64 {
    OBLIQUITY_J2000 - 0.013_004_2 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t
}

/// Nutation in longitude and obliquity (degrees), two-term-per-argument series
pub fn nutation(t: f64) -> (f64, f64) {
    let omega = (125.044_52 - 1934.136_261 * t).to_radians();
    let l_sun = (280.4665 + 36_000.7698 * t).to_radians();
    let l_moon = (218.3165 + 481_267.8813 * t).to_radians();
    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos() + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();
    (dpsi / 3600.0, deps / 3600.0)
}

/// Accumulated general precession in longitude since J2000, degrees
pub fn general_precession(t: f64) -> f64 {
    (5029.0966 * t + 1.111_13 * t * t) / 3600.0
}

pub fn from_spherical(lon_deg: f64, lat_deg: f64, r: f64) -> Vector3<f64> {
    let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
    Vector3::new(
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    )
}

/// (longitude in [0, 360), latitude, radius)
pub fn to_spherical(v: &Vector3<f64>) -> (f64, f64, f64) {
    let r = v.norm();
    let lon = normalize_degrees(v.y.atan2(v.x).to_degrees());
    let lat = if r > 0.0 {
        (v.z / r).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };
    (lon, lat, r)
}

pub fn ecliptic_to_equatorial(v: &Vector3<f64>, obliquity_deg: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity_deg.to_radians()) * v
}

pub fn equatorial_to_ecliptic(v: &Vector3<f64>, obliquity_deg: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), -obliquity_deg.to_radians()) * v
}

/// Rotate about the ecliptic pole by the precession accumulated over `t`
/// centuries. Motion of the ecliptic itself is neglected.
pub fn precess_ecliptic(v: &Vector3<f64>, t: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), general_precession(t).to_radians()) * v
}

/// J2000 ecliptic vector to the mean equator and equinox of date
pub fn j2000_ecliptic_to_date_equatorial(v: &Vector3<f64>, t: f64) -> Vector3<f64> {
    ecliptic_to_equatorial(&precess_ecliptic(v, t), mean_obliquity(t))
}

/// Geocentric observer position in km, equatorial of date, for a local
/// sidereal time in degrees.
pub fn observer_position(location: &Location, lst_deg: f64) -> Vector3<f64> {
    let lat = location.latitude.to_radians();
    let h = location.elevation_m / 1000.0;
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let n = WGS84_A_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();
    let rho_xy = (n + h) * lat.cos();
    let lst = lst_deg.to_radians();
    Vector3::new(
        rho_xy * lst.cos(),
        rho_xy * lst.sin(),
        (n * (1.0 - e2) + h) * lat.sin(),
    )
}

/// Altitude and azimuth (north through east) in degrees
pub fn horizontal(ra_deg: f64, dec_deg: f64, latitude: f64, lst_deg: f64) -> (f64, f64) {
    let h = (lst_deg - ra_deg).to_radians();
    let dec = dec_deg.to_radians();
    let lat = latitude.to_radians();
    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();
    let az = (-dec.cos() * h.sin())
        .atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * h.cos())
        .to_degrees();
    (alt, normalize_degrees(az))
}

/// Sæmundsson's refraction for a true altitude, in degrees. Zero well below
/// the horizon where the formula stops meaning anything.
pub fn refraction(true_alt_deg: f64) -> f64 {
    if true_alt_deg < -1.0 {
        return 0.0;
    }
    let arg = (true_alt_deg + 10.3 / (true_alt_deg + 5.11)).to_radians();
    1.02 / arg.tan() / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(latitude: f64) -> Location {
        Location {
            name: "test".to_string(),
            latitude,
            longitude: 0.0,
            elevation_m: 0.0,
            country: None,
        }
    }

    #[test]
    fn test_wrap_180() {
        assert_eq!(wrap_180(190.0), -170.0);
        assert_eq!(wrap_180(-190.0), 170.0);
        assert_eq!(wrap_180(180.0), 180.0);
    }

    #[test]
    fn test_spherical_round_trip() {
        let v = from_spherical(123.4, -33.2, 2.5);
        let (lon, lat, r) = to_spherical(&v);
        assert!((lon - 123.4).abs() < 1e-9);
        assert!((lat + 33.2).abs() < 1e-9);
        assert!((r - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ecliptic_pole_maps_to_declination_of_colatitude() {
        let pole = Vector3::new(0.0, 0.0, 1.0);
        let eq = ecliptic_to_equatorial(&pole, OBLIQUITY_J2000);
        let (ra, dec, _) = to_spherical(&eq);
        assert!((dec - (90.0 - OBLIQUITY_J2000)).abs() < 1e-9);
        assert!((ra - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_meridian_transit() {
        // On the meridian a star culminates due south at 90 - lat + dec
        let (alt, az) = horizontal(100.0, 10.0, 50.0, 100.0);
        assert!((alt - 50.0).abs() < 1e-9);
        assert!((az - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_east_is_ninety() {
        // Equatorial star six hours before transit rises due east
        let (alt, az) = horizontal(90.0, 0.0, 0.0, 0.0);
        assert!(alt.abs() < 1e-9);
        assert!((az - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_observer_radius() {
        let equator = observer_position(&site(0.0), 0.0);
        assert!((equator.norm() - WGS84_A_KM).abs() < 1e-9);
        let pole = observer_position(&site(90.0), 0.0);
        assert!((pole.norm() - 6356.752).abs() < 0.01);
    }

    #[test]
    fn test_refraction_at_horizon() {
        let r = refraction(-0.57) * 60.0;
        assert!((r - 34.0).abs() < 1.5, "refraction = {r}'");
        assert_eq!(refraction(-5.0), 0.0);
        assert!(refraction(45.0) * 60.0 < 1.1);
    }
}
