//! XEphem database records: `f` fixed objects and `e`/`h`/`p` heliocentric
//! orbits.
//!
//! ```text
//! M45,f|U,3:47:0,24:07:0,1.6,2000,0
//! C/Pan-STARRS,h, 3/10.1691/2013,84.2072,65.6659,333.6512,1.000033,0.301546, 1/01/2000,5.5,4,0
//! ```

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::orbit::{self, Orientation};
use super::planets::{self, Geometry};
use super::time::{self, Epoch};
use super::{frames, GeocentricState, Observable, AU_KM};
use crate::errors::{AppError, AppResult};

/// Distance used for objects outside the solar system, AU
const FIXED_OBJECT_DISTANCE_AU: f64 = 1.0e9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MagnitudeModel {
    /// Comet law: g + 5 log Δ + 2.5 k log r
    Comet { g: f64, k: f64 },
    /// IAU asteroid law with slope parameter
    Asteroid { h: f64, g: f64 },
}

impl MagnitudeModel {
    fn apparent(&self, geometry: &Geometry) -> f64 {
        match *self {
            MagnitudeModel::Comet { g, k } => {
                g + 5.0 * geometry.delta.log10() + 2.5 * k * geometry.r.log10()
            }
            MagnitudeModel::Asteroid { h, g } => {
                let half = (geometry.phase_angle.to_radians() / 2.0).tan();
                let phi1 = (-3.33 * half.powf(0.63)).exp();
                let phi2 = (-1.87 * half.powf(1.22)).exp();
                h + 5.0 * (geometry.r * geometry.delta).log10()
                    - 2.5 * ((1.0 - g) * phi1 + g * phi2).log10()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Fixed {
        ra: f64,
        dec: f64,
        magnitude: Option<f64>,
        epoch_year: f64,
    },
    Elliptic {
        orientation: Orientation,
        semi_major_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        /// Mean daily motion in degrees; derived from `a` when absent
        daily_motion: f64,
        epoch: DateTime<Utc>,
        equinox_year: f64,
        magnitude: MagnitudeModel,
    },
    Perihelion {
        orientation: Orientation,
        perihelion: DateTime<Utc>,
        perihelion_distance: f64,
        eccentricity: f64,
        equinox_year: f64,
        magnitude: MagnitudeModel,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct XephemObject {
    pub name: String,
    pub record: Record,
}

fn field<'a>(fields: &[&'a str], i: usize, what: &str) -> AppResult<&'a str> {
    fields
        .get(i)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("missing {what}")))
}

fn number(fields: &[&str], i: usize, what: &str) -> AppResult<f64> {
    let raw = field(fields, i, what)?;
    raw.parse::<f64>()
        .map_err(|_| AppError::InvalidInput(format!("{what} {raw:?} is not a number")))
}

/// `d:m:s` (any trailing parts optional) to decimal
fn sexagesimal(raw: &str, what: &str) -> AppResult<f64> {
    let raw = raw.trim();
    let negative = raw.starts_with('-');
    let mut value = 0.0;
    for (i, part) in raw.trim_start_matches(&['-', '+'][..]).split(':').enumerate() {
        let x: f64 = part
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("{what} {raw:?} is malformed")))?;
        value += x / 60f64.powi(i as i32);
    }
    Ok(if negative { -value } else { value })
}

/// `m/d.ddd/y`, ignoring any `|` validity range that follows
fn date(raw: &str, what: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.split('|').next().unwrap_or_default().trim();
    let parts: Vec<&str> = raw.split('/').map(str::trim).collect();
    let bad = || AppError::InvalidInput(format!("{what} {raw:?} is not m/d/y"));
    if parts.len() != 3 {
        return Err(bad());
    }
    let month: u32 = parts[0].parse().map_err(|_| bad())?;
    let day: f64 = parts[1].parse().map_err(|_| bad())?;
    let year: i32 = parts[2].parse().map_err(|_| bad())?;
    time::from_calendar(year, month, day)
}

/// Equinox may be written as a year (`2000`) or as a date (`1/01/2000`)
fn equinox(raw: &str) -> AppResult<f64> {
    if raw.contains('/') {
        date(raw, "equinox").map(time::decimal_year)
    } else {
        raw.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("equinox {raw:?} is not a year")))
    }
}

/// Magnitude fields, optionally prefixed `g` or `H` to pick the law
fn magnitude_model(fields: &[&str], i: usize, default_asteroid: bool) -> AppResult<MagnitudeModel> {
    let first = field(fields, i, "magnitude")?;
    let (asteroid, first) = match first.chars().next() {
        Some('H') | Some('h') => (true, &first[1..]),
        Some('g') | Some('G') => (false, &first[1..]),
        _ => (default_asteroid, first),
    };
    let a: f64 = first
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("magnitude {first:?} is not a number")))?;
    let b = number(fields, i + 1, "magnitude slope").unwrap_or(if asteroid { 0.15 } else { 4.0 });
    Ok(if asteroid {
        MagnitudeModel::Asteroid { h: a, g: b }
    } else {
        MagnitudeModel::Comet { g: a, k: b }
    })
}

pub fn parse(line: &str) -> AppResult<XephemObject> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    let name = field(&fields, 0, "name")?
        .split('|')
        .next()
        .unwrap_or_default()
        .to_string();
    let kind = field(&fields, 1, "object type")?;
    let record = match kind.chars().next() {
        Some('f') => Record::Fixed {
            ra: sexagesimal(field(&fields, 2, "right ascension")?, "right ascension")? * 15.0,
            dec: sexagesimal(field(&fields, 3, "declination")?, "declination")?,
            magnitude: number(&fields, 4, "magnitude").ok(),
            epoch_year: number(&fields, 5, "epoch").unwrap_or(2000.0),
        },
        Some('e') => {
            let semi_major_axis = number(&fields, 5, "mean distance")?;
            let eccentricity = number(&fields, 7, "eccentricity")?;
            if !(0.0..1.0).contains(&eccentricity) || semi_major_axis <= 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "elliptic orbit with a={semi_major_axis}, e={eccentricity}"
                )));
            }
            let daily_motion = number(&fields, 6, "daily motion")
                .ok()
                .filter(|n| *n > 0.0)
                .unwrap_or_else(|| (orbit::GAUSS_K / semi_major_axis.powf(1.5)).to_degrees());
            Record::Elliptic {
                orientation: Orientation {
                    inclination: number(&fields, 2, "inclination")?,
                    node: number(&fields, 3, "ascending node")?,
                    arg_perihelion: number(&fields, 4, "argument of perihelion")?,
                },
                semi_major_axis,
                eccentricity,
                mean_anomaly: number(&fields, 8, "mean anomaly")?,
                daily_motion,
                epoch: date(field(&fields, 9, "epoch")?, "epoch")?,
                equinox_year: equinox(field(&fields, 10, "equinox")?)?,
                magnitude: magnitude_model(&fields, 11, true)?,
            }
        }
        Some('h') => Record::Perihelion {
            perihelion: date(field(&fields, 2, "perihelion date")?, "perihelion date")?,
            orientation: Orientation {
                inclination: number(&fields, 3, "inclination")?,
                node: number(&fields, 4, "ascending node")?,
                arg_perihelion: number(&fields, 5, "argument of perihelion")?,
            },
            eccentricity: number(&fields, 6, "eccentricity")?,
            perihelion_distance: number(&fields, 7, "perihelion distance")?,
            equinox_year: equinox(field(&fields, 8, "equinox")?)?,
            magnitude: magnitude_model(&fields, 9, false)?,
        },
        Some('p') => Record::Perihelion {
            perihelion: date(field(&fields, 2, "perihelion date")?, "perihelion date")?,
            orientation: Orientation {
                inclination: number(&fields, 3, "inclination")?,
                arg_perihelion: number(&fields, 4, "argument of perihelion")?,
                node: number(&fields, 6, "ascending node")?,
            },
            perihelion_distance: number(&fields, 5, "perihelion distance")?,
            eccentricity: 1.0,
            equinox_year: equinox(field(&fields, 7, "equinox")?)?,
            magnitude: magnitude_model(&fields, 8, false)?,
        },
        _ => {
            return Err(AppError::InvalidInput(format!(
                "unsupported object type {kind:?}"
            )))
        }
    };
    Ok(XephemObject { name, record })
}

impl XephemObject {
    /// Heliocentric J2000 ecliptic position in AU at `t` TT centuries
    fn heliocentric(&self, t: f64) -> AppResult<Vector3<f64>> {
        let jd = time::J2000 + t * time::DAYS_PER_CENTURY;
        let (orientation, (x, y), equinox_year) = match &self.record {
            Record::Fixed { .. } => {
                return Err(AppError::InvalidInput(format!(
                    "{} is not a solar-system object",
                    self.name
                )))
            }
            Record::Elliptic {
                orientation,
                semi_major_axis,
                eccentricity,
                mean_anomaly,
                daily_motion,
                epoch,
                equinox_year,
                ..
            } => {
                let days = jd - time::julian_day(*epoch);
                let m = mean_anomaly + daily_motion * days;
                (
                    orientation,
                    orbit::elliptic_position(*semi_major_axis, *eccentricity, m)?,
                    *equinox_year,
                )
            }
            Record::Perihelion {
                orientation,
                perihelion,
                perihelion_distance,
                eccentricity,
                equinox_year,
                ..
            } => {
                let days = jd - time::julian_day(*perihelion);
                (
                    orientation,
                    orbit::position_from_perihelion(*perihelion_distance, *eccentricity, days)?,
                    *equinox_year,
                )
            }
        };
        let v = orientation.to_ecliptic(x, y);
        Ok(frames::precess_ecliptic(&v, (2000.0 - equinox_year) / 100.0))
    }
}

impl Observable for XephemObject {
    fn geocentric_state(&self, epoch: &Epoch) -> AppResult<GeocentricState> {
        let t = epoch.centuries();
        if let Record::Fixed {
            ra,
            dec,
            magnitude,
            epoch_year,
        } = &self.record
        {
            let equatorial = frames::from_spherical(*ra, *dec, FIXED_OBJECT_DISTANCE_AU * AU_KM);
            let ecliptic = frames::equatorial_to_ecliptic(&equatorial, frames::OBLIQUITY_J2000);
            let j2000 = frames::precess_ecliptic(&ecliptic, (2000.0 - epoch_year) / 100.0);
            return Ok(GeocentricState {
                position: frames::j2000_ecliptic_to_date_equatorial(&j2000, t),
                magnitude: *magnitude,
                semidiameter: 0.0,
            });
        }

        let (helio, geo) = planets::light_time_corrected(t, |tc| self.heliocentric(tc))?;
        let magnitude = match &self.record {
            Record::Elliptic { magnitude, .. } | Record::Perihelion { magnitude, .. } => {
                Some(magnitude.apparent(&Geometry::new(&helio, &geo)))
            }
            Record::Fixed { .. } => None,
        };
        Ok(GeocentricState {
            position: frames::j2000_ecliptic_to_date_equatorial(&(geo * AU_KM), t),
            magnitude: magnitude.filter(|m| m.is_finite()),
            semidiameter: 0.0,
        })
    }
}
