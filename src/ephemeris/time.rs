//! Time scales for the analytic theories.
//!
//! UTC is used in place of UT1. Terrestrial time comes from the
//! Espenak-Meeus ΔT polynomials, which is plenty for arc-minute work.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::errors::{AppError, AppResult};

pub const J2000: f64 = 2_451_545.0;
pub const DAYS_PER_CENTURY: f64 = 36_525.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn julian_day(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// Calendar date with a fractional day, as XEphem writes it (`3/10.1691/2013`)
pub fn from_calendar(year: i32, month: u32, day: f64) -> AppResult<DateTime<Utc>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::InvalidInput(format!("invalid date {month}/{day}/{year}")))?;
    if !(1.0..32.0).contains(&day) {
        return Err(AppError::InvalidInput(format!("invalid day {day} in {month}/{year}")));
    }
    let offset = Duration::milliseconds(((day - 1.0) * MILLIS_PER_DAY).round() as i64);
    Ok(Utc.from_utc_datetime(&(first + offset)))
}

pub fn decimal_year(t: DateTime<Utc>) -> f64 {
    2000.0 + (julian_day(t) - J2000) / 365.25
}

/// ΔT = TT - UT in seconds
pub fn delta_t_seconds(year: f64) -> f64 {
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };
    match year {
        y if y < 1900.0 => long_term(y),
        y if y < 1920.0 => {
            let t = y - 1900.0;
            -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
                - 0.000197 * t.powi(4)
        }
        y if y < 1941.0 => {
            let t = y - 1920.0;
            21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
        }
        y if y < 1961.0 => {
            let t = y - 1950.0;
            29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
        }
        y if y < 1986.0 => {
            let t = y - 1975.0;
            45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
        }
        y if y < 2005.0 => {
            let t = y - 2000.0;
            63.86 + 0.3345 * t - 0.060374 * t.powi(2)
                + 0.0017275 * t.powi(3)
                + 0.000651814 * t.powi(4)
                + 0.00002373599 * t.powi(5)
        }
        y if y < 2050.0 => {
            let t = y - 2000.0;
            62.92 + 0.32217 * t + 0.005589 * t.powi(2)
        }
        y if y < 2150.0 => long_term(y) - 0.5628 * (2150.0 - y),
        y => long_term(y),
    }
}

/// One instant expressed in the scales the theories need
#[derive(Debug, Clone, Copy)]
pub struct Epoch {
    pub utc: DateTime<Utc>,
    pub jd_ut: f64,
    pub jd_tt: f64,
}

impl Epoch {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        let jd_ut = julian_day(utc);
        let year = utc.year() as f64 + (utc.ordinal0() as f64) / 365.25;
        let jd_tt = jd_ut + delta_t_seconds(year) / 86_400.0;
        Self { utc, jd_ut, jd_tt }
    }

    /// Julian centuries of TT since J2000
    pub fn centuries(&self) -> f64 {
        (self.jd_tt - J2000) / DAYS_PER_CENTURY
    }

    /// Greenwich mean sidereal time in degrees
    pub fn gmst_deg(&self) -> f64 {
        let d = self.jd_ut - J2000;
        let t = d / DAYS_PER_CENTURY;
        let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0;
        theta.rem_euclid(360.0)
    }

    /// Local mean sidereal time in degrees, longitude east positive
    pub fn local_sidereal_deg(&self, longitude: f64) -> f64 {
        (self.gmst_deg() + longitude).rem_euclid(360.0)
    }
}
