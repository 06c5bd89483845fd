/// Utility functions
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return s.trim().parse::<f64>().ok();
    }
    None
}

/// Great-circle angle between two equatorial positions, all in degrees.
/// Spherical law of cosines, with the cosine clamped so rounding never
/// pushes it outside [-1, 1].
pub fn angular_separation_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (d1, d2) = (dec1.to_radians(), dec2.to_radians());
    let dra = (ra1 - ra2).to_radians();
    let cos_sep = d1.sin() * d2.sin() + d1.cos() * d2.cos() * dra.cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Parse a `YYYY/MM/DD HH:MM` observation time given in the observer's
/// local time zone. Seconds and a bare date are accepted too. A wall time
/// repeated by a clock change resolves to its first occurrence.
pub fn parse_observation_time<Tz: TimeZone>(s: &str, tz: &Tz) -> AppResult<DateTime<Utc>> {
    let s = s.trim();
    let naive = ["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y/%m/%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            AppError::InvalidInput(format!("date {s:?} is not in YYYY/MM/DD HH:MM form"))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::InvalidInput(format!("local time {s:?} does not exist")))
}

/// Build a fixed offset from fractional hours east of UTC
pub fn offset_from_hours(hours: f64) -> AppResult<FixedOffset> {
    FixedOffset::east_opt((hours * 3600.0).round() as i32)
        .ok_or_else(|| AppError::InvalidInput(format!("UTC offset {hours}h is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_num_from_float() {
        let json = serde_json::json!(42.5);
        assert_eq!(num(&json), Some(42.5));
    }

    #[test]
    fn test_num_from_string() {
        let json = serde_json::json!("-121.9624");
        assert_eq!(num(&json), Some(-121.9624));
    }

    #[test]
    fn test_num_from_invalid() {
        let json = serde_json::json!("invalid");
        assert_eq!(num(&json), None);
        assert_eq!(num(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_separation_zero_distance() {
        assert_eq!(angular_separation_deg(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_separation_known_values() {
        // Pole to equator
        let sep = angular_separation_deg(0.0, 90.0, 123.0, 0.0);
        assert!((sep - 90.0).abs() < 1e-9);
        // Opposite points on the equator
        let sep = angular_separation_deg(0.0, 0.0, 180.0, 0.0);
        assert!((sep - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let a = angular_separation_deg(56.75, 24.12, 83.82, -5.39);
        let b = angular_separation_deg(83.82, -5.39, 56.75, 24.12);
        assert!((a - b).abs() < 1e-12);
        assert!((0.0..=180.0).contains(&a));
    }

    #[test]
    fn test_parse_observation_time_local() {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let t = parse_observation_time("2024/04/08 11:10", &offset).unwrap();
        assert_eq!(t.hour(), 18);
        assert_eq!(t.minute(), 10);
    }

    #[test]
    fn test_parse_observation_time_variants() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(parse_observation_time("2024/04/08", &utc).is_ok());
        assert!(parse_observation_time("2024/04/08 01:02:03", &utc).is_ok());
        assert!(parse_observation_time("08-04-2024", &utc).is_err());
    }

    #[test]
    fn test_offset_from_hours() {
        assert_eq!(offset_from_hours(5.5).unwrap().local_minus_utc(), 19800);
        assert!(offset_from_hours(30.0).is_err());
    }
}
