use tracing::{debug, warn};

use crate::domain::{BodyRow, ObservationRecord, ObserverContext, RowStatus, TrackedBody};
use crate::ephemeris::{Crossing, EphemerisOracle, SearchDirection};
use crate::errors::AppResult;

/// Observe one body at the report instant.
///
/// A body above the horizon reports the rising that brought it up and the
/// setting that will take it down. A body below reports its next rising and
/// next setting, whichever order they come in.
pub fn observe_body<O>(
    oracle: &O,
    body: &TrackedBody,
    ctx: &ObserverContext,
) -> AppResult<ObservationRecord>
where
    O: EphemerisOracle + ?Sized,
{
    let place = oracle.observe(body, &ctx.location, ctx.instant)?;
    let visible = place.altitude > 0.0;
    let rise_direction = if visible {
        SearchDirection::Previous
    } else {
        SearchDirection::Next
    };
    let rise = oracle.horizon_crossing(
        body,
        &ctx.location,
        ctx.instant,
        Crossing::Rising,
        rise_direction,
    )?;
    let set = oracle.horizon_crossing(
        body,
        &ctx.location,
        ctx.instant,
        Crossing::Setting,
        SearchDirection::Next,
    )?;

    Ok(ObservationRecord {
        visible,
        altitude: place.altitude,
        azimuth: place.azimuth,
        rise,
        set,
        magnitude: place.magnitude.filter(|m| m.is_finite()),
        right_ascension: place.right_ascension,
        declination: place.declination,
    })
}

/// Row for the report; a failing body becomes an unavailable row
pub fn build_row<O>(oracle: &O, body: &TrackedBody, ctx: &ObserverContext) -> BodyRow
where
    O: EphemerisOracle + ?Sized,
{
    let status = match observe_body(oracle, body, ctx) {
        Ok(record) => {
            debug!(
                "{}: alt {:.2} az {:.2} visible {}",
                body.name(),
                record.altitude,
                record.azimuth,
                record.visible
            );
            RowStatus::Observed(record)
        }
        Err(e) => {
            warn!("{} unavailable: {}", body.name(), e);
            RowStatus::Unavailable(e.detail())
        }
    };
    BodyRow {
        name: body.name().to_string(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CometSpec, Location, StandardBody};
    use crate::ephemeris::Ephemeris;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn london_at(y: i32, m: u32, d: u32, h: u32) -> ObserverContext {
        let location = Location {
            name: "London".to_string(),
            latitude: 51.5072,
            longitude: -0.1276,
            elevation_m: 11.0,
            country: Some("GB".to_string()),
        };
        let instant = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        ObserverContext::new(location, instant, FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_visible_sun_is_bracketed_by_rise_and_set() {
        let ctx = london_at(2024, 3, 20, 12);
        let eph = Ephemeris::new(-6.0);
        let record = observe_body(&eph, &TrackedBody::Standard(StandardBody::Sun), &ctx).unwrap();
        assert!(record.visible);
        assert!(record.altitude > 0.0);
        let (rise, set) = (record.rise.unwrap(), record.set.unwrap());
        assert!(rise <= ctx.instant && ctx.instant <= set);
        assert!(record.magnitude.unwrap() < -26.0);
    }

    #[test]
    fn test_sun_below_horizon_rises_next() {
        let ctx = london_at(2024, 3, 20, 0);
        let eph = Ephemeris::new(-6.0);
        let record = observe_body(&eph, &TrackedBody::Standard(StandardBody::Sun), &ctx).unwrap();
        assert!(!record.visible);
        let (rise, set) = (record.rise.unwrap(), record.set.unwrap());
        assert!(rise > ctx.instant);
        assert!(set > rise);
    }

    #[test]
    fn test_broken_comet_row_is_unavailable() {
        let ctx = london_at(2024, 3, 20, 22);
        let eph = Ephemeris::new(-6.0);
        let comet = TrackedBody::Comet(CometSpec {
            name: "C/Nowhere".to_string(),
            db_info: "C/Nowhere,e,1,2".to_string(),
            display: true,
        });
        let row = build_row(&eph, &comet, &ctx);
        assert_eq!(row.name, "C/Nowhere");
        assert!(row.record().is_none());
        match row.status {
            RowStatus::Unavailable(detail) => assert_eq!(detail.code, "INVALID_ELEMENTS"),
            other => panic!("unexpected status {other:?}"),
        }
    }
}
