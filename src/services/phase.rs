use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{ObserverContext, PhaseEvent, PhaseKind, PhaseTimeline};
use crate::ephemeris::{EphemerisOracle, SearchDirection};
use crate::errors::{AppError, AppResult};

/// Brackets the report instant between lunar phase events
pub struct LunarPhaseTracker<'a, O: ?Sized> {
    oracle: &'a O,
}

impl<'a, O> LunarPhaseTracker<'a, O>
where
    O: EphemerisOracle + ?Sized,
{
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    pub fn timeline(&self, ctx: &ObserverContext) -> AppResult<PhaseTimeline> {
        let now = ctx.instant;
        let event = |kind: PhaseKind, utc: DateTime<Utc>| PhaseEvent {
            kind,
            utc,
            local: ctx.to_local(utc),
        };

        // PhaseKind::ALL is in tie-break order, so only a strictly later
        // event replaces the current pick
        let mut most_recent: Option<PhaseEvent> = None;
        for kind in PhaseKind::ALL {
            let at = self
                .oracle
                .phase_event(kind, now, SearchDirection::Previous)?;
            if at > now {
                return Err(AppError::Search(format!(
                    "previous {} at {at} is after {now}",
                    kind.label()
                )));
            }
            if most_recent.as_ref().map_or(true, |e| at > e.utc) {
                most_recent = Some(event(kind, at));
            }
        }
        let most_recent = most_recent
            .ok_or_else(|| AppError::Search("no previous lunar phase".to_string()))?;

        let mut upcoming = Vec::with_capacity(PhaseKind::ALL.len());
        for kind in PhaseKind::ALL {
            let at = self.oracle.phase_event(kind, now, SearchDirection::Next)?;
            if at <= now {
                return Err(AppError::Search(format!(
                    "next {} at {at} is not after {now}",
                    kind.label()
                )));
            }
            upcoming.push(event(kind, at));
        }
        upcoming.sort_by_key(|e| e.utc);

        let illumination = self.oracle.moon_illumination(now)?;
        let lunation = self.oracle.lunation(now)?;
        debug!(
            "lunar phase: {} since {}, illumination {:.3}",
            most_recent.kind.label(),
            most_recent.utc,
            illumination
        );

        Ok(PhaseTimeline {
            illumination,
            lunation,
            most_recent,
            upcoming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, SatelliteSpec, TrackedBody};
    use crate::ephemeris::{Apparent, Crossing, Ephemeris, SatelliteTracker};
    use chrono::{Duration, FixedOffset, TimeZone};

    /// Phase events on a fixed schedule
    struct ScheduledPhases {
        previous: [DateTime<Utc>; 4],
        next: [DateTime<Utc>; 4],
    }

    fn slot(kind: PhaseKind) -> usize {
        PhaseKind::ALL.iter().position(|k| *k == kind).unwrap()
    }

    impl EphemerisOracle for ScheduledPhases {
        fn observe(&self, _: &TrackedBody, _: &Location, _: DateTime<Utc>) -> AppResult<Apparent> {
            unreachable!()
        }

        fn horizon_crossing(
            &self,
            _: &TrackedBody,
            _: &Location,
            _: DateTime<Utc>,
            _: Crossing,
            _: SearchDirection,
        ) -> AppResult<Option<DateTime<Utc>>> {
            unreachable!()
        }

        fn phase_event(
            &self,
            kind: PhaseKind,
            _: DateTime<Utc>,
            direction: SearchDirection,
        ) -> AppResult<DateTime<Utc>> {
            Ok(match direction {
                SearchDirection::Previous => self.previous[slot(kind)],
                SearchDirection::Next => self.next[slot(kind)],
            })
        }

        fn moon_illumination(&self, _: DateTime<Utc>) -> AppResult<f64> {
            Ok(0.42)
        }

        fn satellite_tracker(&self, _: &SatelliteSpec) -> AppResult<Box<dyn SatelliteTracker>> {
            unreachable!()
        }
    }

    fn ctx(at: DateTime<Utc>) -> ObserverContext {
        let location = Location {
            name: "Los Gatos".to_string(),
            latitude: 37.2358,
            longitude: -121.9624,
            elevation_m: 125.0,
            country: Some("US".to_string()),
        };
        ObserverContext::new(location, at, FixedOffset::west_opt(7 * 3600).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap()
    }

    fn days(d: i64) -> DateTime<Utc> {
        now() + Duration::days(d)
    }

    #[test]
    fn test_most_recent_and_upcoming_order() {
        let oracle = ScheduledPhases {
            previous: [days(-7), days(-22), days(-14), days(-29)],
            next: [days(22), days(1), days(8), days(15)],
        };
        let timeline = LunarPhaseTracker::new(&oracle).timeline(&ctx(now())).unwrap();
        assert_eq!(timeline.most_recent.kind, PhaseKind::NewMoon);
        assert_eq!(timeline.most_recent.utc, days(-7));

        let kinds: Vec<PhaseKind> = timeline.upcoming.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PhaseKind::FirstQuarter,
                PhaseKind::FullMoon,
                PhaseKind::LastQuarter,
                PhaseKind::NewMoon
            ]
        );
        assert!(timeline.upcoming.windows(2).all(|w| w[0].utc < w[1].utc));
        assert!(timeline.upcoming.iter().all(|e| e.utc > now()));
        assert_eq!(timeline.illumination, 0.42);
        // lunation from the scheduled new moons: 7 of 29 days
        assert!((timeline.lunation - 7.0 / 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_local_time_uses_observer_offset() {
        let oracle = ScheduledPhases {
            previous: [days(-7), days(-22), days(-14), days(-29)],
            next: [days(22), days(1), days(8), days(15)],
        };
        let timeline = LunarPhaseTracker::new(&oracle).timeline(&ctx(now())).unwrap();
        let first = &timeline.upcoming[0];
        assert_eq!(first.local, first.utc);
        assert_eq!(first.local.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_tie_goes_to_earlier_kind() {
        let oracle = ScheduledPhases {
            previous: [days(-3), days(-3), days(-14), days(-29)],
            next: [days(26), days(4), days(11), days(18)],
        };
        let timeline = LunarPhaseTracker::new(&oracle).timeline(&ctx(now())).unwrap();
        assert_eq!(timeline.most_recent.kind, PhaseKind::NewMoon);
    }

    #[test]
    fn test_event_at_now_counts_as_previous() {
        let oracle = ScheduledPhases {
            previous: [days(-14), days(-7), days(0), days(-21)],
            next: [days(15), days(22), days(29), days(8)],
        };
        let timeline = LunarPhaseTracker::new(&oracle).timeline(&ctx(now())).unwrap();
        assert_eq!(timeline.most_recent.kind, PhaseKind::FullMoon);
        assert_eq!(timeline.most_recent.utc, now());
    }

    #[test]
    fn test_oracle_returning_future_previous_is_rejected() {
        let oracle = ScheduledPhases {
            previous: [days(1), days(-22), days(-14), days(-29)],
            next: [days(22), days(1), days(8), days(15)],
        };
        let err = LunarPhaseTracker::new(&oracle).timeline(&ctx(now())).unwrap_err();
        assert_eq!(err.code(), "SEARCH_ERROR");
    }

    #[test]
    fn test_builtin_ephemeris_timeline() {
        let eph = Ephemeris::new(-6.0);
        let timeline = LunarPhaseTracker::new(&eph).timeline(&ctx(now())).unwrap();
        // 2024-04-15 lies between the 8 April new moon and the 15 April first quarter
        assert!(timeline.most_recent.utc <= now());
        assert_eq!(timeline.upcoming.len(), 4);
        assert!(timeline.upcoming.windows(2).all(|w| w[0].utc < w[1].utc));
        assert!((0.0..=1.0).contains(&timeline.illumination));
        assert!((0.0..1.0).contains(&timeline.lunation));
    }
}
