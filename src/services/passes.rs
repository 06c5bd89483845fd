use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::domain::{ObserverContext, PassOutcome, PassPoint, PassWindow, SatelliteSpec};
use crate::ephemeris::search::{bisect, maximize};
use crate::ephemeris::{EphemerisOracle, SatelliteTracker};
use crate::errors::AppResult;

/// Tuning for the forward pass search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSearchConfig {
    pub horizon_hours: f64,
    pub step_seconds: u64,
    /// Only accept passes where the satellite is lit against a dark sky
    pub require_visible: bool,
}

impl Default for PassSearchConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 168.0,
            step_seconds: 20,
            require_visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PassState {
    SeekingRise,
    SeekingPeak { rise: DateTime<Utc> },
    SeekingSet { rise: DateTime<Utc>, peak: PassPoint },
}

/// Finds the next pass of a satellite over the observer
pub struct SatellitePassPredictor<'a, O: ?Sized> {
    oracle: &'a O,
    config: PassSearchConfig,
}

impl<'a, O> SatellitePassPredictor<'a, O>
where
    O: EphemerisOracle + ?Sized,
{
    pub fn new(oracle: &'a O, config: PassSearchConfig) -> Self {
        Self { oracle, config }
    }

    pub fn predict(&self, spec: &SatelliteSpec, ctx: &ObserverContext) -> PassOutcome {
        let step_seconds = self.config.step_seconds.max(1);
        let steps = (self.config.horizon_hours.max(0.0) * 3600.0 / step_seconds as f64).ceil() as usize;
        match self.search(spec, ctx, step_seconds, steps) {
            Ok(Some(window)) => {
                debug!("{} rises at {} peaking at {:.1}", spec.name, window.rise.at, window.peak.altitude);
                PassOutcome::Found(window)
            }
            Ok(None) => {
                let searched_hours = (steps as u64 * step_seconds) as f64 / 3600.0;
                debug!("{} has no pass within {searched_hours}h", spec.name);
                PassOutcome::NotFound { searched_hours }
            }
            Err(e) => {
                warn!("{} pass search failed: {}", spec.name, e);
                PassOutcome::Unavailable(e.detail())
            }
        }
    }

    fn search(
        &self,
        spec: &SatelliteSpec,
        ctx: &ObserverContext,
        step_seconds: u64,
        steps: usize,
    ) -> AppResult<Option<PassWindow>> {
        let tracker = self.oracle.satellite_tracker(spec)?;
        let location = &ctx.location;
        let altitude = |t: DateTime<Utc>| tracker.look(location, t).map(|l| l.altitude);
        let point = |t: DateTime<Utc>| -> AppResult<PassPoint> {
            let look = tracker.look(location, t)?;
            Ok(PassPoint {
                at: t,
                altitude: look.altitude,
                azimuth: look.azimuth,
            })
        };
        let step = Duration::seconds(step_seconds as i64);
        let tolerance = Duration::seconds(1);

        let mut state = PassState::SeekingRise;
        let mut t_prev = ctx.instant;
        let mut alt_prev = altitude(t_prev)?;
        for _ in 0..steps {
            let t = t_prev + step;
            let alt = altitude(t)?;

            state = match state {
                PassState::SeekingRise if alt_prev <= 0.0 && alt > 0.0 => PassState::SeekingPeak {
                    rise: bisect(&altitude, t_prev, t, tolerance)?,
                },
                PassState::SeekingPeak { rise } if alt < alt_prev => {
                    let lo = rise.max(t_prev - step);
                    let (peak_at, _) = maximize(&altitude, lo, t, tolerance)?;
                    let peak = point(peak_at)?;
                    if alt <= 0.0 {
                        let set = bisect(&altitude, t_prev, t, tolerance)?;
                        match self.accept(tracker.as_ref(), ctx, rise, peak, set, &point)? {
                            Some(window) => return Ok(Some(window)),
                            None => PassState::SeekingRise,
                        }
                    } else {
                        PassState::SeekingSet { rise, peak }
                    }
                }
                PassState::SeekingSet { rise, peak } if alt <= 0.0 => {
                    let set = bisect(&altitude, t_prev, t, tolerance)?;
                    match self.accept(tracker.as_ref(), ctx, rise, peak, set, &point)? {
                        Some(window) => return Ok(Some(window)),
                        None => PassState::SeekingRise,
                    }
                }
                unchanged => unchanged,
            };

            t_prev = t;
            alt_prev = alt;
        }
        Ok(None)
    }

    /// Completed pass, if it is well ordered and, when required, visible
    fn accept<P>(
        &self,
        tracker: &dyn SatelliteTracker,
        ctx: &ObserverContext,
        rise: DateTime<Utc>,
        peak: PassPoint,
        set: DateTime<Utc>,
        point: &P,
    ) -> AppResult<Option<PassWindow>>
    where
        P: Fn(DateTime<Utc>) -> AppResult<PassPoint>,
    {
        if !(rise < peak.at && peak.at < set) {
            debug!("discarding degenerate pass around {}", peak.at);
            return Ok(None);
        }
        if self.config.require_visible && !tracker.is_visible(&ctx.location, peak.at)? {
            debug!("pass peaking at {} is not visible", peak.at);
            return Ok(None);
        }
        Ok(Some(PassWindow {
            rise: point(rise)?,
            peak,
            set: point(set)?,
        }))
    }
}
