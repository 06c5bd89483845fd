/// Ephemeris oracle: positions, horizon crossings, lunar phases and
/// satellite tracking for an observer
use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;
use tracing::debug;

use crate::domain::{Location, PhaseKind, SatelliteSpec, StandardBody, TrackedBody};
use crate::errors::{AppError, AppResult};

pub mod frames;
mod moon;
mod orbit;
mod planets;
pub mod satellite;
pub mod search;
mod sun;
pub mod time;
pub mod xephem;

pub use search::SearchDirection;

use satellite::SatelliteOrbit;
use search::{CrossingScan, Slope};
use time::Epoch;

pub const AU_KM: f64 = 149_597_870.7;
pub const LIGHT_DAYS_PER_AU: f64 = 0.005_775_518_3;

/// Rise/set searches look this far either side of the start
const RISE_SET_WINDOW_HOURS: i64 = 48;
const RISE_SET_STEP_MINUTES: i64 = 10;
/// Longer than a synodic month so every phase kind is bracketed
const PHASE_WINDOW_DAYS: usize = 32;

/// Geocentric position in km on the equator and equinox of date
#[derive(Debug, Clone, Copy)]
pub struct GeocentricState {
    pub position: Vector3<f64>,
    pub magnitude: Option<f64>,
    /// Apparent radius of the disk, degrees
    pub semidiameter: f64,
}

/// Anything that can yield a geocentric position at an instant
pub trait Observable {
    fn geocentric_state(&self, epoch: &Epoch) -> AppResult<GeocentricState>;
}

impl Observable for StandardBody {
    fn geocentric_state(&self, epoch: &Epoch) -> AppResult<GeocentricState> {
        match self {
            StandardBody::Sun => {
                let sun = sun::position(epoch);
                Ok(GeocentricState {
                    position: sun::geocentric_vector(epoch),
                    magnitude: Some(planets::sun_magnitude(sun.distance_au)),
                    semidiameter: sun.semidiameter(),
                })
            }
            StandardBody::Moon => {
                let moon = moon::position(epoch);
                let phase_angle = moon::phase_angle(&moon, &sun::position(epoch));
                Ok(GeocentricState {
                    position: moon::geocentric_vector(&moon, epoch),
                    magnitude: Some(moon::magnitude(phase_angle)),
                    semidiameter: moon.semidiameter(),
                })
            }
            planet => planets::geocentric_state(*planet, epoch)?.ok_or_else(|| {
                AppError::Search(format!("no theory for {}", planet.name()))
            }),
        }
    }
}

/// Instantaneous apparent place for an observer. Degrees throughout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Apparent {
    /// Refracted altitude
    pub altitude: f64,
    pub azimuth: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Rising,
    Setting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngle {
    pub altitude: f64,
    pub azimuth: f64,
}

/// Per-satellite view used by pass prediction
pub trait SatelliteTracker {
    fn look(&self, location: &Location, at: DateTime<Utc>) -> AppResult<LookAngle>;

    /// Satellite sunlit while the observer's sky is dark
    fn is_visible(&self, location: &Location, at: DateTime<Utc>) -> AppResult<bool>;
}

/// Source of every astronomical quantity the report needs
pub trait EphemerisOracle {
    fn observe(&self, body: &TrackedBody, location: &Location, at: DateTime<Utc>)
        -> AppResult<Apparent>;

    /// Next crossing after `from`, or the last one at or before it.
    /// `None` for bodies that stay up or stay down through the search window.
    fn horizon_crossing(
        &self,
        body: &TrackedBody,
        location: &Location,
        from: DateTime<Utc>,
        crossing: Crossing,
        direction: SearchDirection,
    ) -> AppResult<Option<DateTime<Utc>>>;

    /// First event strictly after `from`, or the last one at or before it
    fn phase_event(
        &self,
        kind: PhaseKind,
        from: DateTime<Utc>,
        direction: SearchDirection,
    ) -> AppResult<DateTime<Utc>>;

    fn moon_illumination(&self, at: DateTime<Utc>) -> AppResult<f64>;

    /// Elapsed fraction of the synodic month containing `at`
    fn lunation(&self, at: DateTime<Utc>) -> AppResult<f64> {
        let previous = self.phase_event(PhaseKind::NewMoon, at, SearchDirection::Previous)?;
        let next = self.phase_event(PhaseKind::NewMoon, at, SearchDirection::Next)?;
        let month = (next - previous).num_milliseconds() as f64;
        if month <= 0.0 {
            return Err(AppError::Search("new moons out of order".to_string()));
        }
        Ok((at - previous).num_milliseconds() as f64 / month)
    }

    fn satellite_tracker(&self, spec: &SatelliteSpec) -> AppResult<Box<dyn SatelliteTracker>>;
}

/// Topocentric apparent place of a geocentric position
pub fn topocentric(position: &Vector3<f64>, location: &Location, epoch: &Epoch) -> Apparent {
    let lst = epoch.local_sidereal_deg(location.longitude);
    let topo = position - frames::observer_position(location, lst);
    let (ra, dec, _) = frames::to_spherical(&topo);
    let (altitude, azimuth) = frames::horizontal(ra, dec, location.latitude, lst);
    Apparent {
        altitude: altitude + frames::refraction(altitude),
        azimuth,
        right_ascension: ra,
        declination: dec,
        magnitude: None,
    }
}

/// Built-in analytic ephemeris
#[derive(Debug, Clone)]
pub struct Ephemeris {
    /// Sun altitude below which the observer's sky counts as dark
    twilight_altitude: f64,
}

impl Ephemeris {
    pub fn new(twilight_altitude: f64) -> Self {
        Self { twilight_altitude }
    }

    fn resolve(&self, body: &TrackedBody) -> AppResult<Box<dyn Observable>> {
        let source: Box<dyn Observable> = match body {
            TrackedBody::Standard(b) => Box::new(*b),
            TrackedBody::Fixed(f) => Box::new(
                xephem::parse(&f.db_info)
                    .map_err(|e| AppError::invalid_elements(&f.name, e.to_string()))?,
            ),
            TrackedBody::Comet(c) => Box::new(
                xephem::parse(&c.db_info)
                    .map_err(|e| AppError::invalid_elements(&c.name, e.to_string()))?,
            ),
            TrackedBody::Satellite(s) => Box::new(SatelliteOrbit::from_spec(s)?),
        };
        Ok(source)
    }

    /// Altitude of the upper limb, refracted; zero at rise and set
    fn limb_altitude(
        source: &dyn Observable,
        location: &Location,
        at: DateTime<Utc>,
    ) -> AppResult<f64> {
        let epoch = Epoch::from_utc(at);
        let state = source.geocentric_state(&epoch)?;
        Ok(topocentric(&state.position, location, &epoch).altitude + state.semidiameter)
    }
}

impl EphemerisOracle for Ephemeris {
    fn observe(
        &self,
        body: &TrackedBody,
        location: &Location,
        at: DateTime<Utc>,
    ) -> AppResult<Apparent> {
        let epoch = Epoch::from_utc(at);
        let state = self.resolve(body)?.geocentric_state(&epoch)?;
        Ok(Apparent {
            magnitude: state.magnitude,
            ..topocentric(&state.position, location, &epoch)
        })
    }

    fn horizon_crossing(
        &self,
        body: &TrackedBody,
        location: &Location,
        from: DateTime<Utc>,
        crossing: Crossing,
        direction: SearchDirection,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let source = self.resolve(body)?;
        let scan = CrossingScan {
            step: Duration::minutes(RISE_SET_STEP_MINUTES),
            steps: (RISE_SET_WINDOW_HOURS * 60 / RISE_SET_STEP_MINUTES) as usize,
            tolerance: Duration::seconds(1),
            max_jump: None,
        };
        let slope = match crossing {
            Crossing::Rising => Slope::Rising,
            Crossing::Setting => Slope::Falling,
        };
        let found = scan.find(
            |t| Self::limb_altitude(source.as_ref(), location, t),
            from,
            slope,
            direction,
        )?;
        if found.is_none() {
            debug!("{} has no {:?} {:?} within {}h", body.name(), direction, crossing, RISE_SET_WINDOW_HOURS);
        }
        Ok(found)
    }

    fn phase_event(
        &self,
        kind: PhaseKind,
        from: DateTime<Utc>,
        direction: SearchDirection,
    ) -> AppResult<DateTime<Utc>> {
        let scan = CrossingScan {
            step: Duration::days(1),
            steps: PHASE_WINDOW_DAYS,
            tolerance: Duration::seconds(1),
            max_jump: Some(90.0),
        };
        let target = kind.elongation();
        scan.find(
            |t| Ok(frames::wrap_180(moon::elongation(&Epoch::from_utc(t)) - target)),
            from,
            Slope::Rising,
            direction,
        )?
        .ok_or_else(|| {
            AppError::Search(format!(
                "no {} within {PHASE_WINDOW_DAYS} days of {from}",
                kind.label()
            ))
        })
    }

    fn moon_illumination(&self, at: DateTime<Utc>) -> AppResult<f64> {
        let epoch = Epoch::from_utc(at);
        let phase_angle = moon::phase_angle(&moon::position(&epoch), &sun::position(&epoch));
        Ok(moon::illuminated_fraction(phase_angle))
    }

    fn satellite_tracker(&self, spec: &SatelliteSpec) -> AppResult<Box<dyn SatelliteTracker>> {
        let orbit = SatelliteOrbit::from_spec(spec)?;
        debug!("{} elements epoch {}", spec.name, orbit.epoch());
        Ok(Box::new(OrbitTracker {
            orbit,
            twilight_altitude: self.twilight_altitude,
        }))
    }
}

struct OrbitTracker {
    orbit: SatelliteOrbit,
    twilight_altitude: f64,
}

impl SatelliteTracker for OrbitTracker {
    fn look(&self, location: &Location, at: DateTime<Utc>) -> AppResult<LookAngle> {
        let epoch = Epoch::from_utc(at);
        let place = topocentric(&self.orbit.position(at)?, location, &epoch);
        Ok(LookAngle {
            altitude: place.altitude,
            azimuth: place.azimuth,
        })
    }

    fn is_visible(&self, location: &Location, at: DateTime<Utc>) -> AppResult<bool> {
        let epoch = Epoch::from_utc(at);
        let sun = topocentric(&sun::geocentric_vector(&epoch), location, &epoch);
        if sun.altitude >= self.twilight_altitude {
            return Ok(false);
        }
        Ok(satellite::is_sunlit(&self.orbit.position(at)?, &epoch))
    }
}
