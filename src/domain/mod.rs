/// Domain models for the application
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

mod report;

pub use report::*;

/// XEphem record for M45 (the Pleiades), close enough to the ecliptic to be
/// worth including in close-approach searches.
pub const PLEIADES_DB: &str = "M45,f|U,3:47:0,24:07:0,1.6,2000,0";

/// Observer site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Where and when a report is computed. Built once per run and only ever
/// passed by reference.
#[derive(Debug, Clone)]
pub struct ObserverContext {
    pub location: Location,
    pub instant: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl ObserverContext {
    pub fn new(location: Location, instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            location,
            instant,
            offset,
        }
    }

    pub fn to_local(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.offset)
    }

    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.to_local(self.instant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StandardBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl StandardBody {
    pub const ALL: [StandardBody; 10] = [
        StandardBody::Sun,
        StandardBody::Moon,
        StandardBody::Mercury,
        StandardBody::Venus,
        StandardBody::Mars,
        StandardBody::Jupiter,
        StandardBody::Saturn,
        StandardBody::Uranus,
        StandardBody::Neptune,
        StandardBody::Pluto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StandardBody::Sun => "Sun",
            StandardBody::Moon => "Moon",
            StandardBody::Mercury => "Mercury",
            StandardBody::Venus => "Venus",
            StandardBody::Mars => "Mars",
            StandardBody::Jupiter => "Jupiter",
            StandardBody::Saturn => "Saturn",
            StandardBody::Uranus => "Uranus",
            StandardBody::Neptune => "Neptune",
            StandardBody::Pluto => "Pluto",
        }
    }

    pub fn is_planet(self) -> bool {
        !matches!(self, StandardBody::Sun | StandardBody::Moon)
    }
}

/// Deep-sky object given as an XEphem `f` record
#[derive(Debug, Clone, PartialEq)]
pub struct FixedObject {
    pub name: String,
    pub db_info: String,
}

impl FixedObject {
    pub fn pleiades() -> Self {
        Self {
            name: "M45".to_string(),
            db_info: PLEIADES_DB.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CometSpec {
    pub name: String,
    /// XEphem database line
    pub db_info: String,
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteSpec {
    pub name: String,
    pub tle_line1: String,
    pub tle_line2: String,
    pub display: bool,
}

/// Everything a report can track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedBody {
    Standard(StandardBody),
    Fixed(FixedObject),
    Comet(CometSpec),
    Satellite(SatelliteSpec),
}

impl TrackedBody {
    pub fn name(&self) -> &str {
        match self {
            TrackedBody::Standard(b) => b.name(),
            TrackedBody::Fixed(f) => &f.name,
            TrackedBody::Comet(c) => &c.name,
            TrackedBody::Satellite(s) => &s.name,
        }
    }

    /// Whether the body gets its own row or pass table
    pub fn is_displayed(&self) -> bool {
        match self {
            TrackedBody::Standard(_) => true,
            TrackedBody::Fixed(_) => false,
            TrackedBody::Comet(c) => c.display,
            TrackedBody::Satellite(s) => s.display,
        }
    }

    /// Satellites move too fast for conjunction tables; everything else with a
    /// position takes part, hidden comets included.
    pub fn joins_close_approaches(&self) -> bool {
        !matches!(self, TrackedBody::Satellite(_))
    }
}

/// Ordered set of bodies for one run: Sun, Moon, planets, fixed objects,
/// comets, then satellites.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bodies: Vec<TrackedBody>,
}

impl Catalog {
    pub fn new(comets: Vec<CometSpec>, satellites: Vec<SatelliteSpec>) -> Self {
        let mut bodies: Vec<TrackedBody> = StandardBody::ALL
            .iter()
            .map(|b| TrackedBody::Standard(*b))
            .collect();
        bodies.push(TrackedBody::Fixed(FixedObject::pleiades()));
        bodies.extend(comets.into_iter().map(TrackedBody::Comet));
        bodies.extend(satellites.into_iter().map(TrackedBody::Satellite));
        Self { bodies }
    }

    pub fn bodies(&self) -> &[TrackedBody] {
        &self.bodies
    }

    pub fn satellites(&self) -> impl Iterator<Item = &SatelliteSpec> {
        self.bodies.iter().filter_map(|b| match b {
            TrackedBody::Satellite(s) => Some(s),
            _ => None,
        })
    }
}
