use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::Location;
use crate::errors::ErrorDetail;

/// Per-body observation at the report instant. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub visible: bool,
    pub altitude: f64,
    pub azimuth: f64,
    /// Previous rising when the body is up, next rising otherwise
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    pub magnitude: Option<f64>,
    pub right_ascension: f64,
    pub declination: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Observed(ObservationRecord),
    Unavailable(ErrorDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyRow {
    pub name: String,
    #[serde(flatten)]
    pub status: RowStatus,
}

impl BodyRow {
    pub fn record(&self) -> Option<&ObservationRecord> {
        match &self.status {
            RowStatus::Observed(r) => Some(r),
            RowStatus::Unavailable(_) => None,
        }
    }
}

/// Angular separation between two bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachPair {
    pub first: String,
    pub second: String,
    pub separation_deg: f64,
    pub degrees: u32,
    pub arcminutes: u32,
}

impl ApproachPair {
    pub fn new(first: &str, second: &str, separation_deg: f64) -> Self {
        let total = (separation_deg * 60.0).round() as u32;
        Self {
            first: first.to_string(),
            second: second.to_string(),
            separation_deg,
            degrees: total / 60,
            arcminutes: total % 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhaseKind {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl PhaseKind {
    /// Also the tie-break priority
    pub const ALL: [PhaseKind; 4] = [
        PhaseKind::NewMoon,
        PhaseKind::FirstQuarter,
        PhaseKind::FullMoon,
        PhaseKind::LastQuarter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::NewMoon => "New Moon",
            PhaseKind::FirstQuarter => "First Quarter",
            PhaseKind::FullMoon => "Full Moon",
            PhaseKind::LastQuarter => "Last Quarter",
        }
    }

    /// Moon minus Sun ecliptic longitude at the event, in degrees
    pub fn elongation(self) -> f64 {
        match self {
            PhaseKind::NewMoon => 0.0,
            PhaseKind::FirstQuarter => 90.0,
            PhaseKind::FullMoon => 180.0,
            PhaseKind::LastQuarter => 270.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseEvent {
    pub kind: PhaseKind,
    pub utc: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTimeline {
    /// Illuminated fraction of the disk, 0..=1
    pub illumination: f64,
    /// Fraction of the current synodic month elapsed, 0..1
    pub lunation: f64,
    pub most_recent: PhaseEvent,
    /// Next occurrence of each kind, chronological
    pub upcoming: Vec<PhaseEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LunarPhase {
    Available(PhaseTimeline),
    Unavailable(ErrorDetail),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassPoint {
    pub at: DateTime<Utc>,
    pub altitude: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassWindow {
    pub rise: PassPoint,
    pub peak: PassPoint,
    pub set: PassPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PassOutcome {
    Found(PassWindow),
    NotFound { searched_hours: f64 },
    Unavailable(ErrorDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatellitePass {
    pub name: String,
    pub outcome: PassOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObserverSummary {
    pub site: Location,
    pub utc: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
}

/// Everything one run produces, grouped for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub observer: ObserverSummary,
    pub sun_and_moon: Vec<BodyRow>,
    pub planets: Vec<BodyRow>,
    pub comets: Vec<BodyRow>,
    pub lunar_phase: LunarPhase,
    pub close_approaches: Vec<ApproachPair>,
    pub satellite_passes: Vec<SatellitePass>,
}
