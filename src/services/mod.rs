/// Report computation services layer
use tracing::{debug, info, warn};

use crate::domain::{
    Catalog, LunarPhase, ObserverContext, ObserverSummary, Report, SatellitePass, TrackedBody,
};
use crate::ephemeris::EphemerisOracle;

mod approach;
mod passes;
mod phase;
mod refresh;
mod visibility;

pub use approach::{BodyPosition, CloseApproachAnalyzer};
pub use passes::{PassSearchConfig, SatellitePassPredictor};
pub use phase::LunarPhaseTracker;
pub use refresh::{ElementsRefresher, RefreshSummary};

/// Runs every analysis for one observer and instant and groups the results
pub struct ReportAssembler<'a, O: ?Sized> {
    oracle: &'a O,
    pass_search: PassSearchConfig,
}

impl<'a, O> ReportAssembler<'a, O>
where
    O: EphemerisOracle + ?Sized,
{
    pub fn new(oracle: &'a O, pass_search: PassSearchConfig) -> Self {
        Self {
            oracle,
            pass_search,
        }
    }

    pub fn assemble(&self, catalog: &Catalog, ctx: &ObserverContext) -> Report {
        info!(
            "computing report for {} at {}",
            ctx.location.name, ctx.instant
        );
        let predictor = SatellitePassPredictor::new(self.oracle, self.pass_search);

        let mut sun_and_moon = Vec::new();
        let mut planets = Vec::new();
        let mut comets = Vec::new();
        let mut positions = Vec::new();

        for body in catalog.bodies() {
            if matches!(body, TrackedBody::Satellite(_)) {
                continue;
            }
            if body.is_displayed() {
                let row = visibility::build_row(self.oracle, body, ctx);
                if let Some(record) = row.record() {
                    positions.push(BodyPosition {
                        name: row.name.clone(),
                        right_ascension: record.right_ascension,
                        declination: record.declination,
                    });
                }
                match body {
                    TrackedBody::Standard(b) if b.is_planet() => planets.push(row),
                    TrackedBody::Standard(_) => sun_and_moon.push(row),
                    _ => comets.push(row),
                }
            } else if body.joins_close_approaches() {
                match self.oracle.observe(body, &ctx.location, ctx.instant) {
                    Ok(place) => positions.push(BodyPosition {
                        name: body.name().to_string(),
                        right_ascension: place.right_ascension,
                        declination: place.declination,
                    }),
                    Err(e) => warn!("{} left out of close approaches: {}", body.name(), e),
                }
            }
        }

        let satellite_passes: Vec<SatellitePass> = catalog
            .satellites()
            .filter(|spec| spec.display)
            .map(|spec| SatellitePass {
                name: spec.name.clone(),
                outcome: predictor.predict(spec, ctx),
            })
            .collect();

        let close_approaches = CloseApproachAnalyzer.analyze(&positions);
        debug!(
            "{} close-approach pairs from {} positions",
            close_approaches.len(),
            positions.len()
        );

        let lunar_phase = match LunarPhaseTracker::new(self.oracle).timeline(ctx) {
            Ok(timeline) => LunarPhase::Available(timeline),
            Err(e) => {
                warn!("lunar phase unavailable: {}", e);
                LunarPhase::Unavailable(e.detail())
            }
        };

        info!(
            "report ready: {} rows, {} satellite passes",
            sun_and_moon.len() + planets.len() + comets.len(),
            satellite_passes.len()
        );
        Report {
            observer: ObserverSummary {
                site: ctx.location.clone(),
                utc: ctx.instant,
                local: ctx.local_time(),
            },
            sun_and_moon,
            planets,
            comets,
            lunar_phase,
            close_approaches,
            satellite_passes,
        }
    }
}
