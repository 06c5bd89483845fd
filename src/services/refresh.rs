use std::collections::HashMap;

use tracing::{info, warn};

use crate::clients::ElementsClient;
use crate::config::{CometEntry, ObjectsFile, SatelliteEntry};
use crate::domain::SatelliteSpec;
use crate::ephemeris::satellite::SatelliteOrbit;
use crate::ephemeris::xephem;
use crate::errors::{AppError, AppResult, ErrorDetail};

/// What a refresh run changed
#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub updated: Vec<String>,
    pub failed: Vec<(String, ErrorDetail)>,
}

/// Pulls fresh comet elements and satellite TLEs into the objects document
pub struct ElementsRefresher {
    client: ElementsClient,
}

impl ElementsRefresher {
    pub fn new(client: ElementsClient) -> Self {
        Self { client }
    }

    /// Refresh every comet with a `source` and every satellite with a
    /// `norad_id`. A failed object keeps its old elements.
    pub async fn refresh(&self, objects: &mut ObjectsFile) -> RefreshSummary {
        let mut summary = RefreshSummary::default();
        // several comets usually share one element file
        let mut documents: HashMap<String, String> = HashMap::new();

        for comet in objects.comets.iter_mut() {
            let Some(source) = comet.source.clone() else {
                continue;
            };
            let result = self.refresh_comet(comet, &source, &mut documents).await;
            record(&mut summary, &comet.name, result);
        }

        info!("requesting TLEs from {}", self.client.celestrak_url());
        for satellite in objects.satellites.iter_mut() {
            let Some(norad_id) = satellite.norad_id else {
                continue;
            };
            let result = self.refresh_satellite(satellite, norad_id).await;
            record(&mut summary, &satellite.name, result);
        }

        summary
    }

    async fn refresh_comet(
        &self,
        comet: &mut CometEntry,
        source: &str,
        documents: &mut HashMap<String, String>,
    ) -> AppResult<()> {
        if !documents.contains_key(source) {
            let text = self.client.fetch_text(source).await?;
            documents.insert(source.to_string(), text);
        }
        let text = documents
            .get(source)
            .map(String::as_str)
            .unwrap_or_default();
        let line = find_xephem_line(text, &comet.name).ok_or_else(|| {
            AppError::InvalidInput(format!("{} is not listed in {source}", comet.name))
        })?;
        xephem::parse(line).map_err(|e| AppError::invalid_elements(&comet.name, e.to_string()))?;
        comet.db_info = line.to_string();
        Ok(())
    }

    async fn refresh_satellite(&self, satellite: &mut SatelliteEntry, norad_id: u32) -> AppResult<()> {
        let text = self.client.fetch_tle(norad_id).await?;
        let (line1, line2) = parse_tle_response(&text).ok_or_else(|| {
            AppError::InvalidInput(format!("no TLE for NORAD {norad_id} in response"))
        })?;
        let spec = SatelliteSpec {
            name: satellite.name.clone(),
            tle_line1: line1.to_string(),
            tle_line2: line2.to_string(),
            display: satellite.display,
        };
        SatelliteOrbit::from_spec(&spec)?;
        satellite.tle_line1 = spec.tle_line1;
        satellite.tle_line2 = spec.tle_line2;
        Ok(())
    }
}

fn record(summary: &mut RefreshSummary, name: &str, result: AppResult<()>) {
    match result {
        Ok(()) => {
            info!("refreshed elements for {}", name);
            summary.updated.push(name.to_string());
        }
        Err(e) => {
            warn!("could not refresh {}: {}", name, e);
            summary.failed.push((name.to_string(), e.detail()));
        }
    }
}

/// XEphem line for `name` in an element file. Comment lines start with `#`
/// and the name is the first field, up to any `|` alias.
pub fn find_xephem_line<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let name = name.trim();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find(|line| {
            line.split(',')
                .next()
                .and_then(|field| field.split('|').next())
                .map_or(false, |field| field.trim().eq_ignore_ascii_case(name))
        })
}

/// First `1 `/`2 ` line pair in a TLE response, with or without a name line
pub fn parse_tle_response(text: &str) -> Option<(&str, &str)> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    lines
        .windows(2)
        .find(|pair| pair[0].starts_with("1 ") && pair[1].starts_with("2 "))
        .map(|pair| (pair[0], pair[1]))
}
