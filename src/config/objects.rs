//! The objects document: extra cities, comets and satellites.
//!
//! Keys this crate does not know about are carried through load and save
//! untouched, so a refresh never drops user data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cities;
use crate::domain::{Catalog, CometSpec, Location, SatelliteSpec};
use crate::errors::{AppError, AppResult};
use crate::utils::num;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    /// Number or numeric string, degrees north
    pub latitude: Value,
    /// Number or numeric string, degrees east
    pub longitude: Value,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CityEntry {
    pub fn to_location(&self) -> AppResult<Location> {
        let coordinate = |v: &Value, what: &str, limit: f64| -> AppResult<f64> {
            num(v)
                .filter(|x| x.abs() <= limit)
                .ok_or_else(|| AppError::Config(format!("city {:?} has bad {what} {v}", self.name)))
        };
        Ok(Location {
            name: self.name.clone(),
            latitude: coordinate(&self.latitude, "latitude", 90.0)?,
            longitude: coordinate(&self.longitude, "longitude", 180.0)?,
            elevation_m: self.elevation,
            country: self.country.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CometEntry {
    pub name: String,
    /// Missing elements surface as an unavailable row for this comet only
    #[serde(default)]
    pub db_info: String,
    /// Where `refresh` looks for newer elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default = "default_true")]
    pub display: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteEntry {
    pub name: String,
    #[serde(default)]
    pub tle_line1: String,
    #[serde(default)]
    pub tle_line2: String,
    #[serde(default = "default_true")]
    pub display: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norad_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_city: Option<String>,
    #[serde(default)]
    pub cities: Vec<CityEntry>,
    #[serde(default)]
    pub comets: Vec<CometEntry>,
    #[serde(default)]
    pub satellites: Vec<SatelliteEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectsFile {
    /// Load the document; a missing file is an empty one
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            warn!("objects file {} not found, tracking standard bodies only", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let objects: Self = serde_json::from_str(&text)?;
        debug!(
            "loaded {} cities, {} comets, {} satellites from {}",
            objects.cities.len(),
            objects.comets.len(),
            objects.satellites.len(),
            path.display()
        );
        Ok(objects)
    }

    /// Write the document back, replacing the old file only once the new one
    /// is fully written
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, path)?;
        Ok(())
    }

    pub fn catalog(&self) -> Catalog {
        let comets = self
            .comets
            .iter()
            .map(|c| CometSpec {
                name: c.name.clone(),
                db_info: c.db_info.clone(),
                display: c.display,
            })
            .collect();
        let satellites = self
            .satellites
            .iter()
            .map(|s| SatelliteSpec {
                name: s.name.clone(),
                tle_line1: s.tle_line1.clone(),
                tle_line2: s.tle_line2.clone(),
                display: s.display,
            })
            .collect();
        Catalog::new(comets, satellites)
    }

    /// Observer site for `requested`, else the file's default city, else
    /// `fallback`. Cities listed in the file win over built-in ones.
    pub fn resolve_city(&self, requested: Option<&str>, fallback: &str) -> AppResult<Location> {
        let name = requested
            .or(self.default_city.as_deref())
            .unwrap_or(fallback)
            .trim();
        if let Some(entry) = self
            .cities
            .iter()
            .find(|c| c.name.trim().eq_ignore_ascii_case(name))
        {
            return entry.to_location();
        }
        cities::lookup(name).ok_or_else(|| AppError::UnknownCity(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObserverContext, PassOutcome, RowStatus, TrackedBody};
    use crate::ephemeris::satellite::tests::{ISS_LINE1, ISS_LINE2};
    use crate::ephemeris::Ephemeris;
    use crate::services::{PassSearchConfig, ReportAssembler};
    use chrono::{FixedOffset, TimeZone, Utc};

    const SAMPLE: &str = r#"{
        "default_city": "Home",
        "cities": [
            {"name": "Home", "latitude": "37.2358", "longitude": -121.9624, "elevation": 120, "country": "US"},
            {"name": "London", "latitude": 51.0, "longitude": 0.5}
        ],
        "comets": [
            {"name": "C/Pan-STARRS", "db_info": "C/Pan-STARRS,h,3/10.1691/2013,84.2072,65.6659,333.6512,1.000033,0.301546,2000,5.5,4", "source": "https://example.org/soft03.txt", "display": false, "note": "faded"}
        ],
        "satellites": [
            {"name": "ISS", "tle_line1": "1 x", "tle_line2": "2 x", "norad_id": 25544}
        ],
        "observer_notes": {"scope": "8in dob"}
    }"#;

    #[test]
    fn test_parse_sample_document() {
        let objects: ObjectsFile = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(objects.cities.len(), 2);
        assert!(!objects.comets[0].display);
        assert_eq!(objects.comets[0].extra["note"], "faded");
        assert!(objects.satellites[0].display);
        assert_eq!(objects.satellites[0].norad_id, Some(25544));
        assert!(objects.extra.contains_key("observer_notes"));
    }

    #[test]
    fn test_resolve_city_precedence() {
        let objects: ObjectsFile = serde_json::from_str(SAMPLE).unwrap();

        let home = objects.resolve_city(None, "Los Gatos").unwrap();
        assert_eq!(home.name, "Home");
        assert!((home.latitude - 37.2358).abs() < 1e-9);
        assert_eq!(home.elevation_m, 120.0);

        // the file's London shadows the built-in one
        let london = objects.resolve_city(Some("london"), "Los Gatos").unwrap();
        assert_eq!(london.latitude, 51.0);

        let tokyo = objects.resolve_city(Some("Tokyo"), "Los Gatos").unwrap();
        assert_eq!(tokyo.country.as_deref(), Some("JP"));

        let err = objects.resolve_city(Some("Atlantis"), "Los Gatos").unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_CITY");
    }

    #[test]
    fn test_fallback_city_without_default() {
        let objects = ObjectsFile::default();
        let city = objects.resolve_city(None, "Los Gatos").unwrap();
        assert_eq!(city.name, "Los Gatos");
    }

    #[test]
    fn test_bad_city_coordinates() {
        let objects: ObjectsFile = serde_json::from_str(
            r#"{"cities": [{"name": "Nowhere", "latitude": "north", "longitude": 0}]}"#,
        )
        .unwrap();
        let err = objects.resolve_city(Some("Nowhere"), "Los Gatos").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_catalog_from_objects() {
        let objects: ObjectsFile = serde_json::from_str(SAMPLE).unwrap();
        let catalog = objects.catalog();
        let comet = catalog
            .bodies()
            .iter()
            .find(|b| b.name() == "C/Pan-STARRS")
            .unwrap();
        assert!(matches!(comet, TrackedBody::Comet(c) if !c.display));
        assert_eq!(catalog.satellites().count(), 1);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.json");
        let mut objects: ObjectsFile = serde_json::from_str(SAMPLE).unwrap();
        objects.comets[0].db_info = "C/Pan-STARRS,p,3/10.1/2013,84.2,333.6,0.3015,65.6,2000,5.5,4".to_string();
        objects.save(&path).unwrap();

        let reloaded = ObjectsFile::load(&path).unwrap();
        assert_eq!(reloaded, objects);
        assert_eq!(reloaded.comets[0].extra["note"], "faded");
        assert_eq!(reloaded.extra["observer_notes"]["scope"], "8in dob");
        assert!(!dir.path().join("objects.json.tmp").exists());
    }

    #[test]
    fn test_entry_without_elements_only_fails_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.json");
        let document = serde_json::json!({
            "comets": [
                {"name": "C/NoElements", "display": true},
                {"name": "C/Pan-STARRS", "db_info": "C/Pan-STARRS,h,3/10.1691/2013,84.2072,65.6659,333.6512,1.000033,0.301546,2000,5.5,4"}
            ],
            "satellites": [
                {"name": "Half TLE", "tle_line1": ISS_LINE1},
                {"name": "ISS", "tle_line1": ISS_LINE1, "tle_line2": ISS_LINE2}
            ]
        });
        fs::write(&path, document.to_string()).unwrap();

        let objects = ObjectsFile::load(&path).unwrap();
        assert_eq!(objects.comets[0].db_info, "");
        assert_eq!(objects.satellites[0].tle_line2, "");

        let location = objects.resolve_city(Some("London"), "Los Gatos").unwrap();
        let instant = Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap();
        let ctx = ObserverContext::new(location, instant, FixedOffset::east_opt(3600).unwrap());
        let eph = Ephemeris::new(-6.0);
        let search = PassSearchConfig {
            horizon_hours: 24.0,
            step_seconds: 30,
            require_visible: false,
        };
        let report = ReportAssembler::new(&eph, search).assemble(&objects.catalog(), &ctx);

        assert_eq!(report.comets.len(), 2);
        match &report.comets[0].status {
            RowStatus::Unavailable(detail) => assert_eq!(detail.code, "INVALID_ELEMENTS"),
            other => panic!("expected an unavailable row, got {other:?}"),
        }
        assert!(report.comets[1].record().is_some());
        assert!(report.planets.iter().all(|r| r.record().is_some()));
        match &report.satellite_passes[0].outcome {
            PassOutcome::Unavailable(detail) => assert_eq!(detail.code, "INVALID_ELEMENTS"),
            other => panic!("expected an unavailable pass, got {other:?}"),
        }
        assert!(matches!(report.satellite_passes[1].outcome, PassOutcome::Found(_)));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let objects = ObjectsFile::load(&dir.path().join("absent.json")).unwrap();
        assert!(objects.comets.is_empty());
        assert_eq!(objects.catalog().bodies().len(), 11);
    }
}
