/// Application configuration module
use std::env;
use std::path::PathBuf;

use crate::services::PassSearchConfig;

mod cities;
mod objects;

pub use objects::{CometEntry, ObjectsFile, SatelliteEntry};

pub const DEFAULT_CELESTRAK_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub objects_file: PathBuf,
    /// Used when neither the command line nor the objects file names a city
    pub default_city: String,
    pub pass_search: PassSearchConfig,
    /// Sun altitude (deg) below which satellites can be seen
    pub twilight_altitude: f64,
    /// Text output lists close approaches under this separation (deg)
    pub approach_display_degrees: f64,
    pub celestrak_url: String,
    pub http_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let objects_file = lookup("EPHEMERIS_OBJECTS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("objects.json"));

        let default_city =
            lookup("EPHEMERIS_DEFAULT_CITY").unwrap_or_else(|| "Los Gatos".to_string());

        let pass_search = PassSearchConfig {
            horizon_hours: env_f64(&lookup, "PASS_SEARCH_HOURS", 168.0),
            step_seconds: env_u64(&lookup, "PASS_STEP_SECONDS", 20),
            require_visible: env_bool(&lookup, "PASS_REQUIRE_VISIBLE", true),
        };
        anyhow::ensure!(
            pass_search.step_seconds > 0,
            "PASS_STEP_SECONDS must be positive"
        );
        anyhow::ensure!(
            pass_search.horizon_hours > 0.0,
            "PASS_SEARCH_HOURS must be positive"
        );

        let celestrak_url =
            lookup("CELESTRAK_URL").unwrap_or_else(|| DEFAULT_CELESTRAK_URL.to_string());

        Ok(Self {
            objects_file,
            default_city,
            pass_search,
            twilight_altitude: env_f64(&lookup, "TWILIGHT_SUN_ALTITUDE", -6.0),
            approach_display_degrees: env_f64(&lookup, "APPROACH_DISPLAY_DEGREES", 15.0),
            celestrak_url,
            http_timeout_seconds: env_u64(&lookup, "HTTP_TIMEOUT_SECONDS", 30),
        })
    }
}

fn env_u64<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_f64<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .filter(|x: &f64| x.is_finite())
        .unwrap_or(default)
}

fn env_bool<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: bool) -> bool {
    match lookup(key).map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) if matches!(s.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(s) if matches!(s.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
