/// Personal ephemeris: what is up in the sky for one observer and moment
mod clients;
mod config;
mod domain;
mod ephemeris;
mod errors;
mod render;
mod services;
mod utils;

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::clients::ElementsClient;
use crate::config::{AppConfig, ObjectsFile};
use crate::domain::ObserverContext;
use crate::ephemeris::Ephemeris;
use crate::services::{ElementsRefresher, ReportAssembler};
use crate::utils::{offset_from_hours, parse_observation_time};

#[derive(Debug, Parser)]
#[command(name = "ephemeris", version, about = "Visibility report for the Sun, Moon, planets, comets and satellites")]
struct Cli {
    /// Observer city, from the objects file or the built-in list
    #[arg(short, long)]
    city: Option<String>,

    /// Local date and time, "YYYY/MM/DD HH:MM" (default: now)
    #[arg(short, long)]
    date: Option<String>,

    /// Observer offset from UTC in hours (default: this machine's zone)
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<f64>,

    /// Objects file (default: EPHEMERIS_OBJECTS_FILE or objects.json)
    #[arg(long)]
    objects: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the visibility report (default)
    Report,
    /// Download fresh comet elements and satellite TLEs into the objects file
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for the report
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env()?;
    let objects_path = cli.objects.clone().unwrap_or_else(|| config.objects_file.clone());
    let mut objects = ObjectsFile::load(&objects_path)?;
    info!("Configuration loaded from {}", objects_path.display());

    match cli.command {
        Some(Command::Refresh) => refresh(&config, &mut objects, &objects_path).await,
        Some(Command::Report) | None => report(&cli, &config, &objects),
    }
}

async fn refresh(
    config: &AppConfig,
    objects: &mut ObjectsFile,
    objects_path: &Path,
) -> anyhow::Result<()> {
    let client = ElementsClient::new(config.celestrak_url.clone(), config.http_timeout_seconds)?;
    let summary = ElementsRefresher::new(client).refresh(objects).await;

    if !summary.updated.is_empty() {
        objects.save(objects_path)?;
        info!("Wrote {}", objects_path.display());
    }
    for name in &summary.updated {
        println!("updated  {name}");
    }
    for (name, detail) in &summary.failed {
        println!("failed   {name}: {} ({})", detail.message, detail.code);
    }
    if summary.updated.is_empty() && summary.failed.is_empty() {
        println!("nothing to refresh: no comet has a source and no satellite a norad_id");
    }
    Ok(())
}

fn report(cli: &Cli, config: &AppConfig, objects: &ObjectsFile) -> anyhow::Result<()> {
    let location = objects.resolve_city(cli.city.as_deref(), &config.default_city)?;

    let fixed = cli.utc_offset.map(offset_from_hours).transpose()?;
    let instant = match (&cli.date, fixed) {
        (Some(date), Some(offset)) => parse_observation_time(date, &offset)?,
        (Some(date), None) => parse_observation_time(date, &Local)?,
        (None, _) => Utc::now(),
    };
    let offset = fixed.unwrap_or_else(|| local_offset(instant));
    let ctx = ObserverContext::new(location, instant, offset);
    info!("Observer {} at {}", ctx.location.name, ctx.local_time());

    let oracle = Ephemeris::new(config.twilight_altitude);
    let report = ReportAssembler::new(&oracle, config.pass_search).assemble(&objects.catalog(), &ctx);

    if cli.json {
        match render::render_json(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Could not serialize report: {}", e);
                return Err(e.into());
            }
        }
    } else {
        print!("{}", render::render_text(&report, config.approach_display_degrees));
    }
    Ok(())
}

fn local_offset(instant: DateTime<Utc>) -> FixedOffset {
    Local.offset_from_utc_datetime(&instant.naive_utc()).fix()
}
