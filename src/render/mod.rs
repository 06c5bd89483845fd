/// Text and JSON presentation of a report
use std::fmt::{self, Write};

use chrono::{DateTime, Duration, DurationRound, FixedOffset, TimeZone, Timelike, Utc};

use crate::domain::{
    ApproachPair, BodyRow, LunarPhase, ObservationRecord, PassOutcome, PassPoint, PhaseTimeline,
    Report, RowStatus, SatellitePass,
};
use crate::errors::AppResult;

const RULE: &str =
    "-------------------+-----+--------+--------+-------------+-------------+-------+--------+--------+";
const PASS_RULE: &str = "-------------+--------+-------------+--------+-------------+--------+";
const NO_TIME: &str = "    ---    ";

/// `ddd:mm`, rounded to the arc-minute
pub fn fmt_angle(degrees: f64) -> String {
    let total = (degrees.abs() * 60.0).round() as i64;
    let sign = if degrees < 0.0 && total > 0 { "-" } else { "" };
    format!("{:>3}:{:02}", format!("{sign}{}", total / 60), total % 60)
}

/// Right ascension as `hhHmmm`, rounded to the minute of time
pub fn fmt_ra(degrees: f64) -> String {
    let total = (degrees.rem_euclid(360.0) / 15.0 * 60.0).round() as i64;
    format!("{:2}h{:02}m", (total / 60) % 24, total % 60)
}

fn fmt_short<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    t.format("%m/%d %H:%M").to_string()
}

fn fmt_full(t: &DateTime<FixedOffset>) -> String {
    t.format("%m/%d/%Y %H:%M:%S").to_string()
}

/// UT with tenths of a second
fn fmt_ut(t: &DateTime<Utc>) -> String {
    let t = t.duration_round(Duration::milliseconds(100)).unwrap_or(*t);
    let seconds = t.second() as f64 + t.nanosecond() as f64 / 1e9;
    format!("{}{:04.1}", t.format("%m/%d/%Y %H:%M:"), seconds)
}

pub fn render_json(report: &Report) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Fixed-width tables. Close approaches are listed when under
/// `approach_threshold_deg`.
pub fn render_text(report: &Report, approach_threshold_deg: f64) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails
    let _ = write_report(&mut out, report, approach_threshold_deg);
    out
}

fn write_report(out: &mut String, report: &Report, threshold: f64) -> fmt::Result {
    let offset = *report.observer.local.offset();
    writeln!(
        out,
        "***** Currently at {} ({}) *****",
        report.observer.site.name,
        fmt_full(&report.observer.local)
    )?;

    writeln!(out, "\n*** Sun and Moon ***")?;
    write_table(out, "BODY", &report.sun_and_moon, &offset)?;

    writeln!(out, "\n*** Lunar Phase information: ***")?;
    match &report.lunar_phase {
        LunarPhase::Available(timeline) => write_phases(out, timeline)?,
        LunarPhase::Unavailable(detail) => {
            writeln!(out, "Lunar phase unavailable: {} ({})", detail.message, detail.code)?
        }
    }

    writeln!(out, "\n*** Planets ***")?;
    write_table(out, "BODY", &report.planets, &offset)?;

    write_approaches(out, &report.close_approaches, threshold)?;

    writeln!(out, "\n*** Special Objects ***")?;
    if !report.comets.is_empty() {
        write_table(out, "COMET", &report.comets, &offset)?;
    }
    for pass in &report.satellite_passes {
        write_pass(out, pass, &offset)?;
    }
    Ok(())
}

fn write_table(
    out: &mut String,
    title: &str,
    rows: &[BodyRow],
    offset: &FixedOffset,
) -> fmt::Result {
    writeln!(
        out,
        "{:^19}| VIS |   ALT  |   AZ   |    RISE     |     SET     |  MAG  |   RA   |   DEC  |",
        title
    )?;
    writeln!(out, "{RULE}")?;
    for row in rows {
        match &row.status {
            RowStatus::Observed(record) => write_row(out, &row.name, record, offset)?,
            RowStatus::Unavailable(detail) => {
                writeln!(out, "{:.<19.19}| --- | unavailable: {}", row.name, detail.code)?
            }
        }
    }
    writeln!(out, "{RULE}")
}

fn write_row(
    out: &mut String,
    name: &str,
    record: &ObservationRecord,
    offset: &FixedOffset,
) -> fmt::Result {
    let local = |t: &Option<DateTime<Utc>>| t.map(|t| fmt_short(&t.with_timezone(offset)));
    if record.visible {
        let rise = local(&record.rise).unwrap_or_else(|| "already up ".to_string());
        let set = local(&record.set).unwrap_or_else(|| "doesn't set".to_string());
        let magnitude = record
            .magnitude
            .map_or_else(|| "  ---".to_string(), |m| format!("{m:5.1}"));
        writeln!(
            out,
            "{:.<19.19}| Yes | {} | {} | {} | {} | {} | {} | {} |",
            name,
            fmt_angle(record.altitude),
            fmt_angle(record.azimuth),
            rise,
            set,
            magnitude,
            fmt_ra(record.right_ascension),
            fmt_angle(record.declination)
        )
    } else {
        let rise = local(&record.rise).unwrap_or_else(|| NO_TIME.to_string());
        let set = local(&record.set).unwrap_or_else(|| NO_TIME.to_string());
        writeln!(
            out,
            "{:.<19.19}| No  |   ---  |   ---  | {} | {} |  ---  |  ----  |  ----  |",
            name, rise, set
        )
    }
}

fn write_phases(out: &mut String, timeline: &PhaseTimeline) -> fmt::Result {
    writeln!(
        out,
        "Current lunar illumination is {:0.1}%, lunation is {:0.4}",
        timeline.illumination * 100.0,
        timeline.lunation
    )?;
    writeln!(
        out,
        "Was just {} at {} UT",
        timeline.most_recent.kind.label(),
        fmt_ut(&timeline.most_recent.utc)
    )?;
    for event in &timeline.upcoming {
        writeln!(
            out,
            "{:<13}: {} UT ({} Local time)",
            event.kind.label(),
            fmt_ut(&event.utc),
            fmt_full(&event.local)
        )?;
    }
    Ok(())
}

fn write_approaches(out: &mut String, pairs: &[ApproachPair], threshold: f64) -> fmt::Result {
    let mut close = pairs.iter().filter(|p| p.separation_deg < threshold).peekable();
    if close.peek().is_some() {
        writeln!(out, "\n*** Close Approaches (may not be visible) ***")?;
    }
    for pair in close {
        writeln!(
            out,
            "{:7} to {:7} = {:3}:{:02} (dd:mm)",
            pair.first, pair.second, pair.degrees, pair.arcminutes
        )?;
    }
    Ok(())
}

fn write_pass(out: &mut String, pass: &SatellitePass, offset: &FixedOffset) -> fmt::Result {
    match &pass.outcome {
        PassOutcome::Found(window) => {
            let cell = |p: &PassPoint| fmt_short(&p.at.with_timezone(offset));
            writeln!(out, "\n{} visibility -- Next Pass ", pass.name)?;
            writeln!(out, "   RISE @        AZ      MAX ALT @      AZ        SET @        AZ")?;
            writeln!(out, "{PASS_RULE}")?;
            writeln!(
                out,
                " {} | {} | {} | {} | {} | {} |",
                cell(&window.rise),
                fmt_angle(window.rise.azimuth),
                cell(&window.peak),
                fmt_angle(window.peak.altitude),
                cell(&window.set),
                fmt_angle(window.set.azimuth)
            )?;
            writeln!(out, "{PASS_RULE}")
        }
        PassOutcome::NotFound { searched_hours } => writeln!(
            out,
            "\n{} has no visible pass in the next {:.0} hours",
            pass.name, searched_hours
        ),
        PassOutcome::Unavailable(detail) => writeln!(
            out,
            "\n{} always below your horizon (check orbital elements): {}",
            pass.name, detail.message
        ),
    }
}
