//! Project command: linear-trend extrapolation with scenario scaling.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use fi_core::dataset::{Dataset, SeriesQuery};
use fi_core::record::Gender;
use fi_core::trend::{
    self, ACCESS_TARGET_PCT, LinearFit, NFIS_TARGET_PCT, ProjectionPoint, Scenario,
};

/// Computed projection report.
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub indicator_code: String,
    pub indicator_name: Option<String>,
    pub scenario: Scenario,
    pub fit: LinearFit,
    pub latest_date: NaiveDate,
    pub latest_value: f64,
    pub points: Vec<ProjectionPoint>,
    pub milestones: Vec<Milestone>,
}

/// Whether and when a projected value reaches a target.
#[derive(Debug, Serialize)]
pub struct Milestone {
    pub target_pct: f64,
    pub reached_in: Option<i32>,
}

/// Builds the projection report for one indicator.
pub fn build_report(
    dataset: &Dataset,
    indicator_code: &str,
    gender: Option<Gender>,
    location: Option<&str>,
    scenario: Scenario,
    horizon: usize,
) -> Result<ProjectReport> {
    let series = dataset.series(&SeriesQuery {
        indicator_code,
        gender,
        location,
    });

    let Some(latest) = series.last().copied() else {
        bail!("no dated observations for {indicator_code} on the selected axes");
    };
    let Some(projection) = trend::project(&series, scenario, horizon) else {
        bail!(
            "cannot fit a trend for {indicator_code}: need at least two dated observations \
             with distinct dates on the selected axes"
        );
    };
    let milestones = [ACCESS_TARGET_PCT, NFIS_TARGET_PCT]
        .into_iter()
        .map(|target_pct| Milestone {
            target_pct,
            reached_in: projection.milestone_year(target_pct),
        })
        .collect();

    Ok(ProjectReport {
        indicator_code: indicator_code.to_string(),
        indicator_name: dataset.indicator_name(indicator_code).map(String::from),
        scenario,
        fit: projection.fit,
        latest_date: latest.date,
        latest_value: latest.value,
        points: projection.points,
        milestones,
    })
}

/// Formats the human-readable projection report.
#[must_use]
pub fn format_report(report: &ProjectReport) -> String {
    let mut output = String::new();

    let name = report
        .indicator_name
        .as_deref()
        .unwrap_or(&report.indicator_code);
    writeln!(
        output,
        "PROJECTION: {name} ({}), {} scenario",
        report.indicator_code, report.scenario
    )
    .unwrap();
    writeln!(
        output,
        "Latest observation: {} at {:.1}",
        report.latest_date, report.latest_value
    )
    .unwrap();
    writeln!(
        output,
        "Trend: {:+.2} per year (intercept {:.2})",
        report.fit.slope, report.fit.intercept
    )
    .unwrap();

    writeln!(output).unwrap();
    writeln!(output, "YEAR    TREND  PROJECTED       95% BAND").unwrap();
    writeln!(output, "────────────────────────────────────────").unwrap();
    for point in &report.points {
        writeln!(
            output,
            "{}  {:7.1}  {:9.1}  {:6.1} to {:5.1}",
            point.year, point.trend, point.projected, point.lower, point.upper
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "MILESTONES").unwrap();
    writeln!(output, "──────────").unwrap();
    for milestone in &report.milestones {
        match milestone.reached_in {
            Some(year) => writeln!(
                output,
                "{:.0}% target: reached in {year}",
                milestone.target_pct
            )
            .unwrap(),
            None => writeln!(
                output,
                "{:.0}% target: beyond this horizon",
                milestone.target_pct
            )
            .unwrap(),
        }
    }

    output
}

/// Runs the project command.
#[expect(
    clippy::too_many_arguments,
    reason = "one argument per CLI flag, matching the dispatch site"
)]
pub fn run<W: Write>(
    out: &mut W,
    dataset: &Dataset,
    indicator_code: &str,
    gender: Option<Gender>,
    location: Option<&str>,
    scenario: Scenario,
    horizon: usize,
    json: bool,
) -> Result<()> {
    let report = build_report(dataset, indicator_code, gender, location, scenario, horizon)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }

    Ok(())
}
