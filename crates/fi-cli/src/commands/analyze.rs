//! Analyze command: growth, gender gap, and correlations for one indicator.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use fi_core::dataset::{Dataset, SeriesQuery};
use fi_core::record::Gender;
use fi_core::stats::{self, GrowthSegment};

/// Correlation strength below which pairings are not reported.
const CORRELATION_THRESHOLD: f64 = 0.5;

/// Computed analysis report.
#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub indicator_code: String,
    pub indicator_name: Option<String>,
    pub observations: usize,
    pub growth: Vec<GrowthSegment>,
    pub gender_gap: Vec<GenderGapRow>,
    pub correlations: Vec<CorrelationEntry>,
}

/// Male and female values of the indicator on one shared date.
#[derive(Debug, Serialize)]
pub struct GenderGapRow {
    pub date: NaiveDate,
    pub male: f64,
    pub female: f64,
    /// Male minus female, in percentage points.
    pub gap_pp: f64,
}

#[derive(Debug, Serialize)]
pub struct CorrelationEntry {
    pub indicator_code: String,
    pub r: f64,
}

/// Builds the analysis report for one indicator.
#[must_use]
pub fn build_report(
    dataset: &Dataset,
    indicator_code: &str,
    gender: Option<Gender>,
    location: Option<&str>,
) -> AnalyzeReport {
    let series = dataset.series(&SeriesQuery {
        indicator_code,
        gender,
        location,
    });

    // The gap compares the male and female disaggregations on the same
    // location axis, whatever gender the main series was filtered on.
    let male = dataset.series(&SeriesQuery {
        indicator_code,
        gender: Some(Gender::Male),
        location,
    });
    let female = dataset.series(&SeriesQuery {
        indicator_code,
        gender: Some(Gender::Female),
        location,
    });
    let gender_gap = male
        .iter()
        .filter_map(|m| {
            let f = female.iter().find(|f| f.date == m.date)?;
            Some(GenderGapRow {
                date: m.date,
                male: m.value,
                female: f.value,
                gap_pp: m.value - f.value,
            })
        })
        .collect();

    let matrix = stats::correlation_matrix(&dataset.indicator_date_means());
    let correlations = matrix
        .strong_with(indicator_code, CORRELATION_THRESHOLD)
        .into_iter()
        .map(|(code, r)| CorrelationEntry {
            indicator_code: code,
            r,
        })
        .collect();

    AnalyzeReport {
        indicator_code: indicator_code.to_string(),
        indicator_name: dataset.indicator_name(indicator_code).map(String::from),
        observations: series.len(),
        growth: stats::growth_segments(&series),
        gender_gap,
        correlations,
    }
}

/// Formats the human-readable analysis report.
#[must_use]
pub fn format_report(report: &AnalyzeReport) -> String {
    let mut output = String::new();

    let name = report
        .indicator_name
        .as_deref()
        .unwrap_or(&report.indicator_code);
    writeln!(output, "ANALYSIS: {name} ({})", report.indicator_code).unwrap();
    writeln!(output, "Observations in series: {}", report.observations).unwrap();

    writeln!(output).unwrap();
    writeln!(output, "GROWTH").unwrap();
    writeln!(output, "──────").unwrap();
    if report.growth.is_empty() {
        writeln!(output, "Fewer than two dated observations; nothing to compare.").unwrap();
    }
    for segment in &report.growth {
        let relative = segment
            .relative_pct
            .map_or_else(|| "   n/a".to_string(), |pct| format!("{pct:+6.1}%"));
        writeln!(
            output,
            "{} to {}  {:+6.1}pp  {relative}  {:+5.2}pp/year over {:.1} years",
            segment.from, segment.to, segment.absolute_pp, segment.annual_pp, segment.years
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "GENDER GAP").unwrap();
    writeln!(output, "──────────").unwrap();
    if report.gender_gap.is_empty() {
        writeln!(output, "No gender-disaggregated observations on shared dates.").unwrap();
    }
    for row in &report.gender_gap {
        writeln!(
            output,
            "{}  male {:5.1}  female {:5.1}  gap {:+5.1}pp",
            row.date, row.male, row.female, row.gap_pp
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "CORRELATIONS (|r| > {CORRELATION_THRESHOLD})").unwrap();
    writeln!(output, "────────────────────────").unwrap();
    if report.correlations.is_empty() {
        writeln!(output, "No strongly correlated indicators.").unwrap();
    }
    for entry in &report.correlations {
        writeln!(output, "{:<28}{:+5.2}", entry.indicator_code, entry.r).unwrap();
    }

    output
}

/// Runs the analyze command.
pub fn run<W: Write>(
    out: &mut W,
    dataset: &Dataset,
    indicator_code: &str,
    gender: Option<Gender>,
    location: Option<&str>,
    json: bool,
) -> Result<()> {
    let report = build_report(dataset, indicator_code, gender, location);

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }

    Ok(())
}
