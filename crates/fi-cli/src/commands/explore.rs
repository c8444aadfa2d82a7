//! Explore command: descriptive report over the whole record table.
//!
//! Mirrors the dataset owner's exploration checklist: distributions by
//! record type, pillar, source, and confidence; temporal coverage; the
//! events catalog; and the impact-link join including the enrichment
//! backlog (events no impact link references yet).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use fi_core::stats;
use fi_core::{Dataset, Record, RecordType, value_counts};

/// Computed exploration report.
#[derive(Debug, Serialize)]
pub struct ExploreReport {
    pub total_records: usize,
    pub observation_count: usize,
    pub event_count: usize,
    pub impact_link_count: usize,
    pub date_range: Option<DateRange>,
    pub record_types: Vec<CountEntry>,
    pub pillars_by_type: Vec<PillarBreakdown>,
    pub source_types: Vec<CountEntry>,
    pub confidence: Vec<CountEntry>,
    pub indicators: Vec<IndicatorCoverage>,
    pub sparse_indicators: Vec<IndicatorCoverage>,
    pub events: Vec<EventEntry>,
    pub events_by_category: Vec<CountEntry>,
    pub impact_links: ImpactBreakdown,
    pub events_without_impacts: Vec<EventEntry>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub span_days: i64,
}

#[derive(Debug, Serialize)]
pub struct CountEntry {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PillarBreakdown {
    pub record_type: String,
    pub pillars: Vec<CountEntry>,
}

#[derive(Debug, Serialize)]
pub struct IndicatorCoverage {
    pub code: String,
    pub observations: usize,
    /// Years with at least one observation.
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct EventEntry {
    pub record_id: String,
    pub date: Option<NaiveDate>,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ImpactBreakdown {
    pub total: usize,
    pub links: Vec<ImpactLinkEntry>,
    pub by_pillar: Vec<CountEntry>,
    pub by_direction: Vec<CountEntry>,
    pub by_magnitude: Vec<CountEntry>,
}

/// One impact link, joined to its parent event's name when it resolves.
#[derive(Debug, Serialize)]
pub struct ImpactLinkEntry {
    pub record_id: String,
    pub indicator_code: Option<String>,
    pub direction: Option<String>,
    pub magnitude: Option<String>,
    pub event: Option<String>,
}

fn count_entries(values: impl Iterator<Item = String>) -> Vec<CountEntry> {
    let owned: Vec<String> = values.collect();
    value_counts(owned.iter().map(String::as_str))
        .into_iter()
        .map(|(value, count)| CountEntry { value, count })
        .collect()
}

fn event_entry(record: &Record) -> EventEntry {
    EventEntry {
        record_id: record.record_id.clone(),
        date: record.observation_date,
        name: record
            .indicator
            .clone()
            .unwrap_or_else(|| "(unnamed)".to_string()),
        category: record
            .category
            .clone()
            .unwrap_or_else(|| "(uncategorized)".to_string()),
    }
}

/// Builds the exploration report from the dataset.
#[must_use]
pub fn build_report(dataset: &Dataset) -> ExploreReport {
    let date_range = dataset
        .observation_date_range()
        .map(|(start, end)| DateRange {
            start,
            end,
            span_days: (end - start).num_days(),
        });

    let pillars_by_type = [
        RecordType::Observation,
        RecordType::Event,
        RecordType::ImpactLink,
    ]
    .into_iter()
    .map(|record_type| PillarBreakdown {
        record_type: record_type.as_str().to_string(),
        pillars: count_entries(
            dataset
                .of_type(record_type)
                .filter_map(|r| r.pillar.clone()),
        ),
    })
    .filter(|breakdown| !breakdown.pillars.is_empty())
    .collect();

    let mut indicator_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in dataset.observations() {
        if let Some(code) = record.indicator_code.as_deref() {
            *indicator_counts.entry(code).or_insert(0) += 1;
        }
    }

    // Coverage rows come back in the same sorted indicator order.
    let coverage = stats::coverage(dataset);
    let observed_years = |code: &str| -> Vec<i32> {
        coverage
            .indicators
            .binary_search_by(|c| c.as_str().cmp(code))
            .map(|i| {
                coverage
                    .years
                    .iter()
                    .zip(&coverage.present[i])
                    .filter_map(|(&year, &present)| present.then_some(year))
                    .collect()
            })
            .unwrap_or_default()
    };

    let indicators = coverage
        .indicators
        .iter()
        .map(|code| IndicatorCoverage {
            code: code.clone(),
            observations: indicator_counts.get(code.as_str()).copied().unwrap_or(0),
            years: observed_years(code),
        })
        .collect();

    let sparse_indicators = stats::sparse_indicators(dataset, 2)
        .into_iter()
        .map(|(code, observations)| IndicatorCoverage {
            years: observed_years(&code),
            code,
            observations,
        })
        .collect();

    ExploreReport {
        total_records: dataset.len(),
        observation_count: dataset.observations().count(),
        event_count: dataset.events().count(),
        impact_link_count: dataset.impact_links().count(),
        date_range,
        record_types: count_entries(
            dataset
                .records()
                .iter()
                .map(|r| r.record_type.as_str().to_string()),
        ),
        pillars_by_type,
        source_types: count_entries(
            dataset
                .records()
                .iter()
                .filter_map(|r| r.source_type.clone()),
        ),
        confidence: count_entries(
            dataset
                .records()
                .iter()
                .filter_map(|r| r.confidence.map(|c| c.as_str().to_string())),
        ),
        indicators,
        sparse_indicators,
        events: dataset.events_by_date().into_iter().map(event_entry).collect(),
        events_by_category: count_entries(dataset.events().filter_map(|r| r.category.clone())),
        impact_links: ImpactBreakdown {
            total: dataset.impact_links().count(),
            links: dataset
                .impacts_with_events()
                .into_iter()
                .map(|joined| ImpactLinkEntry {
                    record_id: joined.impact.record_id.clone(),
                    indicator_code: joined.impact.indicator_code.clone(),
                    direction: joined
                        .impact
                        .impact_direction
                        .map(|d| d.as_str().to_string()),
                    magnitude: joined
                        .impact
                        .impact_magnitude
                        .map(|m| m.as_str().to_string()),
                    event: joined.event.and_then(|e| e.indicator.clone()),
                })
                .collect(),
            by_pillar: count_entries(dataset.impact_links().filter_map(|r| r.pillar.clone())),
            by_direction: count_entries(
                dataset
                    .impact_links()
                    .filter_map(|r| r.impact_direction.map(|d| d.as_str().to_string())),
            ),
            by_magnitude: count_entries(
                dataset
                    .impact_links()
                    .filter_map(|r| r.impact_magnitude.map(|m| m.as_str().to_string())),
            ),
        },
        events_without_impacts: dataset
            .events_without_impacts()
            .into_iter()
            .map(event_entry)
            .collect(),
    }
}

fn write_section(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

fn write_counts(output: &mut String, entries: &[CountEntry]) {
    for entry in entries {
        writeln!(output, "{:<28}{:>6}", entry.value, entry.count).unwrap();
    }
}

fn format_event_line(event: &EventEntry) -> String {
    let date = event
        .date
        .map_or_else(|| "(undated)".to_string(), |d| d.to_string());
    format!(
        "{date}  {:<10}{} ({})",
        event.record_id, event.name, event.category
    )
}

/// Formats the human-readable exploration report.
#[must_use]
pub fn format_report(report: &ExploreReport) -> String {
    let mut output = String::new();

    writeln!(output, "DATASET EXPLORATION").unwrap();
    writeln!(output, "───────────────────").unwrap();
    writeln!(
        output,
        "Records: {} ({} observations, {} events, {} impact links)",
        report.total_records,
        report.observation_count,
        report.event_count,
        report.impact_link_count
    )
    .unwrap();
    match &report.date_range {
        Some(range) => writeln!(
            output,
            "Observation dates: {} to {} ({} days)",
            range.start, range.end, range.span_days
        )
        .unwrap(),
        None => writeln!(output, "Observation dates: none").unwrap(),
    }

    write_section(&mut output, "RECORD TYPES");
    write_counts(&mut output, &report.record_types);

    if !report.pillars_by_type.is_empty() {
        write_section(&mut output, "PILLARS");
        for breakdown in &report.pillars_by_type {
            writeln!(output, "{}:", breakdown.record_type).unwrap();
            for entry in &breakdown.pillars {
                writeln!(output, "  {:<26}{:>6}", entry.value, entry.count).unwrap();
            }
        }
    }

    if !report.source_types.is_empty() {
        write_section(&mut output, "SOURCE TYPES");
        write_counts(&mut output, &report.source_types);
    }

    if !report.confidence.is_empty() {
        write_section(&mut output, "CONFIDENCE");
        write_counts(&mut output, &report.confidence);
    }

    write_section(&mut output, "INDICATORS");
    if report.indicators.is_empty() {
        writeln!(output, "(no observations)").unwrap();
    }
    for indicator in &report.indicators {
        let years = indicator
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            output,
            "{:<28}{:>3} observations  [{years}]",
            indicator.code, indicator.observations
        )
        .unwrap();
    }
    if !report.sparse_indicators.is_empty() {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Sparse coverage ({} indicators with <= 2 observations):",
            report.sparse_indicators.len()
        )
        .unwrap();
        for indicator in &report.sparse_indicators {
            writeln!(
                output,
                "  {:<26}{:>6} observations",
                indicator.code, indicator.observations
            )
            .unwrap();
        }
    }

    write_section(&mut output, "EVENTS");
    if report.events.is_empty() {
        writeln!(output, "(no events cataloged)").unwrap();
    }
    for event in &report.events {
        writeln!(output, "{}", format_event_line(event)).unwrap();
    }
    if !report.events_by_category.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "By category:").unwrap();
        for entry in &report.events_by_category {
            writeln!(output, "  {:<26}{:>6}", entry.value, entry.count).unwrap();
        }
    }

    write_section(&mut output, "IMPACT LINKS");
    writeln!(output, "Total: {}", report.impact_links.total).unwrap();
    if report.impact_links.total == 0 {
        writeln!(output, "No impact links found; add them during enrichment.").unwrap();
    } else {
        for link in &report.impact_links.links {
            writeln!(
                output,
                "{}  {} {}/{} from {}",
                link.record_id,
                link.indicator_code.as_deref().unwrap_or("(no indicator)"),
                link.direction.as_deref().unwrap_or("?"),
                link.magnitude.as_deref().unwrap_or("?"),
                link.event.as_deref().unwrap_or("(unresolved event)")
            )
            .unwrap();
        }
        for (label, entries) in [
            ("By pillar:", &report.impact_links.by_pillar),
            ("By direction:", &report.impact_links.by_direction),
            ("By magnitude:", &report.impact_links.by_magnitude),
        ] {
            if entries.is_empty() {
                continue;
            }
            writeln!(output, "{label}").unwrap();
            for entry in entries.iter() {
                writeln!(output, "  {:<26}{:>6}", entry.value, entry.count).unwrap();
            }
        }
    }

    write_section(&mut output, "EVENTS WITHOUT IMPACT LINKS");
    if report.events_without_impacts.is_empty() {
        writeln!(output, "(every event is linked)").unwrap();
    }
    for event in &report.events_without_impacts {
        writeln!(output, "{}", format_event_line(event)).unwrap();
    }

    output
}

/// Runs the explore command.
pub fn run<W: Write>(out: &mut W, dataset: &Dataset, json: bool) -> Result<()> {
    let report = build_report(dataset);

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fi_core::record::{ConfidenceLevel, Gender, ImpactDirection, ImpactMagnitude};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn observation(id: &str, code: &str, on: NaiveDate, value: f64) -> Record {
        let mut record = Record::new(id, RecordType::Observation);
        record.indicator_code = Some(code.to_string());
        record.observation_date = Some(on);
        record.value_numeric = Some(value);
        record.gender = Some(Gender::All);
        record.location = Some("national".to_string());
        record.pillar = Some("access".to_string());
        record.source_type = Some("survey".to_string());
        record.confidence = Some(ConfidenceLevel::High);
        record
    }

    fn event(id: &str, on: NaiveDate, name: &str, category: &str) -> Record {
        let mut record = Record::new(id, RecordType::Event);
        record.indicator = Some(name.to_string());
        record.category = Some(category.to_string());
        record.observation_date = Some(on);
        record
    }

    fn impact(id: &str, parent: &str) -> Record {
        let mut record = Record::new(id, RecordType::ImpactLink);
        record.parent_id = Some(parent.to_string());
        record.pillar = Some("usage".to_string());
        record.impact_direction = Some(ImpactDirection::Positive);
        record.impact_magnitude = Some(ImpactMagnitude::High);
        record
    }

    fn fixture() -> Dataset {
        Dataset::from_records(vec![
            observation("OBS_0001", "ACC_OWNERSHIP", date(2014, 12, 31), 21.8),
            observation("OBS_0002", "ACC_OWNERSHIP", date(2021, 12, 31), 46.5),
            observation("OBS_0003", "ACC_MM_ACCOUNT", date(2021, 12, 31), 4.7),
            event("EVT_0001", date(2021, 5, 11), "Telebirr Launch", "product_launch"),
            event("EVT_0002", date(2023, 8, 15), "M-Pesa Ethiopia Launch", "market_entry"),
            impact("IMP_0001", "EVT_0001"),
        ])
    }

    #[test]
    fn report_counts_each_record_type() {
        let report = build_report(&fixture());
        assert_eq!(report.total_records, 6);
        assert_eq!(report.observation_count, 3);
        assert_eq!(report.event_count, 2);
        assert_eq!(report.impact_link_count, 1);
        assert_eq!(report.record_types[0].value, "observation");
        assert_eq!(report.record_types[0].count, 3);
    }

    #[test]
    fn report_spans_observation_dates() {
        let report = build_report(&fixture());
        let range = report.date_range.expect("dated observations exist");
        assert_eq!(range.start, date(2014, 12, 31));
        assert_eq!(range.end, date(2021, 12, 31));
        assert_eq!(range.span_days, 2557);
    }

    #[test]
    fn report_flags_the_unlinked_event() {
        let report = build_report(&fixture());
        assert_eq!(report.events_without_impacts.len(), 1);
        assert_eq!(report.events_without_impacts[0].record_id, "EVT_0002");
    }

    #[test]
    fn report_marks_sparse_indicators() {
        let report = build_report(&fixture());
        let sparse: Vec<&str> = report
            .sparse_indicators
            .iter()
            .map(|s| s.code.as_str())
            .collect();
        assert_eq!(sparse, vec!["ACC_MM_ACCOUNT", "ACC_OWNERSHIP"]);
    }

    #[test]
    fn impact_links_join_their_parent_event_name() {
        let report = build_report(&fixture());
        assert_eq!(report.impact_links.links.len(), 1);
        let link = &report.impact_links.links[0];
        assert_eq!(link.record_id, "IMP_0001");
        assert_eq!(link.event.as_deref(), Some("Telebirr Launch"));

        let output = format_report(&report);
        assert!(output.contains("from Telebirr Launch"));
    }

    #[test]
    fn report_lists_observed_years_per_indicator() {
        let report = build_report(&fixture());
        assert_eq!(report.indicators[0].code, "ACC_MM_ACCOUNT");
        assert_eq!(report.indicators[0].years, vec![2021]);
        assert_eq!(report.indicators[1].years, vec![2014, 2021]);
    }

    #[test]
    fn human_report_includes_all_sections() {
        let output = format_report(&build_report(&fixture()));
        for section in [
            "DATASET EXPLORATION",
            "RECORD TYPES",
            "PILLARS",
            "SOURCE TYPES",
            "CONFIDENCE",
            "INDICATORS",
            "EVENTS",
            "IMPACT LINKS",
            "EVENTS WITHOUT IMPACT LINKS",
        ] {
            assert!(output.contains(section), "missing section: {section}");
        }
        assert!(output.contains("Telebirr Launch"));
        assert!(output.contains("EVT_0002"));
    }

    #[test]
    fn empty_dataset_renders_placeholders() {
        let output = format_report(&build_report(&Dataset::default()));
        assert!(output.contains("Observation dates: none"));
        assert!(output.contains("(no observations)"));
        assert!(output.contains("(no events cataloged)"));
        assert!(output.contains("No impact links found"));
    }

    #[test]
    fn json_output_is_valid() {
        let mut out = Vec::new();
        run(&mut out, &fixture(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_records"], 6);
        assert_eq!(value["impact_links"]["total"], 1);
    }
}
