//! Add command: enrichment records appended with freshly minted IDs.
//!
//! This is the allocator's boundary consumer. Each append is one
//! read-compute-append pass over the dataset file: load the registry,
//! mint the next ID under the record type's prefix, write the table back.
//! The allocator reserves nothing, so concurrent enrichment against the
//! same file must be serialized by whoever runs it.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use fi_core::record::{ConfidenceLevel, ImpactDirection, ImpactMagnitude, Record};
use fi_core::record_type::RecordType;
use fi_core::next_record_id;

/// A new event to catalog.
#[derive(Debug)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub name: String,
    pub category: String,
    pub pillar: Option<String>,
    pub confidence: Option<ConfidenceLevel>,
    pub notes: Option<String>,
}

/// A new impact link qualifying an existing event.
#[derive(Debug)]
pub struct NewImpact {
    pub parent: String,
    pub indicator_code: String,
    pub direction: ImpactDirection,
    pub magnitude: ImpactMagnitude,
    pub pillar: Option<String>,
    pub confidence: Option<ConfidenceLevel>,
}

fn load(data_path: &Path) -> Result<Vec<Record>> {
    let outcome = fi_store::load_records(data_path)
        .with_context(|| format!("failed to load dataset at {}", data_path.display()))?;
    Ok(outcome.records)
}

fn save(data_path: &Path, records: &[Record]) -> Result<()> {
    fi_store::save_records(data_path, records)
        .with_context(|| format!("failed to save dataset at {}", data_path.display()))
}

/// Appends a new event record and returns its minted ID.
pub fn add_event(data_path: &Path, event: NewEvent) -> Result<String> {
    let mut records = load(data_path)?;

    let id = next_record_id(
        RecordType::Event.id_prefix(),
        records.iter().map(|r| r.record_id.as_str()),
    );

    let mut record = Record::new(id.clone(), RecordType::Event);
    record.indicator = Some(event.name);
    record.category = Some(event.category);
    record.observation_date = Some(event.date);
    record.pillar = event.pillar;
    record.confidence = event.confidence;
    record.notes = event.notes;
    records.push(record);

    save(data_path, &records)?;
    tracing::info!(%id, "event appended");
    Ok(id)
}

/// Appends a new impact-link record and returns its minted ID.
///
/// The parent must be an event already present in the dataset; dangling
/// links are refused rather than silently created.
pub fn add_impact(data_path: &Path, impact: NewImpact) -> Result<String> {
    let mut records = load(data_path)?;

    let parent_exists = records
        .iter()
        .any(|r| r.record_type == RecordType::Event && r.record_id == impact.parent);
    if !parent_exists {
        bail!("parent event {} not found in dataset", impact.parent);
    }

    let id = next_record_id(
        RecordType::ImpactLink.id_prefix(),
        records.iter().map(|r| r.record_id.as_str()),
    );

    let mut record = Record::new(id.clone(), RecordType::ImpactLink);
    record.parent_id = Some(impact.parent);
    record.indicator_code = Some(impact.indicator_code);
    record.impact_direction = Some(impact.direction);
    record.impact_magnitude = Some(impact.magnitude);
    record.pillar = impact.pillar;
    record.confidence = impact.confidence;
    records.push(record);

    save(data_path, &records)?;
    tracing::info!(%id, "impact link appended");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    const SAMPLE: &str = "\
record_id,record_type,indicator,category,observation_date
OBS_0001,observation,,,2021-12-31
EVT_0001,event,Telebirr Launch,product_launch,2021-05-11
EVT_0003,event,M-Pesa Ethiopia Launch,market_entry,2023-08-15
";

    fn sample_dataset(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("records.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn new_event(name: &str) -> NewEvent {
        NewEvent {
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            name: name.to_string(),
            category: "policy".to_string(),
            pillar: Some("access".to_string()),
            confidence: Some(ConfidenceLevel::Medium),
            notes: None,
        }
    }

    #[test]
    fn event_id_continues_from_registry_max() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_dataset(&dir);

        // Registry max is EVT_0003, not the count of events.
        let id = add_event(&path, new_event("FX Reform")).unwrap();
        assert_eq!(id, "EVT_0004");

        let reloaded = fi_store::load_records(&path).unwrap();
        let appended = reloaded
            .records
            .iter()
            .find(|r| r.record_id == "EVT_0004")
            .expect("appended event should persist");
        assert_eq!(appended.indicator.as_deref(), Some("FX Reform"));
        assert_eq!(appended.confidence, Some(ConfidenceLevel::Medium));
    }

    #[test]
    fn consecutive_adds_mint_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_dataset(&dir);

        let first = add_event(&path, new_event("First")).unwrap();
        let second = add_event(&path, new_event("Second")).unwrap();
        assert_eq!(first, "EVT_0004");
        assert_eq!(second, "EVT_0005");
    }

    #[test]
    fn impact_links_to_existing_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_dataset(&dir);

        let id = add_impact(
            &path,
            NewImpact {
                parent: "EVT_0001".to_string(),
                indicator_code: "ACC_MM_ACCOUNT".to_string(),
                direction: ImpactDirection::Positive,
                magnitude: ImpactMagnitude::High,
                pillar: Some("usage".to_string()),
                confidence: None,
            },
        )
        .unwrap();
        assert_eq!(id, "IMP_0001");

        let reloaded = fi_store::load_records(&path).unwrap();
        let appended = reloaded
            .records
            .iter()
            .find(|r| r.record_id == "IMP_0001")
            .expect("appended impact should persist");
        assert_eq!(appended.parent_id.as_deref(), Some("EVT_0001"));
        assert_eq!(appended.impact_direction, Some(ImpactDirection::Positive));
    }

    #[test]
    fn impact_with_unknown_parent_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_dataset(&dir);

        let result = add_impact(
            &path,
            NewImpact {
                parent: "EVT_9999".to_string(),
                indicator_code: "ACC_MM_ACCOUNT".to_string(),
                direction: ImpactDirection::Negative,
                magnitude: ImpactMagnitude::Low,
                pillar: None,
                confidence: None,
            },
        );

        let error = result.unwrap_err();
        assert!(error.to_string().contains("EVT_9999"));

        // Nothing may be appended on refusal.
        let reloaded = fi_store::load_records(&path).unwrap();
        assert_eq!(reloaded.records.len(), 3);
    }

    #[test]
    fn observation_ids_do_not_leak_into_event_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(
            &path,
            "record_id,record_type\nOBS_0009,observation\n",
        )
        .unwrap();

        let id = add_event(&path, new_event("Isolated")).unwrap();
        assert_eq!(id, "EVT_0001");
    }

    #[test]
    fn missing_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = add_event(&dir.path().join("absent.csv"), new_event("Nope"));
        assert!(result.is_err());
    }
}
