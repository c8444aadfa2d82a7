//! In-memory dataset with the query operations the reports are built from.
//!
//! Every query borrows; nothing here mutates or persists records. The
//! recurring idiom is the original consumers' filter-then-sort: restrict
//! the flat table on record type and the indicator/gender/location axes,
//! then order by observation date.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;

use crate::record::{Gender, Record};
use crate::record_type::RecordType;

/// The loaded record table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

/// A dated, valued point of an observation series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Axes restricting an observation series.
///
/// `None` on an axis means no constraint; `Some` requires an exact match,
/// so rows where the column is blank never match a constrained axis.
#[derive(Debug, Clone, Copy)]
pub struct SeriesQuery<'a> {
    pub indicator_code: &'a str,
    pub gender: Option<Gender>,
    pub location: Option<&'a str>,
}

/// An impact link joined to its parent event, when the parent resolves.
#[derive(Debug, Clone, Copy)]
pub struct ImpactWithEvent<'a> {
    pub impact: &'a Record,
    pub event: Option<&'a Record>,
}

impl Dataset {
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records of one type, in table order.
    pub fn of_type(&self, record_type: RecordType) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |r| r.record_type == record_type)
    }

    pub fn observations(&self) -> impl Iterator<Item = &Record> {
        self.of_type(RecordType::Observation)
    }

    pub fn events(&self) -> impl Iterator<Item = &Record> {
        self.of_type(RecordType::Event)
    }

    pub fn impact_links(&self) -> impl Iterator<Item = &Record> {
        self.of_type(RecordType::ImpactLink)
    }

    /// Every record ID in the table, the allocator's registry input.
    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.record_id.as_str())
    }

    /// Dated, valued observations matching the query, ascending by date.
    ///
    /// Rows without a parseable date or numeric value are dropped, the way
    /// the original coerces and then discards them before charting.
    #[must_use]
    pub fn series(&self, query: &SeriesQuery<'_>) -> Vec<SeriesPoint> {
        let mut points: Vec<SeriesPoint> = self
            .observations()
            .filter(|r| r.indicator_code.as_deref() == Some(query.indicator_code))
            .filter(|r| query.gender.is_none_or(|g| r.gender == Some(g)))
            .filter(|r| query.location.is_none_or(|l| r.location.as_deref() == Some(l)))
            .filter_map(|r| {
                Some(SeriesPoint {
                    date: r.observation_date?,
                    value: r.value_numeric?,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);
        points
    }

    /// Display name of an indicator, from the first observation carrying one.
    #[must_use]
    pub fn indicator_name(&self, code: &str) -> Option<&str> {
        self.observations()
            .filter(|r| r.indicator_code.as_deref() == Some(code))
            .find_map(|r| r.indicator.as_deref())
    }

    /// Distinct observation indicator codes, sorted.
    #[must_use]
    pub fn indicator_codes(&self) -> Vec<String> {
        let codes: BTreeSet<&str> = self
            .observations()
            .filter_map(|r| r.indicator_code.as_deref())
            .collect();
        codes.into_iter().map(String::from).collect()
    }

    /// Earliest and latest dated observation.
    #[must_use]
    pub fn observation_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.observations().filter_map(|r| r.observation_date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }

    /// Distinct years with dated observations, sorted.
    #[must_use]
    pub fn observation_years(&self) -> Vec<i32> {
        use chrono::Datelike;
        let years: BTreeSet<i32> = self
            .observations()
            .filter_map(|r| r.observation_date)
            .map(|d| d.year())
            .collect();
        years.into_iter().collect()
    }

    /// Events ordered by date; undated events sort last, in table order.
    #[must_use]
    pub fn events_by_date(&self) -> Vec<&Record> {
        let mut events: Vec<&Record> = self.events().collect();
        events.sort_by_key(|r| (r.observation_date.is_none(), r.observation_date));
        events
    }

    /// Impact links joined to their parent events on `parent_id`.
    #[must_use]
    pub fn impacts_with_events(&self) -> Vec<ImpactWithEvent<'_>> {
        let events_by_id: HashMap<&str, &Record> = self
            .events()
            .map(|e| (e.record_id.as_str(), e))
            .collect();

        self.impact_links()
            .map(|impact| ImpactWithEvent {
                impact,
                event: impact
                    .parent_id
                    .as_deref()
                    .and_then(|id| events_by_id.get(id).copied()),
            })
            .collect()
    }

    /// Events no impact link points at yet: the enrichment backlog.
    #[must_use]
    pub fn events_without_impacts(&self) -> Vec<&Record> {
        let linked: HashSet<&str> = self
            .impact_links()
            .filter_map(|r| r.parent_id.as_deref())
            .collect();

        self.events_by_date()
            .into_iter()
            .filter(|e| !linked.contains(e.record_id.as_str()))
            .collect()
    }

    /// Per-indicator, per-date mean observation values.
    ///
    /// The correlation matrix aligns series through this map: multiple
    /// observations of an indicator on one date (gender or location
    /// disaggregations) collapse to their mean, matching the original's
    /// pivot aggregation.
    #[must_use]
    pub fn indicator_date_means(&self) -> BTreeMap<String, BTreeMap<NaiveDate, f64>> {
        let mut sums: BTreeMap<String, BTreeMap<NaiveDate, (f64, u32)>> = BTreeMap::new();
        for record in self.observations() {
            let (Some(code), Some(date), Some(value)) = (
                record.indicator_code.as_deref(),
                record.observation_date,
                record.value_numeric,
            ) else {
                continue;
            };
            let entry = sums
                .entry(code.to_string())
                .or_default()
                .entry(date)
                .or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        sums.into_iter()
            .map(|(code, by_date)| {
                let means = by_date
                    .into_iter()
                    .map(|(date, (sum, count))| (date, sum / f64::from(count)))
                    .collect();
                (code, means)
            })
            .collect()
    }
}

/// Counts occurrences of each value, most frequent first, ties by name.
#[must_use]
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn observation(
        id: &str,
        code: &str,
        on: NaiveDate,
        value: f64,
        gender: Gender,
        location: &str,
    ) -> Record {
        let mut record = Record::new(id, RecordType::Observation);
        record.indicator_code = Some(code.to_string());
        record.indicator = Some(format!("{code} (display)"));
        record.observation_date = Some(on);
        record.value_numeric = Some(value);
        record.gender = Some(gender);
        record.location = Some(location.to_string());
        record
    }

    fn event(id: &str, on: NaiveDate, name: &str) -> Record {
        let mut record = Record::new(id, RecordType::Event);
        record.indicator = Some(name.to_string());
        record.observation_date = Some(on);
        record
    }

    fn impact(id: &str, parent: &str) -> Record {
        let mut record = Record::new(id, RecordType::ImpactLink);
        record.parent_id = Some(parent.to_string());
        record
    }

    fn fixture() -> Dataset {
        Dataset::from_records(vec![
            observation(
                "OBS_0001",
                "ACC_OWNERSHIP",
                date(2021, 12, 31),
                46.0,
                Gender::All,
                "national",
            ),
            observation(
                "OBS_0002",
                "ACC_OWNERSHIP",
                date(2014, 12, 31),
                22.0,
                Gender::All,
                "national",
            ),
            observation(
                "OBS_0003",
                "ACC_OWNERSHIP",
                date(2021, 12, 31),
                39.0,
                Gender::Female,
                "national",
            ),
            observation(
                "OBS_0004",
                "ACC_MM_ACCOUNT",
                date(2021, 12, 31),
                4.7,
                Gender::All,
                "national",
            ),
            event("EVT_0001", date(2021, 5, 11), "Telebirr Launch"),
            event("EVT_0002", date(2023, 8, 15), "M-Pesa Ethiopia Launch"),
            impact("IMP_0001", "EVT_0001"),
        ])
    }

    #[test]
    fn partitions_by_record_type() {
        let dataset = fixture();
        assert_eq!(dataset.observations().count(), 4);
        assert_eq!(dataset.events().count(), 2);
        assert_eq!(dataset.impact_links().count(), 1);
    }

    #[test]
    fn series_filters_and_sorts_ascending() {
        let dataset = fixture();
        let series = dataset.series(&SeriesQuery {
            indicator_code: "ACC_OWNERSHIP",
            gender: Some(Gender::All),
            location: Some("national"),
        });

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date(2014, 12, 31));
        assert_eq!(series[0].value, 22.0);
        assert_eq!(series[1].value, 46.0);
    }

    #[test]
    fn series_gender_axis_is_exact() {
        let dataset = fixture();
        let female = dataset.series(&SeriesQuery {
            indicator_code: "ACC_OWNERSHIP",
            gender: Some(Gender::Female),
            location: Some("national"),
        });
        assert_eq!(female.len(), 1);
        assert_eq!(female[0].value, 39.0);
    }

    #[test]
    fn series_unconstrained_axis_matches_everything() {
        let dataset = fixture();
        let any = dataset.series(&SeriesQuery {
            indicator_code: "ACC_OWNERSHIP",
            gender: None,
            location: None,
        });
        assert_eq!(any.len(), 3);
    }

    #[test]
    fn series_drops_undated_and_unvalued_rows() {
        let mut undated = observation(
            "OBS_0009",
            "ACC_OWNERSHIP",
            date(2024, 1, 1),
            50.0,
            Gender::All,
            "national",
        );
        undated.observation_date = None;
        let dataset = Dataset::from_records(vec![undated]);

        let series = dataset.series(&SeriesQuery {
            indicator_code: "ACC_OWNERSHIP",
            gender: None,
            location: None,
        });
        assert!(series.is_empty());
    }

    #[test]
    fn record_ids_cover_all_types() {
        let dataset = fixture();
        let ids: Vec<&str> = dataset.record_ids().collect();
        assert!(ids.contains(&"OBS_0001"));
        assert!(ids.contains(&"EVT_0002"));
        assert!(ids.contains(&"IMP_0001"));
    }

    #[test]
    fn indicator_codes_sorted_unique() {
        let dataset = fixture();
        assert_eq!(
            dataset.indicator_codes(),
            vec!["ACC_MM_ACCOUNT".to_string(), "ACC_OWNERSHIP".to_string()]
        );
    }

    #[test]
    fn date_range_spans_observations() {
        let dataset = fixture();
        assert_eq!(
            dataset.observation_date_range(),
            Some((date(2014, 12, 31), date(2021, 12, 31)))
        );
    }

    #[test]
    fn empty_dataset_has_no_date_range() {
        let dataset = Dataset::default();
        assert!(dataset.observation_date_range().is_none());
    }

    #[test]
    fn impacts_join_their_parent_event() {
        let dataset = fixture();
        let joined = dataset.impacts_with_events();
        assert_eq!(joined.len(), 1);
        let parent = joined[0].event.expect("parent should resolve");
        assert_eq!(parent.record_id, "EVT_0001");
    }

    #[test]
    fn orphan_impact_joins_to_none() {
        let dataset = Dataset::from_records(vec![impact("IMP_0001", "EVT_9999")]);
        let joined = dataset.impacts_with_events();
        assert_eq!(joined.len(), 1);
        assert!(joined[0].event.is_none());
    }

    #[test]
    fn events_without_impacts_lists_the_backlog() {
        let dataset = fixture();
        let backlog = dataset.events_without_impacts();
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].record_id, "EVT_0002");
    }

    #[test]
    fn indicator_date_means_average_disaggregations() {
        let dataset = fixture();
        let means = dataset.indicator_date_means();
        // 2021-12-31 has all=46 and female=39 for ACC_OWNERSHIP.
        let ownership = &means["ACC_OWNERSHIP"];
        assert_eq!(ownership[&date(2021, 12, 31)], 42.5);
        assert_eq!(ownership[&date(2014, 12, 31)], 22.0);
    }

    #[test]
    fn value_counts_orders_by_count_then_name() {
        let values = ["event", "observation", "observation", "impact_link"];
        let counted = value_counts(values.iter().copied());
        assert_eq!(
            counted,
            vec![
                ("observation".to_string(), 2),
                ("event".to_string(), 1),
                ("impact_link".to_string(), 1),
            ]
        );
    }
}
