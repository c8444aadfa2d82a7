//! Descriptive statistics over the record table.
//!
//! Growth segments between consecutive survey points, Pearson correlation
//! over date-aligned indicator series, and temporal coverage. All pure
//! functions over borrowed data; the correlation matrix is the one
//! embarrassingly parallel pass and fans out per row.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

use crate::dataset::{Dataset, SeriesPoint};

/// Days per year used when annualizing spans.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Change between two consecutive observations of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSegment {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Span in fractional years.
    pub years: f64,
    /// Absolute change in the series' unit (percentage points for rates).
    pub absolute_pp: f64,
    /// Relative change in percent; absent when the starting value is zero.
    pub relative_pct: Option<f64>,
    /// Absolute change annualized over the span.
    pub annual_pp: f64,
}

/// Growth between each consecutive pair of points.
///
/// Points must be sorted ascending by date (as [`Dataset::series`]
/// returns them). Zero-length spans are skipped rather than divided by.
#[must_use]
pub fn growth_segments(points: &[SeriesPoint]) -> Vec<GrowthSegment> {
    points
        .windows(2)
        .filter_map(|pair| {
            let [prev, curr] = pair else { return None };
            let days = (curr.date - prev.date).num_days();
            if days <= 0 {
                return None;
            }
            let years = days as f64 / DAYS_PER_YEAR;
            let absolute = curr.value - prev.value;
            let relative = (prev.value != 0.0).then(|| (curr.value / prev.value - 1.0) * 100.0);
            Some(GrowthSegment {
                from: prev.date,
                to: curr.date,
                years,
                absolute_pp: absolute,
                relative_pct: relative,
                annual_pp: absolute / years,
            })
        })
        .collect()
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns `None` for fewer than two points, mismatched lengths, or a
/// degenerate (zero-variance) sample.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

/// Pairwise correlations across indicators.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub codes: Vec<String>,
    /// `values[i][j]` is the correlation of `codes[i]` with `codes[j]`;
    /// `None` when the pair shares too few dates or is degenerate.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.codes.iter().position(|c| c == a)?;
        let j = self.codes.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Other indicators whose correlation with `code` clears `threshold`
    /// in absolute value, strongest first.
    #[must_use]
    pub fn strong_with(&self, code: &str, threshold: f64) -> Vec<(String, f64)> {
        let Some(i) = self.codes.iter().position(|c| c == code) else {
            return Vec::new();
        };

        let mut strong: Vec<(String, f64)> = self.values[i]
            .iter()
            .zip(&self.codes)
            .filter(|(_, other)| other.as_str() != code)
            .filter_map(|(r, other)| r.map(|r| (other.clone(), r)))
            .filter(|(_, r)| r.abs() > threshold)
            .collect();
        strong.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        strong
    }
}

/// Correlation matrix over date-aligned indicator series.
///
/// Series come from [`Dataset::indicator_date_means`]. Indicators with
/// fewer than two dated values are excluded up front; each pair is then
/// aligned on its common dates before correlating.
#[must_use]
pub fn correlation_matrix(
    series: &BTreeMap<String, BTreeMap<NaiveDate, f64>>,
) -> CorrelationMatrix {
    let kept: Vec<(&String, &BTreeMap<NaiveDate, f64>)> = series
        .iter()
        .filter(|(_, by_date)| by_date.len() >= 2)
        .collect();
    let codes: Vec<String> = kept.iter().map(|(code, _)| (*code).clone()).collect();

    let values: Vec<Vec<Option<f64>>> = (0..kept.len())
        .into_par_iter()
        .map(|i| {
            (0..kept.len())
                .map(|j| {
                    let (xs, ys) = align_on_dates(kept[i].1, kept[j].1);
                    pearson(&xs, &ys)
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { codes, values }
}

/// Values of both series on their shared dates.
fn align_on_dates(
    a: &BTreeMap<NaiveDate, f64>,
    b: &BTreeMap<NaiveDate, f64>,
) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .filter_map(|(date, &x)| b.get(date).map(|&y| (x, y)))
        .unzip()
}

/// Indicator-by-year presence of observations.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub indicators: Vec<String>,
    pub years: Vec<i32>,
    /// `present[i][j]`: indicator `i` has at least one observation in year `j`.
    pub present: Vec<Vec<bool>>,
}

#[must_use]
pub fn coverage(dataset: &Dataset) -> Coverage {
    let indicators = dataset.indicator_codes();
    let years = dataset.observation_years();

    let present = indicators
        .iter()
        .map(|code| {
            years
                .iter()
                .map(|&year| {
                    dataset.observations().any(|r| {
                        r.indicator_code.as_deref() == Some(code.as_str())
                            && r.observation_date.is_some_and(|d| d.year() == year)
                    })
                })
                .collect()
        })
        .collect();

    Coverage {
        indicators,
        years,
        present,
    }
}

/// Indicators with at most `max_observations` rows, least covered first.
#[must_use]
pub fn sparse_indicators(dataset: &Dataset, max_observations: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in dataset.observations() {
        if let Some(code) = record.indicator_code.as_deref() {
            *counts.entry(code).or_insert(0) += 1;
        }
    }

    let mut sparse: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count <= max_observations)
        .map(|(code, count)| (code.to_string(), count))
        .collect();
    sparse.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    sparse
}
