//! Linear trend fitting and scenario projection.
//!
//! The projections reproduce the original toolkit's placeholder model: a
//! degree-1 least-squares fit over years-since-epoch, a fixed per-horizon
//! event uplift, a fixed confidence band, and a flat scenario multiplier.
//! These are dataset-calibration constants, not a designed forecast.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dataset::SeriesPoint;

/// Reference date the fit's x axis counts years from.
#[must_use]
pub fn trend_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).expect("fixed epoch is a valid date")
}

/// Fractional years between the epoch and `date`.
#[must_use]
pub fn years_since_epoch(date: NaiveDate) -> f64 {
    (date - trend_epoch()).num_days() as f64 / crate::stats::DAYS_PER_YEAR
}

/// Percentage-point uplift added per projected year for cataloged events.
pub const EVENT_UPLIFT_PP: [f64; 3] = [2.0, 2.5, 3.0];

/// Half-width of the confidence band per projected year, in pp.
pub const CI_HALF_WIDTH_PP: [f64; 3] = [3.0, 3.5, 4.0];

/// Interim account-ownership target, percent.
pub const ACCESS_TARGET_PCT: f64 = 60.0;

/// NFIS-II account-ownership target, percent.
pub const NFIS_TARGET_PCT: f64 = 70.0;

/// Projection scenario and its flat multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Optimistic,
    Base,
    Pessimistic,
}

impl Scenario {
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Optimistic => 1.15,
            Self::Base => 1.0,
            Self::Pessimistic => 0.9,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::Base => "base",
            Self::Pessimistic => "pessimistic",
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::Base
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimistic" => Ok(Self::Optimistic),
            "base" => Ok(Self::Base),
            "pessimistic" => Ok(Self::Pessimistic),
            _ => Err(UnknownScenario(s.to_string())),
        }
    }
}

/// Error type for unknown scenario names.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown scenario: {0} (expected optimistic, base, or pessimistic)")]
pub struct UnknownScenario(String);

/// A fitted degree-1 polynomial `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[must_use]
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares fit over `(x, y)` samples.
///
/// Returns `None` for fewer than two samples or a degenerate x spread.
#[must_use]
pub fn fit_linear(samples: &[(f64, f64)]) -> Option<LinearFit> {
    if samples.len() < 2 {
        return None;
    }

    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in samples {
        let dx = x - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den == 0.0 {
        return None;
    }

    let slope = num / den;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// One projected year-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub date: NaiveDate,
    /// Raw trend extrapolation.
    pub trend: f64,
    /// Trend + event uplift, scenario-scaled.
    pub projected: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A scenario projection over a series.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub scenario: Scenario,
    pub fit: LinearFit,
    pub points: Vec<ProjectionPoint>,
}

impl Projection {
    /// First projected year whose value reaches `target`, if any.
    #[must_use]
    pub fn milestone_year(&self, target: f64) -> Option<i32> {
        self.points
            .iter()
            .find(|p| p.projected >= target)
            .map(|p| p.year)
    }
}

/// Projects a series `horizon` year-ends past its last observation.
///
/// Points must be sorted ascending by date. Returns `None` when the series
/// cannot be fitted (fewer than two points or no date spread).
#[must_use]
pub fn project(points: &[SeriesPoint], scenario: Scenario, horizon: usize) -> Option<Projection> {
    let samples: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (years_since_epoch(p.date), p.value))
        .collect();
    let fit = fit_linear(&samples)?;

    let last_year = points.last()?.date.year();
    let projected = (1..=horizon)
        .filter_map(|offset| {
            let year = last_year + i32::try_from(offset).ok()?;
            let date = NaiveDate::from_ymd_opt(year, 12, 31)?;
            // Horizons past the calibrated window reuse the last constants.
            let step = (offset - 1).min(EVENT_UPLIFT_PP.len() - 1);
            let trend = fit.value_at(years_since_epoch(date));
            let value = (trend + EVENT_UPLIFT_PP[step]) * scenario.multiplier();
            Some(ProjectionPoint {
                year,
                date,
                trend,
                projected: value,
                lower: value - CI_HALF_WIDTH_PP[step],
                upper: value + CI_HALF_WIDTH_PP[step],
            })
        })
        .collect();

    Some(Projection {
        scenario,
        fit,
        points: projected,
    })
}
