//! The unified record model and its closed vocabularies.
//!
//! One [`Record`] is one row of the externally owned CSV table. The schema
//! mixes three record types in a single flat layout, so most columns are
//! optional. Deserialization is tolerant the way the original dataset's
//! consumers are: blank or unparseable optional fields load as absent
//! rather than failing the row. `record_id` and `record_type` are the only
//! fields a row cannot do without.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::record_type::RecordType;

/// Gender disaggregation axis of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Aggregate over all adults.
    All,
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(UnknownVocabulary {
                field: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// Source confidence grade assigned to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownVocabulary {
                field: "confidence",
                value: s.to_string(),
            }),
        }
    }
}

/// Direction of an impact link's effect on its indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    Positive,
    Negative,
}

impl ImpactDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for ImpactDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImpactDirection {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            _ => Err(UnknownVocabulary {
                field: "impact_direction",
                value: s.to_string(),
            }),
        }
    }
}

/// Coarse magnitude grade of an impact link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactMagnitude {
    Low,
    Medium,
    High,
}

impl ImpactMagnitude {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ImpactMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImpactMagnitude {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownVocabulary {
                field: "impact_magnitude",
                value: s.to_string(),
            }),
        }
    }
}

/// Error type for a string outside a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {value}")]
pub struct UnknownVocabulary {
    field: &'static str,
    value: String,
}

/// One row of the unified record table.
///
/// Field-by-name (de)serialization targets the CSV layout; all scalar
/// values arrive as strings there, which is what the tolerant helpers
/// below assume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub record_id: String,
    pub record_type: RecordType,
    #[serde(default)]
    pub pillar: Option<String>,
    #[serde(default)]
    pub indicator_code: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub observation_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value_numeric: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub confidence: Option<ConfidenceLevel>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub impact_direction: Option<ImpactDirection>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub impact_magnitude: Option<ImpactMagnitude>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record {
    /// Creates a record with every optional field absent.
    #[must_use]
    pub fn new(record_id: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            record_id: record_id.into(),
            record_type,
            pillar: None,
            indicator_code: None,
            indicator: None,
            category: None,
            observation_date: None,
            value_numeric: None,
            unit: None,
            gender: None,
            location: None,
            source_type: None,
            confidence: None,
            parent_id: None,
            impact_direction: None,
            impact_magnitude: None,
            notes: None,
        }
    }
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// ISO `YYYY-MM-DD`, anything else loads as absent.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.and_then(|s| s.parse().ok()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.and_then(|s| s.parse().ok()))
}

fn lenient_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(non_blank(deserializer)?.and_then(|s| s.parse().ok()))
}
