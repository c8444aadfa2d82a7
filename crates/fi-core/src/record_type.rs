//! Record type enum as the single source of truth for record type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical record types in the unified dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A dated, numeric measurement of an indicator.
    Observation,
    /// A market, policy, or infrastructure event.
    Event,
    /// A qualified link from an event to the indicator it affects.
    ImpactLink,
}

impl RecordType {
    /// Record-ID prefix for this type (see [`crate::record_id`]).
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Observation => "OBS",
            Self::Event => "EVT",
            Self::ImpactLink => "IMP",
        }
    }

    /// String representation used in the dataset's `record_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Event => "event",
            Self::ImpactLink => "impact_link",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "observation" => Ok(Self::Observation),
            "event" => Ok(Self::Event),
            "impact_link" => Ok(Self::ImpactLink),
            _ => Err(UnknownRecordType(s.to_string())),
        }
    }
}

impl Serialize for RecordType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown record type strings.
#[derive(Debug, Clone)]
pub struct UnknownRecordType(String);

impl fmt::Display for UnknownRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record type: {}", self.0)
    }
}

impl std::error::Error for UnknownRecordType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        let variants = [
            RecordType::Observation,
            RecordType::Event,
            RecordType::ImpactLink,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: RecordType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn unknown_type_errors() {
        let result: Result<RecordType, _> = "forecast".parse();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown record type: forecast");
    }

    #[test]
    fn id_prefixes_are_distinct() {
        assert_eq!(RecordType::Observation.id_prefix(), "OBS");
        assert_eq!(RecordType::Event.id_prefix(), "EVT");
        assert_eq!(RecordType::ImpactLink.id_prefix(), "IMP");
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&RecordType::ImpactLink).unwrap();
        assert_eq!(json, "\"impact_link\"");
        let parsed: RecordType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, RecordType::ImpactLink);
    }
}
