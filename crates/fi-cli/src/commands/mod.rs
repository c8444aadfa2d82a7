//! CLI subcommand implementations.

pub mod add;
pub mod analyze;
pub mod explore;
pub mod project;
pub mod status;

use anyhow::{Context, Result};

use fi_core::Gender;

/// Parses a `--gender` axis argument; `"any"` disables the filter.
pub fn parse_gender_axis(raw: &str) -> Result<Option<Gender>> {
    if raw == "any" {
        return Ok(None);
    }
    let gender = raw
        .parse()
        .with_context(|| format!("invalid --gender value: {raw}"))?;
    Ok(Some(gender))
}

/// Normalizes a `--location` axis argument; `"any"` disables the filter.
#[must_use]
pub fn parse_location_axis(raw: &str) -> Option<String> {
    (raw != "any").then(|| raw.to_string())
}
