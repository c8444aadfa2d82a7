//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use fi_core::record::{ConfidenceLevel, ImpactDirection, ImpactMagnitude};
use fi_core::trend::Scenario;

/// Financial-inclusion records toolkit.
///
/// Explores, analyzes, and projects Ethiopia's financial-inclusion record
/// table, and enriches it with new event and impact-link records.
#[derive(Debug, Parser)]
#[command(name = "fi", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the dataset CSV, overriding configuration.
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the dataset exploration report.
    Explore {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Analyze growth, gender gap, and correlations for one indicator.
    Analyze {
        /// Indicator code (e.g. ACC_OWNERSHIP).
        #[arg(long)]
        indicator: String,

        /// Gender axis: all, male, female, or "any" to disable the filter.
        #[arg(long, default_value = "all")]
        gender: String,

        /// Location axis, or "any" to disable the filter.
        #[arg(long, default_value = "national")]
        location: String,

        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Project an indicator forward along its linear trend.
    Project {
        /// Indicator code (e.g. ACC_OWNERSHIP).
        #[arg(long)]
        indicator: String,

        /// Scenario: optimistic, base, or pessimistic.
        #[arg(long, default_value_t = Scenario::Base)]
        scenario: Scenario,

        /// Number of year-ends to project past the last observation.
        #[arg(long, default_value_t = 3)]
        horizon: usize,

        /// Gender axis: all, male, female, or "any" to disable the filter.
        #[arg(long, default_value = "all")]
        gender: String,

        /// Location axis, or "any" to disable the filter.
        #[arg(long, default_value = "national")]
        location: String,

        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Append a new record, minting its ID from the registry.
    Add {
        #[command(subcommand)]
        record: AddRecord,
    },

    /// Show dataset location and record counts.
    Status,
}

/// Record kinds the enrichment flow can append.
#[derive(Debug, Subcommand)]
pub enum AddRecord {
    /// Catalog a new event.
    Event {
        /// Event date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Event name (e.g. "M-Pesa Ethiopia Launch").
        #[arg(long)]
        name: String,

        /// Event category (e.g. product_launch, policy, regulation).
        #[arg(long)]
        category: String,

        /// Pillar the event bears on (e.g. access, usage).
        #[arg(long)]
        pillar: Option<String>,

        /// Source confidence: high, medium, or low.
        #[arg(long)]
        confidence: Option<ConfidenceLevel>,

        /// Free-form note.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Link an existing event to the indicator it affects.
    Impact {
        /// Record ID of the parent event (e.g. EVT_0003).
        #[arg(long)]
        parent: String,

        /// Indicator code the event affects.
        #[arg(long)]
        indicator: String,

        /// Direction of the effect: positive or negative.
        #[arg(long)]
        direction: ImpactDirection,

        /// Magnitude of the effect: low, medium, or high.
        #[arg(long)]
        magnitude: ImpactMagnitude,

        /// Pillar the impact bears on.
        #[arg(long)]
        pillar: Option<String>,

        /// Source confidence: high, medium, or low.
        #[arg(long)]
        confidence: Option<ConfidenceLevel>,
    },
}
