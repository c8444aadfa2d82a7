//! Core domain logic for the financial-inclusion records toolkit.
//!
//! This crate contains the fundamental types and logic for:
//! - Record IDs: sequential per-prefix allocation over a caller-held registry
//! - Dataset queries: filtering, joining, and aggregating the record table
//! - Statistics: growth segments, correlations, temporal coverage
//! - Trend: linear fits and scenario projections

pub mod dataset;
pub mod record;
pub mod record_id;
pub mod record_type;
pub mod stats;
pub mod trend;

pub use dataset::{Dataset, ImpactWithEvent, SeriesPoint, SeriesQuery, value_counts};
pub use record::{ConfidenceLevel, Gender, ImpactDirection, ImpactMagnitude, Record};
pub use record_id::next_record_id;
pub use record_type::{RecordType, UnknownRecordType};
pub use trend::Scenario;
