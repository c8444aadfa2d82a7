//! Financial-inclusion records toolkit CLI library.
//!
//! This crate provides the CLI interface for the toolkit.

mod cli;
pub mod commands;
mod config;

pub use cli::{AddRecord, Cli, Commands};
pub use config::Config;
