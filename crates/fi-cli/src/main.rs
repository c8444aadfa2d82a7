use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fi_cli::commands::{add, analyze, explore, parse_gender_axis, parse_location_axis, project, status};
use fi_cli::{AddRecord, Cli, Commands, Config};
use fi_core::Dataset;

/// Resolve the dataset path: the `--data` override wins over configuration.
fn resolve_data_path(
    config_path: Option<&Path>,
    data_override: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config.data_path)
}

/// Load the dataset the resolved path points at.
fn load_dataset(
    config_path: Option<&Path>,
    data_override: Option<PathBuf>,
) -> Result<(Dataset, PathBuf)> {
    let data_path = resolve_data_path(config_path, data_override)?;
    let outcome = fi_store::load_records(&data_path)
        .with_context(|| format!("failed to load dataset at {}", data_path.display()))?;
    if outcome.skipped > 0 {
        tracing::warn!(skipped = outcome.skipped, "dataset rows were skipped");
    }
    Ok((Dataset::from_records(outcome.records), data_path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let Cli {
        config,
        data,
        command,
        ..
    } = cli;
    let mut stdout = std::io::stdout();

    match command {
        Some(Commands::Explore { json }) => {
            let (dataset, _) = load_dataset(config.as_deref(), data)?;
            explore::run(&mut stdout, &dataset, json)?;
        }
        Some(Commands::Analyze {
            indicator,
            gender,
            location,
            json,
        }) => {
            let (dataset, _) = load_dataset(config.as_deref(), data)?;
            let gender = parse_gender_axis(&gender)?;
            let location = parse_location_axis(&location);
            analyze::run(
                &mut stdout,
                &dataset,
                &indicator,
                gender,
                location.as_deref(),
                json,
            )?;
        }
        Some(Commands::Project {
            indicator,
            scenario,
            horizon,
            gender,
            location,
            json,
        }) => {
            let (dataset, _) = load_dataset(config.as_deref(), data)?;
            let gender = parse_gender_axis(&gender)?;
            let location = parse_location_axis(&location);
            project::run(
                &mut stdout,
                &dataset,
                &indicator,
                gender,
                location.as_deref(),
                scenario,
                horizon,
                json,
            )?;
        }
        Some(Commands::Add { record }) => {
            let data_path = resolve_data_path(config.as_deref(), data)?;
            let id = match record {
                AddRecord::Event {
                    date,
                    name,
                    category,
                    pillar,
                    confidence,
                    notes,
                } => add::add_event(
                    &data_path,
                    add::NewEvent {
                        date,
                        name,
                        category,
                        pillar,
                        confidence,
                        notes,
                    },
                )?,
                AddRecord::Impact {
                    parent,
                    indicator,
                    direction,
                    magnitude,
                    pillar,
                    confidence,
                } => add::add_impact(
                    &data_path,
                    add::NewImpact {
                        parent,
                        indicator_code: indicator,
                        direction,
                        magnitude,
                        pillar,
                        confidence,
                    },
                )?,
            };
            println!("{id}");
        }
        Some(Commands::Status) => {
            let (dataset, data_path) = load_dataset(config.as_deref(), data)?;
            status::run(&mut stdout, &dataset, &data_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
