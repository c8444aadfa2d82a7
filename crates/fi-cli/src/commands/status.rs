//! Status command for showing the dataset location and record counts.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use fi_core::Dataset;

pub fn run<W: Write>(writer: &mut W, dataset: &Dataset, data_path: &Path) -> Result<()> {
    writeln!(writer, "Financial-inclusion records status")?;
    writeln!(writer, "Dataset: {}", data_path.display())?;

    if dataset.is_empty() {
        writeln!(writer, "No records loaded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Records: {} ({} observations, {} events, {} impact links)",
        dataset.len(),
        dataset.observations().count(),
        dataset.events().count(),
        dataset.impact_links().count()
    )?;

    match dataset.observation_date_range() {
        Some((_, latest)) => writeln!(writer, "Latest observation: {latest}")?,
        None => writeln!(writer, "Latest observation: none")?,
    }

    Ok(())
}
