//! CSV export for grid state snapshots.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sim::types::GridState;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,day,time_of_day,wind_speed,cloud_cover,temperature,\
                      demand_mw,wind_mw,wind_status,solar_mw,solar_status,\
                      battery_mw,battery_pct,gas_mw,generation_mw,balance_mw,\
                      renewable_pct,stable,co2_kg,cost_eur";

/// Failure while writing telemetry.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create \"{path}\": {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Exports snapshots to a CSV file at the given path.
///
/// Writes a header row followed by one data row per snapshot. Output is
/// deterministic for identical inputs; wall-clock timestamps are not written.
///
/// # Arguments
///
/// * `states` - Snapshots in tick order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an [`ExportError`] if file creation or writing fails.
pub fn export_csv(states: &[GridState], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(states, io::BufWriter::new(file))
}

/// Writes snapshots as CSV to any writer.
///
/// # Errors
///
/// Returns an [`ExportError`] if writing fails.
pub fn write_csv(states: &[GridState], writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for s in states {
        wtr.write_record(&[
            s.tick.to_string(),
            s.simulation_day.to_string(),
            format!("{:.2}", s.weather.time_of_day),
            format!("{:.4}", s.weather.wind_speed),
            format!("{:.4}", s.weather.cloud_cover),
            format!("{:.4}", s.weather.temperature),
            format!("{:.4}", s.demand.total_mw),
            format!("{:.4}", s.wind.output_mw),
            s.wind.status.to_string(),
            format!("{:.4}", s.solar.output_mw),
            s.solar.status.to_string(),
            format!("{:.4}", s.battery.output_mw),
            format!("{:.4}", s.battery.charge_pct),
            format!("{:.4}", s.gas.output_mw),
            format!("{:.4}", s.grid.total_generation_mw),
            format!("{:.4}", s.grid.balance_mw),
            format!("{:.4}", s.metrics.renewable_share_pct),
            s.grid.stable.to_string(),
            format!("{:.4}", s.metrics.co2_kg),
            format!("{:.4}", s.metrics.cost_eur),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
