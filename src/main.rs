//! Grid simulator entry point: CLI wiring and config-driven engine construction.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use thiserror::Error;
use tracing::info;

use grid_sim::config::{ConfigError, ScenarioConfig};
use grid_sim::io::export::{ExportError, export_csv};
use grid_sim::logging;
use grid_sim::sim::SimulationEngine;
use grid_sim::sim::metrics::RunReport;

#[derive(Debug, Parser)]
#[command(name = "grid-sim", version, about = "Renewable energy grid simulator")]
struct Cli {
    /// Load scenario from a TOML config file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, winter_calm, windy_spring, summer_heat).
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Override the random seed.
    #[arg(long, env = "GRID_SIM_SEED")]
    seed: Option<u64>,

    /// Number of ticks for a headless run (overrides the scenario).
    #[arg(long)]
    ticks: Option<usize>,

    /// Export per-tick snapshots to CSV.
    #[arg(long, value_name = "PATH")]
    telemetry_out: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Serve the REST + SSE API with a live tick loop.
    #[arg(long, conflicts_with = "tui")]
    serve: bool,

    /// API server port.
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Wall-clock milliseconds between ticks when serving.
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Launch the live terminal dashboard.
    #[arg(long)]
    tui: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write CSV: {0}")]
    Export(#[from] ExportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg_attr(all(feature = "api", feature = "tui"), allow(dead_code))]
    #[error("--{0} requires building with the `{0}` feature")]
    FeatureDisabled(&'static str),
    #[error("--interval-ms must be positive")]
    ZeroInterval,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    // --scenario takes priority, then --preset, then baseline default
    let (mut scenario, label) = if let Some(ref path) = cli.scenario {
        (ScenarioConfig::from_toml_file(path)?, path.display().to_string())
    } else if let Some(ref name) = cli.preset {
        (ScenarioConfig::from_preset(name)?, name.clone())
    } else {
        (ScenarioConfig::baseline(), "baseline".to_string())
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks {
        scenario.simulation.ticks = ticks;
    }

    let errors = scenario.validate();
    if let Some(first) = errors.first() {
        for e in errors.iter().skip(1) {
            eprintln!("{e}");
        }
        return Err(first.clone().into());
    }
    info!(scenario = %label, seed = scenario.simulation.seed, "scenario loaded");

    if cli.tui {
        return run_tui(scenario, &label);
    }
    if cli.serve {
        if cli.interval_ms == 0 {
            return Err(CliError::ZeroInterval);
        }
        return run_server(scenario, cli.port, cli.interval_ms);
    }
    run_headless(&scenario, cli.telemetry_out.as_ref())
}

fn run_headless(scenario: &ScenarioConfig, telemetry_out: Option<&PathBuf>) -> Result<(), CliError> {
    let mut engine = SimulationEngine::from_config(scenario)?;
    let states = engine.run(scenario.simulation.ticks);

    for s in &states {
        println!("{s}");
    }
    println!("\n{}", RunReport::from_states(&states));

    if let Some(path) = telemetry_out {
        export_csv(&states, path)?;
        eprintln!("Telemetry written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_tui(scenario: ScenarioConfig, label: &str) -> Result<(), CliError> {
    let app = grid_sim::tui::App::new(&scenario, label)?;
    grid_sim::tui::run(app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_tui(_scenario: ScenarioConfig, _label: &str) -> Result<(), CliError> {
    Err(CliError::FeatureDisabled("tui"))
}

#[cfg(feature = "api")]
fn run_server(scenario: ScenarioConfig, port: u16, interval_ms: u64) -> Result<(), CliError> {
    use std::net::SocketAddr;
    use std::time::Duration;

    let state = grid_sim::api::AppState::new(scenario)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(grid_sim::api::serve(
        state,
        addr,
        Duration::from_millis(interval_ms),
    ))?;
    Ok(())
}

#[cfg(not(feature = "api"))]
fn run_server(_scenario: ScenarioConfig, _port: u16, _interval_ms: u64) -> Result<(), CliError> {
    Err(CliError::FeatureDisabled("api"))
}
