//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use grid_sim::config::ScenarioConfig;
use grid_sim::sim::weather::SequenceSource;
use grid_sim::sim::{GridState, SimulationEngine};

/// One simulated day at 15-minute ticks.
pub const TICKS_PER_DAY: usize = 96;

/// Tick length of the baseline plant, in hours.
pub const TICK_HOURS: f64 = 0.25;

/// Baseline engine seeded from the config (seed 42).
pub fn build_default_engine() -> SimulationEngine {
    build_engine(&ScenarioConfig::baseline())
}

/// Seeded engine for any valid config.
pub fn build_engine(config: &ScenarioConfig) -> SimulationEngine {
    SimulationEngine::from_config(config).expect("fixture config should be valid")
}

/// Draws that hold the weather still: zero wind step, and cloud and
/// temperature chances that never fire.
pub fn steady_weather() -> SequenceSource {
    SequenceSource::new(vec![0.5, 0.99, 0.99])
}

/// Engine whose weather follows a scripted draw sequence.
pub fn scripted_engine(config: &ScenarioConfig, draws: SequenceSource) -> SimulationEngine<SequenceSource> {
    SimulationEngine::with_rng(config, draws).expect("fixture config should be valid")
}

/// Copy of `state` with the wall-clock timestamp zeroed, for equality checks.
pub fn without_timestamp(state: &GridState) -> GridState {
    GridState {
        timestamp: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        ..state.clone()
    }
}
