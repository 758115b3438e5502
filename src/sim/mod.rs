//! Tick-based grid simulation: time, weather, demand, balancing and metrics.

/// Simulation clock advancing day and hour of day.
pub mod clock;
pub mod controller;
/// Time- and temperature-driven demand model.
pub mod demand;
pub mod engine;
pub mod metrics;
pub mod types;
/// Stochastic weather with scenario overrides.
pub mod weather;

pub use engine::{PlantInfo, SimulationEngine};
pub use types::GridState;
