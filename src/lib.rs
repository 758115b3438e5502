//! Renewable grid simulator: weather-driven wind and solar, battery storage
//! and a gas peaker balanced against time- and temperature-dependent demand.

/// Scenario configuration, presets and validation.
pub mod config;
pub mod io;
pub mod logging;
/// Clock, weather, demand, controller and engine.
pub mod sim;
/// Wind, solar, battery and gas source models.
pub mod sources;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "tui")]
pub mod tui;
