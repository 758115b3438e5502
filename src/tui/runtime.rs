//! TUI application state around a live engine.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::{ConfigError, ScenarioConfig};
use crate::sim::{GridState, SimulationEngine};

/// Maximum number of snapshots kept for the rolling chart (two simulated days at 15 min).
const MAX_HISTORY: usize = 192;

/// Tick interval options in milliseconds (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 6] = [2000, 1000, 500, 250, 100, 20];

/// Default speed index (500 ms).
const DEFAULT_SPEED_IDX: usize = 2;

/// TUI application state.
pub struct App {
    engine: SimulationEngine,
    /// Rolling history of snapshots for the chart.
    pub history: VecDeque<GridState>,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last simulation tick was executed.
    pub last_tick: Instant,
    /// Scenario label shown in the header.
    pub label: String,
    /// Last control action, shown in the footer until the next one.
    pub last_action: Option<String>,
}

impl App {
    /// Creates an app around a fresh engine for `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] if `config` is invalid.
    pub fn new(config: &ScenarioConfig, label: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: SimulationEngine::from_config(config)?,
            history: VecDeque::with_capacity(MAX_HISTORY),
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            label: label.to_string(),
            last_action: None,
        })
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) {
        let state = self.engine.tick();
        if self.history.len() >= MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(state);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases simulation speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases simulation speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    /// Returns the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    pub fn storm(&mut self) {
        self.engine.trigger_storm();
        self.last_action = Some(format!("storm: wind {:.1} m/s", self.wind_speed()));
    }

    pub fn calm(&mut self) {
        self.engine.trigger_calm();
        self.last_action = Some(format!("calm: wind {:.1} m/s", self.wind_speed()));
    }

    pub fn toggle_industrial(&mut self) {
        let enabled = !self.engine.demand().industrial_enabled();
        self.engine.set_industrial(enabled);
        let word = if enabled { "on" } else { "off" };
        self.last_action = Some(format!("industrial load {word}"));
    }

    /// Nudges wind speed by `delta` m/s (clamped by the weather model).
    pub fn adjust_wind(&mut self, delta: f64) {
        self.engine.set_wind(self.wind_speed() + delta);
        self.last_action = Some(format!("wind set to {:.1} m/s", self.wind_speed()));
    }

    /// Resets the engine and clears the chart.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.history.clear();
        self.paused = false;
        self.last_action = Some("reset".to_string());
    }

    /// Current (not yet ticked) wind speed.
    pub fn wind_speed(&self) -> f64 {
        self.engine.weather().conditions().wind_speed()
    }

    pub fn industrial_enabled(&self) -> bool {
        self.engine.demand().industrial_enabled()
    }

    /// Battery charge in percent, from the live battery.
    pub fn battery_pct(&self) -> f64 {
        self.engine.battery().charge_percent()
    }

    /// Returns the most recent snapshot, if any.
    pub fn last_state(&self) -> Option<&GridState> {
        self.history.back()
    }
}
