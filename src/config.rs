//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::weather::{MAX_WIND_MS, TEMPERATURE_RANGE};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline plant. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Starting weather.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Demand model parameters.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Wind farm parameters.
    #[serde(default)]
    pub wind: WindConfig,
    /// Solar array parameters.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Gas backup plant parameters.
    #[serde(default)]
    pub gas: GasConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated minutes per tick, in `(0, 1440]`.
    pub tick_minutes: f64,
    /// Seed for the weather random source.
    pub seed: u64,
    /// Ticks to run in headless mode.
    pub ticks: usize,
    /// Hour of day the clock starts (and resets) at.
    pub start_hour: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_minutes: 15.0,
            seed: 42,
            ticks: 96,
            start_hour: 0.0,
        }
    }
}

/// Starting weather conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Cloud cover fraction.
    pub cloud_cover: f64,
    /// Temperature (°C).
    pub temperature: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            wind_speed: 8.0,
            cloud_cover: 0.3,
            temperature: 12.0,
        }
    }
}

/// Demand model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Residential base load (MW).
    pub base_load_mw: f64,
    /// Residential multiplier at the top of a peak (>= 1).
    pub peak_multiplier: f64,
    /// Industrial block (MW).
    pub industrial_load_mw: f64,
    /// Whether the industrial block starts switched on.
    pub industrial_enabled: bool,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_load_mw: 300.0,
            peak_multiplier: 1.5,
            industrial_load_mw: 50.0,
            industrial_enabled: true,
        }
    }
}

/// Wind farm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    pub num_turbines: u32,
    /// Rated power per turbine (MW).
    pub turbine_rating_mw: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            num_turbines: 50,
            turbine_rating_mw: 9.0,
        }
    }
}

/// Solar array parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Peak output (MW).
    pub capacity_mw: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self { capacity_mw: 200.0 }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (MWh).
    pub capacity_mwh: f64,
    /// Stored energy at start and after reset (MWh).
    pub initial_charge_mwh: f64,
    /// Maximum charging power (MW).
    pub max_charge_mw: f64,
    /// Maximum discharging power (MW).
    pub max_discharge_mw: f64,
    /// Conversion efficiency, in `(0, 1]`.
    pub efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_mwh: 400.0,
            initial_charge_mwh: 200.0,
            max_charge_mw: 100.0,
            max_discharge_mw: 100.0,
            efficiency: 0.95,
        }
    }
}

/// Gas backup plant parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GasConfig {
    /// Maximum output (MW).
    pub capacity_mw: f64,
    /// Fuel cost (EUR/MWh).
    pub fuel_cost_eur_per_mwh: f64,
    /// Emissions (t CO₂/MWh).
    pub co2_t_per_mwh: f64,
    /// Ramp limit (MW/min).
    pub ramp_mw_per_min: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 300.0,
            fuel_cost_eur_per_mwh: 150.0,
            co2_t_per_mwh: 0.5,
            ramp_mw_per_min: 10.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.efficiency"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: the reference plant under mild weather.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the winter-calm preset: cold, still and overcast.
    pub fn winter_calm() -> Self {
        Self {
            weather: WeatherConfig {
                wind_speed: 3.0,
                cloud_cover: 0.8,
                temperature: -2.0,
            },
            demand: DemandConfig {
                base_load_mw: 320.0,
                ..DemandConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the windy-spring preset: strong wind and mild temperature.
    pub fn windy_spring() -> Self {
        Self {
            weather: WeatherConfig {
                wind_speed: 14.0,
                cloud_cover: 0.4,
                temperature: 11.0,
            },
            ..Self::default()
        }
    }

    /// Returns the summer-heat preset: hot, clear and nearly windless.
    pub fn summer_heat() -> Self {
        Self {
            weather: WeatherConfig {
                wind_speed: 4.0,
                cloud_cover: 0.1,
                temperature: 30.0,
            },
            battery: BatteryConfig {
                initial_charge_mwh: 120.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "winter_calm", "windy_spring", "summer_heat"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "winter_calm" => Ok(Self::winter_calm()),
            "windy_spring" => Ok(Self::windy_spring()),
            "summer_heat" => Ok(Self::summer_heat()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let s = &self.simulation;
        check(
            s.tick_minutes > 0.0 && s.tick_minutes <= 1440.0,
            "simulation.tick_minutes",
            "must be in (0, 1440]",
        );
        check(s.ticks > 0, "simulation.ticks", "must be > 0");
        check(
            (0.0..24.0).contains(&s.start_hour),
            "simulation.start_hour",
            "must be in [0, 24)",
        );

        let w = &self.weather;
        check(
            (0.0..=MAX_WIND_MS).contains(&w.wind_speed),
            "weather.wind_speed",
            "must be in [0, 30]",
        );
        check(
            (0.0..=1.0).contains(&w.cloud_cover),
            "weather.cloud_cover",
            "must be in [0, 1]",
        );
        check(
            (TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&w.temperature),
            "weather.temperature",
            "must be in [-30, 50]",
        );

        let d = &self.demand;
        check(d.base_load_mw >= 0.0, "demand.base_load_mw", "must be >= 0");
        check(d.peak_multiplier >= 1.0, "demand.peak_multiplier", "must be >= 1");
        check(
            d.industrial_load_mw >= 0.0,
            "demand.industrial_load_mw",
            "must be >= 0",
        );

        check(self.wind.num_turbines > 0, "wind.num_turbines", "must be > 0");
        check(
            self.wind.turbine_rating_mw > 0.0,
            "wind.turbine_rating_mw",
            "must be > 0",
        );
        check(self.solar.capacity_mw > 0.0, "solar.capacity_mw", "must be > 0");

        let b = &self.battery;
        check(b.capacity_mwh > 0.0, "battery.capacity_mwh", "must be > 0");
        check(
            b.initial_charge_mwh >= 0.0 && b.initial_charge_mwh <= b.capacity_mwh,
            "battery.initial_charge_mwh",
            "must be in [0, battery.capacity_mwh]",
        );
        check(b.max_charge_mw >= 0.0, "battery.max_charge_mw", "must be >= 0");
        check(
            b.max_discharge_mw >= 0.0,
            "battery.max_discharge_mw",
            "must be >= 0",
        );
        check(
            b.efficiency > 0.0 && b.efficiency <= 1.0,
            "battery.efficiency",
            "must be in (0, 1]",
        );

        let g = &self.gas;
        check(g.capacity_mw > 0.0, "gas.capacity_mw", "must be > 0");
        check(
            g.fuel_cost_eur_per_mwh >= 0.0,
            "gas.fuel_cost_eur_per_mwh",
            "must be >= 0",
        );
        check(g.co2_t_per_mwh >= 0.0, "gas.co2_t_per_mwh", "must be >= 0");
        check(g.ramp_mw_per_min >= 0.0, "gas.ramp_mw_per_min", "must be >= 0");

        errors
    }
}
