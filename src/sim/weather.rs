//! Stochastic weather model with scripted scenario overrides.

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

/// Long-run mean the wind random walk reverts to (m/s).
const MEAN_WIND_MS: f64 = 8.0;
/// Fraction of the distance to the mean recovered per tick.
const WIND_REVERSION: f64 = 0.05;
/// Half-width of the per-tick wind perturbation (m/s).
const WIND_STEP_MS: f64 = 0.8;
/// Upper wind bound for both the random walk and manual overrides (m/s).
pub const MAX_WIND_MS: f64 = 30.0;

/// Per-tick probability that cloud cover changes.
const CLOUD_CHANGE_PROBABILITY: f64 = 0.15;
/// Half-width of a cloud cover change.
const CLOUD_STEP: f64 = 0.15;

/// Per-tick probability that temperature drifts.
const TEMPERATURE_CHANGE_PROBABILITY: f64 = 0.05;
/// Half-width of a temperature drift step (°C).
const TEMPERATURE_STEP_C: f64 = 0.5;
/// Bounds applied by stochastic temperature drift (°C).
const DRIFT_TEMPERATURE_RANGE: (f64, f64) = (-10.0, 35.0);
/// Bounds applied by manual temperature overrides (°C).
pub const TEMPERATURE_RANGE: (f64, f64) = (-30.0, 50.0);

/// Source of uniform random draws for the weather model.
///
/// Implemented for [`StdRng`] for normal runs and for [`SequenceSource`] when a
/// test or replay needs an exact, scripted sequence of draws.
pub trait RandomSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns a uniform draw in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Deterministic [`RandomSource`] that replays a fixed list of unit draws, cycling
/// back to the start when exhausted.
///
/// # Examples
///
/// ```
/// use grid_sim::sim::weather::{RandomSource, SequenceSource};
///
/// let mut source = SequenceSource::new(vec![0.25, 0.5]);
/// assert_eq!(source.uniform(0.0, 4.0), 1.0);
/// assert_eq!(source.next_unit(), 0.5);
/// assert_eq!(source.next_unit(), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    /// Creates a source replaying `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty or any value lies outside `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence must not be empty");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "sequence values must lie in [0, 1)"
        );
        Self { values, cursor: 0 }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Current weather: wind speed (m/s), cloud cover (`0..=1`) and temperature (°C).
///
/// Only [`WeatherModel`] creates or mutates these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherConditions {
    wind_speed: f64,
    cloud_cover: f64,
    temperature: f64,
}

impl WeatherConditions {
    /// Wind speed in m/s, within `[0, 30]`.
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    /// Cloud cover fraction, within `[0, 1]`.
    pub fn cloud_cover(&self) -> f64 {
        self.cloud_cover
    }

    /// Temperature in °C, within `[-30, 50]`.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Owns the single long-lived [`WeatherConditions`] of a simulation.
#[derive(Debug, Clone)]
pub struct WeatherModel {
    current: WeatherConditions,
    initial: WeatherConditions,
}

impl WeatherModel {
    /// Creates a weather model; starting values are clamped to the override ranges.
    pub fn new(wind_speed: f64, cloud_cover: f64, temperature: f64) -> Self {
        let initial = WeatherConditions {
            wind_speed: wind_speed.clamp(0.0, MAX_WIND_MS),
            cloud_cover: cloud_cover.clamp(0.0, 1.0),
            temperature: temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1),
        };
        Self {
            current: initial,
            initial,
        }
    }

    /// Current conditions.
    pub fn conditions(&self) -> WeatherConditions {
        self.current
    }

    /// Advances the weather by one tick.
    ///
    /// Wind follows a mean-reverting random walk. Clouds change with probability
    /// 0.15 and temperature drifts with probability 0.05. Draw order is fixed:
    /// wind step, cloud chance, [cloud step], temperature chance, [temperature step].
    pub fn update(&mut self, rng: &mut impl RandomSource) {
        let w = &mut self.current;

        let drift = (MEAN_WIND_MS - w.wind_speed) * WIND_REVERSION;
        let change = rng.uniform(-WIND_STEP_MS, WIND_STEP_MS) + drift;
        w.wind_speed = (w.wind_speed + change).clamp(0.0, MAX_WIND_MS);

        if rng.next_unit() < CLOUD_CHANGE_PROBABILITY {
            let change = rng.uniform(-CLOUD_STEP, CLOUD_STEP);
            w.cloud_cover = (w.cloud_cover + change).clamp(0.0, 1.0);
        }

        if rng.next_unit() < TEMPERATURE_CHANGE_PROBABILITY {
            let change = rng.uniform(-TEMPERATURE_STEP_C, TEMPERATURE_STEP_C);
            w.temperature =
                (w.temperature + change).clamp(DRIFT_TEMPERATURE_RANGE.0, DRIFT_TEMPERATURE_RANGE.1);
        }
    }

    /// Sets wind speed, clamped to `[0, 30]` m/s. Non-finite values are ignored.
    pub fn set_wind(&mut self, speed: f64) {
        if speed.is_finite() {
            self.current.wind_speed = speed.clamp(0.0, MAX_WIND_MS);
        }
    }

    /// Sets cloud cover, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_clouds(&mut self, cover: f64) {
        if cover.is_finite() {
            self.current.cloud_cover = cover.clamp(0.0, 1.0);
        }
    }

    /// Sets temperature, clamped to `[-30, 50]` °C. Non-finite values are ignored.
    pub fn set_temperature(&mut self, temperature: f64) {
        if temperature.is_finite() {
            self.current.temperature = temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
        }
    }

    /// Storm scenario: wind drawn from `[20, 28)` m/s, clouds from `[0.8, 1.0)`.
    pub fn trigger_storm(&mut self, rng: &mut impl RandomSource) {
        self.current.wind_speed = rng.uniform(20.0, 28.0);
        self.current.cloud_cover = rng.uniform(0.8, 1.0);
        info!(
            wind_speed = self.current.wind_speed,
            cloud_cover = self.current.cloud_cover,
            "storm scenario triggered"
        );
    }

    /// Calm scenario: wind drawn from `[0, 2)` m/s, clouds from `[0, 0.3)`.
    pub fn trigger_calm(&mut self, rng: &mut impl RandomSource) {
        self.current.wind_speed = rng.uniform(0.0, 2.0);
        self.current.cloud_cover = rng.uniform(0.0, 0.3);
        info!(
            wind_speed = self.current.wind_speed,
            cloud_cover = self.current.cloud_cover,
            "calm scenario triggered"
        );
    }

    /// Restores the starting conditions.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
