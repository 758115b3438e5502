//! Simulation engine that orchestrates weather, demand, sources and controller.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ScenarioConfig};
use crate::sources::types::DispatchableGenerator;
use crate::sources::{BatterySource, GasSource, SolarSource, WindSource};

use super::clock::Clock;
use super::controller::{GridController, TickInputs};
use super::demand::DemandModel;
use super::metrics::{CumulativeMetrics, GasDelta};
use super::types::{
    BatterySnapshot, GasSnapshot, GridBalance, GridState, SolarSnapshot, WeatherSnapshot,
    WindSnapshot,
};
use super::weather::{RandomSource, WeatherModel};

/// Static description of the simulated plant plus the current clock reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantInfo {
    pub num_turbines: u32,
    pub wind_capacity_mw: f64,
    pub solar_capacity_mw: f64,
    pub battery_capacity_mwh: f64,
    pub battery_max_discharge_mw: f64,
    pub gas_capacity_mw: f64,
    pub tick_minutes: f64,
    pub simulation_day: u32,
    pub time_of_day: f64,
    pub total_ticks: u64,
    pub industrial_enabled: bool,
}

/// Simulation engine owning one instance of every grid component.
///
/// Generic over `R: RandomSource` so tests can script the weather exactly;
/// normal runs use a seeded [`StdRng`]. The engine is a plain owned value: it
/// does no locking and expects a single caller driving [`tick`](Self::tick).
pub struct SimulationEngine<R: RandomSource = StdRng> {
    config: ScenarioConfig,
    rng: R,
    clock: Clock,
    weather: WeatherModel,
    demand: DemandModel,
    wind: WindSource,
    solar: SolarSource,
    battery: BatterySource,
    gas: GasSource,
    controller: GridController,
    metrics: CumulativeMetrics,
}

impl SimulationEngine<StdRng> {
    /// Builds an engine from a validated configuration, seeding the weather
    /// from `config.simulation.seed`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`ScenarioConfig::validate`].
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        let rng = StdRng::seed_from_u64(config.simulation.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    /// Builds an engine drawing weather randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`ScenarioConfig::validate`].
    pub fn with_rng(config: &ScenarioConfig, rng: R) -> Result<Self, ConfigError> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err);
        }

        let d = &config.demand;
        Ok(Self {
            config: config.clone(),
            rng,
            clock: build_clock(config),
            weather: build_weather(config),
            demand: DemandModel::new(
                d.base_load_mw,
                d.peak_multiplier,
                d.industrial_load_mw,
                d.industrial_enabled,
            ),
            wind: WindSource::new(config.wind.num_turbines, config.wind.turbine_rating_mw),
            solar: SolarSource::new(config.solar.capacity_mw),
            battery: build_battery(config),
            gas: build_gas(config),
            controller: GridController::default(),
            metrics: CumulativeMetrics::default(),
        })
    }

    /// Advances the simulation by one tick.
    ///
    /// Order: weather update, renewable output, demand, balancing (mutating
    /// battery and gas), metrics, snapshot, clock advance.
    ///
    /// # Returns
    ///
    /// The [`GridState`] snapshot for the tick just computed.
    pub fn tick(&mut self) -> GridState {
        self.weather.update(&mut self.rng);
        let conditions = self.weather.conditions();
        let hour = self.clock.time_of_day();
        let duration_h = self.clock.tick_hours();

        let wind = self.wind.calculate(conditions.wind_speed());
        let solar = self.solar.calculate(hour, conditions.cloud_cover());
        let demand = self.demand.calculate(hour, conditions.temperature());

        let co2_before = self.gas.co2_t();
        let cost_before = self.gas.fuel_cost_eur();

        let inputs = TickInputs {
            demand_mw: demand.total_mw,
            wind_mw: wind.power_mw,
            solar_mw: solar.power_mw,
            duration_h,
        };
        let result = self
            .controller
            .balance(&inputs, &mut self.battery, &mut self.gas);

        let gas_delta = GasDelta {
            co2_t: self.gas.co2_t() - co2_before,
            cost_eur: self.gas.fuel_cost_eur() - cost_before,
        };
        self.metrics.record(&result, duration_h, gas_delta);

        debug!(
            day = self.clock.day(),
            hour,
            demand_mw = result.demand_mw,
            supply_mw = result.total_supply_mw,
            battery_mw = result.battery_mw,
            gas_mw = result.gas_mw,
            mode = ?result.mode,
            "tick"
        );
        if !result.stable {
            warn!(
                day = self.clock.day(),
                hour,
                shortfall_mw = result.shortfall_mw(),
                "supply shortfall"
            );
        }

        let state = GridState {
            timestamp: Utc::now(),
            tick: self.clock.total_ticks(),
            simulation_day: self.clock.day(),
            weather: WeatherSnapshot::capture(&conditions, hour),
            demand,
            wind: WindSnapshot::capture(&self.wind, wind),
            solar: SolarSnapshot::capture(&self.solar, solar),
            battery: BatterySnapshot::capture(&self.battery, result.battery_mw),
            gas: GasSnapshot::capture(&self.gas),
            grid: GridBalance::from_result(&result),
            metrics: self
                .metrics
                .summary(self.gas.activation_count(), self.battery.cycles()),
        };

        self.clock.advance();
        state
    }

    /// Runs `ticks` ticks and returns every snapshot in order.
    pub fn run(&mut self, ticks: usize) -> Vec<GridState> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Restores clock, weather, battery, gas and metrics to their configured
    /// starting state.
    ///
    /// Demand, wind, solar and controller settings are kept, including the
    /// industrial toggle. The random source continues its sequence.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.weather.reset();
        self.battery = build_battery(&self.config);
        self.gas = build_gas(&self.config);
        self.metrics = CumulativeMetrics::default();
        info!("simulation reset");
    }

    /// Sets wind speed, clamped to `[0, 30]` m/s.
    pub fn set_wind(&mut self, speed: f64) {
        self.weather.set_wind(speed);
    }

    /// Sets cloud cover, clamped to `[0, 1]`.
    pub fn set_clouds(&mut self, cover: f64) {
        self.weather.set_clouds(cover);
    }

    /// Sets temperature, clamped to `[-30, 50]` °C.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.weather.set_temperature(temperature);
    }

    /// Switches the industrial load block.
    pub fn set_industrial(&mut self, enabled: bool) {
        self.demand.set_industrial(enabled);
        info!(enabled, "industrial load toggled");
    }

    pub fn trigger_storm(&mut self) {
        self.weather.trigger_storm(&mut self.rng);
    }

    pub fn trigger_calm(&mut self) {
        self.weather.trigger_calm(&mut self.rng);
    }

    /// Static plant description and current clock reading.
    pub fn info(&self) -> PlantInfo {
        PlantInfo {
            num_turbines: self.wind.num_turbines,
            wind_capacity_mw: self.wind.capacity_mw(),
            solar_capacity_mw: self.solar.capacity_mw,
            battery_capacity_mwh: self.battery.capacity_mwh(),
            battery_max_discharge_mw: self.battery.max_discharge_mw(),
            gas_capacity_mw: self.gas.capacity_mw(),
            tick_minutes: self.clock.tick_minutes(),
            simulation_day: self.clock.day(),
            time_of_day: self.clock.time_of_day(),
            total_ticks: self.clock.total_ticks(),
            industrial_enabled: self.demand.industrial_enabled(),
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn weather(&self) -> &WeatherModel {
        &self.weather
    }

    pub fn demand(&self) -> &DemandModel {
        &self.demand
    }

    pub fn battery(&self) -> &BatterySource {
        &self.battery
    }

    pub fn gas(&self) -> &GasSource {
        &self.gas
    }

    pub fn metrics(&self) -> &CumulativeMetrics {
        &self.metrics
    }
}

fn build_clock(config: &ScenarioConfig) -> Clock {
    Clock::starting_at(config.simulation.tick_minutes, config.simulation.start_hour)
}

fn build_weather(config: &ScenarioConfig) -> WeatherModel {
    let w = &config.weather;
    WeatherModel::new(w.wind_speed, w.cloud_cover, w.temperature)
}

fn build_battery(config: &ScenarioConfig) -> BatterySource {
    let b = &config.battery;
    BatterySource::new(
        b.capacity_mwh,
        b.initial_charge_mwh,
        b.max_charge_mw,
        b.max_discharge_mw,
        b.efficiency,
    )
}

fn build_gas(config: &ScenarioConfig) -> GasSource {
    let g = &config.gas;
    GasSource::new(
        g.capacity_mw,
        g.fuel_cost_eur_per_mwh,
        g.co2_t_per_mwh,
        g.ramp_mw_per_min,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::controller::BalanceMode;
    use crate::sim::weather::SequenceSource;
    use crate::sources::types::{SolarStatus, WindStatus};

    /// Wind step 0.5 is a zero perturbation; 0.99 skips cloud and temperature changes.
    fn steady_source() -> SequenceSource {
        SequenceSource::new(vec![0.5, 0.99, 0.99])
    }

    fn steady_engine(config: &ScenarioConfig) -> SimulationEngine<SequenceSource> {
        SimulationEngine::with_rng(config, steady_source()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.capacity_mwh = 0.0;
        let err = SimulationEngine::from_config(&cfg).err();
        assert_eq!(err.map(|e| e.field), Some("battery.capacity_mwh".to_string()));
    }

    #[test]
    fn first_tick_at_midnight_baseline() {
        let mut engine = steady_engine(&ScenarioConfig::baseline());
        let state = engine.tick();

        assert_eq!(state.tick, 0);
        assert_eq!(state.simulation_day, 1);
        assert_eq!(state.time_of_day(), 0.0);
        // 8 m/s stays at 8 with a zero perturbation.
        assert_eq!(state.weather.wind_speed, 8.0);
        assert_eq!(state.wind.status, WindStatus::Ramping);
        assert_eq!(state.solar.status, SolarStatus::Nighttime);
        assert_eq!(state.demand.total_mw, 230.0);

        let wind = 450.0 * (5.0_f64 / 9.0).powi(3);
        assert!((state.wind.output_mw - wind).abs() < 1e-9);
        // The battery is rate-limited to 100 MW; gas covers the rest.
        assert_eq!(state.grid.mode, BalanceMode::DeficitBatteryPlusGas);
        assert!((state.battery.output_mw - 100.0).abs() < 1e-9);
        assert!((state.gas.output_mw - (130.0 - wind)).abs() < 1e-9);
        assert!(state.grid.stable);
        assert!(state.battery.is_discharging);
        assert_eq!(engine.clock().time_of_day(), 0.25);
    }

    #[test]
    fn drained_battery_brings_gas_online() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.initial_charge_mwh = 0.0;
        cfg.weather.wind_speed = 0.0;
        let mut engine = SimulationEngine::with_rng(&cfg, SequenceSource::new(vec![0.0, 0.99, 0.99])).unwrap();

        let first = engine.tick();
        assert_eq!(first.grid.mode, BalanceMode::DeficitBatteryPlusGas);
        // Ramp limit: 10 MW/min for 15 minutes.
        assert_eq!(first.gas.output_mw, 150.0);
        assert!(!first.grid.stable);
        assert_eq!(first.gas.activation_count, 1);
        assert_eq!(first.metrics.uptime_pct, 0.0);

        let second = engine.tick();
        assert_eq!(second.gas.output_mw, 230.0);
        assert!(second.grid.stable);
        assert_eq!(second.metrics.uptime_pct, 50.0);
        assert_eq!(second.metrics.gas_activation_count, 1);
    }

    #[test]
    fn cumulative_co2_is_sum_of_tick_emissions() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.initial_charge_mwh = 0.0;
        cfg.weather.wind_speed = 0.0;
        let mut engine = SimulationEngine::with_rng(&cfg, SequenceSource::new(vec![0.0, 0.99, 0.99])).unwrap();

        let states = engine.run(4);
        let last = states.last().unwrap();
        // Engine totals track the plant's own counters.
        assert!((last.metrics.co2_kg - last.gas.co2_t * 1000.0).abs() < 1e-6);
        assert!((last.metrics.cost_eur - last.gas.fuel_cost_eur).abs() < 1e-6);
    }

    #[test]
    fn surplus_leaves_running_gas_untouched() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.initial_charge_mwh = 0.0;
        cfg.weather.wind_speed = 0.0;
        let mut engine = SimulationEngine::with_rng(&cfg, SequenceSource::new(vec![0.5, 0.99, 0.99])).unwrap();

        let deficit = engine.tick();
        assert_eq!(deficit.gas.output_mw, 150.0);

        engine.set_wind(15.0);
        let surplus = engine.tick();
        assert_eq!(surplus.grid.mode, BalanceMode::SurplusCharging);
        // Gas keeps its previous output; the balance result carries none.
        assert_eq!(surplus.gas.output_mw, 150.0);
        assert_eq!(surplus.gas.runtime_hours, deficit.gas.runtime_hours);
        assert!(surplus.battery.is_charging);
        let net = surplus.grid.total_generation_mw - surplus.demand.total_mw;
        assert!((net - surplus.grid.balance_mw).abs() < 1e-9);
    }

    #[test]
    fn nan_wind_control_leaves_tick_finite() {
        let cfg = ScenarioConfig::baseline();
        let mut engine = steady_engine(&cfg);
        engine.set_wind(f64::NAN);

        let s = engine.tick();
        assert!(s.weather.wind_speed.is_finite());
        assert!(s.wind.output_mw.is_finite());
        assert!(s.battery.output_mw <= cfg.battery.max_discharge_mw + 1e-9);
        assert!(s.battery.charge_mwh > 0.0);
    }

    #[test]
    fn charging_tick_generation_agrees_with_balance() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.start_hour = 12.0;
        let mut engine = steady_engine(&cfg);
        engine.set_wind(15.0);

        let s = engine.tick();
        assert_eq!(s.grid.mode, BalanceMode::SurplusCharging);
        assert!(s.battery.output_mw < 0.0);
        let net = s.grid.total_generation_mw - s.demand.total_mw;
        assert!((net - s.grid.balance_mw).abs() < 1e-9);
    }

    #[test]
    fn reset_restores_starting_state_and_keeps_industrial_toggle() {
        let cfg = ScenarioConfig::baseline();
        let mut engine = steady_engine(&cfg);
        engine.set_industrial(false);
        engine.run(10);
        engine.set_wind(22.0);

        engine.reset();
        assert_eq!(engine.clock().total_ticks(), 0);
        assert_eq!(engine.clock().time_of_day(), 0.0);
        assert_eq!(engine.weather().conditions().wind_speed(), 8.0);
        assert_eq!(engine.battery().charge_mwh(), 200.0);
        assert_eq!(engine.battery().cycles(), 0.0);
        assert_eq!(engine.gas().activation_count(), 0);
        assert_eq!(engine.metrics(), &CumulativeMetrics::default());
        assert!(!engine.demand().industrial_enabled());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = steady_engine(&ScenarioConfig::baseline());
        engine.run(7);
        engine.reset();
        let once = (engine.info(), engine.battery().charge_mwh(), engine.metrics().clone());
        engine.reset();
        let twice = (engine.info(), engine.battery().charge_mwh(), engine.metrics().clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn controls_clamp_and_toggle() {
        let mut engine = steady_engine(&ScenarioConfig::baseline());
        engine.set_wind(99.0);
        engine.set_clouds(2.0);
        engine.set_temperature(80.0);
        let c = engine.weather().conditions();
        assert_eq!(c.wind_speed(), 30.0);
        assert_eq!(c.cloud_cover(), 1.0);
        assert_eq!(c.temperature(), 50.0);

        engine.set_industrial(false);
        assert!(!engine.info().industrial_enabled);
    }

    #[test]
    fn info_describes_plant() {
        let engine = steady_engine(&ScenarioConfig::baseline());
        let info = engine.info();
        assert_eq!(info.wind_capacity_mw, 450.0);
        assert_eq!(info.solar_capacity_mw, 200.0);
        assert_eq!(info.battery_capacity_mwh, 400.0);
        assert_eq!(info.gas_capacity_mw, 300.0);
        assert_eq!(info.tick_minutes, 15.0);
        assert_eq!(info.simulation_day, 1);
    }
}
