//! Grid state snapshot produced once per tick.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::controller::{BalanceMode, BalanceResult};
use super::demand::DemandBreakdown;
use super::metrics::MetricsSummary;
use super::weather::WeatherConditions;
use crate::sources::types::{
    DispatchableGenerator, OperationalStatus, SolarStatus, SourceOutput, WindStatus,
    capacity_factor,
};
use crate::sources::{BatterySource, GasSource, SolarSource, WindSource};

/// Weather at the time of the snapshot, with the hour of day it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub wind_speed: f64,
    pub cloud_cover: f64,
    pub temperature: f64,
    pub time_of_day: f64,
}

impl WeatherSnapshot {
    pub fn capture(conditions: &WeatherConditions, time_of_day: f64) -> Self {
        Self {
            wind_speed: conditions.wind_speed(),
            cloud_cover: conditions.cloud_cover(),
            temperature: conditions.temperature(),
            time_of_day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindSnapshot {
    pub num_turbines: u32,
    pub turbine_rating_mw: f64,
    pub capacity_mw: f64,
    pub output_mw: f64,
    pub status: WindStatus,
    pub operational_status: OperationalStatus,
    pub capacity_factor_pct: f64,
}

impl WindSnapshot {
    pub fn capture(source: &WindSource, output: SourceOutput<WindStatus>) -> Self {
        let capacity_mw = source.capacity_mw();
        Self {
            num_turbines: source.num_turbines,
            turbine_rating_mw: source.turbine_rating_mw,
            capacity_mw,
            output_mw: output.power_mw,
            status: output.status,
            operational_status: OperationalStatus::from_output(output.power_mw),
            capacity_factor_pct: capacity_factor(output.power_mw, capacity_mw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarSnapshot {
    pub capacity_mw: f64,
    pub output_mw: f64,
    pub status: SolarStatus,
    pub operational_status: OperationalStatus,
    pub capacity_factor_pct: f64,
}

impl SolarSnapshot {
    pub fn capture(source: &SolarSource, output: SourceOutput<SolarStatus>) -> Self {
        Self {
            capacity_mw: source.capacity_mw,
            output_mw: output.power_mw,
            status: output.status,
            operational_status: OperationalStatus::from_output(output.power_mw),
            capacity_factor_pct: capacity_factor(output.power_mw, source.capacity_mw),
        }
    }
}

/// Battery state after the tick. `output_mw` is signed: positive while
/// discharging, negative while charging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatterySnapshot {
    /// Discharge rate limit in MW.
    pub rate_capacity_mw: f64,
    pub capacity_mwh: f64,
    pub charge_mwh: f64,
    pub charge_pct: f64,
    pub output_mw: f64,
    pub cycles: f64,
    pub is_charging: bool,
    pub is_discharging: bool,
    pub is_full: bool,
    pub is_empty: bool,
    pub operational_status: OperationalStatus,
}

impl BatterySnapshot {
    pub fn capture(battery: &BatterySource, output_mw: f64) -> Self {
        Self {
            rate_capacity_mw: battery.max_discharge_mw(),
            capacity_mwh: battery.capacity_mwh(),
            charge_mwh: battery.charge_mwh(),
            charge_pct: battery.charge_percent(),
            output_mw,
            cycles: battery.cycles(),
            is_charging: output_mw < 0.0,
            is_discharging: output_mw > 0.0,
            is_full: battery.is_full(),
            is_empty: battery.is_empty(),
            operational_status: OperationalStatus::Online,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasSnapshot {
    pub capacity_mw: f64,
    pub output_mw: f64,
    pub operational_status: OperationalStatus,
    pub is_running: bool,
    pub capacity_factor_pct: f64,
    pub activation_count: u32,
    pub runtime_hours: f64,
    pub fuel_cost_eur: f64,
    pub co2_t: f64,
}

impl GasSnapshot {
    pub fn capture(gas: &GasSource) -> Self {
        Self {
            capacity_mw: gas.capacity_mw(),
            output_mw: gas.output_mw(),
            operational_status: OperationalStatus::from_output(gas.output_mw()),
            is_running: gas.is_running(),
            capacity_factor_pct: gas.capacity_factor(),
            activation_count: gas.activation_count(),
            runtime_hours: gas.runtime_hours(),
            fuel_cost_eur: gas.fuel_cost_eur(),
            co2_t: gas.co2_t(),
        }
    }
}

/// Instantaneous grid-wide quantities for the tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridBalance {
    /// Wind + solar + signed battery + dispatched gas. Equals demand + balance.
    pub total_generation_mw: f64,
    /// Wind + solar + battery discharge.
    pub total_renewable_mw: f64,
    /// Supply minus demand after dispatch.
    pub balance_mw: f64,
    /// Instantaneous renewable share of supply (percent).
    pub renewable_share_pct: f64,
    pub stable: bool,
    pub gas_active: bool,
    pub mode: BalanceMode,
}

impl GridBalance {
    pub fn from_result(result: &BalanceResult) -> Self {
        let discharge = result.battery_mw.max(0.0);
        Self {
            total_generation_mw: result.total_supply_mw,
            total_renewable_mw: result.wind_mw + result.solar_mw + discharge,
            balance_mw: result.balance_mw,
            renewable_share_pct: result.renewable_share_pct,
            stable: result.stable,
            gas_active: result.gas_active,
            mode: result.mode,
        }
    }
}

/// Public snapshot of one tick. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridState {
    /// Wall-clock time the snapshot was assembled.
    pub timestamp: DateTime<Utc>,
    /// Tick index since the last reset (0-based).
    pub tick: u64,
    pub simulation_day: u32,
    pub weather: WeatherSnapshot,
    pub demand: DemandBreakdown,
    pub wind: WindSnapshot,
    pub solar: SolarSnapshot,
    pub battery: BatterySnapshot,
    pub gas: GasSnapshot,
    pub grid: GridBalance,
    pub metrics: MetricsSummary,
}

impl GridState {
    /// Hour of day at which the tick was computed.
    pub fn time_of_day(&self) -> f64 {
        self.weather.time_of_day
    }

    /// Total demand in MW.
    pub fn total_demand_mw(&self) -> f64 {
        self.demand.total_mw
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} d{} {:>5.2}h | demand={:>6.1} wind={:>6.1} solar={:>6.1} bat={:>7.1} ({:>5.1}%) gas={:>6.1} | bal={:>7.1} {}",
            self.tick,
            self.simulation_day,
            self.weather.time_of_day,
            self.demand.total_mw,
            self.wind.output_mw,
            self.solar.output_mw,
            self.battery.output_mw,
            self.battery.charge_pct,
            self.gas.output_mw,
            self.grid.balance_mw,
            if self.grid.stable { "ok" } else { "SHORT" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::types::DispatchableStore;

    #[test]
    fn battery_snapshot_flags_follow_action_sign() {
        let mut battery = BatterySource::new(400.0, 200.0, 100.0, 100.0, 0.95);
        let drawn = battery.charge(80.0, 0.25);
        let snap = BatterySnapshot::capture(&battery, -drawn);
        assert!(snap.is_charging);
        assert!(!snap.is_discharging);
        assert_eq!(snap.rate_capacity_mw, 100.0);
        assert_eq!(snap.operational_status, OperationalStatus::Online);

        let idle = BatterySnapshot::capture(&battery, 0.0);
        assert!(!idle.is_charging && !idle.is_discharging);
    }

    #[test]
    fn wind_snapshot_reports_capacity_factor() {
        let farm = WindSource::new(50, 9.0);
        let snap = WindSnapshot::capture(&farm, farm.calculate(15.0));
        assert_eq!(snap.capacity_mw, 450.0);
        assert_eq!(snap.capacity_factor_pct, 100.0);
        assert_eq!(snap.operational_status, OperationalStatus::Online);

        let calm = WindSnapshot::capture(&farm, farm.calculate(1.0));
        assert_eq!(calm.operational_status, OperationalStatus::Standby);
        assert_eq!(calm.status, WindStatus::InsufficientWind);
    }

    #[test]
    fn grid_balance_counts_discharge_as_renewable() {
        let result = BalanceResult {
            demand_mw: 500.0,
            wind_mw: 200.0,
            solar_mw: 100.0,
            battery_mw: 80.0,
            gas_mw: 120.0,
            total_supply_mw: 500.0,
            balance_mw: 0.0,
            renewable_share_pct: 76.0,
            stable: true,
            gas_active: true,
            mode: BalanceMode::DeficitBatteryPlusGas,
        };
        let grid = GridBalance::from_result(&result);
        assert_eq!(grid.total_renewable_mw, 380.0);
        assert_eq!(grid.total_generation_mw, 500.0);
    }

    #[test]
    fn grid_balance_nets_charging_draw_out_of_generation() {
        let result = BalanceResult {
            demand_mw: 350.0,
            wind_mw: 450.0,
            solar_mw: 152.0,
            battery_mw: -100.0,
            gas_mw: 0.0,
            total_supply_mw: 502.0,
            balance_mw: 152.0,
            renewable_share_pct: 100.0,
            stable: true,
            gas_active: false,
            mode: BalanceMode::SurplusCharging,
        };
        let grid = GridBalance::from_result(&result);
        assert_eq!(grid.total_renewable_mw, 602.0);
        assert_eq!(grid.total_generation_mw, 502.0);
        assert_eq!(grid.total_generation_mw - result.demand_mw, grid.balance_mw);
    }
}
