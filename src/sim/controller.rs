//! Per-tick supply/demand balancing policy.

use serde::Serialize;

use crate::sources::types::{DispatchableGenerator, DispatchableStore};

/// Residual deficit (MW) below which gas is not dispatched.
pub const DEFAULT_GAS_TOLERANCE_MW: f64 = 0.1;

/// Rounding slack when comparing supply against demand.
const STABILITY_EPSILON_MW: f64 = 1e-9;

/// Which branch of the balancing policy a tick took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
    /// Renewables exceed demand; the surplus charges the store.
    SurplusCharging,
    /// The store covers the deficit (within tolerance).
    DeficitBatteryOnly,
    /// The store falls short and gas is dispatched for the remainder.
    DeficitBatteryPlusGas,
}

/// Instantaneous, non-dispatchable inputs to one balancing step.
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    pub demand_mw: f64,
    pub wind_mw: f64,
    pub solar_mw: f64,
    /// Tick length in hours.
    pub duration_h: f64,
}

/// Outcome of one balancing step.
///
/// `battery_mw` is signed: positive for net discharge, negative for charging draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceResult {
    pub demand_mw: f64,
    pub wind_mw: f64,
    pub solar_mw: f64,
    pub battery_mw: f64,
    pub gas_mw: f64,
    pub total_supply_mw: f64,
    /// Total supply minus demand.
    pub balance_mw: f64,
    /// Share of supply from wind, solar and battery discharge (percent).
    pub renewable_share_pct: f64,
    /// `true` when total supply covers demand.
    pub stable: bool,
    pub gas_active: bool,
    pub mode: BalanceMode,
}

impl BalanceResult {
    /// Unmet demand in MW, zero when stable.
    pub fn shortfall_mw(&self) -> f64 {
        (self.demand_mw - self.total_supply_mw).max(0.0)
    }
}

/// Renewables-first balancing: surplus charges the store, deficits drain the
/// store first and dispatch gas for what remains.
///
/// The controller holds no state between ticks; any hysteresis comes from the
/// store's charge level and the generator's ramp limits.
///
/// Gas is left untouched on surplus ticks, so a running plant keeps its output
/// until the next deficit tick commands it down.
#[derive(Debug, Clone, Copy)]
pub struct GridController {
    pub gas_tolerance_mw: f64,
}

impl Default for GridController {
    fn default() -> Self {
        Self {
            gas_tolerance_mw: DEFAULT_GAS_TOLERANCE_MW,
        }
    }
}

impl GridController {
    /// Balances one tick, mutating `store` and `generator`.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Demand, renewable output and tick length
    /// * `store` - Battery or any other [`DispatchableStore`]
    /// * `generator` - Gas plant or any other [`DispatchableGenerator`]
    ///
    /// # Returns
    ///
    /// The [`BalanceResult`] for this tick
    pub fn balance<S, G>(&self, inputs: &TickInputs, store: &mut S, generator: &mut G) -> BalanceResult
    where
        S: DispatchableStore + ?Sized,
        G: DispatchableGenerator + ?Sized,
    {
        let renewable_mw = inputs.wind_mw + inputs.solar_mw;
        let net_mw = renewable_mw - inputs.demand_mw;

        let (battery_mw, gas_mw, mode) = if net_mw > 0.0 {
            let drawn = store.charge(net_mw, inputs.duration_h);
            (-drawn, 0.0, BalanceMode::SurplusCharging)
        } else {
            let deficit = -net_mw;
            let delivered = store.discharge(deficit, inputs.duration_h);
            let remaining = deficit - delivered;
            if remaining > self.gas_tolerance_mw {
                let gas = generator.set_output(remaining, inputs.duration_h);
                (delivered, gas, BalanceMode::DeficitBatteryPlusGas)
            } else {
                generator.set_output(0.0, inputs.duration_h);
                (delivered, 0.0, BalanceMode::DeficitBatteryOnly)
            }
        };

        let total_supply_mw = renewable_mw + battery_mw + gas_mw;
        let renewable_share_pct = if total_supply_mw > 0.0 {
            (renewable_mw + battery_mw.max(0.0)) / total_supply_mw * 100.0
        } else {
            0.0
        };

        BalanceResult {
            demand_mw: inputs.demand_mw,
            wind_mw: inputs.wind_mw,
            solar_mw: inputs.solar_mw,
            battery_mw,
            gas_mw,
            total_supply_mw,
            balance_mw: total_supply_mw - inputs.demand_mw,
            renewable_share_pct,
            stable: total_supply_mw + STABILITY_EPSILON_MW >= inputs.demand_mw,
            gas_active: mode == BalanceMode::DeficitBatteryPlusGas,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{BatterySource, GasSource};

    /// Store that records requests and grants a fixed fraction of them.
    struct RecordingStore {
        grant: f64,
        charges: Vec<f64>,
        discharges: Vec<f64>,
    }

    impl RecordingStore {
        fn granting(grant: f64) -> Self {
            Self {
                grant,
                charges: Vec::new(),
                discharges: Vec::new(),
            }
        }
    }

    impl DispatchableStore for RecordingStore {
        fn charge(&mut self, power_mw: f64, _duration_h: f64) -> f64 {
            self.charges.push(power_mw);
            power_mw * self.grant
        }

        fn discharge(&mut self, power_mw: f64, _duration_h: f64) -> f64 {
            self.discharges.push(power_mw);
            power_mw * self.grant
        }
    }

    /// Generator with no ramp limit that records every target.
    #[derive(Default)]
    struct RecordingGenerator {
        output: f64,
        targets: Vec<f64>,
    }

    impl DispatchableGenerator for RecordingGenerator {
        fn set_output(&mut self, target_mw: f64, _duration_h: f64) -> f64 {
            self.targets.push(target_mw);
            self.output = target_mw;
            target_mw
        }

        fn shutdown(&mut self) {
            self.output = 0.0;
        }

        fn output_mw(&self) -> f64 {
            self.output
        }
    }

    fn inputs(demand_mw: f64, wind_mw: f64, solar_mw: f64) -> TickInputs {
        TickInputs {
            demand_mw,
            wind_mw,
            solar_mw,
            duration_h: 0.25,
        }
    }

    #[test]
    fn surplus_charges_store_and_leaves_gas_alone() {
        let mut store = RecordingStore::granting(1.0);
        let mut gas = RecordingGenerator {
            output: 80.0,
            targets: Vec::new(),
        };
        let result = GridController::default().balance(&inputs(400.0, 500.0, 50.0), &mut store, &mut gas);

        assert_eq!(store.charges, vec![150.0]);
        assert_eq!(result.battery_mw, -150.0);
        assert_eq!(result.gas_mw, 0.0);
        assert!(gas.targets.is_empty());
        assert_eq!(gas.output_mw(), 80.0);
        assert_eq!(result.mode, BalanceMode::SurplusCharging);
        assert_eq!(result.total_supply_mw, 400.0);
        assert!(result.stable);
        // Charging draw does not reduce the renewable numerator.
        assert!((result.renewable_share_pct - 550.0 / 400.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn deficit_covered_by_store() {
        let mut store = RecordingStore::granting(1.0);
        let mut gas = RecordingGenerator::default();
        let result = GridController::default().balance(&inputs(450.0, 300.0, 50.0), &mut store, &mut gas);

        assert_eq!(store.discharges, vec![100.0]);
        assert_eq!(result.battery_mw, 100.0);
        assert_eq!(gas.targets, vec![0.0]);
        assert_eq!(result.mode, BalanceMode::DeficitBatteryOnly);
        assert!(!result.gas_active);
        assert!(result.stable);
        assert_eq!(result.renewable_share_pct, 100.0);
    }

    #[test]
    fn empty_store_dispatches_gas_for_full_deficit() {
        let mut store = RecordingStore::granting(0.0);
        let mut gas = RecordingGenerator::default();
        let result = GridController::default().balance(&inputs(450.0, 50.0, 0.0), &mut store, &mut gas);

        assert_eq!(gas.targets, vec![400.0]);
        assert_eq!(result.gas_mw, 400.0);
        assert!(result.gas_active);
        assert_eq!(result.mode, BalanceMode::DeficitBatteryPlusGas);
        assert!(result.stable);
        assert!((result.renewable_share_pct - 50.0 / 450.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn gas_clamped_to_capacity_reports_shortfall() {
        let mut battery = BatterySource::new(400.0, 0.0, 100.0, 100.0, 0.95);
        // Fast ramp so only the capacity limit binds.
        let mut gas = GasSource::new(300.0, 150.0, 0.5, 100.0);
        let result = GridController::default().balance(&inputs(450.0, 50.0, 0.0), &mut battery, &mut gas);

        assert_eq!(result.battery_mw, 0.0);
        assert_eq!(result.gas_mw, 300.0);
        assert!(!result.stable);
        assert_eq!(result.shortfall_mw(), 100.0);
        assert_eq!(result.balance_mw, -100.0);
    }

    #[test]
    fn residual_within_tolerance_skips_gas() {
        // Store covers all but 0.05 MW.
        let mut store = RecordingStore::granting(1.0 - 0.05 / 100.0);
        let mut gas = RecordingGenerator::default();
        let result = GridController::default().balance(&inputs(100.0, 0.0, 0.0), &mut store, &mut gas);

        assert_eq!(gas.targets, vec![0.0]);
        assert_eq!(result.mode, BalanceMode::DeficitBatteryOnly);
        assert!(!result.stable);
    }

    #[test]
    fn zero_supply_has_zero_renewable_share() {
        let mut store = RecordingStore::granting(0.0);
        let mut gas = RecordingGenerator::default();
        let result = GridController {
            gas_tolerance_mw: 1_000.0,
        }
        .balance(&inputs(100.0, 0.0, 0.0), &mut store, &mut gas);

        assert_eq!(result.total_supply_mw, 0.0);
        assert_eq!(result.renewable_share_pct, 0.0);
        assert!(!result.stable);
    }

    #[test]
    fn exact_balance_takes_deficit_branch() {
        let mut store = RecordingStore::granting(1.0);
        let mut gas = RecordingGenerator::default();
        let result = GridController::default().balance(&inputs(200.0, 150.0, 50.0), &mut store, &mut gas);

        assert_eq!(store.discharges, vec![0.0]);
        assert_eq!(result.mode, BalanceMode::DeficitBatteryOnly);
        assert!(result.stable);
    }
}
