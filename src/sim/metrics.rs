//! Cumulative grid metrics and post-hoc run reporting.

use std::fmt;

use serde::Serialize;

use super::controller::BalanceResult;
use super::types::GridState;

/// Running totals since construction or the last reset.
///
/// Percentages are derived on read and never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeMetrics {
    /// Wind and solar energy produced (MWh). Battery discharge is excluded since
    /// that energy was counted when it was generated.
    pub renewable_mwh: f64,
    pub demand_mwh: f64,
    pub co2_kg: f64,
    pub cost_eur: f64,
    pub ticks: u64,
    pub stable_ticks: u64,
}

/// Gas plant cost and emissions incurred during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GasDelta {
    pub co2_t: f64,
    pub cost_eur: f64,
}

impl CumulativeMetrics {
    /// Folds one balanced tick into the totals.
    ///
    /// # Arguments
    ///
    /// * `result` - The tick's balance result
    /// * `duration_h` - Tick length in hours
    /// * `gas` - Cost and emissions the gas plant accrued during the tick
    pub fn record(&mut self, result: &BalanceResult, duration_h: f64, gas: GasDelta) {
        self.renewable_mwh += (result.wind_mw + result.solar_mw) * duration_h;
        self.demand_mwh += result.demand_mw * duration_h;
        self.co2_kg += gas.co2_t.max(0.0) * 1000.0;
        self.cost_eur += gas.cost_eur.max(0.0);
        self.ticks += 1;
        if result.stable {
            self.stable_ticks += 1;
        }
    }

    /// Renewable energy as a percentage of demand served; 0 before any demand.
    pub fn renewable_share_pct(&self) -> f64 {
        if self.demand_mwh > 0.0 {
            self.renewable_mwh / self.demand_mwh * 100.0
        } else {
            0.0
        }
    }

    /// Percentage of ticks with supply covering demand; 100 before the first tick.
    pub fn uptime_pct(&self) -> f64 {
        if self.ticks == 0 {
            return 100.0;
        }
        self.stable_ticks as f64 / self.ticks as f64 * 100.0
    }

    /// Point-in-time summary for a snapshot.
    pub fn summary(&self, gas_activation_count: u32, battery_cycles: f64) -> MetricsSummary {
        MetricsSummary {
            renewable_share_pct: self.renewable_share_pct(),
            co2_kg: self.co2_kg,
            cost_eur: self.cost_eur,
            uptime_pct: self.uptime_pct(),
            gas_activation_count,
            battery_cycles,
            total_renewable_mwh: self.renewable_mwh,
            total_demand_mwh: self.demand_mwh,
            total_ticks: self.ticks,
            stable_ticks: self.stable_ticks,
        }
    }
}

/// Cumulative metrics as carried in a [`GridState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub renewable_share_pct: f64,
    pub co2_kg: f64,
    pub cost_eur: f64,
    pub uptime_pct: f64,
    pub gas_activation_count: u32,
    pub battery_cycles: f64,
    pub total_renewable_mwh: f64,
    pub total_demand_mwh: f64,
    pub total_ticks: u64,
    pub stable_ticks: u64,
}

/// Aggregate indicators over a sequence of snapshots.
///
/// Computed post-hoc from `&[GridState]` so the report always agrees with the
/// recorded ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub ticks: usize,
    pub peak_demand_mw: f64,
    pub peak_gas_mw: f64,
    pub min_battery_pct: f64,
    pub max_battery_pct: f64,
    pub unstable_ticks: usize,
    /// Cumulative renewable share at the last snapshot (percent).
    pub renewable_share_pct: f64,
    pub co2_kg: f64,
    pub cost_eur: f64,
    pub gas_activation_count: u32,
    pub battery_cycles: f64,
}

impl RunReport {
    /// Builds a report from the snapshots of a run.
    ///
    /// # Returns
    ///
    /// A zeroed report when `states` is empty.
    pub fn from_states(states: &[GridState]) -> Self {
        let Some(last) = states.last() else {
            return Self {
                ticks: 0,
                peak_demand_mw: 0.0,
                peak_gas_mw: 0.0,
                min_battery_pct: 0.0,
                max_battery_pct: 0.0,
                unstable_ticks: 0,
                renewable_share_pct: 0.0,
                co2_kg: 0.0,
                cost_eur: 0.0,
                gas_activation_count: 0,
                battery_cycles: 0.0,
            };
        };

        let mut peak_demand = 0.0_f64;
        let mut peak_gas = 0.0_f64;
        let mut min_battery = f64::INFINITY;
        let mut max_battery = f64::NEG_INFINITY;
        let mut unstable = 0_usize;

        for s in states {
            peak_demand = peak_demand.max(s.demand.total_mw);
            peak_gas = peak_gas.max(s.gas.output_mw);
            min_battery = min_battery.min(s.battery.charge_pct);
            max_battery = max_battery.max(s.battery.charge_pct);
            if !s.grid.stable {
                unstable += 1;
            }
        }

        Self {
            ticks: states.len(),
            peak_demand_mw: peak_demand,
            peak_gas_mw: peak_gas,
            min_battery_pct: min_battery,
            max_battery_pct: max_battery,
            unstable_ticks: unstable,
            renewable_share_pct: last.metrics.renewable_share_pct,
            co2_kg: last.metrics.co2_kg,
            cost_eur: last.metrics.cost_eur,
            gas_activation_count: last.metrics.gas_activation_count,
            battery_cycles: last.metrics.battery_cycles,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ({} ticks) ---", self.ticks)?;
        writeln!(f, "Peak demand:           {:.1} MW", self.peak_demand_mw)?;
        writeln!(f, "Peak gas output:       {:.1} MW", self.peak_gas_mw)?;
        writeln!(
            f,
            "Battery charge range:  {:.1}% .. {:.1}% ({:.2} cycles)",
            self.min_battery_pct, self.max_battery_pct, self.battery_cycles
        )?;
        writeln!(f, "Renewable share:       {:.1}%", self.renewable_share_pct)?;
        writeln!(f, "CO2 emitted:           {:.1} kg", self.co2_kg)?;
        writeln!(f, "Operating cost:        EUR {:.2}", self.cost_eur)?;
        writeln!(f, "Gas activations:       {}", self.gas_activation_count)?;
        write!(f, "Unstable ticks:        {}", self.unstable_ticks)
    }
}
