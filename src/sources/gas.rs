use tracing::info;

use crate::sources::types::{DispatchableGenerator, capacity_factor};

/// A ramp-limited natural gas backup plant.
///
/// Tracks fuel cost, CO₂ emissions, runtime and how often it was started from
/// standby. Counters only accumulate while output is positive.
#[derive(Debug, Clone)]
pub struct GasSource {
    capacity_mw: f64,
    fuel_cost_eur_per_mwh: f64,
    co2_t_per_mwh: f64,
    ramp_mw_per_min: f64,
    output_mw: f64,
    runtime_hours: f64,
    fuel_cost_eur: f64,
    co2_t: f64,
    activation_count: u32,
}

impl GasSource {
    /// Creates a gas plant at zero output.
    ///
    /// # Arguments
    ///
    /// * `capacity_mw` - Maximum output in MW (must be > 0)
    /// * `fuel_cost_eur_per_mwh` - Fuel cost per MWh generated
    /// * `co2_t_per_mwh` - Emissions in tonnes per MWh generated
    /// * `ramp_mw_per_min` - Maximum change of output per minute
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive or any rate is negative.
    pub fn new(
        capacity_mw: f64,
        fuel_cost_eur_per_mwh: f64,
        co2_t_per_mwh: f64,
        ramp_mw_per_min: f64,
    ) -> Self {
        assert!(capacity_mw > 0.0);
        assert!(fuel_cost_eur_per_mwh >= 0.0);
        assert!(co2_t_per_mwh >= 0.0);
        assert!(ramp_mw_per_min >= 0.0);

        Self {
            capacity_mw,
            fuel_cost_eur_per_mwh,
            co2_t_per_mwh,
            ramp_mw_per_min,
            output_mw: 0.0,
            runtime_hours: 0.0,
            fuel_cost_eur: 0.0,
            co2_t: 0.0,
            activation_count: 0,
        }
    }

    pub fn capacity_mw(&self) -> f64 {
        self.capacity_mw
    }

    pub fn ramp_mw_per_min(&self) -> f64 {
        self.ramp_mw_per_min
    }

    pub fn is_running(&self) -> bool {
        self.output_mw > 0.0
    }

    /// Current output as a percentage of capacity.
    pub fn capacity_factor(&self) -> f64 {
        capacity_factor(self.output_mw, self.capacity_mw)
    }

    /// Hours spent at positive output.
    pub fn runtime_hours(&self) -> f64 {
        self.runtime_hours
    }

    /// Cumulative fuel cost in EUR.
    pub fn fuel_cost_eur(&self) -> f64 {
        self.fuel_cost_eur
    }

    /// Cumulative emissions in tonnes of CO₂.
    pub fn co2_t(&self) -> f64 {
        self.co2_t
    }

    /// Number of transitions from zero to positive output.
    pub fn activation_count(&self) -> u32 {
        self.activation_count
    }
}

impl DispatchableGenerator for GasSource {
    fn set_output(&mut self, target_mw: f64, duration_h: f64) -> f64 {
        let target_mw = if target_mw.is_finite() {
            target_mw.clamp(0.0, self.capacity_mw)
        } else {
            0.0
        };
        let max_change = self.ramp_mw_per_min * duration_h * 60.0;

        let actual_mw = if target_mw > self.output_mw {
            target_mw.min(self.output_mw + max_change)
        } else {
            target_mw.max(self.output_mw - max_change)
        };

        if self.output_mw == 0.0 && actual_mw > 0.0 {
            self.activation_count += 1;
            info!(
                activation = self.activation_count,
                output_mw = actual_mw,
                "gas plant started"
            );
        }
        self.output_mw = actual_mw;

        if actual_mw > 0.0 {
            let energy_mwh = actual_mw * duration_h;
            self.runtime_hours += duration_h;
            self.fuel_cost_eur += energy_mwh * self.fuel_cost_eur_per_mwh;
            self.co2_t += energy_mwh * self.co2_t_per_mwh;
        }

        actual_mw
    }

    fn shutdown(&mut self) {
        self.output_mw = 0.0;
    }

    fn output_mw(&self) -> f64 {
        self.output_mw
    }
}
