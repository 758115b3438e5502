use crate::sources::types::DispatchableStore;

/// Charge fraction at or above which the battery reports full.
const FULL_THRESHOLD: f64 = 0.99;
/// Charge fraction at or below which the battery reports empty.
const EMPTY_THRESHOLD: f64 = 0.05;

/// A grid-scale battery energy storage system.
///
/// `BatterySource` models a store with fixed energy capacity, separate charge and
/// discharge rate limits and a single efficiency applied on the way in and on the
/// way out. Stored energy only changes through [`DispatchableStore::charge`] and
/// [`DispatchableStore::discharge`].
///
/// # Power Convention
/// - `charge` returns the grid-side power drawn (positive MW)
/// - `discharge` returns the grid-side power delivered (positive MW)
#[derive(Debug, Clone)]
pub struct BatterySource {
    capacity_mwh: f64,
    max_charge_mw: f64,
    max_discharge_mw: f64,
    efficiency: f64,
    charge_mwh: f64,
    cycles: f64,
}

impl BatterySource {
    /// Creates a new battery.
    ///
    /// # Arguments
    ///
    /// * `capacity_mwh` - Energy capacity in MWh (must be > 0)
    /// * `initial_charge_mwh` - Starting stored energy, within `[0, capacity_mwh]`
    /// * `max_charge_mw` - Maximum charging power in MW
    /// * `max_discharge_mw` - Maximum discharging power in MW
    /// * `efficiency` - Conversion efficiency in `(0, 1]`
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive, initial charge is out of range,
    /// rates are negative, or efficiency is invalid.
    pub fn new(
        capacity_mwh: f64,
        initial_charge_mwh: f64,
        max_charge_mw: f64,
        max_discharge_mw: f64,
        efficiency: f64,
    ) -> Self {
        assert!(capacity_mwh > 0.0);
        assert!((0.0..=capacity_mwh).contains(&initial_charge_mwh));
        assert!(max_charge_mw >= 0.0 && max_discharge_mw >= 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        Self {
            capacity_mwh,
            max_charge_mw,
            max_discharge_mw,
            efficiency,
            charge_mwh: initial_charge_mwh,
            cycles: 0.0,
        }
    }

    pub fn capacity_mwh(&self) -> f64 {
        self.capacity_mwh
    }

    pub fn max_charge_mw(&self) -> f64 {
        self.max_charge_mw
    }

    pub fn max_discharge_mw(&self) -> f64 {
        self.max_discharge_mw
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Stored energy in MWh.
    pub fn charge_mwh(&self) -> f64 {
        self.charge_mwh
    }

    /// Stored energy as a percentage of capacity.
    pub fn charge_percent(&self) -> f64 {
        self.charge_mwh / self.capacity_mwh * 100.0
    }

    /// Equivalent full cycles: total energy moved divided by capacity.
    pub fn cycles(&self) -> f64 {
        self.cycles
    }

    /// `true` at or above 99% of capacity.
    pub fn is_full(&self) -> bool {
        self.charge_mwh >= self.capacity_mwh * FULL_THRESHOLD
    }

    /// `true` at or below 5% of capacity.
    pub fn is_empty(&self) -> bool {
        self.charge_mwh <= self.capacity_mwh * EMPTY_THRESHOLD
    }
}

impl DispatchableStore for BatterySource {
    fn charge(&mut self, power_mw: f64, duration_h: f64) -> f64 {
        if duration_h <= 0.0 || !power_mw.is_finite() {
            return 0.0;
        }
        let power_mw = power_mw.clamp(0.0, self.max_charge_mw);

        // Losses are taken on the way in.
        let headroom = self.capacity_mwh - self.charge_mwh;
        let energy_in = (power_mw * duration_h * self.efficiency).min(headroom.max(0.0));

        self.charge_mwh = (self.charge_mwh + energy_in).min(self.capacity_mwh);
        self.cycles += energy_in / self.capacity_mwh;

        energy_in / (duration_h * self.efficiency)
    }

    fn discharge(&mut self, power_mw: f64, duration_h: f64) -> f64 {
        if duration_h <= 0.0 || !power_mw.is_finite() {
            return 0.0;
        }
        let power_mw = power_mw.clamp(0.0, self.max_discharge_mw);

        // Energy drawn from storage to deliver `power_mw` after losses.
        let energy_out = (power_mw * duration_h / self.efficiency).min(self.charge_mwh);

        self.charge_mwh = (self.charge_mwh - energy_out).max(0.0);
        self.cycles += energy_out / self.capacity_mwh;

        energy_out * self.efficiency / duration_h
    }
}
