use std::f64::consts::PI;

use serde::Serialize;

/// Residential scaling applied overnight.
const NIGHT_FACTOR: f64 = 0.6;
/// Heating load per °C below [`HEATING_BELOW_C`] (MW).
const HEATING_MW_PER_C: f64 = 3.0;
const HEATING_BELOW_C: f64 = 10.0;
const HEATING_CAP_MW: f64 = 50.0;
/// Cooling load per °C above [`COOLING_ABOVE_C`] (MW).
const COOLING_MW_PER_C: f64 = 2.0;
const COOLING_ABOVE_C: f64 = 20.0;
const COOLING_CAP_MW: f64 = 30.0;

/// Demand split into its three components. `total_mw` is always their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandBreakdown {
    pub base_load_mw: f64,
    pub industrial_load_mw: f64,
    pub heating_cooling_mw: f64,
    pub total_mw: f64,
}

impl DemandBreakdown {
    fn new(base_load_mw: f64, industrial_load_mw: f64, heating_cooling_mw: f64) -> Self {
        Self {
            base_load_mw,
            industrial_load_mw,
            heating_cooling_mw,
            total_mw: base_load_mw + industrial_load_mw + heating_cooling_mw,
        }
    }
}

/// Grid demand as a function of time of day and temperature.
///
/// Residential load follows a double peak (morning and evening) with an overnight
/// trough, an industrial block can be switched on and off at runtime, and
/// heating or cooling load is added during waking hours.
///
/// # Examples
///
/// ```
/// use grid_sim::sim::demand::DemandModel;
///
/// let demand = DemandModel::new(300.0, 1.5, 50.0, true);
/// let night = demand.calculate(3.0, 15.0);
/// assert_eq!(night.base_load_mw, 180.0);
/// assert_eq!(night.total_mw, 230.0);
/// ```
#[derive(Debug, Clone)]
pub struct DemandModel {
    base_load_mw: f64,
    peak_multiplier: f64,
    industrial_load_mw: f64,
    industrial_enabled: bool,
}

impl DemandModel {
    /// Creates a demand model.
    ///
    /// # Panics
    ///
    /// Panics if a load is negative or `peak_multiplier` is below 1.
    pub fn new(
        base_load_mw: f64,
        peak_multiplier: f64,
        industrial_load_mw: f64,
        industrial_enabled: bool,
    ) -> Self {
        assert!(base_load_mw >= 0.0);
        assert!(peak_multiplier >= 1.0);
        assert!(industrial_load_mw >= 0.0);
        Self {
            base_load_mw,
            peak_multiplier,
            industrial_load_mw,
            industrial_enabled,
        }
    }

    /// Residential load outside peaks and night hours (MW).
    pub fn base_load_mw(&self) -> f64 {
        self.base_load_mw
    }

    /// Residential load multiplier at the top of a peak.
    pub fn peak_multiplier(&self) -> f64 {
        self.peak_multiplier
    }

    /// Flat industrial load when enabled (MW).
    pub fn industrial_load_mw(&self) -> f64 {
        self.industrial_load_mw
    }

    pub fn industrial_enabled(&self) -> bool {
        self.industrial_enabled
    }

    /// Switches the industrial block on or off.
    pub fn set_industrial(&mut self, enabled: bool) {
        self.industrial_enabled = enabled;
    }

    /// Demand breakdown at `time_of_day` (hours) and `temperature` (°C).
    pub fn calculate(&self, time_of_day: f64, temperature: f64) -> DemandBreakdown {
        let industrial = if self.industrial_enabled {
            self.industrial_load_mw
        } else {
            0.0
        };
        DemandBreakdown::new(
            self.residential(time_of_day),
            industrial,
            heating_cooling(time_of_day, temperature),
        )
    }

    fn residential(&self, hour: f64) -> f64 {
        let morning = if (6.0..10.0).contains(&hour) {
            ((hour - 8.0) * PI / 12.0).sin()
        } else {
            0.0
        };
        let evening = if (16.0..22.0).contains(&hour) {
            ((hour - 18.0) * PI / 12.0).sin()
        } else {
            0.0
        };
        let peak = morning.max(evening).max(0.0);
        let variation = (self.peak_multiplier - 1.0) * peak;

        let night = if hour < 6.0 || hour >= 23.0 {
            NIGHT_FACTOR
        } else {
            1.0
        };

        self.base_load_mw * night * (1.0 + variation)
    }
}

/// Temperature-driven load, only between 06:00 and 22:00.
fn heating_cooling(hour: f64, temperature: f64) -> f64 {
    if !(6.0..22.0).contains(&hour) {
        return 0.0;
    }
    if temperature < HEATING_BELOW_C {
        ((HEATING_BELOW_C - temperature) * HEATING_MW_PER_C).min(HEATING_CAP_MW)
    } else if temperature > COOLING_ABOVE_C {
        ((temperature - COOLING_ABOVE_C) * COOLING_MW_PER_C).min(COOLING_CAP_MW)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DemandModel {
        DemandModel::new(300.0, 1.5, 50.0, true)
    }

    #[test]
    fn test_accessors_report_construction_values() {
        let m = model();
        assert_eq!(m.base_load_mw(), 300.0);
        assert_eq!(m.peak_multiplier(), 1.5);
        assert_eq!(m.industrial_load_mw(), 50.0);
        assert!(m.industrial_enabled());
    }

    #[test]
    fn test_night_trough() {
        let d = model().calculate(3.0, 15.0);
        assert_eq!(d.base_load_mw, 180.0);
        assert_eq!(d.heating_cooling_mw, 0.0);
        assert_eq!(d.total_mw, 230.0);

        let late = model().calculate(23.5, 0.0);
        assert_eq!(late.base_load_mw, 180.0);
        assert_eq!(late.heating_cooling_mw, 0.0);
    }

    #[test]
    fn test_evening_peak() {
        // sin(pi/6) = 0.5 at 20:00 -> 1 + 0.5 * 0.5
        let d = model().calculate(20.0, 15.0);
        assert!((d.base_load_mw - 375.0).abs() < 1e-9);
    }

    #[test]
    fn test_morning_window_is_half_open() {
        let m = model();
        let inside = m.calculate(9.5, 15.0).base_load_mw;
        assert!(inside > 300.0);
        assert_eq!(m.calculate(10.0, 15.0).base_load_mw, 300.0);
        // Before 08:00 the morning sine is negative and floored at zero.
        assert_eq!(m.calculate(7.0, 15.0).base_load_mw, 300.0);
    }

    #[test]
    fn test_heating_and_cooling() {
        let m = model();
        assert_eq!(m.calculate(12.0, 5.0).heating_cooling_mw, 15.0);
        assert_eq!(m.calculate(12.0, -20.0).heating_cooling_mw, 50.0);
        assert_eq!(m.calculate(12.0, 28.0).heating_cooling_mw, 16.0);
        assert_eq!(m.calculate(12.0, 40.0).heating_cooling_mw, 30.0);
        assert_eq!(m.calculate(12.0, 15.0).heating_cooling_mw, 0.0);
        assert_eq!(m.calculate(22.0, -20.0).heating_cooling_mw, 0.0);
        assert_eq!(m.calculate(5.9, 40.0).heating_cooling_mw, 0.0);
    }

    #[test]
    fn test_industrial_toggle() {
        let mut m = model();
        assert_eq!(m.calculate(12.0, 15.0).industrial_load_mw, 50.0);
        m.set_industrial(false);
        assert!(!m.industrial_enabled());
        assert_eq!(m.calculate(12.0, 15.0).industrial_load_mw, 0.0);
    }

    #[test]
    fn test_total_is_sum_and_non_negative() {
        let m = model();
        for quarter in 0..96 {
            for temperature in [-30.0, -5.0, 10.0, 20.0, 35.0, 50.0] {
                let d = m.calculate(f64::from(quarter) * 0.25, temperature);
                let sum = d.base_load_mw + d.industrial_load_mw + d.heating_cooling_mw;
                assert_eq!(d.total_mw, sum);
                assert!(d.total_mw >= 0.0);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_peak_multiplier_below_one_panics() {
        DemandModel::new(300.0, 0.9, 50.0, true);
    }
}
