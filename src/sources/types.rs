//! Capability traits and status enumerations shared by the energy sources.

use std::fmt;

use serde::Serialize;

/// An energy store the grid controller can charge and discharge.
///
/// Requests are never rejected: infeasible power or energy is silently clamped,
/// and the caller inspects the return value to detect a shortfall.
pub trait DispatchableStore {
    /// Draws up to `power_mw` from the grid for `duration_h` hours.
    ///
    /// # Returns
    ///
    /// Grid-side power actually drawn (MW), or 0 when `duration_h` is 0
    fn charge(&mut self, power_mw: f64, duration_h: f64) -> f64;

    /// Delivers up to `power_mw` to the grid for `duration_h` hours.
    ///
    /// # Returns
    ///
    /// Grid-side power actually delivered (MW), or 0 when `duration_h` is 0
    fn discharge(&mut self, power_mw: f64, duration_h: f64) -> f64;
}

/// A generator the grid controller can dispatch toward a target output.
pub trait DispatchableGenerator {
    /// Moves output toward `target_mw`, subject to capacity and ramp limits.
    ///
    /// # Returns
    ///
    /// Output actually achieved (MW)
    fn set_output(&mut self, target_mw: f64, duration_h: f64) -> f64;

    /// Forces output to zero immediately, bypassing ramp limits.
    fn shutdown(&mut self);

    /// Current output in MW.
    fn output_mw(&self) -> f64;
}

/// Instantaneous output of a non-dispatchable source with its status tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceOutput<S> {
    pub power_mw: f64,
    pub status: S,
}

/// Operating regime of a wind farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindStatus {
    /// Wind at or above cut-out; turbines feathered.
    ShutdownStorm,
    /// Wind below cut-in.
    InsufficientWind,
    /// Between cut-in and rated speed.
    Ramping,
    /// At or above rated speed, below cut-out.
    RatedPower,
}

impl WindStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindStatus::ShutdownStorm => "shutdown_storm",
            WindStatus::InsufficientWind => "insufficient_wind",
            WindStatus::Ramping => "ramping",
            WindStatus::RatedPower => "rated_power",
        }
    }
}

/// Sky condition reported by a solar array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarStatus {
    Nighttime,
    Clear,
    PartlyCloudy,
    Cloudy,
}

impl SolarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolarStatus::Nighttime => "nighttime",
            SolarStatus::Clear => "clear",
            SolarStatus::PartlyCloudy => "partly_cloudy",
            SolarStatus::Cloudy => "cloudy",
        }
    }
}

/// Coarse operational state reported for every source in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    Online,
    Offline,
    Maintenance,
    Standby,
}

impl OperationalStatus {
    /// `Online` when `power_mw` is positive, `Standby` otherwise.
    pub fn from_output(power_mw: f64) -> Self {
        if power_mw > 0.0 {
            OperationalStatus::Online
        } else {
            OperationalStatus::Standby
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Online => "online",
            OperationalStatus::Offline => "offline",
            OperationalStatus::Maintenance => "maintenance",
            OperationalStatus::Standby => "standby",
        }
    }
}

impl fmt::Display for WindStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SolarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output as a percentage of rated capacity; 0 for a zero-capacity source.
pub fn capacity_factor(output_mw: f64, capacity_mw: f64) -> f64 {
    if capacity_mw > 0.0 {
        output_mw / capacity_mw * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_serialize_snake_case() {
        assert_eq!(
            serialized_tag(&WindStatus::ShutdownStorm),
            "shutdown_storm".to_string()
        );
        assert_eq!(SolarStatus::PartlyCloudy.to_string(), "partly_cloudy");
        assert_eq!(OperationalStatus::Standby.to_string(), "standby");
    }

    #[test]
    fn operational_status_from_output() {
        assert_eq!(OperationalStatus::from_output(12.0), OperationalStatus::Online);
        assert_eq!(OperationalStatus::from_output(0.0), OperationalStatus::Standby);
    }

    #[test]
    fn capacity_factor_handles_zero_capacity() {
        assert_eq!(capacity_factor(150.0, 300.0), 50.0);
        assert_eq!(capacity_factor(10.0, 0.0), 0.0);
    }

    /// Serializes a unit enum through `toml`'s value serializer.
    fn serialized_tag<T: Serialize>(value: &T) -> String {
        match toml::Value::try_from(value) {
            Ok(toml::Value::String(s)) => s,
            other => panic!("unexpected serialization: {other:?}"),
        }
    }
}
