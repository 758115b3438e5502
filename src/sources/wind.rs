use crate::sources::types::{SourceOutput, WindStatus};

/// Wind speed below which turbines produce nothing (m/s).
pub const CUT_IN_MS: f64 = 3.0;
/// Wind speed at which turbines reach rated power (m/s).
pub const RATED_MS: f64 = 12.0;
/// Wind speed at or above which turbines shut down (m/s).
pub const CUT_OUT_MS: f64 = 25.0;

/// A farm of identical wind turbines.
///
/// Output is a pure function of wind speed: zero below cut-in, a cubic ramp up
/// to rated speed, full capacity up to cut-out, and zero in storm conditions.
#[derive(Debug, Clone)]
pub struct WindSource {
    /// Number of turbines in the farm.
    pub num_turbines: u32,
    /// Rated power of a single turbine in MW.
    pub turbine_rating_mw: f64,
}

impl WindSource {
    /// Creates a wind farm.
    ///
    /// # Panics
    ///
    /// Panics if the turbine rating is not positive.
    pub fn new(num_turbines: u32, turbine_rating_mw: f64) -> Self {
        assert!(turbine_rating_mw > 0.0);
        Self {
            num_turbines,
            turbine_rating_mw,
        }
    }

    /// Total rated capacity of the farm in MW.
    pub fn capacity_mw(&self) -> f64 {
        f64::from(self.num_turbines) * self.turbine_rating_mw
    }

    /// Power output and operating regime at the given wind speed.
    ///
    /// # Arguments
    ///
    /// * `wind_speed` - Hub-height wind speed in m/s
    ///
    /// # Returns
    ///
    /// Output in MW with its [`WindStatus`]
    pub fn calculate(&self, wind_speed: f64) -> SourceOutput<WindStatus> {
        let (power_mw, status) = if wind_speed >= CUT_OUT_MS {
            (0.0, WindStatus::ShutdownStorm)
        } else if wind_speed < CUT_IN_MS {
            (0.0, WindStatus::InsufficientWind)
        } else if wind_speed >= RATED_MS {
            (self.capacity_mw(), WindStatus::RatedPower)
        } else {
            let ratio = (wind_speed - CUT_IN_MS) / (RATED_MS - CUT_IN_MS);
            (self.capacity_mw() * ratio.powi(3), WindStatus::Ramping)
        };
        SourceOutput { power_mw, status }
    }
}
