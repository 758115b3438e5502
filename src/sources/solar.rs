use std::f64::consts::PI;

use crate::sources::types::{SolarStatus, SourceOutput};

/// Hour of sunrise; output is zero before it.
pub const SUNRISE_HOUR: f64 = 6.0;
/// Hour of sunset; output is zero from it onward.
pub const SUNSET_HOUR: f64 = 18.0;

/// Fraction of output lost under full cloud cover.
const CLOUD_ATTENUATION: f64 = 0.8;

/// Sun elevation factor at `hour`: 0 outside `[6, 18)`, `sin` bell peaking at noon.
pub fn elevation_factor(hour: f64) -> f64 {
    if !(SUNRISE_HOUR..SUNSET_HOUR).contains(&hour) {
        return 0.0;
    }
    (PI * (hour - SUNRISE_HOUR) / (SUNSET_HOUR - SUNRISE_HOUR)).sin()
}

/// A utility-scale photovoltaic array.
#[derive(Debug, Clone)]
pub struct SolarSource {
    /// Peak output under clear sky at solar noon, in MW.
    pub capacity_mw: f64,
}

impl SolarSource {
    /// Creates a solar array.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_mw` is not positive.
    pub fn new(capacity_mw: f64) -> Self {
        assert!(capacity_mw > 0.0);
        Self { capacity_mw }
    }

    /// Power output and sky condition.
    ///
    /// # Arguments
    ///
    /// * `time_of_day` - Hour of day in `[0, 24)`
    /// * `cloud_cover` - Cloud fraction in `[0, 1]`
    ///
    /// # Returns
    ///
    /// Output in MW with its [`SolarStatus`]. Night takes precedence over the
    /// cloud-derived tag.
    pub fn calculate(&self, time_of_day: f64, cloud_cover: f64) -> SourceOutput<SolarStatus> {
        if !(SUNRISE_HOUR..SUNSET_HOUR).contains(&time_of_day) {
            return SourceOutput {
                power_mw: 0.0,
                status: SolarStatus::Nighttime,
            };
        }

        let cloud_factor = 1.0 - CLOUD_ATTENUATION * cloud_cover;
        let power_mw = self.capacity_mw * elevation_factor(time_of_day) * cloud_factor;

        let status = if cloud_cover > 0.7 {
            SolarStatus::Cloudy
        } else if cloud_cover > 0.3 {
            SolarStatus::PartlyCloudy
        } else {
            SolarStatus::Clear
        };

        SourceOutput { power_mw, status }
    }
}
