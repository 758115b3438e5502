use serde::Serialize;

use crate::sources::solar::{SUNRISE_HOUR, SUNSET_HOUR, elevation_factor};

/// Hours in one simulated day.
const HOURS_PER_DAY: f64 = 24.0;

/// Point in simulated time: day index (starting at 1) and hour of day in `[0, 24)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationTime {
    /// Simulated day, starting at 1.
    pub day: u32,
    /// Continuous hour of day in `[0, 24)`.
    pub hour: f64,
}

/// A simulation clock that advances a day/hour pair by a fixed tick duration.
///
/// # Examples
///
/// ```
/// use grid_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(15.0);
/// for _ in 0..4 {
///     clock.advance();
/// }
/// assert_eq!(clock.time_of_day(), 1.0);
/// assert_eq!(clock.day(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Simulated minutes per tick.
    tick_minutes: f64,
    /// Hour of day the clock returns to on reset.
    start_hour: f64,
    /// Current simulated time.
    now: SimulationTime,
    /// Ticks advanced since construction or the last reset.
    total_ticks: u64,
}

impl Clock {
    /// Creates a clock at day 1, midnight.
    ///
    /// # Arguments
    ///
    /// * `tick_minutes` - Simulated minutes per tick (must be in `(0, 1440]`)
    ///
    /// # Panics
    ///
    /// Panics if `tick_minutes` is not positive or exceeds one day.
    pub fn new(tick_minutes: f64) -> Self {
        Self::starting_at(tick_minutes, 0.0)
    }

    /// Creates a clock at day 1, `start_hour`.
    ///
    /// # Panics
    ///
    /// Panics if `tick_minutes` is outside `(0, 1440]` or `start_hour` outside `[0, 24)`.
    pub fn starting_at(tick_minutes: f64, start_hour: f64) -> Self {
        assert!(tick_minutes > 0.0 && tick_minutes <= HOURS_PER_DAY * 60.0);
        assert!((0.0..HOURS_PER_DAY).contains(&start_hour));
        Self {
            tick_minutes,
            start_hour,
            now: SimulationTime {
                day: 1,
                hour: start_hour,
            },
            total_ticks: 0,
        }
    }

    /// Advances the clock by one tick, rolling the hour over into the next day at 24:00.
    ///
    /// At most one day boundary is crossed per call.
    pub fn advance(&mut self) {
        self.now.hour += self.tick_hours();
        if self.now.hour >= HOURS_PER_DAY {
            self.now.hour -= HOURS_PER_DAY;
            self.now.day += 1;
        }
        self.total_ticks += 1;
    }

    /// Returns the clock to day 1 at its start hour.
    pub fn reset(&mut self) {
        self.now = SimulationTime {
            day: 1,
            hour: self.start_hour,
        };
        self.total_ticks = 0;
    }

    /// Current simulated time.
    pub fn now(&self) -> SimulationTime {
        self.now
    }

    /// Current hour of day in `[0, 24)`.
    pub fn time_of_day(&self) -> f64 {
        self.now.hour
    }

    /// Current simulated day (1-based).
    pub fn day(&self) -> u32 {
        self.now.day
    }

    /// Ticks advanced since construction or the last reset.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Simulated minutes per tick.
    pub fn tick_minutes(&self) -> f64 {
        self.tick_minutes
    }

    /// Duration of one tick in hours.
    pub fn tick_hours(&self) -> f64 {
        self.tick_minutes / 60.0
    }

    /// Returns `true` between 06:00 (inclusive) and 18:00 (exclusive).
    pub fn is_daytime(&self) -> bool {
        (SUNRISE_HOUR..SUNSET_HOUR).contains(&self.now.hour)
    }

    /// Sun elevation as a `0..=1` factor: 0 at night, sunrise and sunset, 1 at solar noon.
    pub fn solar_elevation_factor(&self) -> f64 {
        elevation_factor(self.now.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = Clock::new(15.0);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.time_of_day(), 0.0);
        assert_eq!(clock.total_ticks(), 0);
        assert_eq!(clock.tick_hours(), 0.25);
    }

    #[test]
    fn test_advance() {
        let mut clock = Clock::new(15.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.time_of_day(), 0.5);
        assert_eq!(clock.total_ticks(), 2);
    }

    #[test]
    fn test_day_rollover() {
        let mut clock = Clock::new(15.0);
        for _ in 0..96 {
            clock.advance();
        }
        assert_eq!(clock.day(), 2);
        assert!(clock.time_of_day().abs() < 1e-9);
    }

    #[test]
    fn test_rollover_keeps_remainder() {
        let mut clock = Clock::starting_at(90.0, 23.0);
        clock.advance();
        assert_eq!(clock.day(), 2);
        assert!((clock.time_of_day() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_twice_is_same_as_once() {
        let mut clock = Clock::starting_at(60.0, 6.0);
        for _ in 0..30 {
            clock.advance();
        }
        clock.reset();
        let once = clock.now();
        clock.reset();
        assert_eq!(clock.now(), once);
        assert_eq!(once, SimulationTime { day: 1, hour: 6.0 });
        assert_eq!(clock.total_ticks(), 0);
    }

    #[test]
    fn test_time_never_decreases() {
        let mut clock = Clock::new(45.0);
        let mut last = (clock.day(), clock.time_of_day());
        for _ in 0..500 {
            clock.advance();
            let now = (clock.day(), clock.time_of_day());
            assert!(now.0 > last.0 || (now.0 == last.0 && now.1 > last.1));
            assert!((0.0..24.0).contains(&now.1));
            last = now;
        }
    }

    #[test]
    fn test_daytime_window() {
        let mut clock = Clock::starting_at(60.0, 5.0);
        assert!(!clock.is_daytime());
        clock.advance();
        assert!(clock.is_daytime());
        assert_eq!(clock.solar_elevation_factor(), 0.0);
        for _ in 0..6 {
            clock.advance();
        }
        assert!((clock.solar_elevation_factor() - 1.0).abs() < 1e-12);
        for _ in 0..6 {
            clock.advance();
        }
        assert!(!clock.is_daytime());
    }

    #[test]
    #[should_panic]
    fn test_zero_tick_panics() {
        Clock::new(0.0);
    }

    #[test]
    #[should_panic]
    fn test_multi_day_tick_panics() {
        Clock::new(2000.0);
    }
}
