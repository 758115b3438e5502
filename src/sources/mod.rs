//! Energy source models feeding the grid.

/// Grid-scale battery storage.
pub mod battery;
/// Ramp-limited gas backup plant.
pub mod gas;
/// Photovoltaic array output model.
pub mod solar;
pub mod types;
/// Wind farm power curve.
pub mod wind;

pub use battery::BatterySource;
pub use gas::GasSource;
pub use solar::SolarSource;
pub use types::{
    DispatchableGenerator, DispatchableStore, OperationalStatus, SolarStatus, SourceOutput,
    WindStatus,
};
pub use wind::WindSource;
