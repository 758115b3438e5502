//! Telemetry output.

/// CSV export of grid snapshots.
pub mod export;
