//! # Telemetry Module
//!
//! Holds the latest decoded telemetry and the consumers built on it.
//!
//! This module handles:
//! - The telemetry snapshot (battery, attitude, flight mode)
//! - The concurrency-safe store readers take snapshots from
//! - Formatting snapshots for display
//! - Writing snapshots to rotating JSONL files

pub mod logger;
pub mod snapshot;
pub mod store;

pub use logger::TelemetryLogger;
pub use snapshot::TelemetrySnapshot;
pub use store::{TelemetryReader, TelemetryStore};
