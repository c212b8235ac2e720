//! # CRSF Telemetry Library
//!
//! Decode CRSF (Crossfire) telemetry frames received as UDP datagrams and
//! keep the latest battery, attitude and flight mode values.
//!
//! Data flow: datagram → [`ingest`] (length check and slicing) →
//! [`crsf::validator`] → [`crsf::decoder`] → [`telemetry::TelemetryStore`] →
//! reader snapshots.

pub mod config;
pub mod error;
pub mod crsf;
pub mod ingest;
pub mod logging;
pub mod net;
pub mod telemetry;
