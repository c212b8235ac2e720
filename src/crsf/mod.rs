//! # CRSF Protocol Module
//!
//! Receive-side implementation of the Crossfire (CRSF) telemetry protocol.
//!
//! This module handles:
//! - CRC8-DVB-S2 checksum calculation
//! - Frame validation (minimum length, checksum)
//! - Telemetry frame decoding (Battery, Attitude, Flight Mode)

pub mod protocol;
pub mod validator;
pub mod decoder;
pub mod crc;
