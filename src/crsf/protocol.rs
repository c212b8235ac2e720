//! # CRSF Protocol Constants and Types
//!
//! Core protocol definitions for decoding CRSF (Crossfire) telemetry.
//!
//! Frame layout: `[address][length][type][payload...][crc]`, where `length`
//! counts the bytes from `type` through `crc` inclusive.

/// CRSF address byte of a flight controller (the usual telemetry origin)
pub const CRSF_ADDRESS_FLIGHT_CONTROLLER: u8 = 0xC8;

/// Battery Sensor frame type
pub const CRSF_FRAMETYPE_BATTERY_SENSOR: u8 = 0x08;

/// Attitude frame type
pub const CRSF_FRAMETYPE_ATTITUDE: u8 = 0x1E;

/// Flight Mode frame type
pub const CRSF_FRAMETYPE_FLIGHT_MODE: u8 = 0x21;

/// Minimum frame size: address(1) + length(1) + type(1) + crc(1)
pub const CRSF_MIN_FRAME_SIZE: usize = 4;

/// Maximum frame size on a CRSF link
pub const CRSF_MAX_FRAME_SIZE: usize = 64;

/// Bytes outside the region counted by the length field (address + length)
pub const CRSF_FRAME_HEADER_OVERHEAD: usize = 2;

/// Index of the length byte
pub const CRSF_LENGTH_OFFSET: usize = 1;

/// Index of the frame type byte
pub const CRSF_TYPE_OFFSET: usize = 2;

/// Index of the first payload byte
pub const CRSF_PAYLOAD_OFFSET: usize = 3;

/// Label used when a flight mode cannot be decoded
pub const FLIGHT_MODE_UNKNOWN: &str = "Unknown";

/// Frame types this crate decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Battery voltage and current
    Battery,
    /// Pitch, roll and yaw
    Attitude,
    /// Flight controller mode label
    FlightMode,
}

impl FrameKind {
    /// All decodable kinds, in dispatch order
    pub const ALL: [FrameKind; 3] = [FrameKind::Battery, FrameKind::Attitude, FrameKind::FlightMode];

    /// Human readable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            FrameKind::Battery => "battery",
            FrameKind::Attitude => "attitude",
            FrameKind::FlightMode => "flight_mode",
        }
    }
}

/// Mapping from frame type byte to [`FrameKind`]
///
/// Defaults to the standard CRSF codes. Links that tag telemetry with other
/// codes can override them through the `[crsf]` configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTypeCodes {
    pub battery: u8,
    pub attitude: u8,
    pub flight_mode: u8,
}

impl Default for FrameTypeCodes {
    fn default() -> Self {
        Self {
            battery: CRSF_FRAMETYPE_BATTERY_SENSOR,
            attitude: CRSF_FRAMETYPE_ATTITUDE,
            flight_mode: CRSF_FRAMETYPE_FLIGHT_MODE,
        }
    }
}

impl FrameTypeCodes {
    /// Resolve a frame type byte, `None` for types this crate ignores
    pub fn classify(&self, frame_type: u8) -> Option<FrameKind> {
        FrameKind::ALL
            .into_iter()
            .find(|kind| self.code(*kind) == frame_type)
    }

    /// Frame type byte assigned to `kind`
    pub fn code(&self, kind: FrameKind) -> u8 {
        match kind {
            FrameKind::Battery => self.battery,
            FrameKind::Attitude => self.attitude,
            FrameKind::FlightMode => self.flight_mode,
        }
    }

    /// True when every kind has its own code
    pub fn is_unambiguous(&self) -> bool {
        self.battery != self.attitude
            && self.battery != self.flight_mode
            && self.attitude != self.flight_mode
    }
}

/// Partial telemetry update produced by the decoder
///
/// Each variant carries exactly the fields of one frame type, so applying
/// it never touches the fields owned by another frame type.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryUpdate {
    /// Battery sensor values
    Battery {
        /// Volts
        voltage: f32,
        /// Amperes
        current: f32,
    },

    /// Attitude in radians
    Attitude { pitch: f32, roll: f32, yaw: f32 },

    /// Flight mode label, or [`FLIGHT_MODE_UNKNOWN`]
    FlightMode(String),
}

impl TelemetryUpdate {
    /// Frame kind this update came from
    pub fn kind(&self) -> FrameKind {
        match self {
            TelemetryUpdate::Battery { .. } => FrameKind::Battery,
            TelemetryUpdate::Attitude { .. } => FrameKind::Attitude,
            TelemetryUpdate::FlightMode(_) => FrameKind::FlightMode,
        }
    }
}

/// Result of decoding a validated frame
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Recognized frame type, fields extracted
    Update(TelemetryUpdate),

    /// Frame type outside the decoded set (expected traffic, not an error)
    Unrecognized(u8),
}
