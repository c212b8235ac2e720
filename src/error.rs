//! # Error Types
//!
//! Custom error types for CRSF telemetry using `thiserror`.

use thiserror::Error;

/// Reasons a single received frame is dropped
///
/// Every variant is local to one datagram. The ingestion loop counts and
/// logs it, then moves on to the next datagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Fewer bytes than the smallest possible frame (address, length, type, crc)
    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },

    /// Datagram holds fewer bytes than the frame's own length field declares
    #[error("frame truncated: declared {declared} bytes, received {received}")]
    Truncated { declared: usize, received: usize },

    /// Length field declares a frame larger than the CRSF maximum
    #[error("frame oversized: declared {declared} bytes, maximum is {max}")]
    Oversized { declared: usize, max: usize },

    /// Trailing checksum does not match the computed CRC8
    #[error("CRC mismatch: computed 0x{computed:02X}, received 0x{received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// A recognized frame type whose fields extend past the buffer
    #[error("malformed frame 0x{frame_type:02X}: needs {needed} bytes, got {len}")]
    Malformed { frame_type: u8, needed: usize, len: usize },
}

impl FrameError {
    /// Short, stable name used as a counter key and log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::Truncated { .. } => "truncated",
            Self::Oversized { .. } => "oversized",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Main error type for CRSF telemetry
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Frame-level protocol errors
    #[error("CRSF frame error: {0}")]
    Frame(#[from] FrameError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry record serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CRSF telemetry
pub type Result<T> = std::result::Result<T, TelemetryError>;
