//! # CRSF Telemetry Decoder
//!
//! Decodes validated CRSF telemetry frames (Battery, Attitude, Flight Mode)
//! into [`TelemetryUpdate`]s. Offsets are absolute indices into the whole
//! frame, multi-byte fields are big-endian.

use super::protocol::*;
use crate::error::FrameError;

/// Battery voltage field offset (u16, decivolts)
const BATTERY_VOLTAGE_OFFSET: usize = 3;

/// Battery current field offset (u16, deciamps)
const BATTERY_CURRENT_OFFSET: usize = 5;

/// Attitude pitch field offset (i16, 1/10000 rad)
const ATTITUDE_PITCH_OFFSET: usize = 3;

/// Attitude roll field offset (i16, 1/10000 rad)
const ATTITUDE_ROLL_OFFSET: usize = 5;

/// Attitude yaw field offset (i16, 1/10000 rad)
const ATTITUDE_YAW_OFFSET: usize = 7;

/// Header bytes subtracted from the length field to get the mode label length
const FLIGHT_MODE_HEADER_LEN: i32 = 3;

/// Upper bound (exclusive) of a flight mode label length
const FLIGHT_MODE_MAX_LEN: i32 = 255;

const BATTERY_SCALE: f32 = 10.0;
const ATTITUDE_SCALE: f32 = 10_000.0;

/// Telemetry frame decoder
///
/// Stateless apart from the frame type mapping; it never touches the
/// telemetry store, callers apply the returned update themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder {
    codes: FrameTypeCodes,
}

impl FrameDecoder {
    /// Create a decoder for the given frame type mapping
    pub fn new(codes: FrameTypeCodes) -> Self {
        Self { codes }
    }

    /// Frame type mapping in use
    pub fn codes(&self) -> &FrameTypeCodes {
        &self.codes
    }

    /// Decode a validated frame
    ///
    /// # Arguments
    ///
    /// * `frame_type` - Type byte (index 2 of the frame)
    /// * `frame` - Complete frame bytes (address, length, type, payload, crc)
    ///
    /// # Returns
    ///
    /// * `Result<DecodeOutcome>` - Update for recognized types,
    ///   `Unrecognized` for everything else
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] if a recognized frame is too short
    /// for its fields
    pub fn decode(&self, frame_type: u8, frame: &[u8]) -> Result<DecodeOutcome, FrameError> {
        let Some(kind) = self.codes.classify(frame_type) else {
            return Ok(DecodeOutcome::Unrecognized(frame_type));
        };

        let update = match kind {
            FrameKind::Battery => decode_battery(frame_type, frame)?,
            FrameKind::Attitude => decode_attitude(frame_type, frame)?,
            FrameKind::FlightMode => decode_flight_mode(frame_type, frame)?,
        };

        Ok(DecodeOutcome::Update(update))
    }
}

/// Decode a validated frame using the standard CRSF frame type codes
///
/// # Examples
///
/// ```
/// use crsf_telemetry::crsf::decoder::decode;
/// use crsf_telemetry::crsf::protocol::{DecodeOutcome, TelemetryUpdate};
///
/// let frame = [0xC8, 0x08, 0x08, 0x00, 0x64, 0x00, 0x0A, 0x00, 0x00, 0x00];
/// let outcome = decode(0x08, &frame).unwrap();
/// assert_eq!(
///     outcome,
///     DecodeOutcome::Update(TelemetryUpdate::Battery { voltage: 10.0, current: 1.0 })
/// );
/// ```
pub fn decode(frame_type: u8, frame: &[u8]) -> Result<DecodeOutcome, FrameError> {
    FrameDecoder::default().decode(frame_type, frame)
}

/// Decode Battery Sensor fields
///
/// Voltage and current: 2 bytes each, big-endian, in tenths.
fn decode_battery(frame_type: u8, frame: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    let voltage = read_u16_be(frame_type, frame, BATTERY_VOLTAGE_OFFSET)?;
    let current = read_u16_be(frame_type, frame, BATTERY_CURRENT_OFFSET)?;

    Ok(TelemetryUpdate::Battery {
        voltage: voltage as f32 / BATTERY_SCALE,
        current: current as f32 / BATTERY_SCALE,
    })
}

/// Decode Attitude fields
///
/// Pitch, roll, yaw: 2 bytes each, big-endian, signed, radians × 10000.
fn decode_attitude(frame_type: u8, frame: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    let pitch = read_u16_be(frame_type, frame, ATTITUDE_PITCH_OFFSET)? as i16;
    let roll = read_u16_be(frame_type, frame, ATTITUDE_ROLL_OFFSET)? as i16;
    let yaw = read_u16_be(frame_type, frame, ATTITUDE_YAW_OFFSET)? as i16;

    Ok(TelemetryUpdate::Attitude {
        pitch: pitch as f32 / ATTITUDE_SCALE,
        roll: roll as f32 / ATTITUDE_SCALE,
        yaw: yaw as f32 / ATTITUDE_SCALE,
    })
}

/// Decode the Flight Mode label
///
/// The label length is taken from the frame's own length field minus three.
/// An out-of-range length or bytes that are not UTF-8 yield
/// [`FLIGHT_MODE_UNKNOWN`]; the label stops at the first NUL.
fn decode_flight_mode(frame_type: u8, frame: &[u8]) -> Result<TelemetryUpdate, FrameError> {
    let declared = *frame.get(CRSF_LENGTH_OFFSET).ok_or(FrameError::Malformed {
        frame_type,
        needed: CRSF_LENGTH_OFFSET + 1,
        len: frame.len(),
    })?;

    let mode_len = declared as i32 - FLIGHT_MODE_HEADER_LEN;
    if mode_len <= 0 || mode_len >= FLIGHT_MODE_MAX_LEN {
        return Ok(TelemetryUpdate::FlightMode(FLIGHT_MODE_UNKNOWN.to_string()));
    }

    let end = CRSF_PAYLOAD_OFFSET + mode_len as usize;
    let bytes = frame.get(CRSF_PAYLOAD_OFFSET..end).ok_or(FrameError::Malformed {
        frame_type,
        needed: end,
        len: frame.len(),
    })?;

    let bytes = match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    };

    let label = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => FLIGHT_MODE_UNKNOWN.to_string(),
    };

    Ok(TelemetryUpdate::FlightMode(label))
}

/// Read a big-endian u16 at an absolute offset, failing instead of reading past the end
fn read_u16_be(frame_type: u8, frame: &[u8], offset: usize) -> Result<u16, FrameError> {
    match frame.get(offset..offset + 2) {
        Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(FrameError::Malformed {
            frame_type,
            needed: offset + 2,
            len: frame.len(),
        }),
    }
}
