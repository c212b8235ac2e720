//! # CRSF Frame Validator
//!
//! Length and checksum gate run on every candidate frame before decoding.

use super::crc::crc8_dvb_s2;
use super::protocol::{CRSF_MIN_FRAME_SIZE, CRSF_TYPE_OFFSET};
use crate::error::FrameError;

/// Check a candidate frame, reporting why it was rejected
///
/// `frame` must be the exact frame: the caller slices the datagram to the
/// length declared in byte 1 before calling. The CRC covers the type byte
/// through the byte before the trailing CRC (address and length excluded).
///
/// # Errors
///
/// Returns error if:
/// - Frame is shorter than 4 bytes
/// - CRC check fails
pub fn check_frame(frame: &[u8]) -> Result<(), FrameError> {
    if frame.len() < CRSF_MIN_FRAME_SIZE {
        return Err(FrameError::TooShort { len: frame.len() });
    }

    let crc_index = frame.len() - 1;
    let computed = crc8_dvb_s2(&frame[CRSF_TYPE_OFFSET..crc_index]);
    let received = frame[crc_index];

    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(())
}

/// Validate a candidate frame
///
/// # Returns
///
/// * `bool` - `true` iff the frame is long enough and its CRC matches
///
/// # Examples
///
/// ```
/// use crsf_telemetry::crsf::validator::validate;
///
/// assert!(!validate(&[0xC8, 0x02, 0x08]));
/// ```
pub fn validate(frame: &[u8]) -> bool {
    check_frame(frame).is_ok()
}
