//! # CRC8-DVB-S2 Implementation
//!
//! CRC-8-DVB-S2 checksum calculation for CRSF protocol.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00
//! **Final XOR**: none, MSB first

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Precomputed CRC8 lookup table
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        table[i] = crc8_step(i as u8);
        i += 1;
    }

    table
}

/// Run the eight shift/xor rounds for one accumulator value
const fn crc8_step(mut crc: u8) -> u8 {
    let mut j = 0;

    while j < 8 {
        if (crc & 0x80) != 0 {
            crc = (crc << 1) ^ CRC8_POLY;
        } else {
            crc <<= 1;
        }
        j += 1;
    }

    crc
}

/// Calculate CRC8-DVB-S2 checksum
///
/// On a CRSF frame the checksum covers the type byte and the payload, i.e.
/// everything between the length byte and the trailing CRC.
///
/// # Arguments
///
/// * `data` - Byte slice to calculate CRC for (Type + Payload)
///
/// # Returns
///
/// * `u8` - Calculated CRC8 checksum, `0x00` for an empty slice
///
/// # Examples
///
/// ```
/// use crsf_telemetry::crsf::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(&[]), 0x00);
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// ```
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}

/// Bitwise CRC8-DVB-S2, kept as the reference the lookup table is checked against
#[cfg(test)]
fn crc8_dvb_s2_slow(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_empty() {
        let data = [];
        assert_eq!(crc8_dvb_s2(&data), 0x00);
        assert_eq!(crc8_dvb_s2_slow(&data), 0x00);
    }

    #[test]
    fn test_crc8_check_value() {
        // Standard CRC-8/DVB-S2 check value
        assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
        assert_eq!(crc8_dvb_s2_slow(b"123456789"), 0xBC);
    }

    #[test]
    fn test_crc8_known_vectors() {
        let vectors: &[(&[u8], u8)] = &[
            (&[0x00], 0x00),
            (&[0x01], 0xD5),
            (&[0x80], 0xEF),
            (&[0xFF], 0xF9),
            (&[0x01, 0x00], 0x0B),
        ];

        for (data, expected) in vectors {
            assert_eq!(crc8_dvb_s2(data), *expected, "CRC mismatch for {:02X?}", data);
        }
    }

    #[test]
    fn test_crc8_table_entries() {
        assert_eq!(CRC8_TABLE[0x00], 0x00);
        assert_eq!(CRC8_TABLE[0x01], CRC8_POLY);
        assert_eq!(CRC8_TABLE[0x02], 0x7F);
    }

    #[test]
    fn test_crc8_lookup_table_matches_slow() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x08, 0x00, 0x64, 0x00, 0x0A],
            vec![0x1E, 0xFF, 0xFF, 0x27, 0x10, 0x00, 0x00],
            vec![0x00; 24],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(
                crc8_dvb_s2(data),
                crc8_dvb_s2_slow(data),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_crc8_every_single_byte_matches_slow() {
        for byte in 0..=u8::MAX {
            assert_eq!(crc8_dvb_s2(&[byte]), crc8_dvb_s2_slow(&[byte]));
        }
    }

    #[test]
    fn test_crc8_detects_single_bit_flips() {
        let data = [0x21, b'A', b'N', b'G', b'L', b'E', 0x00];
        let crc = crc8_dvb_s2(&data);

        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut corrupted = data;
                corrupted[byte] ^= 1 << bit;
                assert_ne!(crc8_dvb_s2(&corrupted), crc, "flip of byte {} bit {} undetected", byte, bit);
            }
        }
    }
}
