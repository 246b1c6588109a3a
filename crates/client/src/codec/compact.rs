// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compact (variable-length) unsigned integers.
//!
//! Only the single-, two- and four-byte modes are handled. The big-integer
//! mode (flag `0b11`, values of 2^30 and above) is rejected in both directions.

use super::{CodecError, take};

/// First value that no longer fits the four-byte mode.
pub const COMPACT_LIMIT: u128 = 1 << 30;

const SINGLE_BYTE_LIMIT: u128 = 1 << 6;
const TWO_BYTE_LIMIT: u128 = 1 << 14;

/// Append the compact encoding of `value` to `out`.
pub fn encode_compact_to(value: u128, out: &mut Vec<u8>) -> Result<(), CodecError> {
    if value < SINGLE_BYTE_LIMIT {
        out.push((value as u8) << 2);
    } else if value < TWO_BYTE_LIMIT {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value < COMPACT_LIMIT {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        return Err(CodecError::CompactOutOfRange(value));
    }

    Ok(())
}

pub fn encode_compact(value: u128) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(4);
    encode_compact_to(value, &mut out)?;
    Ok(out)
}

/// Decode a compact integer, advancing `input` past it.
pub fn decode_compact(input: &mut &[u8]) -> Result<u32, CodecError> {
    let first = *input.first().ok_or(CodecError::UnexpectedEnd {
        needed: 1,
        remaining: 0,
    })?;

    match first & 0b11 {
        0b00 => {
            take(input, 1)?;
            Ok(u32::from(first >> 2))
        }
        0b01 => {
            let raw = take(input, 2)?;
            Ok(u32::from(u16::from_le_bytes([raw[0], raw[1]]) >> 2))
        }
        0b10 => {
            let raw = take(input, 4)?;
            Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) >> 2)
        }
        mode => Err(CodecError::UnsupportedCompactMode(mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> (u32, usize) {
        let mut input = bytes;
        let value = decode_compact(&mut input).unwrap();
        (value, bytes.len() - input.len())
    }

    #[test]
    fn test_single_byte_mode() {
        assert_eq!(encode_compact(0).unwrap(), vec![0x00]);
        let encoded = encode_compact(63).unwrap();
        assert_eq!(encoded, vec![0xfc]);
        assert_eq!(encoded[0] & 0b11, 0b00);
        assert_eq!(decode_all(&encoded), (63, 1));
    }

    #[test]
    fn test_two_byte_mode() {
        let encoded = encode_compact(64).unwrap();
        assert_eq!(encoded, vec![0x01, 0x01]);
        assert_eq!(encoded[0] & 0b11, 0b01);
        assert_eq!(decode_all(&encoded), (64, 2));

        let encoded = encode_compact(16383).unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(decode_all(&encoded), (16383, 2));
    }

    #[test]
    fn test_four_byte_mode() {
        let encoded = encode_compact(16384).unwrap();
        assert_eq!(encoded, vec![0x02, 0x00, 0x01, 0x00]);
        assert_eq!(encoded[0] & 0b11, 0b10);
        assert_eq!(decode_all(&encoded), (16384, 4));

        let max = COMPACT_LIMIT - 1;
        let encoded = encode_compact(max).unwrap();
        assert_eq!(encoded.len(), 4);
        assert_eq!(decode_all(&encoded), (max as u32, 4));
    }

    #[test]
    fn test_big_integer_mode_rejected() {
        assert_eq!(
            encode_compact(COMPACT_LIMIT),
            Err(CodecError::CompactOutOfRange(1 << 30))
        );

        let mut input: &[u8] = &[0x03, 0x00, 0x00, 0x00, 0x40];
        assert_eq!(
            decode_compact(&mut input),
            Err(CodecError::UnsupportedCompactMode(0b11))
        );
    }

    #[test]
    fn test_truncated_input() {
        let mut input: &[u8] = &[0x01];
        assert!(matches!(
            decode_compact(&mut input),
            Err(CodecError::UnexpectedEnd { needed: 2, remaining: 1 })
        ));

        let mut input: &[u8] = &[];
        assert!(decode_compact(&mut input).is_err());
    }
}
