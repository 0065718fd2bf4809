//! Variable-width unsigned integers (`U128`, `U256`, `U512`).
//!
//! Wire layout: one length byte followed by that many little-endian magnitude
//! bytes. The length is minimal, so zero is the single byte `00` and the most
//! significant payload byte is never zero.

use std::fmt::{self, Display};

use num_bigint::BigUint;

use super::cursor::{ByteCursor, ByteWriter};
use crate::error::CodecError;

/// The declared width of a wide integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WideWidth {
    U128,
    U256,
    U512,
}

impl WideWidth {
    /// Maximum number of magnitude bytes this width allows.
    pub const fn max_bytes(&self) -> usize {
        match self {
            WideWidth::U128 => 16,
            WideWidth::U256 => 32,
            WideWidth::U512 => 64,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            WideWidth::U128 => "U128",
            WideWidth::U256 => "U256",
            WideWidth::U512 => "U512",
        }
    }

    /// True if `value` fits in this width.
    pub fn fits(&self, value: &BigUint) -> bool {
        value.bits() <= (self.max_bytes() as u64) * 8
    }
}

impl Display for WideWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal little-endian magnitude bytes; empty for zero.
fn magnitude_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_le()
    }
}

/// Append the encoding of `value`, checking it against `width`.
pub fn write_wide(
    writer: &mut ByteWriter,
    value: &BigUint,
    width: WideWidth,
) -> Result<(), CodecError> {
    let magnitude = magnitude_bytes(value);
    if magnitude.len() > width.max_bytes() {
        return Err(CodecError::LengthMismatch {
            expected: width.max_bytes(),
            actual: magnitude.len(),
        });
    }
    writer.write_u8(magnitude.len() as u8);
    writer.write_bytes(&magnitude);
    Ok(())
}

/// Read one wide integer of the given width.
///
/// Rejects a length byte larger than the width allows, a payload shorter than
/// the length byte claims, and non-minimal payloads (a zero high byte).
///
/// The network's own decoder accepts non-minimal payloads such as `020100`.
/// They are rejected here so that re-encoding a decoded value always
/// reproduces the input bytes.
pub fn read_wide(cursor: &mut ByteCursor<'_>, width: WideWidth) -> Result<BigUint, CodecError> {
    cursor.atomically(|c| {
        let len = c.read_u8()? as usize;
        if len > width.max_bytes() {
            return Err(CodecError::LengthMismatch {
                expected: width.max_bytes(),
                actual: len,
            });
        }
        let magnitude = c.read_bytes(len)?;
        if let Some(&0) = magnitude.last() {
            let minimal = magnitude.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            return Err(CodecError::LengthMismatch {
                expected: minimal,
                actual: len,
            });
        }
        Ok(BigUint::from_bytes_le(magnitude))
    })
}

/// Encode `value` as a standalone wide integer.
pub fn encode_wide(value: &BigUint, width: WideWidth) -> Result<Vec<u8>, CodecError> {
    let mut writer = ByteWriter::with_capacity(1 + width.max_bytes());
    write_wide(&mut writer, value, width)?;
    Ok(writer.into_bytes())
}

/// Decode a standalone wide integer, requiring every byte to be consumed.
pub fn decode_wide(bytes: &[u8], width: WideWidth) -> Result<BigUint, CodecError> {
    let mut cursor = ByteCursor::new(bytes);
    let value = read_wide(&mut cursor, width)?;
    cursor.finish()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigUint {
        s.parse().unwrap()
    }

    #[test]
    fn test_reference_vectors() {
        let cases = [
            ("060000c0d0e0f0", "264848365584384", WideWidth::U128),
            ("020e08", "2062", WideWidth::U256),
            ("050e2389f603", "17021084430", WideWidth::U512),
            ("050e6b1623e8", "997021084430", WideWidth::U512),
            ("00", "0", WideWidth::U512),
        ];
        for (hex_str, value, width) in cases {
            let bytes = hex::decode(hex_str).unwrap();
            assert_eq!(decode_wide(&bytes, width).unwrap(), big(value));
            assert_eq!(encode_wide(&big(value), width).unwrap(), bytes);
        }
    }

    #[test]
    fn test_u256_max() {
        let max = (BigUint::from(1u8) << 256u32) - 1u8;
        let encoded = encode_wide(&max, WideWidth::U256).unwrap();
        assert_eq!(encoded.len(), 33);
        assert_eq!(encoded[0], 0x20);
        assert!(encoded[1..].iter().all(|&b| b == 0xff));
        assert_eq!(decode_wide(&encoded, WideWidth::U256).unwrap(), max);
    }

    #[test]
    fn test_zero_has_no_payload() {
        assert_eq!(encode_wide(&BigUint::default(), WideWidth::U128).unwrap(), vec![0]);
    }

    #[test]
    fn test_width_overflow_rejected() {
        let too_big = BigUint::from(1u8) << 128u32;
        assert_eq!(
            encode_wide(&too_big, WideWidth::U128),
            Err(CodecError::LengthMismatch {
                expected: 16,
                actual: 17
            })
        );
        assert!(encode_wide(&too_big, WideWidth::U256).is_ok());

        let mut bytes = vec![17u8];
        bytes.extend_from_slice(&[1u8; 17]);
        assert!(matches!(
            decode_wide(&bytes, WideWidth::U128),
            Err(CodecError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_length_byte_past_end_is_underrun() {
        let bytes = hex::decode("08010203").unwrap();
        let err = decode_wide(&bytes, WideWidth::U512).unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferUnderrun {
                needed: 8,
                remaining: 3
            }
        );
    }

    #[test]
    fn test_non_minimal_rejected() {
        let bytes = hex::decode("020100").unwrap();
        assert_eq!(
            decode_wide(&bytes, WideWidth::U512),
            Err(CodecError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_read_leaves_cursor_on_failure() {
        let bytes = hex::decode("0301").unwrap();
        let mut cursor = ByteCursor::new(&bytes);
        assert!(read_wide(&mut cursor, WideWidth::U128).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_fits() {
        assert!(WideWidth::U128.fits(&BigUint::from(u128::MAX)));
        assert!(!WideWidth::U128.fits(&(BigUint::from(u128::MAX) + 1u8)));
    }
}
