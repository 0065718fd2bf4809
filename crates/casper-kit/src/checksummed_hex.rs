//! Checksummed hex (CEP-57).
//!
//! Hex text whose letter casing encodes a checksum of the underlying bytes.
//! The checksum is a blake2b-256 digest of the raw bytes; its bits, least
//! significant first within each digest byte, decide the case of each letter
//! `a`-`f` in turn. Digits consume no bit.
//!
//! Text that is entirely lowercase or entirely uppercase is accepted without
//! verification.
//!
//! ```
//! use casper_kit::checksummed_hex;
//!
//! let bytes = hex::decode("deadbeef").unwrap();
//! let encoded = checksummed_hex::encode(&bytes);
//! assert_eq!(encoded, "DEadBEEF");
//! assert_eq!(checksummed_hex::decode(&encoded).unwrap(), bytes);
//! assert_eq!(checksummed_hex::decode("deadbeef").unwrap(), bytes);
//! ```

use tracing::{debug, trace};

use crate::error::CodecError;
use crate::types::blake2b256;

/// Inputs longer than this are rendered as plain lowercase hex.
pub const SMALL_BYTES_COUNT: usize = 75;

const HEX_CHARS: [char; 22] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'A', 'B', 'C',
    'D', 'E', 'F',
];

fn nibbles(input: &[u8]) -> impl Iterator<Item = u8> + '_ {
    input.iter().flat_map(|&byte| [byte >> 4, byte & 0x0f])
}

fn digest_bits(digest: [u8; 32]) -> impl Iterator<Item = bool> {
    digest
        .into_iter()
        .cycle()
        .flat_map(|byte| (0..8).map(move |offset| (byte >> offset) & 0x01 == 0x01))
}

/// Encode `input` as checksummed hex.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    let input = input.as_ref();
    if input.len() > SMALL_BYTES_COUNT {
        return hex::encode(input);
    }

    let mut bits = digest_bits(blake2b256(input));
    nibbles(input)
        .map(|nibble| {
            let mut index = nibble as usize;
            // Letters start at index 10; their uppercase forms sit 6 places later.
            if nibble >= 10 && bits.next().unwrap_or(true) {
                index += 6;
            }
            HEX_CHARS[index]
        })
        .collect()
}

/// True if `input` has no letters of mixed case.
pub fn is_single_case(input: &str) -> bool {
    !input.bytes().any(|b| b.is_ascii_uppercase()) || !input.bytes().any(|b| b.is_ascii_lowercase())
}

/// Decode checksummed hex.
///
/// Single-case input skips verification; mixed-case input must match the
/// casing [`encode`] would produce for the decoded bytes.
///
/// Input longer than [`SMALL_BYTES_COUNT`] bytes only verifies as lowercase,
/// so mixed-case input of that length is rejected. The network's decoder
/// skips verification there instead and would accept it.
pub fn decode(input: impl AsRef<str>) -> Result<Vec<u8>, CodecError> {
    let input = input.as_ref();
    let bytes = hex::decode(input)?;

    if is_single_case(input) {
        trace!(len = input.len(), "single-case hex, skipping checksum");
        return Ok(bytes);
    }

    if encode(&bytes) != input {
        debug!(len = input.len(), "checksummed hex failed verification");
        return Err(CodecError::ChecksumMismatch);
    }
    Ok(bytes)
}

/// Decode checksummed hex into exactly `N` bytes.
pub fn decode_array<const N: usize>(input: impl AsRef<str>) -> Result<[u8; N], CodecError> {
    let bytes = decode(input)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CodecError::LengthMismatch {
            expected: N,
            actual: bytes.len(),
        })
}
