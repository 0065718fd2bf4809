//! Public keys and account hash derivation.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use k256::elliptic_curve::sec1::FromEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::digest::{AccountHash, blake2b256};
use crate::checksummed_hex;
use crate::codec::{ByteCursor, ByteWriter, FromBytes, ToBytes};
use crate::error::{CodecError, ParseKeyError};

/// Length of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// Length of a compressed Secp256k1 public key.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// Signature algorithm of a public key.
///
/// The discriminant is the algorithm tag on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyAlgorithm {
    Ed25519 = 1,
    Secp256k1 = 2,
}

impl KeyAlgorithm {
    /// Tag byte on the wire.
    pub const fn tag(&self) -> u8 {
        *self as u8
    }

    /// Lowercase algorithm name, as hashed into the account hash.
    pub const fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::Secp256k1 => "secp256k1",
        }
    }

    /// Expected key length in bytes.
    pub const fn key_len(&self) -> usize {
        match self {
            KeyAlgorithm::Ed25519 => ED25519_PUBLIC_KEY_LENGTH,
            KeyAlgorithm::Secp256k1 => SECP256K1_PUBLIC_KEY_LENGTH, // Compressed
        }
    }
}

impl TryFrom<u8> for KeyAlgorithm {
    type Error = CodecError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(KeyAlgorithm::Ed25519),
            2 => Ok(KeyAlgorithm::Secp256k1),
            _ => Err(CodecError::invalid_tag("public key algorithm", tag)),
        }
    }
}

impl Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ed25519 or Secp256k1 public key.
///
/// Always holds exactly [`KeyAlgorithm::key_len`] bytes that form a valid
/// point on the algorithm's curve.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    data: Vec<u8>,
}

impl PublicKey {
    /// Build a key from its algorithm and raw key bytes.
    pub fn new(algorithm: KeyAlgorithm, data: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        let data = data.into();
        if data.len() != algorithm.key_len() {
            return Err(CodecError::LengthMismatch {
                expected: algorithm.key_len(),
                actual: data.len(),
            });
        }
        validate_curve_point(algorithm, &data)?;
        Ok(Self { algorithm, data })
    }

    /// Build an Ed25519 key from raw 32 bytes.
    pub fn ed25519(bytes: [u8; ED25519_PUBLIC_KEY_LENGTH]) -> Result<Self, CodecError> {
        Self::new(KeyAlgorithm::Ed25519, bytes)
    }

    /// Build a Secp256k1 key from its 33-byte compressed form.
    pub fn secp256k1(bytes: [u8; SECP256K1_PUBLIC_KEY_LENGTH]) -> Result<Self, CodecError> {
        Self::new(KeyAlgorithm::Secp256k1, bytes)
    }

    /// Get the algorithm.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Get the raw key bytes (without the algorithm tag).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Derive the account hash.
    ///
    /// `blake2b256(algorithm_name || 0x00 || key_bytes)`.
    pub fn to_account_hash(&self) -> AccountHash {
        let name = self.algorithm.name().as_bytes();
        let mut preimage = Vec::with_capacity(name.len() + 1 + self.data.len());
        preimage.extend_from_slice(name);
        preimage.push(0);
        preimage.extend_from_slice(&self.data);
        AccountHash::new(blake2b256(&preimage))
    }

    /// Hex form: two-digit tag followed by the checksummed key bytes.
    pub fn to_hex(&self) -> String {
        format!(
            "{:02x}{}",
            self.algorithm.tag(),
            checksummed_hex::encode(&self.data)
        )
    }

    /// Parse the hex form produced by [`to_hex`](Self::to_hex).
    pub fn from_hex(s: &str) -> Result<Self, ParseKeyError> {
        let (tag_hex, key_hex) = match (s.get(..2), s.get(2..)) {
            (Some(tag), Some(key)) => (tag, key),
            _ => return Err(ParseKeyError::InvalidFormat(s.to_string())),
        };
        let tag = hex::decode(tag_hex).map_err(CodecError::from)?[0];
        let algorithm = KeyAlgorithm::try_from(tag)?;
        let data = checksummed_hex::decode(key_hex)?;
        Ok(Self::new(algorithm, data)?)
    }
}

fn validate_curve_point(algorithm: KeyAlgorithm, data: &[u8]) -> Result<(), CodecError> {
    match algorithm {
        KeyAlgorithm::Ed25519 => {
            let bytes: [u8; ED25519_PUBLIC_KEY_LENGTH] = data
                .try_into()
                .map_err(|_| CodecError::InvalidCurvePoint)?;
            VerifyingKey::from_bytes(&bytes).map_err(|_| CodecError::InvalidCurvePoint)?;
        }
        KeyAlgorithm::Secp256k1 => {
            let encoded =
                k256::EncodedPoint::from_bytes(data).map_err(|_| CodecError::InvalidCurvePoint)?;
            let point = k256::AffinePoint::from_encoded_point(&encoded);
            if point.is_none().into() {
                return Err(CodecError::InvalidCurvePoint);
            }
        }
    }
    Ok(())
}

impl FromStr for PublicKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<&str> for PublicKey {
    type Error = ParseKeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<&PublicKey> for AccountHash {
    fn from(key: &PublicKey) -> Self {
        key.to_account_hash()
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBytes for PublicKey {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(self.algorithm.tag());
        writer.write_bytes(&self.data);
        Ok(())
    }
}

impl FromBytes for PublicKey {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| {
            let algorithm = KeyAlgorithm::try_from(c.read_u8()?)?;
            let remaining = c.remaining();
            let data = c
                .read_bytes(algorithm.key_len())
                .map_err(|_| CodecError::LengthMismatch {
                    expected: algorithm.key_len(),
                    actual: remaining,
                })?;
            Self::new(algorithm, data)
        })
    }

    /// The whole buffer is one key: the bytes after the tag must be exactly
    /// the algorithm's key length.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let (&tag, data) = bytes.split_first().ok_or(CodecError::BufferUnderrun {
            needed: 1,
            remaining: 0,
        })?;
        Self::new(KeyAlgorithm::try_from(tag)?, data)
    }
}

/// Parse an algorithm-tagged public key from its bytes.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, CodecError> {
    PublicKey::from_bytes(bytes)
}

/// Derive the account hash of `key`.
pub fn derive_account_hash(key: &PublicKey) -> AccountHash {
    key.to_account_hash()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPOSER_KEY: &str = "01cd807fb41345d8dd5a61da7991e1468173acbee53920e4dfe0d28cb8825ac664";
    const PROPOSER_KEY_CHECKSUMMED: &str =
        "01cd807fb41345d8dD5A61da7991e1468173acbEE53920E4DFe0D28Cb8825AC664";
    // Compressed secp256k1 generator point.
    const SECP_GENERATOR: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn test_parse_and_derive_account_hash() {
        let key = parse_public_key(&hex::decode(PROPOSER_KEY).unwrap()).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ed25519);
        assert_eq!(
            hex::encode(derive_account_hash(&key).as_bytes()),
            "998c5fd4e7b568bedd78e05555c83c61893dc5d8546ce0bec8b30e1c570f21aa"
        );
    }

    #[test]
    fn test_hex_form() {
        let key: PublicKey = PROPOSER_KEY.parse().unwrap();
        assert_eq!(key.to_string(), PROPOSER_KEY_CHECKSUMMED);
        let parsed: PublicKey = PROPOSER_KEY_CHECKSUMMED.parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_secp256k1_key() {
        let bytes = hex::decode(format!("02{}", SECP_GENERATOR)).unwrap();
        let key = parse_public_key(&bytes).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Secp256k1);
        assert_eq!(key.as_bytes().len(), 33);
        assert_eq!(key.to_bytes().unwrap(), bytes);

        let mut preimage = b"secp256k1\0".to_vec();
        preimage.extend_from_slice(key.as_bytes());
        assert_eq!(key.to_account_hash().as_bytes(), &blake2b256(&preimage));
    }

    #[test]
    fn test_length_mismatch() {
        let mut bytes = hex::decode(PROPOSER_KEY).unwrap();
        bytes.push(0);
        assert_eq!(
            parse_public_key(&bytes),
            Err(CodecError::LengthMismatch {
                expected: 32,
                actual: 33
            })
        );
        assert_eq!(
            parse_public_key(&bytes[..20]),
            Err(CodecError::LengthMismatch {
                expected: 32,
                actual: 19
            })
        );
        // An Ed25519-sized payload under the Secp256k1 tag.
        bytes[0] = 2;
        bytes.pop();
        assert_eq!(
            parse_public_key(&bytes),
            Err(CodecError::LengthMismatch {
                expected: 33,
                actual: 32
            })
        );
    }

    #[test]
    fn test_unknown_algorithm_tag() {
        assert!(matches!(
            parse_public_key(&[0u8; 33]),
            Err(CodecError::InvalidTag { tag: 0, .. })
        ));
        assert!(matches!(
            parse_public_key(&[3u8; 34]),
            Err(CodecError::InvalidTag { tag: 3, .. })
        ));
        assert!(parse_public_key(&[]).unwrap_err().is_underrun());
    }

    #[test]
    fn test_secp256k1_invalid_curve_point_rejected() {
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&[0u8; 33]);
        assert_eq!(parse_public_key(&bytes), Err(CodecError::InvalidCurvePoint));
    }

    #[test]
    fn test_read_from_cursor_short_buffer() {
        let bytes = hex::decode(&PROPOSER_KEY[..40]).unwrap();
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(
            PublicKey::read_from(&mut cursor),
            Err(CodecError::LengthMismatch { expected: 32, .. })
        ));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_account_hash_deterministic() {
        let key: PublicKey = PROPOSER_KEY.parse().unwrap();
        let again: PublicKey = PROPOSER_KEY.parse().unwrap();
        assert_eq!(key.to_account_hash(), again.to_account_hash());
        assert_eq!(AccountHash::from(&key), key.to_account_hash());
    }

    #[test]
    fn test_serde_roundtrip() {
        let key: PublicKey = PROPOSER_KEY.parse().unwrap();
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json.as_str().unwrap(), PROPOSER_KEY_CHECKSUMMED);
        let parsed: PublicKey = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(matches!("0".parse::<PublicKey>(), Err(ParseKeyError::InvalidFormat(_))));
        assert!(matches!("zz00".parse::<PublicKey>(), Err(ParseKeyError::Codec(_))));
        assert!(matches!(
            "05".parse::<PublicKey>(),
            Err(ParseKeyError::Codec(CodecError::InvalidTag { tag: 5, .. }))
        ));
    }
}
