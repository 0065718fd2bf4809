//! Blake2b-256 digests and account hashes.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::checksummed_hex;
use crate::codec::{ByteCursor, ByteWriter, FromBytes, ToBytes};
use crate::error::{CodecError, ParseKeyError};

/// Length of every digest and account hash.
pub const DIGEST_LENGTH: usize = 32;

/// Length of an account hash.
pub const ACCOUNT_HASH_LENGTH: usize = DIGEST_LENGTH;

/// Prefix of the formatted account hash string.
pub const ACCOUNT_HASH_PREFIX: &str = "account-hash-";

type Blake2b256 = Blake2b<U32>;

/// Hash `data` with blake2b, 32-byte output.
pub fn blake2b256(data: impl AsRef<[u8]>) -> [u8; DIGEST_LENGTH] {
    let result = Blake2b256::digest(data.as_ref());
    let mut bytes = [0u8; DIGEST_LENGTH];
    bytes.copy_from_slice(&result);
    bytes
}

/// A 32-byte blake2b digest used for block, deploy and state root hashes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    /// The zero digest (32 zero bytes).
    pub const ZERO: Self = Self([0; DIGEST_LENGTH]);

    /// Hash the given data with blake2b-256.
    pub fn hash(data: impl AsRef<[u8]>) -> Self {
        Self(blake2b256(data))
    }

    /// Wrap raw 32 bytes.
    pub const fn from_raw(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw 32 bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Convert to a Vec<u8>.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Check if this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LENGTH]
    }
}

impl FromStr for Digest {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        checksummed_hex::decode_array(s).map(Self)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr = bytes.try_into().map_err(|_| CodecError::LengthMismatch {
            expected: DIGEST_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl From<[u8; DIGEST_LENGTH]> for Digest {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&checksummed_hex::encode(self.0))
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBytes for Digest {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_bytes(&self.0);
        Ok(())
    }
}

impl FromBytes for Digest {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.read_array().map(Self)
    }
}

// ============================================================================
// AccountHash
// ============================================================================

/// The canonical 32-byte account identifier.
///
/// Derived from a [`PublicKey`](super::PublicKey) with
/// [`PublicKey::to_account_hash`](super::PublicKey::to_account_hash), or decoded
/// from bytes or its `account-hash-…` string form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountHash([u8; ACCOUNT_HASH_LENGTH]);

impl AccountHash {
    pub(crate) const fn new(bytes: [u8; ACCOUNT_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw 32 bytes.
    pub const fn as_bytes(&self) -> &[u8; ACCOUNT_HASH_LENGTH] {
        &self.0
    }

    /// The `account-hash-<checksummed hex>` form.
    pub fn to_formatted_string(&self) -> String {
        format!("{}{}", ACCOUNT_HASH_PREFIX, checksummed_hex::encode(self.0))
    }

    /// Parse the `account-hash-<hex>` form.
    pub fn from_formatted_str(s: &str) -> Result<Self, ParseKeyError> {
        let hex_part = s
            .strip_prefix(ACCOUNT_HASH_PREFIX)
            .ok_or_else(|| ParseKeyError::InvalidFormat(s.to_string()))?;
        Ok(Self(checksummed_hex::decode_array(hex_part)?))
    }
}

impl FromStr for AccountHash {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl AsRef<[u8]> for AccountHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl Debug for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountHash({})", checksummed_hex::encode(self.0))
    }
}

impl Serialize for AccountHash {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for AccountHash {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBytes for AccountHash {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_bytes(&self.0);
        Ok(())
    }
}

impl FromBytes for AccountHash {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.read_array().map(Self)
    }
}
