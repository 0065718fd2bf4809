//! Unforgeable references.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::checksummed_hex;
use crate::codec::{ByteCursor, ByteWriter, FromBytes, ToBytes};
use crate::error::{CodecError, ParseKeyError};

/// Length of a URef address.
pub const UREF_ADDR_LENGTH: usize = 32;

/// Encoded length of a URef: address plus access-rights byte.
pub const UREF_SERIALIZED_LENGTH: usize = UREF_ADDR_LENGTH + 1;

const UREF_PREFIX: &str = "uref-";

/// Access rights carried by a [`URef`].
///
/// The discriminant is a bit set: read = 1, write = 2, add = 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum AccessRights {
    #[default]
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
    Add = 4,
    ReadAdd = 5,
    AddWrite = 6,
    ReadAddWrite = 7,
}

impl AccessRights {
    const READ: u8 = 0b001;
    const WRITE: u8 = 0b010;
    const ADD: u8 = 0b100;

    /// The tag byte.
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Access rights from a tag byte, or `None` if `bits` is above 7.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => AccessRights::None,
            1 => AccessRights::Read,
            2 => AccessRights::Write,
            3 => AccessRights::ReadWrite,
            4 => AccessRights::Add,
            5 => AccessRights::ReadAdd,
            6 => AccessRights::AddWrite,
            7 => AccessRights::ReadAddWrite,
            _ => return None,
        })
    }

    pub const fn is_readable(&self) -> bool {
        self.bits() & Self::READ != 0
    }

    pub const fn is_writeable(&self) -> bool {
        self.bits() & Self::WRITE != 0
    }

    pub const fn is_addable(&self) -> bool {
        self.bits() & Self::ADD != 0
    }

    /// Upper snake case name, e.g. `READ_ADD_WRITE`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessRights::None => "NONE",
            AccessRights::Read => "READ",
            AccessRights::Write => "WRITE",
            AccessRights::ReadWrite => "READ_WRITE",
            AccessRights::Add => "ADD",
            AccessRights::ReadAdd => "READ_ADD",
            AccessRights::AddWrite => "ADD_WRITE",
            AccessRights::ReadAddWrite => "READ_ADD_WRITE",
        }
    }
}

impl TryFrom<u8> for AccessRights {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or(CodecError::invalid_tag("access rights", bits))
    }
}

impl Display for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unforgeable reference: a 32-byte address and its access rights.
///
/// Formatted as `uref-<checksummed address>-<DDD>`, where `DDD` is the
/// zero-padded decimal access-rights tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct URef {
    addr: [u8; UREF_ADDR_LENGTH],
    access_rights: AccessRights,
}

impl URef {
    pub const fn new(addr: [u8; UREF_ADDR_LENGTH], access_rights: AccessRights) -> Self {
        Self {
            addr,
            access_rights,
        }
    }

    pub const fn addr(&self) -> &[u8; UREF_ADDR_LENGTH] {
        &self.addr
    }

    pub const fn access_rights(&self) -> AccessRights {
        self.access_rights
    }

    /// The same address with different access rights.
    pub const fn with_access_rights(self, access_rights: AccessRights) -> Self {
        Self::new(self.addr, access_rights)
    }

    /// Append the 33-byte encoding: address, then the access-rights byte.
    pub(crate) fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.addr);
        writer.write_u8(self.access_rights.bits());
    }

    /// The `uref-<hex>-<DDD>` form.
    pub fn to_formatted_string(&self) -> String {
        format!(
            "{}{}-{:03}",
            UREF_PREFIX,
            checksummed_hex::encode(self.addr),
            self.access_rights.bits()
        )
    }

    /// Parse the `uref-<hex>-<DDD>` form.
    pub fn from_formatted_str(s: &str) -> Result<Self, ParseKeyError> {
        let invalid = || ParseKeyError::InvalidFormat(s.to_string());

        let rest = s.strip_prefix(UREF_PREFIX).ok_or_else(invalid)?;
        let (addr_hex, rights) = rest.rsplit_once('-').ok_or_else(invalid)?;
        if rights.len() != 3 || !rights.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let bits: u8 = rights.parse().map_err(|_| invalid())?;
        let access_rights = AccessRights::from_bits(bits).ok_or_else(invalid)?;
        let addr = checksummed_hex::decode_array(addr_hex)?;
        Ok(Self::new(addr, access_rights))
    }
}

impl FromStr for URef {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl Display for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl Debug for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "URef({}, {})",
            checksummed_hex::encode(self.addr),
            self.access_rights
        )
    }
}

impl Serialize for URef {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for URef {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBytes for URef {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        self.write_to(writer);
        Ok(())
    }
}

impl FromBytes for URef {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| {
            let addr = c.read_array()?;
            let access_rights = AccessRights::try_from(c.read_u8()?)?;
            Ok(Self::new(addr, access_rights))
        })
    }
}

/// Encode a URef as its 33 bytes.
pub fn encode_uref(uref: &URef) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(UREF_SERIALIZED_LENGTH);
    uref.write_to(&mut writer);
    writer.into_bytes()
}

/// Decode a URef that spans all of `bytes`.
pub fn decode_uref(bytes: &[u8]) -> Result<URef, CodecError> {
    URef::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UREF_STR: &str =
        "uref-5ce1d189e8ccafdd5a959088ffd870f54b29bd5afeb05950dddcc12ec7dcbe90-007";
    const UREF_CHECKSUMMED: &str =
        "uref-5ce1d189E8cCAFdD5A959088ffD870F54B29BD5Afeb05950Dddcc12Ec7DcbE90-007";

    #[test]
    fn test_parse_formatted() {
        let uref: URef = UREF_STR.parse().unwrap();
        assert_eq!(uref.access_rights(), AccessRights::ReadAddWrite);
        assert_eq!(uref.addr()[0], 0x5c);
        assert_eq!(uref.to_string(), UREF_CHECKSUMMED);
        assert_eq!(UREF_CHECKSUMMED.parse::<URef>().unwrap(), uref);
    }

    #[test]
    fn test_suffix_is_zero_padded() {
        let uref = URef::new([0u8; 32], AccessRights::Read);
        assert!(uref.to_string().ends_with("-001"));
        let none = uref.with_access_rights(AccessRights::None);
        assert!(none.to_string().ends_with("-000"));
    }

    #[test]
    fn test_parse_invalid() {
        let addr = "5ce1d189e8ccafdd5a959088ffd870f54b29bd5afeb05950dddcc12ec7dcbe90";
        for bad in [
            format!("uref-{addr}"),
            format!("uref-{addr}-008"),
            format!("uref-{addr}-07"),
            format!("uref-{addr}-0x7"),
            format!("hash-{addr}-007"),
        ] {
            assert!(
                matches!(bad.parse::<URef>(), Err(ParseKeyError::InvalidFormat(_))),
                "{bad}"
            );
        }
        assert!(matches!(
            "uref-00ff-007".parse::<URef>(),
            Err(ParseKeyError::Codec(CodecError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let uref: URef = UREF_STR.parse().unwrap();
        let bytes = encode_uref(&uref);
        assert_eq!(bytes.len(), UREF_SERIALIZED_LENGTH);
        assert_eq!(bytes[32], 7);
        assert_eq!(uref.to_bytes().unwrap(), bytes);
        assert_eq!(decode_uref(&bytes).unwrap(), uref);
    }

    #[test]
    fn test_invalid_access_rights_byte() {
        let mut bytes = [1u8; 33];
        bytes[32] = 8;
        assert_eq!(
            decode_uref(&bytes),
            Err(CodecError::InvalidTag {
                kind: "access rights",
                tag: 8
            })
        );

        let mut cursor = ByteCursor::new(&bytes);
        assert!(URef::read_from(&mut cursor).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_short_buffer() {
        assert!(decode_uref(&[0u8; 32]).unwrap_err().is_underrun());
    }

    #[test]
    fn test_access_rights_bits() {
        for bits in 0u8..=7 {
            let rights = AccessRights::from_bits(bits).unwrap();
            assert_eq!(rights.bits(), bits);
            assert_eq!(rights.is_readable(), bits & 1 != 0);
            assert_eq!(rights.is_writeable(), bits & 2 != 0);
            assert_eq!(rights.is_addable(), bits & 4 != 0);
        }
        assert_eq!(AccessRights::from_bits(8), None);
        assert_eq!(AccessRights::ReadAddWrite.to_string(), "READ_ADD_WRITE");
        assert_eq!(AccessRights::default(), AccessRights::None);
    }

    #[test]
    fn test_serde() {
        let uref: URef = UREF_STR.parse().unwrap();
        let json = serde_json::to_string(&uref).unwrap();
        assert_eq!(json, format!("\"{UREF_CHECKSUMMED}\""));
        assert_eq!(serde_json::from_str::<URef>(&json).unwrap(), uref);
    }
}
