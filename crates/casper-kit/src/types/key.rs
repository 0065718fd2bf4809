//! Global-state keys.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::digest::{ACCOUNT_HASH_PREFIX, AccountHash};
use super::uref::URef;
use crate::checksummed_hex;
use crate::codec::{ByteCursor, ByteWriter, FromBytes, ToBytes};
use crate::error::{CodecError, ParseKeyError};

const HASH_PREFIX: &str = "hash-";
const UREF_PREFIX: &str = "uref-";
const TRANSFER_PREFIX: &str = "transfer-";
const DEPLOY_INFO_PREFIX: &str = "deploy-";
const ERA_INFO_PREFIX: &str = "era-";
const BALANCE_PREFIX: &str = "balance-";
const BID_PREFIX: &str = "bid-";
const WITHDRAW_PREFIX: &str = "withdraw-";

/// Tag byte of each [`Key`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyTag {
    Account = 0,
    Hash = 1,
    URef = 2,
    Transfer = 3,
    DeployInfo = 4,
    EraInfo = 5,
    Balance = 6,
    Bid = 7,
    Withdraw = 8,
}

impl TryFrom<u8> for KeyTag {
    type Error = CodecError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => KeyTag::Account,
            1 => KeyTag::Hash,
            2 => KeyTag::URef,
            3 => KeyTag::Transfer,
            4 => KeyTag::DeployInfo,
            5 => KeyTag::EraInfo,
            6 => KeyTag::Balance,
            7 => KeyTag::Bid,
            8 => KeyTag::Withdraw,
            _ => return Err(CodecError::invalid_tag("key", tag)),
        })
    }
}

/// A key addressing an entry in global state.
///
/// # Example
///
/// ```
/// use casper_kit::Key;
///
/// let key: Key = "era-42".parse().unwrap();
/// assert_eq!(key, Key::EraInfo(42));
/// assert_eq!(hex::encode(casper_kit::encode_key(&key)), "052a00000000000000");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Account(AccountHash),
    Hash([u8; 32]),
    URef(URef),
    Transfer([u8; 32]),
    DeployInfo([u8; 32]),
    EraInfo(u64),
    Balance([u8; 32]),
    Bid([u8; 32]),
    Withdraw([u8; 32]),
}

impl Key {
    pub fn tag(&self) -> KeyTag {
        match self {
            Key::Account(_) => KeyTag::Account,
            Key::Hash(_) => KeyTag::Hash,
            Key::URef(_) => KeyTag::URef,
            Key::Transfer(_) => KeyTag::Transfer,
            Key::DeployInfo(_) => KeyTag::DeployInfo,
            Key::EraInfo(_) => KeyTag::EraInfo,
            Key::Balance(_) => KeyTag::Balance,
            Key::Bid(_) => KeyTag::Bid,
            Key::Withdraw(_) => KeyTag::Withdraw,
        }
    }

    /// Variant name as it appears in JSON (`"Account"`, `"Hash"`, ...).
    pub fn variant_name(&self) -> &'static str {
        match self {
            Key::Account(_) => "Account",
            Key::Hash(_) => "Hash",
            Key::URef(_) => "URef",
            Key::Transfer(_) => "Transfer",
            Key::DeployInfo(_) => "DeployInfo",
            Key::EraInfo(_) => "EraInfo",
            Key::Balance(_) => "Balance",
            Key::Bid(_) => "Bid",
            Key::Withdraw(_) => "Withdraw",
        }
    }

    /// The account hash, if this is an account key.
    pub fn into_account(self) -> Option<AccountHash> {
        match self {
            Key::Account(hash) => Some(hash),
            _ => None,
        }
    }

    /// The URef, if this is a URef key.
    pub fn as_uref(&self) -> Option<&URef> {
        match self {
            Key::URef(uref) => Some(uref),
            _ => None,
        }
    }

    /// The prefixed human-readable form, e.g. `hash-<checksummed hex>`.
    pub fn to_formatted_string(&self) -> String {
        let hashed = |prefix: &str, bytes: &[u8; 32]| {
            format!("{}{}", prefix, checksummed_hex::encode(bytes))
        };
        match self {
            Key::Account(hash) => hash.to_formatted_string(),
            Key::Hash(bytes) => hashed(HASH_PREFIX, bytes),
            Key::URef(uref) => uref.to_formatted_string(),
            Key::Transfer(bytes) => hashed(TRANSFER_PREFIX, bytes),
            Key::DeployInfo(bytes) => hashed(DEPLOY_INFO_PREFIX, bytes),
            Key::EraInfo(era_id) => format!("{}{}", ERA_INFO_PREFIX, era_id),
            Key::Balance(bytes) => hashed(BALANCE_PREFIX, bytes),
            Key::Bid(bytes) => hashed(BID_PREFIX, bytes),
            Key::Withdraw(bytes) => hashed(WITHDRAW_PREFIX, bytes),
        }
    }

    /// Parse any prefixed form produced by [`to_formatted_string`](Self::to_formatted_string).
    pub fn from_formatted_str(s: &str) -> Result<Self, ParseKeyError> {
        if s.starts_with(ACCOUNT_HASH_PREFIX) {
            return AccountHash::from_formatted_str(s).map(Key::Account);
        }
        if s.starts_with(UREF_PREFIX) {
            return URef::from_formatted_str(s).map(Key::URef);
        }
        if let Some(era) = s.strip_prefix(ERA_INFO_PREFIX) {
            // u64::from_str accepts a leading '+'; the network form never has one.
            if era.starts_with('+') {
                return Err(ParseKeyError::InvalidEraId(era.to_string()));
            }
            return era
                .parse()
                .map(Key::EraInfo)
                .map_err(|_| ParseKeyError::InvalidEraId(era.to_string()));
        }

        let hashed: [(&str, fn([u8; 32]) -> Key); 6] = [
            (HASH_PREFIX, Key::Hash),
            (TRANSFER_PREFIX, Key::Transfer),
            (DEPLOY_INFO_PREFIX, Key::DeployInfo),
            (BALANCE_PREFIX, Key::Balance),
            (BID_PREFIX, Key::Bid),
            (WITHDRAW_PREFIX, Key::Withdraw),
        ];
        for (prefix, make) in hashed {
            if let Some(hex_part) = s.strip_prefix(prefix) {
                return Ok(make(checksummed_hex::decode_array(hex_part)?));
            }
        }
        Err(ParseKeyError::UnknownPrefix(s.to_string()))
    }
}

impl From<AccountHash> for Key {
    fn from(hash: AccountHash) -> Self {
        Key::Account(hash)
    }
}

impl From<URef> for Key {
    fn from(uref: URef) -> Self {
        Key::URef(uref)
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key::{}(", self.variant_name())?;
        match self {
            Key::Account(hash) => f.write_str(&checksummed_hex::encode(hash))?,
            Key::URef(uref) => write!(f, "{:?}", uref)?,
            Key::EraInfo(era_id) => write!(f, "{}", era_id)?,
            Key::Hash(bytes)
            | Key::Transfer(bytes)
            | Key::DeployInfo(bytes)
            | Key::Balance(bytes)
            | Key::Bid(bytes)
            | Key::Withdraw(bytes) => f.write_str(&checksummed_hex::encode(bytes))?,
        }
        f.write_str(")")
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBytes for Key {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_bytes(&encode_key(self));
        Ok(())
    }
}

impl FromBytes for Key {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| {
            Ok(match KeyTag::try_from(c.read_u8()?)? {
                KeyTag::Account => Key::Account(AccountHash::read_from(c)?),
                KeyTag::Hash => Key::Hash(c.read_array()?),
                KeyTag::URef => Key::URef(URef::read_from(c)?),
                KeyTag::Transfer => Key::Transfer(c.read_array()?),
                KeyTag::DeployInfo => Key::DeployInfo(c.read_array()?),
                KeyTag::EraInfo => Key::EraInfo(c.read_u64()?),
                KeyTag::Balance => Key::Balance(c.read_array()?),
                KeyTag::Bid => Key::Bid(c.read_array()?),
                KeyTag::Withdraw => Key::Withdraw(c.read_array()?),
            })
        })
    }
}

/// Encode a key as its tag byte followed by the variant payload.
pub fn encode_key(key: &Key) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u8(key.tag() as u8);
    match key {
        Key::Account(hash) => writer.write_bytes(hash.as_bytes()),
        Key::URef(uref) => uref.write_to(&mut writer),
        Key::EraInfo(era_id) => writer.write_u64(*era_id),
        Key::Hash(bytes)
        | Key::Transfer(bytes)
        | Key::DeployInfo(bytes)
        | Key::Balance(bytes)
        | Key::Bid(bytes)
        | Key::Withdraw(bytes) => writer.write_bytes(bytes),
    }
    writer.into_bytes()
}

/// Decode a key that spans all of `bytes`.
pub fn decode_key(bytes: &[u8]) -> Result<Key, CodecError> {
    Key::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessRights;

    const HASH_KEY_BYTES: &str =
        "0123cd4354304f4eb1dd6739cba66d41579936e2cec1553096d97aa4efb6b661e6";

    #[test]
    fn test_decode_hash_key() {
        let bytes = hex::decode(HASH_KEY_BYTES).unwrap();
        let key = decode_key(&bytes).unwrap();
        assert_eq!(key.tag(), KeyTag::Hash);
        assert_eq!(
            key.to_formatted_string().to_lowercase(),
            "hash-23cd4354304f4eb1dd6739cba66d41579936e2cec1553096d97aa4efb6b661e6"
        );
        assert_eq!(encode_key(&key), bytes);
    }

    #[test]
    fn test_tags_match_wire_contract() {
        let keys = [
            Key::Account(AccountHash::new([1; 32])),
            Key::Hash([2; 32]),
            Key::URef(URef::new([3; 32], AccessRights::Read)),
            Key::Transfer([4; 32]),
            Key::DeployInfo([5; 32]),
            Key::EraInfo(6),
            Key::Balance([7; 32]),
            Key::Bid([8; 32]),
            Key::Withdraw([9; 32]),
        ];
        for (expected_tag, key) in keys.iter().enumerate() {
            let bytes = encode_key(key);
            assert_eq!(bytes[0] as usize, expected_tag);
            assert_eq!(key.to_bytes().unwrap(), bytes);
            assert_eq!(decode_key(&bytes).unwrap(), *key);

            let formatted = key.to_formatted_string();
            assert_eq!(formatted.parse::<Key>().unwrap(), *key, "{formatted}");
        }
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(encode_key(&Key::Hash([0; 32])).len(), 33);
        assert_eq!(
            encode_key(&Key::URef(URef::new([0; 32], AccessRights::None))).len(),
            34
        );
        assert_eq!(encode_key(&Key::EraInfo(u64::MAX)).len(), 9);
    }

    #[test]
    fn test_uref_key_payload_is_uref_encoding() {
        let uref = URef::new([0xa5; 32], AccessRights::ReadAddWrite);
        let bytes = encode_key(&Key::URef(uref));
        assert_eq!(bytes[0], KeyTag::URef as u8);
        assert_eq!(&bytes[1..], crate::types::encode_uref(&uref).as_slice());
        assert_eq!(&bytes[1..], uref.to_bytes().unwrap().as_slice());
    }

    #[test]
    fn test_unknown_tag() {
        let mut bytes = vec![9u8];
        bytes.extend_from_slice(&[0; 32]);
        assert_eq!(
            decode_key(&bytes),
            Err(CodecError::InvalidTag { kind: "key", tag: 9 })
        );
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = hex::decode(HASH_KEY_BYTES).unwrap();
        let mut cursor = ByteCursor::new(&bytes[..20]);
        assert!(Key::read_from(&mut cursor).unwrap_err().is_underrun());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_parse_transfer_key() {
        let s = "transfer-9f5fe878c29fc3bf537c0509ec5abe1781a72bb6a3197a440e3e68247fba5909";
        let key: Key = s.parse().unwrap();
        assert!(matches!(key, Key::Transfer(bytes) if bytes[0] == 0x9f));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "contract-00".parse::<Key>(),
            Err(ParseKeyError::UnknownPrefix(_))
        ));
        assert!(matches!(
            "era-abc".parse::<Key>(),
            Err(ParseKeyError::InvalidEraId(_))
        ));
        assert!(matches!(
            "era-+1".parse::<Key>(),
            Err(ParseKeyError::InvalidEraId(_))
        ));
        assert!(matches!(
            "hash-00".parse::<Key>(),
            Err(ParseKeyError::Codec(CodecError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_accessors() {
        let hash = AccountHash::new([1; 32]);
        assert_eq!(Key::from(hash).into_account(), Some(hash));
        assert_eq!(Key::Hash([0; 32]).into_account(), None);

        let uref = URef::new([3; 32], AccessRights::ReadAddWrite);
        assert_eq!(Key::from(uref).as_uref(), Some(&uref));
        assert_eq!(Key::EraInfo(1).as_uref(), None);
    }

    #[test]
    fn test_debug_form() {
        let bytes = hex::decode(HASH_KEY_BYTES).unwrap();
        let key = decode_key(&bytes).unwrap();
        assert_eq!(
            format!("{:?}", key),
            "Key::Hash(23CD4354304F4eB1dD6739CBA66d41579936e2CEC1553096D97aA4eFB6B661e6)"
        );
        assert_eq!(format!("{:?}", Key::EraInfo(7)), "Key::EraInfo(7)");
    }

    #[test]
    fn test_serde() {
        let key = Key::EraInfo(1200);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"era-1200\"");
        let parsed: Key = serde_json::from_str("\"era-1200\"").unwrap();
        assert_eq!(parsed, key);
    }
}
