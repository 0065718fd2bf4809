//! Type descriptors of the value algebra.

use std::fmt::{self, Display};

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::codec::{ByteCursor, ByteWriter, DecodeLimits, FromBytes, ToBytes};
use crate::error::CodecError;

// Network-assigned type tags.
const TAG_BOOL: u8 = 0;
const TAG_I32: u8 = 1;
const TAG_I64: u8 = 2;
const TAG_U8: u8 = 3;
const TAG_U32: u8 = 4;
const TAG_U64: u8 = 5;
const TAG_U128: u8 = 6;
const TAG_U256: u8 = 7;
const TAG_U512: u8 = 8;
const TAG_UNIT: u8 = 9;
const TAG_STRING: u8 = 10;
const TAG_KEY: u8 = 11;
const TAG_UREF: u8 = 12;
const TAG_OPTION: u8 = 13;
const TAG_LIST: u8 = 14;
const TAG_BYTE_ARRAY: u8 = 15;
const TAG_RESULT: u8 = 16;
const TAG_MAP: u8 = 17;
const TAG_TUPLE1: u8 = 18;
const TAG_TUPLE3: u8 = 20;
const TAG_ANY: u8 = 21;
const TAG_PUBLIC_KEY: u8 = 22;

/// The declared type of a [`CLValue`](super::CLValue).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CLType {
    Bool,
    I32,
    I64,
    U8,
    U32,
    U64,
    U128,
    U256,
    U512,
    Unit,
    String,
    Key,
    URef,
    PublicKey,
    Option(Box<CLType>),
    List(Box<CLType>),
    /// Fixed-length byte array; the length is part of the type.
    ByteArray(u32),
    Map {
        key: Box<CLType>,
        value: Box<CLType>,
    },
    /// Opaque bytes.
    Any,
}

impl CLType {
    pub fn option(inner: CLType) -> Self {
        CLType::Option(Box::new(inner))
    }

    pub fn list(inner: CLType) -> Self {
        CLType::List(Box::new(inner))
    }

    pub fn map(key: CLType, value: CLType) -> Self {
        CLType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Binary type tag.
    pub fn tag(&self) -> u8 {
        match self {
            CLType::Bool => TAG_BOOL,
            CLType::I32 => TAG_I32,
            CLType::I64 => TAG_I64,
            CLType::U8 => TAG_U8,
            CLType::U32 => TAG_U32,
            CLType::U64 => TAG_U64,
            CLType::U128 => TAG_U128,
            CLType::U256 => TAG_U256,
            CLType::U512 => TAG_U512,
            CLType::Unit => TAG_UNIT,
            CLType::String => TAG_STRING,
            CLType::Key => TAG_KEY,
            CLType::URef => TAG_UREF,
            CLType::Option(_) => TAG_OPTION,
            CLType::List(_) => TAG_LIST,
            CLType::ByteArray(_) => TAG_BYTE_ARRAY,
            CLType::Map { .. } => TAG_MAP,
            CLType::Any => TAG_ANY,
            CLType::PublicKey => TAG_PUBLIC_KEY,
        }
    }

    /// Name of a type without parameters, as used in JSON.
    fn simple_name(&self) -> Option<&'static str> {
        Some(match self {
            CLType::Bool => "Bool",
            CLType::I32 => "I32",
            CLType::I64 => "I64",
            CLType::U8 => "U8",
            CLType::U32 => "U32",
            CLType::U64 => "U64",
            CLType::U128 => "U128",
            CLType::U256 => "U256",
            CLType::U512 => "U512",
            CLType::Unit => "Unit",
            CLType::String => "String",
            CLType::Key => "Key",
            CLType::URef => "URef",
            CLType::PublicKey => "PublicKey",
            CLType::Any => "Any",
            CLType::Option(_) | CLType::List(_) | CLType::ByteArray(_) | CLType::Map { .. } => {
                return None;
            }
        })
    }

    fn from_simple_name(name: &str) -> Option<Self> {
        Some(match name {
            "Bool" => CLType::Bool,
            "I32" => CLType::I32,
            "I64" => CLType::I64,
            "U8" => CLType::U8,
            "U32" => CLType::U32,
            "U64" => CLType::U64,
            "U128" => CLType::U128,
            "U256" => CLType::U256,
            "U512" => CLType::U512,
            "Unit" => CLType::Unit,
            "String" => CLType::String,
            "Key" => CLType::Key,
            "URef" => CLType::URef,
            "PublicKey" => CLType::PublicKey,
            "Any" => CLType::Any,
            _ => return None,
        })
    }

    /// Decode a type descriptor, refusing nesting deeper than `limits` allow.
    pub fn read_with_limits(
        cursor: &mut ByteCursor<'_>,
        limits: &DecodeLimits,
    ) -> Result<Self, CodecError> {
        cursor.atomically(|c| Self::read_at(c, limits, 0))
    }

    fn read_at(
        cursor: &mut ByteCursor<'_>,
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<Self, CodecError> {
        let tag = cursor.read_u8()?;
        Ok(match tag {
            TAG_BOOL => CLType::Bool,
            TAG_I32 => CLType::I32,
            TAG_I64 => CLType::I64,
            TAG_U8 => CLType::U8,
            TAG_U32 => CLType::U32,
            TAG_U64 => CLType::U64,
            TAG_U128 => CLType::U128,
            TAG_U256 => CLType::U256,
            TAG_U512 => CLType::U512,
            TAG_UNIT => CLType::Unit,
            TAG_STRING => CLType::String,
            TAG_KEY => CLType::Key,
            TAG_UREF => CLType::URef,
            TAG_OPTION => {
                let depth = limits.descend(depth)?;
                CLType::option(Self::read_at(cursor, limits, depth)?)
            }
            TAG_LIST => {
                let depth = limits.descend(depth)?;
                CLType::list(Self::read_at(cursor, limits, depth)?)
            }
            TAG_BYTE_ARRAY => CLType::ByteArray(cursor.read_u32()?),
            TAG_MAP => {
                let depth = limits.descend(depth)?;
                let key = Self::read_at(cursor, limits, depth)?;
                let value = Self::read_at(cursor, limits, depth)?;
                CLType::map(key, value)
            }
            TAG_ANY => CLType::Any,
            TAG_PUBLIC_KEY => CLType::PublicKey,
            TAG_RESULT | TAG_TUPLE1..=TAG_TUPLE3 => return Err(CodecError::UnsupportedType(tag)),
            _ => return Err(CodecError::invalid_tag("cl type", tag)),
        })
    }

    /// Build a type from its JSON form, e.g. `{"Option": "U64"}`.
    pub fn from_json(json: &JsonValue, limits: &DecodeLimits) -> Result<Self, String> {
        Self::from_json_at(json, limits, 0)
    }

    fn from_json_at(json: &JsonValue, limits: &DecodeLimits, depth: usize) -> Result<Self, String> {
        if let Some(name) = json.as_str() {
            return Self::from_simple_name(name).ok_or_else(|| format!("unknown CLType '{name}'"));
        }

        let object = json
            .as_object()
            .filter(|o| o.len() == 1)
            .ok_or_else(|| format!("invalid CLType: {json}"))?;
        let (name, inner) = object
            .iter()
            .next()
            .ok_or_else(|| format!("invalid CLType: {json}"))?;
        let nested = |inner: &JsonValue| -> Result<CLType, String> {
            let depth = limits.descend(depth).map_err(|e| e.to_string())?;
            Self::from_json_at(inner, limits, depth)
        };

        match name.as_str() {
            "Option" => Ok(CLType::option(nested(inner)?)),
            "List" => Ok(CLType::list(nested(inner)?)),
            "ByteArray" => inner
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(CLType::ByteArray)
                .ok_or_else(|| format!("invalid ByteArray length: {inner}")),
            "Map" => {
                let key = inner
                    .get("key")
                    .ok_or_else(|| "Map type is missing 'key'".to_string())?;
                let value = inner
                    .get("value")
                    .ok_or_else(|| "Map type is missing 'value'".to_string())?;
                Ok(CLType::map(nested(key)?, nested(value)?))
            }
            other => Err(format!("unsupported CLType '{other}'")),
        }
    }
}

impl Display for CLType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.simple_name() {
            return f.write_str(name);
        }
        match self {
            CLType::Option(inner) => write!(f, "Option({inner})"),
            CLType::List(inner) => write!(f, "List({inner})"),
            CLType::ByteArray(len) => write!(f, "ByteArray({len})"),
            CLType::Map { key, value } => write!(f, "Map({key}, {value})"),
            _ => Ok(()),
        }
    }
}

impl ToBytes for CLType {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(self.tag());
        match self {
            CLType::Option(inner) | CLType::List(inner) => inner.write_bytes(writer),
            CLType::ByteArray(len) => {
                writer.write_u32(*len);
                Ok(())
            }
            CLType::Map { key, value } => {
                key.write_bytes(writer)?;
                value.write_bytes(writer)
            }
            _ => Ok(()),
        }
    }
}

impl FromBytes for CLType {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        Self::read_with_limits(cursor, &DecodeLimits::default())
    }
}

#[derive(Serialize)]
struct MapType<'a> {
    key: &'a CLType,
    value: &'a CLType,
}

impl Serialize for CLType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if let Some(name) = self.simple_name() {
            return s.serialize_str(name);
        }
        let mut map = s.serialize_map(Some(1))?;
        match self {
            CLType::Option(inner) => map.serialize_entry("Option", inner)?,
            CLType::List(inner) => map.serialize_entry("List", inner)?,
            CLType::ByteArray(len) => map.serialize_entry("ByteArray", len)?,
            CLType::Map { key, value } => map.serialize_entry("Map", &MapType { key, value })?,
            _ => {}
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CLType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(d)?;
        Self::from_json(&json, &DecodeLimits::default()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binary_tags() {
        assert_eq!(CLType::Bool.to_bytes().unwrap(), vec![0]);
        assert_eq!(CLType::PublicKey.to_bytes().unwrap(), vec![22]);
        assert_eq!(
            CLType::option(CLType::list(CLType::String)).to_bytes().unwrap(),
            vec![13, 14, 10]
        );
        assert_eq!(
            CLType::ByteArray(32).to_bytes().unwrap(),
            vec![15, 32, 0, 0, 0]
        );
        assert_eq!(
            CLType::map(CLType::String, CLType::U512).to_bytes().unwrap(),
            vec![17, 10, 8]
        );
    }

    #[test]
    fn test_binary_roundtrip() {
        let ty = CLType::map(
            CLType::String,
            CLType::option(CLType::list(CLType::ByteArray(32))),
        );
        let bytes = ty.to_bytes().unwrap();
        assert_eq!(CLType::from_bytes(&bytes).unwrap(), ty);
    }

    #[test]
    fn test_unsupported_and_unknown_tags() {
        assert_eq!(CLType::from_bytes(&[16]), Err(CodecError::UnsupportedType(16)));
        assert_eq!(CLType::from_bytes(&[19]), Err(CodecError::UnsupportedType(19)));
        assert_eq!(
            CLType::from_bytes(&[23]),
            Err(CodecError::InvalidTag {
                kind: "cl type",
                tag: 23
            })
        );
    }

    #[test]
    fn test_depth_limit() {
        let limits = DecodeLimits {
            max_depth: 3,
            ..DecodeLimits::default()
        };
        let ok = [13u8, 13, 13, 5];
        let mut cursor = ByteCursor::new(&ok);
        assert!(CLType::read_with_limits(&mut cursor, &limits).is_ok());

        let deep = [13u8, 13, 13, 13, 5];
        let mut cursor = ByteCursor::new(&deep);
        assert_eq!(
            CLType::read_with_limits(&mut cursor, &limits),
            Err(CodecError::DepthLimitExceeded(3))
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_adversarial_nesting_fails_cleanly() {
        let mut bytes = vec![14u8; 100_000];
        bytes.push(0);
        assert_eq!(
            CLType::from_bytes(&bytes),
            Err(CodecError::DepthLimitExceeded(50))
        );
    }

    #[test]
    fn test_json_forms() {
        let cases = [
            (CLType::U64, json!("U64")),
            (CLType::option(CLType::U64), json!({"Option": "U64"})),
            (
                CLType::option(CLType::list(CLType::String)),
                json!({"Option": {"List": "String"}}),
            ),
            (CLType::ByteArray(32), json!({"ByteArray": 32})),
            (
                CLType::map(CLType::String, CLType::String),
                json!({"Map": {"key": "String", "value": "String"}}),
            ),
        ];
        for (ty, expected) in cases {
            assert_eq!(serde_json::to_value(&ty).unwrap(), expected);
            assert_eq!(serde_json::from_value::<CLType>(expected).unwrap(), ty);
        }
    }

    #[test]
    fn test_json_errors() {
        assert!(serde_json::from_value::<CLType>(json!("U1024")).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"Tuple1": ["U8"]})).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"ByteArray": -1})).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"Map": {"key": "U8"}})).is_err());
        assert!(serde_json::from_value::<CLType>(json!(5)).is_err());
    }

    #[test]
    fn test_json_depth_limit() {
        let mut json = json!("U8");
        for _ in 0..3 {
            json = json!({ "List": json });
        }
        let limits = DecodeLimits {
            max_depth: 2,
            ..DecodeLimits::default()
        };
        assert!(CLType::from_json(&json, &limits).is_err());
        assert!(CLType::from_json(&json, &DecodeLimits::default()).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(CLType::option(CLType::U64).to_string(), "Option(U64)");
        assert_eq!(
            CLType::map(CLType::String, CLType::ByteArray(32)).to_string(),
            "Map(String, ByteArray(32))"
        );
    }
}
