//! Typed values and their canonical encoding.
//!
//! A [`Value`] is the parsed structure; it carries no type information of its
//! own beyond its variant, so decoding always needs the declared [`CLType`].
//! A [`CLValue`] bundles the declared type, the encoded bytes, and the parsed
//! structure, and keeps the three consistent.
//!
//! ```
//! use casper_kit::{CLType, CLValue, Value};
//!
//! let value = CLValue::from_bytes(CLType::option(CLType::U64), hex::decode("017ce8020000000000").unwrap()).unwrap();
//! assert_eq!(value.parsed(), &Value::Option(Some(Box::new(Value::U64(190_588)))));
//! ```

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value as JsonValue, json};
use serde_with::{hex::Hex, serde_as};
use tracing::debug;

use super::cl_type::CLType;
use super::key::Key;
use super::public_key::PublicKey;
use super::uref::{UREF_SERIALIZED_LENGTH, URef};
use crate::codec::wide::{read_wide, write_wide};
use crate::codec::{ByteCursor, ByteWriter, DecodeLimits, FromBytes, ToBytes, WideWidth};
use crate::error::{CodecError, Error};

/// A parsed value of the value algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U8(u8),
    U32(u32),
    U64(u64),
    U128(BigUint),
    U256(BigUint),
    U512(BigUint),
    Unit,
    String(String),
    Key(Key),
    URef(URef),
    PublicKey(PublicKey),
    Option(Option<Box<Value>>),
    List(Vec<Value>),
    ByteArray(Vec<u8>),
    /// Entries in the order they were supplied or decoded.
    Map(Vec<(Value, Value)>),
    /// Opaque bytes, kept verbatim.
    Any(Vec<u8>),
}

impl Value {
    pub fn u128(value: impl Into<BigUint>) -> Self {
        Value::U128(value.into())
    }

    pub fn u256(value: impl Into<BigUint>) -> Self {
        Value::U256(value.into())
    }

    pub fn u512(value: impl Into<BigUint>) -> Self {
        Value::U512(value.into())
    }

    /// `Some(inner)`.
    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }

    /// Name of the variant, e.g. `"U512"` or `"Map"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::U8(_) => "U8",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::U128(_) => "U128",
            Value::U256(_) => "U256",
            Value::U512(_) => "U512",
            Value::Unit => "Unit",
            Value::String(_) => "String",
            Value::Key(_) => "Key",
            Value::URef(_) => "URef",
            Value::PublicKey(_) => "PublicKey",
            Value::Option(_) => "Option",
            Value::List(_) => "List",
            Value::ByteArray(_) => "ByteArray",
            Value::Map(_) => "Map",
            Value::Any(_) => "Any",
        }
    }

    /// True if `self` is a value of type `ty`.
    ///
    /// Wide integers must also fit the width of their type, and byte arrays
    /// must have the declared length.
    pub fn conforms_to(&self, ty: &CLType) -> bool {
        match (self, ty) {
            (Value::Bool(_), CLType::Bool)
            | (Value::I32(_), CLType::I32)
            | (Value::I64(_), CLType::I64)
            | (Value::U8(_), CLType::U8)
            | (Value::U32(_), CLType::U32)
            | (Value::U64(_), CLType::U64)
            | (Value::Unit, CLType::Unit)
            | (Value::String(_), CLType::String)
            | (Value::Key(_), CLType::Key)
            | (Value::URef(_), CLType::URef)
            | (Value::PublicKey(_), CLType::PublicKey)
            | (Value::Any(_), CLType::Any) => true,
            (Value::U128(v), CLType::U128) => WideWidth::U128.fits(v),
            (Value::U256(v), CLType::U256) => WideWidth::U256.fits(v),
            (Value::U512(v), CLType::U512) => WideWidth::U512.fits(v),
            (Value::Option(None), CLType::Option(_)) => true,
            (Value::Option(Some(inner)), CLType::Option(inner_ty)) => inner.conforms_to(inner_ty),
            (Value::List(items), CLType::List(item_ty)) => {
                items.iter().all(|item| item.conforms_to(item_ty))
            }
            (Value::ByteArray(bytes), CLType::ByteArray(len)) => bytes.len() == *len as usize,
            (Value::Map(entries), CLType::Map { key, value }) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value)),
            _ => false,
        }
    }

    /// Decode one value of type `ty`.
    ///
    /// All-or-nothing: on failure the cursor is where it was before the call.
    /// `Any` consumes everything left in the cursor.
    pub fn read(
        ty: &CLType,
        cursor: &mut ByteCursor<'_>,
        limits: &DecodeLimits,
    ) -> Result<Self, CodecError> {
        cursor.atomically(|c| Self::read_at(ty, c, limits, 0))
    }

    fn read_at(
        ty: &CLType,
        cursor: &mut ByteCursor<'_>,
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<Self, CodecError> {
        Ok(match ty {
            CLType::Bool => Value::Bool(bool::read_from(cursor)?),
            CLType::I32 => Value::I32(cursor.read_i32()?),
            CLType::I64 => Value::I64(cursor.read_i64()?),
            CLType::U8 => Value::U8(cursor.read_u8()?),
            CLType::U32 => Value::U32(cursor.read_u32()?),
            CLType::U64 => Value::U64(cursor.read_u64()?),
            CLType::U128 => Value::U128(read_wide(cursor, WideWidth::U128)?),
            CLType::U256 => Value::U256(read_wide(cursor, WideWidth::U256)?),
            CLType::U512 => Value::U512(read_wide(cursor, WideWidth::U512)?),
            CLType::Unit => Value::Unit,
            CLType::String => Value::String(String::read_from(cursor)?),
            CLType::Key => Value::Key(Key::read_from(cursor)?),
            CLType::URef => Value::URef(URef::read_from(cursor)?),
            CLType::PublicKey => Value::PublicKey(PublicKey::read_from(cursor)?),
            CLType::Option(inner) => {
                let depth = limits.descend(depth)?;
                match cursor.read_u8()? {
                    0 => Value::Option(None),
                    1 => Value::some(Self::read_at(inner, cursor, limits, depth)?),
                    tag => return Err(CodecError::invalid_tag("option", tag)),
                }
            }
            CLType::List(item_ty) => {
                let depth = limits.descend(depth)?;
                let count = read_count(cursor, min_encoded_len(item_ty), limits)?;
                let mut items = Vec::with_capacity(count.min(cursor.remaining()));
                for _ in 0..count {
                    items.push(Self::read_at(item_ty, cursor, limits, depth)?);
                }
                Value::List(items)
            }
            CLType::ByteArray(len) => Value::ByteArray(cursor.read_bytes(*len as usize)?.to_vec()),
            CLType::Map { key, value } => {
                let depth = limits.descend(depth)?;
                let pair_len = min_encoded_len(key).saturating_add(min_encoded_len(value));
                let count = read_count(cursor, pair_len, limits)?;
                let mut entries = Vec::with_capacity(count.min(cursor.remaining()));
                for _ in 0..count {
                    let k = Self::read_at(key, cursor, limits, depth)?;
                    let v = Self::read_at(value, cursor, limits, depth)?;
                    entries.push((k, v));
                }
                Value::Map(entries)
            }
            CLType::Any => Value::Any(cursor.read_rest().to_vec()),
        })
    }

    /// The `parsed` rendering used in RPC JSON.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Bool(v) => json!(v),
            Value::I32(v) => json!(v),
            Value::I64(v) => json!(v),
            Value::U8(v) => json!(v),
            Value::U32(v) => json!(v),
            Value::U64(v) => json!(v),
            Value::U128(v) | Value::U256(v) | Value::U512(v) => json!(v.to_string()),
            Value::Unit | Value::Any(_) => JsonValue::Null,
            Value::String(s) => json!(s),
            Value::Key(key) => {
                let mut object = serde_json::Map::new();
                object.insert(key.variant_name().to_string(), json!(key.to_formatted_string()));
                JsonValue::Object(object)
            }
            Value::URef(uref) => json!(uref.to_formatted_string()),
            Value::PublicKey(key) => json!(key.to_hex()),
            Value::Option(None) => JsonValue::Null,
            Value::Option(Some(inner)) => inner.to_json(),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::ByteArray(bytes) => json!(hex::encode(bytes)),
            Value::Map(entries) => JsonValue::Array(
                entries
                    .iter()
                    .map(|(k, v)| json!({ "key": k.to_json(), "value": v.to_json() }))
                    .collect(),
            ),
        }
    }
}

/// Smallest number of bytes any value of `ty` occupies on the wire.
fn min_encoded_len(ty: &CLType) -> usize {
    match ty {
        CLType::Unit | CLType::Any => 0,
        CLType::ByteArray(len) => *len as usize,
        CLType::Bool | CLType::U8 | CLType::Option(_) => 1,
        CLType::U128 | CLType::U256 | CLType::U512 => 1,
        CLType::I32 | CLType::U32 | CLType::String | CLType::List(_) | CLType::Map { .. } => 4,
        CLType::I64 | CLType::U64 => 8,
        // Tag plus the era id, the shortest key payload.
        CLType::Key => 9,
        CLType::URef => UREF_SERIALIZED_LENGTH,
        CLType::PublicKey => 33,
    }
}

/// Read a collection count and check the input could hold that many elements.
///
/// Elements that encode to zero bytes cannot be bounded by the input, so their
/// count is checked against [`DecodeLimits::max_zero_width_len`] instead.
fn read_count(
    cursor: &mut ByteCursor<'_>,
    element_len: usize,
    limits: &DecodeLimits,
) -> Result<usize, CodecError> {
    let count = cursor.read_len()?;
    if element_len == 0 {
        if count > limits.max_zero_width_len {
            debug!(count, max = limits.max_zero_width_len, "zero-width collection too large");
            return Err(CodecError::CollectionTooLarge {
                count,
                max: limits.max_zero_width_len,
            });
        }
        return Ok(count);
    }
    let needed = count.saturating_mul(element_len);
    if needed > cursor.remaining() {
        return Err(CodecError::BufferUnderrun {
            needed,
            remaining: cursor.remaining(),
        });
    }
    Ok(count)
}

impl ToBytes for Value {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        match self {
            Value::Bool(v) => v.write_bytes(writer),
            Value::I32(v) => v.write_bytes(writer),
            Value::I64(v) => v.write_bytes(writer),
            Value::U8(v) => v.write_bytes(writer),
            Value::U32(v) => v.write_bytes(writer),
            Value::U64(v) => v.write_bytes(writer),
            Value::U128(v) => write_wide(writer, v, WideWidth::U128),
            Value::U256(v) => write_wide(writer, v, WideWidth::U256),
            Value::U512(v) => write_wide(writer, v, WideWidth::U512),
            Value::Unit => Ok(()),
            Value::String(s) => s.write_bytes(writer),
            Value::Key(key) => key.write_bytes(writer),
            Value::URef(uref) => uref.write_bytes(writer),
            Value::PublicKey(key) => key.write_bytes(writer),
            Value::Option(None) => {
                writer.write_u8(0);
                Ok(())
            }
            Value::Option(Some(inner)) => {
                writer.write_u8(1);
                inner.write_bytes(writer)
            }
            Value::List(items) => {
                writer.write_len(items.len())?;
                items.iter().try_for_each(|item| item.write_bytes(writer))
            }
            Value::ByteArray(bytes) | Value::Any(bytes) => {
                writer.write_bytes(bytes);
                Ok(())
            }
            Value::Map(entries) => {
                writer.write_len(entries.len())?;
                for (k, v) in entries {
                    k.write_bytes(writer)?;
                    v.write_bytes(writer)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u32 => U32,
    u64 => U64,
    String => String,
    Key => Key,
    URef => URef,
    PublicKey => PublicKey,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

/// Encode a value.
///
/// Fails only if a wide integer does not fit its width.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, CodecError> {
    value.to_bytes()
}

/// Decode a value of type `ty` spanning all of `bytes`.
pub fn decode_value(ty: &CLType, bytes: &[u8]) -> Result<Value, CodecError> {
    decode_value_with_limits(ty, bytes, &DecodeLimits::default())
}

/// [`decode_value`] with explicit decode limits.
pub fn decode_value_with_limits(
    ty: &CLType,
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<Value, CodecError> {
    let mut cursor = ByteCursor::new(bytes);
    let value = Value::read(ty, &mut cursor, limits)?;
    cursor.finish()?;
    Ok(value)
}

// ============================================================================
// CLValue
// ============================================================================

/// A value together with its declared type and its encoded bytes.
///
/// Re-encoding [`parsed`](Self::parsed) always reproduces
/// [`bytes`](Self::bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CLValue {
    cl_type: CLType,
    bytes: Vec<u8>,
    parsed: Value,
}

impl CLValue {
    /// Type-check and encode `value`.
    pub fn from_value(cl_type: CLType, value: Value) -> Result<Self, CodecError> {
        if !value.conforms_to(&cl_type) {
            return Err(CodecError::TypeMismatch {
                expected: cl_type.to_string(),
                found: value.kind().to_string(),
            });
        }
        let bytes = value.to_bytes()?;
        Ok(Self {
            cl_type,
            bytes,
            parsed: value,
        })
    }

    /// Decode `bytes` as a value of `cl_type`.
    pub fn from_bytes(cl_type: CLType, bytes: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        Self::from_bytes_with_limits(cl_type, bytes, &DecodeLimits::default())
    }

    /// [`from_bytes`](Self::from_bytes) with explicit decode limits.
    pub fn from_bytes_with_limits(
        cl_type: CLType,
        bytes: impl Into<Vec<u8>>,
        limits: &DecodeLimits,
    ) -> Result<Self, CodecError> {
        let bytes = bytes.into();
        let parsed = decode_value_with_limits(&cl_type, &bytes, limits)?;
        Ok(Self {
            cl_type,
            bytes,
            parsed,
        })
    }

    pub fn cl_type(&self) -> &CLType {
        &self.cl_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn parsed(&self) -> &Value {
        &self.parsed
    }

    pub fn into_parsed(self) -> Value {
        self.parsed
    }

    /// Parse the RPC JSON form `{"cl_type", "bytes", "parsed"}`.
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Render the RPC JSON form.
    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<CLValue> for Value {
    fn from(value: CLValue) -> Self {
        value.parsed
    }
}

#[serde_as]
#[derive(Serialize)]
struct CLValueJsonRef<'a> {
    cl_type: &'a CLType,
    #[serde_as(as = "Hex")]
    bytes: &'a [u8],
    parsed: JsonValue,
}

#[serde_as]
#[derive(Deserialize)]
struct CLValueJson {
    cl_type: CLType,
    #[serde_as(as = "Hex")]
    bytes: Vec<u8>,
    #[serde(default)]
    parsed: JsonValue,
}

impl Serialize for CLValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        CLValueJsonRef {
            cl_type: &self.cl_type,
            bytes: &self.bytes,
            parsed: self.parsed.to_json(),
        }
        .serialize(s)
    }
}

impl<'de> Deserialize<'de> for CLValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = CLValueJson::deserialize(d)?;
        let value = CLValue::from_bytes(raw.cl_type, raw.bytes).map_err(serde::de::Error::custom)?;
        if !raw.parsed.is_null() && raw.parsed != value.parsed.to_json() {
            debug!(
                cl_type = %value.cl_type,
                "CLValue parsed field differs from decoded bytes, keeping decoded value"
            );
        }
        Ok(value)
    }
}
