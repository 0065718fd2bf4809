//! Canonical binary serialization.
//!
//! Fixed-width integers are little-endian (two's complement when signed),
//! booleans are a single `00`/`01` byte, strings and collections carry a `u32`
//! little-endian length prefix, and options carry a `00`/`01` tag.
//!
//! # Example
//!
//! ```
//! use casper_kit::codec::{FromBytes, ToBytes};
//!
//! let bytes = "deposit".to_string().to_bytes().unwrap();
//! assert_eq!(hex::encode(&bytes), "070000006465706f736974");
//! assert_eq!(String::from_bytes(&bytes).unwrap(), "deposit");
//! ```

mod cursor;
pub mod wide;

pub use cursor::{ByteCursor, ByteWriter};
pub use wide::WideWidth;

use crate::error::CodecError;

/// Recursion depth the network itself allows for nested types.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Default cap on the element count of a collection whose elements take no bytes.
pub const DEFAULT_MAX_ZERO_WIDTH_LEN: usize = 1 << 20;

/// Limits applied while decoding untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting of `Option`, `List` and `Map` (types and values).
    pub max_depth: usize,
    /// Maximum count of a `List` or `Map` whose elements encode to zero bytes,
    /// such as `List(Unit)`. Other collections are bounded by the input length.
    pub max_zero_width_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_zero_width_len: DEFAULT_MAX_ZERO_WIDTH_LEN,
        }
    }
}

impl DecodeLimits {
    /// Return the depth one level below `depth`, or fail past the limit.
    pub(crate) fn descend(&self, depth: usize) -> Result<usize, CodecError> {
        let next = depth + 1;
        if next > self.max_depth {
            tracing::debug!(max_depth = self.max_depth, "decode depth limit reached");
            return Err(CodecError::DepthLimitExceeded(self.max_depth));
        }
        Ok(next)
    }
}

/// A value with a canonical binary encoding.
pub trait ToBytes {
    /// Append the encoding of `self` to `writer`.
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError>;

    /// Encode `self` into a fresh buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::new();
        self.write_bytes(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

/// A value that can be decoded from its canonical binary encoding.
pub trait FromBytes: Sized {
    /// Decode one value from the cursor.
    ///
    /// On failure the cursor is left where it was before the call.
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError>;

    /// Decode a value that must span all of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = ByteCursor::new(bytes);
        let value = Self::read_from(&mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }
}

// ============================================================================
// Primitive impls
// ============================================================================

impl ToBytes for bool {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(u8::from(*self));
        Ok(())
    }
}

impl FromBytes for bool {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| match c.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::invalid_tag("bool", tag)),
        })
    }
}

macro_rules! impl_fixed_width {
    ($ty:ty, $write:ident, $read:ident) => {
        impl ToBytes for $ty {
            fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
                writer.$write(*self);
                Ok(())
            }
        }

        impl FromBytes for $ty {
            fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
                cursor.$read()
            }
        }
    };
}

impl_fixed_width!(u8, write_u8, read_u8);
impl_fixed_width!(i32, write_i32, read_i32);
impl_fixed_width!(u32, write_u32, read_u32);
impl_fixed_width!(i64, write_i64, read_i64);
impl_fixed_width!(u64, write_u64, read_u64);

impl ToBytes for str {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_len(self.len())?;
        writer.write_bytes(self.as_bytes());
        Ok(())
    }
}

impl ToBytes for String {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        self.as_str().write_bytes(writer)
    }
}

impl FromBytes for String {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| {
            let len = c.read_len()?;
            let raw = c.read_bytes(len)?;
            Ok(String::from_utf8(raw.to_vec())?)
        })
    }
}

impl<T: ToBytes> ToBytes for Option<T> {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        match self {
            None => {
                writer.write_u8(0);
                Ok(())
            }
            Some(inner) => {
                writer.write_u8(1);
                inner.write_bytes(writer)
            }
        }
    }
}

impl<T: FromBytes> FromBytes for Option<T> {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| match c.read_u8()? {
            0 => Ok(None),
            1 => T::read_from(c).map(Some),
            tag => Err(CodecError::invalid_tag("option", tag)),
        })
    }
}

impl<T: ToBytes> ToBytes for Vec<T> {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_len(self.len())?;
        for item in self {
            item.write_bytes(writer)?;
        }
        Ok(())
    }
}

impl<T: FromBytes> FromBytes for Vec<T> {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.atomically(|c| {
            let count = c.read_len()?;
            // The count is untrusted; never reserve more than the input could hold.
            let mut items = Vec::with_capacity(count.min(c.remaining()));
            for _ in 0..count {
                items.push(T::read_from(c)?);
            }
            Ok(items)
        })
    }
}

impl<const N: usize> ToBytes for [u8; N] {
    fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_bytes(self);
        Ok(())
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        cursor.read_array()
    }
}
