//! Error types for casper-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) - Umbrella error, returned by the JSON helpers
//!   - [`CodecError`] - Binary and hex decoding/encoding failures
//!   - [`ParseKeyError`] - Invalid formatted identifier (`account-hash-…`, `uref-…-007`, …)
//!
//! Every error here is a deterministic data-validity error: retrying the same
//! input yields the same result.
//!
//! # Example
//!
//! ```
//! use casper_kit::{CodecError, checksum_decode};
//!
//! // A mixed-case string whose casing does not match its checksum.
//! let err = checksum_decode("Ab").unwrap_err();
//! assert_eq!(err, CodecError::ChecksumMismatch);
//! ```

use thiserror::Error;

/// Error decoding or encoding the canonical binary format or checksummed hex.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Invalid {kind} tag: {tag}")]
    InvalidTag { kind: &'static str, tag: u8 },

    #[error("Unsupported CLType tag: {0}")]
    UnsupportedType(u8),

    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Malformed hex: {0}")]
    MalformedHex(String),

    #[error("Checksum mismatch in mixed-case hex string")]
    ChecksumMismatch,

    #[error("Invalid UTF-8 in string payload: {0}")]
    Utf8(String),

    #[error("Invalid curve point: key bytes do not represent a valid point on the curve")]
    InvalidCurvePoint,

    #[error("Nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    #[error("Collection of {count} zero-width elements exceeds the limit of {max}")]
    CollectionTooLarge { count: usize, max: usize },

    #[error("{0} trailing bytes left after decoding")]
    TrailingBytes(usize),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

impl CodecError {
    pub(crate) fn invalid_tag(kind: &'static str, tag: u8) -> Self {
        CodecError::InvalidTag { kind, tag }
    }

    /// Returns true if the input simply ran out of bytes.
    pub fn is_underrun(&self) -> bool {
        matches!(self, CodecError::BufferUnderrun { .. })
    }
}

impl From<hex::FromHexError> for CodecError {
    fn from(err: hex::FromHexError) -> Self {
        CodecError::MalformedHex(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for CodecError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        CodecError::Utf8(err.to_string())
    }
}

/// Error parsing a formatted identifier string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Invalid format: '{0}'")]
    InvalidFormat(String),

    #[error("Unknown key prefix in '{0}'")]
    UnknownPrefix(String),

    #[error("Invalid era id: '{0}'")]
    InvalidEraId(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Main error type for casper-kit operations that combine several concerns.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    ParseKey(#[from] ParseKeyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
