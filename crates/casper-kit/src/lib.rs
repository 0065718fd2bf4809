//! Binary value codec and identity derivation for the Casper network.
//!
//! **casper-kit** is the layer under an RPC client that turns the hex strings
//! and byte buffers found in node responses into typed values, and back. Every
//! encoding here matches the network's reference implementation byte for byte.
//!
//! # Quick Start
//!
//! ```
//! use casper_kit::*;
//!
//! // Public key in, account hash out
//! let key: PublicKey = "01cd807fb41345d8dd5a61da7991e1468173acbee53920e4dfe0d28cb8825ac664"
//!     .parse()
//!     .unwrap();
//! let account = derive_account_hash(&key);
//! assert_eq!(
//!     account.to_string(),
//!     "account-hash-998c5FD4E7B568Bedd78e05555c83C61893Dc5d8546ce0BEc8B30E1c570f21aA"
//! );
//!
//! // Typed values
//! let value = decode_value(&CLType::String, &hex::decode("070000006465706f736974").unwrap()).unwrap();
//! assert_eq!(value, Value::from("deposit"));
//! ```
//!
//! # Core Types
//!
//! - [`CLType`], [`Value`], [`CLValue`] - The typed value algebra
//! - [`Key`] - Global-state key
//! - [`PublicKey`], [`AccountHash`] - Keys and the account identifiers derived from them
//! - [`URef`], [`AccessRights`] - Unforgeable references
//! - [`Digest`] - 32-byte blake2b hash
//!
//! # Untrusted Input
//!
//! Every decoder is total: it returns a value or a [`CodecError`], never reads
//! past its buffer, and leaves the cursor untouched on failure. Nesting of
//! `Option`, `List` and `Map` is bounded by [`DecodeLimits`].

pub mod checksummed_hex;
pub mod codec;
pub mod error;
pub mod types;

pub use codec::{ByteCursor, ByteWriter, DecodeLimits, FromBytes, ToBytes, WideWidth};
pub use error::{CodecError, Error, ParseKeyError};
pub use types::*;

/// Encode bytes as checksummed hex.
pub fn checksum_encode(bytes: impl AsRef<[u8]>) -> String {
    checksummed_hex::encode(bytes)
}

/// Decode checksummed hex, verifying the checksum of mixed-case input.
pub fn checksum_decode(input: impl AsRef<str>) -> Result<Vec<u8>, CodecError> {
    checksummed_hex::decode(input)
}
