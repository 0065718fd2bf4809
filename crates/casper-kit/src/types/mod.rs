//! Core types of the network's value model.
//!
//! Identifiers (digests, account hashes, public keys, URefs, global-state
//! keys) and the typed value algebra carried in `CLValue`s.

mod cl_type;
mod cl_value;
mod digest;
mod key;
mod public_key;
mod uref;

pub use cl_type::CLType;
pub use cl_value::{CLValue, Value, decode_value, decode_value_with_limits, encode_value};
pub use digest::{
    ACCOUNT_HASH_LENGTH, ACCOUNT_HASH_PREFIX, AccountHash, DIGEST_LENGTH, Digest, blake2b256,
};
pub use key::{Key, KeyTag, decode_key, encode_key};
pub use public_key::{
    ED25519_PUBLIC_KEY_LENGTH, KeyAlgorithm, PublicKey, SECP256K1_PUBLIC_KEY_LENGTH,
    derive_account_hash, parse_public_key,
};
pub use uref::{
    AccessRights, UREF_ADDR_LENGTH, UREF_SERIALIZED_LENGTH, URef, decode_uref, encode_uref,
};
