//! Address codec: hex-encoded 32-byte public keys.
//!
//! Addresses are the string form of a public key and double as registry keys
//! and persistence-key suffixes. Decoding accepts an optional `0x` prefix and
//! upper- or lower-case hex; encoding always produces the canonical lowercase
//! `0x`-prefixed form.

use crate::error::AddressError;

/// Length of a decoded public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Decodes a string address into its public key bytes.
///
/// # Errors
///
/// Returns [`AddressError`] if the string is not valid hex or does not decode
/// to exactly [`PUBLIC_KEY_LEN`] bytes.
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LEN], AddressError> {
    let stripped = address.strip_prefix("0x").unwrap_or(address);
    let bytes = hex::decode(stripped)?;
    let found = bytes.len();
    bytes
        .try_into()
        .map_err(|_| AddressError::InvalidLength {
            expected: PUBLIC_KEY_LEN,
            found,
        })
}

/// Encodes public key bytes as a canonical lowercase address string.
#[must_use]
pub fn encode_address(public_key: &[u8]) -> String {
    format!("0x{}", hex::encode(public_key))
}
