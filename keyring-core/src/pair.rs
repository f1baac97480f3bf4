//! A single account's cryptographic identity with a lock state.
//!
//! A [`CredentialPair`] is created locked, with an empty secret buffer. The
//! only way to populate the secret is a successful password-based
//! [`decode`](CredentialPair::decode) of the stored encrypted payload, and the
//! only way to clear it (short of dropping the pair) is
//! [`lock`](CredentialPair::lock). Callers that need the secret follow the
//! decode → use → lock ordering, with lock always last.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::address::encode_address;
use crate::crypto;
use crate::error::DecodeError;
use crate::types::RecordMeta;

/// Secret key bytes, wiped on lock and on drop.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
struct SecretBytes(Vec<u8>);

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretBytes").field(&"[REDACTED]").finish()
    }
}

/// An account key pair whose secret material is locked by default.
#[derive(Debug)]
pub struct CredentialPair {
    /// Canonical string address derived from the public key.
    address: String,
    /// Raw public key bytes.
    public_key: Vec<u8>,
    /// Entry metadata (name, testing flag, opaque fields).
    meta: RecordMeta,
    /// Password-encrypted secret payload, kept for later re-decodes.
    encoded: Vec<u8>,
    /// Decrypted secret key; all-zero/empty while locked.
    secret: SecretBytes,
    /// Whether the secret is currently wiped.
    locked: bool,
}

impl CredentialPair {
    /// Creates a locked pair with an empty secret buffer.
    #[must_use]
    pub fn new(public_key: Vec<u8>, meta: RecordMeta, encoded: Vec<u8>) -> Self {
        Self {
            address: encode_address(&public_key),
            public_key,
            meta,
            encoded,
            secret: SecretBytes::default(),
            locked: true,
        }
    }

    /// The pair's canonical string address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The pair's public key bytes.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The pair's metadata.
    #[must_use]
    pub const fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    /// Whether the secret is currently wiped.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// The decrypted secret key, or `None` while the pair is locked.
    #[must_use]
    pub fn secret(&self) -> Option<&[u8]> {
        if self.locked {
            None
        } else {
            Some(&self.secret.0)
        }
    }

    /// Decrypts the stored payload with `password` and unlocks the pair.
    ///
    /// On failure the pair stays exactly as it was: still locked if it was
    /// locked, still holding its previous secret if it was not.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidPassword`] when the password fails to
    /// authenticate the payload and [`DecodeError::CorruptPayload`] when the
    /// payload is malformed.
    pub fn decode(&mut self, password: &str) -> Result<(), DecodeError> {
        let secret = crypto::decrypt_secret(&self.encoded, password)?;
        // Replacing drops the previous buffer, which wipes it.
        self.secret = SecretBytes(secret);
        self.locked = false;
        Ok(())
    }

    /// Wipes the secret buffer and marks the pair locked. Idempotent.
    pub fn lock(&mut self) {
        self.secret.zeroize();
        self.locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pair(password: &str) -> CredentialPair {
        let encoded = crypto::encrypt_secret(b"super secret key material", password);
        CredentialPair::new(vec![0x11; 32], RecordMeta::named("Alice"), encoded)
    }

    #[test]
    fn starts_locked_with_empty_secret() {
        let pair = test_pair("password");
        assert!(pair.is_locked());
        assert!(pair.secret().is_none());
        assert_eq!(pair.address(), encode_address(&[0x11; 32]));
    }

    #[test]
    fn decode_unlocks_and_lock_wipes() {
        let mut pair = test_pair("password");
        pair.decode("password").unwrap();
        assert!(!pair.is_locked());
        assert_eq!(pair.secret().unwrap(), b"super secret key material");

        pair.lock();
        assert!(pair.is_locked());
        assert!(pair.secret().is_none());
        assert!(pair.secret.0.iter().all(|&b| b == 0));
    }

    #[test]
    fn lock_is_idempotent() {
        let mut pair = test_pair("password");
        pair.lock();
        pair.lock();
        assert!(pair.is_locked());
    }

    #[test]
    fn wrong_password_leaves_state_unchanged() {
        let mut pair = test_pair("correct");
        assert_eq!(pair.decode("wrong"), Err(DecodeError::InvalidPassword));
        assert!(pair.is_locked());
        assert!(pair.secret().is_none());

        // A later decode with the right password still works.
        pair.decode("correct").unwrap();
        assert!(!pair.is_locked());
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let mut pair = CredentialPair::new(vec![0x22; 32], RecordMeta::default(), vec![0u8; 4]);
        assert!(matches!(
            pair.decode("password"),
            Err(DecodeError::CorruptPayload { .. })
        ));
        assert!(pair.is_locked());
    }

    #[test]
    fn decode_then_lock_ends_locked_on_both_paths() {
        // Correct password path.
        let mut pair = test_pair("password");
        pair.decode("password").unwrap();
        pair.lock();
        assert!(pair.is_locked());
        assert!(pair.secret.0.iter().all(|&b| b == 0));

        // Wrong password path.
        let mut pair = test_pair("password");
        let _ = pair.decode("wrong");
        pair.lock();
        assert!(pair.is_locked());
        assert!(pair.secret.0.iter().all(|&b| b == 0));
    }

    #[test]
    fn debug_redacts_secret() {
        let mut pair = test_pair("password");
        pair.decode("password").unwrap();
        let debug = format!("{pair:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super secret"));
    }
}
