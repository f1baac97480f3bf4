//! Password-based encryption for backup payloads.
//!
//! Encoded secrets use the layout `salt(32) || nonce(24) || ciphertext+tag`:
//! Argon2id derives a 256-bit key from the password and salt, and
//! XChaCha20-Poly1305 provides authenticated encryption. A failed
//! authentication is indistinguishable from a wrong password by construction,
//! so it surfaces as [`DecodeError::InvalidPassword`]; structural problems
//! (truncated payload) surface as [`DecodeError::CorruptPayload`].

use argon2::Argon2;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use crate::error::DecodeError;

/// Length of the random KDF salt.
pub const SALT_LEN: usize = 32;

/// Length of the XChaCha20-Poly1305 nonce.
pub const NONCE_LEN: usize = 24;

/// Length of the derived encryption key.
const KEY_LEN: usize = 32;

/// Length of the Poly1305 authentication tag.
const TAG_LEN: usize = 16;

/// Minimum length of a well-formed encoded payload.
const MIN_ENCODED_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Derives an encryption key from a password and salt.
fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .expect("salt and output lengths are valid argon2 parameters");
    key
}

/// Encrypts secret key material under a password.
///
/// Returns the full encoded payload (`salt || nonce || ciphertext`).
///
/// # Panics
///
/// Panics if the system's random number generator fails.
#[must_use]
pub fn encrypt_secret(secret: &[u8], password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = XChaCha20Poly1305::new_from_slice(&key).expect("key length is always 32");
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce_bytes), secret)
        .expect("XChaCha20-Poly1305 encryption cannot fail with valid lengths");

    let mut encoded = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    encoded.extend_from_slice(&salt);
    encoded.extend_from_slice(&nonce_bytes);
    encoded.extend_from_slice(&ciphertext);
    encoded
}

/// Decrypts an encoded payload back into secret key material.
///
/// # Errors
///
/// Returns [`DecodeError::CorruptPayload`] when the payload is too short to
/// contain a salt, nonce and tag, and [`DecodeError::InvalidPassword`] when
/// authentication fails.
///
/// # Panics
///
/// Panics if the cipher rejects the fixed-size derived key.
pub fn decrypt_secret(encoded: &[u8], password: &str) -> Result<Vec<u8>, DecodeError> {
    if encoded.len() < MIN_ENCODED_LEN {
        return Err(DecodeError::corrupt(format!(
            "expected at least {MIN_ENCODED_LEN} bytes, got {}",
            encoded.len()
        )));
    }

    let salt = &encoded[..SALT_LEN];
    let nonce = &encoded[SALT_LEN..SALT_LEN + NONCE_LEN];
    let ciphertext = &encoded[SALT_LEN + NONCE_LEN..];

    let key = derive_key(password, salt);
    let cipher = XChaCha20Poly1305::new_from_slice(&key).expect("key length is always 32");

    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecodeError::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let secret = b"this is a secret key";
        let encoded = encrypt_secret(secret, "hunter2");
        assert_ne!(&encoded[SALT_LEN + NONCE_LEN..], secret.as_slice());
        let decrypted = decrypt_secret(&encoded, "hunter2").unwrap();
        assert_eq!(decrypted, secret);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let encoded = encrypt_secret(b"secret", "correct");
        assert_eq!(
            decrypt_secret(&encoded, "wrong"),
            Err(DecodeError::InvalidPassword)
        );
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        let result = decrypt_secret(&[0u8; 10], "password");
        assert!(matches!(result, Err(DecodeError::CorruptPayload { .. })));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let mut encoded = encrypt_secret(b"secret", "password");
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        assert_eq!(
            decrypt_secret(&encoded, "password"),
            Err(DecodeError::InvalidPassword)
        );
    }

    #[test]
    fn fresh_salt_and_nonce_per_encryption() {
        let a = encrypt_secret(b"secret", "password");
        let b = encrypt_secret(b"secret", "password");
        assert_ne!(a, b);
    }
}
