//! Error types for the keyring.
//!
//! All fallible operations return explicit `Result` values to the immediate
//! caller; nothing here is intended to unwind across an unrelated context.

use thiserror::Error;

/// Errors from decoding an encrypted backup payload into secret key material.
///
/// Both variants are recoverable and leave the pair's state unchanged: the
/// caller decides whether to re-prompt for a password or abandon the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The password failed to authenticate the encoded payload.
    #[error("invalid password for encoded secret")]
    InvalidPassword,
    /// The encoded payload is structurally malformed.
    #[error("corrupt encoded payload: {reason}")]
    CorruptPayload {
        /// Description of what is wrong with the payload.
        reason: String,
    },
}

impl DecodeError {
    /// Creates a corrupt-payload error.
    pub fn corrupt<S: Into<String>>(reason: S) -> Self {
        Self::CorruptPayload {
            reason: reason.into(),
        }
    }
}

/// Error decoding a string address into public key bytes.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The address is not valid hex.
    #[error("address is not valid hex")]
    InvalidHex(#[from] hex::FromHexError),
    /// The decoded address has the wrong length.
    #[error("decoded address must be {expected} bytes, got {found}")]
    InvalidLength {
        /// Required public key length in bytes.
        expected: usize,
        /// Length actually decoded.
        found: usize,
    },
}

/// Error from the underlying persistence adapter.
///
/// Persistence is best-effort durability for the running session: a failed
/// write or delete is surfaced to the caller, but the in-memory mutation it
/// mirrors is **not** rolled back. The in-memory view stays the source of
/// truth until the process exits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persistence error: {message}")]
pub struct PersistenceError {
    /// Message from the underlying store.
    pub message: String,
}

impl PersistenceError {
    /// Creates a new persistence error.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from the restore-from-backup flow.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The backup's address could not be decoded.
    #[error(transparent)]
    Address(#[from] AddressError),
    /// The encoded secret could not be decrypted.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The restored record could not be persisted.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        assert_eq!(
            DecodeError::InvalidPassword.to_string(),
            "invalid password for encoded secret"
        );
        assert!(DecodeError::corrupt("too short")
            .to_string()
            .contains("too short"));
    }

    #[test]
    fn restore_error_wraps_sources() {
        let err = RestoreError::from(DecodeError::InvalidPassword);
        assert!(matches!(err, RestoreError::Decode(_)));
        let err = RestoreError::from(PersistenceError::new("disk full"));
        assert!(err.to_string().contains("disk full"));
    }
}
