//! Restoring an account from an encrypted backup blob.

use crate::address::decode_address;
use crate::error::{DecodeError, RestoreError};
use crate::pair::CredentialPair;
use crate::store::KeyringStore;
use crate::types::KeyringJson;

/// Restores an account from its backup JSON and inserts it into the accounts
/// registry.
///
/// The flow is decode-address → build pair → unlock with `password` → add to
/// the registry → lock. A wrong password (or corrupt payload) fails before
/// the registry is touched, so no partial record is left behind. The pair is
/// locked unconditionally before returning, even when persisting the record
/// fails, so the secret never survives the restore.
///
/// # Errors
///
/// Returns [`RestoreError`] when the address or encoded payload is malformed,
/// the password is wrong, or the persisted write fails (in which case the
/// in-memory insert has still happened, per the registry's contract).
pub fn restore(
    store: &KeyringStore,
    json: KeyringJson,
    password: &str,
) -> Result<CredentialPair, RestoreError> {
    let public_key = decode_address(&json.address)?;
    let encoded = hex::decode(json.encoded.trim_start_matches("0x"))
        .map_err(|err| DecodeError::corrupt(format!("encoded field is not hex: {err}")))?;

    let mut pair = CredentialPair::new(public_key.to_vec(), json.meta.clone(), encoded);
    pair.decode(password)?;

    // Lock is last on every path past this point: it wipes the secret.
    let added = store.accounts().add(pair.address(), json);
    pair.lock();
    added?;

    Ok(pair)
}
