//! End-to-end tests: restore, observe, filter and rehydrate through the
//! public API only.

use std::sync::{Arc, Mutex};

use keyring_core::{
    encode_address, encrypt_secret, restore, DecodeError, KeyringJson, KeyringStore,
    MemoryAdapter, PersistenceAdapter, RecordMeta, RestoreError,
};

fn new_store() -> (KeyringStore, Arc<MemoryAdapter>) {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = KeyringStore::new(Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>);
    (store, adapter)
}

fn backup(seed: u8, name: Option<&str>, password: &str) -> KeyringJson {
    let public_key = [seed; 32];
    KeyringJson {
        address: encode_address(&public_key),
        encoded: hex::encode(encrypt_secret(b"integration secret", password)),
        meta: RecordMeta {
            name: name.map(str::to_owned),
            is_testing: false,
            extra: serde_json::Map::new(),
        },
    }
}

#[test]
fn restore_then_observe_roundtrip() {
    let (store, adapter) = new_store();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store.all().subscribe(move |combined| {
        sink.lock()
            .unwrap()
            .push((combined.accounts.len(), combined.addresses.len()));
    });

    let json = backup(0x42, Some("Alice"), "password");
    let address = json.address.clone();
    let pair = restore(&store, json, "password").unwrap();

    assert!(pair.is_locked());
    assert_eq!(*seen.lock().unwrap(), [(0, 0), (1, 0)]);
    assert_eq!(adapter.len(), 1);

    let snapshot = store.accounts().snapshot();
    assert_eq!(snapshot[&address].option.label, "Alice");
}

#[test]
fn unnamed_entry_gets_truncated_label() {
    let (store, _) = new_store();
    let json = backup(0x07, None, "password");
    let address = json.address.clone();

    restore(&store, json, "password").unwrap();

    let label = &store.accounts().snapshot()[&address].option.label;
    // 0x + 64 hex chars → first and last seven characters around an ellipsis.
    assert_eq!(label, &format!("{}…{}", &address[..7], &address[59..]));
    assert_eq!(label.chars().count(), 15);
}

#[test]
fn failed_restore_is_atomic() {
    let (store, adapter) = new_store();

    let result = restore(&store, backup(0x42, None, "correct"), "wrong");
    assert!(matches!(
        result,
        Err(RestoreError::Decode(DecodeError::InvalidPassword))
    ));
    assert!(store.accounts().snapshot().is_empty());
    assert!(adapter.is_empty());
}

#[test]
fn dev_filter_spans_restore_and_rehydration() {
    let (store, adapter) = new_store();

    let mut json = backup(0x42, Some("test-account"), "password");
    json.meta.is_testing = true;
    let address = json.address.clone();
    restore(&store, json, "password").unwrap();

    // Hidden by default, visible in dev mode.
    assert!(store.accounts().snapshot().is_empty());
    store.set_dev_mode(true);
    assert!(store.accounts().snapshot().contains_key(&address));

    // A fresh store sees the same entry after rehydrating, with the same
    // filter behavior.
    let revived = KeyringStore::new(Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>);
    revived.load_all().unwrap();
    assert!(revived.accounts().snapshot().is_empty());
    revived.set_dev_mode(true);
    assert_eq!(revived.accounts().snapshot().len(), 1);
}

#[test]
fn restored_pair_can_be_unlocked_again() {
    let (store, _) = new_store();
    let mut pair = restore(&store, backup(0x42, None, "password"), "password").unwrap();

    pair.decode("password").unwrap();
    assert_eq!(pair.secret().unwrap(), b"integration secret");
    pair.lock();
    assert!(pair.secret().is_none());
}
