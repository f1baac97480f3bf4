//! Reactive credential registry.
//!
//! An in-memory store of account and address records, each tied to a
//! locked-by-default key pair, mirrored into a pluggable key-value
//! [`PersistenceAdapter`] and exposed to consumers as observable, filtered
//! snapshots.
//!
//! # Overview
//!
//! - [`KeyringStore`] owns two [`CategoryRegistry`] instances — accounts and
//!   addresses — plus the process-wide dev-mode flag and the combined
//!   [`all`](KeyringStore::all) projection.
//! - [`CredentialPair`] holds one account's key material: created locked,
//!   unlocked only by a successful password [`decode`](CredentialPair::decode),
//!   wiped again by [`lock`](CredentialPair::lock).
//! - [`restore`] decodes a password-encrypted backup blob into a pair and
//!   inserts it into the accounts registry, locking before it returns.
//!
//! Entries flagged `isTesting` are hidden from emitted account snapshots
//! unless dev mode is on; stored and persisted state is never filtered.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keyring_core::{KeyringJson, KeyringStore, MemoryAdapter, PersistenceAdapter, RecordMeta};
//!
//! let adapter: Arc<dyn PersistenceAdapter> = Arc::new(MemoryAdapter::new());
//! let store = KeyringStore::new(adapter);
//!
//! let subscription = store.accounts().subscribe(|snapshot| {
//!     println!("{} account(s)", snapshot.len());
//! });
//!
//! store.accounts().add(
//!     "0x0101010101010101010101010101010101010101010101010101010101010101",
//!     KeyringJson {
//!         address: "0x0101010101010101010101010101010101010101010101010101010101010101".into(),
//!         encoded: String::new(),
//!         meta: RecordMeta::named("Alice"),
//!     },
//! )?;
//!
//! subscription.unsubscribe();
//! # Ok::<(), keyring_core::PersistenceError>(())
//! ```

mod address;
pub use address::{decode_address, encode_address, PUBLIC_KEY_LEN};

mod crypto;
pub use crypto::{decrypt_secret, encrypt_secret};

mod error;
pub use error::{AddressError, DecodeError, PersistenceError, RestoreError};

mod pair;
pub use pair::CredentialPair;

mod persist;
pub use persist::{Category, MemoryAdapter, PersistenceAdapter, ACCOUNT_PREFIX, ADDRESS_PREFIX};

mod registry;
pub use registry::{CategoryRegistry, Subscription};

mod restore;
pub use restore::restore;

mod store;
pub use store::{CombinedSnapshot, CombinedSubscription, CombinedView, DevMode, KeyringStore};

mod types;
pub use types::{DisplayOption, KeyringJson, Record, RecordMeta, Snapshot};
