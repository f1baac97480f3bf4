//! The keyring store: two category registries, the dev-mode flag and the
//! combined projection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PersistenceError;
use crate::persist::{Category, PersistenceAdapter};
use crate::registry::{CategoryRegistry, Subscription};
use crate::types::{KeyringJson, Snapshot};

/// Process-wide development-mode flag.
///
/// Modelled as an explicit shared configuration object rather than a hidden
/// global: the store hands a reference to each registry, and the filter reads
/// it at every emission. Set once at startup; mutable only through
/// [`KeyringStore::set_dev_mode`].
#[derive(Debug, Default)]
pub struct DevMode(AtomicBool);

impl DevMode {
    /// Whether development mode is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

/// Owner of the accounts and addresses registries.
pub struct KeyringStore {
    dev_mode: Arc<DevMode>,
    adapter: Arc<dyn PersistenceAdapter>,
    accounts: Arc<CategoryRegistry>,
    addresses: Arc<CategoryRegistry>,
}

impl KeyringStore {
    /// Creates a store with empty registries on top of `adapter`.
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let dev_mode = Arc::new(DevMode::default());
        let accounts = Arc::new(CategoryRegistry::new(
            Category::Accounts,
            Arc::clone(&dev_mode),
            Arc::clone(&adapter),
        ));
        let addresses = Arc::new(CategoryRegistry::new(
            Category::Addresses,
            Arc::clone(&dev_mode),
            Arc::clone(&adapter),
        ));
        Self {
            dev_mode,
            adapter,
            accounts,
            addresses,
        }
    }

    /// The accounts registry (subject to the dev/test filter).
    #[must_use]
    pub fn accounts(&self) -> &CategoryRegistry {
        &self.accounts
    }

    /// The addresses registry (never filtered).
    #[must_use]
    pub fn addresses(&self) -> &CategoryRegistry {
        &self.addresses
    }

    /// The combined live projection over both registries.
    #[must_use]
    pub const fn all(&self) -> CombinedView<'_> {
        CombinedView { store: self }
    }

    /// Whether development mode is on.
    #[must_use]
    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode.is_enabled()
    }

    /// Sets the dev-mode flag and re-emits every registry view, since the
    /// visibility filter depends on it.
    pub fn set_dev_mode(&self, enabled: bool) {
        self.dev_mode.set(enabled);
        self.accounts.notify();
        self.addresses.notify();
    }

    /// Rehydrates both registries from the persistence adapter.
    ///
    /// Scans the adapter for `account:`/`address:` keys, deserializes each
    /// value and inserts it without writing back. Values that fail to
    /// deserialize are skipped with a warning; keys outside the two
    /// namespaces are ignored. Each registry emits once at the end.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the adapter fails to iterate.
    pub fn load_all(&self) -> Result<(), PersistenceError> {
        let mut accounts = Vec::new();
        let mut addresses = Vec::new();

        self.adapter.for_each(&mut |key, value| {
            let (category, address) = if let Some(address) =
                key.strip_prefix(Category::Accounts.prefix())
            {
                (Category::Accounts, address)
            } else if let Some(address) = key.strip_prefix(Category::Addresses.prefix()) {
                (Category::Addresses, address)
            } else {
                return;
            };

            match serde_json::from_value::<KeyringJson>(value.clone()) {
                Ok(json) => match category {
                    Category::Accounts => accounts.push((address.to_owned(), json)),
                    Category::Addresses => addresses.push((address.to_owned(), json)),
                },
                Err(err) => {
                    tracing::warn!(%key, %err, "skipping malformed persisted entry");
                }
            }
        })?;

        self.accounts.rehydrate(accounts);
        self.addresses.rehydrate(addresses);
        Ok(())
    }
}

impl std::fmt::Debug for KeyringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStore")
            .field("dev_mode", &self.dev_mode)
            .finish_non_exhaustive()
    }
}

/// One emission of the combined projection: the latest filtered snapshot of
/// each registry.
#[derive(Debug, Clone)]
pub struct CombinedSnapshot {
    /// Latest accounts snapshot.
    pub accounts: Snapshot,
    /// Latest addresses snapshot.
    pub addresses: Snapshot,
}

/// Live combined view over the accounts and addresses registries.
///
/// Emits a [`CombinedSnapshot`] immediately on subscribe and again whenever
/// either registry emits, always joining the latest snapshot of each side.
/// The view is live for the lifetime of the store.
#[derive(Debug, Clone, Copy)]
pub struct CombinedView<'a> {
    store: &'a KeyringStore,
}

impl CombinedView<'_> {
    /// Registers an observer of the combined projection.
    pub fn subscribe<F>(&self, observer: F) -> CombinedSubscription
    where
        F: Fn(&CombinedSnapshot) + Send + Sync + 'static,
    {
        let observer: Arc<dyn Fn(&CombinedSnapshot) + Send + Sync> = Arc::new(observer);

        let emit = {
            let accounts = Arc::clone(&self.store.accounts);
            let addresses = Arc::clone(&self.store.addresses);
            let observer = Arc::clone(&observer);
            move || {
                observer(&CombinedSnapshot {
                    accounts: accounts.snapshot(),
                    addresses: addresses.snapshot(),
                });
            }
        };

        // Register on both sides without the per-registry initial emission,
        // then emit the joined pair exactly once.
        let on_accounts = {
            let emit = emit.clone();
            Arc::new(move |_: &Snapshot| emit())
        };
        let on_addresses = {
            let emit = emit.clone();
            Arc::new(move |_: &Snapshot| emit())
        };
        let accounts = self.store.accounts.subscribe_inner(on_accounts, false);
        let addresses = self.store.addresses.subscribe_inner(on_addresses, false);
        emit();

        CombinedSubscription {
            _accounts: accounts,
            _addresses: addresses,
        }
    }

    /// The current joined snapshot, without subscribing.
    #[must_use]
    pub fn snapshot(&self) -> CombinedSnapshot {
        CombinedSnapshot {
            accounts: self.store.accounts.snapshot(),
            addresses: self.store.addresses.snapshot(),
        }
    }
}

/// Handle for an active combined subscription; dropping it stops delivery.
#[derive(Debug)]
pub struct CombinedSubscription {
    _accounts: Subscription,
    _addresses: Subscription,
}
