//! The reactive mapping for one category of entries.
//!
//! A [`CategoryRegistry`] owns the address → record map for either accounts
//! or addresses. Mutations never edit the map in place: each `add`/`remove`
//! swaps in a freshly built map, so any [`Snapshot`] handed out earlier stays
//! valid and unchanged. Every mutation is mirrored to the persistence adapter
//! under a category-prefixed key and re-emitted to subscribers as a filtered
//! snapshot.
//!
//! The dev/test filter is a view concern only: stored and persisted state is
//! never filtered, and flipping dev mode changes what the next emission
//! contains without touching the underlying map.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::error::PersistenceError;
use crate::persist::{Category, PersistenceAdapter};
use crate::store::DevMode;
use crate::types::{KeyringJson, Record, Snapshot};

/// A subscriber callback, invoked with each filtered snapshot.
pub(crate) type Observer = Arc<dyn Fn(&Snapshot) + Send + Sync>;

type ListenerList = Mutex<Vec<(u64, Observer)>>;

/// Reactive address → record mapping for one category.
pub struct CategoryRegistry {
    category: Category,
    dev_mode: Arc<DevMode>,
    adapter: Arc<dyn PersistenceAdapter>,
    current: Mutex<Snapshot>,
    listeners: Arc<ListenerList>,
    next_listener_id: AtomicU64,
}

impl CategoryRegistry {
    pub(crate) fn new(
        category: Category,
        dev_mode: Arc<DevMode>,
        adapter: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        Self {
            category,
            dev_mode,
            adapter,
            current: Mutex::new(Snapshot::default()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// The category this registry holds.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Inserts (or overwrites) the record for `address`.
    ///
    /// The in-memory insert and the re-emission always happen; a failed
    /// persistence write is surfaced in the `Err` without rollback.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when mirroring the record to the adapter
    /// fails.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn add(&self, address: &str, json: KeyringJson) -> Result<Record, PersistenceError> {
        let record = Record::new(address, json);
        {
            let mut current = self.current.lock().expect("registry lock poisoned");
            let mut map = (**current).clone();
            map.insert(address.to_owned(), record.clone());
            *current = Arc::new(map);
        }

        let persisted = self.persist_set(address, &record);
        self.notify();
        persisted.map(|()| record)
    }

    /// Removes the record for `address`, if present.
    ///
    /// The persisted key is deleted and a re-emission happens whether or not
    /// the address was in the map; removing an absent address is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when deleting the persisted key fails.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn remove(&self, address: &str) -> Result<(), PersistenceError> {
        {
            let mut current = self.current.lock().expect("registry lock poisoned");
            if current.contains_key(address) {
                let mut map = (**current).clone();
                map.remove(address);
                *current = Arc::new(map);
            }
        }

        let key = self.category.key(address);
        let result = self.adapter.remove(&key);
        if let Err(err) = &result {
            tracing::warn!(%key, %err, "persistence delete failed; in-memory state kept");
        }
        self.notify();
        result
    }

    /// Looks up the record for `address` in the unfiltered map.
    ///
    /// Lookup bypasses the dev/test filter, which applies to emitted
    /// snapshots only.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<Record> {
        self.current
            .lock()
            .expect("registry lock poisoned")
            .get(address)
            .cloned()
    }

    /// The current filtered snapshot.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let current = self
            .current
            .lock()
            .expect("registry lock poisoned")
            .clone();
        self.filtered(current)
    }

    /// Registers an observer.
    ///
    /// The observer is called with the current filtered snapshot immediately,
    /// then once per subsequent mutation (or dev-mode flip), in mutation
    /// order. Delivery stops when the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.subscribe_inner(Arc::new(observer), true)
    }

    pub(crate) fn subscribe_inner(&self, observer: Observer, emit_current: bool) -> Subscription {
        if emit_current {
            observer(&self.snapshot());
        }
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push((id, observer));
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Re-emits the current filtered snapshot to every subscriber.
    ///
    /// Observers are invoked outside the listener lock, so a callback may
    /// mutate or subscribe to this registry without deadlocking.
    pub(crate) fn notify(&self) {
        let snapshot = self.snapshot();
        let observers: Vec<Observer> = self
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in &observers {
            observer(&snapshot);
        }
    }

    /// Merges rehydrated entries over the current map, without writing back
    /// to the adapter, and emits once.
    pub(crate) fn rehydrate(&self, entries: Vec<(String, KeyringJson)>) {
        {
            let mut current = self.current.lock().expect("registry lock poisoned");
            let mut map = (**current).clone();
            for (address, json) in entries {
                let record = Record::new(&address, json);
                map.insert(address, record);
            }
            *current = Arc::new(map);
        }
        self.notify();
    }

    /// Applies the dev/test visibility rule to a full snapshot.
    ///
    /// An entry is excluded iff this is the account-like category, dev mode
    /// is off, and the entry is flagged `isTesting`. When nothing is
    /// filtered the input map is returned as-is, so unfiltered emissions
    /// share one allocation with the stored snapshot.
    fn filtered(&self, full: Snapshot) -> Snapshot {
        if !self.category.with_test() || self.dev_mode.is_enabled() {
            return full;
        }
        if full.values().all(|record| !record.json.meta.is_testing) {
            return full;
        }
        Arc::new(
            full.iter()
                .filter(|(_, record)| !record.json.meta.is_testing)
                .map(|(address, record)| (address.clone(), record.clone()))
                .collect(),
        )
    }

    fn persist_set(&self, address: &str, record: &Record) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(&record.json)
            .map_err(|err| PersistenceError::new(format!("serialize record: {err}")))?;
        let key = self.category.key(address);
        let result = self.adapter.set(&key, &value);
        if let Err(err) = &result {
            tracing::warn!(%key, %err, "persistence write failed; in-memory state kept");
        }
        result
    }
}

impl std::fmt::Debug for CategoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryRegistry")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Handle for an active subscription; dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    listeners: Weak<ListenerList>,
    id: u64,
}

impl Subscription {
    /// Explicitly releases the subscription.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .expect("listener lock poisoned")
                .retain(|(id, _)| *id != self.id);
        }
    }
}
