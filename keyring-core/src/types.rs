//! Core data types: backup blobs, metadata and registry records.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Metadata attached to a keyring entry.
///
/// Only `name` and `isTesting` carry meaning for the registry itself; any
/// other fields round-trip untouched through persistence and backups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Human-readable name shown in place of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Marks a development/test entry, hidden outside dev mode.
    #[serde(rename = "isTesting", default, skip_serializing_if = "is_false")]
    pub is_testing: bool,
    /// Opaque fields preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(flag: &bool) -> bool {
    !*flag
}

impl RecordMeta {
    /// Creates metadata with just a name set.
    #[must_use]
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// The JSON backup/persistence shape for a single entry:
/// `{ address, encoded, meta: { name?, isTesting?, ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyringJson {
    /// String address of the entry (hex-encoded public key).
    pub address: String,
    /// Hex-encoded password-encrypted secret payload.
    #[serde(default)]
    pub encoded: String,
    /// Entry metadata.
    #[serde(default)]
    pub meta: RecordMeta,
}

/// Derived label/value pair for presenting an entry in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOption {
    /// Label to show: the meta name, or a truncated address.
    pub label: String,
    /// The full address backing the option.
    pub value: String,
}

impl DisplayOption {
    /// Builds a display option for an address, falling back to a truncated
    /// `head…tail` label when no name is given.
    #[must_use]
    pub fn new(address: &str, name: Option<&str>) -> Self {
        let label = name.map_or_else(|| truncated_label(address), str::to_owned);
        Self {
            label,
            value: address.to_owned(),
        }
    }
}

/// Shortens an address to its first and last seven characters.
///
/// Addresses are opaque strings here, so the split counts characters rather
/// than bytes.
fn truncated_label(address: &str) -> String {
    const EDGE: usize = 7;
    let count = address.chars().count();
    if count <= EDGE * 2 {
        return address.to_owned();
    }
    let head: String = address.chars().take(EDGE).collect();
    let tail: String = address.chars().skip(count - EDGE).collect();
    format!("{head}…{tail}")
}

/// One registry entry: the persisted blob plus its derived display option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The persisted metadata blob.
    pub json: KeyringJson,
    /// Derived presentation option.
    pub option: DisplayOption,
}

impl Record {
    /// Builds a record for an address from its persisted blob.
    #[must_use]
    pub fn new(address: &str, json: KeyringJson) -> Self {
        let option = DisplayOption::new(address, json.meta.name.as_deref());
        Self { json, option }
    }
}

/// An immutable address → record mapping captured at one point in time.
///
/// Every registry mutation produces a fresh map, so holders of an earlier
/// snapshot observe no interference from later mutations.
pub type Snapshot = Arc<HashMap<String, Record>>;
