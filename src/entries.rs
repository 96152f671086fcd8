//! Order-preserving storage for registry entries
//!
//! Uses DashMap for lock-free concurrent access, plus an insertion log so
//! enumeration reflects registration/discovery order rather than hash order.

use crate::definition::Definition;
use crate::Specifier;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Mutex;

/// Thread-safe specifier -> definition map that remembers insertion order.
///
/// Enumeration order matters for `available_for_type`: manual entries come
/// back in registration order, scanned entries in discovery order. DashMap
/// alone cannot promise that, so inserts also append to an ordered log.
pub(crate) struct EntryMap {
    /// Map from specifier to definition
    entries: DashMap<Specifier, Definition, RandomState>,
    /// Insertion order log (first insert wins a slot; overwrites keep it)
    order: Mutex<Vec<Specifier>>,
}

impl EntryMap {
    /// Create an empty map with a small shard count.
    ///
    /// Default DashMap uses num_cpus * 4 shards which is overkill for a
    /// per-bundle registry with tens of entries.
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Insert a definition. Overwrites any prior definition for the same
    /// specifier without changing its position in the order log.
    pub fn insert(&self, specifier: Specifier, definition: Definition) {
        if self.entries.insert(specifier.clone(), definition).is_none() {
            self.order.lock().unwrap().push(specifier);
        }
    }

    /// Get the definition for a specifier, if present.
    pub fn get(&self, specifier: &Specifier) -> Option<Definition> {
        self.entries.get(specifier).map(|entry| entry.value().clone())
    }

    /// Remove an entry. Returns true if it existed.
    pub fn remove(&self, specifier: &Specifier) -> bool {
        if self.entries.remove(specifier).is_some() {
            self.order.lock().unwrap().retain(|s| s != specifier);
            true
        } else {
            false
        }
    }

    /// All specifiers in insertion order.
    pub fn specifiers(&self) -> Vec<Specifier> {
        self.order.lock().unwrap().clone()
    }

    /// Specifiers of the given type, in insertion order.
    pub fn specifiers_for_type(&self, type_name: &str) -> Vec<Specifier> {
        self.order
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_type(type_name))
            .cloned()
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryMap")
            .field("count", &self.len())
            .finish()
    }
}
