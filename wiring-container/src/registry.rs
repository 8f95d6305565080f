//! The registry: unique string keys mapped to entries.
//!
//! Entries are added and never removed. The only mutable state of an entry
//! is its singleton slot, which goes from empty to filled exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use crate::binding::{Binding, Source};
use crate::error::{DuplicateRegistrationError, Result, WiringError};
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;

/// One registration.
///
/// `cache` is only ever filled for singletons, so a filled cache implies
/// `lifecycle == Singleton`.
pub(crate) struct Entry {
    pub key: String,
    pub binding: Binding,
    pub lifecycle: Lifecycle,
    pub cache: OnceCell<Instance>,
}

impl Entry {
    /// Pre-built bindings are always singletons: their only instance is
    /// the one supplied.
    fn new(key: String, binding: Binding, lifecycle: Lifecycle) -> Self {
        let (lifecycle, cache) = match binding.source() {
            Source::Prebuilt(instance) => (Lifecycle::Singleton, OnceCell::with_value(instance.clone())),
            Source::Constructed(_) => (lifecycle, OnceCell::new()),
        };
        Self {
            key,
            binding,
            lifecycle,
            cache,
        }
    }

    /// Whether the singleton slot holds an instance.
    pub fn instantiated(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn info(&self) -> RegistrationInfo {
        RegistrationInfo {
            key: self.key.clone(),
            contract: self.binding.contract(),
            concrete: self.binding.concrete(),
            lifecycle: self.lifecycle,
            instantiated: self.instantiated(),
        }
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("binding", &self.binding)
            .field("lifecycle", &self.lifecycle)
            .field("instantiated", &self.instantiated())
            .finish()
    }
}

/// Read-only view of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInfo {
    pub key: String,
    pub contract: TypeKey,
    pub concrete: TypeKey,
    pub lifecycle: Lifecycle,
    /// `true` once a singleton has been constructed (or was pre-built).
    pub instantiated: bool,
}

/// Stores all registrations of a container.
///
/// Keys live in a [`DashMap`]; a second index maps each contract to its
/// keys in registration order for by-type lookup. Inserts take the index
/// write lock for their whole duration, so the duplicate check and both
/// inserts are one atomic step.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: DashMap<String, Arc<Entry>>,
    by_contract: RwLock<HashMap<TypeKey, Vec<String>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry under `key`.
    ///
    /// # Errors
    /// [`WiringError::DuplicateRegistration`] if the key exists. The
    /// registry is left untouched in that case.
    pub fn insert(&self, key: String, binding: Binding, lifecycle: Lifecycle) -> Result<()> {
        let mut index = self.by_contract.write();

        match self.entries.entry(key) {
            MapEntry::Occupied(existing) => {
                Err(WiringError::DuplicateRegistration(DuplicateRegistrationError {
                    key: existing.key().clone(),
                    existing: existing.get().binding.contract(),
                    attempted: binding.contract(),
                }))
            }
            MapEntry::Vacant(slot) => {
                let key = slot.key().clone();
                let contract = binding.contract();
                let entry = Entry::new(key.clone(), binding, lifecycle);

                debug!(
                    key = %key,
                    contract = %contract,
                    concrete = %entry.binding.concrete(),
                    lifecycle = %entry.lifecycle,
                    "Registered"
                );

                slot.insert(Arc::new(entry));
                index.entry(contract).or_default().push(key);
                Ok(())
            }
        }
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &str) -> Option<Arc<Entry>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// All entries registered under `contract`, oldest first.
    pub fn by_contract(&self, contract: &TypeKey) -> Vec<Arc<Entry>> {
        let keys = match self.by_contract.read().get(contract) {
            Some(keys) => keys.clone(),
            None => return Vec::new(),
        };
        keys.iter().filter_map(|key| self.get(key)).collect()
    }

    /// Every contract that has at least one entry.
    pub fn contracts(&self) -> Vec<TypeKey> {
        self.by_contract.read().keys().copied().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshots of every entry, sorted by key.
    pub fn infos(&self) -> Vec<RegistrationInfo> {
        let mut infos: Vec<_> = self.entries.iter().map(|e| e.value().info()).collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::{Constructor, Injectable};

    #[derive(Default)]
    struct Database;

    impl Injectable for Database {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::from_default()]
        }
    }

    #[derive(Default)]
    struct Cache;

    impl Injectable for Cache {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::from_default()]
        }
    }

    #[test]
    fn insert_and_get() {
        let reg = Registry::new();
        reg.insert("db".into(), Binding::new::<Database, Database>(), Lifecycle::Singleton)
            .unwrap();

        let entry = reg.get("db").unwrap();
        assert_eq!(entry.lifecycle, Lifecycle::Singleton);
        assert!(!entry.instantiated());
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn duplicate_key_leaves_first_entry() {
        let reg = Registry::new();
        reg.insert("store".into(), Binding::new::<Database, Database>(), Lifecycle::Transient)
            .unwrap();

        let err = reg
            .insert("store".into(), Binding::new::<Cache, Cache>(), Lifecycle::Singleton)
            .unwrap_err();
        assert!(matches!(err, WiringError::DuplicateRegistration(_)));

        assert_eq!(reg.len(), 1);
        let entry = reg.get("store").unwrap();
        assert_eq!(entry.binding.concrete(), TypeKey::of::<Database>());
        assert!(reg.by_contract(&TypeKey::of::<Cache>()).is_empty());
    }

    #[test]
    fn contract_index_keeps_registration_order() {
        let reg = Registry::new();
        for key in ["primary", "replica", "archive"] {
            reg.insert(key.into(), Binding::new::<Database, Database>(), Lifecycle::Transient)
                .unwrap();
        }

        let keys: Vec<_> = reg
            .by_contract(&TypeKey::of::<Database>())
            .iter()
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(keys, ["primary", "replica", "archive"]);
    }

    #[test]
    fn prebuilt_singleton_starts_instantiated() {
        let reg = Registry::new();
        reg.insert(
            "db".into(),
            Binding::instance(Arc::new(Database)),
            Lifecycle::Singleton,
        )
        .unwrap();
        assert!(reg.get("db").unwrap().instantiated());
    }

    #[test]
    fn prebuilt_is_forced_to_singleton() {
        let reg = Registry::new();
        reg.insert(
            "db".into(),
            Binding::instance(Arc::new(Database)),
            Lifecycle::Transient,
        )
        .unwrap();
        let entry = reg.get("db").unwrap();
        assert_eq!(entry.lifecycle, Lifecycle::Singleton);
        assert!(entry.instantiated());
    }

    #[test]
    fn infos_sorted_by_key() {
        let reg = Registry::new();
        reg.insert("b".into(), Binding::new::<Cache, Cache>(), Lifecycle::Transient)
            .unwrap();
        reg.insert("a".into(), Binding::new::<Database, Database>(), Lifecycle::Singleton)
            .unwrap();

        let infos = reg.infos();
        assert_eq!(infos[0].key, "a");
        assert_eq!(infos[0].concrete, TypeKey::of::<Database>());
        assert_eq!(infos[1].lifecycle, Lifecycle::Transient);
    }
}
