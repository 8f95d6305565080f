//! # The Container — heart of Wiring
//!
//! Registers contracts against concrete types and resolves instances,
//! building each constructor parameter through the container itself.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──register()──> Registry
//!                                   │                        │
//!                        resolve_by_type / resolve_by_key    │
//!                                   │                        │
//!                                   └── widest constructor ◄─┘
//!                                        └── each parameter: resolve_by_type
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use wiring_container::prelude::*;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//! impl Injectable for English {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::from_default()]
//!     }
//! }
//! wiring_container::contract!(English => dyn Greeter);
//!
//! struct Welcome {
//!     greeter: Arc<dyn Greeter>,
//! }
//! impl Injectable for Welcome {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new("new", vec![TypeKey::of::<dyn Greeter>()], |args| {
//!             Ok(Welcome { greeter: args.required()? })
//!         })]
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_singleton::<dyn Greeter, English>("greeter")?;
//! container.register_self_transient::<Welcome>()?;
//!
//! let welcome = container.get::<Welcome>()?.expect("registered");
//! assert_eq!(welcome.greeter.greet(), "hello");
//! # Ok::<(), WiringError>(())
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};
use wiring_support::naming::default_key;
use wiring_support::rendering::suggest_similar;

use crate::binding::{Binding, Contract, Source};
use crate::constructor::{Arguments, Injectable, widest};
use crate::error::{
    AmbiguousLookupError, NoConstructorError, Result, UnresolvedDependencyError, WiringError,
};
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;
use crate::module::{Module, Registrar};
use crate::registry::{Entry, Registry, RegistrationInfo};
use crate::settings::{AmbiguityPolicy, ContainerSettings, MissingDependencyPolicy};

/// Types currently under construction, outermost first. Only used to
/// describe failures.
type ResolutionPath = Vec<TypeKey>;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with settings and registrations.
///
/// Chained registrations never panic: the first failure is kept and
/// returned by [`build()`](ContainerBuilder::build).
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .ambiguity(AmbiguityPolicy::LastRegistered)
///     .instance::<Config>("config", Arc::new(Config::load()?))
///     .singleton::<dyn UserStore, SqlUserStore>("users.store")
///     .transient_self::<SignupService>()
///     .module(&MailModule)
///     .build()?;
/// ```
pub struct ContainerBuilder {
    registry: Registry,
    settings: ContainerSettings,
    first_error: Option<WiringError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            settings: ContainerSettings::default(),
            first_error: None,
        }
    }

    /// Replaces all settings.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the tie-break for resolution by contract.
    pub fn ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
        self.settings.ambiguity = policy;
        self
    }

    /// Sets what unresolved constructor parameters receive.
    pub fn missing_dependency(mut self, policy: MissingDependencyPolicy) -> Self {
        self.settings.missing_dependency = policy;
        self
    }

    /// Registers `C` as a new instance per resolution of contract `A`.
    pub fn transient<A, C>(self, key: impl Into<String>) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.record(key.into(), Binding::new::<A, C>(), Lifecycle::Transient)
    }

    /// Registers `C` as the shared instance of contract `A`.
    pub fn singleton<A, C>(self, key: impl Into<String>) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.record(key.into(), Binding::new::<A, C>(), Lifecycle::Singleton)
    }

    /// Registers a ready-made value as the shared instance of contract `A`.
    pub fn instance<A>(self, key: impl Into<String>, value: Arc<A>) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.record(key.into(), Binding::instance(value), Lifecycle::Singleton)
    }

    /// Registers a ready-made `C` as the shared instance of contract `A`,
    /// keeping `C` as its concrete type.
    pub fn instance_of<A, C>(self, key: impl Into<String>, value: Arc<C>) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Contract<A>,
    {
        self.record(key.into(), Binding::instance_of::<A, C>(value), Lifecycle::Singleton)
    }

    /// Registers `T` under its own short type name, transient.
    pub fn transient_self<T: Injectable>(self) -> Self {
        self.transient::<T, T>(default_key(type_name::<T>()))
    }

    /// Registers `T` under its own short type name, singleton.
    pub fn singleton_self<T: Injectable>(self) -> Self {
        self.singleton::<T, T>(default_key(type_name::<T>()))
    }

    /// Applies a [`Module`].
    pub fn module(mut self, module: &dyn Module) -> Self {
        debug!(module = module.name(), "Applying module");
        if let Err(err) = module.register(&mut self) {
            self.first_error.get_or_insert(err);
        }
        self
    }

    /// Finishes the container.
    ///
    /// # Errors
    /// The first registration error met while building.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        if let Some(err) = self.first_error {
            warn!(error = %err, "Container build failed");
            return Err(err);
        }

        info!(
            registered = self.registry.len(),
            ambiguity = %self.settings.ambiguity,
            missing_dependency = %self.settings.missing_dependency,
            "Container built"
        );
        Ok(Container {
            registry: self.registry,
            settings: self.settings,
        })
    }

    fn record(mut self, key: String, binding: Binding, lifecycle: Lifecycle) -> Self {
        if let Err(err) = self.register_binding(key, binding, lifecycle) {
            self.first_error.get_or_insert(err);
        }
        self
    }
}

impl Registrar for ContainerBuilder {
    fn register_binding(&mut self, key: String, binding: Binding, lifecycle: Lifecycle) -> Result<()> {
        let key = checked_key(key, &binding)?;
        self.registry.insert(key, binding, lifecycle)
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("registered", &self.registry.len())
            .field("settings", &self.settings)
            .field("failed", &self.first_error.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Thread-safe registry of contracts and the resolver over it.
///
/// Registration is allowed at any time, including while other threads
/// resolve. Share the container by reference or `Arc<Container>`; there is
/// no global instance.
pub struct Container {
    registry: Registry,
    settings: ContainerSettings,
}

impl Container {
    /// Creates an empty container with default settings.
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    /// Creates an empty container with the given settings.
    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            registry: Registry::new(),
            settings,
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    // ── Registration ──

    /// Registers `binding` under `key` with the given lifecycle.
    ///
    /// # Errors
    /// - [`WiringError::InvalidKey`] if `key` is blank
    /// - [`WiringError::DuplicateRegistration`] if `key` is taken; nothing
    ///   is inserted
    pub fn register(&self, key: impl Into<String>, binding: Binding, lifecycle: Lifecycle) -> Result<()> {
        let key = checked_key(key.into(), &binding)?;
        self.registry.insert(key, binding, lifecycle)
    }

    /// Registers `C` as a new instance per resolution of contract `A`.
    pub fn register_transient<A, C>(&self, key: impl Into<String>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.register(key, Binding::new::<A, C>(), Lifecycle::Transient)
    }

    /// Registers `C` as the shared instance of contract `A`.
    pub fn register_singleton<A, C>(&self, key: impl Into<String>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.register(key, Binding::new::<A, C>(), Lifecycle::Singleton)
    }

    /// Registers a ready-made value as the shared instance of contract `A`.
    pub fn register_instance<A>(&self, key: impl Into<String>, value: Arc<A>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.register(key, Binding::instance(value), Lifecycle::Singleton)
    }

    /// Registers a ready-made `C` as the shared instance of contract `A`.
    /// Unlike [`register_instance`](Container::register_instance), the
    /// registration reports `C` as its concrete type.
    pub fn register_instance_of<A, C>(&self, key: impl Into<String>, value: Arc<C>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Contract<A>,
    {
        self.register(key, Binding::instance_of::<A, C>(value), Lifecycle::Singleton)
    }

    /// Registers `T` as its own contract, transient, keyed by its short
    /// type name.
    pub fn register_self_transient<T: Injectable>(&self) -> Result<()> {
        self.register_transient::<T, T>(default_key(type_name::<T>()))
    }

    /// Registers `T` as its own contract, singleton, keyed by its short
    /// type name.
    pub fn register_self_singleton<T: Injectable>(&self) -> Result<()> {
        self.register_singleton::<T, T>(default_key(type_name::<T>()))
    }

    /// Applies a [`Module`] to this container.
    pub fn install(&self, module: &dyn Module) -> Result<()> {
        debug!(module = module.name(), "Installing module");
        let mut registrar: &Container = self;
        module.register(&mut registrar)
    }

    // ── Resolution ──

    /// Resolves the entry registered under `contract`.
    ///
    /// Returns `Ok(None)` when nothing is registered for it. When several
    /// keys share the contract the [`AmbiguityPolicy`] decides.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve_by_type(&self, contract: &TypeKey) -> Result<Option<Instance>> {
        self.lookup_contract(contract, &mut ResolutionPath::new())
    }

    /// Resolves the entry registered under `key`.
    ///
    /// Returns `Ok(None)` for an unknown key.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve_by_key(&self, key: &str) -> Result<Option<Instance>> {
        match self.registry.get(key) {
            Some(entry) => self.resolve_entry(&entry, &mut ResolutionPath::new()).map(Some),
            None => {
                trace!(key, "No entry for key");
                Ok(None)
            }
        }
    }

    /// Resolves contract `A`.
    ///
    /// ```rust,ignore
    /// let store: Arc<dyn UserStore> = container.get()?.expect("store registered");
    /// ```
    pub fn get<A: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<A>>> {
        let instance = self.resolve_by_type(&TypeKey::of::<A>())?;
        Ok(instance.and_then(|i| i.downcast::<A>()))
    }

    /// Resolves the entry under `key` as contract `A`.
    ///
    /// # Errors
    /// [`WiringError::ContractMismatch`] if the key is registered for a
    /// different contract. Nothing is constructed in that case.
    pub fn get_by_key<A: ?Sized + Send + Sync + 'static>(&self, key: &str) -> Result<Option<Arc<A>>> {
        let Some(entry) = self.registry.get(key) else {
            trace!(key, "No entry for key");
            return Ok(None);
        };

        let expected = TypeKey::of::<A>();
        let actual = entry.binding.contract();
        if actual != expected {
            return Err(WiringError::ContractMismatch {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let instance = self.resolve_entry(&entry, &mut ResolutionPath::new())?;
        Ok(instance.downcast::<A>())
    }

    // ── Inspection ──

    pub fn contains_key(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Snapshot of the registration under `key`.
    pub fn registration(&self, key: &str) -> Option<RegistrationInfo> {
        self.registry.get(key).map(|entry| entry.info())
    }

    /// Snapshots of all registrations, sorted by key.
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        self.registry.infos()
    }

    // ── Internal ──

    fn lookup_contract(&self, contract: &TypeKey, path: &mut ResolutionPath) -> Result<Option<Instance>> {
        match self.select(contract)? {
            Some(entry) => self.resolve_entry(&entry, path).map(Some),
            None => {
                trace!(contract = %contract, "No entry for contract");
                Ok(None)
            }
        }
    }

    /// Picks the entry for a contract according to the ambiguity policy.
    fn select(&self, contract: &TypeKey) -> Result<Option<Arc<Entry>>> {
        let mut candidates = self.registry.by_contract(contract);
        if candidates.len() <= 1 {
            return Ok(candidates.pop());
        }

        let keys = || candidates.iter().map(|e| e.key.clone()).collect::<Vec<_>>();
        match self.settings.ambiguity {
            AmbiguityPolicy::Error => Err(WiringError::AmbiguousLookup(AmbiguousLookupError {
                contract: *contract,
                keys: keys(),
            })),
            AmbiguityPolicy::FirstRegistered => {
                warn!(contract = %contract, candidates = ?keys(), "Several entries match, using the first");
                Ok(candidates.into_iter().next())
            }
            AmbiguityPolicy::LastRegistered => {
                warn!(contract = %contract, candidates = ?keys(), "Several entries match, using the last");
                Ok(candidates.pop())
            }
        }
    }

    /// Returns the cached singleton or builds a new instance.
    ///
    /// The singleton slot is filled at most once, even when several threads
    /// race on the first resolution; the losers wait for the winner's value.
    fn resolve_entry(&self, entry: &Entry, path: &mut ResolutionPath) -> Result<Instance> {
        if !entry.lifecycle.is_cached() {
            return self.instantiate(entry, path);
        }

        if let Some(cached) = entry.cache.get() {
            trace!(key = %entry.key, "Using cached singleton");
            return Ok(cached.clone());
        }

        entry
            .cache
            .get_or_try_init(|| self.instantiate(entry, path))
            .cloned()
    }

    fn instantiate(&self, entry: &Entry, path: &mut ResolutionPath) -> Result<Instance> {
        let concrete = entry.binding.concrete();
        let constructors = match entry.binding.source() {
            Source::Constructed(table) => table(),
            Source::Prebuilt(instance) => return Ok(instance.clone()),
        };

        path.push(concrete);

        let ctor = widest(&constructors, |c| c.params.len()).ok_or_else(|| {
            WiringError::NoConstructor(NoConstructorError {
                concrete,
                path: path.clone(),
            })
        })?;

        trace!(
            key = %entry.key,
            concrete = %concrete,
            constructor = ctor.name,
            arity = ctor.params.len(),
            "Constructing"
        );

        let mut slots = Vec::with_capacity(ctor.params.len());
        for param in &ctor.params {
            let resolved = self.lookup_contract(param, path)?;
            if resolved.is_none() {
                match self.settings.missing_dependency {
                    MissingDependencyPolicy::Fail => {
                        return Err(WiringError::UnresolvedDependency(UnresolvedDependencyError {
                            requested: *param,
                            required_by: concrete,
                            path: path.clone(),
                            suggestions: self.suggestions(param),
                        }));
                    }
                    MissingDependencyPolicy::Empty => {
                        warn!(
                            parameter = %param,
                            required_by = %concrete,
                            "Dependency not registered, injecting an empty value"
                        );
                    }
                }
            }
            slots.push((*param, resolved));
        }

        let instance = (ctor.build)(&mut Arguments::new(concrete, slots))?;
        path.pop();
        Ok(instance)
    }

    fn suggestions(&self, requested: &TypeKey) -> Vec<String> {
        let contracts = self.registry.contracts();
        let names: Vec<&str> = contracts.iter().map(|k| k.type_name()).collect();
        suggest_similar(requested.type_name(), &names, 3)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar for &Container {
    fn register_binding(&mut self, key: String, binding: Binding, lifecycle: Lifecycle) -> Result<()> {
        Container::register(*self, key, binding, lifecycle)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .field("settings", &self.settings)
            .finish()
    }
}

fn checked_key(key: String, binding: &Binding) -> Result<String> {
    if key.trim().is_empty() {
        return Err(WiringError::InvalidKey {
            key,
            contract: binding.contract(),
        });
    }
    Ok(key)
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::binding::{Binding, Contract};
    pub use crate::constructor::{Arguments, Constructor, Injectable};
    pub use crate::error::{Result, WiringError};
    pub use crate::instance::Instance;
    pub use crate::key::TypeKey;
    pub use crate::lifecycle::Lifecycle;
    pub use crate::module::{Module, Registrar};
    pub use crate::registry::RegistrationInfo;
    pub use crate::settings::{AmbiguityPolicy, ContainerSettings, MissingDependencyPolicy};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
