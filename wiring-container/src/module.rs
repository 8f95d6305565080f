//! Modules — groups of related registrations.
//!
//! A module registers everything one area of the application needs, so
//! wiring is split by concern instead of living in one long block:
//!
//! ```rust,ignore
//! struct UsersModule;
//!
//! impl Module for UsersModule {
//!     fn register(&self, registrar: &mut dyn Registrar) -> Result<()> {
//!         registrar.singleton::<dyn UserStore, SqlUserStore>("users.store")?;
//!         registrar.transient_self::<SignupService>()?;
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::builder().module(&UsersModule).build()?;
//! ```

use std::any::type_name;
use std::sync::Arc;

use wiring_support::naming::default_key;

use crate::binding::{Binding, Contract};
use crate::constructor::Injectable;
use crate::error::Result;
use crate::lifecycle::Lifecycle;

/// A set of registrations applied as one unit.
pub trait Module: Send + Sync {
    /// Registers this module's bindings.
    ///
    /// The first failing registration should be returned; the builder
    /// reports it from `build()`.
    fn register(&self, registrar: &mut dyn Registrar) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Registration surface handed to modules.
///
/// Implemented by `ContainerBuilder` and by `&Container`, so a module can
/// be applied while building or later, and can be tested against a mock.
pub trait Registrar {
    /// Registers `binding` under `key`.
    fn register_binding(&mut self, key: String, binding: Binding, lifecycle: Lifecycle) -> Result<()>;
}

impl dyn Registrar + '_ {
    /// Registers `C` as a new instance per resolution of contract `A`.
    pub fn transient<A, C>(&mut self, key: impl Into<String>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.register_binding(key.into(), Binding::new::<A, C>(), Lifecycle::Transient)
    }

    /// Registers `C` as the shared instance of contract `A`.
    pub fn singleton<A, C>(&mut self, key: impl Into<String>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        self.register_binding(key.into(), Binding::new::<A, C>(), Lifecycle::Singleton)
    }

    /// Registers a ready-made value as the shared instance of contract `A`.
    pub fn instance<A>(&mut self, key: impl Into<String>, value: Arc<A>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.register_binding(key.into(), Binding::instance(value), Lifecycle::Singleton)
    }

    /// Registers a ready-made `C` as the shared instance of contract `A`,
    /// keeping `C` as its concrete type.
    pub fn instance_of<A, C>(&mut self, key: impl Into<String>, value: Arc<C>) -> Result<()>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Contract<A>,
    {
        self.register_binding(key.into(), Binding::instance_of::<A, C>(value), Lifecycle::Singleton)
    }

    /// Registers `T` under its own short type name, transient.
    pub fn transient_self<T: Injectable>(&mut self) -> Result<()> {
        self.transient::<T, T>(default_key(type_name::<T>()))
    }

    /// Registers `T` under its own short type name, singleton.
    pub fn singleton_self<T: Injectable>(&mut self) -> Result<()> {
        self.singleton::<T, T>(default_key(type_name::<T>()))
    }
}
