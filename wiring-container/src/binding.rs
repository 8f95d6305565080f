//! Contract-to-implementation bindings.
//!
//! A [`Binding`] is what the core `register` operation stores: the
//! contract type, the concrete type, and the concrete type's constructor
//! table with each body already wrapped to hand back the contract view.

use std::fmt;
use std::sync::Arc;

use crate::constructor::{Arguments, Injectable};
use crate::error::Result;
use crate::instance::Instance;
use crate::key::TypeKey;

/// Converts a shared concrete value into its contract view.
///
/// Every type is its own contract. Trait-object contracts are declared
/// with [`contract!`](crate::contract) or `#[injectable(provides = "...")]`:
///
/// ```
/// use std::sync::Arc;
/// use wiring_container::binding::Contract;
///
/// trait UserStore: Send + Sync {}
/// struct MemoryStore;
/// impl UserStore for MemoryStore {}
///
/// wiring_container::contract!(MemoryStore => dyn UserStore);
///
/// let store: Arc<dyn UserStore> = Arc::new(MemoryStore).into_contract();
/// ```
pub trait Contract<A: ?Sized>: Send + Sync + 'static {
    fn into_contract(self: Arc<Self>) -> Arc<A>;
}

impl<T: Send + Sync + 'static> Contract<T> for T {
    #[inline]
    fn into_contract(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Contract`] for trait objects a concrete type satisfies.
///
/// ```rust,ignore
/// contract!(SmtpMailer => dyn Mailer, dyn HealthCheck);
/// ```
#[macro_export]
macro_rules! contract {
    ($concrete:ty => $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::binding::Contract<$contract> for $concrete {
                #[inline]
                fn into_contract(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}

type ErasedBuildFn = dyn Fn(&mut Arguments) -> Result<Instance> + Send + Sync;

/// A constructor whose output is already erased to the contract.
#[derive(Clone)]
pub(crate) struct ErasedConstructor {
    pub name: &'static str,
    pub params: Vec<TypeKey>,
    pub build: Arc<ErasedBuildFn>,
}

impl fmt::Debug for ErasedConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedConstructor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Where instances of a binding come from.
#[derive(Clone)]
pub(crate) enum Source {
    /// Built through the concrete type's constructor table.
    Constructed(fn() -> Vec<ErasedConstructor>),
    /// Supplied ready-made at registration.
    Prebuilt(Instance),
}

/// An abstract contract paired with the concrete type that satisfies it.
#[derive(Clone)]
pub struct Binding {
    contract: TypeKey,
    concrete: TypeKey,
    source: Source,
}

impl Binding {
    /// Binds contract `A` to concrete type `C`.
    ///
    /// ```
    /// use wiring_container::prelude::*;
    ///
    /// #[derive(Default)]
    /// struct Clock;
    /// impl Injectable for Clock {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::from_default()]
    ///     }
    /// }
    ///
    /// let binding = Binding::new::<Clock, Clock>();
    /// assert_eq!(binding.contract(), TypeKey::of::<Clock>());
    /// ```
    pub fn new<A, C>() -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Injectable + Contract<A>,
    {
        Self {
            contract: TypeKey::of::<A>(),
            concrete: TypeKey::of::<C>(),
            source: Source::Constructed(erase_constructors::<A, C>),
        }
    }

    /// Binds contract `A` to an already constructed value.
    ///
    /// The concrete type is not known here and is reported as `A`; use
    /// [`Binding::instance_of`] to keep it.
    pub fn instance<A: ?Sized + Send + Sync + 'static>(value: Arc<A>) -> Self {
        let key = TypeKey::of::<A>();
        Self {
            contract: key,
            concrete: key,
            source: Source::Prebuilt(Instance::new(value, key)),
        }
    }

    /// Binds contract `A` to an already constructed `C`, keeping `C` as
    /// the reported concrete type.
    pub fn instance_of<A, C>(value: Arc<C>) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Contract<A>,
    {
        let concrete = TypeKey::of::<C>();
        Self {
            contract: TypeKey::of::<A>(),
            concrete,
            source: Source::Prebuilt(Instance::new(<C as Contract<A>>::into_contract(value), concrete)),
        }
    }

    /// The type identifier this binding is looked up by.
    #[inline]
    pub fn contract(&self) -> TypeKey {
        self.contract
    }

    /// The type identifier that gets instantiated.
    #[inline]
    pub fn concrete(&self) -> TypeKey {
        self.concrete
    }

    pub(crate) fn source(&self) -> &Source {
        &self.source
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("contract", &self.contract)
            .field("concrete", &self.concrete)
            .field("prebuilt", &matches!(self.source, Source::Prebuilt(_)))
            .finish()
    }
}

fn erase_constructors<A, C>() -> Vec<ErasedConstructor>
where
    A: ?Sized + Send + Sync + 'static,
    C: Injectable + Contract<A>,
{
    C::constructors()
        .into_iter()
        .map(|ctor| {
            let name = ctor.name();
            let params = ctor.params().to_vec();
            let build = move |args: &mut Arguments| -> Result<Instance> {
                let value = <C as Contract<A>>::into_contract(Arc::new(ctor.invoke(args)?));
                Ok(Instance::new(value, TypeKey::of::<C>()))
            };
            ErasedConstructor {
                name,
                params,
                build: Arc::new(build),
            }
        })
        .collect()
}
