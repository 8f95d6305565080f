//! Constructor tables.
//!
//! Rust has no runtime reflection, so a concrete type describes its public
//! initializers up front: each [`Constructor`] lists the parameter types it
//! needs and a function that builds the value from resolved [`Arguments`].
//! The container picks the constructor with the most parameters and
//! resolves every parameter through itself before calling it.
//!
//! Most types get their table from `#[derive(Injectable)]`. Types with
//! several initializers implement [`Injectable`] by hand:
//!
//! ```
//! use std::sync::Arc;
//! use wiring_container::prelude::*;
//!
//! struct Clock;
//! struct Mailer;
//!
//! struct Signup {
//!     clock: Option<Arc<Clock>>,
//!     mailer: Option<Arc<Mailer>>,
//! }
//!
//! impl Injectable for Signup {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![
//!             Constructor::new("offline", vec![], |_| Ok(Signup { clock: None, mailer: None })),
//!             Constructor::new(
//!                 "new",
//!                 vec![TypeKey::of::<Clock>(), TypeKey::of::<Mailer>()],
//!                 |args| Ok(Signup { clock: args.optional()?, mailer: args.optional()? }),
//!             ),
//!         ]
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{ArgumentMismatchError, Result, WiringError};
use crate::instance::Instance;
use crate::key::TypeKey;

/// A type the container knows how to construct.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Every public initializer of the type.
    ///
    /// The table is read each time an instance is built; keep it cheap.
    fn constructors() -> Vec<Constructor<Self>>;
}

type BuildFn<T> = dyn Fn(&mut Arguments) -> Result<T> + Send + Sync;

/// One initializer of `T`: its parameter types and its body.
pub struct Constructor<T> {
    name: &'static str,
    params: Vec<TypeKey>,
    build: Arc<BuildFn<T>>,
}

impl<T: 'static> Constructor<T> {
    /// Describes an initializer.
    ///
    /// `build` must take its arguments in the order `params` lists them,
    /// via [`Arguments::required`] or [`Arguments::optional`].
    pub fn new(
        name: &'static str,
        params: Vec<TypeKey>,
        build: impl Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            params,
            build: Arc::new(build),
        }
    }

    /// Label used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared parameter types, in order.
    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Runs the body against resolved arguments.
    pub fn invoke(&self, args: &mut Arguments) -> Result<T> {
        (self.build)(args)
    }
}

impl<T: Default + 'static> Constructor<T> {
    /// A zero-parameter constructor backed by [`Default`].
    pub fn from_default() -> Self {
        Self::new("default", Vec::new(), |_| Ok(T::default()))
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            params: self.params.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Picks the constructor with the most parameters.
///
/// Ties go to the one listed first.
pub fn widest<C>(constructors: &[C], arity: impl Fn(&C) -> usize) -> Option<&C> {
    let mut best: Option<&C> = None;
    for candidate in constructors {
        match best {
            Some(current) if arity(current) >= arity(candidate) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Resolved arguments handed to a constructor body.
///
/// Slots follow the declared parameter order. A slot is empty when its
/// parameter had no registration and the container was configured to
/// inject empty values instead of failing.
pub struct Arguments {
    owner: TypeKey,
    slots: Vec<(TypeKey, Option<Instance>)>,
    position: usize,
}

impl Arguments {
    /// Creates the argument list for a constructor of `owner`.
    pub fn new(owner: TypeKey, slots: Vec<(TypeKey, Option<Instance>)>) -> Self {
        Self {
            owner,
            slots,
            position: 0,
        }
    }

    /// Takes the next argument, which must be present.
    ///
    /// # Errors
    /// [`WiringError::MissingArgument`] if the slot is empty,
    /// [`WiringError::ArgumentMismatch`] if `P` is not the declared type.
    pub fn required<P: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<P>> {
        let position = self.position;
        self.optional::<P>()?.ok_or(WiringError::MissingArgument {
            owner: self.owner,
            parameter: TypeKey::of::<P>(),
            position,
        })
    }

    /// Takes the next argument, `None` if its slot is empty.
    ///
    /// # Errors
    /// [`WiringError::ArgumentMismatch`] if `P` is not the declared type or
    /// every declared argument was already taken.
    pub fn optional<P: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Option<Arc<P>>> {
        let requested = TypeKey::of::<P>();
        let position = self.position;

        let Some((declared, slot)) = self.slots.get(position) else {
            return Err(self.mismatch(requested, None));
        };
        let declared = *declared;
        if declared != requested {
            return Err(self.mismatch(requested, Some(declared)));
        }

        let value = match slot {
            Some(instance) => Some(
                instance
                    .downcast::<P>()
                    .ok_or_else(|| self.mismatch(requested, Some(instance.contract())))?,
            ),
            None => None,
        };

        self.position += 1;
        Ok(value)
    }

    /// Number of arguments not taken yet.
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.position
    }

    fn mismatch(&self, requested: TypeKey, declared: Option<TypeKey>) -> WiringError {
        WiringError::ArgumentMismatch(ArgumentMismatchError {
            owner: self.owner,
            position: self.position,
            requested,
            declared,
        })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("position", &self.position)
            .field("len", &self.slots.len())
            .finish()
    }
}
