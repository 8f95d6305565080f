//! Core container implementation for Wiring.

pub mod binding;
pub mod constructor;
pub mod container;
pub mod error;
pub mod instance;
pub mod key;
pub mod lifecycle;
pub mod module;
pub mod registry;
pub mod settings;

pub use binding::{Binding, Contract};
pub use constructor::{Arguments, Constructor, Injectable};
pub use container::{Container, ContainerBuilder, prelude};
pub use error::{Result, WiringError};
pub use instance::Instance;
pub use key::TypeKey;
pub use lifecycle::Lifecycle;
pub use module::{Module, Registrar};
pub use registry::RegistrationInfo;
pub use settings::{AmbiguityPolicy, ContainerSettings, MissingDependencyPolicy};
