//! # Wiring — a minimal inversion-of-control registry
//!
//! Register concrete types under string keys against the contract they
//! satisfy, then resolve instances by key or by contract. Constructor
//! parameters are resolved through the same container, and singletons are
//! built at most once.
//!
//! ```rust
//! use std::sync::Arc;
//! use wiring::prelude::*;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(provides = "dyn Clock")]
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { 42 }
//! }
//!
//! #[derive(Injectable)]
//! struct Stamp {
//!     clock: Arc<dyn Clock>,
//! }
//!
//! let container = Container::builder()
//!     .singleton::<dyn Clock, FixedClock>("clock")
//!     .transient_self::<Stamp>()
//!     .build()?;
//!
//! let stamp = container.get::<Stamp>()?.expect("registered");
//! assert_eq!(stamp.clock.now(), 42);
//! # Ok::<(), WiringError>(())
//! ```
//!
//! The crates behind the facade:
//! - `wiring-container`: registry, resolution, modules, settings
//! - `wiring-derive`: `#[derive(Injectable)]`
//! - `wiring-support`: type-name helpers used in keys and diagnostics

// Lets the derive's `::wiring::` paths resolve inside this crate too.
extern crate self as wiring;

pub use wiring_container::*;
pub use wiring_container::contract;
pub use wiring_derive::*;
pub use wiring_support as support;

/// Everything needed to register and resolve, including the derive.
pub mod prelude {
    pub use wiring_container::prelude::*;
    pub use wiring_derive::Injectable;
}
