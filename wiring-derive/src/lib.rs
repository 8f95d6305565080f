//! Derive macros for Wiring, re-exported for the facade crate.

pub use wiring_macros::Injectable;
