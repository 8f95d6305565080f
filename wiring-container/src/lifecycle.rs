//! Instance lifecycle policies.
//!
//! - [`Lifecycle::Transient`] — a new instance on every resolution
//! - [`Lifecycle::Singleton`] — the first instance is cached per registry key
use std::fmt;

use serde::{Deserialize, Serialize};

/// Decides whether a registry entry caches what it constructs.
///
/// # Examples
/// ```
/// use wiring_container::lifecycle::Lifecycle;
///
/// assert!(Lifecycle::Singleton.is_cached());
/// assert!(!Lifecycle::Transient.is_cached());
/// assert_eq!(Lifecycle::default(), Lifecycle::Transient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Constructed anew on every resolution. Never cached.
    ///
    /// Equivalent to: .NET `Transient`, "per request" in older containers.
    #[default]
    Transient,

    /// Constructed on first resolution, then shared.
    ///
    /// The instance lives as long as the container. Pre-built instances
    /// registered with `register_instance` are always singletons.
    Singleton,
}

impl Lifecycle {
    /// Returns `true` if resolved instances are kept by the entry.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifecycle::Singleton)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Transient => f.pad("Transient"),
            Lifecycle::Singleton => f.pad("Singleton"),
        }
    }
}
