//! Container settings.
//!
//! Two lookup policies have no single right answer and are left to the
//! application: what to do when several entries share a contract, and what
//! to inject when a constructor parameter has no registration. Settings
//! deserialize with `serde`, so they can live in the application's config
//! file:
//!
//! ```toml
//! [container]
//! ambiguity = "last_registered"
//! missing_dependency = "empty"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tie-break for resolution by contract when several keys match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Fail with `AmbiguousLookup`.
    #[default]
    Error,
    /// Use the entry registered first.
    FirstRegistered,
    /// Use the entry registered last.
    LastRegistered,
}

/// What a constructor receives for a parameter with no registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Fail the whole resolution with `UnresolvedDependency`.
    #[default]
    Fail,
    /// Pass an empty slot; `Arguments::optional` sees `None`.
    Empty,
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityPolicy::Error => f.pad("error"),
            AmbiguityPolicy::FirstRegistered => f.pad("first_registered"),
            AmbiguityPolicy::LastRegistered => f.pad("last_registered"),
        }
    }
}

impl fmt::Display for MissingDependencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDependencyPolicy::Fail => f.pad("fail"),
            MissingDependencyPolicy::Empty => f.pad("empty"),
        }
    }
}

/// Policies a container resolves with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    pub ambiguity: AmbiguityPolicy,
    pub missing_dependency: MissingDependencyPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let settings = ContainerSettings::default();
        assert_eq!(settings.ambiguity, AmbiguityPolicy::Error);
        assert_eq!(settings.missing_dependency, MissingDependencyPolicy::Fail);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let settings: ContainerSettings =
            serde_json::from_str(r#"{ "ambiguity": "last_registered" }"#).unwrap();
        assert_eq!(settings.ambiguity, AmbiguityPolicy::LastRegistered);
        assert_eq!(settings.missing_dependency, MissingDependencyPolicy::Fail);
    }

    #[test]
    fn full_config() {
        let settings: ContainerSettings = serde_json::from_str(
            r#"{ "ambiguity": "first_registered", "missing_dependency": "empty" }"#,
        )
        .unwrap();
        assert_eq!(
            settings,
            ContainerSettings {
                ambiguity: AmbiguityPolicy::FirstRegistered,
                missing_dependency: MissingDependencyPolicy::Empty,
            }
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(serde_json::from_str::<ContainerSettings>(r#"{ "ambiguity": "random" }"#).is_err());
    }

    #[test]
    fn display_matches_serde_names() {
        assert_eq!(AmbiguityPolicy::LastRegistered.to_string(), "last_registered");
        assert_eq!(MissingDependencyPolicy::Empty.to_string(), "empty");
    }

    #[test]
    fn display_respects_width() {
        assert_eq!(format!("{:<7}|", AmbiguityPolicy::Error), "error  |");
        assert_eq!(format!("{:>6}", MissingDependencyPolicy::Fail), "  fail");
    }
}
