//! Error types for container operations.
//!
//! A resolution that finds nothing is NOT an error: lookups return
//! `Ok(None)`. Everything here is a hard failure that reaches the caller
//! unchanged.

use std::fmt;

use wiring_support::rendering::render_path;

use crate::key::TypeKey;

/// Main error type for all Wiring operations.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// The registration key is already taken.
    #[error("{}", .0)]
    DuplicateRegistration(DuplicateRegistrationError),

    /// The registration key is empty or whitespace.
    #[error("Invalid registration key {key:?} for {contract}: keys must not be blank")]
    InvalidKey { key: String, contract: TypeKey },

    /// Several entries share the requested contract and the ambiguity
    /// policy is `Error`.
    #[error("{}", .0)]
    AmbiguousLookup(AmbiguousLookupError),

    /// A constructor parameter has no registration and the
    /// missing-dependency policy is `Fail`.
    #[error("{}", .0)]
    UnresolvedDependency(UnresolvedDependencyError),

    /// The concrete type described no constructors.
    #[error("{}", .0)]
    NoConstructor(NoConstructorError),

    /// A constructor asked for a required argument whose slot is empty.
    #[error("Missing argument #{position} ({parameter}) for {owner}\n  Hint: take it with .optional() or register {parameter}")]
    MissingArgument {
        owner: TypeKey,
        parameter: TypeKey,
        position: usize,
    },

    /// A constructor pulled arguments in a different order or type than
    /// it declared.
    #[error("{}", .0)]
    ArgumentMismatch(ArgumentMismatchError),

    /// A typed lookup by key found an entry registered for another contract.
    #[error("Key {key:?} is registered as {actual}, not {expected}")]
    ContractMismatch {
        key: String,
        expected: TypeKey,
        actual: TypeKey,
    },

    /// A constructor returned its own error.
    #[error("Failed to construct {concrete}: {source}")]
    ConstructionFailed {
        concrete: TypeKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WiringError {
    /// Wraps an arbitrary error raised while constructing `T`.
    ///
    /// Use this inside constructor closures:
    ///
    /// ```rust,ignore
    /// Constructor::new("connect", vec![], |_| {
    ///     let pool = Pool::connect(URL).map_err(WiringError::construction::<Database>)?;
    ///     Ok(Database { pool })
    /// })
    /// ```
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        WiringError::ConstructionFailed {
            concrete: TypeKey::of::<T>(),
            source: source.into(),
        }
    }
}

/// A registration reused a key that already exists.
#[derive(Debug)]
pub struct DuplicateRegistrationError {
    pub key: String,
    /// Contract of the entry that owns the key.
    pub existing: TypeKey,
    /// Contract of the rejected registration.
    pub attempted: TypeKey,
}

impl fmt::Display for DuplicateRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key {:?} has already been registered", self.key)?;
        write!(f, "\n  Existing: {}", self.existing)?;
        write!(f, "\n  Rejected: {}", self.attempted)?;
        write!(f, "\n  Hint: Register the second implementation under a different key")
    }
}

/// Resolution by contract matched more than one entry.
#[derive(Debug)]
pub struct AmbiguousLookupError {
    pub contract: TypeKey,
    /// Matching keys in registration order.
    pub keys: Vec<String>,
}

impl fmt::Display for AmbiguousLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous lookup: {} entries are registered as {}",
            self.keys.len(),
            self.contract
        )?;
        for key in &self.keys {
            write!(f, "\n    - {key:?}")?;
        }
        write!(
            f,
            "\n  Hint: Resolve by key, or set the ambiguity policy to first_registered / last_registered"
        )
    }
}

/// A constructor parameter could not be resolved.
#[derive(Debug)]
pub struct UnresolvedDependencyError {
    /// The parameter type that has no registration.
    pub requested: TypeKey,
    /// The concrete type whose constructor declared it.
    pub required_by: TypeKey,
    /// Types under construction, outermost first.
    pub path: Vec<TypeKey>,
    /// Registered contracts with similar names.
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnresolvedDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency not registered: {}", self.requested)?;
        write!(f, "\n  Required by: {}", self.required_by)?;

        if self.path.len() > 1 {
            let names: Vec<&str> = self.path.iter().map(|k| k.type_name()).collect();
            write!(f, "\n  While resolving: {}", render_path(&names))?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: Register {} or take it as Option<Arc<_>> with the missing-dependency policy set to empty",
            self.requested.short_name()
        )
    }
}

/// The concrete type has an empty constructor table.
#[derive(Debug)]
pub struct NoConstructorError {
    pub concrete: TypeKey,
    pub path: Vec<TypeKey>,
}

impl fmt::Display for NoConstructorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No constructor available for {}", self.concrete)?;
        if self.path.len() > 1 {
            let names: Vec<&str> = self.path.iter().map(|k| k.type_name()).collect();
            write!(f, "\n  While resolving: {}", render_path(&names))?;
        }
        write!(f, "\n  Hint: Injectable::constructors() must return at least one constructor")
    }
}

/// Arguments were consumed out of step with the declared parameters.
#[derive(Debug)]
pub struct ArgumentMismatchError {
    pub owner: TypeKey,
    /// Zero-based argument index.
    pub position: usize,
    /// Type the constructor asked for.
    pub requested: TypeKey,
    /// Type declared at that position, `None` past the last parameter.
    pub declared: Option<TypeKey>,
}

impl fmt::Display for ArgumentMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared {
            Some(declared) => write!(
                f,
                "Argument #{} of {} is declared as {} but was taken as {}",
                self.position, self.owner, declared, self.requested
            )?,
            None => write!(
                f,
                "Constructor of {} took argument #{} ({}) but declared only {} parameter(s)",
                self.owner, self.position, self.requested, self.position
            )?,
        }
        write!(f, "\n  Hint: Take arguments in the order the parameter list declares them")
    }
}

/// Convenient Result type for Wiring operations.
pub type Result<T> = std::result::Result<T, WiringError>;
