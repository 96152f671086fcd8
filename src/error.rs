//! Error types for container resolution

use crate::Specifier;
use thiserror::Error;

/// Errors that can occur during registration, lookup, or injection
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    /// No resolver in the chain (nor any configured fallback) could supply
    /// the requested specifier
    #[error(
        "No entry found for `{specifier}` (manually registered: [{}]; resolvers consulted: [{}])",
        registered.join(", "),
        resolvers.join(", ")
    )]
    EntryNotFound {
        specifier: Specifier,
        /// Manually registered specifiers that were examined
        registered: Vec<String>,
        /// Names of the resolvers consulted, in precedence order
        resolvers: Vec<String>,
    },

    /// A specifier is flagged `singleton` but its definition is a plain
    /// value, not an instantiable constructor
    #[error(
        "Entry `{specifier}` is flagged singleton but its definition ({type_name}) is not a constructor"
    )]
    EntryNotAConstructor {
        specifier: Specifier,
        type_name: &'static str,
    },

    /// An injected field was read but no container ever filled it
    #[error("Injected field `{specifier}` was never resolved - instances with injections must be constructed through a container")]
    InjectionUnresolved { specifier: Specifier },

    /// The looked-up value is not of the requested type
    #[error("Entry `{specifier}` has type {actual}, expected {expected}")]
    TypeMismatch {
        specifier: Specifier,
        expected: &'static str,
        actual: &'static str,
    },

    /// A raw string could not be parsed as a `"type:name"` specifier
    #[error("Invalid specifier `{raw}`: {reason}")]
    InvalidSpecifier { raw: String, reason: &'static str },

    /// Eager injection recursed back into a specifier already being resolved
    #[error("Circular injection while resolving `{specifier}` (resolution chain: {})", chain.join(" -> "))]
    CircularInjection {
        specifier: Specifier,
        chain: Vec<String>,
    },

    /// `load_bundle` was called a second time
    #[error("A bundle graph has already been loaded into this container")]
    BundleAlreadyLoaded,

    /// Constructor failed to produce an instance
    #[error("Failed to construct `{specifier}`: {reason}")]
    ConstructionFailed {
        specifier: Specifier,
        reason: String,
    },
}

impl ContainerError {
    /// Create an InvalidSpecifier error
    #[inline]
    pub fn invalid_specifier(raw: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidSpecifier {
            raw: raw.into(),
            reason,
        }
    }

    /// Create a TypeMismatch error for an expected type `T`
    #[inline]
    pub fn type_mismatch<T: 'static>(specifier: Specifier, actual: &'static str) -> Self {
        Self::TypeMismatch {
            specifier,
            expected: std::any::type_name::<T>(),
            actual,
        }
    }

    /// Create a ConstructionFailed error
    #[inline]
    pub fn construction_failed(specifier: Specifier, reason: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            specifier,
            reason: reason.into(),
        }
    }
}

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, ContainerError>;
