//! Unified error types for tmplkit.
//!
//! ## Error Hierarchy
//!
//! ```text
//! TmplError (top-level wrapper)
//! ├── RegistrationError - configuration errors, fatal at registration/build time
//! ├── InvokeError       - per-call errors surfaced by the frozen table
//! └── NativeError       - errors raised inside a callable
//!     └── ConversionError - argument extraction failures
//! ```
//!
//! Registration errors abort startup. Native errors are recovered by the
//! safe invocation layer and either surfaced as [`InvokeError::Failed`]
//! (strict callables) or discarded (legacy callables).

use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors that can occur when extracting a typed value from a [`Dynamic`](crate::Dynamic).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer overflow during conversion
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Generic conversion failure
    #[error("conversion failed: {message}")]
    Failed { message: String },
}

impl ConversionError {
    /// Create a generic conversion failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ConversionError::Failed {
            message: message.into(),
        }
    }
}

// ============================================================================
// Native Errors
// ============================================================================

/// Errors that can occur while a registered callable executes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Error converting an argument
    #[error("argument {index}: {source}")]
    Conversion {
        index: usize,
        #[source]
        source: ConversionError,
    },

    /// Argument index out of bounds
    #[error("argument index {index} out of bounds (called with {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// Wrong number of arguments
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityMismatch { expected: String, got: usize },

    /// Callable panicked
    #[error("callable panicked: {message}")]
    Panic { message: String },

    /// Generic native error
    #[error("{message}")]
    Other { message: String },
}

impl NativeError {
    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }

    /// Create an arity error.
    pub fn arity(expected: impl Into<String>, got: usize) -> Self {
        NativeError::ArityMismatch {
            expected: expected.into(),
            got,
        }
    }

    /// Check if this error came from a recovered panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, NativeError::Panic { .. })
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Configuration errors detected while registries are added or the table is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// Two registries identified themselves with the same uid.
    #[error("duplicate registry: '{uid}' is already registered")]
    DuplicateRegistry { uid: String },

    /// A function name was contributed twice.
    #[error("registry '{registry}': function '{name}' is already registered by '{existing}'")]
    DuplicateFunction {
        /// The function name that collided.
        name: String,
        /// Registry attempting the registration.
        registry: String,
        /// Registry that owns the existing binding.
        existing: String,
    },

    /// An alias points at a name that is not in the table.
    #[error("registry '{registry}': alias '{alias}' targets unknown function '{canonical}'")]
    UnknownAliasTarget {
        registry: String,
        canonical: String,
        alias: String,
    },

    /// A notice is attached to a name that is not in the table.
    #[error("registry '{registry}': notice targets unknown function '{subject}'")]
    UnknownNoticeSubject { registry: String, subject: String },

    /// A registry refused its handler link.
    #[error("registry '{registry}' failed to link: {message}")]
    Link { registry: String, message: String },

    /// The handler was already built.
    #[error("handler is already built - the function table is frozen")]
    AlreadyBuilt,
}

impl RegistrationError {
    /// Name of the registry that caused the error, if any.
    pub fn registry(&self) -> Option<&str> {
        match self {
            RegistrationError::DuplicateRegistry { uid } => Some(uid),
            RegistrationError::DuplicateFunction { registry, .. }
            | RegistrationError::UnknownAliasTarget { registry, .. }
            | RegistrationError::UnknownNoticeSubject { registry, .. }
            | RegistrationError::Link { registry, .. } => Some(registry),
            RegistrationError::AlreadyBuilt => None,
        }
    }
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors returned to the template engine when it calls into the table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// No callable is bound to this name.
    #[error("function '{name}' not found")]
    NotFound { name: String },

    /// A strict callable failed.
    #[error("error calling {name}: {source}")]
    Failed {
        name: String,
        #[source]
        source: NativeError,
    },
}

impl InvokeError {
    /// The name the engine invoked.
    pub fn name(&self) -> &str {
        match self {
            InvokeError::NotFound { name } | InvokeError::Failed { name, .. } => name,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for all tmplkit operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TmplError {
    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// An invocation error.
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// A native error.
    #[error(transparent)]
    Native(#[from] NativeError),
}

impl TmplError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, TmplError::Registration(_))
    }

    /// Check if this is an invocation error.
    pub fn is_invoke(&self) -> bool {
        matches!(self, TmplError::Invoke(_))
    }

    /// Check if this is a native error.
    pub fn is_native(&self) -> bool {
        matches!(self, TmplError::Native(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_type_mismatch() {
        let err = ConversionError::TypeMismatch {
            expected: "map",
            actual: "int",
        };
        assert!(err.to_string().contains("type mismatch"));
        assert!(err.to_string().contains("map"));
        assert!(err.to_string().contains("int"));
    }

    #[test]
    fn native_error_wraps_conversion_with_index() {
        let err = NativeError::Conversion {
            index: 1,
            source: ConversionError::TypeMismatch {
                expected: "map",
                actual: "int",
            },
        };
        assert_eq!(err.to_string(), "argument 1: type mismatch: expected map, got int");
    }

    #[test]
    fn duplicate_function_names_both_registries() {
        let err = RegistrationError::DuplicateFunction {
            name: "upper".into(),
            registry: "shouty".into(),
            existing: "strings".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("upper"));
        assert!(msg.contains("shouty"));
        assert!(msg.contains("strings"));
        assert_eq!(err.registry(), Some("shouty"));
    }

    #[test]
    fn invoke_error_name() {
        let err = InvokeError::Failed {
            name: "mustGet".into(),
            source: NativeError::other("boom"),
        };
        assert_eq!(err.name(), "mustGet");
        assert_eq!(err.to_string(), "error calling mustGet: boom");
    }

    #[test]
    fn unified_error_predicates() {
        let err: TmplError = RegistrationError::AlreadyBuilt.into();
        assert!(err.is_registration());
        assert!(!err.is_invoke());

        let err: TmplError = InvokeError::NotFound { name: "x".into() }.into();
        assert!(err.is_invoke());

        let err: TmplError = NativeError::other("x").into();
        assert!(err.is_native());
    }
}
