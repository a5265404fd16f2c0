//! Error types for container operations.
//!
//! Every failure carries the identifier involved and, where it helps,
//! hints about what to register.

use std::fmt;

use block_support::rendering::{render_chain, shorten_type_name};

use crate::identifier::Identifier;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// `get` was called for an identifier the container does not have.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// Malformed identifier, or a provider that cannot be registered.
    #[error("{}", .0)]
    InvalidArgument(InvalidArgumentError),

    /// A required parameter names an identifier that is not registered.
    #[error("{}", .0)]
    UnknownParameter(UnknownParameterError),

    /// The resolved instance is not of the requested Rust type.
    #[error("Type mismatch for {identifier}: expected {expected}")]
    TypeMismatch {
        identifier: Identifier,
        expected: &'static str,
    },

    /// An identifier was requested while it was already being resolved.
    ///
    /// Only raised when cycle detection is enabled in the settings.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A resolving factory returned an error of its own.
    #[error("Failed to construct {identifier}: {source}")]
    ConstructionFailed {
        identifier: Identifier,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The three failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing is registered under the identifier.
    NotFound,
    /// The caller passed something unusable.
    InvalidArgument,
    /// Resolution started but could not finish.
    Runtime,
}

impl BlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockError::NotFound(_) => ErrorKind::NotFound,
            BlockError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BlockError::UnknownParameter(_)
            | BlockError::TypeMismatch { .. }
            | BlockError::CircularDependency(_)
            | BlockError::ConstructionFailed { .. } => ErrorKind::Runtime,
        }
    }

    pub(crate) fn invalid_identifier(identifier: &str) -> Self {
        BlockError::InvalidArgument(InvalidArgumentError {
            message: format!("dependency identifier {identifier:?} is not well formed"),
        })
    }

    pub(crate) fn invalid_provider(name: &str) -> Self {
        BlockError::InvalidArgument(InvalidArgumentError {
            message: format!("invalid service provider: {name}"),
        })
    }
}

/// Error when an identifier has no registration.
#[derive(Debug)]
pub struct NotFoundError {
    /// The identifier that was requested
    pub requested: Identifier,
    /// The identifier whose construction needed it (if any)
    pub required_by: Option<Identifier>,
    /// Registered identifiers that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency [{}] can not be found", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct InvalidArgumentError {
    pub message: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Error when auto-wiring meets a required parameter it cannot satisfy.
#[derive(Debug)]
pub struct UnknownParameterError {
    /// Declared name of the parameter
    pub parameter: &'static str,
    /// Identifier the parameter would be resolved from
    pub identifier: Identifier,
    /// Identifier being built when the parameter was hit
    pub consumer: Identifier,
}

impl fmt::Display for UnknownParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown param [{}] of {}: nothing registered for {}",
            self.parameter, self.consumer, self.identifier,
        )?;
        write!(
            f,
            "\n  Hint: register {} or declare the parameter as Option<Arc<{}>>",
            self.identifier,
            shorten_type_name(self.identifier.as_str()),
        )
    }
}

/// Error when an identifier is re-entered during its own resolution.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The resolution chain, ending with the repeated identifier.
    pub chain: Vec<Identifier>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, BlockError>;
