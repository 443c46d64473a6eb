//! Error types for operation registration and argument access.
//!
//! [`ConfigError`] covers everything that can go wrong before arguments are
//! parsed: malformed descriptors, an invalid registry, and configuration file
//! I/O. [`ArgumentError`] is raised by handlers reading their
//! [`ResolvedArguments`](crate::ResolvedArguments).

use thiserror::Error;

use crate::validate::ValidationError;

/// Errors raised while building the command surface, before any parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A [`Choice`](crate::Choice) was built from an empty list.
    #[error("choices cannot be empty")]
    EmptyChoice,

    /// A [`Choice`](crate::Choice) was built from something other than a list.
    #[error("choices should be a list, found {0}")]
    ChoiceNotAList(String),

    /// The operation registry failed validation.
    #[error("invalid operation registry: {0}")]
    Validation(#[from] ValidationError),

    /// No built-in subcommand is enabled.
    #[error("at least one built-in subcommand (complete or list) must be enabled")]
    NoBuiltins,

    /// Configuration file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised when an operation reads its resolved arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The operation asked for a parameter it never declared.
    #[error("missing argument: {0}")]
    Missing(String),

    /// The value could not be converted to the requested type.
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
