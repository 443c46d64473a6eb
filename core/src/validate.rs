//! Registry validation.
//!
//! Catches problems that would make the generated command surface ambiguous
//! or unparseable: empty or malformed names, collisions with reserved
//! built-in subcommands, and duplicate operations or parameters. Every problem
//! is reported, not only the first.
//!
//! # Examples
//!
//! ```
//! use fncli_core::*;
//!
//! let registry = Registry::new().with_operation(Operation::new("function_deploy", |_| Ok(())));
//! assert!(validate_registry(&registry, &["complete"]).is_empty());
//!
//! // Invalid: collides with the reserved `complete` subcommand
//! let registry = Registry::new().with_operation(Operation::new("function_complete", |_| Ok(())));
//! assert_eq!(
//!     validate_registry(&registry, &["complete"]),
//!     vec![ValidationError::ReservedName("complete".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Parameter, Registry};

/// Parameter names that clash with generated flags.
const RESERVED_PARAMETERS: &[&str] = &["help"];

/// Registry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is the bare operation prefix.
    #[error("operation name cannot be empty: {0}")]
    EmptyOperationName(String),
    /// Subcommand name contains whitespace or starts with a dash.
    #[error("invalid operation name: {0}")]
    InvalidOperationName(String),
    /// Operation collides with a reserved built-in subcommand.
    #[error("operation name is reserved for a built-in subcommand: {0}")]
    ReservedName(String),
    /// Two operations share a subcommand name.
    #[error("duplicate operation: {0}")]
    DuplicateOperation(String),
    /// Parameter name is empty, starts with a dash, or contains whitespace.
    #[error("invalid parameter name in {operation}: '{parameter}'")]
    InvalidParameterName { operation: String, parameter: String },
    /// Parameter name clashes with a generated flag.
    #[error("parameter name is reserved in {operation}: {parameter}")]
    ReservedParameter { operation: String, parameter: String },
    /// Two parameters of one operation share a name.
    #[error("duplicate parameter in {operation}: {parameter}")]
    DuplicateParameter { operation: String, parameter: String },
}

/// Validates every exposed operation of `registry` against the `reserved`
/// built-in subcommand names. Returns every problem found, in registry order.
pub fn validate_registry(registry: &Registry, reserved: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for op in registry.operations() {
        let name = op.name();
        if name.is_empty() {
            errors.push(ValidationError::EmptyOperationName(op.identifier.clone()));
        } else if !is_valid_name(name) {
            errors.push(ValidationError::InvalidOperationName(name.to_string()));
        } else if reserved.contains(&name) {
            errors.push(ValidationError::ReservedName(name.to_string()));
        } else if !seen.insert(name) {
            errors.push(ValidationError::DuplicateOperation(name.to_string()));
        }

        errors.extend(validate_parameters(name, &op.parameters));
    }

    errors
}

fn validate_parameters(operation: &str, parameters: &[Parameter]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for param in parameters {
        let parameter = param.name.as_str();
        let error = if parameter.is_empty() || !is_valid_name(parameter) {
            ValidationError::InvalidParameterName {
                operation: operation.to_string(),
                parameter: parameter.to_string(),
            }
        } else if RESERVED_PARAMETERS.contains(&parameter) {
            ValidationError::ReservedParameter {
                operation: operation.to_string(),
                parameter: parameter.to_string(),
            }
        } else if !seen.insert(parameter) {
            ValidationError::DuplicateParameter {
                operation: operation.to_string(),
                parameter: parameter.to_string(),
            }
        } else {
            continue;
        };
        errors.push(error);
    }

    errors
}

fn is_valid_name(name: &str) -> bool {
    !name.starts_with('-') && !name.chars().any(char::is_whitespace)
}
