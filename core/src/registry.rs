//! Operation registry.
//!
//! Operations are registered explicitly. Only identifiers starting with
//! [`OPERATION_PREFIX`] are exposed as subcommands; anything else is kept as a
//! helper and never reaches the command surface. Exposed operations are
//! ordered by identifier.
//!
//! # Examples
//!
//! ```
//! use fncli_core::{Operation, Parameter, Registry};
//!
//! let registry = Registry::new()
//!     .with_operation(Operation::new("function_stop", |_| Ok(())))
//!     .with_operation(Operation::new("function_start", |_| Ok(())))
//!     .with_operation(Operation::new("banner", |_| Ok(())));
//!
//! assert_eq!(registry.names(), vec!["start", "stop"]);
//! assert!(registry.find("banner").is_none());
//! ```

use tracing::debug;

use crate::types::Operation;

/// Identifier prefix marking an operation as a subcommand.
pub const OPERATION_PREFIX: &str = "function_";

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Operation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation, builder style.
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.register(op);
        self
    }

    /// Adds an operation. Duplicates are reported by
    /// [`validate_registry`](crate::validate_registry), not here.
    pub fn register(&mut self, op: Operation) {
        if op.qualifies() {
            debug!(
                identifier = %op.identifier,
                parameters = op.parameters.len(),
                "registered operation"
            );
        } else {
            debug!(identifier = %op.identifier, "registered helper without operation prefix");
        }
        let at = self
            .entries
            .partition_point(|existing| existing.identifier <= op.identifier);
        self.entries.insert(at, op);
    }

    /// Exposed operations, ordered by identifier.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter().filter(|op| op.qualifies())
    }

    /// Finds an exposed operation by subcommand name.
    pub fn find(&self, subcommand: &str) -> Option<&Operation> {
        self.operations().find(|op| op.name() == subcommand)
    }

    /// Subcommand names of the exposed operations.
    pub fn names(&self) -> Vec<&str> {
        self.operations().map(Operation::name).collect()
    }

    pub fn len(&self) -> usize {
        self.operations().count()
    }

    pub fn is_empty(&self) -> bool {
        self.operations().next().is_none()
    }
}
