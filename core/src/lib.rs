//! Core types for signature-driven command-line tools.
//!
//! This crate models the command surface derived from a set of operations:
//!
//! - [`Operation`]: a named handler with an ordered parameter list.
//! - [`Parameter`]: positional when it has no default, a `--flag` otherwise.
//! - [`Deferred`]: defaults resolved at invocation time: interactive prompt,
//!   environment variable or prompt, or a restricted [`Choice`].
//! - [`Registry`]: explicit operation registration; only identifiers with
//!   the [`OPERATION_PREFIX`] become subcommands.
//! - [`CompletionMap`]: subcommand/flag/choice structure for shell completion.
//! - [`AppConfig`]: presentation settings, loadable from YAML.
//!
//! Validation ([`validate_registry`]) catches reserved-name collisions and
//! malformed or duplicate names before any parsing happens.
//!
//! # Example
//!
//! ```
//! use fncli_core::*;
//!
//! let registry = Registry::new().with_operation(
//!     Operation::new("function_deploy", |args| {
//!         println!("deploying {} to {}", args.value("target")?, args.value("env")?);
//!         Ok(())
//!     })
//!     .with_doc("Deploys the service.")
//!     .with_param(Parameter::positional("target"))
//!     .with_param(Parameter::choice("env", Choice::new(["dev", "prod"]).unwrap()))
//!     .with_param(Parameter::env_or_ask("token", true)),
//! );
//!
//! assert_eq!(registry.names(), vec!["deploy"]);
//! assert!(validate_registry(&registry, &["complete", "list"]).is_empty());
//! assert!(build_completion_map(&registry).get("deploy", "--env").is_some());
//! ```

mod completion;
mod config;
mod deferred;
mod error;
mod registry;
mod types;
mod validate;

pub use completion::{CompletionMap, FlagValues, build_completion_map};
pub use config::{AppConfig, BuiltinCommand, CompletionShell};
pub use deferred::{Choice, Deferred, env_var_name};
pub use error::{ArgumentError, ConfigError};
pub use registry::{OPERATION_PREFIX, Registry};
pub use types::*;
pub use validate::{ValidationError, validate_registry};
