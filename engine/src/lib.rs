//! Runtime for signature-driven command-line tools.
//!
//! Given an [`AppConfig`] and a [`Registry`], this crate builds the command
//! grammar, parses an invocation, resolves deferred defaults and runs the
//! selected operation:
//!
//! - [`grammar`]: registry to `clap::Command`, including default placeholders
//!   in help text.
//! - [`resolve`]: fills in every argument the user did not supply, through the
//!   [`Environment`] and [`Prompt`] capabilities.
//! - [`render`]: completion scripts from a [`CompletionMap`](fncli_core::CompletionMap).
//! - [`dispatch`]: one invocation end to end, mapped to an [`Exit`].
//!
//! Most binaries only need [`run`]:
//!
//! ```no_run
//! use fncli_core::{AppConfig, Operation, Parameter, Registry};
//!
//! fn main() -> std::process::ExitCode {
//!     let registry = Registry::new().with_operation(
//!         Operation::new("function_greet", |args| {
//!             println!("Hello, {}!", args.value("name")?);
//!             Ok(())
//!         })
//!         .with_param(Parameter::positional("name")),
//!     );
//!     fncli_engine::run(AppConfig::default(), registry)
//! }
//! ```

pub mod dispatch;
pub mod grammar;
pub mod render;
pub mod resolve;
pub mod terminal;

use std::process::ExitCode;

use fncli_core::{AppConfig, Registry};

pub use dispatch::{App, Exit, Session};
pub use render::{BashCompletion, CompletionRenderer, FishCompletion, renderer_for};
pub use resolve::{
    Environment, MapEnvironment, ProcessEnvironment, Prompt, PromptError, ResolveError,
    resolve_arguments,
};
pub use terminal::{INTERRUPT_NOTICE, TerminalPrompt};

/// Validates the registry and runs one invocation against the current
/// process. A configuration error is reported on stderr with status 1.
pub fn run(config: AppConfig, registry: Registry) -> ExitCode {
    match App::new(config, registry) {
        Ok(app) => app.run().into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
