//! Invocation parsing and dispatch.
//!
//! One invocation runs `Start -> Parsed -> Resolved -> Dispatched` and ends in
//! an [`Exit`]. Parse errors end the run before any operation executes; an
//! interrupted prompt ends it cleanly; operation errors are reported once at
//! this boundary.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::ArgMatches;
use clap::error::ErrorKind;
use fncli_core::{
    AppConfig, BuiltinCommand, CompletionMap, ConfigError, Operation, Registry,
    build_completion_map, validate_registry,
};
use tracing::{debug, info};

use crate::grammar::build_command;
use crate::render::renderer_for;
use crate::resolve::{Environment, ProcessEnvironment, Prompt, ResolveError, resolve_arguments};
use crate::terminal::{INTERRUPT_NOTICE, TerminalPrompt};

/// Outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The operation or built-in completed, or help was requested.
    Success,
    /// The user interrupted a prompt.
    Aborted,
    /// Parsing or the operation failed.
    Failed,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success | Exit::Aborted => 0,
            Exit::Failed => 1,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Collaborators used by one invocation.
pub struct Session<'a> {
    pub env: &'a dyn Environment,
    pub prompt: &'a mut dyn Prompt,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

/// A validated command surface ready to dispatch invocations.
///
/// # Examples
///
/// ```
/// use fncli_core::{AppConfig, Operation, Parameter, Registry};
/// use fncli_engine::{App, Exit, MapEnvironment, Session, TerminalPrompt};
///
/// let registry = Registry::new().with_operation(
///     Operation::new("function_echo", |args| {
///         println!("{}", args.value("text")?);
///         Ok(())
///     })
///     .with_param(Parameter::positional("text")),
/// );
/// let app = App::new(AppConfig::default(), registry).unwrap().with_program("demo");
///
/// let env = MapEnvironment::new();
/// let mut prompt = TerminalPrompt::new();
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let mut session = Session { env: &env, prompt: &mut prompt, out: &mut out, err: &mut err };
///
/// assert_eq!(app.parse_and_dispatch(["demo", "echo", "hi"], &mut session), Exit::Success);
/// assert_eq!(app.parse_and_dispatch(["demo", "nosuchcommand"], &mut session), Exit::Failed);
/// ```
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    registry: Registry,
    program: String,
}

impl App {
    /// Validates `registry` against the enabled built-ins.
    ///
    /// The program name comes from [`AppConfig::program_name`] or the base
    /// name of the invocation path.
    pub fn new(config: AppConfig, registry: Registry) -> Result<Self, ConfigError> {
        if config.builtins.is_empty() {
            return Err(ConfigError::NoBuiltins);
        }
        if let Some(error) = validate_registry(&registry, &config.reserved_names())
            .into_iter()
            .next()
        {
            return Err(error.into());
        }

        let argv0 = std::env::args().next().unwrap_or_default();
        let program = config.program_name(&argv0);
        debug!(program = %program, operations = registry.len(), "application ready");
        Ok(Self {
            config,
            registry,
            program,
        })
    }

    /// Overrides the program name used for help, environment variables and
    /// completion output.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn command(&self, env: &dyn Environment) -> clap::Command {
        build_command(&self.config, &self.registry, &self.program, env)
    }

    pub fn completion_map(&self) -> CompletionMap {
        build_completion_map(&self.registry)
    }

    /// Completion script for the configured shell.
    pub fn render_completion(&self) -> String {
        renderer_for(self.config.completion_shell).render(&self.program, &self.completion_map())
    }

    /// Parses `raw_args` (invocation path first), resolves deferred values
    /// and runs the selected subcommand.
    pub fn parse_and_dispatch<I, T>(&self, raw_args: I, session: &mut Session<'_>) -> Exit
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command(session.env).try_get_matches_from(raw_args) {
            Ok(matches) => matches,
            Err(err) => return report_parse_error(&err, session),
        };
        let Some((name, sub)) = matches.subcommand() else {
            // subcommand_required makes this unreachable through clap.
            let _ = writeln!(session.err, "error: no subcommand given");
            return Exit::Failed;
        };

        if let Some(builtin) = BuiltinCommand::from_name(name)
            .filter(|builtin| self.config.is_builtin_enabled(*builtin))
        {
            return self.run_builtin(builtin, session);
        }

        let Some(op) = self.registry.find(name) else {
            let _ = writeln!(session.err, "error: unknown subcommand '{name}'");
            return Exit::Failed;
        };

        let supplied = supplied_values(op, sub);
        let args = match resolve_arguments(op, supplied, &self.program, session.env, session.prompt) {
            Ok(args) => args,
            Err(ResolveError::Interrupted) => {
                let _ = writeln!(session.out);
                let _ = writeln!(session.out, "{INTERRUPT_NOTICE}");
                return Exit::Aborted;
            }
            Err(err) => {
                let _ = writeln!(session.err, "error: {err}");
                return Exit::Failed;
            }
        };

        info!(operation = %op.identifier, "dispatching");
        match op.invoke(&args) {
            Ok(()) => Exit::Success,
            Err(err) => {
                let _ = io::stdout().flush();
                let _ = session.out.flush();
                let _ = writeln!(session.err, "error: {err:#}");
                debug!(operation = %op.identifier, "operation failed");
                Exit::Failed
            }
        }
    }

    /// Runs one invocation against the real process: `std::env::args_os`,
    /// the process environment and the terminal.
    ///
    /// The standard streams are locked per write, never for the whole
    /// invocation, so the interrupt handler can always reach them.
    pub fn run(&self) -> Exit {
        let env = ProcessEnvironment;
        let mut prompt = TerminalPrompt::new();
        let mut out = io::stdout();
        let mut err = io::stderr();
        let mut session = Session {
            env: &env,
            prompt: &mut prompt,
            out: &mut out,
            err: &mut err,
        };
        self.parse_and_dispatch(std::env::args_os(), &mut session)
    }

    fn run_builtin(&self, builtin: BuiltinCommand, session: &mut Session<'_>) -> Exit {
        debug!(builtin = builtin.name(), "running built-in");
        let written = match builtin {
            BuiltinCommand::Complete => write!(session.out, "{}", self.render_completion()),
            BuiltinCommand::List => self
                .registry
                .names()
                .into_iter()
                .try_for_each(|name| writeln!(session.out, "{name}")),
        };
        match written.and_then(|()| session.out.flush()) {
            Ok(()) => Exit::Success,
            Err(err) => {
                let _ = writeln!(session.err, "error: {err}");
                Exit::Failed
            }
        }
    }
}

fn report_parse_error(err: &clap::Error, session: &mut Session<'_>) -> Exit {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(session.out, "{}", err.render());
            Exit::Success
        }
        _ => {
            let _ = write!(session.err, "{}", err.render());
            Exit::Failed
        }
    }
}

/// Values the user typed, keyed by parameter name.
fn supplied_values(op: &Operation, matches: &ArgMatches) -> BTreeMap<String, String> {
    op.parameters
        .iter()
        .filter_map(|param| {
            let value = matches.try_get_one::<String>(&param.name).ok().flatten()?;
            Some((param.name.clone(), value.clone()))
        })
        .collect()
}
