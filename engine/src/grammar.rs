//! Command grammar construction.
//!
//! Turns a [`Registry`] into a [`clap::Command`]: one subcommand per exposed
//! operation plus the enabled built-ins. Parameters without a default become
//! required positionals; parameters with a default become `--name <NAME>`
//! flags whose help text carries the default, or a placeholder describing
//! where a deferred value will come from.
//!
//! Defaults are never handed to clap. A parameter absent from the matches is
//! one the user did not override, and is filled in by
//! [`resolve_arguments`](crate::resolve::resolve_arguments).

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};
use fncli_core::{AppConfig, DefaultValue, Deferred, Operation, Parameter, Registry, env_var_name};
use tracing::debug;

use crate::resolve::Environment;

/// Marker that help text may embed to position the default itself.
pub const DEFAULT_PLACEHOLDER: &str = "{default}";

/// Builds the full command grammar.
pub fn build_command(
    config: &AppConfig,
    registry: &Registry,
    program: &str,
    env: &dyn Environment,
) -> Command {
    let mut command = Command::new(program.to_string())
        .about(config.description.clone())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .term_width(config.width);

    for builtin in &config.builtins {
        command = command.subcommand(Command::new(builtin.name()).about(builtin.about()));
    }

    for op in registry.operations() {
        command = command.subcommand(build_subcommand(op, program, env));
    }

    debug!(
        program,
        operations = registry.len(),
        builtins = config.builtins.len(),
        "built command grammar"
    );
    command
}

fn build_subcommand(op: &Operation, program: &str, env: &dyn Environment) -> Command {
    let mut command = Command::new(op.name().to_string());
    if let Some(doc) = op.documentation() {
        command = command.about(doc);
    }
    for param in &op.parameters {
        command = command.arg(build_arg(param, program, env));
    }
    command
}

fn build_arg(param: &Parameter, program: &str, env: &dyn Environment) -> Arg {
    let value_name = param.name.to_uppercase();
    let arg = Arg::new(param.name.clone())
        .value_name(value_name)
        .action(ArgAction::Set);

    if param.is_positional() {
        let arg = arg.required(true);
        return match &param.help {
            Some(help) => arg.help(help.clone()),
            None => arg,
        };
    }

    let default = placeholder(param, program, env);
    let help = flag_help(param.help.as_deref(), default.as_deref(), param.hide_default);
    let mut arg = arg.long(param.name.clone()).num_args(1).help(help);

    if let Some(choice) = param.choices() {
        arg = arg
            .value_parser(PossibleValuesParser::new(choice.items().to_vec()))
            .hide_possible_values(true);
    }
    arg
}

/// Human-readable description of a parameter's default.
///
/// Secret values are never rendered; an `EnvOrAsk` secret whose variable is
/// set shows only the variable name and a mask.
pub fn placeholder(param: &Parameter, program: &str, env: &dyn Environment) -> Option<String> {
    match param.default.as_ref()? {
        DefaultValue::Literal(value) if value.is_empty() => Some("\"\"".to_string()),
        DefaultValue::Literal(value) => Some(value.clone()),
        DefaultValue::Deferred(Deferred::Ask { secret: false }) => Some("<Interactive>".to_string()),
        DefaultValue::Deferred(Deferred::Ask { secret: true }) => {
            Some("<Interactive, hidden>".to_string())
        }
        DefaultValue::Deferred(Deferred::EnvOrAsk { secret }) => {
            let key = env_var_name(program, &param.name);
            Some(match env.var(&key) {
                Some(_) if *secret => format!("<${key} **********>"),
                Some(value) => format!("<${key} {value}>"),
                None => format!("<${key}> or <Interactive>"),
            })
        }
        DefaultValue::Deferred(Deferred::Choice(choice)) => Some(choice.to_string()),
    }
}

/// Help text of a flag with its default annotation.
///
/// The default is appended as ` [default: ...]` unless it is suppressed or
/// the help text already positions it with [`DEFAULT_PLACEHOLDER`].
pub fn flag_help(help: Option<&str>, default: Option<&str>, hide_default: bool) -> String {
    let help = help.unwrap_or("");
    let Some(default) = default.filter(|_| !hide_default) else {
        return help.replace(DEFAULT_PLACEHOLDER, "");
    };
    if help.contains(DEFAULT_PLACEHOLDER) {
        return help.replace(DEFAULT_PLACEHOLDER, default);
    }
    if help.is_empty() {
        format!("[default: {default}]")
    } else {
        format!("{help} [default: {default}]")
    }
}
