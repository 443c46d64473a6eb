//! Deferred value resolution.
//!
//! After parsing, every parameter the user did not supply is filled in:
//! literals directly, [`Deferred`] descriptors through the [`Environment`] and
//! [`Prompt`] capabilities. Parameters are resolved one at a time, in
//! declaration order.

use std::collections::{BTreeMap, HashMap};

use fncli_core::{DefaultValue, Deferred, Operation, Parameter, ResolvedArguments, env_var_name};
use thiserror::Error;
use tracing::debug;

/// Read access to the process environment.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Interactive line input.
pub trait Prompt {
    /// Displays `label` and reads one line. Input is not echoed when
    /// `secret` is set.
    fn read_value(&mut self, label: &str, secret: bool) -> Result<String, PromptError>;
}

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted the prompt.
    #[error("prompt interrupted")]
    Interrupted,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The user aborted a prompt; not a failure.
    #[error("interrupted by user")]
    Interrupted,
    #[error("could not read value for {name}: {source}")]
    Prompt {
        name: String,
        source: std::io::Error,
    },
    #[error("missing required argument: {0}")]
    MissingPositional(String),
}

/// [`Environment`] backed by `std::env`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// [`Environment`] backed by a fixed map.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Produces the final argument set for `op`.
///
/// `supplied` holds the values given on the command line; everything else
/// comes from the parameter's default.
pub fn resolve_arguments(
    op: &Operation,
    mut supplied: BTreeMap<String, String>,
    program: &str,
    env: &dyn Environment,
    prompt: &mut dyn Prompt,
) -> Result<ResolvedArguments, ResolveError> {
    let mut resolved = ResolvedArguments::new();
    for param in &op.parameters {
        let value = match supplied.remove(&param.name) {
            Some(value) => value,
            None => resolve_default(param, program, env, prompt)?,
        };
        resolved.insert(param.name.clone(), value);
    }
    Ok(resolved)
}

fn resolve_default(
    param: &Parameter,
    program: &str,
    env: &dyn Environment,
    prompt: &mut dyn Prompt,
) -> Result<String, ResolveError> {
    match &param.default {
        None => Err(ResolveError::MissingPositional(param.name.clone())),
        Some(DefaultValue::Literal(value)) => Ok(value.clone()),
        Some(DefaultValue::Deferred(deferred)) => resolve_deferred(param, deferred, program, env, prompt),
    }
}

fn resolve_deferred(
    param: &Parameter,
    deferred: &Deferred,
    program: &str,
    env: &dyn Environment,
    prompt: &mut dyn Prompt,
) -> Result<String, ResolveError> {
    match deferred {
        Deferred::Ask { secret } => ask(param, *secret, prompt),
        Deferred::EnvOrAsk { secret } => {
            let key = env_var_name(program, &param.name);
            match env.var(&key) {
                Some(value) => {
                    debug!(parameter = %param.name, variable = %key, "resolved from environment");
                    Ok(value)
                }
                None => ask(param, *secret, prompt),
            }
        }
        Deferred::Choice(choice) => Ok(choice.first().to_string()),
    }
}

fn ask(param: &Parameter, secret: bool, prompt: &mut dyn Prompt) -> Result<String, ResolveError> {
    debug!(parameter = %param.name, secret, "prompting");
    let label = format!("Value for {}: ", param.name);
    prompt
        .read_value(&label, secret)
        .map_err(|err| match err {
            PromptError::Interrupted => ResolveError::Interrupted,
            PromptError::Io(source) => ResolveError::Prompt {
                name: param.name.clone(),
                source,
            },
        })
}
