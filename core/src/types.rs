//! Operation and parameter definitions.
//!
//! An [`Operation`] is a named handler plus its ordered [`Parameter`] list.
//! Parameters without a default become required positionals; parameters with
//! a [`DefaultValue`] become optional `--flags`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::deferred::{Choice, Deferred};
use crate::error::ArgumentError;
use crate::registry::OPERATION_PREFIX;

/// Default attached to an optional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Used verbatim when the flag is omitted.
    Literal(String),
    /// Resolved at invocation time when the flag is omitted.
    Deferred(Deferred),
}

/// One named input of an [`Operation`].
///
/// # Examples
///
/// ```
/// use fncli_core::{Choice, Parameter};
///
/// let host = Parameter::positional("host");
/// assert!(host.is_positional());
///
/// let port = Parameter::literal("port", "22").with_help("SSH port");
/// assert!(!port.is_positional());
///
/// let env = Parameter::choice("env", Choice::new(["dev", "prod"]).unwrap());
/// assert!(env.choices().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Name used for the positional value name or the `--flag`.
    pub name: String,
    /// `None` means the parameter is positional and required.
    pub default: Option<DefaultValue>,
    /// Help text shown next to the flag.
    pub help: Option<String>,
    /// Suppress the default annotation in help output.
    pub hide_default: bool,
}

impl Parameter {
    /// A required positional parameter.
    pub fn positional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default: None,
            help: None,
            hide_default: false,
        }
    }

    /// An optional flag with a literal default.
    pub fn literal(name: &str, value: impl Into<String>) -> Self {
        Self::with_default(name, DefaultValue::Literal(value.into()))
    }

    /// An optional flag that prompts when omitted.
    pub fn ask(name: &str, secret: bool) -> Self {
        Self::with_default(name, DefaultValue::Deferred(Deferred::Ask { secret }))
    }

    /// An optional flag read from `<PROGRAM>_<NAME>` or prompted when omitted.
    pub fn env_or_ask(name: &str, secret: bool) -> Self {
        Self::with_default(name, DefaultValue::Deferred(Deferred::EnvOrAsk { secret }))
    }

    /// An optional flag restricted to `choice`.
    pub fn choice(name: &str, choice: Choice) -> Self {
        Self::with_default(name, DefaultValue::Deferred(Deferred::Choice(choice)))
    }

    pub fn with_default(name: &str, default: DefaultValue) -> Self {
        Self {
            name: name.to_string(),
            default: Some(default),
            help: None,
            hide_default: false,
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Marks the default as suppressed in help output.
    pub fn hide_default(mut self) -> Self {
        self.hide_default = true;
        self
    }

    pub fn is_positional(&self) -> bool {
        self.default.is_none()
    }

    /// The deferred descriptor, if the default is one.
    pub fn deferred(&self) -> Option<&Deferred> {
        match &self.default {
            Some(DefaultValue::Deferred(deferred)) => Some(deferred),
            _ => None,
        }
    }

    /// The accepted values, if the default is a [`Choice`].
    pub fn choices(&self) -> Option<&Choice> {
        match self.deferred() {
            Some(Deferred::Choice(choice)) => Some(choice),
            _ => None,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.deferred().is_some_and(Deferred::is_secret)
    }
}

/// Handler invoked with the fully resolved arguments.
pub type Handler = Box<dyn Fn(&ResolvedArguments) -> anyhow::Result<()>>;

/// A callable unit of work exposed as a subcommand.
///
/// # Examples
///
/// ```
/// use fncli_core::{Operation, Parameter};
///
/// let op = Operation::new("function_greet", |args| {
///     println!("Hello, {}!", args.value("name")?);
///     Ok(())
/// })
/// .with_doc("Greets someone.\n\nPrints a single line.")
/// .with_param(Parameter::positional("name"));
///
/// assert_eq!(op.name(), "greet");
/// assert_eq!(op.documentation().as_deref(), Some("Greets someone."));
/// ```
pub struct Operation {
    /// Registered identifier, including the [`OPERATION_PREFIX`].
    pub identifier: String,
    /// Raw description text.
    pub description: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    handler: Handler,
}

impl Operation {
    pub fn new<F>(identifier: &str, handler: F) -> Self
    where
        F: Fn(&ResolvedArguments) -> anyhow::Result<()> + 'static,
    {
        Self {
            identifier: identifier.to_string(),
            description: None,
            parameters: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn with_doc(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Subcommand name: the identifier with the reserved prefix stripped.
    pub fn name(&self) -> &str {
        self.identifier
            .strip_prefix(OPERATION_PREFIX)
            .unwrap_or(&self.identifier)
    }

    /// Whether the identifier carries the reserved prefix.
    pub fn qualifies(&self) -> bool {
        self.identifier.starts_with(OPERATION_PREFIX)
    }

    /// Leading paragraph of the description, on one line.
    pub fn documentation(&self) -> Option<String> {
        self.description.as_deref().and_then(summarize)
    }

    pub fn find_param(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn positionals(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_positional())
    }

    pub fn flags(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| !p.is_positional())
    }

    pub fn invoke(&self, args: &ResolvedArguments) -> anyhow::Result<()> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("identifier", &self.identifier)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

fn summarize(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Concrete argument values handed to an operation.
///
/// Every declared parameter has an entry once resolution finishes.
///
/// # Examples
///
/// ```
/// use fncli_core::ResolvedArguments;
///
/// let mut args = ResolvedArguments::new();
/// args.insert("count", "3");
/// assert_eq!(args.get("count"), Some("3"));
/// assert_eq!(args.parse::<u32>("count").unwrap(), 3);
/// assert!(args.value("missing").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArguments {
    values: BTreeMap<String, String>,
}

impl ResolvedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), but a missing entry is an error.
    pub fn value(&self, name: &str) -> Result<&str, ArgumentError> {
        self.get(name)
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))
    }

    /// Parses the named value with [`FromStr`].
    pub fn parse<T>(&self, name: &str) -> Result<T, ArgumentError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.value(name)?;
        raw.parse().map_err(|err: T::Err| ArgumentError::Invalid {
            name: name.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
