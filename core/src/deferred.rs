//! Deferred value descriptors.
//!
//! A parameter default can be a literal or a rule for obtaining the value at
//! invocation time. The rules live here: [`Deferred::Ask`] always prompts,
//! [`Deferred::EnvOrAsk`] reads an environment variable and prompts only when
//! it is unset, and [`Deferred::Choice`] restricts a flag to a fixed list.
//!
//! # Examples
//!
//! ```
//! use fncli_core::{Choice, ConfigError, env_var_name};
//!
//! let formats = Choice::new(["json", "yaml"]).unwrap();
//! assert!(formats.contains("yaml"));
//! assert_eq!(formats.to_string(), "<Choice: json, yaml>");
//!
//! assert!(matches!(Choice::new(Vec::<String>::new()), Err(ConfigError::EmptyChoice)));
//! assert_eq!(env_var_name("deploy", "token"), "DEPLOY_TOKEN");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// A non-empty, ordered set of accepted values for a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_yaml::Value", into = "Vec<String>")]
pub struct Choice {
    items: Vec<String>,
}

impl Choice {
    /// Creates a choice set. Fails with [`ConfigError::EmptyChoice`] when
    /// `items` is empty.
    pub fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(ConfigError::EmptyChoice);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    /// The value used when the flag is not supplied.
    pub fn first(&self) -> &str {
        // Non-empty by construction.
        &self.items[0]
    }
}

impl TryFrom<serde_yaml::Value> for Choice {
    type Error = ConfigError;

    /// Accepts only a YAML sequence of scalars.
    ///
    /// ```
    /// use fncli_core::{Choice, ConfigError};
    ///
    /// let value: serde_yaml::Value = serde_yaml::from_str("not-a-list").unwrap();
    /// assert!(matches!(Choice::try_from(value), Err(ConfigError::ChoiceNotAList(_))));
    /// ```
    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        let serde_yaml::Value::Sequence(entries) = value else {
            return Err(ConfigError::ChoiceNotAList(yaml_kind(&value).to_string()));
        };
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                serde_yaml::Value::String(s) => items.push(s),
                serde_yaml::Value::Number(n) => items.push(n.to_string()),
                serde_yaml::Value::Bool(b) => items.push(b.to_string()),
                other => {
                    return Err(ConfigError::ChoiceNotAList(format!(
                        "a list containing {}",
                        yaml_kind(&other)
                    )));
                }
            }
        }
        Self::new(items)
    }
}

impl From<Choice> for Vec<String> {
    fn from(choice: Choice) -> Self {
        choice.items
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Choice: {}>", self.items.join(", "))
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// A default that is resolved at invocation time instead of being a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Always prompt. Input is not echoed when `secret` is set.
    Ask { secret: bool },
    /// Read `<PROGRAM>_<PARAMETER>` from the environment, prompt when unset.
    /// The variable name always follows the owning parameter's name.
    EnvOrAsk { secret: bool },
    /// Restrict the flag to a fixed set of values.
    Choice(Choice),
}

impl Deferred {
    /// Whether the resolved value must never be displayed.
    pub fn is_secret(&self) -> bool {
        match self {
            Deferred::Ask { secret } | Deferred::EnvOrAsk { secret } => *secret,
            Deferred::Choice(_) => false,
        }
    }

    /// Whether resolving this descriptor may block on user input.
    pub fn may_prompt(&self) -> bool {
        !matches!(self, Deferred::Choice(_))
    }
}

/// Derives the environment variable consulted by [`Deferred::EnvOrAsk`].
///
/// `program` is the base name of the invocation path; both parts are
/// upper-cased and joined by an underscore.
pub fn env_var_name(program: &str, name: &str) -> String {
    format!("{}_{}", program.to_uppercase(), name.to_uppercase())
}
