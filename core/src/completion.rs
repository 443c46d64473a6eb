//! Completion map export.
//!
//! A [`CompletionMap`] describes, per subcommand, the flags it accepts and
//! whether each flag takes free-form input or one of a fixed set of values.
//! Shell completion renderers consume it together with the program name.
//!
//! # Examples
//!
//! ```
//! use fncli_core::*;
//!
//! let registry = Registry::new()
//!     .with_operation(
//!         Operation::new("function_f", |_| Ok(()))
//!             .with_param(Parameter::choice("a", Choice::new(["x", "y"]).unwrap())),
//!     )
//!     .with_operation(
//!         Operation::new("function_g", |_| Ok(())).with_param(Parameter::literal("b", "1")),
//!     );
//!
//! let map = build_completion_map(&registry);
//! assert_eq!(
//!     serde_json::to_value(&map).unwrap(),
//!     serde_json::json!({"f": {"--a": ["x", "y"]}, "g": {"--b": {}}})
//! );
//! ```

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::Registry;

/// Values a flag completes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValues {
    /// Free-form input.
    Free,
    /// One of the listed values.
    Choices(Vec<String>),
}

impl FlagValues {
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            FlagValues::Free => None,
            FlagValues::Choices(items) => Some(items),
        }
    }
}

impl Serialize for FlagValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlagValues::Free => serializer.serialize_map(Some(0))?.end(),
            FlagValues::Choices(items) => items.serialize(serializer),
        }
    }
}

/// `subcommand -> --flag -> values`, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionMap {
    commands: BTreeMap<String, BTreeMap<String, FlagValues>>,
}

impl CompletionMap {
    pub fn subcommands(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Flags of `subcommand`, or `None` if it is unknown.
    pub fn flags(&self, subcommand: &str) -> Option<&BTreeMap<String, FlagValues>> {
        self.commands.get(subcommand)
    }

    pub fn get(&self, subcommand: &str, flag: &str) -> Option<&FlagValues> {
        self.commands.get(subcommand).and_then(|flags| flags.get(flag))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, FlagValues>)> {
        self.commands.iter().map(|(name, flags)| (name.as_str(), flags))
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Builds the completion map for every exposed operation of `registry`.
///
/// Positional parameters have no flag and are left out; so are the reserved
/// built-in subcommands.
pub fn build_completion_map(registry: &Registry) -> CompletionMap {
    let mut commands = BTreeMap::new();
    for op in registry.operations() {
        let flags = op
            .flags()
            .map(|param| {
                let values = match param.choices() {
                    Some(choice) => FlagValues::Choices(choice.items().to_vec()),
                    None => FlagValues::Free,
                };
                (format!("--{}", param.name), values)
            })
            .collect();
        commands.insert(op.name().to_string(), flags);
    }
    CompletionMap { commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Choice, Operation, Parameter};

    #[test]
    fn test_completion_map_structure() {
        let registry = Registry::new()
            .with_operation(
                Operation::new("function_f", |_| Ok(()))
                    .with_param(Parameter::choice("a", Choice::new(["x", "y"]).unwrap())),
            )
            .with_operation(
                Operation::new("function_g", |_| Ok(())).with_param(Parameter::literal("b", "1")),
            );

        let map = build_completion_map(&registry);
        assert_eq!(map.subcommands().collect::<Vec<_>>(), ["f", "g"]);
        assert_eq!(
            map.get("f", "--a"),
            Some(&FlagValues::Choices(vec!["x".to_string(), "y".to_string()]))
        );
        assert_eq!(map.get("g", "--b"), Some(&FlagValues::Free));
    }

    #[test]
    fn test_completion_map_skips_positionals_and_helpers() {
        let registry = Registry::new()
            .with_operation(
                Operation::new("function_copy", |_| Ok(()))
                    .with_param(Parameter::positional("source"))
                    .with_param(Parameter::env_or_ask("token", true))
                    .with_param(Parameter::ask("note", false)),
            )
            .with_operation(Operation::new("helper", |_| Ok(())));

        let map = build_completion_map(&registry);
        let flags = map.flags("copy").expect("copy should be present");
        assert_eq!(flags.keys().collect::<Vec<_>>(), ["--note", "--token"]);
        assert!(map.flags("helper").is_none());
    }

    #[test]
    fn test_completion_map_empty_registry() {
        let map = build_completion_map(&Registry::new());
        assert!(map.is_empty());
        assert_eq!(serde_json::to_string(&map).unwrap(), "{}");
    }

    #[test]
    fn test_operation_without_flags_has_empty_entry() {
        let registry = Registry::new().with_operation(
            Operation::new("function_ping", |_| Ok(())).with_param(Parameter::positional("host")),
        );
        let map = build_completion_map(&registry);
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({"ping": {}})
        );
    }
}
