//! Application configuration.
//!
//! Controls the presentation of the generated command surface. Every field
//! has a default, so a YAML file only needs the keys it changes.
//!
//! # Example YAML
//!
//! ```yaml
//! description: "Operations for the staging cluster"
//! width: 100
//! program_name: ops
//! builtins:
//!   - complete
//! completion_shell: fish
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reserved subcommands provided by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinCommand {
    /// Prints a shell completion script.
    Complete,
    /// Prints the available operation names, one per line.
    List,
}

impl BuiltinCommand {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinCommand::Complete => "complete",
            BuiltinCommand::List => "list",
        }
    }

    pub fn about(self) -> &'static str {
        match self {
            BuiltinCommand::Complete => "Prints a shell completion script.",
            BuiltinCommand::List => "Lists all available functions.",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "complete" => Some(BuiltinCommand::Complete),
            "list" => Some(BuiltinCommand::List),
            _ => None,
        }
    }
}

/// Shell targeted by the `complete` built-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionShell {
    #[default]
    Bash,
    Fish,
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use fncli_core::{AppConfig, BuiltinCommand, CompletionShell};
///
/// let config = AppConfig::from_yaml_str("width: 100\ncompletion_shell: fish\n").unwrap();
/// assert_eq!(config.width, 100);
/// assert_eq!(config.completion_shell, CompletionShell::Fish);
/// assert_eq!(config.builtins, vec![BuiltinCommand::Complete, BuiltinCommand::List]);
/// assert_eq!(config.program_name("/usr/local/bin/ops"), "ops");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Description shown in the top-level help.
    pub description: String,
    /// Help output wrap width, in columns.
    pub width: usize,
    /// Overrides the base name of the invocation path.
    pub program_name: Option<String>,
    /// Enabled reserved subcommands.
    pub builtins: Vec<BuiltinCommand>,
    /// Shell targeted by `complete`.
    pub completion_shell: CompletionShell,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            description: "fncli".to_string(),
            width: 80,
            program_name: None,
            builtins: vec![BuiltinCommand::Complete, BuiltinCommand::List],
            completion_shell: CompletionShell::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ConfigError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::ConfigError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// The configured program name, or the base name of `argv0`.
    pub fn program_name(&self, argv0: &str) -> String {
        match &self.program_name {
            Some(name) => name.clone(),
            None => base_name(argv0).to_string(),
        }
    }

    /// Names of the enabled built-ins.
    pub fn reserved_names(&self) -> Vec<&'static str> {
        self.builtins.iter().map(|b| b.name()).collect()
    }

    pub fn is_builtin_enabled(&self, builtin: BuiltinCommand) -> bool {
        self.builtins.contains(&builtin)
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
