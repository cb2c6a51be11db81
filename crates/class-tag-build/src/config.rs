//! TOML configuration for the generator.

use class_tag::{InheritancePolicy, RootPolicy};
use serde::Deserialize;
use std::path::Path;

/// Options for the emitted header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Name of the generated enumeration
    pub enum_name: String,
    /// Include guard macro
    pub include_guard: String,
    /// Also emit a `get<Enum>Name()` switch helper
    pub name_lookup: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            enum_name: "Type".to_string(),
            include_guard: "CONSTANTS_H".to_string(),
            name_lookup: false,
        }
    }
}

/// Parsed generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Behavior when a class names several bases
    pub inheritance: InheritancePolicy,
    /// Behavior when several classes have no base
    pub root_policy: RootPolicy,
    /// Explicit root class, overriding `root_policy`
    pub root: Option<String>,
    /// Treat `struct` declarations like classes
    pub include_structs: bool,
    pub header: HeaderOptions,
    /// Input header file name inside `include/<project>/`
    pub input_file: String,
    /// Output header file name inside `include/<project>/`
    pub output_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            inheritance: InheritancePolicy::default(),
            root_policy: RootPolicy::default(),
            root: None,
            include_structs: false,
            header: HeaderOptions::default(),
            input_file: "Shapes.hpp".to_string(),
            output_file: "Constants.hpp".to_string(),
        }
    }
}

/// Raw TOML structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    include_structs: Option<bool>,
    #[serde(default)]
    hierarchy: RawHierarchy,
    #[serde(default)]
    header: RawHeader,
    #[serde(default)]
    paths: RawPaths,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHierarchy {
    /// "reject" (default) or "last_wins"
    #[serde(default)]
    multiple_inheritance: InheritancePolicy,
    /// "strict" (default) or "last_seen"
    #[serde(default)]
    root_policy: RootPolicy,
    root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHeader {
    enum_name: Option<String>,
    include_guard: Option<String>,
    name_lookup: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPaths {
    input: Option<String>,
    output: Option<String>,
}

impl GeneratorConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        if let Some(root) = &raw.hierarchy.root {
            validate_identifier("root", root)?;
        }

        let header = HeaderOptions {
            enum_name: raw.header.enum_name.unwrap_or(defaults.header.enum_name),
            include_guard: raw
                .header
                .include_guard
                .unwrap_or(defaults.header.include_guard),
            name_lookup: raw.header.name_lookup.unwrap_or(defaults.header.name_lookup),
        };
        validate_identifier("enum_name", &header.enum_name)?;
        validate_identifier("include_guard", &header.include_guard)?;

        let input_file = raw.paths.input.unwrap_or(defaults.input_file);
        let output_file = raw.paths.output.unwrap_or(defaults.output_file);
        validate_file_name("input", &input_file)?;
        validate_file_name("output", &output_file)?;
        if input_file == output_file {
            return Err(ConfigError::Validation(format!(
                "input and output both name '{}'",
                input_file
            )));
        }

        Ok(Self {
            inheritance: raw.hierarchy.multiple_inheritance,
            root_policy: raw.hierarchy.root_policy,
            root: raw.hierarchy.root,
            include_structs: raw.include_structs.unwrap_or(defaults.include_structs),
            header,
            input_file,
            output_file,
        })
    }
}

/// Starts with letter/underscore, contains only alphanumeric/_.
fn validate_identifier(key: &str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::Validation(format!("Empty {} not allowed", key)));
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(ConfigError::Validation(format!(
            "Invalid {} '{}': must start with letter or underscore",
            key, value
        )));
    }
    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(ConfigError::Validation(format!(
                "Invalid {} '{}': contains invalid character '{}'",
                key, value, c
            )));
        }
    }
    Ok(())
}

fn validate_file_name(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "Invalid {} '{}': expected a plain file name",
            key, value
        )));
    }
    Ok(())
}

/// Errors during config parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}
