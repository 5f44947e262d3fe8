use crate::assembly::Scope;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the resolver does when two or more candidates tie for the best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmbiguityPolicy {
    /// Report the tie as an error
    #[default]
    Reject,
    /// Take the tied candidate declared first
    PreferFirstDeclared,
}

/// Scores used when ranking overload candidates. Lower is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPolicy {
    /// Argument kind equals the slot kind after normalization (default: 0)
    #[serde(default)]
    pub exact_score: u32,

    /// Argument is assignable to a reference slot (default: 1)
    #[serde(default = "default_reference_score")]
    pub reference_score: u32,

    /// Argument reaches the slot kind by primitive widening (default: 2)
    #[serde(default = "default_widening_score")]
    pub widening_score: u32,

    /// Null supplied to a nullable slot (default: 1)
    #[serde(default = "default_reference_score")]
    pub null_reference_score: u32,

    /// Null supplied to a primitive slot. `None` rejects the candidate during
    /// resolution; a score lets it win so the invocation reports the null.
    /// (default: 3)
    #[serde(default = "default_null_primitive_score")]
    pub null_primitive_score: Option<u32>,

    /// Tie handling (default: reject)
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,

    /// Allow primitive widening into boxed slots, e.g. `int` into `Long`.
    /// With `false` a boxed slot only takes its own kind. (default: true)
    #[serde(default = "default_boxed_widening")]
    pub boxed_widening: bool,
}

fn default_reference_score() -> u32 {
    1
}

fn default_widening_score() -> u32 {
    2
}

fn default_null_primitive_score() -> Option<u32> {
    Some(3)
}

fn default_boxed_widening() -> bool {
    true
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            exact_score: 0,
            reference_score: default_reference_score(),
            widening_score: default_widening_score(),
            null_reference_score: default_reference_score(),
            null_primitive_score: default_null_primitive_score(),
            ambiguity: AmbiguityPolicy::Reject,
            boxed_widening: default_boxed_widening(),
        }
    }
}

/// Main container configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    /// Overload ranking
    #[serde(default)]
    pub resolution: ResolutionPolicy,

    /// Scope for document beans that do not name one (default: singleton)
    #[serde(default)]
    pub default_scope: Scope,
}

impl ContainerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the default configuration to a file
    pub fn init_file(path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&ContainerConfig::default())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
