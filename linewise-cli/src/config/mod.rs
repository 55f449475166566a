//! Configuration file support

use crate::error::CliError;
use anyhow::{Context, Result};
use linewise_core::config::defaults;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Reader configuration
    #[serde(default)]
    pub reader: ReaderSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// Line reader settings
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReaderSection {
    /// Literal separator, escapes allowed
    pub separator: Option<String>,

    /// Regular-expression separator
    pub pattern: Option<String>,

    /// Encoding label
    pub encoding: String,

    /// Chunk size in bytes
    pub buffer_size: usize,
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            separator: None,
            pattern: None,
            encoding: defaults::ENCODING_LABEL.to_string(),
            buffer_size: defaults::BUFFER_SIZE,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputSection {
    /// Default output format
    pub format: String,

    /// Mark the final line of each file
    pub show_last: bool,

    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            show_last: false,
            pretty_json: true,
        }
    }
}

impl CliConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content)?;
        if config.reader.separator.is_some() && config.reader.pattern.is_some() {
            return Err(CliError::ConfigError(
                "reader.separator and reader.pattern are mutually exclusive".to_string(),
            )
            .into());
        }
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
