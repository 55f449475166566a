//! Line source configuration

use crate::error::{LineError, Result};
use crate::separator::Separator;
use encoding_rs::Encoding;

/// Default configuration constants
pub mod defaults {
    /// Default chunk capacity in bytes
    pub const BUFFER_SIZE: usize = 1024;

    /// Label of the default text encoding
    pub const ENCODING_LABEL: &str = "utf-8";
}

/// Configuration fixed at line source construction
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Separator between lines; `None` selects the line source's default
    pub separator: Option<Separator>,
    /// Encoding used to decode the byte source
    pub encoding: &'static Encoding,
    /// Chunk capacity in bytes
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            separator: None,
            encoding: encoding_rs::UTF_8,
            buffer_size: defaults::BUFFER_SIZE,
        }
    }
}

impl ReaderConfig {
    /// Create a configuration builder
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }

    /// Separator to use, falling back to `default` when none was configured
    pub fn separator_or(&self, default: impl FnOnce() -> Separator) -> Separator {
        self.separator.clone().unwrap_or_else(default)
    }

    /// Validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(LineError::Config(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if let Some(Separator::Literal(literal)) = &self.separator {
            if literal.is_empty() {
                return Err(LineError::InvalidSeparator(
                    "literal separator must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Fluent builder for [`ReaderConfig`]
#[derive(Debug, Default)]
pub struct ReaderConfigBuilder {
    separator: Option<SeparatorSource>,
    encoding: Option<String>,
    buffer_size: Option<usize>,
}

#[derive(Debug)]
enum SeparatorSource {
    Literal(String),
    Pattern(String),
    Compiled(Separator),
}

impl ReaderConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Split on a literal separator
    pub fn separator(mut self, literal: impl Into<String>) -> Self {
        self.separator = Some(SeparatorSource::Literal(literal.into()));
        self
    }

    /// Split on a regular expression
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.separator = Some(SeparatorSource::Pattern(pattern.into()));
        self
    }

    /// Split on an already constructed separator
    pub fn separator_spec(mut self, separator: Separator) -> Self {
        self.separator = Some(SeparatorSource::Compiled(separator));
        self
    }

    /// Set the encoding by WHATWG label (`"utf-8"`, `"latin1"`, `"utf-16le"`, ...)
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Set the chunk capacity in bytes
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = Some(bytes);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ReaderConfig> {
        let mut config = ReaderConfig::default();

        config.separator = match self.separator {
            Some(SeparatorSource::Literal(literal)) => Some(Separator::literal(literal)?),
            Some(SeparatorSource::Pattern(pattern)) => Some(Separator::pattern(&pattern)?),
            Some(SeparatorSource::Compiled(separator)) => Some(separator),
            None => None,
        };

        if let Some(label) = self.encoding {
            config.encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or(LineError::UnknownEncoding(label))?;
        }

        if let Some(size) = self.buffer_size {
            config.buffer_size = size;
        }

        config.validate()?;
        Ok(config)
    }
}
