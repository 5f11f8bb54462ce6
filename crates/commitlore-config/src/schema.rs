//! Configuration schema.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult, GrammarOptions};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Grammar configuration.
    #[serde(default)]
    pub grammar: GrammarOptions,

    /// Streaming configuration.
    #[serde(default)]
    pub stream: StreamConfig,
}

impl Config {
    /// Checks values that deserialize fine but cannot drive a parser.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.grammar.header_pattern.trim().is_empty() {
            return Err(invalid("grammar.header_pattern", "must not be empty"));
        }
        if self.grammar.revert_pattern.trim().is_empty() {
            return Err(invalid("grammar.revert_pattern", "must not be empty"));
        }
        if self.stream.high_water_mark == 0 {
            return Err(invalid("stream.high_water_mark", "must be at least 1"));
        }
        if self.stream.separator.is_empty() {
            return Err(invalid("stream.separator", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

/// Streaming configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Maximum number of raw messages buffered ahead of the parser.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,

    /// Separator between messages in a multi-message input.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
            separator: default_separator(),
        }
    }
}

fn default_high_water_mark() -> usize {
    16
}

fn default_separator() -> String {
    "\n\n\n".to_string()
}
