//! Engine configuration.
//!
//! Deployment-level knobs that change how values parse, plus a fluent
//! builder in the same shape as the rest of the crate's builders.
//!
//! # Examples
//!
//! ```rust
//! use registration_fields::config::EngineConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::builder()
//!     .with_max_string_length(255)
//!     .with_truthy_token("y")
//!     .build()?;
//! assert_eq!(config.max_string_length, Some(255));
//! # Ok(())
//! # }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration shared by the validator and the export facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Maximum character count for STRING values. `None` means unbounded.
    pub max_string_length: Option<usize>,
    /// Tokens accepted as `true` for BOOL fields (case-insensitive).
    pub truthy_tokens: Vec<String>,
    /// Tokens accepted as `false` for BOOL fields (case-insensitive).
    pub falsy_tokens: Vec<String>,
    /// Trim surrounding whitespace before parsing.
    pub trim_input: bool,
    /// Include deprecated (hidden) fields in exports by default.
    pub include_hidden_in_export: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_string_length: None,
            truthy_tokens: vec!["true".into(), "1".into(), "yes".into()],
            falsy_tokens: vec!["false".into(), "0".into(), "no".into()],
            trim_input: true,
            include_hidden_in_export: false,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Load and validate a configuration from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_string_length == Some(0) {
            return Err(ConfigError::invalid("maxStringLength must be greater than 0"));
        }
        if self.truthy_tokens.is_empty() || self.falsy_tokens.is_empty() {
            return Err(ConfigError::invalid("boolean token sets cannot be empty"));
        }
        if let Some(token) = self
            .truthy_tokens
            .iter()
            .chain(self.falsy_tokens.iter())
            .find(|t| t.trim().is_empty())
        {
            return Err(ConfigError::invalid(format!(
                "boolean token '{}' is blank",
                token
            )));
        }
        if let Some(token) = self.truthy_tokens.iter().find(|truthy| {
            self.falsy_tokens
                .iter()
                .any(|falsy| falsy.eq_ignore_ascii_case(truthy))
        }) {
            return Err(ConfigError::invalid(format!(
                "token '{}' is both truthy and falsy",
                token
            )));
        }
        Ok(())
    }

    pub(crate) fn normalize<'a>(&self, text: &'a str) -> &'a str {
        if self.trim_input { text.trim() } else { text }
    }
}

/// Fluent builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.config.max_string_length = Some(max);
        self
    }

    pub fn with_truthy_token(mut self, token: impl Into<String>) -> Self {
        self.config.truthy_tokens.push(token.into());
        self
    }

    pub fn with_falsy_token(mut self, token: impl Into<String>) -> Self {
        self.config.falsy_tokens.push(token.into());
        self
    }

    /// Replace both boolean token sets.
    pub fn with_bool_tokens<T, F>(mut self, truthy: T, falsy: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.config.truthy_tokens = truthy.into_iter().map(Into::into).collect();
        self.config.falsy_tokens = falsy.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trim_input(mut self, trim: bool) -> Self {
        self.config.trim_input = trim;
        self
    }

    pub fn with_hidden_in_export(mut self, include: bool) -> Self {
        self.config.include_hidden_in_export = include;
        self
    }

    /// Build the configuration, validating it first.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
