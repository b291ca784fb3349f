//! Access manifest (access.toml)
//!
//! Declares the origins a project wants plus optional output settings. This
//! is layer 2 in the merge precedence:
//! built-in defaults → manifest → CLI flags.
//!
//! ```toml
//! config_file = "config.xml"
//!
//! [format]
//! indent = 4
//! line_ending = "lf"
//!
//! [origins]
//! "*" = false
//! "https://api.example.com" = true
//! "tel:*" = { launch-external = "yes" }
//! ```

use std::fs;
use std::io;
use std::path::Path;

use cordova_config::LineEnding;
use serde::{Deserialize, Serialize};

use super::merge::SettingsLayer;
use crate::request::OriginRequest;

/// Largest indent accepted from configuration.
pub const MAX_INDENT: usize = 16;

/// Error types for settings and manifest operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// `[format]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    /// Spaces per nesting level
    pub indent: Option<usize>,

    /// "native", "lf" or "crlf"
    pub line_ending: Option<LineEnding>,
}

/// Project manifest from access.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessManifest {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Descriptor path relative to the project directory
    pub config_file: Option<String>,

    /// Output formatting
    #[serde(default)]
    pub format: FormatSection,

    /// Desired origins, applied in file order
    #[serde(default)]
    pub origins: OriginRequest,
}

fn default_schema_version() -> u32 {
    1
}

impl AccessManifest {
    /// Load and parse a manifest from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse a manifest from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let manifest: AccessManifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != 1 {
            return Err(ConfigError::ValidationError(format!(
                "Unsupported schema_version {} (expected 1)",
                self.schema_version
            )));
        }

        if let Some(ref file) = self.config_file {
            validate_config_file(file)?;
        }

        if let Some(indent) = self.format.indent {
            validate_indent(indent)?;
        }

        Ok(())
    }

    /// The settings this manifest contributes
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            config_file: self.config_file.clone(),
            indent: self.format.indent,
            line_ending: self.format.line_ending,
        }
    }
}

/// Rule: the descriptor path must be relative and non-empty
pub fn validate_config_file(file: &str) -> Result<(), ConfigError> {
    if file.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "config_file cannot be empty".to_string(),
        ));
    }
    if Path::new(file).is_absolute() {
        return Err(ConfigError::ValidationError(format!(
            "config_file must be relative to the project directory: '{}'",
            file
        )));
    }
    Ok(())
}

/// Rule: indent must be in [0, MAX_INDENT]
pub fn validate_indent(indent: usize) -> Result<(), ConfigError> {
    if indent > MAX_INDENT {
        return Err(ConfigError::ValidationError(format!(
            "indent must be in [0, {}], got {}",
            MAX_INDENT, indent
        )));
    }
    Ok(())
}
