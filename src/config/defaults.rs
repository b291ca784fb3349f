//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all settings.

use cordova_config::{LineEnding, DEFAULT_INDENT};
use serde::{Deserialize, Serialize};

use super::merge::SettingsLayer;

/// Default descriptor file name, relative to the project directory
pub const DEFAULT_CONFIG_FILE: &str = "config.xml";

/// Default manifest file name, relative to the project directory
pub const DEFAULT_MANIFEST_FILE: &str = "access.toml";

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Descriptor file name (default: "config.xml")
    pub config_file: String,

    /// Spaces per nesting level (default: 4)
    pub indent: usize,

    /// Line terminator (default: native)
    pub line_ending: LineEnding,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            indent: DEFAULT_INDENT,
            line_ending: LineEnding::Native,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a fully populated layer for merging
    pub fn to_layer(&self) -> SettingsLayer {
        SettingsLayer {
            config_file: Some(self.config_file.clone()),
            indent: Some(self.indent),
            line_ending: Some(self.line_ending),
        }
    }
}
