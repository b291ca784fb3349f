//! Settings layer merge
//!
//! Each layer sets some fields; a field set in a later layer overrides the
//! same field from any earlier layer. Unset fields fall through.

use cordova_config::LineEnding;
use serde::{Deserialize, Serialize};

/// A partial set of settings contributed by one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_ending: Option<LineEnding>,
}

impl SettingsLayer {
    /// True if this layer sets nothing.
    pub fn is_empty(&self) -> bool {
        self.config_file.is_none() && self.indent.is_none() && self.line_ending.is_none()
    }
}

/// Overlay `overlay` on top of `base`.
pub fn merge(base: SettingsLayer, overlay: SettingsLayer) -> SettingsLayer {
    SettingsLayer {
        config_file: overlay.config_file.or(base.config_file),
        indent: overlay.indent.or(base.indent),
        line_ending: overlay.line_ending.or(base.line_ending),
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<SettingsLayer>) -> SettingsLayer {
    layers.into_iter().fold(SettingsLayer::default(), merge)
}
