//! Layered settings
//!
//! Implements the 3-layer settings merge:
//! 1. Built-in defaults
//! 2. Project manifest (access.toml)
//! 3. CLI flags

mod defaults;
mod effective;
mod manifest;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_CONFIG_FILE, DEFAULT_MANIFEST_FILE};
pub use effective::{ConfigOrigin, ConfigSource, EffectiveSettings, Settings};
pub use manifest::{AccessManifest, ConfigError, FormatSection, MAX_INDENT};
pub use merge::{merge, merge_layers, SettingsLayer};
