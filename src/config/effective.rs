//! Effective settings with provenance
//!
//! Captures the merged settings plus which sources contributed to them.

use chrono::{DateTime, Utc};
use cordova_config::{Format, LineEnding, DEFAULT_INDENT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::{BuiltinDefaults, DEFAULT_CONFIG_FILE};
use super::manifest::{validate_config_file, validate_indent, AccessManifest, ConfigError};
use super::merge::{merge_layers, SettingsLayer};
use crate::request::OriginRequest;

/// Origin of a settings source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Manifest,
    Cli,
}

/// A contributing source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Resolved settings for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Descriptor path relative to the project directory
    pub config_file: String,

    /// Output formatting
    pub format: Format,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            format: Format::default(),
        }
    }
}

impl Settings {
    fn from_layer(layer: SettingsLayer) -> Self {
        Self {
            config_file: layer
                .config_file
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            format: Format {
                indent: layer.indent.unwrap_or(DEFAULT_INDENT),
                line_ending: layer.line_ending.unwrap_or(LineEnding::Native),
            },
        }
    }
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings
    pub settings: Settings,

    /// Origins declared by the manifest (empty without one)
    pub origins: OriginRequest,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveSettings {
    /// Build effective settings from layers.
    ///
    /// A manifest path that does not exist is skipped unless `required`.
    pub fn build(
        manifest_path: Option<&Path>,
        required: bool,
        cli_overrides: SettingsLayer,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();
        let mut origins = OriginRequest::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_layer());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Manifest
        if let Some(path) = manifest_path {
            if path.exists() || required {
                let (manifest, digest) = Self::load_manifest(path)?;
                layers.push(manifest.settings_layer());
                origins = manifest.origins;
                sources.push(ConfigSource {
                    origin: ConfigOrigin::Manifest,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        // Layer 3: CLI overrides
        if !cli_overrides.is_empty() {
            if let Some(ref file) = cli_overrides.config_file {
                validate_config_file(file)?;
            }
            if let Some(indent) = cli_overrides.indent {
                validate_indent(indent)?;
            }
            layers.push(cli_overrides);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        Ok(Self {
            created_at: Utc::now(),
            settings: Settings::from_layer(merge_layers(layers)),
            origins,
            sources,
        })
    }

    /// Load and parse a manifest, returning it and the digest of its bytes
    fn load_manifest(path: &Path) -> Result<(AccessManifest, String), ConfigError> {
        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ValidationError(format!("Invalid UTF-8: {}", e)))?;
        let manifest = AccessManifest::from_str(&contents)?;

        Ok((manifest, digest))
    }
}
