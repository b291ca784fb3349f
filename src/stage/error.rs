//! The stage's single labeled failure kind.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Label attached to every failure raised by this stage.
pub const PLUGIN_NAME: &str = "cordova-access";

/// Failure of one stage invocation.
///
/// Load, parse, persist and unexpected internal failures all surface as
/// [`AccessError::Configuration`] with the underlying message preserved.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{plugin}: configuration error in {}: {message}", .path.display())]
    Configuration {
        plugin: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl AccessError {
    pub fn configuration(path: &Path, message: impl ToString) -> Self {
        AccessError::Configuration {
            plugin: PLUGIN_NAME,
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// The label of the stage that raised this error
    pub fn plugin(&self) -> &'static str {
        match self {
            AccessError::Configuration { plugin, .. } => plugin,
        }
    }

    /// The original error message
    pub fn message(&self) -> &str {
        match self {
            AccessError::Configuration { message, .. } => message,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AccessError::Configuration { .. } => 1,
        }
    }
}
