//! Pipeline stage that reconciles access origins for each project item.
//!
//! One invocation per item: load the item's `config.xml`, reconcile the
//! request against it, persist if anything changed, then hand the item back
//! unchanged in identity. Every invocation loads its own document instance;
//! nothing is shared between items.

mod error;
mod state;

pub use error::{AccessError, PLUGIN_NAME};
pub use state::{InvalidTransition, Invocation, InvocationState};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;

use cordova_config::ConfigXml;

use crate::config::Settings;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::request::OriginRequest;

/// A file-like item flowing through the pipeline: a Cordova project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    /// Project directory holding the descriptor
    pub path: PathBuf,

    /// Base directory the item is relative to, if the producer set one
    pub base: Option<PathBuf>,

    /// Opaque contents carried for downstream stages
    pub contents: Option<Vec<u8>>,
}

impl ProjectItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Location of the descriptor for this item.
    pub fn config_path(&self, config_file: &str) -> PathBuf {
        self.path.join(config_file)
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Descriptor that was reconciled
    pub config_path: PathBuf,

    /// Per-origin outcomes, in request order
    #[serde(flatten)]
    pub reconcile: ReconcileReport,

    /// Whether the descriptor was rewritten
    pub written: bool,

    /// SHA-256 of the descriptor bytes before the invocation
    pub digest_before: String,

    /// SHA-256 of the descriptor bytes after the invocation
    pub digest_after: String,

    /// Final lifecycle state of the invocation
    pub state: InvocationState,

    pub applied_at: DateTime<Utc>,
}

/// An item handed back downstream together with its report.
#[derive(Debug, Clone)]
pub struct Processed {
    pub item: ProjectItem,
    pub report: ApplyReport,
}

/// The access-origin stage.
#[derive(Debug, Clone)]
pub struct AccessStage {
    request: OriginRequest,
    settings: Settings,
}

impl AccessStage {
    pub fn new(request: OriginRequest) -> Self {
        Self {
            request,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Reconcile one item's descriptor and hand the item back.
    ///
    /// Completes only after the rewritten descriptor is on disk. On failure
    /// the descriptor is left as it was.
    pub async fn process(&self, item: ProjectItem) -> Result<Processed, AccessError> {
        let config_path = item.config_path(&self.settings.config_file);
        let mut invocation = Invocation::new();

        match self.apply(&config_path, &mut invocation).await {
            Ok(report) => Ok(Processed { item, report }),
            Err(e) => {
                let reached = invocation.state();
                if let Err(transition) = invocation.transition(InvocationState::Failed) {
                    tracing::error!(error = %transition, "invocation failed after completing");
                }
                tracing::warn!(
                    path = %config_path.display(),
                    reached = ?reached,
                    error = %e,
                    "access origin reconciliation failed"
                );
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        config_path: &Path,
        invocation: &mut Invocation,
    ) -> Result<ApplyReport, AccessError> {
        let failed = |e: &dyn std::fmt::Display| AccessError::configuration(config_path, e);

        let bytes = tokio::fs::read(config_path).await.map_err(|e| failed(&e))?;
        let digest_before = sha256_hex(&bytes);
        let text = String::from_utf8(bytes).map_err(|e| failed(&e))?;

        let mut document = ConfigXml::parse(&text)
            .map_err(|e| failed(&e))?
            .with_format(self.settings.format);
        invocation
            .transition(InvocationState::Loaded)
            .map_err(|e| failed(&e))?;

        tracing::debug!(
            path = %config_path.display(),
            request = %self.request,
            "reconciling access origins"
        );
        let reconciled = reconcile(&mut document, &self.request);

        let mut digest_after = digest_before.clone();
        let written = document.is_dirty();
        if written {
            invocation
                .transition(InvocationState::Dirty)
                .map_err(|e| failed(&e))?;

            let output = document.to_xml_string();
            persist(config_path, output.as_bytes())
                .await
                .map_err(|e| failed(&e))?;
            digest_after = sha256_hex(output.as_bytes());

            tracing::info!(
                path = %config_path.display(),
                outcomes = reconciled.outcomes.len(),
                "persisted access origins"
            );
        }

        invocation
            .transition(InvocationState::Done)
            .map_err(|e| failed(&e))?;

        Ok(ApplyReport {
            config_path: config_path.to_path_buf(),
            reconcile: reconciled,
            written,
            digest_before,
            digest_after,
            state: invocation.state(),
            applied_at: Utc::now(),
        })
    }

    /// Drain `input`, process each item, and forward it to `output` once its
    /// descriptor is persisted. Stops at the first failure.
    pub async fn run(
        &self,
        mut input: mpsc::Receiver<ProjectItem>,
        output: mpsc::Sender<ProjectItem>,
    ) -> Result<Vec<ApplyReport>, AccessError> {
        let mut reports = Vec::new();
        let mut downstream_open = true;

        while let Some(item) = input.recv().await {
            let Processed { item, report } = self.process(item).await?;
            reports.push(report);

            if downstream_open && output.send(item).await.is_err() {
                tracing::warn!("downstream receiver closed; items are no longer forwarded");
                downstream_open = false;
            }
        }

        Ok(reports)
    }
}

/// Replace the contents of `path` with `bytes` through a sibling temp file.
///
/// A symlinked descriptor is written at its target, and the target's
/// permissions carry over to the new file.
async fn persist(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let target = tokio::fs::canonicalize(path).await?;
    let permissions = tokio::fs::metadata(&target).await?.permissions();
    let temp_path = temp_path_for(&target);

    tokio::fs::write(&temp_path, bytes).await?;
    if let Err(e) = swap_in(&temp_path, &target, permissions).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

async fn swap_in(
    temp_path: &Path,
    target: &Path,
    permissions: std::fs::Permissions,
) -> std::io::Result<()> {
    tokio::fs::set_permissions(temp_path, permissions).await?;
    tokio::fs::rename(temp_path, target).await
}

/// Sibling path used for atomic writes of `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
