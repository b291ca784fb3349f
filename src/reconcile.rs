//! Access-origin reconciliation.
//!
//! Applies an [`OriginRequest`] to a loaded [`ConfigXml`] through its
//! add/remove primitives, in request order.

use serde::{Deserialize, Serialize};

use cordova_config::{AccessChange, ConfigXml};

use crate::request::{OriginRequest, OriginValue};

/// What happened to one requested origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginAction {
    /// A new entry was appended.
    Added,
    /// An existing entry had its attributes replaced.
    Updated,
    /// The entry already matched.
    Unchanged,
    /// The entry was removed.
    Removed,
    /// Removal requested but no entry existed.
    Absent,
}

impl From<AccessChange> for OriginAction {
    fn from(change: AccessChange) -> Self {
        match change {
            AccessChange::Added => OriginAction::Added,
            AccessChange::Updated => OriginAction::Updated,
            AccessChange::Unchanged => OriginAction::Unchanged,
        }
    }
}

/// Outcome for one origin pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginOutcome {
    pub origin: String,
    pub action: OriginAction,
}

/// Per-origin outcomes of one reconciliation pass, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<OriginOutcome>,
}

impl ReconcileReport {
    /// True if any outcome modified the document.
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(
                o.action,
                OriginAction::Added | OriginAction::Updated | OriginAction::Removed
            )
        })
    }

    /// Number of outcomes with the given action.
    pub fn count(&self, action: OriginAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}

/// Apply `request` to `document`.
pub fn reconcile(document: &mut ConfigXml, request: &OriginRequest) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (pattern, value) in request.iter() {
        let action = match value {
            OriginValue::Remove => {
                if document.remove_access_origin(pattern) > 0 {
                    OriginAction::Removed
                } else {
                    OriginAction::Absent
                }
            }
            OriginValue::AddDefault | OriginValue::AddWithAttributes(_) => {
                let attributes = value.attributes().unwrap_or_default();
                document.set_access_origin(pattern, &attributes).into()
            }
        };

        tracing::debug!(origin = pattern, ?action, "reconciled access origin");
        report.outcomes.push(OriginOutcome {
            origin: pattern.to_string(),
            action,
        });
    }

    report
}
