//! Minimal status evaluation.

use super::{ReconcileStatus, StatusEvaluator, StatusResult};
use crate::core::Document;

/// [`StatusEvaluator`] that only looks at presence and deletion.
///
/// Any document is `Current` unless `metadata.deletionTimestamp` is set, in
/// which case it is `Terminating`. Suitable for offline runs where documents
/// never converge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceStatusEvaluator;

impl StatusEvaluator for PresenceStatusEvaluator {
    fn compute(&self, document: &Document) -> anyhow::Result<StatusResult> {
        let result = if document.str_at(&["metadata", "deletionTimestamp"]).is_some() {
            StatusResult {
                status: ReconcileStatus::Terminating,
                message: "resource scheduled for deletion".to_string(),
            }
        } else {
            StatusResult {
                status: ReconcileStatus::Current,
                message: "resource is current".to_string(),
            }
        };
        Ok(result)
    }
}
