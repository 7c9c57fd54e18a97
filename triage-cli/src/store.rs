//! Single-slot store for the most recent analysis.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use triage_core::{AnalysisResult, TaskRecord};

/// The latest submitted batch and what it was scored as.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestAnalysis {
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<TaskRecord>,
    pub analysis: AnalysisResult,
}

/// Holds at most one [`LatestAnalysis`]. Writes replace the whole slot;
/// concurrent writers race and the last one wins.
#[derive(Debug, Default)]
pub struct LatestAnalysisStore {
    slot: RwLock<Option<Arc<LatestAnalysis>>>,
}

impl LatestAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new entry, returning the previous one.
    pub fn replace(&self, latest: LatestAnalysis) -> Option<Arc<LatestAnalysis>> {
        let previous = self.slot.write().replace(Arc::new(latest));
        tracing::debug!(replaced = previous.is_some(), "latest analysis stored");
        previous
    }

    pub fn latest(&self) -> Option<Arc<LatestAnalysis>> {
        self.slot.read().clone()
    }

    pub fn clear(&self) {
        self.slot.write().take();
    }
}
