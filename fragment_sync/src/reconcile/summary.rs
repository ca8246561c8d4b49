//! Per-classification counts of one reconciliation pass.

use serde::Serialize;

use super::Classification;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub auto_filled: usize,
    pub resolved: usize,
    pub orphaned: usize,
    pub placeholder: usize,
    pub unchanged: usize,
}

impl ReconcileSummary {
    /// Count one classified record.
    pub fn add(&mut self, classification: Classification) {
        let slot = match classification {
            Classification::AutoFilled => &mut self.auto_filled,
            Classification::Resolved => &mut self.resolved,
            Classification::Orphaned => &mut self.orphaned,
            Classification::Placeholder => &mut self.placeholder,
            Classification::Unchanged => &mut self.unchanged,
        };
        *slot += 1;
    }

    /// Records whose annotation was modified.
    pub fn changed(&self) -> usize {
        self.auto_filled + self.resolved
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    pub fn total(&self) -> usize {
        self.changed() + self.orphaned + self.placeholder + self.unchanged
    }
}
