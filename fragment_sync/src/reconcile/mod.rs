//! Reconciler - compares fragment annotations with the canonical name table.
//!
//! Each record is classified by the first rule that applies:
//! 1. **Orphaned**: the entity is not in the table; the record is left alone
//! 2. **Placeholder**: the table entry is a sentinel; nothing to write
//! 3. **AutoFilled**: the annotation is empty; the canonical name is copied in
//! 4. **Resolved**: the annotation differs; the canonical name wins
//! 5. **Unchanged**: the annotation already matches

mod summary;

pub use summary::*;

use fragment_model::{CanonicalName, CanonicalNameTable, FragmentRecord};
use serde::Serialize;

use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};

const TARGET: &str = "fragment_sync::reconcile";

/// Outcome of reconciling one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Orphaned,
    Placeholder,
    AutoFilled,
    Resolved,
    Unchanged,
}

/// Reconciles records against one canonical name table.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    names: &'a CanonicalNameTable,
}

impl<'a> Reconciler<'a> {
    pub fn new(names: &'a CanonicalNameTable) -> Self {
        Self { names }
    }

    /// Reconcile every record in place and summarize the outcome.
    pub fn reconcile(&self, records: &mut [FragmentRecord], diag: &mut Diagnostics) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for record in records.iter_mut() {
            summary.add(self.classify(record, diag));
        }
        diag.info(
            TARGET,
            format!(
                "reconciled {} records: {} auto-filled, {} resolved, {} orphaned, {} placeholders",
                summary.total(),
                summary.auto_filled,
                summary.resolved,
                summary.orphaned,
                summary.placeholder
            ),
        );
        summary
    }

    /// Classify one record, updating its annotation when the canonical name
    /// must be applied.
    pub fn classify(&self, record: &mut FragmentRecord, diag: &mut Diagnostics) -> Classification {
        let Some(canonical) = self.names.get(record.entity_id.as_str()) else {
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::OrphanedEntity,
                    format!("{} not found in the name table; possibly deleted", record.sub_type),
                )
                .with_entity(record.category, &record.entity_id)
                .with_location(&record.source_file, Some(record.line)),
            );
            return Classification::Orphaned;
        };

        let Some(name) = canonical.display_text() else {
            let sentinel = match canonical {
                CanonicalName::Dynamic => "dynamic",
                _ => "to be written",
            };
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::Placeholder,
                    format!("canonical name is {sentinel}; annotation kept"),
                )
                .with_entity(record.category, &record.entity_id),
            );
            return Classification::Placeholder;
        };

        if !record.has_annotation() {
            record.set_annotation(name);
            diag.record(
                TARGET,
                SyncEvent::new(EventKind::AutoFilled, format!("filled with '{name}'"))
                    .with_entity(record.category, &record.entity_id)
                    .with_location(&record.source_file, Some(record.line)),
            );
            return Classification::AutoFilled;
        }

        if record.annotation_text() != name {
            let previous = record.annotation_text().to_string();
            record.set_annotation(name);
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::NameConflict,
                    format!("script annotation '{previous}' replaced by canonical name '{name}'"),
                )
                .with_entity(record.category, &record.entity_id)
                .with_location(&record.source_file, Some(record.line)),
            );
            return Classification::Resolved;
        }

        Classification::Unchanged
    }
}
