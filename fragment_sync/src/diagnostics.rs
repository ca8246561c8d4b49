//! Diagnostics - the logging context handed to every pipeline component.
//!
//! Components never talk to a global logger directly. They receive a
//! `&mut Diagnostics`, which forwards each message to the `log` facade (with
//! the component's module path as target) and keeps the non-fatal events of
//! the run so they can be counted in the run report.

use fragment_model::{Category, EntityId};
use log::Level;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Kinds of non-fatal events a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Header without a display-name comment.
    MissingAnnotation,
    /// Header prefix does not belong to the folder's category.
    PrefixMismatch,
    /// A header appeared while another block was still open.
    NestedHeader,
    /// End of file reached with an open block; the block was dropped.
    UnterminatedBlock,
    /// Same `(category, entity, sub type)` indexed twice; the later one won.
    DuplicateKey,
    /// Category folder absent from the workspace.
    MissingCategoryFolder,
    /// Entity absent from the canonical name table.
    OrphanedEntity,
    /// Empty annotation filled from the canonical name.
    AutoFilled,
    /// Annotation differed from the canonical name and was overwritten.
    NameConflict,
    /// Canonical entry is a sentinel; annotation left alone.
    Placeholder,
    /// File disappeared before it could be patched.
    MissingFile,
    /// File content is not UTF-8; the file was skipped.
    UnreadableFile,
    /// Canonical name cannot be written on a header line.
    UnrenderableName,
    /// File rewritten with updated headers.
    FilePatched,
    /// Tooltip requested for a fragment kind that has none.
    UnsupportedTooltip,
}

impl EventKind {
    /// Log level used when the event is emitted.
    pub fn level(&self) -> Level {
        match self {
            EventKind::MissingAnnotation
            | EventKind::PrefixMismatch
            | EventKind::NestedHeader
            | EventKind::UnterminatedBlock
            | EventKind::DuplicateKey
            | EventKind::OrphanedEntity
            | EventKind::NameConflict
            | EventKind::MissingFile
            | EventKind::UnreadableFile
            | EventKind::UnrenderableName
            | EventKind::UnsupportedTooltip => Level::Warn,
            EventKind::MissingCategoryFolder | EventKind::AutoFilled | EventKind::FilePatched => {
                Level::Info
            }
            EventKind::Placeholder => Level::Debug,
        }
    }
}

/// One recorded event, carrying enough context to trace it back to a fragment.
#[derive(Debug, Clone, Serialize)]
pub struct SyncEvent {
    pub kind: EventKind,
    pub category: Option<Category>,
    pub entity_id: Option<EntityId>,
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    pub message: String,
}

impl SyncEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            category: None,
            entity_id: None,
            file: None,
            line: None,
            message: message.into(),
        }
    }

    /// Attach the fragment the event is about.
    pub fn with_entity(mut self, category: Category, entity_id: &EntityId) -> Self {
        self.category = Some(category);
        self.entity_id = Some(entity_id.clone());
        self
    }

    /// Attach a file and optionally a 1-based line.
    pub fn with_location(mut self, file: &Path, line: Option<usize>) -> Self {
        self.file = Some(file.to_path_buf());
        self.line = line;
        self
    }
}

impl std::fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(category) = self.category {
            write!(f, "[{category}] ")?;
        }
        if let Some(id) = &self.entity_id {
            write!(f, "{id}: ")?;
        }
        write!(f, "{}", self.message)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " ({}:{line})", file.display()),
            (Some(file), None) => write!(f, " ({})", file.display()),
            _ => Ok(()),
        }
    }
}

/// Logging context for one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<SyncEvent>,
    counts: HashMap<EventKind, usize>,
}

impl Diagnostics {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit and keep an event.
    pub fn record(&mut self, target: &str, event: SyncEvent) {
        log::log!(target: target, event.kind.level(), "{event}");
        *self.counts.entry(event.kind).or_default() += 1;
        self.events.push(event);
    }

    /// Emit a progress message that is not kept.
    pub fn info(&self, target: &str, message: impl AsRef<str>) {
        log::info!(target: target, "{}", message.as_ref());
    }

    /// Emit a debug message that is not kept.
    pub fn debug(&self, target: &str, message: impl AsRef<str>) {
        log::debug!(target: target, "{}", message.as_ref());
    }

    /// Number of events of a kind recorded so far.
    pub fn count(&self, kind: EventKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    /// Events of one kind, in recording order.
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &SyncEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}
