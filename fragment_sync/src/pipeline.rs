//! Sync pipeline - scan, reconcile, patch and rescan in one pass.

use chrono::{DateTime, Utc};
use fragment_model::{CanonicalNameTable, FragmentRecord};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::diagnostics::{Diagnostics, EventKind};
use crate::error::Result;
use crate::index::MetaIndex;
use crate::patcher::{PatchOutcome, Patcher};
use crate::reconcile::{ReconcileSummary, Reconciler};
use crate::scanner::BlockScanner;
use crate::workspace::Workspace;

const TARGET: &str = "fragment_sync::pipeline";

/// Whether reconciled headers are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Apply,
    DryRun,
}

/// Summary of one run, serializable for `sync --json`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub workspace: PathBuf,
    pub mode: RunMode,
    pub records_scanned: usize,
    #[serde(flatten)]
    pub summary: ReconcileSummary,
    pub missing_annotations: usize,
    pub unterminated_blocks: usize,
    pub duplicate_keys: usize,
    /// Corpus files skipped during the scan because they are not UTF-8.
    pub unreadable_files: usize,
    pub patch: PatchOutcome,
}

impl SyncReport {
    /// Records whose annotation was (or, in a dry run, would be) changed.
    pub fn changes(&self) -> usize {
        self.summary.changed()
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub report: SyncReport,
    /// Records as reconciled in memory, before any rescan.
    pub records: Vec<FragmentRecord>,
    /// Index over the corpus as it is on disk after the run.
    pub index: MetaIndex,
}

/// Event counts of one run, taken as a difference against a baseline so a
/// shared [`Diagnostics`] can serve several runs.
struct EventBaseline([usize; 4]);

const REPORTED_KINDS: [EventKind; 4] = [
    EventKind::MissingAnnotation,
    EventKind::UnterminatedBlock,
    EventKind::DuplicateKey,
    EventKind::UnreadableFile,
];

impl EventBaseline {
    fn take(diag: &Diagnostics) -> Self {
        Self(REPORTED_KINDS.map(|k| diag.count(k)))
    }

    fn since(&self, diag: &Diagnostics) -> [usize; 4] {
        let now = Self::take(diag).0;
        std::array::from_fn(|i| now[i] - self.0[i])
    }
}

/// Orchestrates one workspace.
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    workspace: Workspace,
    scanner: BlockScanner,
}

impl SyncPipeline {
    pub fn new(workspace: Workspace, scanner: BlockScanner) -> Self {
        Self { workspace, scanner }
    }

    /// Open the configured workspace and compile its grammar.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let workspace = Workspace::open(&config.workspace, config.extension.as_str())?;
        Ok(Self::new(workspace, config.scanner()?))
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn scanner(&self) -> &BlockScanner {
        &self.scanner
    }

    /// Scan the whole workspace and index it.
    pub fn import(&self, diag: &mut Diagnostics) -> Result<(Vec<FragmentRecord>, MetaIndex)> {
        let records = self.workspace.scan_all(&self.scanner, diag)?;
        let index = MetaIndex::build(&records, diag);
        Ok((records, index))
    }

    /// Run the full pipeline.
    ///
    /// With [`RunMode::Apply`] changed headers are written back and, if any
    /// file was patched, the workspace is rescanned so the returned index
    /// reflects the disk. A dry run never writes.
    pub fn run(&self, names: &CanonicalNameTable, mode: RunMode, diag: &mut Diagnostics) -> Result<SyncOutcome> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let baseline = EventBaseline::take(diag);
        diag.info(
            TARGET,
            format!("run {run_id} started on {}", self.workspace.root().display()),
        );

        let (mut records, mut index) = self.import(diag)?;
        let summary = Reconciler::new(names).reconcile(&mut records, diag);
        let [missing_annotations, unterminated_blocks, duplicate_keys, unreadable_files] = baseline.since(diag);

        let patch = match mode {
            RunMode::Apply if summary.has_changes() => {
                Patcher::new(self.scanner.grammar()).patch(&records, diag)?
            }
            _ => PatchOutcome::default(),
        };

        if !patch.files_patched.is_empty() {
            // The rescan sees the same corpus problems again; they are
            // already counted above.
            let mut rescan = Diagnostics::new();
            index = self.import(&mut rescan)?.1;
            diag.debug(TARGET, format!("index rebuilt with {} entries", index.len()));
        }

        let report = SyncReport {
            run_id,
            started_at,
            workspace: self.workspace.root().to_path_buf(),
            mode,
            records_scanned: records.len(),
            summary,
            missing_annotations,
            unterminated_blocks,
            duplicate_keys,
            unreadable_files,
            patch,
        };
        log_summary(&report, diag);

        Ok(SyncOutcome { report, records, index })
    }
}

fn log_summary(report: &SyncReport, diag: &Diagnostics) {
    diag.info(
        TARGET,
        format!(
            "auto-filled {}, resolved {}, orphaned {}, placeholders {}",
            report.summary.auto_filled, report.summary.resolved, report.summary.orphaned, report.summary.placeholder
        ),
    );
    diag.info(
        TARGET,
        format!(
            "missing annotations {}, unterminated blocks {}, unreadable files {}, missing files {}, files patched {}",
            report.missing_annotations,
            report.unterminated_blocks,
            report.unreadable_files + report.patch.unreadable_files.len(),
            report.patch.missing_files.len(),
            report.patch.files_patched.len()
        ),
    );
    if report.mode == RunMode::DryRun && report.changes() > 0 {
        diag.info(TARGET, format!("dry run: {} header(s) would change", report.changes()));
    }
}
