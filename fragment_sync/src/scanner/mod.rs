//! Block Scanner - extracts fragment records from loosely formatted script files.
//!
//! The scanner is a two-state machine:
//! 1. **ScanningForHeader**: lines are tested against the header grammar
//! 2. **InBlock(depth)**: lines are collected as body while the brace depth
//!    stays above zero; the line that brings it to zero closes the block
//!
//! Blank lines are skipped in both states and never touch the depth.
//! Braces are counted per [`BraceCounting`] mode.

mod header;
mod normalize;

pub use header::*;
pub use normalize::*;

use fragment_model::{Category, FragmentRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};
use crate::error::{Result, SyncError};
use crate::source::SourceText;

const TARGET: &str = "fragment_sync::scanner";

/// How braces in a body line contribute to the block depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceCounting {
    /// Every literal `{` and `}` counts, including those inside quoted
    /// strings. A quoted brace therefore desynchronizes the depth.
    #[default]
    Literal,
    /// Braces inside `"..."` runs are ignored. Must be selected explicitly.
    SkipQuoted,
}

impl BraceCounting {
    /// Depth change contributed by one line.
    pub fn delta(&self, line: &str) -> i64 {
        match self {
            BraceCounting::Literal => line.chars().fold(0, |depth, c| depth + brace_value(c)),
            BraceCounting::SkipQuoted => {
                let mut depth = 0;
                let mut in_quotes = false;
                let mut escaped = false;
                for c in line.chars() {
                    match c {
                        _ if escaped => escaped = false,
                        '\\' if in_quotes => escaped = true,
                        '"' => in_quotes = !in_quotes,
                        _ if !in_quotes => depth += brace_value(c),
                        _ => {}
                    }
                }
                depth
            }
        }
    }
}

fn brace_value(c: char) -> i64 {
    match c {
        '{' => 1,
        '}' => -1,
        _ => 0,
    }
}

/// A block whose closing brace has not been seen yet.
struct OpenBlock {
    record: FragmentRecord,
    lines: Vec<String>,
}

enum ScanState {
    ScanningForHeader,
    InBlock { depth: i64, block: OpenBlock },
}

/// Scans script files into fragment records.
#[derive(Debug, Clone)]
pub struct BlockScanner {
    grammar: HeaderGrammar,
    braces: BraceCounting,
}

impl BlockScanner {
    /// Create a scanner over a header grammar.
    pub fn new(grammar: HeaderGrammar, braces: BraceCounting) -> Self {
        Self { grammar, braces }
    }

    pub fn grammar(&self) -> &HeaderGrammar {
        &self.grammar
    }

    /// Scan one file. A missing file yields no records; a file that is not
    /// UTF-8 is reported and yields no records.
    pub fn scan_file(
        &self,
        category: Category,
        path: &Path,
        diag: &mut Diagnostics,
    ) -> Result<Vec<FragmentRecord>> {
        match SourceText::read(path) {
            Ok(Some(source)) => Ok(self.scan_str(category, path, &source.text, diag)),
            Ok(None) => {
                diag.debug(TARGET, format!("skipping missing file {}", path.display()));
                Ok(Vec::new())
            }
            Err(SyncError::Encoding(_)) => {
                diag.record(
                    TARGET,
                    SyncEvent::new(EventKind::UnreadableFile, "not valid UTF-8; skipped")
                        .with_location(path, None),
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Scan already loaded text. `path` is only recorded, never read.
    pub fn scan_str(
        &self,
        category: Category,
        path: &Path,
        text: &str,
        diag: &mut Diagnostics,
    ) -> Vec<FragmentRecord> {
        let mut records = Vec::new();
        let mut state = ScanState::ScanningForHeader;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(header) = self.grammar.match_line(line) {
                if let ScanState::InBlock { block, .. } = &state {
                    diag.record(
                        TARGET,
                        SyncEvent::new(
                            EventKind::NestedHeader,
                            format!("block opened at line {} abandoned by a new header", block.record.line),
                        )
                        .with_entity(block.record.category, &block.record.entity_id)
                        .with_location(path, Some(line_no)),
                    );
                }
                let block = self.open_block(category, &header, path, line_no, diag);
                state = ScanState::InBlock { depth: 1, block };
                continue;
            }

            state = match state {
                ScanState::ScanningForHeader => ScanState::ScanningForHeader,
                ScanState::InBlock { depth, mut block } => {
                    let depth = depth + self.braces.delta(line);
                    if depth <= 0 {
                        let body = normalize_block(&block.lines);
                        records.push(block.record.with_body(body));
                        ScanState::ScanningForHeader
                    } else {
                        block.lines.push(line.to_string());
                        ScanState::InBlock { depth, block }
                    }
                }
            };
        }

        if let ScanState::InBlock { depth, block } = state {
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::UnterminatedBlock,
                    format!("end of file reached at depth {depth}; block dropped"),
                )
                .with_entity(block.record.category, &block.record.entity_id)
                .with_location(path, Some(block.record.line)),
            );
        }

        records
    }

    fn open_block(
        &self,
        category: Category,
        header: &HeaderMatch<'_>,
        path: &Path,
        line_no: usize,
        diag: &mut Diagnostics,
    ) -> OpenBlock {
        let record = FragmentRecord::new(category, header.entity_id, header.sub_type)
            .with_annotation(header.annotation)
            .with_source(path, line_no);

        if header.category != category {
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::PrefixMismatch,
                    format!("{} header inside the {category} folder", header.prefix),
                )
                .with_entity(category, &record.entity_id)
                .with_location(path, Some(line_no)),
            );
        }
        if !record.has_annotation() {
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::MissingAnnotation,
                    format!("{} has no display name", header.sub_type),
                )
                .with_entity(category, &record.entity_id)
                .with_location(path, Some(line_no)),
            );
        }

        OpenBlock {
            record,
            lines: Vec::new(),
        }
    }
}
