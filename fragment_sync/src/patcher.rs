//! Header patcher - writes reconciled annotations back into script files.
//!
//! Patching is line oriented. Every line of an affected file is classified as
//! either a header to rewrite or a pass-through line; the new content is built
//! by substitution at the rewrite indices and compared with the original. A
//! file is written only when some line actually differs, so bodies and
//! unrelated headers stay byte-identical.

use fragment_model::FragmentRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};
use crate::error::{Result, SyncError};
use crate::scanner::HeaderGrammar;
use crate::source::SourceText;

const TARGET: &str = "fragment_sync::patcher";

/// New annotations for one file, keyed by `(entity, sub_type)`.
///
/// The header prefix is not part of the key: a `TRIGGER_` header inside
/// `effect/` that shares entity and sub type with a changed record is
/// rewritten as well.
pub type HeaderChanges<'a> = HashMap<(&'a str, &'a str), &'a str>;

/// What to do with one line of a patched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    PassThrough,
    Rewrite(String),
    /// The new name has a line break; the header is kept as is.
    Unrenderable,
}

/// Result of patching one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedText {
    pub text: String,
    /// Number of header lines whose content changed.
    pub rewritten: usize,
    /// 1-based lines whose new name could not be written.
    pub unrenderable: Vec<usize>,
}

/// Files touched by one patch pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchOutcome {
    pub files_patched: Vec<PathBuf>,
    pub headers_rewritten: usize,
    pub missing_files: Vec<PathBuf>,
    /// Files skipped because their content is not UTF-8.
    pub unreadable_files: Vec<PathBuf>,
    /// Headers left alone because the new name has a line break.
    pub unrenderable_headers: usize,
    /// Files with changed records whose headers already matched.
    pub files_unchanged: Vec<PathBuf>,
}

/// Rewrites changed header lines in place.
#[derive(Debug, Clone, Copy)]
pub struct Patcher<'a> {
    grammar: &'a HeaderGrammar,
}

impl<'a> Patcher<'a> {
    pub fn new(grammar: &'a HeaderGrammar) -> Self {
        Self { grammar }
    }

    /// Patch every file that holds at least one changed record.
    ///
    /// Records with `changed == false` are ignored. Files are visited in path
    /// order.
    pub fn patch(&self, records: &[FragmentRecord], diag: &mut Diagnostics) -> Result<PatchOutcome> {
        let mut by_file: BTreeMap<&Path, Vec<&FragmentRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.changed) {
            by_file.entry(record.source_file()).or_default().push(record);
        }

        let mut outcome = PatchOutcome::default();
        for (path, file_records) in by_file {
            let changes: HeaderChanges<'_> = file_records
                .iter()
                .map(|r| (r.header_key(), r.annotation_text()))
                .collect();

            let patched = match self.patch_file(path, &changes) {
                Ok(Some(patched)) => patched,
                Ok(None) => {
                    diag.record(
                        TARGET,
                        SyncEvent::new(EventKind::MissingFile, "file vanished before patching; skipped")
                            .with_location(path, None),
                    );
                    outcome.missing_files.push(path.to_path_buf());
                    continue;
                }
                Err(SyncError::Encoding(_)) => {
                    diag.record(
                        TARGET,
                        SyncEvent::new(EventKind::UnreadableFile, "not valid UTF-8; not patched")
                            .with_location(path, None),
                    );
                    outcome.unreadable_files.push(path.to_path_buf());
                    continue;
                }
                Err(e) => return Err(e),
            };

            for line in &patched.unrenderable {
                diag.record(
                    TARGET,
                    SyncEvent::new(
                        EventKind::UnrenderableName,
                        "canonical name contains a line break; header left unchanged",
                    )
                    .with_location(path, Some(*line)),
                );
            }
            outcome.unrenderable_headers += patched.unrenderable.len();

            if patched.rewritten == 0 {
                outcome.files_unchanged.push(path.to_path_buf());
                continue;
            }
            diag.record(
                TARGET,
                SyncEvent::new(
                    EventKind::FilePatched,
                    format!("{} header(s) rewritten", patched.rewritten),
                )
                .with_location(path, None),
            );
            outcome.headers_rewritten += patched.rewritten;
            outcome.files_patched.push(path.to_path_buf());
        }

        diag.info(
            TARGET,
            format!("write-back finished, {} file(s) updated", outcome.files_patched.len()),
        );
        Ok(outcome)
    }

    /// Patch one file on disk. Returns `None` if the file does not exist.
    /// The file is written only when some header was rewritten.
    pub fn patch_file(&self, path: &Path, changes: &HeaderChanges<'_>) -> Result<Option<PatchedText>> {
        let Some(source) = SourceText::read(path)? else {
            return Ok(None);
        };

        let patched = self.patch_text(&source.text, changes);
        if patched.rewritten > 0 {
            source.write(path, &patched.text)?;
        }
        Ok(Some(patched))
    }

    /// Decide, for every line, whether it passes through or is rewritten.
    pub fn classify_lines(&self, lines: &[&str], changes: &HeaderChanges<'_>) -> Vec<LineAction> {
        lines
            .iter()
            .map(|line| {
                let (content, terminator) = split_terminator(line);
                let Some(header) = self.grammar.match_line(content) else {
                    return LineAction::PassThrough;
                };
                let Some(name) = changes.get(&(header.entity_id, header.sub_type)) else {
                    return LineAction::PassThrough;
                };
                let Some(rendered) = header.render(name) else {
                    return LineAction::Unrenderable;
                };
                let rebuilt = format!("{rendered}{terminator}");
                if rebuilt == *line {
                    LineAction::PassThrough
                } else {
                    LineAction::Rewrite(rebuilt)
                }
            })
            .collect()
    }

    /// Apply header changes to a text, leaving every other line untouched.
    pub fn patch_text(&self, text: &str, changes: &HeaderChanges<'_>) -> PatchedText {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let actions = self.classify_lines(&lines, changes);

        let mut out = String::with_capacity(text.len());
        let mut rewritten = 0;
        let mut unrenderable = Vec::new();
        for (idx, (line, action)) in lines.iter().zip(&actions).enumerate() {
            match action {
                LineAction::PassThrough => out.push_str(line),
                LineAction::Rewrite(new_line) => {
                    out.push_str(new_line);
                    rewritten += 1;
                }
                LineAction::Unrenderable => {
                    out.push_str(line);
                    unrenderable.push(idx + 1);
                }
            }
        }

        PatchedText {
            text: out,
            rewritten,
            unrenderable,
        }
    }
}

/// Split a line into content and its `\n` / `\r\n` terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DEFAULT_ENTITY_PATTERN;
    use fragment_model::Category;
    use std::fs;

    const ENTITY: &str = "NIE_law_branch_1_id_1_value_1_idea";
    const OTHER: &str = "NIE_law_branch_1_id_1_value_2_idea";

    fn grammar() -> HeaderGrammar {
        HeaderGrammar::new(DEFAULT_ENTITY_PATTERN).unwrap()
    }

    fn sample() -> String {
        format!(
            "EFFECT_{ENTITY}_on_add = {{ # Old Title\n\
             \x20   add_stability = 0.1 # keep = {{ me\n\
             }}\n\
             \n\
             \x20 EFFECT_{OTHER}_on_add = {{ # Untouched\r\n\
             \x20   add_political_power = 50\r\n\
             }}\r\n"
        )
    }

    #[test]
    fn test_only_matching_header_rewritten() {
        let grammar = grammar();
        let changes: HeaderChanges<'_> = [((ENTITY, "on_add"), "New Title")].into_iter().collect();
        let patched = Patcher::new(&grammar).patch_text(&sample(), &changes);

        assert_eq!(patched.rewritten, 1);
        assert_eq!(patched.text, sample().replacen("# Old Title", "# New Title", 1));
    }

    #[test]
    fn test_empty_name_drops_comment_and_keeps_terminator() {
        let grammar = grammar();
        let changes: HeaderChanges<'_> = [((OTHER, "on_add"), "")].into_iter().collect();
        let patched = Patcher::new(&grammar).patch_text(&sample(), &changes);

        assert_eq!(patched.rewritten, 1);
        assert!(patched.text.contains(&format!("\n  EFFECT_{OTHER}_on_add = {{\r\n")));
        assert!(patched.text.contains("# Old Title"));
    }

    #[test]
    fn test_no_change_is_byte_identical() {
        let grammar = grammar();
        let changes: HeaderChanges<'_> = [((ENTITY, "on_add"), "Old Title")].into_iter().collect();
        let patched = Patcher::new(&grammar).patch_text(&sample(), &changes);

        assert_eq!(patched.rewritten, 0);
        assert_eq!(patched.text, sample());
    }

    #[test]
    fn test_classify_lines() {
        let grammar = grammar();
        let changes: HeaderChanges<'_> = [((ENTITY, "on_add"), "X")].into_iter().collect();
        let text = sample();
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let actions = Patcher::new(&grammar).classify_lines(&lines, &changes);

        assert_eq!(actions.len(), 7);
        assert_eq!(actions[0], LineAction::Rewrite(format!("EFFECT_{ENTITY}_on_add = {{ # X\n")));
        assert!(actions[1..].iter().all(|a| *a == LineAction::PassThrough));
    }

    #[test]
    fn test_multi_line_name_leaves_header_alone() {
        let grammar = grammar();
        let changes: HeaderChanges<'_> = [((ENTITY, "on_add"), "Line one\nLine two")].into_iter().collect();
        let patched = Patcher::new(&grammar).patch_text(&sample(), &changes);

        assert_eq!(patched.rewritten, 0);
        assert_eq!(patched.unrenderable, vec![1]);
        assert_eq!(patched.text, sample());
    }

    #[test]
    fn test_prefix_is_not_part_of_the_key() {
        let grammar = grammar();
        let text = format!("EFFECT_{ENTITY}_on_add = {{ # A\n}}\nTRIGGER_{ENTITY}_on_add = {{ # B\n}}\n");
        let changes: HeaderChanges<'_> = [((ENTITY, "on_add"), "C")].into_iter().collect();
        let patched = Patcher::new(&grammar).patch_text(&text, &changes);

        assert_eq!(patched.rewritten, 2);
        assert_eq!(patched.text, text.replace("# A", "# C").replace("# B", "# C"));
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        let bytes: &[u8] = b"EFFECT_NIE_law_branch_1_id_1_value_1_idea_on_add = { # \xff\n}\n";
        fs::write(&path, bytes).unwrap();

        let mut record = FragmentRecord::new(Category::Effect, ENTITY, "on_add").with_source(&path, 1);
        record.set_annotation("New Title");

        let grammar = grammar();
        let mut diag = Diagnostics::new();
        let outcome = Patcher::new(&grammar).patch(&[record], &mut diag).unwrap();

        assert_eq!(outcome.unreadable_files, vec![path.clone()]);
        assert!(outcome.files_patched.is_empty());
        assert_eq!(diag.count(EventKind::UnreadableFile), 1);
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_patch_records_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let changed_path = dir.path().join("changed.txt");
        let untouched_path = dir.path().join("untouched.txt");
        let original = format!("\u{feff}{}", sample());
        fs::write(&changed_path, &original).unwrap();
        fs::write(&untouched_path, &original).unwrap();

        let mut changed = FragmentRecord::new(Category::Effect, ENTITY, "on_add")
            .with_annotation(Some("Old Title"))
            .with_source(&changed_path, 1);
        changed.set_annotation("New Title");
        let unchanged = FragmentRecord::new(Category::Effect, OTHER, "on_add")
            .with_annotation(Some("Untouched"))
            .with_source(&untouched_path, 5);
        let mut gone = FragmentRecord::new(Category::Effect, ENTITY, "on_remove").with_source(dir.path().join("gone.txt"), 1);
        gone.set_annotation("Whatever");

        let grammar = grammar();
        let mut diag = Diagnostics::new();
        let outcome = Patcher::new(&grammar)
            .patch(&[changed, unchanged, gone], &mut diag)
            .unwrap();

        assert_eq!(outcome.files_patched, vec![changed_path.clone()]);
        assert_eq!(outcome.headers_rewritten, 1);
        assert_eq!(outcome.missing_files, vec![dir.path().join("gone.txt")]);
        assert_eq!(diag.count(EventKind::MissingFile), 1);

        let written = fs::read_to_string(&changed_path).unwrap();
        assert!(written.starts_with('\u{feff}'));
        assert_eq!(written, original.replacen("# Old Title", "# New Title", 1));
        assert_eq!(fs::read_to_string(&untouched_path).unwrap(), original);
    }
}
