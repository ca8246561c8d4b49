//! Reading the canonical name table from a generated localisation file.
//!
//! The generator writes one `l_<language>:` header followed by entries of the
//! form `  key:0 "text"`. Names still to be authored are written with an empty
//! text and a `# TODO: To be written` note; runtime-generated names are only
//! present as a ` # key DY_LOC` comment.

use super::{CanonicalName, CanonicalNameTable, DYNAMIC_MARKER};
use crate::error::{ModelError, Result};
use crate::fragment::EntityId;

const BOM: char = '\u{feff}';
const TODO_NOTE: &str = "To be written";

/// A parsed localisation file.
#[derive(Debug, Clone)]
pub struct LocalisationFile {
    /// Language code from the `l_<language>:` header.
    pub language: String,
    pub names: CanonicalNameTable,
    /// 1-based numbers of lines that were neither entries nor comments.
    pub skipped_lines: Vec<usize>,
}

/// Parse the localisation format emitted by the generator.
///
/// Entry texts are kept in their escaped on-disk form, which is also the form
/// the generator compares annotations against.
pub fn parse_localisation(text: &str) -> Result<LocalisationFile> {
    let mut language: Option<String> = None;
    let mut names = CanonicalNameTable::new();
    let mut skipped_lines = Vec::new();

    for (idx, raw) in text.trim_start_matches(BOM).lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if language.is_none() {
            if line.starts_with('#') {
                continue;
            }
            match line.strip_prefix("l_").and_then(|l| l.strip_suffix(':')) {
                Some(lang) if !lang.is_empty() => {
                    language = Some(lang.to_string());
                    continue;
                }
                _ => return Err(ModelError::MissingLanguageHeader),
            }
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some(key) = dynamic_key(comment) {
                names.insert(EntityId::new(key), CanonicalName::Dynamic);
            }
            continue;
        }

        match parse_entry(line) {
            Some((key, value, note)) => {
                let name = if note.contains(TODO_NOTE) {
                    CanonicalName::ToBeWritten
                } else {
                    CanonicalName::from_raw(value)
                };
                names.insert(EntityId::new(key), name);
            }
            None => skipped_lines.push(idx + 1),
        }
    }

    Ok(LocalisationFile {
        language: language.ok_or(ModelError::MissingLanguageHeader)?,
        names,
        skipped_lines,
    })
}

/// `key DY_LOC` -> `key`
fn dynamic_key(comment: &str) -> Option<&str> {
    let key = comment.trim().strip_suffix(DYNAMIC_MARKER)?.trim();
    let valid = !key.is_empty() && !key.ends_with(':') && !key.contains(char::is_whitespace);
    valid.then_some(key)
}

/// `key:0 "text" # note` -> `(key, text, note)`
fn parse_entry(line: &str) -> Option<(&str, &str, &str)> {
    let (key, rest) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let rest = rest
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start()
        .strip_prefix('"')?;
    let end = closing_quote(rest)?;
    let note = rest[end + 1..].trim().trim_start_matches('#').trim();

    Some((key, &rest[..end], note))
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}l_simp_chinese:\n  \
        NIE_law_branch_1:0 \"Military\"\n  \
        # NIE_law_branch_1_id_1_value_1_idea_modifier_tooltip: placeholder\n  \
        NIE_law_branch_1_id_1_value_1_idea:0 \"Conscription: \\\"Volunteer\\\" Only\"\n  \
        NIE_law_branch_1_id_1_value_2_idea:0 \"\" # TODO: To be written\n \
        # NIE_law_branch_1_id_1_value_3_idea DY_LOC\n";

    #[test]
    fn test_parse_generated_file() {
        let file = parse_localisation(SAMPLE).unwrap();

        assert_eq!(file.language, "simp_chinese");
        assert_eq!(file.names.len(), 4);
        assert!(file.skipped_lines.is_empty());

        assert_eq!(
            file.names.get("NIE_law_branch_1").and_then(|n| n.display_text()),
            Some("Military")
        );
        assert_eq!(
            file.names
                .get("NIE_law_branch_1_id_1_value_1_idea")
                .and_then(|n| n.display_text()),
            Some("Conscription: \\\"Volunteer\\\" Only")
        );
        assert_eq!(
            file.names.get("NIE_law_branch_1_id_1_value_2_idea"),
            Some(&CanonicalName::ToBeWritten)
        );
        assert_eq!(
            file.names.get("NIE_law_branch_1_id_1_value_3_idea"),
            Some(&CanonicalName::Dynamic)
        );
    }

    #[test]
    fn test_missing_header() {
        let err = parse_localisation("  key:0 \"text\"\n").unwrap_err();
        assert!(matches!(err, ModelError::MissingLanguageHeader));

        assert!(matches!(
            parse_localisation("# only a comment\n"),
            Err(ModelError::MissingLanguageHeader)
        ));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let file = parse_localisation("l_english:\n  broken line\n  ok:0 \"Fine\"\n  open:0 \"no end\n").unwrap();

        assert_eq!(file.names.len(), 1);
        assert_eq!(file.skipped_lines, vec![2, 4]);
    }

    #[test]
    fn test_entry_without_version_digit() {
        let file = parse_localisation("l_english:\n key: \"Plain\"\n").unwrap();
        assert_eq!(file.names.get("key").and_then(|n| n.display_text()), Some("Plain"));
    }
}
