//! Loading the canonical name table from disk.

use fragment_model::{parse_localisation, CanonicalNameTable};
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, SyncError};
use crate::source::SourceText;

const TARGET: &str = "fragment_sync::names";

/// Load a name table, picking the format from the file extension:
/// `.yml`/`.yaml` localisation files or a flat `.json` object.
pub fn load_name_table(path: &Path, diag: &mut Diagnostics) -> Result<CanonicalNameTable> {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let text = SourceText::read(path)?
        .ok_or_else(|| SyncError::io(path, std::io::ErrorKind::NotFound.into()))?
        .text;

    let table = match format.as_deref() {
        Some("yml" | "yaml") => {
            let file = parse_localisation(&text)?;
            for line in &file.skipped_lines {
                diag.debug(TARGET, format!("{}:{line}: not a localisation entry", path.display()));
            }
            diag.debug(TARGET, format!("localisation language: {}", file.language));
            file.names
        }
        Some("json") => CanonicalNameTable::from_json_str(&text)?,
        _ => return Err(SyncError::NamesFormat(path.to_path_buf())),
    };

    diag.info(
        TARGET,
        format!("loaded {} canonical names from {}", table.len(), path.display()),
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragment_model::CanonicalName;
    use std::fs;

    #[test]
    fn test_load_localisation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laws_l_english.yml");
        fs::write(
            &path,
            "\u{feff}l_english:\n \
             NIE_law_branch_1_id_1_value_1_idea:0 \"Martial Law\"\n \
             NIE_law_branch_1_id_1_value_2_idea:0 \"\" # TODO: To be written\n \
             # NIE_law_branch_1_id_1_value_3_idea DY_LOC\n",
        )
        .unwrap();

        let mut diag = Diagnostics::new();
        let table = load_name_table(&path, &mut diag).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get("NIE_law_branch_1_id_1_value_1_idea").and_then(|n| n.display_text()),
            Some("Martial Law")
        );
        assert_eq!(table.get("NIE_law_branch_1_id_1_value_2_idea"), Some(&CanonicalName::ToBeWritten));
        assert_eq!(table.get("NIE_law_branch_1_id_1_value_3_idea"), Some(&CanonicalName::Dynamic));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        fs::write(&path, r#"{"NIE_law_branch_1_id_1_value_1_idea": "Martial Law"}"#).unwrap();

        let table = load_name_table(&path, &mut Diagnostics::new()).unwrap();
        assert!(table.contains("NIE_law_branch_1_id_1_value_1_idea"));
    }

    #[test]
    fn test_unsupported_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("names.csv");
        fs::write(&csv, "a,b\n").unwrap();

        assert!(matches!(
            load_name_table(&csv, &mut Diagnostics::new()),
            Err(SyncError::NamesFormat(_))
        ));
        assert!(matches!(
            load_name_table(&dir.path().join("absent.yml"), &mut Diagnostics::new()),
            Err(SyncError::Io { .. })
        ));
    }
}
