//! Header-line grammar: `<PREFIX>_<entity>_<sub_type> = {  # <name>`.

use fragment_model::Category;
use regex::Regex;

use crate::error::Result;

/// Entity pattern of the law ideas the generator emits.
pub const DEFAULT_ENTITY_PATTERN: &str = r"NIE_law_branch_\d+_id_\d+_value_\d+_idea";

/// A recognised header line. All slices borrow from the scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch<'a> {
    /// Whitespace before the prefix token.
    pub indent: &'a str,
    /// The literal prefix token (`EFFECT`, `MODIFIER`, ...).
    pub prefix: &'a str,
    pub category: Category,
    pub entity_id: &'a str,
    pub sub_type: &'a str,
    /// Trimmed comment text; `None` when absent or blank.
    pub annotation: Option<&'a str>,
}

/// Compiled header grammar for one entity pattern.
#[derive(Debug, Clone)]
pub struct HeaderGrammar {
    regex: Regex,
}

impl HeaderGrammar {
    /// Compile the grammar around an entity pattern.
    ///
    /// Named groups keep the grammar stable even if the entity pattern has
    /// capture groups of its own.
    pub fn new(entity_pattern: &str) -> Result<Self> {
        let prefixes = Category::ALL.map(|c| c.prefix()).join("|");
        let regex = Regex::new(&format!(
            r"^(?P<prefix>{prefixes})_(?P<entity>(?:{entity_pattern}))_(?P<sub>[A-Za-z0-9_]+)\s*=\s*\{{\s*(?:#\s*(?P<name>.*?))?\s*$"
        ))?;
        Ok(Self { regex })
    }

    /// Match one line (terminator included or not). Surrounding whitespace is
    /// ignored.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<HeaderMatch<'a>> {
        let trimmed = line.trim();
        let caps = self.regex.captures(trimmed)?;
        let prefix = caps.name("prefix")?.as_str();
        let category = Category::from_prefix(prefix).ok()?;
        let indent = &line[..line.len() - line.trim_start().len()];

        Some(HeaderMatch {
            indent,
            prefix,
            category,
            entity_id: caps.name("entity")?.as_str(),
            sub_type: caps.name("sub")?.as_str(),
            annotation: caps
                .name("name")
                .map(|m| m.as_str().trim())
                .filter(|n| !n.is_empty()),
        })
    }

    /// Check if a line is a header.
    pub fn is_header(&self, line: &str) -> bool {
        self.regex.is_match(line.trim())
    }
}

impl HeaderMatch<'_> {
    /// Rebuild the header with a new display name, keeping indentation and
    /// the literal tokens. An empty name drops the comment clause.
    ///
    /// Returns `None` for a name with a line break, which cannot live on a
    /// header line.
    pub fn render(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.contains(['\n', '\r']) {
            return None;
        }
        let comment = if name.is_empty() {
            String::new()
        } else {
            format!(" # {name}")
        };
        Some(format!(
            "{}{}_{}_{} = {{{}",
            self.indent, self.prefix, self.entity_id, self.sub_type, comment
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY: &str = "NIE_law_branch_1_id_2_value_3_idea";

    fn law_grammar() -> HeaderGrammar {
        HeaderGrammar::new(DEFAULT_ENTITY_PATTERN).unwrap()
    }

    #[test]
    fn test_match_with_annotation() {
        let grammar = law_grammar();
        let line = format!("    EFFECT_{ENTITY}_on_add = {{ # Martial Law\n");
        let m = grammar.match_line(&line).unwrap();

        assert_eq!(m.indent, "    ");
        assert_eq!(m.prefix, "EFFECT");
        assert_eq!(m.category, Category::Effect);
        assert_eq!(m.entity_id, ENTITY);
        assert_eq!(m.sub_type, "on_add");
        assert_eq!(m.annotation, Some("Martial Law"));
    }

    #[test]
    fn test_match_without_annotation() {
        let grammar = law_grammar();

        let line = format!("TRIGGER_{ENTITY}_allowed_rm={{");
        let m = grammar.match_line(&line).unwrap();
        assert_eq!(m.sub_type, "allowed_rm");
        assert_eq!(m.annotation, None);

        let line = format!("TRIGGER_{ENTITY}_visible = {{ #   ");
        let m = grammar.match_line(&line).unwrap();
        assert_eq!(m.annotation, None);
    }

    #[test]
    fn test_non_headers() {
        let grammar = law_grammar();

        assert!(!grammar.is_header(&format!("FUN_{ENTITY}_on_add = {{")));
        assert!(!grammar.is_header(&format!("EFFECT_{ENTITY}_on_add = {{ }}")));
        assert!(!grammar.is_header("EFFECT_some_other_thing_on_add = {"));
        assert!(!grammar.is_header("    add_political_power = 100"));
    }

    #[test]
    fn test_custom_entity_pattern_with_groups() {
        let grammar = HeaderGrammar::new(r"(MOD)_(\d+)").unwrap();
        let m = grammar.match_line("MODIFIER_MOD_42_modifier = { # Tax").unwrap();

        assert_eq!(m.entity_id, "MOD_42");
        assert_eq!(m.sub_type, "modifier");
        assert_eq!(m.annotation, Some("Tax"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(HeaderGrammar::new("(unclosed").is_err());
    }

    #[test]
    fn test_render() {
        let grammar = law_grammar();
        let line = format!("\tPREFERENCES_{ENTITY}_research_bonus={{#Old");
        let m = grammar.match_line(&line).unwrap();

        assert_eq!(
            m.render("New Title"),
            Some(format!("\tPREFERENCES_{ENTITY}_research_bonus = {{ # New Title"))
        );
        assert_eq!(m.render(""), Some(format!("\tPREFERENCES_{ENTITY}_research_bonus = {{")));
    }

    #[test]
    fn test_render_refuses_line_breaks() {
        let grammar = law_grammar();
        let line = format!("EFFECT_{ENTITY}_on_add = {{ # Old");
        let m = grammar.match_line(&line).unwrap();

        assert_eq!(m.render("Line one\nLine two"), None);
        assert_eq!(m.render("Line one\rLine two"), None);
        assert_eq!(m.render("Trailing\n"), Some(format!("EFFECT_{ENTITY}_on_add = {{ # Trailing")));
        assert_eq!(m.render(r"Line one\nLine two"), Some(format!(r"EFFECT_{ENTITY}_on_add = {{ # Line one\nLine two")));
    }
}
