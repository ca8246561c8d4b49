//! Body normalization: dedent, then trim blank edges.

/// Normalize the lines collected between a header and its closing brace.
///
/// The longest whitespace prefix shared by all non-blank lines is removed
/// from every line, whitespace-only lines become empty, and leading and
/// trailing blank lines are dropped. Terminators are normalized to `\n`.
pub fn normalize_block<S: AsRef<str>>(lines: &[S]) -> String {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim_end_matches(['\n', '\r']))
        .collect();

    let indent = common_indent(lines.iter().copied().filter(|l| !is_blank(l)));

    let dedented: Vec<&str> = lines
        .iter()
        .map(|l| if is_blank(l) { "" } else { &l[indent.len()..] })
        .collect();

    let start = dedented.iter().position(|l| !l.is_empty());
    let end = dedented.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => dedented[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Longest whitespace prefix common to every line. Compared char by char so
/// mixed tabs and spaces only share what is literally identical.
fn common_indent<'a>(mut lines: impl Iterator<Item = &'a str>) -> &'a str {
    let Some(first) = lines.next() else {
        return "";
    };
    let mut common = leading_whitespace(first);

    for line in lines {
        let indent = leading_whitespace(line);
        let shared = common
            .char_indices()
            .zip(indent.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0);
        common = &common[..shared];
        if common.is_empty() {
            break;
        }
    }
    common
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent_common_prefix() {
        let lines = ["    a\n", "      b\n", "    c\n"];
        assert_eq!(normalize_block(&lines), "a\n  b\nc");
    }

    #[test]
    fn test_blank_lines_do_not_limit_prefix() {
        let lines = ["\n", "        x = 1\n", "  \n", "        y = {\n", "            z = 2\n", "        }\n", "\n"];
        assert_eq!(normalize_block(&lines), "x = 1\n\ny = {\n    z = 2\n}");
    }

    #[test]
    fn test_no_common_prefix() {
        let lines = ["a\n", "    b\n"];
        assert_eq!(normalize_block(&lines), "a\n    b");
    }

    #[test]
    fn test_tabs_and_spaces() {
        let lines = ["\t\ta\n", "\t  b\n"];
        assert_eq!(normalize_block(&lines), "\ta\n  b");
    }

    #[test]
    fn test_crlf_terminators() {
        let lines = ["  a\r\n", "  b\r\n"];
        assert_eq!(normalize_block(&lines), "a\nb");
    }

    #[test]
    fn test_empty_and_blank_only() {
        let empty: [&str; 0] = [];
        assert_eq!(normalize_block(&empty), "");
        assert_eq!(normalize_block(&["   \n", "\n"]), "");
    }

    #[test]
    fn test_ideographic_space_indent() {
        let lines = ["\u{3000}a\n", "\u{3000}\u{3000}b\n"];
        assert_eq!(normalize_block(&lines), "a\n\u{3000}b");
    }
}
