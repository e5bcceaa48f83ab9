//! Placeholder scanner.
//!
//! Recognizes exactly the syntax `{identifier}` where `identifier` is
//! `[A-Za-z_][A-Za-z0-9_]*`. Any `{` not followed by a valid identifier
//! and a closing `}` is literal text, not an error.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// The placeholder grammar. This is the only bit-exact syntax contract
/// the engine exposes.
pub(crate) fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Extract the distinct placeholder names referenced in `text`,
/// preserving first-occurrence order.
pub fn scan(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for captures in placeholder_regex().captures_iter(text) {
        let name = &captures[1];
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }

    names
}

/// Advisory syntax warnings for the authoring UI.
///
/// The scanner itself is permissive (malformed braces pass through as
/// literal text), but an author editing a template usually wants to know
/// about brace sequences that look like mistakes.
pub fn lint(text: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let open = text.matches('{').count();
    let close = text.matches('}').count();
    if open != close {
        warnings.push(format!(
            "Unmatched braces: {} opening, {} closing",
            open, close
        ));
    }

    let empty = text.matches("{}").count();
    if empty > 0 {
        warnings.push(format!("Found {} empty placeholder(s)", empty));
    }

    static NESTED: OnceLock<Regex> = OnceLock::new();
    let nested = NESTED.get_or_init(|| Regex::new(r"\{[^}]*\{[^}]*\}[^}]*\}").unwrap());
    if nested.is_match(text) {
        warnings.push("Nested braces are not allowed in placeholders".to_string());
    }

    // Brace pairs whose content is not a valid identifier render as
    // literal text; flag them since that is rarely what the author meant.
    static MALFORMED: OnceLock<Regex> = OnceLock::new();
    let malformed = MALFORMED.get_or_init(|| Regex::new(r"\{([^{}]+)\}").unwrap());
    for captures in malformed.captures_iter(text) {
        let inner = &captures[1];
        if !is_identifier(inner) {
            warnings.push(format!(
                "'{{{}}}' is not a valid placeholder (use letters, digits, underscore, not starting with a digit)",
                inner
            ));
        }
    }

    warnings
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple() {
        let names = scan("Dear {name}, your balance is {amount}.");
        assert_eq!(names, vec!["name", "amount"]);
    }

    #[test]
    fn test_scan_deduplicates_preserving_order() {
        let names = scan("{a}{a}{b}");
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_scan_adjacent_and_no_whitespace() {
        let names = scan("x{first}{second}y");
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_scan_ignores_malformed_braces() {
        assert!(scan("a { b } c").is_empty());
        assert!(scan("{1abc}").is_empty());
        assert!(scan("{unclosed").is_empty());
        assert!(scan("{}").is_empty());
        assert!(scan("no braces at all").is_empty());
    }

    #[test]
    fn test_scan_is_case_sensitive() {
        let names = scan("{Name}{name}");
        assert_eq!(names, vec!["Name", "name"]);
    }

    #[test]
    fn test_scan_underscore_and_digits() {
        let names = scan("{_private} {item_2}");
        assert_eq!(names, vec!["_private", "item_2"]);
    }

    #[test]
    fn test_lint_unmatched_braces() {
        let warnings = lint("hello {name");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unmatched braces"));
    }

    #[test]
    fn test_lint_empty_placeholder() {
        let warnings = lint("hello {}");
        assert!(warnings.iter().any(|w| w.contains("empty placeholder")));
    }

    #[test]
    fn test_lint_invalid_identifier() {
        let warnings = lint("{2fast} {ok_name}");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2fast"));
    }

    #[test]
    fn test_lint_nested_braces() {
        let warnings = lint("{a{b}c}");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Nested braces"));

        // Adjacent placeholders are not nesting.
        assert!(lint("{a}{b}").is_empty());
    }

    #[test]
    fn test_lint_clean_text() {
        assert!(lint("Dear {name}, welcome!").is_empty());
    }
}
