//! Type inference advisor.
//!
//! Proposes a likely [`VariableType`] from a placeholder name's lexical
//! form. Purely advisory: the authoring UI may override it, and nothing
//! in the engine ever re-derives or enforces the suggestion once a
//! variable is explicitly defined.

use crate::variable::VariableType;

const NUMBER_TOKENS: &[&str] = &[
    "count", "number", "num", "age", "id", "amount", "quantity", "size", "length", "total",
];

const BOOLEAN_TOKENS: &[&str] = &[
    "is", "has", "should", "can", "enable", "enabled", "disable", "disabled", "flag", "active",
];

const DATE_TOKENS: &[&str] = &["date", "deadline", "due", "day", "time", "when"];

/// Suggest a variable type for a placeholder name.
///
/// Matches whole name tokens (split on underscores and camelCase
/// boundaries) against small keyword sets, so `message` does not read
/// as a number just because it contains "age". Falls back to Text.
pub fn suggest_type(name: &str) -> VariableType {
    let tokens = tokenize(name);
    let has = |set: &[&str]| tokens.iter().any(|t| set.contains(&t.as_str()));

    if has(NUMBER_TOKENS) {
        VariableType::Number
    } else if has(BOOLEAN_TOKENS) {
        VariableType::Boolean
    } else if has(DATE_TOKENS) {
        VariableType::Date
    } else {
        VariableType::Text
    }
}

/// Generate a human-readable description for a variable from its name,
/// e.g. `billingAddress` or `billing_address` become
/// "Enter the billing address".
pub fn describe(name: &str) -> String {
    let tokens = tokenize(name);
    if tokens.is_empty() {
        return "Enter a value".to_string();
    }
    format!("Enter the {}", tokens.join(" "))
}

/// Split a snake_case or camelCase name into lowercase tokens.
fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if c == '_' || c.is_ascii_digit() {
            if !current.is_empty() {
                tokens.push(current.clone());
                current.clear();
            }
        } else if c.is_ascii_uppercase() {
            if !current.is_empty() {
                tokens.push(current.clone());
                current.clear();
            }
            current.push(c.to_ascii_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
