//! Preview generator: renders a sample of a template using synthesized
//! representative values for anything the caller does not supply.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::{TemplateError, TemplateResult};
use crate::render::substitute;
use crate::template::Template;
use crate::validate::validate_value;
use crate::variable::{TypedValue, Variable, VariableKind};

/// Sample phrase used for unconstrained Text variables.
const SAMPLE_TEXT: &str = "(sample text)";

/// Fixed constant used for unbounded Number variables.
const SAMPLE_NUMBER: f64 = 42.0;

/// Render a sample of the template.
///
/// Caller-supplied `overrides` are validated normally; every other
/// declared variable gets a synthesized value: its default when it has
/// one, otherwise a representative value clamped into the declared
/// bounds. Synthesized values are constructed directly as typed values,
/// so previewing a consistent template cannot fail.
pub fn preview(template: &Template, overrides: &Map<String, Value>) -> TemplateResult<String> {
    let report = template.consistency_report();
    if !report.undeclared_placeholders.is_empty() {
        return Err(TemplateError::NotRenderable(report.undeclared_placeholders));
    }

    let mut substitutions = HashMap::new();
    let mut errors = Vec::new();

    for variable in template.variables() {
        let typed = match overrides.get(&variable.name) {
            Some(raw) => match validate_value(variable, Some(raw)) {
                Ok(typed) => typed,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            },
            None => synthesize(variable),
        };
        substitutions.insert(variable.name.clone(), typed.format(&variable.kind));
    }

    if !errors.is_empty() {
        return Err(TemplateError::Validation(errors));
    }

    Ok(substitute(template.body(), &substitutions))
}

/// Produce a representative value for a variable. Defaults win when
/// present; otherwise the value is picked per type and clamped into the
/// declared bounds.
fn synthesize(variable: &Variable) -> TypedValue {
    if let Some(default) = &variable.default {
        return default.clone();
    }

    match &variable.kind {
        VariableKind::Text {
            min_length,
            max_length,
            pattern,
        } => {
            let sample = match pattern {
                Some(pattern) => sample_from_pattern(pattern)
                    .unwrap_or_else(|| sample_text(*min_length, *max_length)),
                None => sample_text(*min_length, *max_length),
            };
            TypedValue::Text(sample)
        }
        VariableKind::Number {
            min,
            max,
            integer_only,
        } => {
            let mut n = match (min, max) {
                (Some(min), Some(max)) => (min + max) / 2.0,
                (Some(min), None) => *min,
                (None, Some(max)) => *max,
                (None, None) => SAMPLE_NUMBER,
            };
            if *integer_only {
                n = n.round();
                if let Some(min) = min {
                    if n < *min {
                        n = min.ceil();
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        n = max.floor();
                    }
                }
            }
            TypedValue::Number(n)
        }
        VariableKind::Boolean => TypedValue::Boolean(true),
        VariableKind::Choice { options } => {
            // Options are non-empty for any variable that passed model
            // validation; an empty list falls back to a blank string.
            TypedValue::Choice(options.first().cloned().unwrap_or_default())
        }
        VariableKind::Date { min, max, .. } => {
            let mut today = Utc::now().date_naive();
            if let Some(min) = min {
                if today < *min {
                    today = *min;
                }
            }
            if let Some(max) = max {
                if today > *max {
                    today = *max;
                }
            }
            TypedValue::Date(today)
        }
    }
}

/// Deterministically build a string matching `pattern` by walking the
/// regex HIR: literals verbatim, the first (preferably printable)
/// character of each class, minimum repetition counts, first branch of
/// alternations. Returns None for patterns that do not parse or
/// contain bytes outside UTF-8; the caller falls back to plain sample
/// text.
fn sample_from_pattern(pattern: &str) -> Option<String> {
    let hir = regex_syntax::parse(pattern).ok()?;
    let mut out = String::new();
    build_sample(&hir, &mut out)?;
    Some(out)
}

fn build_sample(hir: &regex_syntax::hir::Hir, out: &mut String) -> Option<()> {
    use regex_syntax::hir::{Class, HirKind};

    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => Some(()),
        HirKind::Literal(literal) => {
            out.push_str(std::str::from_utf8(&literal.0).ok()?);
            Some(())
        }
        HirKind::Class(Class::Unicode(class)) => {
            let range = class.ranges().first()?;
            out.push(preferred_char(range.start(), range.end()));
            Some(())
        }
        HirKind::Class(Class::Bytes(class)) => {
            let range = class.ranges().first()?;
            out.push(char::from(range.start()));
            Some(())
        }
        HirKind::Repetition(repetition) => {
            for _ in 0..repetition.min {
                build_sample(&repetition.sub, out)?;
            }
            Some(())
        }
        HirKind::Capture(capture) => build_sample(&capture.sub, out),
        HirKind::Concat(parts) => {
            for part in parts {
                build_sample(part, out)?;
            }
            Some(())
        }
        HirKind::Alternation(parts) => build_sample(parts.first()?, out),
    }
}

/// Pick a readable character from a class range when one is available.
fn preferred_char(start: char, end: char) -> char {
    for candidate in ['a', 'A', '0', ' '] {
        if start <= candidate && candidate <= end {
            return candidate;
        }
    }
    start
}

fn sample_text(min_length: Option<usize>, max_length: Option<usize>) -> String {
    let mut sample = SAMPLE_TEXT.to_string();

    if let Some(max) = max_length {
        if sample.chars().count() > max {
            sample = sample.chars().take(max).collect();
        }
    }
    if let Some(min) = min_length {
        let len = sample.chars().count();
        if len < min {
            sample.extend(std::iter::repeat('x').take(min - len));
        }
    }

    sample
}

impl Template {
    /// Render a sample using synthesized values. See [`preview`].
    pub fn preview(&self, overrides: &Map<String, Value>) -> TemplateResult<String> {
        preview(self, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use crate::variable::VariableType;

    #[test]
    fn test_preview_synthesizes_per_type() {
        let mut template = Template::new(
            "t",
            "T",
            "{topic} / {count} / {enabled} / {status}",
        );
        template
            .add_variable(Variable::new(
                "topic",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();
        template
            .add_variable(Variable::new(
                "count",
                VariableKind::unconstrained(VariableType::Number),
            ))
            .unwrap();
        template
            .add_variable(Variable::new("enabled", VariableKind::Boolean))
            .unwrap();
        template
            .add_variable(Variable::new(
                "status",
                VariableKind::Choice {
                    options: vec!["open".to_string(), "closed".to_string()],
                },
            ))
            .unwrap();

        let rendered = template.preview(&Map::new()).unwrap();
        assert_eq!(rendered, "(sample text) / 42 / true / open");
    }

    #[test]
    fn test_preview_number_midpoint() {
        let mut template = Template::new("t", "T", "{score}");
        template
            .add_variable(Variable::new(
                "score",
                VariableKind::Number {
                    min: Some(0.0),
                    max: Some(10.0),
                    integer_only: false,
                },
            ))
            .unwrap();

        assert_eq!(template.preview(&Map::new()).unwrap(), "5");
    }

    #[test]
    fn test_preview_integer_only_midpoint_stays_in_range() {
        let mut template = Template::new("t", "T", "{rating}");
        template
            .add_variable(Variable::new(
                "rating",
                VariableKind::Number {
                    min: Some(0.5),
                    max: Some(1.5),
                    integer_only: true,
                },
            ))
            .unwrap();

        // The synthesized value round-trips through a real render.
        let rendered = template.preview(&Map::new()).unwrap();
        let mut values = Map::new();
        values.insert("rating".to_string(), json!(rendered.parse::<f64>().unwrap()));
        assert!(template.render(&values).is_ok());
    }

    #[test]
    fn test_preview_prefers_defaults() {
        let mut template = Template::new("t", "T", "{status}");
        template
            .add_variable(Variable::optional(
                "status",
                VariableKind::Choice {
                    options: vec!["open".to_string(), "closed".to_string()],
                },
                TypedValue::Choice("closed".to_string()),
            ))
            .unwrap();

        assert_eq!(template.preview(&Map::new()).unwrap(), "closed");
    }

    #[test]
    fn test_preview_text_respects_length_bounds() {
        let mut template = Template::new("t", "T", "{code}");
        template
            .add_variable(Variable::new(
                "code",
                VariableKind::Text {
                    min_length: Some(20),
                    max_length: None,
                    pattern: None,
                },
            ))
            .unwrap();

        let rendered = template.preview(&Map::new()).unwrap();
        assert_eq!(rendered.chars().count(), 20);
    }

    #[test]
    fn test_preview_date_clamped_to_bounds() {
        let min = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let mut template = Template::new("t", "T", "{when}");
        template
            .add_variable(Variable::new(
                "when",
                VariableKind::Date {
                    min: Some(min),
                    max: None,
                    format: "%Y-%m-%d".to_string(),
                },
            ))
            .unwrap();

        // Today is before the minimum, so the minimum is used.
        assert_eq!(template.preview(&Map::new()).unwrap(), "2099-01-01");
    }

    #[test]
    fn test_preview_pattern_sample_satisfies_pattern() {
        let pattern = "^[A-Z]{3}-\\d+$";
        let mut template = Template::new("t", "T", "{code}");
        template
            .add_variable(Variable::new(
                "code",
                VariableKind::Text {
                    min_length: None,
                    max_length: None,
                    pattern: Some(pattern.to_string()),
                },
            ))
            .unwrap();

        let rendered = template.preview(&Map::new()).unwrap();
        assert!(
            regex::Regex::new(pattern).unwrap().is_match(&rendered),
            "synthesized sample {:?} does not match {}",
            rendered,
            pattern
        );

        // Feeding the synthesized sample back through a real render
        // must succeed: the body is the bare placeholder, so the
        // preview output IS the sample value.
        let mut values = Map::new();
        values.insert("code".to_string(), json!(rendered));
        assert!(template.render(&values).is_ok());
    }

    #[test]
    fn test_sample_from_pattern_shapes() {
        for (pattern, expected) in [
            ("^order-\\d+$", "order-0"),
            ("yes|no", "yes"),
            ("[a-z]+@example\\.com", "a@example.com"),
            ("(draft)?final", "final"),
        ] {
            let sample = sample_from_pattern(pattern).unwrap();
            assert_eq!(sample, expected, "pattern {}", pattern);
            assert!(regex::Regex::new(pattern).unwrap().is_match(&sample));
        }
    }

    #[test]
    fn test_preview_applies_overrides() {
        let mut template = Template::new("t", "T", "{name} has {count} items");
        template
            .add_variable(Variable::new(
                "name",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();
        template
            .add_variable(Variable::new(
                "count",
                VariableKind::unconstrained(VariableType::Number),
            ))
            .unwrap();

        let mut overrides = Map::new();
        overrides.insert("name".to_string(), json!("Ana"));

        let rendered = template.preview(&overrides).unwrap();
        assert_eq!(rendered, "Ana has 42 items");
    }

    #[test]
    fn test_preview_rejects_invalid_override() {
        let mut template = Template::new("t", "T", "{count}");
        template
            .add_variable(Variable::new(
                "count",
                VariableKind::unconstrained(VariableType::Number),
            ))
            .unwrap();

        let mut overrides = Map::new();
        overrides.insert("count".to_string(), json!("many"));

        assert!(matches!(
            template.preview(&overrides).unwrap_err(),
            TemplateError::Validation(_)
        ));
    }

    #[test]
    fn test_preview_fails_on_undeclared_placeholder() {
        let template = Template::new("t", "T", "{ghost}");
        assert!(matches!(
            template.preview(&Map::new()).unwrap_err(),
            TemplateError::NotRenderable(_)
        ));
    }
}
