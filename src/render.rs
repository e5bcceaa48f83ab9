//! Substitution engine: validates a full set of values against a
//! template's variables and renders the final text.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{TemplateError, TemplateResult};
use crate::scanner::placeholder_regex;
use crate::template::Template;
use crate::validate::validate_value;

/// Render a template with the given raw values.
///
/// Fails with `NotRenderable` when the body references a placeholder
/// with no declared variable; raw `{name}` text is never left in the
/// output. Otherwise every declared variable is validated, and ALL
/// value-level failures are aggregated into one `Validation` error so
/// the caller can show the user every problem at once.
///
/// Rendering is pure: it never mutates the template or its variables.
pub fn render(template: &Template, values: &Map<String, Value>) -> TemplateResult<String> {
    let report = template.consistency_report();
    if !report.undeclared_placeholders.is_empty() {
        tracing::warn!(
            template_id = %template.id,
            undeclared = ?report.undeclared_placeholders,
            "Refusing to render template with undeclared placeholders"
        );
        return Err(TemplateError::NotRenderable(report.undeclared_placeholders));
    }

    let mut substitutions = HashMap::new();
    let mut errors = Vec::new();

    for variable in template.variables() {
        match validate_value(variable, values.get(&variable.name)) {
            Ok(typed) => {
                substitutions.insert(variable.name.clone(), typed.format(&variable.kind));
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        tracing::debug!(
            template_id = %template.id,
            error_count = errors.len(),
            "Value validation failed"
        );
        return Err(TemplateError::Validation(errors));
    }

    Ok(substitute(template.body(), &substitutions))
}

/// Replace every `{name}` occurrence with its substitution. Names with
/// no entry are left untouched; render-readiness is checked before this
/// runs, so that only happens for callers substituting a partial set.
pub(crate) fn substitute(body: &str, substitutions: &HashMap<String, String>) -> String {
    placeholder_regex()
        .replace_all(body, |captures: &regex::Captures<'_>| {
            match substitutions.get(&captures[1]) {
                Some(value) => value.clone(),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

impl Template {
    /// Validate `values` and render the body. See [`render`].
    pub fn render(&self, values: &Map<String, Value>) -> TemplateResult<String> {
        render(self, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::variable::{TypedValue, Variable, VariableKind, VariableType};
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn balance_template() -> Template {
        let mut template = Template::new("balance", "Balance", "Dear {name}, your balance is {amount}.");
        template
            .add_variable(Variable::new(
                "name",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();
        template
            .add_variable(Variable::new(
                "amount",
                VariableKind::Number {
                    min: Some(0.0),
                    max: None,
                    integer_only: false,
                },
            ))
            .unwrap();
        template
    }

    #[test]
    fn test_render_success() {
        let template = balance_template();
        let rendered = template
            .render(&values(&[("name", json!("Ana")), ("amount", json!(42))]))
            .unwrap();
        assert_eq!(rendered, "Dear Ana, your balance is 42.");
    }

    #[test]
    fn test_render_out_of_range_reports_one_violation() {
        let template = balance_template();
        let err = template
            .render(&values(&[("name", json!("Ana")), ("amount", json!(-5))]))
            .unwrap_err();

        let TemplateError::Validation(errors) = err else {
            panic!("expected Validation, got {:?}", err);
        };
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::ConstraintViolation { name, .. } if name == "amount"
        ));
    }

    #[test]
    fn test_render_aggregates_all_errors() {
        let template = balance_template();
        let err = template
            .render(&values(&[("amount", json!("not a number"))]))
            .unwrap_err();

        let TemplateError::Validation(errors) = err else {
            panic!("expected Validation, got {:?}", err);
        };
        // Missing required "name" AND unparseable "amount", in
        // declaration order.
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].variable_name(), "name");
        assert_eq!(errors[1].variable_name(), "amount");
    }

    #[test]
    fn test_render_fails_on_undeclared_placeholder() {
        let mut template = Template::new("greet", "Greeting", "{greeting} {name}");
        template
            .add_variable(Variable::new(
                "name",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();

        let err = template
            .render(&values(&[("name", json!("Ana"))]))
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::NotRenderable(undeclared) if undeclared == vec!["greeting"]
        ));
    }

    #[test]
    fn test_render_uses_default_for_omitted_optional() {
        let mut template = Template::new("status", "Status", "Ticket is {status}");
        template
            .add_variable(Variable::optional(
                "status",
                VariableKind::Choice {
                    options: vec!["open".to_string(), "closed".to_string()],
                },
                TypedValue::Choice("open".to_string()),
            ))
            .unwrap();

        let rendered = template.render(&Map::new()).unwrap();
        assert_eq!(rendered, "Ticket is open");
    }

    #[test]
    fn test_render_repeated_placeholder_gets_same_value() {
        let mut template = Template::new("echo", "Echo", "{word} {word} {word}!");
        template
            .add_variable(Variable::new(
                "word",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();

        let rendered = template.render(&values(&[("word", json!("go"))])).unwrap();
        assert_eq!(rendered, "go go go!");
    }

    #[test]
    fn test_render_validates_orphaned_variables_too() {
        let mut template = Template::new("t", "T", "no placeholders");
        template
            .add_variable(Variable::new(
                "ghost",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();

        // Declared but absent from the body: still required.
        let err = template.render(&Map::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));
    }

    #[test]
    fn test_render_leaves_malformed_braces_alone() {
        let mut template = Template::new("t", "T", "literal {not valid} and {name}");
        template
            .add_variable(Variable::new(
                "name",
                VariableKind::unconstrained(VariableType::Text),
            ))
            .unwrap();

        let rendered = template.render(&values(&[("name", json!("x"))])).unwrap();
        assert_eq!(rendered, "literal {not valid} and x");
    }

    #[test]
    fn test_render_does_not_mutate_template() {
        let template = balance_template();
        let before = serde_json::to_string(&template).unwrap();
        let _ = template.render(&values(&[("name", json!("Ana")), ("amount", json!(1))]));
        let after = serde_json::to_string(&template).unwrap();
        assert_eq!(before, after);
    }
}
