//! Validator/coercer: turns raw caller-supplied values into canonical
//! typed values, or a precise validation failure.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::variable::{TypedValue, Variable, VariableKind};

/// Validate a raw value against a variable's type and constraints.
///
/// An absent raw value succeeds with the variable's default when the
/// variable is optional, and fails with `MissingRequiredValue` when it
/// is required. Every success path yields a canonical [`TypedValue`],
/// so the substitution engine never re-parses.
pub fn validate_value(
    variable: &Variable,
    raw: Option<&Value>,
) -> Result<TypedValue, ValidationError> {
    let raw = match raw {
        Some(Value::Null) | None => {
            return match (variable.required, &variable.default) {
                (false, Some(default)) => Ok(default.clone()),
                _ => Err(ValidationError::MissingRequiredValue {
                    name: variable.name.clone(),
                }),
            };
        }
        Some(raw) => raw,
    };

    match &variable.kind {
        VariableKind::Text { .. } => coerce_text(variable, raw),
        VariableKind::Number { .. } => coerce_number(variable, raw),
        VariableKind::Boolean => coerce_boolean(variable, raw),
        VariableKind::Choice { .. } => coerce_choice(variable, raw),
        VariableKind::Date { .. } => coerce_date(variable, raw),
    }
}

/// Check that an already-typed default satisfies its variable's
/// constraints. Used when validating the variable model itself.
pub(crate) fn validate_default(
    variable: &Variable,
    default: &TypedValue,
) -> Result<(), ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    };

    match (&variable.kind, default) {
        (VariableKind::Text { .. }, TypedValue::Text(s)) => check_text(variable, s),
        (VariableKind::Number { .. }, TypedValue::Number(n)) => check_number(variable, *n),
        (VariableKind::Boolean, TypedValue::Boolean(_)) => Ok(()),
        (VariableKind::Choice { .. }, TypedValue::Choice(s)) => check_choice(variable, s),
        (VariableKind::Date { .. }, TypedValue::Date(d)) => check_date(variable, *d),
        _ => Err(mismatch()),
    }
}

fn coerce_text(variable: &Variable, raw: &Value) -> Result<TypedValue, ValidationError> {
    let s = raw.as_str().ok_or_else(|| ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    })?;
    check_text(variable, s)?;
    Ok(TypedValue::Text(s.to_string()))
}

fn check_text(variable: &Variable, s: &str) -> Result<(), ValidationError> {
    let VariableKind::Text {
        min_length,
        max_length,
        pattern,
    } = &variable.kind
    else {
        return Ok(());
    };

    let len = s.chars().count();
    if let Some(min) = min_length {
        if len < *min {
            return Err(constraint(variable, format!("must be at least {} characters", min)));
        }
    }
    if let Some(max) = max_length {
        if len > *max {
            return Err(constraint(variable, format!("must be at most {} characters", max)));
        }
    }
    if let Some(pattern) = pattern {
        // Invalid patterns are rejected when the variable model is
        // validated; a compile failure here still surfaces as a
        // violation rather than a panic.
        let matched = Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false);
        if !matched {
            return Err(constraint(variable, format!("must match pattern '{}'", pattern)));
        }
    }
    Ok(())
}

fn coerce_number(variable: &Variable, raw: &Value) -> Result<TypedValue, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    };

    let n = match raw {
        Value::Number(n) => n.as_f64().ok_or_else(mismatch)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| mismatch())?,
        _ => return Err(mismatch()),
    };
    if !n.is_finite() {
        return Err(mismatch());
    }

    check_number(variable, n)?;
    Ok(TypedValue::Number(n))
}

fn check_number(variable: &Variable, n: f64) -> Result<(), ValidationError> {
    let VariableKind::Number {
        min,
        max,
        integer_only,
    } = &variable.kind
    else {
        return Ok(());
    };

    if *integer_only && n.fract() != 0.0 {
        return Err(constraint(variable, "must be a whole number".to_string()));
    }
    if let Some(min) = min {
        if n < *min {
            return Err(constraint(variable, format!("must be at least {}", min)));
        }
    }
    if let Some(max) = max {
        if n > *max {
            return Err(constraint(variable, format!("must be at most {}", max)));
        }
    }
    Ok(())
}

fn coerce_boolean(variable: &Variable, raw: &Value) -> Result<TypedValue, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    };

    let b = match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => {
            let n = n.as_f64().ok_or_else(mismatch)?;
            if n == 1.0 {
                true
            } else if n == 0.0 {
                false
            } else {
                return Err(mismatch());
            }
        }
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => return Err(mismatch()),
        },
        _ => return Err(mismatch()),
    };

    Ok(TypedValue::Boolean(b))
}

fn coerce_choice(variable: &Variable, raw: &Value) -> Result<TypedValue, ValidationError> {
    let s = raw.as_str().ok_or_else(|| ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    })?;
    check_choice(variable, s)?;
    Ok(TypedValue::Choice(s.to_string()))
}

fn check_choice(variable: &Variable, s: &str) -> Result<(), ValidationError> {
    let VariableKind::Choice { options } = &variable.kind else {
        return Ok(());
    };

    // Case-sensitive membership.
    if options.iter().any(|o| o == s) {
        Ok(())
    } else {
        Err(constraint(
            variable,
            format!("must be one of: {}", options.join(", ")),
        ))
    }
}

fn coerce_date(variable: &Variable, raw: &Value) -> Result<TypedValue, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        name: variable.name.clone(),
        expected: variable.variable_type(),
    };

    let s = raw.as_str().ok_or_else(mismatch)?;
    let format = match &variable.kind {
        VariableKind::Date { format, .. } => format.as_str(),
        _ => return Err(mismatch()),
    };

    let date = NaiveDate::parse_from_str(s.trim(), format).map_err(|_| mismatch())?;
    check_date(variable, date)?;
    Ok(TypedValue::Date(date))
}

fn check_date(variable: &Variable, date: NaiveDate) -> Result<(), ValidationError> {
    let VariableKind::Date { min, max, .. } = &variable.kind else {
        return Ok(());
    };

    if let Some(min) = min {
        if date < *min {
            return Err(constraint(variable, format!("must be on or after {}", min)));
        }
    }
    if let Some(max) = max {
        if date > *max {
            return Err(constraint(variable, format!("must be on or before {}", max)));
        }
    }
    Ok(())
}

fn constraint(variable: &Variable, description: String) -> ValidationError {
    ValidationError::ConstraintViolation {
        name: variable.name.clone(),
        constraint: description,
    }
}
