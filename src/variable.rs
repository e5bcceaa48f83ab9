//! Variable model: the typed contract governing what values a
//! placeholder accepts.

use std::fmt::{self, Write as _};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};
use crate::validate::validate_default;

/// Date format used when a Date variable does not configure one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed set of variable types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Text,
    Number,
    Boolean,
    Choice,
    Date,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::Text => "text",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
            VariableType::Choice => "choice",
            VariableType::Date => "date",
        };
        f.write_str(name)
    }
}

/// Variable type together with its type-specific constraints.
///
/// Fusing the two means a Text variable can never carry numeric bounds:
/// the invalid pairings are unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VariableKind {
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Regex the value must match (unanchored search; use `^...$`
        /// for a full match).
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default)]
        integer_only: bool,
    },
    Boolean,
    Choice {
        /// Non-empty, ordered list of allowed options.
        options: Vec<String>,
    },
    Date {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<NaiveDate>,
        /// chrono format string accepted on input and used on output.
        #[serde(default = "default_date_format")]
        format: String,
    },
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl VariableKind {
    /// Unconstrained kind for a given type. Choice starts with no
    /// options and must be given some before the variable validates.
    pub fn unconstrained(variable_type: VariableType) -> Self {
        match variable_type {
            VariableType::Text => VariableKind::Text {
                min_length: None,
                max_length: None,
                pattern: None,
            },
            VariableType::Number => VariableKind::Number {
                min: None,
                max: None,
                integer_only: false,
            },
            VariableType::Boolean => VariableKind::Boolean,
            VariableType::Choice => VariableKind::Choice {
                options: Vec::new(),
            },
            VariableType::Date => VariableKind::Date {
                min: None,
                max: None,
                format: default_date_format(),
            },
        }
    }

    pub fn variable_type(&self) -> VariableType {
        match self {
            VariableKind::Text { .. } => VariableType::Text,
            VariableKind::Number { .. } => VariableType::Number,
            VariableKind::Boolean => VariableType::Boolean,
            VariableKind::Choice { .. } => VariableType::Choice,
            VariableKind::Date { .. } => VariableType::Date,
        }
    }
}

/// A validated, canonical value ready for formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Choice(String),
    Date(NaiveDate),
}

impl TypedValue {
    /// Canonical textual form substituted into the rendered output.
    ///
    /// Numbers are locale-free decimals, printed without a fractional
    /// part when they have none; dates use the variable's configured
    /// format, falling back to ISO when the kind does not match.
    pub fn format(&self, kind: &VariableKind) -> String {
        match self {
            TypedValue::Text(s) | TypedValue::Choice(s) => s.clone(),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            TypedValue::Date(d) => {
                let format = match kind {
                    VariableKind::Date { format, .. } => format.as_str(),
                    _ => DEFAULT_DATE_FORMAT,
                };
                // Unformatable strings are rejected by the variable
                // model check; a value that slips in anyway falls back
                // to ISO instead of panicking in Display.
                let mut out = String::new();
                if write!(out, "{}", d.format(format)).is_err() {
                    out.clear();
                    let _ = write!(out, "{}", d.format(DEFAULT_DATE_FORMAT));
                }
                out
            }
        }
    }
}

/// The typed, constrained definition of one placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Placeholder name this variable binds to (case-sensitive).
    pub name: String,

    /// Type and type-specific constraints.
    pub kind: VariableKind,

    /// Whether a caller must supply a value.
    #[serde(default = "default_required")]
    pub required: bool,

    /// Default used when no value is supplied. Must be present exactly
    /// when `required` is false, and must satisfy the constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<TypedValue>,

    /// Human-readable description shown by the authoring UI (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl Variable {
    /// A required variable with no constraints beyond its type.
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Variable {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    /// An optional variable with the given default.
    pub fn optional(name: impl Into<String>, kind: VariableKind, default: TypedValue) -> Self {
        Variable {
            name: name.into(),
            kind,
            required: false,
            default: Some(default),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variable_type(&self) -> VariableType {
        self.kind.variable_type()
    }

    /// Check the model invariants.
    ///
    /// Required variables must not carry a default; optional variables
    /// must carry one that itself satisfies the constraints. Choice
    /// options must be non-empty and patterns must compile.
    pub fn validate(&self) -> TemplateResult<()> {
        if self.name.is_empty() {
            return Err(TemplateError::InvalidVariable {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }

        match &self.kind {
            VariableKind::Choice { options } if options.is_empty() => {
                return Err(TemplateError::InvalidVariable {
                    name: self.name.clone(),
                    reason: "choice variable must declare at least one option".to_string(),
                });
            }
            VariableKind::Text {
                min_length,
                max_length,
                pattern,
            } => {
                if let (Some(min), Some(max)) = (min_length, max_length) {
                    if min > max {
                        return Err(TemplateError::InvalidVariable {
                            name: self.name.clone(),
                            reason: format!("min_length {} exceeds max_length {}", min, max),
                        });
                    }
                }
                if let Some(pattern) = pattern {
                    if let Err(e) = Regex::new(pattern) {
                        return Err(TemplateError::InvalidVariable {
                            name: self.name.clone(),
                            reason: format!("invalid pattern: {}", e),
                        });
                    }
                }
            }
            VariableKind::Number {
                min,
                max,
                integer_only,
            } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(TemplateError::InvalidVariable {
                            name: self.name.clone(),
                            reason: format!("min {} exceeds max {}", min, max),
                        });
                    }
                    if *integer_only && min.ceil() > max.floor() {
                        return Err(TemplateError::InvalidVariable {
                            name: self.name.clone(),
                            reason: format!(
                                "bounds [{}, {}] contain no whole number",
                                min, max
                            ),
                        });
                    }
                }
            }
            VariableKind::Date { min, max, format } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(TemplateError::InvalidVariable {
                            name: self.name.clone(),
                            reason: format!("min date {} exceeds max date {}", min, max),
                        });
                    }
                }
                // chrono only surfaces a bad format string (or one
                // needing time-of-day fields a NaiveDate lacks) when
                // formatting, as a Display error that to_string turns
                // into a panic. Probe-format a date here so the model
                // check rejects it up front, like the pattern compile
                // check above.
                let mut probe = String::new();
                if write!(probe, "{}", NaiveDate::MIN.format(format)).is_err() {
                    return Err(TemplateError::InvalidVariable {
                        name: self.name.clone(),
                        reason: format!("invalid date format '{}'", format),
                    });
                }
            }
            _ => {}
        }

        match (self.required, &self.default) {
            (true, Some(_)) => Err(TemplateError::InvalidVariable {
                name: self.name.clone(),
                reason: "required variable must not declare a default".to_string(),
            }),
            (false, None) => Err(TemplateError::InvalidVariable {
                name: self.name.clone(),
                reason: "optional variable must declare a default".to_string(),
            }),
            (false, Some(default)) => {
                validate_default(self, default).map_err(|e| TemplateError::InvalidVariable {
                    name: self.name.clone(),
                    reason: format!("default does not satisfy constraints: {}", e),
                })
            }
            (true, None) => Ok(()),
        }
    }
}
