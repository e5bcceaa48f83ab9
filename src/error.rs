//! Error types for template operations.

use thiserror::Error;

use crate::variable::VariableType;

/// A value-level validation failure for a single variable.
///
/// The substitution engine collects these rather than stopping at the
/// first one, so a caller can surface every problem in one pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("'{name}' is required")]
    MissingRequiredValue { name: String },

    #[error("'{name}' must be a valid {expected} value")]
    TypeMismatch {
        name: String,
        expected: VariableType,
    },

    #[error("'{name}': {constraint}")]
    ConstraintViolation { name: String, constraint: String },
}

impl ValidationError {
    /// Name of the variable this error refers to.
    pub fn variable_name(&self) -> &str {
        match self {
            ValidationError::MissingRequiredValue { name }
            | ValidationError::TypeMismatch { name, .. }
            | ValidationError::ConstraintViolation { name, .. } => name,
        }
    }
}

/// Template-level error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Variable already declared: {0}")]
    DuplicateVariable(String),

    #[error("No such variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid variable '{name}': {reason}")]
    InvalidVariable { name: String, reason: String },

    #[error("Template is not renderable; undeclared placeholders: {}", .0.join(", "))]
    NotRenderable(Vec<String>),

    #[error("{} value(s) failed validation", .0.len())]
    Validation(Vec<ValidationError>),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
