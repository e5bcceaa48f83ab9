//! Typed variable substitution engine for prompt templates.
//!
//! This crate provides:
//! - Placeholder scanning for `{variable}` markers in template text
//! - Typed, constrained variable definitions (text, number, boolean,
//!   choice, date)
//! - Validation and coercion of raw caller-supplied values
//! - A substitution engine that aggregates every validation failure
//!   instead of stopping at the first
//! - Preview rendering with synthesized sample values
//! - An in-memory template registry with CRUD operations
//!
//! # Example
//!
//! ```
//! use prompt_templates::{Template, Variable, VariableKind};
//! use serde_json::{json, Map};
//!
//! let mut template = Template::new("balance", "Balance", "Dear {name}, your balance is {amount}.");
//! template.add_variable(Variable::new(
//!     "name",
//!     VariableKind::Text { min_length: None, max_length: None, pattern: None },
//! ))?;
//! template.add_variable(Variable::new(
//!     "amount",
//!     VariableKind::Number { min: Some(0.0), max: None, integer_only: false },
//! ))?;
//!
//! let mut values = Map::new();
//! values.insert("name".to_string(), json!("Ana"));
//! values.insert("amount".to_string(), json!(42));
//!
//! assert_eq!(template.render(&values)?, "Dear Ana, your balance is 42.");
//! # Ok::<(), prompt_templates::TemplateError>(())
//! ```

pub mod error;
pub mod inference;
pub mod preview;
pub mod render;
pub mod scanner;
pub mod store;
pub mod template;
pub mod validate;
pub mod variable;

pub use error::{TemplateError, TemplateResult, ValidationError};
pub use inference::{describe, suggest_type};
pub use preview::preview;
pub use render::render;
pub use scanner::{lint, scan};
pub use store::{create_template_store, TemplateListResponse, TemplateStore, UpdateTemplateRequest};
pub use template::{ConsistencyReport, Template, DEFAULT_CATEGORY};
pub use validate::validate_value;
pub use variable::{TypedValue, Variable, VariableKind, VariableType, DEFAULT_DATE_FORMAT};
