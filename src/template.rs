//! Template model: an ordered text body plus the variables declared
//! for it. Owns the invariant that declared variables stay consistent
//! with the placeholders actually present in the body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};
use crate::inference::{describe, suggest_type};
use crate::scanner::scan;
use crate::variable::{Variable, VariableKind};

/// Category assigned when the caller does not pick one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A prompt template definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique template identifier (alphanumeric, dash, underscore)
    pub id: String,

    /// Human-readable template title
    pub title: String,

    /// Template body with {placeholder} markers
    body: String,

    /// Declared variables, in declaration order
    variables: Vec<Variable>,

    /// Category for organization
    #[serde(default = "default_category")]
    pub category: String,

    /// Template description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Set-difference between declared variables and the placeholders
/// present in a template's body. Both sets empty means the template is
/// render-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// Placeholders in the body with no declared variable. These block
    /// rendering.
    pub undeclared_placeholders: Vec<String>,

    /// Declared variables with no placeholder in the body. A warning
    /// only; rendering still proceeds.
    pub orphaned_variables: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_render_ready(&self) -> bool {
        self.undeclared_placeholders.is_empty() && self.orphaned_variables.is_empty()
    }
}

impl Template {
    /// Create a template with no declared variables.
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Template {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            variables: Vec::new(),
            category: default_category(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a template from existing text, auto-declaring a required
    /// variable for every placeholder found. Types come from the
    /// inference advisor and are only a starting point for the author.
    pub fn scaffold(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let mut template = Template::new(id, title, body);
        for name in scan(&template.body) {
            let kind = VariableKind::unconstrained(suggest_type(&name));
            let variable = Variable::new(&name, kind).with_description(describe(&name));
            template.variables.push(variable);
        }
        template
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate identifier and title shape plus every declared variable.
    pub fn validate(&self) -> TemplateResult<()> {
        if self.id.is_empty() || self.id.len() > 64 {
            return Err(TemplateError::InvalidId(
                "ID must be 1-64 characters".to_string(),
            ));
        }

        if !self
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidId(
                "ID must contain only alphanumeric, dash, or underscore".to_string(),
            ));
        }

        if self.title.is_empty() || self.title.len() > 256 {
            return Err(TemplateError::InvalidTemplate(
                "Title must be 1-256 characters".to_string(),
            ));
        }

        for variable in &self.variables {
            variable.validate()?;
        }

        Ok(())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the body and report the resulting mismatches. Variables
    /// orphaned by the change are kept; deleting them is an explicit
    /// caller action.
    pub fn set_body(&mut self, body: impl Into<String>) -> ConsistencyReport {
        self.body = body.into();
        self.updated_at = Utc::now();
        self.consistency_report()
    }

    /// Declared variables, in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Look up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Declare a variable. Fails if the name is already declared or the
    /// variable violates its own invariants.
    pub fn add_variable(&mut self, variable: Variable) -> TemplateResult<()> {
        variable.validate()?;
        if self.variable(&variable.name).is_some() {
            return Err(TemplateError::DuplicateVariable(variable.name));
        }
        self.variables.push(variable);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace an existing variable's definition.
    pub fn update_variable(&mut self, variable: Variable) -> TemplateResult<()> {
        variable.validate()?;
        let slot = self
            .variables
            .iter_mut()
            .find(|v| v.name == variable.name)
            .ok_or_else(|| TemplateError::UnknownVariable(variable.name.clone()))?;
        *slot = variable;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a declared variable. Always succeeds; the body may be
    /// left with an undeclared placeholder, which the consistency
    /// report will surface.
    pub fn remove_variable(&mut self, name: &str) {
        self.variables.retain(|v| v.name != name);
        self.updated_at = Utc::now();
    }

    /// Placeholder names in the body, first-occurrence order.
    pub fn placeholders(&self) -> Vec<String> {
        scan(&self.body)
    }

    /// Compare declared variables against the placeholders actually in
    /// the body.
    pub fn consistency_report(&self) -> ConsistencyReport {
        let present = self.placeholders();

        let undeclared_placeholders = present
            .iter()
            .filter(|name| self.variable(name).is_none())
            .cloned()
            .collect();

        let orphaned_variables = self
            .variables
            .iter()
            .filter(|v| !present.contains(&v.name))
            .map(|v| v.name.clone())
            .collect();

        ConsistencyReport {
            undeclared_placeholders,
            orphaned_variables,
        }
    }
}
