//! In-memory template registry with CRUD operations.
//!
//! This is the in-process registry a persistence layer would sit
//! behind; the engine itself never calls back into storage and keeps no
//! usage counters.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

/// Request to update an existing template
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    /// Human-readable template title (optional)
    pub title: Option<String>,

    /// Template body (optional; re-scans placeholders)
    pub body: Option<String>,

    /// Category (optional)
    pub category: Option<String>,

    /// Template description (optional, use null to clear)
    pub description: Option<Option<String>>,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}

/// In-memory template storage
pub struct TemplateStore {
    templates: DashMap<String, Template>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    /// Create a new template store
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Create a new template
    pub fn create(&self, template: Template) -> TemplateResult<Template> {
        template.validate()?;

        if self.templates.contains_key(&template.id) {
            return Err(TemplateError::AlreadyExists(template.id));
        }

        tracing::debug!(template_id = %template.id, "Creating template");
        let id = template.id.clone();
        self.templates.insert(id.clone(), template.clone());

        Ok(template)
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> TemplateResult<Template> {
        self.templates
            .get(id)
            .map(|t| t.clone())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// List all templates
    pub fn list(&self) -> Vec<Template> {
        self.templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// List templates in a category
    pub fn list_by_category(&self, category: &str) -> Vec<Template> {
        self.templates
            .iter()
            .filter(|entry| entry.value().category == category)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Update an existing template's metadata or body
    pub fn update(&self, id: &str, updates: UpdateTemplateRequest) -> TemplateResult<Template> {
        let mut template = self.get(id)?;

        if let Some(title) = updates.title {
            template.title = title;
        }

        if let Some(body) = updates.body {
            let report = template.set_body(body);
            if !report.is_render_ready() {
                tracing::debug!(
                    template_id = %id,
                    undeclared = ?report.undeclared_placeholders,
                    orphaned = ?report.orphaned_variables,
                    "Body update left template inconsistent"
                );
            }
        }

        if let Some(category) = updates.category {
            template.category = category;
        }

        if let Some(description) = updates.description {
            template.description = description;
        }

        template.updated_at = Utc::now();
        template.validate()?;

        self.templates.insert(id.to_string(), template.clone());

        Ok(template)
    }

    /// Delete a template by ID
    pub fn delete(&self, id: &str) -> TemplateResult<()> {
        tracing::debug!(template_id = %id, "Deleting template");
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// Check if a template exists
    pub fn exists(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Render a stored template with the given values
    pub fn render(&self, id: &str, values: &Map<String, Value>) -> TemplateResult<String> {
        self.get(id)?.render(values)
    }

    /// Preview a stored template with synthesized values
    pub fn preview(&self, id: &str, overrides: &Map<String, Value>) -> TemplateResult<String> {
        self.get(id)?.preview(overrides)
    }
}

/// Create an Arc-wrapped template store
pub fn create_template_store() -> Arc<TemplateStore> {
    Arc::new(TemplateStore::new())
}
