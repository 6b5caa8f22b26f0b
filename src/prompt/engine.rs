use crate::error::PromptError;
use tera::Tera;

/// Tera-backed template engine with inline (embedded) templates.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Register a template from a string.
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<(), PromptError> {
        self.tera
            .add_raw_template(name, content)
            .map_err(|e| PromptError::Render(e.to_string()))
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> Result<String, PromptError> {
        self.tera
            .render(template_name, context)
            .map_err(|e| PromptError::Render(e.to_string()))
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}
