mod engine;

pub use engine::TeraEngine;

use crate::config::PromptConfig;
use crate::error::PromptError;

/// Built-in behavioural instructions placed at index 0 of every session.
pub const SYSTEM_PROMPT: &str = include_str!("system_prompt.md");

const INDEX_TEMPLATE_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("index.html.tera");

/// The configured prompt file, or [`SYSTEM_PROMPT`] when none is set.
pub fn load_system_prompt(config: &PromptConfig) -> Result<String, PromptError> {
    let Some(path) = &config.system_prompt_path else {
        return Ok(SYSTEM_PROMPT.to_string());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| PromptError::Read(format!("{}: {e}", path.display())))?;
    if text.trim().is_empty() {
        return Err(PromptError::Read(format!("{} is empty", path.display())));
    }
    Ok(text)
}

/// Renders the chat page served at `GET /`.
pub struct PageRenderer {
    engine: TeraEngine,
}

impl PageRenderer {
    pub fn new() -> Result<Self, PromptError> {
        let mut engine = TeraEngine::new();
        engine.add_template(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE)?;
        Ok(Self { engine })
    }

    pub fn render_index(&self, title: &str) -> Result<String, PromptError> {
        let mut ctx = tera::Context::new();
        ctx.insert("title", title);
        self.engine.render(INDEX_TEMPLATE_NAME, &ctx)
    }
}
