mod env_overrides;
mod loader;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_env;

pub use schema::{
    ClassifierBackend, ClassifierConfig, CompletionConfig, Config, DEFAULT_SAFE_REPLY,
    GatewayConfig, HistoryConfig, PromptConfig, SafetyConfig,
};
