pub mod http_client;
pub mod openrouter;
pub mod scrub;
pub mod traits;

pub use http_client::build_provider_client_with_timeout;
pub use openrouter::OpenRouterClient;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::CompletionClient;
