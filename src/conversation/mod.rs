pub mod history;
pub mod store;
pub mod types;

pub use history::Conversation;
pub use store::{ConversationStore, DEFAULT_SESSION, SessionHandle};
pub use types::{Message, Role};
