use super::types::{Message, Role};

/// Ordered chat history for one session.
///
/// Index 0 is always the system message. Only user and assistant turns can
/// be appended, and retention trimming drops the oldest of those.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    max_turns: Option<usize>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>, max_turns: Option<usize>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            max_turns,
        }
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.push(Message::new(Role::User, content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::new(Role::Assistant, content));
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.enforce_retention();
    }

    fn enforce_retention(&mut self) {
        let Some(max) = self.max_turns else {
            return;
        };
        let turns = self.messages.len() - 1;
        if turns > max {
            self.messages.drain(1..=turns - max);
        }
    }

    /// Full sequence as sent upstream, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Pairs with [`Conversation::len`]. Index 0 is never drained, so this
    /// is false for every conversation built by [`Conversation::new`].
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
