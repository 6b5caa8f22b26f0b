use super::history::Conversation;
use super::types::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

/// Session used when a request names none. Sharing it reproduces a single
/// process-wide history.
pub const DEFAULT_SESSION: &str = "default";

/// Longest accepted session identifier; longer ids are truncated.
pub const MAX_SESSION_ID_CHARS: usize = 128;

/// Live sessions kept when no cap is configured.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

pub type SessionHandle = Arc<AsyncMutex<Conversation>>;

struct Slot {
    handle: SessionHandle,
    last_used: u64,
}

#[derive(Default)]
struct Sessions {
    slots: HashMap<String, Slot>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drop the least recently used session, preferring ones no turn holds.
    fn evict_one(&mut self) -> Option<String> {
        let idle = self
            .slots
            .iter()
            .filter(|(_, slot)| Arc::strong_count(&slot.handle) == 1)
            .min_by_key(|(_, slot)| slot.last_used);
        let victim = idle
            .or_else(|| self.slots.iter().min_by_key(|(_, slot)| slot.last_used))
            .map(|(id, _)| id.clone())?;
        self.slots.remove(&victim);
        Some(victim)
    }
}

/// In-process map from session id to its own [`Conversation`].
///
/// The outer lock is held only to look up or insert a handle. Callers lock
/// the per-session handle for as long as a turn is in flight, which keeps
/// turns of one session from interleaving while other sessions proceed.
///
/// At most `max_sessions` conversations are kept. Opening one more evicts
/// the least recently used; a turn still holding an evicted handle finishes
/// on its own copy.
pub struct ConversationStore {
    sessions: Mutex<Sessions>,
    system_prompt: Arc<str>,
    max_turns: Option<usize>,
    max_sessions: usize,
}

impl ConversationStore {
    pub fn new(system_prompt: impl Into<Arc<str>>, max_turns: Option<usize>) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            system_prompt: system_prompt.into(),
            max_turns,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Cap on live sessions. Values below 1 are treated as 1.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Blank ids map to [`DEFAULT_SESSION`].
    pub fn normalize_id(raw: Option<&str>) -> String {
        match raw.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.chars().take(MAX_SESSION_ID_CHARS).collect(),
            None => DEFAULT_SESSION.to_string(),
        }
    }

    /// Handle for `session_id`, seeding a fresh conversation on first use.
    pub fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = sessions.tick();

        if let Some(slot) = sessions.slots.get_mut(session_id) {
            slot.last_used = now;
            return Arc::clone(&slot.handle);
        }

        while sessions.slots.len() >= self.max_sessions {
            match sessions.evict_one() {
                Some(evicted) => tracing::debug!(session = %evicted, "evicted idle conversation"),
                None => break,
            }
        }

        tracing::debug!(session = session_id, "new conversation");
        let handle = Arc::new(AsyncMutex::new(Conversation::new(
            self.system_prompt.as_ref(),
            self.max_turns,
        )));
        sessions.slots.insert(
            session_id.to_string(),
            Slot {
                handle: Arc::clone(&handle),
                last_used: now,
            },
        );
        handle
    }

    /// Copy of a session's messages, or `None` if it is not live.
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<Message>> {
        let handle = {
            let sessions = self
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            sessions
                .slots
                .get(session_id)
                .map(|slot| Arc::clone(&slot.handle))
        }?;
        let conversation = handle.lock().await;
        Some(conversation.messages().to_vec())
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .len()
    }
}
