//! In-memory conversation sessions with a bounded history.

use std::{collections::HashMap, fmt};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("User"),
            MessageRole::Assistant => f.write_str("Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Keeps the last `max_history` exchanges (user + assistant) per session.
#[derive(Debug)]
pub struct SessionManager {
    max_history: usize,
    sessions: HashMap<String, Vec<SessionMessage>>,
    session_counter: u64,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: HashMap::new(),
            session_counter: 0,
        }
    }

    /// Creates an empty session and returns its id (`session_<n>`).
    pub fn create_session(&mut self) -> String {
        self.session_counter += 1;
        let id = format!("session_{}", self.session_counter);
        self.sessions.insert(id.clone(), Vec::new());
        debug!(session = %id, "session created");
        id
    }

    /// Appends a message, creating the session if needed and dropping the
    /// oldest messages beyond `max_history * 2`.
    pub fn add_message(&mut self, session_id: &str, role: MessageRole, content: &str) {
        let limit = self.max_history * 2;
        let messages = self.sessions.entry(session_id.to_string()).or_default();
        messages.push(SessionMessage {
            role,
            content: content.to_string(),
        });
        if messages.len() > limit {
            let excess = messages.len() - limit;
            messages.drain(..excess);
        }
    }

    pub fn add_exchange(&mut self, session_id: &str, user_message: &str, assistant_message: &str) {
        self.add_message(session_id, MessageRole::User, user_message);
        self.add_message(session_id, MessageRole::Assistant, assistant_message);
    }

    /// History formatted as `User: …` / `Assistant: …` lines.
    ///
    /// `None` for unknown or empty sessions.
    pub fn conversation_history(&self, session_id: &str) -> Option<String> {
        let messages = self.sessions.get(session_id)?;
        if messages.is_empty() {
            return None;
        }
        Some(
            messages
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub fn clear_session(&mut self, session_id: &str) {
        if let Some(messages) = self.sessions.get_mut(session_id) {
            messages.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_sequential() {
        let mut sm = SessionManager::new(2);
        assert_eq!(sm.create_session(), "session_1");
        assert_eq!(sm.create_session(), "session_2");
    }

    #[test]
    fn history_is_formatted_and_bounded() {
        let mut sm = SessionManager::new(1);
        let id = sm.create_session();
        assert_eq!(sm.conversation_history(&id), None);

        sm.add_exchange(&id, "What is MCP?", "A protocol.");
        assert_eq!(
            sm.conversation_history(&id).as_deref(),
            Some("User: What is MCP?\nAssistant: A protocol.")
        );

        sm.add_exchange(&id, "And lesson 2?", "Servers.");
        assert_eq!(
            sm.conversation_history(&id).as_deref(),
            Some("User: And lesson 2?\nAssistant: Servers.")
        );
    }

    #[test]
    fn unknown_session_is_created_implicitly() {
        let mut sm = SessionManager::new(2);
        assert_eq!(sm.conversation_history("abc"), None);
        sm.add_exchange("abc", "q", "a");
        assert!(sm.conversation_history("abc").is_some());

        sm.clear_session("abc");
        assert_eq!(sm.conversation_history("abc"), None);
    }
}
