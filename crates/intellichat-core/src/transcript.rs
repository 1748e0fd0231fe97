//! The conversation transcript: an ordered, append-only sequence of turns.
//!
//! A transcript is owned by exactly one session and lives only as long as
//! that session. After an optional leading system turn, roles strictly
//! alternate user/assistant with the user first; pushes that would break
//! the alternation are rejected. Turns are never reordered or deleted.

use serde::{Deserialize, Serialize};

use crate::core_types::{Message, Role};
use crate::errors::ChatError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// A transcript seeded with one leading system turn.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    fn system_offset(&self) -> usize {
        match self.messages.first() {
            Some(message) if message.role == Role::System => 1,
            _ => 0,
        }
    }

    fn next_role(&self) -> Role {
        let visible = self.messages.len() - self.system_offset();
        if visible % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ChatError> {
        if self.next_role() != Role::User {
            return Err(ChatError::Transcript(
                "an assistant turn is pending; cannot append a user turn".to_string(),
            ));
        }
        self.messages.push(Message::user(content));
        Ok(())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), ChatError> {
        if self.next_role() != Role::Assistant {
            return Err(ChatError::Transcript(
                "a user turn is pending; cannot append an assistant turn".to_string(),
            ));
        }
        self.messages.push(Message::assistant(content));
        Ok(())
    }

    /// The full sequence including the system seed, for the outbound call.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The displayed history: everything after the leading system turn.
    pub fn visible_turns(&self) -> &[Message] {
        &self.messages[self.system_offset()..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops a trailing user turn after a failed completion, so the next
    /// submission starts from a consistent state instead of double-appending.
    pub(crate) fn rollback_user(&mut self) {
        if matches!(self.messages.last(), Some(message) if message.role == Role::User) {
            self.messages.pop();
        }
    }
}
