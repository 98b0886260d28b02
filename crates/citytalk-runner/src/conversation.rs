//! Append-only chat history.
//!
//! Every step of a conversion extends the history it was given and returns
//! the longer one, so earlier stages can be reused (the SQL reset starts a
//! fresh history; self-correction builds on the last candidate's history).

use crate::llm::{ChatMessage, Role};

/// An ordered list of chat messages that only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// An empty conversation.
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// A copy extended with one message.
    #[must_use]
    pub fn with(&self, role: Role, content: impl Into<String>) -> Self {
        let mut messages = self.messages.clone();
        messages.push(ChatMessage::new(role, content));
        Self { messages }
    }

    /// A copy extended with a pipeline prompt.
    #[must_use]
    pub fn user(&self, content: impl Into<String>) -> Self {
        self.with(Role::User, content)
    }

    /// A copy extended with a model reply.
    #[must_use]
    pub fn assistant(&self, content: impl Into<String>) -> Self {
        self.with(Role::Assistant, content)
    }

    /// Messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been added.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extending_leaves_the_original_untouched() {
        let base = Conversation::new().user("framing");
        let longer = base.assistant("reply").user("follow-up");
        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 3);
        assert_eq!(
            longer.messages().iter().map(|m| m.role).collect::<Vec<_>>(),
            [Role::User, Role::Assistant, Role::User]
        );
    }
}
