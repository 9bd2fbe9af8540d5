//! In-session conversation memory for the companion mode.
//!
//! Holds, for the lifetime of one process run, the recent message history
//! (bounded, FIFO eviction), the topics that have come up, and the facts the
//! user has shared. Nothing here survives the process.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Most messages retained; the oldest are evicted first once the bound is
/// exceeded.
pub const MAX_MESSAGES: usize = 50;

/// How many recent messages are folded into a companion prompt.
pub const CONTEXT_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Companion",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct ConversationMemory {
    messages: VecDeque<MemoryEntry>,
    topics: Vec<String>,
    facts: Vec<String>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, evicting from the front whenever the bound is
    /// exceeded.
    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push_back(MemoryEntry {
            role,
            content: content.into(),
            timestamp: Local::now(),
        });
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    /// Remember a topic, keeping the running list deduplicated and in
    /// first-seen order.
    pub fn note_topic(&mut self, topic: impl Into<String>) {
        let topic = topic.into();
        if !self.topics.iter().any(|t| t == &topic) {
            self.topics.push(topic);
        }
    }

    /// Remember a fact the user shared. Exact duplicates are dropped.
    pub fn note_fact(&mut self, fact: impl Into<String>) {
        let fact = fact.into();
        if !self.facts.iter().any(|f| f == &fact) {
            self.facts.push(fact);
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    /// Render the most recent exchanges as context lines for a prompt.
    pub fn recent_context(&self) -> String {
        let skip = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        self.messages
            .iter()
            .skip(skip)
            .map(|entry| format!("{}: {}", entry.role.label(), entry.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_the_message_bound() {
        let mut memory = ConversationMemory::new();
        for i in 0..130 {
            memory.record(Role::User, format!("message {i}"));
        }
        assert_eq!(memory.len(), MAX_MESSAGES);
    }

    #[test]
    fn evicts_oldest_entries_first() {
        let mut memory = ConversationMemory::new();
        for i in 0..(MAX_MESSAGES + 3) {
            memory.record(Role::User, format!("message {i}"));
        }
        let first = memory.messages().next().expect("non-empty memory");
        assert_eq!(first.content, "message 3");
        let last = memory.messages().last().expect("non-empty memory");
        assert_eq!(last.content, format!("message {}", MAX_MESSAGES + 2));
    }

    #[test]
    fn topics_are_deduplicated_in_first_seen_order() {
        let mut memory = ConversationMemory::new();
        memory.note_topic("music");
        memory.note_topic("work");
        memory.note_topic("music");
        assert_eq!(memory.topics(), ["music", "work"]);
    }

    #[test]
    fn recent_context_covers_only_the_window() {
        let mut memory = ConversationMemory::new();
        for i in 0..10 {
            memory.record(Role::User, format!("message {i}"));
        }
        let context = memory.recent_context();
        assert!(!context.contains("message 3"));
        assert!(context.contains("message 4"));
        assert!(context.contains("message 9"));
    }
}
