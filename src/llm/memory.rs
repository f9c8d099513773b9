use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Sliding window of recent conversation turns. Append/evict only —
/// a stored turn is never mutated.
pub struct ConversationMemory {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
        }
    }

    pub fn add(&mut self, role: Role, content: &str) {
        self.turns.push_back(ConversationTurn {
            role,
            content: content.to_string(),
        });
        // Keep only the last max_turns
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// The most recent `last_n` turns in chronological order.
    pub fn get_context(&self, last_n: usize) -> Vec<ConversationTurn> {
        let skip = self.turns.len().saturating_sub(last_n);
        self.turns.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
