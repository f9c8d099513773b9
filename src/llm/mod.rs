pub mod memory;

pub use memory::{ConversationMemory, ConversationTurn, Role};
