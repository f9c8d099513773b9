use anyhow::Result;
use async_trait::async_trait;

use crate::llm::memory::ConversationTurn;

/// Boundary to the completion/embedding service. Everything the core needs
/// from an LLM deployment goes through this trait, so the retrieval engine
/// can be exercised with a deterministic stand-in under test.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Single-shot completion with an explicit system prompt.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(system, &[], prompt).await
    }

    /// Completion with prior conversation turns threaded into the request.
    async fn chat(
        &self,
        system: &str,
        history: &[ConversationTurn],
        prompt: &str,
    ) -> Result<String>;

    /// Embed a text into a fixed-length vector. Must be deterministic for
    /// identical input within a session.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;

    fn model_info(&self) -> String;
}
