//! Deterministic provider stand-in for tests. Embeds by hashed
//! bag-of-words so that token overlap between texts translates into
//! smaller L2 distance, and counts every call so tests can assert that
//! fast paths make no external requests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::llm::memory::ConversationTurn;
use crate::providers::traits::CompletionProvider;

pub const MOCK_EMBEDDING_DIM: usize = 384;

fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Unit-normalized hashed bag-of-words vector.
pub fn bag_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; MOCK_EMBEDDING_DIM];
    let lower = text.to_lowercase();
    for token in lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        vector[(fnv1a(token) % MOCK_EMBEDDING_DIM as u64) as usize] += 1.0;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

pub struct MockProvider {
    scripted: Mutex<VecDeque<String>>,
    default_response: String,
    fail_completions: bool,
    completion_calls: AtomicUsize,
    embedding_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_default("ok")
    }

    pub fn with_default(response: &str) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default_response: response.to_string(),
            fail_completions: false,
            completion_calls: AtomicUsize::new(0),
            embedding_calls: AtomicUsize::new(0),
        }
    }

    /// Every completion call will fail; embeddings still work.
    pub fn failing() -> Self {
        Self {
            fail_completions: true,
            ..Self::new()
        }
    }

    /// Queue a response; scripted responses are consumed in order before
    /// falling back to the default.
    pub fn push_response(&self, response: &str) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(response.to_string());
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }

    pub fn embedding_calls(&self) -> usize {
        self.embedding_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn chat(
        &self,
        _system: &str,
        _history: &[ConversationTurn],
        _prompt: &str,
    ) -> Result<String> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_completions {
            bail!("mock completion failure");
        }
        let scripted = self.scripted.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| self.default_response.clone()))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.embedding_calls.fetch_add(1, Ordering::SeqCst);
        Ok(bag_embedding(text))
    }

    fn model_info(&self) -> String {
        "mock".to_string()
    }
}
