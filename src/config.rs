use anyhow::{anyhow, Result};
use std::env;

/// Runtime configuration, resolved once at startup from the environment
/// and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub memory_max_turns: usize,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env(api_key_override: Option<String>) -> Result<Self> {
        let openai_api_key = match api_key_override {
            Some(key) => key,
            None => env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY must be set (or passed via --api-key)"))?,
        };

        let chat_model = env::var("OPENAI_CHAT_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let chunk_size = env::var("CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);
        let chunk_overlap = env::var("CHUNK_OVERLAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let memory_max_turns = env::var("MEMORY_MAX_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(12);

        if chunk_overlap >= chunk_size {
            return Err(anyhow!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                chunk_overlap,
                chunk_size
            ));
        }

        Ok(Self {
            openai_api_key,
            chat_model,
            embedding_model,
            chunk_size,
            chunk_overlap,
            memory_max_turns,
            request_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_override_wins() {
        let config = AppConfig::from_env(Some("test-key".to_string())).unwrap();
        assert_eq!(config.openai_api_key, "test-key");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.memory_max_turns, 20);
    }
}
