use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, EmbeddingInput, Role,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::AppConfig;
use crate::llm::memory::{ConversationTurn, Role as TurnRole};
use crate::providers::traits::CompletionProvider;

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
    request_timeout: Duration,
}

impl OpenAIProvider {
    pub fn new(config: &AppConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
        let client = Client::with_config(openai_config);

        Self {
            client,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: 0.3,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn timeout_error(&self) -> anyhow::Error {
        anyhow!(
            "OpenAI request timed out after {}s",
            self.request_timeout.as_secs()
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn chat(
        &self,
        system: &str,
        history: &[ConversationTurn],
        prompt: &str,
    ) -> Result<String> {
        let mut messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                role: Role::System,
                content: system.to_string(),
                name: None,
            },
        )];

        for turn in history {
            match turn.role {
                TurnRole::User => {
                    messages.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            role: Role::User,
                            content: ChatCompletionRequestUserMessageContent::Text(
                                turn.content.clone(),
                            ),
                            name: None,
                        },
                    ));
                }
                TurnRole::Assistant => {
                    messages.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            role: Role::Assistant,
                            content: Some(turn.content.clone()),
                            name: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    ));
                }
            }
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                role: Role::User,
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            },
        ));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let response = timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| self.timeout_error())??;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No response content"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()?;

        let response = timeout(
            self.request_timeout,
            self.client.embeddings().create(request),
        )
        .await
        .map_err(|_| self.timeout_error())??;

        if let Some(embedding) = response.data.first() {
            Ok(embedding.embedding.clone())
        } else {
            Err(anyhow!("No embedding returned from OpenAI"))
        }
    }

    fn model_info(&self) -> String {
        self.chat_model.clone()
    }
}
