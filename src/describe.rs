use crate::errors::BridgeError;
use crate::settings::Description;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Turns a filter prompt into a readable description of the search.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BridgeError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Chat-completions backed generator; works against any OpenAI-compatible API.
pub struct OpenAiDescriber {
    config: Description,
    http: reqwest::Client,
}

impl OpenAiDescriber {
    pub fn new(config: Description) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DescriptionGenerator for OpenAiDescriber {
    async fn generate(&self, prompt: &str) -> Result<String, BridgeError> {
        if self.config.api_key.is_empty() {
            return Err(BridgeError::Unavailable(
                "description generation has no API key configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: 512,
            temperature: 0.7,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Other(format!(
                "description API error ({}): {}",
                status, body
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BridgeError::Other("description API returned no choices".to_string()))
    }
}
