use super::{build_client, non_empty, require_key, send_json, SYSTEM_PROMPT};
use crate::config::AiConfig;
use crate::llm_adapter::LlmAdapter;
use crate::types::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    reasoning_effort: String,
    verbosity: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
    verbosity: &'a str,
    reasoning_effort: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl ChatResponse {
    pub(crate) fn into_text(self) -> Result<String, ProviderError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no choices found".to_string()))?
            .message
            .ok_or_else(|| ProviderError::Malformed("choice has no message".to_string()))?;
        non_empty(message.content)
    }
}

impl OpenAiAdapter {
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        let api_key = require_key(config)?;
        let adapter = Self {
            client: build_client(config)?,
            api_key,
            endpoint: format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            reasoning_effort: config.reasoning_effort.clone(),
            verbosity: config.verbosity.clone(),
        };
        info!(
            "OpenAI provider initialized: {} (reasoning: {}, verbosity: {})",
            adapter.model, adapter.reasoning_effort, adapter.verbosity
        );
        Ok(adapter)
    }
}

#[async_trait]
impl LlmAdapter for OpenAiAdapter {
    fn adapter_name(&self) -> String {
        format!("OpenAI {}", self.model)
    }

    fn label(&self) -> String {
        format!(
            "OpenAI {} ({} reasoning, {} verbosity)",
            self.model.to_uppercase(),
            self.reasoning_effort,
            self.verbosity
        )
    }

    async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        info!("Sending request to OpenAI {}...", self.model);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_completion_tokens: 4000,
            verbosity: &self.verbosity,
            reasoning_effort: &self.reasoning_effort,
        };

        let request = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&body);
        let response: ChatResponse = send_json(request, &self.adapter_name()).await?;

        let usage = response.usage.as_ref().map(|u| (u.prompt_tokens, u.completion_tokens, u.total_tokens));
        let text = response.into_text()?;
        if let Some((prompt_tokens, completion_tokens, total)) = usage {
            info!(
                "OpenAI {} usage - prompt: {}, completion: {}, total: {}",
                self.model, prompt_tokens, completion_tokens, total
            );
        }
        Ok(text)
    }
}
