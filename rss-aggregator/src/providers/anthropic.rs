use super::{build_client, non_empty, require_key, send_json};
use crate::config::AiConfig;
use crate::llm_adapter::LlmAdapter;
use crate::types::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl MessagesResponse {
    pub(crate) fn into_text(self) -> Result<String, ProviderError> {
        let block = self
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no content blocks found".to_string()))?;
        non_empty(block.text)
    }
}

impl AnthropicAdapter {
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        let api_key = require_key(config)?;
        let adapter = Self {
            client: build_client(config)?,
            api_key,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        };
        info!("Anthropic provider initialized: {}", adapter.model);
        Ok(adapter)
    }
}

#[async_trait]
impl LlmAdapter for AnthropicAdapter {
    fn adapter_name(&self) -> String {
        format!("Anthropic {}", self.model)
    }

    fn label(&self) -> String {
        self.adapter_name()
    }

    async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        info!("Sending request to Anthropic {}...", self.model);

        let body = MessagesRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: 4000,
            temperature: 0.7,
        };

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let response: MessagesResponse = send_json(request, &self.adapter_name()).await?;

        let usage = response.usage.as_ref().map(|u| (u.input_tokens, u.output_tokens));
        let text = response.into_text()?;
        if let Some((input, output)) = usage {
            info!("Anthropic {} usage - input: {}, output: {}", self.model, input, output);
        }
        Ok(text)
    }
}
