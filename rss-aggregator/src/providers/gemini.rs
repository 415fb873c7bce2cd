use super::{build_client, non_empty, require_key, send_json, SYSTEM_PROMPT};
use crate::config::AiConfig;
use crate::llm_adapter::LlmAdapter;
use crate::types::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const TIME_OF_DAY_HINT: &str = "Make sure to take into account the current time of day for your analysis.";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    candidate_count: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

impl GenerateResponse {
    pub(crate) fn into_text(self) -> Result<String, ProviderError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no candidates found".to_string()))?;
        let part = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .ok_or_else(|| ProviderError::Malformed("no content found".to_string()))?;
        non_empty(part.text)
    }
}

impl GeminiAdapter {
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        let api_key = require_key(config)?;
        let adapter = Self {
            client: build_client(config)?,
            api_key,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
        };
        info!("Gemini provider initialized: {}", adapter.model);
        Ok(adapter)
    }

    fn build_request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: format!("{} {}\n\n{}", SYSTEM_PROMPT, TIME_OF_DAY_HINT, prompt),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 12000,
                candidate_count: 1,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                })
                .collect(),
        }
    }
}

#[async_trait]
impl LlmAdapter for GeminiAdapter {
    fn adapter_name(&self) -> String {
        format!("Gemini {}", self.model)
    }

    fn label(&self) -> String {
        format!("Google {}", self.model)
    }

    async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        info!("Sending request to Google {}...", self.model);

        let request = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request(prompt));
        let response: GenerateResponse = send_json(request, &self.adapter_name()).await?;

        let usage = response
            .usage_metadata
            .as_ref()
            .map(|u| (u.prompt_token_count, u.candidates_token_count, u.total_token_count));
        let text = response.into_text()?;
        if let Some((prompt_tokens, response_tokens, total)) = usage {
            info!(
                "Gemini {} usage - prompt: {}, response: {}, total: {}",
                self.model, prompt_tokens, response_tokens, total
            );
        }
        Ok(text)
    }
}
