pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use crate::config::AiConfig;
use crate::types::ProviderError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, info};

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a professional financial market analyst. Provide comprehensive analysis with deep reasoning.";

pub(crate) fn build_client(config: &AiConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

pub(crate) fn require_key(config: &AiConfig) -> Result<String, ProviderError> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or(ProviderError::MissingCredential(config.provider.key_var()))
}

/// Send a JSON request and decode the success body. Non-success answers are
/// logged with whatever error body the API returned.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    label: &str,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    info!("{} response status: {}", label, status.as_u16());

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("{} API error: {}", label, status.as_u16());
        error!("Error details: {}", body);
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}

pub(crate) fn non_empty(content: Option<String>) -> Result<String, ProviderError> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyContent),
    }
}
