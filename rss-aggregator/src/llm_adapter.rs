use crate::config::{AiConfig, ProviderKind};
use crate::providers::{AnthropicAdapter, GeminiAdapter, OpenAiAdapter};
use crate::types::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use interfaces::{AnalysisResult, FALLBACK_LABEL};
use tracing::{error, info, warn};

/// Trait for LLM adapters that can turn a prompt into report text
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Short name used in log lines
    fn adapter_name(&self) -> String;

    /// Human-readable label shown in the report
    fn label(&self) -> String;

    /// Perform one API call and return the raw text
    async fn request(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Like `request`, but logs the failure and yields `None` instead of an
    /// error. Whitespace-only text counts as a failure.
    async fn generate(&self, prompt: &str) -> Option<String> {
        match self.request(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) | Err(ProviderError::EmptyContent) => {
                warn!("Received empty response from {}", self.adapter_name());
                None
            }
            Err(ProviderError::Timeout) => {
                error!("{} API request timed out", self.adapter_name());
                None
            }
            Err(e) => {
                error!("{} request failed: {}", self.adapter_name(), e);
                None
            }
        }
    }
}

/// The one provider selected for a run.
pub enum Provider {
    OpenAi(OpenAiAdapter),
    Anthropic(AnthropicAdapter),
    Gemini(GeminiAdapter),
}

impl Provider {
    pub fn from_config(config: &AiConfig) -> Result<Self, ProviderError> {
        Ok(match config.provider {
            ProviderKind::OpenAi => Provider::OpenAi(OpenAiAdapter::new(config)?),
            ProviderKind::Anthropic => Provider::Anthropic(AnthropicAdapter::new(config)?),
            ProviderKind::Gemini => Provider::Gemini(GeminiAdapter::new(config)?),
        })
    }

    fn adapter(&self) -> &dyn LlmAdapter {
        match self {
            Provider::OpenAi(adapter) => adapter,
            Provider::Anthropic(adapter) => adapter,
            Provider::Gemini(adapter) => adapter,
        }
    }
}

#[async_trait]
impl LlmAdapter for Provider {
    fn adapter_name(&self) -> String {
        self.adapter().adapter_name()
    }

    fn label(&self) -> String {
        self.adapter().label()
    }

    async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        self.adapter().request(prompt).await
    }
}

pub struct AnalysisClient {
    provider: Option<Provider>,
}

impl AnalysisClient {
    /// Build the configured provider. A construction failure (usually a
    /// missing key) leaves the client running on the basic fallback.
    pub fn new(config: &AiConfig) -> Self {
        match Provider::from_config(config) {
            Ok(provider) => {
                info!("AI Client initialized with: {}", provider.label());
                Self::with_provider(Some(provider))
            }
            Err(e) => {
                error!("Failed to initialize configured AI provider: {}", e);
                warn!("No AI provider available - analysis will be basic");
                Self::with_provider(None)
            }
        }
    }

    pub fn with_provider(provider: Option<Provider>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate_analysis(&self, prompt: &str) -> AnalysisResult {
        if let Some(provider) = &self.provider {
            if let Some(text) = provider.generate(prompt).await {
                return AnalysisResult::new(text, provider.label());
            }
            warn!("{} returned empty analysis", provider.label());
        }

        warn!("AI provider failed - generating basic analysis");
        AnalysisResult::new(basic_analysis(&Local::now()), FALLBACK_LABEL)
    }

    pub fn close(self) {
        if let Some(provider) = self.provider {
            info!("Closing {} session", provider.adapter_name());
            drop(provider);
        }
    }
}

/// Placeholder report used when no provider produced text.
pub fn basic_analysis<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "**MARKET PERFORMANCE**
{}

**Note:** AI analysis unavailable. Please check API configuration.

**TOP MARKET & ECONOMY STORIES**
Unable to generate AI-powered analysis. Key market and economic themes
require AI integration for comprehensive coverage.

**GENERAL NEWS**
AI analysis required for detailed news categorization and sentiment analysis.

**Looking Ahead:**
Monitor for economic data releases and corporate earnings reports.",
        date.format("%B %d, %Y")
    )
}
