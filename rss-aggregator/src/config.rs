use crate::types::FetchConfig;
use email_report::sender::{MailConfig, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use interfaces::FeedSource;
use std::fmt;
use std::str::FromStr;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing email configuration: {}", .0.join(", "))]
    MissingMail(Vec<&'static str>),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn key_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => OPENAI_API_KEY,
            ProviderKind::Anthropic => ANTHROPIC_API_KEY,
            ProviderKind::Gemini => GEMINI_API_KEY,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-5-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-20241022",
            ProviderKind::Gemini => "gemini-2.5-flash",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "gemini" => Ok(ProviderKind::Gemini),
            _ => Err(ConfigError::Invalid {
                key: "AI_PROVIDER",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// The static provider-selection record plus the credential it needs.
#[derive(Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// minimal, low, medium, high (OpenAI only)
    pub reasoning_effort: String,
    /// low, medium, high (OpenAI only)
    pub verbosity: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl AiConfig {
    pub fn new(provider: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            reasoning_effort: "medium".to_string(),
            verbosity: "medium".to_string(),
            api_key,
            base_url: provider.default_base_url().to_string(),
            timeout_seconds: 120,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("verbosity", &self.verbosity)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feeds: Vec<FeedSource>,
    pub fetch: FetchConfig,
    pub ai: AiConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let sender_email = get(SENDER_EMAIL);
        let sender_password = get(SENDER_PASSWORD);
        let recipient_email = get(RECIPIENT_EMAIL);

        let missing: Vec<&'static str> = [
            (SENDER_EMAIL, sender_email.is_none()),
            (SENDER_PASSWORD, sender_password.is_none()),
            (RECIPIENT_EMAIL, recipient_email.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(sender_email), Some(sender_password), Some(recipient_email)) =
            (sender_email, sender_password, recipient_email)
        else {
            return Err(ConfigError::MissingMail(missing));
        };

        let smtp_port = match get("SMTP_PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                key: "SMTP_PORT",
                value: port.clone(),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let mail = MailConfig {
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            sender_email,
            sender_password,
            recipient_email,
            timeout_seconds: 60,
        };

        let provider = match get("AI_PROVIDER") {
            Some(name) => name.parse()?,
            None => ProviderKind::OpenAi,
        };

        let mut ai = AiConfig::new(provider, get(provider.key_var()));
        if let Some(model) = get("AI_MODEL") {
            ai.model = model;
        }
        if let Some(effort) = get("AI_REASONING_EFFORT") {
            ai.reasoning_effort = effort;
        }
        if let Some(verbosity) = get("AI_VERBOSITY") {
            ai.verbosity = verbosity;
        }

        Ok(Self {
            feeds: default_feeds(),
            fetch: FetchConfig::default(),
            ai,
            mail,
        })
    }
}

pub fn default_feeds() -> Vec<FeedSource> {
    [
        ("Federal Reserve - Commercial Paper", "https://www.federalreserve.gov/feeds/Data/CP_OUTST.xml"),
        ("Federal Reserve - Press Monetary", "https://www.federalreserve.gov/feeds/press_monetary.xml"),
        ("Fox News Latest", "https://feeds.feedburner.com/foxnews/latest"),
        ("The Hill Home News", "https://thehill.com/homenews/feed/"),
        ("Daily Caller", "https://dailycaller.com/feed/"),
        ("Daily Wire", "https://www.dailywire.com/feeds/rss.xml"),
        ("The Blaze", "https://www.theblaze.com/feeds/feed.rss"),
        ("News Busters", "https://newsbusters.org/blog/feed"),
        ("Daily Signal", "https://www.dailysignal.com/feed"),
        ("Newsmax Headlines", "https://www.newsmax.com/rss/Headline/76"),
        ("Newsmax Finance", "https://www.newsmax.com/rss/FinanceNews/4"),
        ("Newsmax Economy", "https://www.newsmax.com/rss/Economy/2"),
        ("Newsmax World", "https://www.newsmax.com/rss/GlobalTalk/162"),
        ("Newsmax US", "https://www.newsmax.com/rss/US/18"),
        ("Newsmax Tech", "https://www.newsmax.com/rss/SciTech/20"),
        ("Newsmax Wire", "https://www.newsmax.com/rss/TheWire/118"),
        ("Newsmax Politics", "https://www.newsmax.com/rss/Politics/1"),
        ("MarketWatch Top Stories", "https://feeds.content.dowjones.io/public/rss/mw_topstories"),
        ("MarketWatch Real-time", "https://feeds.content.dowjones.io/public/rss/mw_realtimeheadlines"),
        ("MarketWatch Market Pulse", "https://feeds.content.dowjones.io/public/rss/mw_marketpulse"),
        ("CNBC Markets", "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10000664"),
        ("CNBC Finance", "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=20910258"),
        ("CNBC Economy", "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=19854910"),
    ]
    .into_iter()
    .map(|(name, url)| FeedSource::new(name, url))
    .collect()
}
