use interfaces::FailureKind;
use std::error::Error as _;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Timeout for hosts listed in `slow_domains`.
    pub slow_timeout_seconds: u64,
    pub slow_domains: Vec<String>,
    pub slow_domain_delay_ms: u64,
    pub rate_limit_backoff_ms: u64,
    pub max_articles_per_feed: usize,
    pub max_concurrent_fetches: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_seconds: 15,
            slow_timeout_seconds: 10,
            slow_domains: vec!["newsmax.com".to_string()],
            slow_domain_delay_ms: 2_000,
            rate_limit_backoff_ms: 5_000,
            max_articles_per_feed: 5,
            max_concurrent_fetches: 1,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Network error - {0}")]
    Network(String),

    #[error("Network error - HTTP {status}")]
    Http { status: u16 },

    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    #[error("Parse error - {0}")]
    Parse(String),
}

impl FeedError {
    pub fn from_reqwest(err: reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            FeedError::Timeout {
                seconds: timeout_seconds,
            }
        } else {
            FeedError::Network(error_chain(&err.without_url()))
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FeedError::Timeout { .. } => FailureKind::Timeout,
            FeedError::Network(_) | FeedError::Http { .. } => FailureKind::Network,
            FeedError::RateLimited => FailureKind::RateLimited,
            FeedError::Parse(_) => FailureKind::Parse,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not found in environment")]
    MissingCredential(&'static str),

    #[error("HTTP client could not be built: {0}")]
    Client(String),

    #[error("API request timed out")]
    Timeout,

    #[error("API network error: {0}")]
    Network(String),

    #[error("API error: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response structure - {0}")]
    Malformed(String),

    #[error("Received empty response")]
    EmptyContent,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Gemini carries its key in the query string, so URLs never reach the logs.
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(error_chain(&err))
        } else {
            ProviderError::Network(error_chain(&err))
        }
    }
}

/// Render an error together with its sources, e.g. the DNS or TLS cause
/// behind a reqwest connect error.
pub fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub type Result<T> = std::result::Result<T, FeedError>;
