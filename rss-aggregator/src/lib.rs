pub mod aggregator;
pub mod config;
pub mod fetcher;
pub mod llm_adapter;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod rss_utils;
pub mod types;

pub use aggregator::{FeedIngestor, IngestOutcome};
pub use config::{AiConfig, AppConfig, ConfigError, ProviderKind};
pub use fetcher::Fetcher;
pub use llm_adapter::{AnalysisClient, LlmAdapter, Provider};
pub use parser::{FeedParser, ParsedFeed};
pub use pipeline::RunSummary;
pub use types::*;
