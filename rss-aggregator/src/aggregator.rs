use crate::types::{FeedError, FetchConfig};
use crate::{FeedParser, Fetcher};
use futures::stream::{self, StreamExt};
use interfaces::{count_successful, Article, FeedSource, FeedStatus};
use tracing::{error, info};

/// Everything one ingestion pass produced.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub articles: Vec<Article>,
    /// One entry per configured feed, in configuration order.
    pub statuses: Vec<FeedStatus>,
}

impl IngestOutcome {
    pub fn successful_feeds(&self) -> usize {
        count_successful(&self.statuses)
    }

    pub fn total_feeds(&self) -> usize {
        self.statuses.len()
    }
}

pub struct FeedIngestor {
    fetcher: Fetcher,
    parser: FeedParser,
    max_concurrent_fetches: usize,
}

impl FeedIngestor {
    pub fn new(config: &FetchConfig) -> Result<Self, FeedError> {
        Ok(Self {
            fetcher: Fetcher::new(config.clone())?,
            parser: FeedParser::new(config.max_articles_per_feed),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        })
    }

    async fn try_ingest(&self, source: &FeedSource) -> Result<Vec<Article>, FeedError> {
        let body = self.fetcher.fetch_feed(source).await?;
        let parsed = self.parser.parse_feed(&source.name, &body)?;
        Ok(parsed.articles)
    }

    /// Fetch and parse a single feed. Never fails: errors become the status.
    pub async fn ingest_source(&self, source: &FeedSource) -> (FeedStatus, Vec<Article>) {
        info!("Fetching feed: {}", source.name);

        match self.try_ingest(source).await {
            Ok(articles) => {
                info!("Successfully parsed {} articles from {}", articles.len(), source.name);
                (FeedStatus::success(&source.name, articles.len()), articles)
            }
            Err(e) => {
                let status = FeedStatus::failure(&source.name, e.kind(), e.to_string());
                error!("{}", status);
                (status, Vec::new())
            }
        }
    }

    pub async fn fetch_all(&self, sources: &[FeedSource]) -> IngestOutcome {
        info!("Starting to fetch {} RSS feeds...", sources.len());

        // `buffered` keeps results in source order even when fetches overlap.
        let results: Vec<(FeedStatus, Vec<Article>)> = stream::iter(sources)
            .map(|source| self.ingest_source(source))
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut outcome = IngestOutcome::default();
        for (status, articles) in results {
            outcome.statuses.push(status);
            outcome.articles.extend(articles);
        }

        info!(
            "Completed RSS ingestion: {} total articles from {}/{} feeds",
            outcome.articles.len(),
            outcome.successful_feeds(),
            outcome.total_feeds()
        );
        outcome
    }

    pub fn close(self) {
        info!("Closing feed ingestor HTTP session");
        drop(self.fetcher);
    }
}
