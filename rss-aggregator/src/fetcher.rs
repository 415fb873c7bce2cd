use crate::rss_utils;
use crate::types::{FeedError, FetchConfig, Result};
use backoff::backoff::{Backoff, Constant};
use interfaces::FeedSource;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/rss+xml, application/xml, text/xml;q=0.9, */*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FeedError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn is_slow_source(&self, url: &str) -> bool {
        self.config
            .slow_domains
            .iter()
            .any(|domain| rss_utils::url::matches_domain(url, domain))
    }

    pub fn timeout_for(&self, url: &str) -> Duration {
        if self.is_slow_source(url) {
            Duration::from_secs(self.config.slow_timeout_seconds)
        } else {
            Duration::from_secs(self.config.timeout_seconds)
        }
    }

    /// Download one feed body. A 429 answer is retried once after the
    /// configured backoff; any other non-success status fails immediately.
    pub async fn fetch_feed(&self, source: &FeedSource) -> Result<Vec<u8>> {
        if !rss_utils::url::is_valid_rss_url(&source.url) {
            return Err(FeedError::Network(format!("invalid feed URL '{}'", source.url)));
        }

        let start_time = Instant::now();
        let timeout = self.timeout_for(&source.url);

        if self.is_slow_source(&source.url) && self.config.slow_domain_delay_ms > 0 {
            let delay = Duration::from_millis(self.config.slow_domain_delay_ms);
            debug!("{}: known slow host, waiting {:?} before request", source.name, delay);
            tokio::time::sleep(delay).await;
        }

        let mut backoff = Constant::new(Duration::from_millis(self.config.rate_limit_backoff_ms));
        let mut response = self.get(&source.url, timeout).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            if let Some(delay) = backoff.next_backoff() {
                warn!("{}: Rate limited (429), retrying in {:?}", source.name, delay);
                tokio::time::sleep(delay).await;
                response = self.get(&source.url, timeout).await?;
            }
        }

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::from_reqwest(e, timeout.as_secs()))?;

        info!(
            "Fetched feed {} ({} bytes in {} ms)",
            source.name,
            body.len(),
            start_time.elapsed().as_millis()
        );
        Ok(body.to_vec())
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response> {
        self.client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(e, timeout.as_secs()))
    }
}
