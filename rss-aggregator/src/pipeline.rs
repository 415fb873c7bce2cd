use crate::aggregator::FeedIngestor;
use crate::config::AppConfig;
use crate::llm_adapter::AnalysisClient;
use crate::prompt::build_prompt;
use anyhow::Context;
use chrono::Utc;
use email_report::{MailTransport, ReportSender, ReportStats};
use tracing::info;

/// What one run did, for the caller and for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub articles: usize,
    pub successful_feeds: usize,
    pub total_feeds: usize,
    pub provider_label: String,
    pub email_sent: bool,
}

/// Run the whole brief against a real SMTP relay.
pub async fn run(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let sender = ReportSender::connect(&config.mail).context("failed to set up mail transport")?;
    run_with_sender(config, sender).await
}

/// Ingest, analyse and mail with the given sender. Every component is
/// closed before returning.
pub async fn run_with_sender<T: MailTransport>(
    config: &AppConfig,
    sender: ReportSender<T>,
) -> anyhow::Result<RunSummary> {
    let ingestor = match FeedIngestor::new(&config.fetch) {
        Ok(ingestor) => ingestor,
        Err(e) => {
            sender.close();
            return Err(e).context("failed to set up feed ingestor");
        }
    };
    let analysis_client = AnalysisClient::new(&config.ai);

    info!("Step 1: Fetching news feeds...");
    let outcome = ingestor.fetch_all(&config.feeds).await;

    info!("Step 2: Generating AI analysis...");
    let prompt = build_prompt(&outcome.articles, &outcome.statuses, Utc::now());
    let analysis = analysis_client.generate_analysis(&prompt).await;
    info!("Analysis provided by: {}", analysis.provider_label);

    info!("Step 3: Sending email report...");
    let stats = ReportStats {
        article_count: outcome.articles.len(),
        successful_feeds: outcome.successful_feeds(),
        total_feeds: outcome.total_feeds(),
    };
    let email_sent = sender.send_report(&analysis, stats).await;

    ingestor.close();
    analysis_client.close();
    sender.close();

    Ok(RunSummary {
        articles: stats.article_count,
        successful_feeds: stats.successful_feeds,
        total_feeds: stats.total_feeds,
        provider_label: analysis.provider_label,
        email_sent,
    })
}
