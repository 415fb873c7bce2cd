use rss_aggregator::{pipeline, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    info!("Starting market intelligence brief");

    let config = AppConfig::from_env().map_err(|e| {
        error!("{}", e);
        e
    })?;

    let summary = pipeline::run(&config).await?;
    info!(
        "Run finished: {} articles from {}/{} feeds, analysis by {}",
        summary.articles, summary.successful_feeds, summary.total_feeds, summary.provider_label
    );

    if !summary.email_sent {
        anyhow::bail!("report email was not sent");
    }

    info!("Market intelligence brief delivered");
    Ok(())
}
