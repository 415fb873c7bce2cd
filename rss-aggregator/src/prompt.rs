use chrono::{DateTime, Utc};
use interfaces::{Article, FeedStatus};
use std::fmt::Write as _;

const INSTRUCTIONS: &str = "\
Write a daily market and news intelligence brief from the articles below.
Use these sections, each introduced by a bold heading:

**MARKET PERFORMANCE** - how equities, bonds, commodities and currencies are trading.
**TOP MARKET & ECONOMY STORIES** - the most important business and economic developments, with why they matter.
**GENERAL NEWS** - significant political and world events that could affect markets.
**Looking Ahead:** - scheduled data releases, earnings and risks to watch.

Be specific, cite the source outlet for each claim, and do not invent figures that are not in the articles.";

/// Assemble the single prompt sent to the analysis provider.
pub fn build_prompt(articles: &[Article], statuses: &[FeedStatus], now: DateTime<Utc>) -> String {
    let mut prompt = String::with_capacity(1024 + articles.len() * 512);

    let _ = writeln!(prompt, "Current time: {}", now.format("%A, %B %d, %Y %H:%M UTC"));
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nFEED STATUS:\n");
    for status in statuses {
        let _ = writeln!(prompt, "{}", status);
    }

    let _ = writeln!(prompt, "\nARTICLES ({} total):", articles.len());
    for (index, article) in articles.iter().enumerate() {
        let _ = writeln!(prompt, "\n{}. {}", index + 1, article.title);
        let _ = writeln!(prompt, "   Source: {} | Published: {}", article.source, article.published);
        if !article.description.is_empty() {
            let _ = writeln!(prompt, "   {}", article.description);
        }
        if !article.link.is_empty() {
            let _ = writeln!(prompt, "   Link: {}", article.link);
        }
    }

    prompt
}
