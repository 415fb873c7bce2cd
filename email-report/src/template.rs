use crate::markdown::{escape_html, markdown_to_html, strip_tags};
use chrono::{DateTime, Utc};
use interfaces::RenderedReport;

pub const REPORT_TITLE: &str = "📊 Daily Market & News Intelligence";

const TRACKED_TICKERS: &str = "QQQ | SPY | UUP | IWM | GLD | COINBASE:BTCUSD | MP";

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            margin: 0;
            padding: 0;
            background-color: #f5f5f5;
            -webkit-text-size-adjust: 100%;
        }
        .container {
            background-color: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
            max-width: 800px;
            margin: 20px auto;
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            padding-bottom: 20px;
            border-bottom: 3px solid #2c3e50;
        }
        .header h1 {
            color: #2c3e50;
            margin: 0;
            font-size: 28px;
        }
        .meta {
            color: #666;
            font-size: 14px;
            text-align: center;
            margin-top: 10px;
            background-color: #f8f9fa;
            padding: 10px;
            border-radius: 5px;
        }
        h2 {
            color: #2c3e50;
            border-bottom: 2px solid #3498db;
            padding-bottom: 10px;
            margin-bottom: 20px;
            margin-top: 30px;
            font-size: 24px;
        }
        h3 {
            color: #2c3e50;
            font-size: 18px;
            margin-bottom: 10px;
            margin-top: 25px;
        }
        p {
            color: #444;
            margin: 10px 0;
        }
        .footer {
            margin-top: 40px;
            padding-top: 20px;
            border-top: 2px solid #eee;
            text-align: center;
            color: #666;
            font-size: 12px;
        }
        .status-good { color: #27ae60; }
        .status-warning { color: #f39c12; }
        .status-error { color: #e74c3c; }
        strong {
            color: #2c3e50;
            font-weight: 700;
        }
        @media screen and (max-width: 600px) {
            .container {
                width: 100% !important;
                margin: 0;
                padding: 15px;
                border-radius: 0;
                box-shadow: none;
            }
            .header h1 { font-size: 22px; }
            h2 { font-size: 20px; }
            h3 { font-size: 17px; }
            body { padding: 0 !important; }
        }
"#;

/// Counts shown in the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStats {
    pub article_count: usize,
    pub successful_feeds: usize,
    pub total_feeds: usize,
}

pub fn subject_line(now: DateTime<Utc>) -> String {
    format!("📊 Market Intelligence Brief - {}", now.format("%B %d, %Y"))
}

pub fn feed_status_indicator(successful: usize, total: usize) -> &'static str {
    if total == 0 {
        return r#" <span class="status-error">❌</span>"#;
    }
    if successful == total {
        r#" <span class="status-good">✅</span>"#
    } else if successful * 10 >= total * 8 {
        r#" <span class="status-warning">⚠️</span>"#
    } else {
        r#" <span class="status-error">❌</span>"#
    }
}

pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn create_html_email(
    analysis: &str,
    provider_label: &str,
    stats: ReportStats,
    generated_at: DateTime<Utc>,
) -> String {
    let analysis_html = markdown_to_html(analysis);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body style="padding: 20px 0;">
    <div class="container">
        <div class="header">
            <h1>{title}</h1>
            <div class="meta">
                <strong>Generated:</strong> {generated}<br>
                <strong>Analysis by:</strong> {provider}<br>
                <strong>Data Sources:</strong> {articles} articles from {ok}/{total} feeds{indicator}
            </div>
        </div>

        <div class="content">
{analysis_html}
        </div>

        <div class="footer">
            <p><strong>🤖 AI Market Intelligence System</strong></p>
            <p>Tracking: {tickers}</p>
            <p>This report was automatically generated with security-hardened data processing</p>
        </div>
    </div>
</body>
</html>
"#,
        title = escape_html(REPORT_TITLE),
        style = STYLE,
        generated = generated_at.format("%B %d, %Y at %I:%M %p UTC"),
        provider = escape_html(provider_label),
        articles = format_thousands(stats.article_count),
        ok = stats.successful_feeds,
        total = stats.total_feeds,
        indicator = feed_status_indicator(stats.successful_feeds, stats.total_feeds),
        tickers = TRACKED_TICKERS,
    )
}

pub fn render_report(
    analysis: &str,
    provider_label: &str,
    stats: ReportStats,
    generated_at: DateTime<Utc>,
) -> RenderedReport {
    let html = create_html_email(analysis, provider_label, stats, generated_at);
    let plain_text = strip_tags(analysis);
    RenderedReport::new(subject_line(generated_at), html, plain_text)
}
