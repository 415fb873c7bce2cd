use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used by feeds that omit an entry title.
pub const NO_TITLE: &str = "No title";

/// Label attached to the analysis produced without any AI provider.
pub const FALLBACK_LABEL: &str = "Basic Analysis (No AI)";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Published {
    At(NaiveDateTime),
    Unknown,
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::At(at) => write!(f, "{}", at.format("%Y-%m-%dT%H:%M:%S")),
            Published::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub published: Published,
    pub source: String,
    pub link: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Timeout,
    Network,
    Parse,
    RateLimited,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedOutcome {
    Success { articles: usize },
    Failure { kind: FailureKind, cause: String },
}

/// Result of one feed attempt. Exactly one is produced per configured feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub source: String,
    pub outcome: FeedOutcome,
}

impl FeedStatus {
    pub fn success(source: impl Into<String>, articles: usize) -> Self {
        Self {
            source: source.into(),
            outcome: FeedOutcome::Success { articles },
        }
    }

    pub fn failure(source: impl Into<String>, kind: FailureKind, cause: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcome: FeedOutcome::Failure {
                kind,
                cause: cause.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FeedOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            FeedOutcome::Success { .. } => None,
            FeedOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            FeedOutcome::Success { articles } => write!(f, "✅ {} ({} articles)", self.source, articles),
            FeedOutcome::Failure { cause, .. } => write!(f, "❌ {}: {}", self.source, cause),
        }
    }
}

pub fn count_successful(statuses: &[FeedStatus]) -> usize {
    statuses.iter().filter(|status| status.is_success()).count()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub provider_label: String,
}

impl AnalysisResult {
    pub fn new(text: impl Into<String>, provider_label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_label: provider_label.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provider_label == FALLBACK_LABEL
    }
}

// A rendered report is built once and handed to the sender by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    subject: String,
    html: String,
    plain_text: String,
}

impl RenderedReport {
    pub fn new(subject: String, html: String, plain_text: String) -> Self {
        Self {
            subject,
            html,
            plain_text,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn into_parts(self) -> (String, String, String) {
        (self.subject, self.html, self.plain_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn status_lines_match_report_format() {
        let ok = FeedStatus::success("CNBC Markets", 5);
        assert_eq!(ok.to_string(), "✅ CNBC Markets (5 articles)");

        let failed = FeedStatus::failure("Daily Wire", FailureKind::Timeout, "Timeout after 15 seconds");
        assert_eq!(failed.to_string(), "❌ Daily Wire: Timeout after 15 seconds");
        assert_eq!(failed.failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(count_successful(&[ok, failed]), 1);
    }

    #[test]
    fn published_renders_iso_or_unknown() {
        let at = NaiveDate::from_ymd_opt(2025, 10, 6)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .map(Published::At)
            .unwrap();
        assert_eq!(at.to_string(), "2025-10-06T14:05:09");
        assert_eq!(Published::Unknown.to_string(), "unknown");
    }

    #[test]
    fn fallback_label_is_detected() {
        assert!(AnalysisResult::new("text", FALLBACK_LABEL).is_fallback());
        assert!(!AnalysisResult::new("text", "Anthropic claude-3-5-haiku-20241022").is_fallback());
    }
}
