//! Helpers shared by the fetcher and the parser.

/// Feed URL checks
pub mod url {
    use url::Url;

    /// Lower-cased host name, if the URL has one
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str)
            .ok()
            .and_then(|url| url.domain().map(|d| d.to_lowercase()))
    }

    /// True when the URL's host is `domain` or one of its subdomains
    pub fn matches_domain(url_str: &str, domain: &str) -> bool {
        match extract_domain(url_str) {
            Some(host) => host == domain || host.ends_with(&format!(".{}", domain)),
            None => false,
        }
    }

    /// Only http and https feeds are fetched
    pub fn is_valid_rss_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}

/// Entry text cleanup
pub mod text {
    use regex::Regex;
    use std::sync::LazyLock;

    pub const DESCRIPTION_LIMIT: usize = 300;
    pub const ELLIPSIS: &str = "...";

    static TAG_PATTERN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

    /// Decode named and numeric character references left in feed text.
    pub fn decode_entities(text: &str) -> String {
        html_escape::decode_html_entities(text).into_owned()
    }

    /// Drop tags, decode entities and collapse whitespace.
    pub fn strip_markup(html: &str) -> String {
        let without_tags = TAG_PATTERN.replace_all(html, "");
        decode_entities(&without_tags)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cut to `limit` characters and mark the cut with an ellipsis.
    /// Applying it twice gives the same result as applying it once.
    pub fn truncate_description(text: &str, limit: usize) -> String {
        if text.chars().count() <= limit {
            return text.to_string();
        }
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    }

    pub fn clean_description(raw: &str) -> String {
        truncate_description(&strip_markup(raw), DESCRIPTION_LIMIT)
    }
}
