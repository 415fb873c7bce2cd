use crate::rss_utils::text::clean_description;
use crate::types::{FeedError, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use interfaces::{Article, Published, NO_TITLE};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

static ENTITY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("entity pattern is valid")
});

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub articles: Vec<Article>,
    /// Set when the document only parsed after repair.
    pub bozo: Option<String>,
}

pub struct FeedParser {
    max_entries: usize,
}

impl FeedParser {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    pub fn parse_feed(&self, source_name: &str, content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed {} ({} bytes)", source_name, content.len());

        // feed-rs accepts a bare '&' but silently empties the text around it,
        // so that defect is repaired up front instead of on parse failure.
        let (feed, bozo) = match find_bare_ampersand(&String::from_utf8_lossy(content)) {
            Some(offset) => {
                let cause = format!("unescaped '&' at byte {}", offset);
                let feed = parser::parse(repair_xml(content).as_bytes())
                    .map_err(|e| FeedError::Parse(format!("{} ({})", e, cause)))?;
                (feed, Some(cause))
            }
            None => match parser::parse(content) {
                Ok(feed) => (feed, None),
                Err(first_error) => {
                    let repaired = repair_xml(content);
                    match parser::parse(repaired.as_bytes()) {
                        Ok(feed) => (feed, Some(first_error.to_string())),
                        Err(_) => return Err(FeedError::Parse(first_error.to_string())),
                    }
                }
            },
        };

        if let Some(cause) = &bozo {
            warn!("Feed {} has parsing issues: {}", source_name, cause);
        }

        let title = feed.title.map(|t| t.content);
        let articles = feed
            .entries
            .into_iter()
            .take(self.max_entries)
            .filter_map(|entry| entry_to_article(entry, source_name))
            .collect();

        Ok(ParsedFeed {
            title,
            articles,
            bozo,
        })
    }
}

pub fn is_meaningful_title(title: &str) -> bool {
    !title.is_empty() && title != NO_TITLE && title.chars().count() > 3
}

fn entry_to_article(entry: Entry, source_name: &str) -> Option<Article> {
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string());

    if !is_meaningful_title(&title) {
        debug!("Skipping entry without a usable title from {}", source_name);
        return None;
    }

    let raw_description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    let published = entry
        .published
        .or(entry.updated)
        .map(|at| Published::At(at.naive_utc()))
        .unwrap_or(Published::Unknown);

    let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();

    Some(Article {
        title,
        description: clean_description(&raw_description),
        published,
        source: source_name.to_string(),
        link,
    })
}

/// Byte offset of the first '&' outside CDATA that does not start an entity.
fn find_bare_ampersand(text: &str) -> Option<usize> {
    let mut index = 0;
    while let Some(found) = text[index..].find(['&', '<']) {
        let at = index + found;
        let tail = &text[at..];
        if tail.starts_with(CDATA_OPEN) {
            index = at + tail.find(CDATA_CLOSE)? + CDATA_CLOSE.len();
        } else if tail.starts_with('&') && !ENTITY_START.is_match(tail) {
            return Some(at);
        } else {
            index = at + 1;
        }
    }
    None
}

fn is_forbidden_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Best-effort cleanup of the defects that most often break feed XML:
/// junk before the first tag, control characters XML forbids, and bare
/// ampersands. CDATA sections keep their ampersands.
pub fn repair_xml(content: &[u8]) -> String {
    let text = String::from_utf8_lossy(content);
    let text = match text.find('<') {
        Some(start) => &text[start..],
        None => &text[..],
    };

    let mut repaired = String::with_capacity(text.len() + 16);
    let mut index = 0;
    while let Some(c) = text[index..].chars().next() {
        let tail = &text[index..];
        if tail.starts_with(CDATA_OPEN) {
            let end = tail.find(CDATA_CLOSE).map_or(tail.len(), |end| end + CDATA_CLOSE.len());
            repaired.extend(tail[..end].chars().filter(|&c| !is_forbidden_control(c)));
            index += end;
            continue;
        }
        match c {
            c if is_forbidden_control(c) => {}
            '&' if !ENTITY_START.is_match(tail) => repaired.push_str("&amp;"),
            _ => repaired.push(c),
        }
        index += c.len_utf8();
    }
    repaired
}
