//! Conversion of the analysis text into safe HTML.
//!
//! Only `**bold**`, `## h2` and `### h3` are recognised. They are lifted out
//! of the raw text into placeholder tokens before anything is escaped, so the
//! text between the markers is escaped on its own and can never smuggle tags
//! into the output.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use uuid::Uuid;

static BOLD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("bold pattern is valid"));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

// Private-use code points delimit placeholder tokens.
const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// Escape text for element content and quoted attributes alike, so `&`,
/// `<`, `>` and both quote characters never reach the document raw.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Remove anything that looks like a tag. Used for the plain-text alternative.
pub fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderLevel {
    H2,
    H3,
}

impl HeaderLevel {
    fn tag(self) -> &'static str {
        match self {
            HeaderLevel::H2 => "h2",
            HeaderLevel::H3 => "h3",
        }
    }
}

struct Placeholders {
    nonce: String,
}

impl Placeholders {
    /// Draw a nonce that does not occur anywhere in `text`.
    fn for_input(text: &str) -> Self {
        loop {
            let nonce = Uuid::new_v4().simple().to_string();
            if !text.contains(&nonce) {
                return Self { nonce };
            }
        }
    }

    fn bold(&self, index: usize) -> String {
        format!("{TOKEN_OPEN}B{}:{index}{TOKEN_CLOSE}", self.nonce)
    }

    fn header(&self, index: usize) -> String {
        format!("{TOKEN_OPEN}H{}:{index}{TOKEN_CLOSE}", self.nonce)
    }

    fn header_index(&self, line: &str) -> Option<usize> {
        let prefix = format!("{TOKEN_OPEN}H{}:", self.nonce);
        line.strip_prefix(prefix.as_str())?
            .strip_suffix(TOKEN_CLOSE)?
            .parse()
            .ok()
    }
}

fn header_line(line: &str) -> Option<(HeaderLevel, &str)> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("###") {
        Some((HeaderLevel::H3, rest.trim()))
    } else {
        trimmed.strip_prefix("##").map(|rest| (HeaderLevel::H2, rest.trim()))
    }
}

/// Convert markdown-ish analysis text into HTML paragraphs and headers.
pub fn markdown_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n");
    let placeholders = Placeholders::for_input(&text);

    let mut bold_spans: Vec<String> = Vec::new();
    let text = BOLD_PATTERN.replace_all(&text, |caps: &Captures| {
        bold_spans.push(caps[1].to_string());
        placeholders.bold(bold_spans.len() - 1)
    });

    let mut headers: Vec<(HeaderLevel, String)> = Vec::new();
    let text = text
        .split('\n')
        .map(|line| match header_line(line) {
            Some((level, content)) => {
                headers.push((level, content.to_string()));
                placeholders.header(headers.len() - 1)
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    // Tokens survive escaping untouched: they contain no escapable characters.
    let escaped = escape_html(&text);

    let mut blocks: Vec<String> = Vec::new();
    for paragraph in escaped.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let mut pending: Vec<&str> = Vec::new();
        for line in paragraph.split('\n') {
            match placeholders.header_index(line.trim()) {
                Some(index) => {
                    flush_paragraph(&mut pending, &mut blocks);
                    let (level, content) = &headers[index];
                    blocks.push(format!("<{tag}>{}</{tag}>", escape_html(content), tag = level.tag()));
                }
                None => pending.push(line),
            }
        }
        flush_paragraph(&mut pending, &mut blocks);
    }

    let mut html = blocks.join("\n");
    for (index, inner) in bold_spans.iter().enumerate() {
        html = html.replace(
            &placeholders.bold(index),
            &format!("<strong>{}</strong>", escape_html(inner)),
        );
    }
    html
}

fn flush_paragraph(pending: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let body = pending.join("<br>");
    pending.clear();
    if !body.trim().is_empty() {
        blocks.push(format!("<p>{}</p>", body.trim()));
    }
}
