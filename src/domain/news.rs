use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bodies at or below this many characters are treated as missing.
pub const MIN_BODY_CHARS: usize = 50;

/// Number of body characters that count as the article lead.
pub const LEAD_CHARS: usize = 100;

/// A raw news item handed to the pipeline by the acquisition layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

impl NewsItem {
    /// Body text when it is long enough to analyze.
    pub fn usable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| is_usable_body(c))
    }
}

pub fn is_usable_body(body: &str) -> bool {
    body.trim().chars().count() > MIN_BODY_CHARS
}

/// Title, body and the combined text the analysis components scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub title: String,
    pub content: String,
    pub text: String,
}

impl AnalysisDocument {
    /// Combined text is `content + " " + title` when the body is usable,
    /// otherwise the title alone.
    pub fn compose(title: &str, content: Option<&str>) -> Self {
        match content.filter(|c| is_usable_body(c)) {
            Some(body) => Self {
                title: title.to_string(),
                content: body.to_string(),
                text: format!("{} {}", body, title),
            },
            None => Self {
                title: title.to_string(),
                content: String::new(),
                text: title.to_string(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First [`LEAD_CHARS`] characters of the body.
    pub fn lead(&self) -> &str {
        prefix_chars(&self.content, LEAD_CHARS)
    }
}

/// Longest prefix of `s` holding at most `n` characters.
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
