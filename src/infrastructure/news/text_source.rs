use crate::domain::ports::TextSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Article bodies keyed by link, for offline runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTextSource {
    articles: HashMap<String, String>,
}

impl InMemoryTextSource {
    pub fn new(articles: HashMap<String, String>) -> Self {
        Self { articles }
    }

    /// Loads a JSON object `{link: body}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let articles: HashMap<String, String> = serde_json::from_str(&content)?;
        info!(
            "InMemoryTextSource: loaded {} articles from {}",
            articles.len(),
            path.display()
        );
        Ok(Self::new(articles))
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[async_trait]
impl TextSource for InMemoryTextSource {
    async fn fetch_text(&self, source: &str) -> Option<String> {
        self.articles.get(source).cloned()
    }
}

/// Source that never has text; items fall back to their titles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTextSource;

#[async_trait]
impl TextSource for NoopTextSource {
    async fn fetch_text(&self, _source: &str) -> Option<String> {
        None
    }
}
