use crate::domain::sentiment::SentimentResult;
use crate::domain::verdict::Verdict;
use anyhow::Result;
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Identifier used in cache fingerprints and logs.
    fn name(&self) -> &str;
    async fn classify(&self, text: &str) -> Result<SentimentResult>;
}

/// Acquisition collaborator used when an item's body is missing or too short.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Returns `None` when nothing could be fetched for `source`.
    async fn fetch_text(&self, source: &str) -> Option<String>;
}

/// Persistence collaborator. The pipeline only writes; it never reads verdicts back.
pub trait VerdictSink: Send + Sync {
    fn write(&self, verdict: &Verdict) -> Result<()>;
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
