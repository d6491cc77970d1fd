use crate::application::cache::{Fingerprint, TtlCache};
use crate::domain::ports::SentimentClassifier;
use crate::domain::sentiment::SentimentResult;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Memoizes classifier results in the shared result cache. Unavailable
/// results are not stored so a transient failure is retried next time.
pub struct CachedClassifier {
    inner: Arc<dyn SentimentClassifier>,
    cache: Arc<TtlCache>,
}

impl CachedClassifier {
    pub fn new(inner: Arc<dyn SentimentClassifier>, cache: Arc<TtlCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl SentimentClassifier for CachedClassifier {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let key = Fingerprint::builder("classify")
            .named("classifier", self.inner.name())
            .arg(text)
            .finish();

        if let Some(key) = &key
            && let Some(hit) = self.cache.get_as::<SentimentResult>(key)
        {
            debug!("CachedClassifier: cache hit for {}", key);
            return Ok(hit);
        }

        let result = self.inner.classify(text).await?;
        if let Some(key) = &key
            && result.is_available()
        {
            self.cache.set_as(key, &result);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{SentimentDistribution, SentimentLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingClassifier {
        calls: AtomicUsize,
        available: bool,
    }

    #[async_trait]
    impl SentimentClassifier for CountingClassifier {
        fn name(&self) -> &str {
            "counting"
        }

        async fn classify(&self, _text: &str) -> Result<SentimentResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.available {
                Ok(SentimentResult::new(
                    SentimentLabel::Positive,
                    0.9,
                    SentimentDistribution {
                        positive: 0.9,
                        negative: 0.05,
                        neutral: 0.05,
                    },
                ))
            } else {
                Ok(SentimentResult::unavailable("offline"))
            }
        }
    }

    fn setup(available: bool) -> (Arc<CountingClassifier>, CachedClassifier) {
        let inner = Arc::new(CountingClassifier {
            calls: AtomicUsize::new(0),
            available,
        });
        let cache = Arc::new(TtlCache::new(10, Duration::from_secs(60)));
        let cached = CachedClassifier::new(inner.clone(), cache);
        (inner, cached)
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let (inner, cached) = setup(true);
        let first = cached.classify("good news").await.unwrap();
        let second = cached.classify("good news").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_results_not_cached() {
        let (inner, cached) = setup(false);
        cached.classify("text").await.unwrap();
        cached.classify("text").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
