//! Batch driver: prepares items against the async collaborators, runs the
//! pure analysis on rayon and persists verdicts through the sink.
//!
//! A failing item never aborts its chunk, including a panic inside its
//! analysis; a failing chunk (analysis worker lost) is retried with a fixed
//! delay before its items are reported as failed.

use crate::application::monitoring::{PerformanceMonitor, QualityMetrics};
use crate::application::pipeline::analyzer::NewsAnalyzer;
use crate::config::PipelineConfig;
use crate::domain::errors::AnalysisError;
use crate::domain::news::{AnalysisDocument, NewsItem, is_usable_body};
use crate::domain::ports::{SentimentClassifier, TextSource, VerdictSink};
use crate::domain::sentiment::SentimentResult;
use crate::domain::verdict::Verdict;
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use futures::future::join_all;
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct ItemFailure {
    pub id: String,
    pub error: AnalysisError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub verdicts: Vec<Verdict>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub written: usize,
    pub failed: usize,
    pub chunks_retried: usize,
}

type AnalyzedItem = Result<(Verdict, usize, Duration), AnalysisError>;

struct PreparedItem {
    item: NewsItem,
    document: AnalysisDocument,
    sentiment: SentimentResult,
    prepare_time: Duration,
}

pub struct BatchProcessor {
    analyzer: Arc<NewsAnalyzer>,
    classifier: Arc<dyn SentimentClassifier>,
    text_source: Option<Arc<dyn TextSource>>,
    monitor: Arc<PerformanceMonitor>,
    metrics: Option<Metrics>,
    config: PipelineConfig,
}

impl BatchProcessor {
    pub fn new(
        analyzer: Arc<NewsAnalyzer>,
        classifier: Arc<dyn SentimentClassifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            analyzer,
            classifier,
            text_source: None,
            monitor: Arc::new(PerformanceMonitor::default()),
            metrics: None,
            config,
        }
    }

    pub fn with_text_source(mut self, source: Arc<dyn TextSource>) -> Self {
        self.text_source = Some(source);
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Analyzes one chunk. Per-item failures land in the outcome; only a
    /// lost analysis worker is reported as `Err`.
    pub async fn process_batch(&self, items: &[NewsItem]) -> Result<BatchOutcome> {
        let prepared = join_all(items.iter().map(|item| self.prepare(item))).await;

        let mut outcome = BatchOutcome::default();
        let mut ready = Vec::with_capacity(prepared.len());
        for (item, result) in items.iter().zip(prepared) {
            match result {
                Ok(p) => ready.push(p),
                Err(error) => {
                    warn!("BatchProcessor: item {} failed: {}", item.id, error);
                    outcome.failures.push(ItemFailure {
                        id: item.id.clone(),
                        error,
                    });
                }
            }
        }

        let analyzer = self.analyzer.clone();
        let analyzed: Vec<(String, AnalyzedItem)> = tokio::task::spawn_blocking(move || {
            ready
                .into_par_iter()
                .map(|p| {
                    let id = p.item.id.clone();
                    let result = isolate(&id, || {
                        let started = Instant::now();
                        let text_length = p.document.text.chars().count();
                        let verdict = analyzer.analyze(&p.item, &p.document, p.sentiment);
                        (verdict, text_length, p.prepare_time + started.elapsed())
                    });
                    (id, result)
                })
                .collect()
        })
        .await
        .context("Analysis worker failed")?;

        for (id, result) in analyzed {
            let (mut verdict, text_length, elapsed) = match result {
                Ok(done) => done,
                Err(error) => {
                    error!("BatchProcessor: {}", error);
                    outcome.failures.push(ItemFailure { id, error });
                    continue;
                }
            };
            let quality = QualityMetrics::from_verdict(&verdict, text_length, elapsed);
            verdict.analysis_quality = Some(quality.assess());
            self.monitor.record(quality);
            if let Some(metrics) = &self.metrics {
                metrics.record_verdict(
                    verdict.final_label,
                    verdict.decision_rule,
                    elapsed.as_secs_f64(),
                );
            }
            outcome.verdicts.push(verdict);
        }

        for failure in &outcome.failures {
            self.record_failure(&failure.error);
        }

        debug!(
            "BatchProcessor: chunk done ({} verdicts, {} failures)",
            outcome.verdicts.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Processes all items in chunks of `batch_size` and writes verdicts to `sink`.
    pub async fn run(&self, items: Vec<NewsItem>, sink: &dyn VerdictSink) -> Result<RunReport> {
        let mut report = RunReport {
            total: items.len(),
            ..Default::default()
        };
        let batch_size = self.config.batch_size.max(1);

        for (index, chunk) in items.chunks(batch_size).enumerate() {
            info!(
                "BatchProcessor: processing chunk {} ({} items)",
                index + 1,
                chunk.len()
            );

            let Some(outcome) = self.process_with_retry(index, chunk, &mut report).await else {
                report.failed += chunk.len();
                for _ in chunk {
                    self.monitor.record_failure();
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_failed("chunk_exhausted");
                    }
                }
                continue;
            };

            report.failed += outcome.failures.len();
            for verdict in &outcome.verdicts {
                match sink.write(verdict) {
                    Ok(()) => report.written += 1,
                    Err(e) => {
                        let error = AnalysisError::SinkFailed {
                            id: verdict.id.clone(),
                            reason: e.to_string(),
                        };
                        error!("BatchProcessor: {}", error);
                        self.record_failure(&error);
                        report.failed += 1;
                    }
                }
            }
        }

        sink.flush().context("Failed to flush verdict sink")?;
        info!(
            "BatchProcessor: run complete ({} written, {} failed of {})",
            report.written, report.failed, report.total
        );
        Ok(report)
    }

    async fn process_with_retry(
        &self,
        index: usize,
        chunk: &[NewsItem],
        report: &mut RunReport,
    ) -> Option<BatchOutcome> {
        let attempts = self.config.max_retries.max(1);
        for attempt in 1..=attempts {
            match self.process_batch(chunk).await {
                Ok(outcome) => return Some(outcome),
                Err(e) if attempt < attempts => {
                    warn!(
                        "BatchProcessor: chunk {} attempt {}/{} failed: {:#}. Retrying in {:?}",
                        index + 1,
                        attempt,
                        attempts,
                        e,
                        self.config.retry_delay()
                    );
                    report.chunks_retried += 1;
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => {
                    error!(
                        "BatchProcessor: chunk {} abandoned after {} attempts: {:#}",
                        index + 1,
                        attempts,
                        e
                    );
                }
            }
        }
        None
    }

    async fn prepare(&self, item: &NewsItem) -> Result<PreparedItem, AnalysisError> {
        let started = Instant::now();
        let fetched = self.fetch_fallback(item).await;
        let content = fetched.as_deref().or(item.content.as_deref());

        let document = AnalysisDocument::compose(&item.title, content);
        if document.is_empty() {
            return Err(AnalysisError::EmptyText {
                id: item.id.clone(),
            });
        }

        let sentiment = self.classify(&item.id, &document.text).await;
        Ok(PreparedItem {
            item: item.clone(),
            document,
            sentiment,
            prepare_time: started.elapsed(),
        })
    }

    /// Fetched text when the item body is missing or too short.
    async fn fetch_fallback(&self, item: &NewsItem) -> Option<String> {
        if item.usable_content().is_some() {
            return None;
        }
        let source = self.text_source.as_ref()?;
        let link = item.link.as_deref().filter(|l| !l.trim().is_empty())?;

        match tokio::time::timeout(self.config.fetch_timeout(), source.fetch_text(link)).await {
            Ok(Some(text)) if is_usable_body(&text) => {
                debug!("BatchProcessor: fetched body for {} from {}", item.id, link);
                Some(text)
            }
            Ok(_) => {
                debug!("BatchProcessor: no usable body fetched for {}", item.id);
                None
            }
            Err(_) => {
                warn!("BatchProcessor: fetching {} timed out", link);
                None
            }
        }
    }

    async fn classify(&self, id: &str, text: &str) -> SentimentResult {
        let timeout = self.config.classifier_timeout();
        let error = match tokio::time::timeout(timeout, self.classifier.classify(text)).await {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => AnalysisError::ClassifierFailed {
                reason: e.to_string(),
            },
            Err(_) => AnalysisError::ClassifierTimeout {
                timeout_ms: timeout.as_millis() as u64,
            },
        };

        warn!("BatchProcessor: {} using unavailable sentiment: {}", id, error);
        if let Some(metrics) = &self.metrics {
            let reason = match &error {
                AnalysisError::ClassifierTimeout { .. } => "timeout",
                _ => "error",
            };
            metrics.inc_classifier_fallback(reason);
        }
        SentimentResult::unavailable(error.to_string())
    }

    fn record_failure(&self, error: &AnalysisError) {
        self.monitor.record_failure();
        if let Some(metrics) = &self.metrics {
            let reason = match error {
                AnalysisError::EmptyText { .. } => "empty_text",
                AnalysisError::SinkFailed { .. } => "sink",
                AnalysisError::AnalysisPanicked { .. } => "panic",
                _ => "classifier",
            };
            metrics.inc_failed(reason);
        }
    }
}

/// Runs `f`, turning a panic into a failure for item `id` alone.
fn isolate<T>(id: &str, f: impl FnOnce() -> T) -> Result<T, AnalysisError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        AnalysisError::AnalysisPanicked {
            id: id.to_string(),
            reason,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::TtlCache;
    use crate::config::ExtractionConfig;
    use crate::domain::lexicon::{Impact, Lexicon, RuleEntry, SecurityRecord};
    use crate::domain::quality::QualityIssue;
    use crate::domain::sentiment::{SentimentDistribution, SentimentLabel};
    use crate::domain::verdict::DecisionRule;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FixedClassifier {
        label: SentimentLabel,
        score: f64,
        delay: Duration,
    }

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(&self, _text: &str) -> Result<SentimentResult> {
            tokio::time::sleep(self.delay).await;
            Ok(SentimentResult::new(
                self.label,
                self.score,
                SentimentDistribution {
                    positive: self.score,
                    negative: 0.0,
                    neutral: 1.0 - self.score,
                },
            ))
        }
    }

    struct StaticSource(String);

    #[async_trait]
    impl TextSource for StaticSource {
        async fn fetch_text(&self, _source: &str) -> Option<String> {
            Some(self.0.clone())
        }
    }

    #[derive(Default)]
    struct VecSink {
        written: Mutex<Vec<Verdict>>,
        fail_id: Option<String>,
    }

    impl VerdictSink for VecSink {
        fn write(&self, verdict: &Verdict) -> Result<()> {
            if self.fail_id.as_deref() == Some(verdict.id.as_str()) {
                anyhow::bail!("disk full");
            }
            self.written.lock().unwrap().push(verdict.clone());
            Ok(())
        }
    }

    fn analyzer() -> Arc<NewsAnalyzer> {
        let lexicon = Lexicon::new(
            vec![SecurityRecord {
                name: "Acme".to_string(),
                code: "000001".to_string(),
                sector: "Industrials".to_string(),
            }],
            vec![RuleEntry {
                keyword: "recall".to_string(),
                impact: Impact::Negative,
            }],
            HashSet::new(),
            HashSet::new(),
        );
        Arc::new(NewsAnalyzer::new(
            Arc::new(lexicon),
            ExtractionConfig::default(),
            Arc::new(TtlCache::new(100, Duration::from_secs(60))),
        ))
    }

    fn processor(classifier: FixedClassifier, config: PipelineConfig) -> BatchProcessor {
        BatchProcessor::new(analyzer(), Arc::new(classifier), config)
    }

    fn item(id: &str, title: &str, content: Option<&str>) -> NewsItem {
        NewsItem {
            id: id.to_string(),
            source: "wire".to_string(),
            title: title.to_string(),
            content: content.map(str::to_string),
            link: Some(format!("https://news.example/{}", id)),
            published: None,
        }
    }

    fn quick() -> FixedClassifier {
        FixedClassifier {
            label: SentimentLabel::Positive,
            score: 0.95,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_empty_item_fails_without_aborting_batch() {
        let processor = processor(quick(), PipelineConfig::default());
        let items = vec![
            item("a", "Acme wins award", None),
            item("b", "   ", None),
            item("c", "Acme opens plant", None),
        ];

        let outcome = processor.process_batch(&items).await.unwrap();

        let ids: Vec<&str> = outcome.verdicts.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].error,
            AnalysisError::EmptyText { .. }
        ));
        assert_eq!(processor.monitor().summary().failed, 1);
    }

    #[test]
    fn test_panicking_item_is_isolated() {
        let results: Vec<Result<usize, AnalysisError>> = vec!["a", "b", "c"]
            .into_par_iter()
            .map(|id| {
                isolate(id, || {
                    if id == "b" {
                        panic!("lexicon index out of range");
                    }
                    id.len()
                })
            })
            .collect();

        assert_eq!(results[0].as_ref().ok(), Some(&1));
        assert_eq!(results[2].as_ref().ok(), Some(&1));
        match &results[1] {
            Err(AnalysisError::AnalysisPanicked { id, reason }) => {
                assert_eq!(id, "b");
                assert_eq!(reason, "lexicon index out of range");
            }
            other => panic!("expected panic failure, got {:?}", other),
        }
    }

    #[test]
    fn test_formatted_panic_message_is_kept() {
        let err = isolate("x", || -> usize { panic!("bad offset {}", 7) }).unwrap_err();
        assert!(err.to_string().contains("bad offset 7"));
    }

    #[tokio::test]
    async fn test_verdicts_carry_quality_report() {
        let processor = processor(quick(), PipelineConfig::default());
        let outcome = processor
            .process_batch(&[item("a", "Acme wins award", None)])
            .await
            .unwrap();

        let quality = outcome.verdicts[0].analysis_quality.as_ref().unwrap();
        // Title match (0.9) and confident classifier pass, no keyword diversity
        assert_eq!(quality.score, 75);
        assert_eq!(quality.issues, vec![QualityIssue::LowKeywordDiversity]);
        assert_eq!(processor.monitor().summary().avg_quality_score, 75.0);
    }

    #[tokio::test]
    async fn test_classifier_timeout_falls_through_ladder() {
        let config = PipelineConfig {
            classifier_timeout_ms: 10,
            ..Default::default()
        };
        let slow = FixedClassifier {
            delay: Duration::from_secs(5),
            ..quick()
        };
        let processor = processor(slow, config);

        let outcome = processor
            .process_batch(&[item("a", "Acme quarterly update", None)])
            .await
            .unwrap();

        let verdict = &outcome.verdicts[0];
        assert_eq!(verdict.sentiment.score, None);
        assert_eq!(verdict.decision_rule, DecisionRule::SentimentFallback);
        assert_eq!(verdict.final_label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_short_body_replaced_by_fetched_text() {
        let fetched = "Regulators ordered a recall after inspections found defects in several production lines.";
        let processor = processor(quick(), PipelineConfig::default())
            .with_text_source(Arc::new(StaticSource(fetched.to_string())));

        let outcome = processor
            .process_batch(&[item("a", "Acme update", Some("short"))])
            .await
            .unwrap();

        let verdict = &outcome.verdicts[0];
        assert_eq!(verdict.final_label, SentimentLabel::Negative);
        assert_eq!(verdict.decision_rule, DecisionRule::LeadKeywordNegative);
    }

    #[tokio::test]
    async fn test_run_writes_verdicts_and_counts_sink_failures() {
        let config = PipelineConfig {
            batch_size: 2,
            ..Default::default()
        };
        let processor = processor(quick(), config);
        let sink = VecSink {
            fail_id: Some("b".to_string()),
            ..Default::default()
        };
        let items = vec![
            item("a", "Acme one", None),
            item("b", "Acme two", None),
            item("c", "Acme three", None),
        ];

        let report = processor.run(items, &sink).await.unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 1);
        let written: Vec<String> = sink
            .written
            .lock()
            .unwrap()
            .iter()
            .map(|v| v.id.clone())
            .collect();
        assert_eq!(written, vec!["a", "c"]);
    }
}
