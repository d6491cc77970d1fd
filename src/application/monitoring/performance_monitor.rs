//! Per-item quality metrics and per-batch summaries.
//!
//! Quality warnings are advisory: they are logged and recorded but never
//! change a verdict. Grading uses stricter thresholds than warnings and
//! scores each passed check at 25 points.

use crate::domain::quality::{QualityIssue, QualityReport};
use crate::domain::verdict::Verdict;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};

pub const MIN_SENTIMENT_CONFIDENCE: f64 = 0.5;
pub const MIN_EXTRACTION_CONFIDENCE: f64 = 0.6;
pub const MIN_KEYWORD_DIVERSITY: usize = 3;
pub const MAX_PROCESSING_TIME: Duration = Duration::from_secs(10);

pub const GRADE_SENTIMENT_CONFIDENCE: f64 = 0.6;
pub const GRADE_EXTRACTION_CONFIDENCE: f64 = 0.7;
pub const GRADE_KEYWORD_DIVERSITY: usize = 3;
pub const GRADE_PROCESSING_TIME: Duration = Duration::from_secs(5);
const POINTS_PER_CHECK: u8 = 25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub item_id: String,
    pub sentiment_confidence: f64,
    pub keyword_diversity: usize,
    pub extraction_confidence: f64,
    pub processing_time_ms: u64,
    pub text_length: usize,
    pub security_count: usize,
    pub keyword_count: usize,
}

impl QualityMetrics {
    pub fn from_verdict(verdict: &Verdict, text_length: usize, elapsed: Duration) -> Self {
        let distinct: BTreeSet<&str> = verdict
            .keyword_hits
            .iter()
            .map(|h| h.keyword.as_str())
            .chain(
                verdict
                    .financial_keywords
                    .iter()
                    .flat_map(|c| c.keywords.iter().map(String::as_str)),
            )
            .collect();

        Self {
            item_id: verdict.id.clone(),
            sentiment_confidence: verdict.sentiment.valid_score().unwrap_or(0.0),
            keyword_diversity: distinct.len(),
            extraction_confidence: verdict.top_security_confidence(),
            processing_time_ms: elapsed.as_millis() as u64,
            text_length,
            security_count: verdict.related_securities.len(),
            keyword_count: verdict.keyword_hits.len(),
        }
    }

    pub fn warnings(&self) -> Vec<QualityIssue> {
        self.failed_checks(
            MIN_SENTIMENT_CONFIDENCE,
            MIN_EXTRACTION_CONFIDENCE,
            MIN_KEYWORD_DIVERSITY,
            MAX_PROCESSING_TIME,
        )
    }

    /// Grades the item against the stricter grading thresholds.
    pub fn assess(&self) -> QualityReport {
        let issues = self.failed_checks(
            GRADE_SENTIMENT_CONFIDENCE,
            GRADE_EXTRACTION_CONFIDENCE,
            GRADE_KEYWORD_DIVERSITY,
            GRADE_PROCESSING_TIME,
        );
        let score = (4 - issues.len() as u8) * POINTS_PER_CHECK;
        QualityReport::new(score, issues)
    }

    fn failed_checks(
        &self,
        min_sentiment: f64,
        min_extraction: f64,
        min_diversity: usize,
        max_time: Duration,
    ) -> Vec<QualityIssue> {
        let mut issues = Vec::new();
        if self.sentiment_confidence < min_sentiment {
            issues.push(QualityIssue::LowSentimentConfidence);
        }
        if self.extraction_confidence < min_extraction {
            issues.push(QualityIssue::LowExtractionConfidence);
        }
        if self.keyword_diversity < min_diversity {
            issues.push(QualityIssue::LowKeywordDiversity);
        }
        if self.processing_time_ms > max_time.as_millis() as u64 {
            issues.push(QualityIssue::SlowProcessing);
        }
        issues
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub avg_processing_time_ms: f64,
    pub avg_quality_score: f64,
    pub warning_count: usize,
}

#[derive(Default)]
struct MonitorState {
    records: Vec<QualityMetrics>,
    failed: usize,
    warning_count: usize,
}

pub struct PerformanceMonitor {
    state: Mutex<MonitorState>,
    log_warnings: bool,
}

// Manual Debug implementation for PerformanceMonitor
impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("log_warnings", &self.log_warnings)
            .finish()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PerformanceMonitor {
    pub fn new(log_warnings: bool) -> Self {
        Self {
            state: Mutex::new(MonitorState::default()),
            log_warnings,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MonitorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("PerformanceMonitor: state lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Records one item and returns the quality warnings it raised.
    pub fn record(&self, metrics: QualityMetrics) -> Vec<QualityIssue> {
        let warnings = metrics.warnings();
        if self.log_warnings {
            for w in &warnings {
                warn!(
                    "PerformanceMonitor: {} quality warning {:?} (sentiment={:.2}, extraction={:.2}, diversity={}, time={}ms)",
                    metrics.item_id,
                    w,
                    metrics.sentiment_confidence,
                    metrics.extraction_confidence,
                    metrics.keyword_diversity,
                    metrics.processing_time_ms
                );
            }
        }
        let mut state = self.lock();
        state.warning_count += warnings.len();
        state.records.push(metrics);
        warnings
    }

    pub fn record_failure(&self) {
        self.lock().failed += 1;
    }

    pub fn summary(&self) -> BatchSummary {
        let state = self.lock();
        let processed = state.records.len();
        let total = processed + state.failed;
        let success_rate = if total == 0 {
            0.0
        } else {
            processed as f64 / total as f64
        };
        let average = |value: fn(&QualityMetrics) -> f64| {
            if processed == 0 {
                0.0
            } else {
                state.records.iter().map(value).sum::<f64>() / processed as f64
            }
        };
        BatchSummary {
            processed,
            failed: state.failed,
            success_rate,
            avg_processing_time_ms: average(|r| r.processing_time_ms as f64),
            avg_quality_score: average(|r| r.assess().score as f64),
            warning_count: state.warning_count,
        }
    }

    pub fn log_summary(&self) {
        let s = self.summary();
        info!(
            "PerformanceMonitor: processed={} failed={} success_rate={:.1}% avg_time={:.1}ms avg_quality={:.1} warnings={}",
            s.processed,
            s.failed,
            s.success_rate * 100.0,
            s.avg_processing_time_ms,
            s.avg_quality_score,
            s.warning_count
        );
    }
}
