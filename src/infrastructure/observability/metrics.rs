//! Prometheus metrics definitions for the news impact pipeline
//!
//! All metrics use the `newsimpact_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::cache::CacheStats;
use crate::domain::sentiment::SentimentLabel;
use crate::domain::verdict::DecisionRule;

pub const LABELS: &[&str] = &["positive", "negative", "neutral"];
pub const RULES: &[&str] = &[
    "lead_keyword_negative",
    "lead_keyword_positive",
    "high_confidence_sentiment",
    "repeated_keyword",
    "sentiment_fallback",
];
pub const FAILURE_REASONS: &[&str] = &[
    "empty_text",
    "classifier",
    "sink",
    "panic",
    "chunk_exhausted",
];
pub const FALLBACK_REASONS: &[&str] = &["timeout", "error"];

/// Prometheus metrics for a processing run
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Verdicts produced, by final label
    pub verdicts_total: CounterVec,
    /// Fusion rules that decided a verdict
    pub decision_rules_total: CounterVec,
    /// Items that could not be analyzed, by reason
    pub items_failed_total: CounterVec,
    /// Classifier calls replaced by an unavailable result
    pub classifier_fallbacks_total: CounterVec,
    /// Per-item processing time in seconds
    pub processing_seconds: Histogram,
    /// Result cache hits since start
    pub cache_hits: GenericGauge<AtomicF64>,
    /// Result cache misses since start
    pub cache_misses: GenericGauge<AtomicF64>,
    /// Live result cache entries
    pub cache_entries: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let verdicts_total = CounterVec::new(
            Opts::new("newsimpact_verdicts_total", "Verdicts produced by final label"),
            &["label"],
        )?;
        registry.register(Box::new(verdicts_total.clone()))?;

        let decision_rules_total = CounterVec::new(
            Opts::new(
                "newsimpact_decision_rules_total",
                "Fusion rules that decided the final label",
            ),
            &["rule"],
        )?;
        registry.register(Box::new(decision_rules_total.clone()))?;

        let items_failed_total = CounterVec::new(
            Opts::new("newsimpact_items_failed_total", "Items that failed analysis"),
            &["reason"],
        )?;
        registry.register(Box::new(items_failed_total.clone()))?;

        let classifier_fallbacks_total = CounterVec::new(
            Opts::new(
                "newsimpact_classifier_fallbacks_total",
                "Classifier calls that fell back to an unavailable result",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(classifier_fallbacks_total.clone()))?;

        let processing_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "newsimpact_processing_seconds",
                "Per-item processing time in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(processing_seconds.clone()))?;

        let cache_hits = Gauge::with_opts(Opts::new(
            "newsimpact_cache_hits",
            "Result cache hits since start",
        ))?;
        registry.register(Box::new(cache_hits.clone()))?;

        let cache_misses = Gauge::with_opts(Opts::new(
            "newsimpact_cache_misses",
            "Result cache misses since start",
        ))?;
        registry.register(Box::new(cache_misses.clone()))?;

        let cache_entries = Gauge::with_opts(Opts::new(
            "newsimpact_cache_entries",
            "Live result cache entries",
        ))?;
        registry.register(Box::new(cache_entries.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "newsimpact_uptime_seconds",
            "Process uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            verdicts_total,
            decision_rules_total,
            items_failed_total,
            classifier_fallbacks_total,
            processing_seconds,
            cache_hits,
            cache_misses,
            cache_entries,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_verdict(&self, label: SentimentLabel, rule: DecisionRule, seconds: f64) {
        self.verdicts_total
            .with_label_values(&[label.to_string().as_str()])
            .inc();
        self.decision_rules_total
            .with_label_values(&[rule.as_str()])
            .inc();
        self.processing_seconds.observe(seconds);
    }

    pub fn inc_failed(&self, reason: &str) {
        self.items_failed_total.with_label_values(&[reason]).inc();
    }

    pub fn inc_classifier_fallback(&self, reason: &str) {
        self.classifier_fallbacks_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Mirror cache counters into the registry
    pub fn observe_cache(&self, stats: &CacheStats) {
        self.cache_hits.set(stats.hits as f64);
        self.cache_misses.set(stats.misses as f64);
        self.cache_entries.set(stats.count as f64);
    }

    /// Current value of each listed series of a labelled counter
    pub fn counts(counter: &CounterVec, labels: &[&str]) -> BTreeMap<String, u64> {
        labels
            .iter()
            .map(|label| {
                let value = counter.with_label_values(&[*label]).get();
                (label.to_string(), value as u64)
            })
            .filter(|(_, value)| *value > 0)
            .collect()
    }

    /// Sum of the listed series of a labelled counter
    pub fn counter_total(counter: &CounterVec, labels: &[&str]) -> u64 {
        Self::counts(counter, labels).values().sum()
    }
}
