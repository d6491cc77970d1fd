//! Push-based metrics reporter
//!
//! Emits a structured JSON snapshot to stdout after each processing run.

use crate::application::cache::{CacheStats, ModelCache, ModelCacheInfo, TtlCache};
use crate::application::monitoring::{BatchSummary, PerformanceMonitor};
use crate::infrastructure::observability::metrics::{
    FAILURE_REASONS, FALLBACK_REASONS, LABELS, Metrics, RULES,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub pipeline: PipelineSnapshot,
    pub cache: CacheStats,
    pub models: ModelCacheInfo,
}

#[derive(Serialize)]
pub struct PipelineSnapshot {
    pub verdicts_by_label: BTreeMap<String, u64>,
    pub decision_rules: BTreeMap<String, u64>,
    pub items_failed: u64,
    pub classifier_fallbacks: u64,
    pub quality: BatchSummary,
}

pub struct MetricsReporter {
    metrics: Metrics,
    cache: Arc<TtlCache>,
    models: Arc<ModelCache>,
    monitor: Arc<PerformanceMonitor>,
    start_time: Instant,
}

impl MetricsReporter {
    pub fn new(
        metrics: Metrics,
        cache: Arc<TtlCache>,
        models: Arc<ModelCache>,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            metrics,
            cache,
            models,
            monitor,
            start_time: Instant::now(),
        }
    }

    /// Collect current metrics snapshot
    pub fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        let cache = self.cache.stats();

        self.metrics.observe_cache(&cache);
        self.metrics.uptime_seconds.set(uptime as f64);

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            pipeline: PipelineSnapshot {
                verdicts_by_label: Metrics::counts(&self.metrics.verdicts_total, LABELS),
                decision_rules: Metrics::counts(&self.metrics.decision_rules_total, RULES),
                items_failed: Metrics::counter_total(
                    &self.metrics.items_failed_total,
                    FAILURE_REASONS,
                ),
                classifier_fallbacks: Metrics::counter_total(
                    &self.metrics.classifier_fallbacks_total,
                    FALLBACK_REASONS,
                ),
                quality: self.monitor.summary(),
            },
            cache,
            models: self.models.info(),
        }
    }

    /// Output one snapshot as a `METRICS_JSON:` line
    pub fn report(&self) {
        let snapshot = self.collect_snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                // Use a special prefix so logs can be easily filtered
                println!("METRICS_JSON:{}", json);
                info!(
                    "Verdicts: {} | Failed: {} | Cache hit rate: {:.1}%",
                    snapshot.pipeline.verdicts_by_label.values().sum::<u64>(),
                    snapshot.pipeline.items_failed,
                    snapshot.cache.hit_rate() * 100.0
                );
            }
            Err(e) => warn!("Failed to serialize metrics: {}", e),
        }
    }
}
