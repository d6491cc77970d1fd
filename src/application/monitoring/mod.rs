// Per-item quality metrics and batch summaries
pub mod performance_monitor;

pub use performance_monitor::{BatchSummary, PerformanceMonitor, QualityMetrics};
