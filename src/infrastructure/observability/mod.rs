//! Push-based observability
//!
//! Metrics leave the process as outbound data only: a Prometheus registry
//! rendered on demand and a `METRICS_JSON:` line on stdout after each run.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
