use thiserror::Error;

/// Errors raised while loading the static lookup tables at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read {table} from {path}: {source}")]
    Io {
        table: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {table}: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed JSON in {table}: {source}")]
    Json {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{table} has no usable entries")]
    Empty { table: &'static str },
}

/// Errors isolated to a single news item.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No analyzable text for item {id}")]
    EmptyText { id: String },

    #[error("Sentiment classifier failed: {reason}")]
    ClassifierFailed { reason: String },

    #[error("Sentiment classifier timed out after {timeout_ms}ms")]
    ClassifierTimeout { timeout_ms: u64 },

    #[error("Failed to persist verdict {id}: {reason}")]
    SinkFailed { id: String, reason: String },

    #[error("Analysis of item {id} panicked: {reason}")]
    AnalysisPanicked { id: String, reason: String },
}
