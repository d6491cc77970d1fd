//! Batch driver configuration: registry table locations, chunking and retry.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // Registry tables
    pub securities_path: String,
    pub rules_path: String,
    pub lexicon_path: String,
    pub categories_path: Option<String>,
    pub explanations_path: Option<String>,

    // Batching
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,

    // Collaborator bounds
    pub classifier_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            securities_path: "data/securities.csv".to_string(),
            rules_path: "data/financial_impact_rules.json".to_string(),
            lexicon_path: "data/SentiWord_Dict.txt".to_string(),
            categories_path: None,
            explanations_path: None,
            batch_size: 10,
            max_retries: 3,
            retry_delay_seconds: 5,
            classifier_timeout_ms: 5_000,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl PipelineConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be at least 1");
        }
        Ok(())
    }
}
