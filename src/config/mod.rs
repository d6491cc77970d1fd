//! Configuration module for newsimpact.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file
//! (path from `NEWS_IMPACT_CONFIG`), then scalar overrides from environment
//! variables. Organized by concern: Extraction, Cache, Pipeline, Observability.

mod cache_config;
mod extraction_config;
mod observability_config;
mod pipeline_config;

pub use cache_config::CacheConfig;
pub use extraction_config::ExtractionConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use pipeline_config::PipelineConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::str::FromStr;

/// Environment variable naming the optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "NEWS_IMPACT_CONFIG";

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from the optional TOML file and environment variables.
    pub fn from_env() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR).ok();
        Self::load(path.as_deref(), |key| env::var(key).ok())
    }

    /// Load from an explicit file path (if any), applying overrides from `lookup`.
    pub fn load<F>(path: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Failed to parse config TOML: {}", path))?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply scalar overrides. Unset keys keep their current value; set but
    /// unparsable keys are an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Extraction
        if let Some(v) = parse_var(&lookup, "MAX_TITLE_LENGTH")? {
            self.extraction.max_title_length = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONTENT_LENGTH")? {
            self.extraction.max_content_length = v;
        }
        if let Some(v) = parse_var(&lookup, "MIN_CONFIDENCE")? {
            self.extraction.min_confidence = v;
        }
        if let Some(list) = lookup("BLACKLIST") {
            self.extraction.blacklist = split_list(&list).collect();
        }

        // Cache
        if let Some(v) = parse_var(&lookup, "CACHE_MAX_SIZE")? {
            self.cache.max_size = v;
        }
        if let Some(v) = parse_var(&lookup, "CACHE_TTL_SECONDS")? {
            self.cache.ttl_seconds = v;
        }

        // Pipeline
        if let Some(v) = lookup("SECURITIES_PATH") {
            self.pipeline.securities_path = v;
        }
        if let Some(v) = lookup("RULES_PATH") {
            self.pipeline.rules_path = v;
        }
        if let Some(v) = lookup("LEXICON_PATH") {
            self.pipeline.lexicon_path = v;
        }
        if let Some(v) = lookup("CATEGORIES_PATH") {
            self.pipeline.categories_path = Some(v);
        }
        if let Some(v) = lookup("EXPLANATIONS_PATH") {
            self.pipeline.explanations_path = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "BATCH_SIZE")? {
            self.pipeline.batch_size = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_RETRIES")? {
            self.pipeline.max_retries = v;
        }
        if let Some(v) = parse_var(&lookup, "RETRY_DELAY_SECONDS")? {
            self.pipeline.retry_delay_seconds = v;
        }
        if let Some(v) = parse_var(&lookup, "CLASSIFIER_TIMEOUT_MS")? {
            self.pipeline.classifier_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "FETCH_TIMEOUT_MS")? {
            self.pipeline.fetch_timeout_ms = v;
        }

        // Observability
        if let Some(v) = parse_var(&lookup, "OBSERVABILITY_ENABLED")? {
            self.observability.enabled = v;
        }
        if let Some(v) = parse_var(&lookup, "QUALITY_WARNINGS")? {
            self.observability.quality_warnings = v;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.extraction
            .validate()
            .context("Invalid extraction config")?;
        self.cache.validate().context("Invalid cache config")?;
        self.pipeline.validate().context("Invalid pipeline config")?;
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}={}: {}", key, raw, e)),
        None => Ok(None),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
