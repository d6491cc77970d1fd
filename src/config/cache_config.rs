use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds for the fingerprinted result cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl_seconds: 3600,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_size == 0 {
            anyhow::bail!("CACHE_MAX_SIZE must be at least 1");
        }
        Ok(())
    }
}
