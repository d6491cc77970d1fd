use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// A loaded model (classifier, lexicon analyzer, ...) that can report its footprint.
pub trait ModelHandle: Send + Sync + 'static {
    fn estimated_size(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelMetadata {
    pub loaded_at: DateTime<Utc>,
    pub estimated_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCacheInfo {
    pub cached_models: Vec<String>,
    pub total_models: usize,
    pub metadata: BTreeMap<String, ModelMetadata>,
}

struct CachedModel {
    handle: Arc<dyn Any + Send + Sync>,
    metadata: ModelMetadata,
}

/// Keeps loaded model handles by name so each is loaded once per process.
#[derive(Default)]
pub struct ModelCache {
    models: RwLock<HashMap<String, CachedModel>>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("models", &"<RwLock>")
            .finish()
    }
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `name`, loading it with `loader` on first use.
    pub fn get_or_load<M, F>(&self, name: &str, loader: F) -> Result<Arc<M>>
    where
        M: ModelHandle,
        F: FnOnce() -> Result<M>,
    {
        if let Some(handle) = self.lookup::<M>(name)? {
            info!("ModelCache: Using cached model {}", name);
            return Ok(handle);
        }

        info!("ModelCache: Loading model {}", name);
        let model = loader()?;
        let metadata = ModelMetadata {
            loaded_at: Utc::now(),
            estimated_size: model.estimated_size(),
        };
        let handle: Arc<dyn Any + Send + Sync> = Arc::new(model);

        let mut models = match self.models.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("ModelCache: Lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        // Another caller may have finished loading first; keep theirs.
        let entry = models
            .entry(name.to_string())
            .or_insert(CachedModel { handle, metadata });
        downcast(name, entry.handle.clone())
    }

    fn lookup<M: ModelHandle>(&self, name: &str) -> Result<Option<Arc<M>>> {
        let models = match self.models.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match models.get(name) {
            Some(cached) => downcast(name, cached.handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn info(&self) -> ModelCacheInfo {
        let models = match self.models.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let metadata: BTreeMap<String, ModelMetadata> = models
            .iter()
            .map(|(name, cached)| (name.clone(), cached.metadata.clone()))
            .collect();
        ModelCacheInfo {
            cached_models: metadata.keys().cloned().collect(),
            total_models: metadata.len(),
            metadata,
        }
    }
}

fn downcast<M: ModelHandle>(name: &str, handle: Arc<dyn Any + Send + Sync>) -> Result<Arc<M>> {
    handle.downcast::<M>().map_err(|_| {
        anyhow::anyhow!(
            "Model '{}' is cached with a different type than requested",
            name
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeModel {
        weights: Vec<u8>,
    }

    impl ModelHandle for FakeModel {
        fn estimated_size(&self) -> usize {
            self.weights.len()
        }
    }

    struct OtherModel;

    impl ModelHandle for OtherModel {
        fn estimated_size(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_model_loaded_once() {
        let cache = ModelCache::new();
        let mut loads = 0;

        let first = cache
            .get_or_load("finbert", || {
                loads += 1;
                Ok(FakeModel {
                    weights: vec![0; 128],
                })
            })
            .unwrap();
        let second = cache
            .get_or_load("finbert", || {
                loads += 1;
                Ok(FakeModel { weights: vec![] })
            })
            .unwrap();

        assert_eq!(loads, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_info_reports_metadata() {
        let cache = ModelCache::new();
        cache
            .get_or_load("vader", || Ok(FakeModel { weights: vec![1; 10] }))
            .unwrap();

        let info = cache.info();
        assert_eq!(info.total_models, 1);
        assert_eq!(info.cached_models, vec!["vader".to_string()]);
        assert_eq!(info.metadata["vader"].estimated_size, 10);
    }

    #[test]
    fn test_loader_failure_is_not_cached() {
        let cache = ModelCache::new();
        let result: Result<Arc<FakeModel>> =
            cache.get_or_load("broken", || anyhow::bail!("weights missing"));
        assert!(result.is_err());
        assert_eq!(cache.info().total_models, 0);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let cache = ModelCache::new();
        cache
            .get_or_load("m", || Ok(FakeModel { weights: vec![] }))
            .unwrap();
        let result = cache.get_or_load("m", || Ok(OtherModel));
        assert!(result.is_err());
    }
}
