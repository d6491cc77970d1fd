pub mod fingerprint;
pub mod model_cache;
pub mod ttl_cache;

pub use fingerprint::Fingerprint;
pub use model_cache::{ModelCache, ModelCacheInfo, ModelHandle};
pub use ttl_cache::{CacheStats, Clock, SystemClock, TtlCache};
