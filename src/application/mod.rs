// Text analysis components
pub mod analysis;

// Result and model caches
pub mod cache;

// Quality monitoring
pub mod monitoring;

// Batch orchestration
pub mod pipeline;
