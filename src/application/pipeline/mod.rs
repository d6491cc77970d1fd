pub mod analyzer;
pub mod batch_processor;
pub mod cached_classifier;

pub use analyzer::NewsAnalyzer;
pub use batch_processor::{BatchOutcome, BatchProcessor, ItemFailure, RunReport};
pub use cached_classifier::CachedClassifier;
