pub mod news;
pub mod observability;
pub mod persistence;
pub mod registry;
pub mod sentiment;

pub use news::{InMemoryTextSource, NoopTextSource};
pub use persistence::JsonlVerdictSink;
pub use sentiment::VaderClassifier;
