pub mod vader_classifier;

pub use vader_classifier::VaderClassifier;
