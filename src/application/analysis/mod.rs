pub mod direction_assigner;
pub mod fusion_decider;
pub mod keyword_classifier;
pub mod keyword_explainer;
pub mod polarity_scorer;
pub mod security_extractor;

pub use direction_assigner::DirectionAssigner;
pub use fusion_decider::FusionDecider;
pub use keyword_classifier::KeywordImpactClassifier;
pub use keyword_explainer::KeywordExplainer;
pub use polarity_scorer::PolarityScorer;
pub use security_extractor::SecurityExtractor;
