use crate::domain::sentiment::SentimentLabel;
use crate::domain::verdict::{ConfidenceTier, Direction, SecurityMatch};

pub const HIGH_TIER_ABOVE: f64 = 0.8;
pub const MEDIUM_TIER_ABOVE: f64 = 0.6;

/// Maps match confidence and the classifier label to a predicted direction.
/// Low-confidence matches are never given a direction.
pub struct DirectionAssigner;

impl DirectionAssigner {
    pub fn assign(security: &SecurityMatch, label: SentimentLabel) -> (Direction, ConfidenceTier) {
        if security.confidence > HIGH_TIER_ABOVE {
            (Direction::from(label), ConfidenceTier::High)
        } else if security.confidence > MEDIUM_TIER_ABOVE {
            (Direction::from(label), ConfidenceTier::Medium)
        } else {
            (Direction::Neutral, ConfidenceTier::Low)
        }
    }

    pub fn annotate(matches: Vec<SecurityMatch>, label: SentimentLabel) -> Vec<SecurityMatch> {
        matches
            .into_iter()
            .map(|mut m| {
                let (direction, tier) = Self::assign(&m, label);
                m.direction = Some(direction);
                m.confidence_tier = Some(tier);
                m
            })
            .collect()
    }
}
