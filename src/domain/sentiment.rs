use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-way sentiment label shared by the classifier output and the final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "긍정" | "긍정적" => Ok(Self::Positive),
            "negative" | "부정" | "부정적" => Ok(Self::Negative),
            "neutral" | "중립" => Ok(Self::Neutral),
            _ => anyhow::bail!(
                "Invalid sentiment label: {}. Must be 'positive', 'negative' or 'neutral'",
                s
            ),
        }
    }
}

/// Probability mass the classifier assigned to each label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Output of the external sentiment classifier for one text.
///
/// `score` is `None` when the classifier failed or timed out; such a result never
/// satisfies the high-confidence rung of the fusion ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: Option<f64>,
    pub distribution: Option<SentimentDistribution>,
    pub reason: String,
}

impl SentimentResult {
    pub fn new(label: SentimentLabel, score: f64, distribution: SentimentDistribution) -> Self {
        let reason = format!(
            "classified as '{}' with {:.1}% confidence (distribution: pos={:.3}, neg={:.3}, neu={:.3})",
            label,
            score * 100.0,
            distribution.positive,
            distribution.negative,
            distribution.neutral
        );
        Self {
            label,
            score: Some(score),
            distribution: Some(distribution),
            reason,
        }
    }

    /// Placeholder used when no classifier output could be obtained.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: None,
            distribution: None,
            reason: reason.into(),
        }
    }

    /// Score usable for threshold checks: present, finite and within [0, 1].
    pub fn valid_score(&self) -> Option<f64> {
        self.score
            .filter(|s| s.is_finite() && (0.0..=1.0).contains(s))
    }

    pub fn is_available(&self) -> bool {
        self.valid_score().is_some()
    }
}
