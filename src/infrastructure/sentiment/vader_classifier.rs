//! Local lexicon-based sentiment classifier using VADER
//!
//! VADER (Valence Aware Dictionary and sEntiment Reasoner) scores general
//! news prose well but misses market jargon, so its compound score is
//! adjusted with a small financial keyword table (English and Korean).
//!
//! # Example
//! ```rust,ignore
//! use newsimpact::infrastructure::sentiment::VaderClassifier;
//!
//! let classifier = VaderClassifier::new();
//! let result = classifier.score_text("Shares surge to a record high");
//! assert_eq!(result.label, SentimentLabel::Positive);
//! ```

use crate::application::cache::ModelHandle;
use crate::domain::ports::SentimentClassifier;
use crate::domain::sentiment::{SentimentDistribution, SentimentLabel, SentimentResult};
use anyhow::Result;
use async_trait::async_trait;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Financial keywords and their boost. Negative values are bearish.
const FINANCIAL_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 0.4),
    ("rally", 0.4),
    ("soar", 0.5),
    ("record high", 0.4),
    ("beat estimates", 0.4),
    ("upgrade", 0.3),
    ("buyback", 0.3),
    ("dividend hike", 0.3),
    ("breakthrough", 0.4),
    ("급등", 0.5),
    ("호실적", 0.5),
    ("최대 실적", 0.4),
    ("수주", 0.3),
    ("흑자전환", 0.5),
    ("상향", 0.3),
    ("plunge", -0.5),
    ("crash", -0.5),
    ("downgrade", -0.3),
    ("lawsuit", -0.4),
    ("recall", -0.4),
    ("default", -0.5),
    ("fraud", -0.5),
    ("sell-off", -0.4),
    ("miss estimates", -0.4),
    ("급락", -0.5),
    ("적자", -0.4),
    ("리콜", -0.4),
    ("소송", -0.4),
    ("하향", -0.3),
    ("횡령", -0.5),
];

/// Compound scores within this distance of zero are neutral.
const NEUTRAL_BAND: f64 = 0.05;

const BOOST_WEIGHT: f64 = 0.5;

pub struct VaderClassifier {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderClassifier {
    pub const NAME: &'static str = "vader";

    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    fn financial_boost(text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        FINANCIAL_KEYWORDS
            .iter()
            .filter(|(keyword, _)| text_lower.contains(keyword))
            .map(|(_, score)| score)
            .sum()
    }

    /// Scores `text` synchronously. Empty text is a confident neutral.
    pub fn score_text(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::new(
                SentimentLabel::Neutral,
                1.0,
                SentimentDistribution {
                    positive: 0.0,
                    negative: 0.0,
                    neutral: 1.0,
                },
            );
        }

        let scores = self.analyzer.polarity_scores(text);
        let value = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        let compound =
            (value("compound") + Self::financial_boost(text) * BOOST_WEIGHT).clamp(-1.0, 1.0);

        let distribution = SentimentDistribution {
            positive: value("pos"),
            negative: value("neg"),
            neutral: value("neu"),
        };

        let (label, score) = if compound >= NEUTRAL_BAND {
            (SentimentLabel::Positive, compound)
        } else if compound <= -NEUTRAL_BAND {
            (SentimentLabel::Negative, compound.abs())
        } else {
            (SentimentLabel::Neutral, 1.0 - compound.abs())
        };

        SentimentResult::new(label, score, distribution)
    }
}

impl Default for VaderClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelHandle for VaderClassifier {
    fn estimated_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + FINANCIAL_KEYWORDS
                .iter()
                .map(|(k, _)| k.len() + std::mem::size_of::<f64>())
                .sum::<usize>()
    }
}

#[async_trait]
impl SentimentClassifier for VaderClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        Ok(self.score_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullish_headlines() {
        let classifier = VaderClassifier::new();

        let headlines = [
            "Shares surge to a record high as demand grows",
            "Chipmaker rallies after analysts upgrade the stock",
            "삼성전자 호실적 발표, 주가 급등",
        ];

        for headline in headlines {
            let result = classifier.score_text(headline);
            assert_eq!(
                result.label,
                SentimentLabel::Positive,
                "Expected positive label for '{}', got {:?}",
                headline,
                result
            );
        }
    }

    #[test]
    fn test_bearish_headlines() {
        let classifier = VaderClassifier::new();

        let headlines = [
            "Automaker stock plunges after massive recall",
            "Regulator files fraud lawsuit against lender",
            "현대차 대규모 리콜, 주가 급락",
        ];

        for headline in headlines {
            let result = classifier.score_text(headline);
            assert_eq!(
                result.label,
                SentimentLabel::Negative,
                "Expected negative label for '{}', got {:?}",
                headline,
                result
            );
        }
    }

    #[test]
    fn test_scores_are_probabilities() {
        let classifier = VaderClassifier::new();
        for text in ["", "Market closes unchanged", "Stock crash and fraud and default"] {
            let result = classifier.score_text(text);
            assert!(result.valid_score().is_some(), "score for '{}'", text);
        }
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let result = VaderClassifier::new().score_text("   ");
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_classify_port() {
        let classifier = VaderClassifier::new();
        assert_eq!(classifier.name(), "vader");
        let result = classifier.classify("Shares soar").await.unwrap();
        assert!(result.is_available());
    }
}
