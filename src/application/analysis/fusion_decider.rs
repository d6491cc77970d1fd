//! Fusion of classifier output and rule keywords into one final label.
//!
//! Rules are evaluated top to bottom and the first one that fires wins:
//!
//! 1. **Lead keyword**: a rule keyword in the title or the first 100 body
//!    characters decides. Negative is checked before positive.
//! 2. **High-confidence sentiment**: classifier score above 0.8.
//! 3. **Repeated keyword**: the first keyword in rule-table order occurring
//!    more than twice in the body.
//! 4. **Fallback**: the classifier label.
//!
//! Only the winning rule's trace is kept in the [`Decision`].

use crate::domain::lexicon::Impact;
use crate::domain::news::{LEAD_CHARS, prefix_chars};
use crate::domain::sentiment::SentimentResult;
use crate::domain::verdict::{Decision, DecisionRule, KeywordHit};
use tracing::debug;

pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// A keyword must occur more than this many times in the body to decide.
pub const REPEATED_KEYWORD_THRESHOLD: usize = 2;

pub struct FusionDecider;

impl FusionDecider {
    pub fn decide(
        sentiment: &SentimentResult,
        keyword_hits: &[KeywordHit],
        title: &str,
        content: &str,
    ) -> Decision {
        if let Some(decision) = Self::lead_keyword(keyword_hits, title, content) {
            return decision;
        }
        if let Some(decision) = Self::high_confidence(sentiment) {
            return decision;
        }
        if let Some(decision) = Self::repeated_keyword(keyword_hits, content) {
            return decision;
        }
        Self::fallback(sentiment)
    }

    fn lead_keyword(hits: &[KeywordHit], title: &str, content: &str) -> Option<Decision> {
        let lead = prefix_chars(content, LEAD_CHARS);
        let important: Vec<&KeywordHit> = hits
            .iter()
            .filter(|h| title.contains(h.keyword.as_str()) || lead.contains(h.keyword.as_str()))
            .collect();

        debug!(
            "FusionDecider: rule 1 (lead keyword) sees {} important keyword(s)",
            important.len()
        );

        for (impact, rule) in [
            (Impact::Negative, DecisionRule::LeadKeywordNegative),
            (Impact::Positive, DecisionRule::LeadKeywordPositive),
        ] {
            let keywords: Vec<&str> = important
                .iter()
                .filter(|h| h.impact == impact)
                .map(|h| h.keyword.as_str())
                .collect();
            if !keywords.is_empty() {
                return Some(Decision {
                    label: impact.as_label(),
                    rule,
                    trace: vec![format!(
                        "important keyword {}: [{}] in title/lead",
                        impact,
                        keywords.join(", ")
                    )],
                });
            }
        }
        None
    }

    fn high_confidence(sentiment: &SentimentResult) -> Option<Decision> {
        let score = sentiment.valid_score();
        debug!(
            "FusionDecider: rule 2 (high-confidence sentiment) score={:?} threshold={}",
            score, HIGH_CONFIDENCE_THRESHOLD
        );
        let score = score.filter(|s| *s > HIGH_CONFIDENCE_THRESHOLD)?;
        Some(Decision {
            label: sentiment.label,
            rule: DecisionRule::HighConfidenceSentiment,
            trace: vec![format!(
                "high-confidence sentiment: classifier label '{}' with score {:.2} > {:.2}",
                sentiment.label, score, HIGH_CONFIDENCE_THRESHOLD
            )],
        })
    }

    fn repeated_keyword(hits: &[KeywordHit], content: &str) -> Option<Decision> {
        let (hit, count) = hits
            .iter()
            .map(|h| (h, content.matches(h.keyword.as_str()).count()))
            .find(|(_, count)| *count > REPEATED_KEYWORD_THRESHOLD)?;
        debug!(
            "FusionDecider: rule 3 (repeated keyword) fired on '{}' x{}",
            hit.keyword, count
        );
        Some(Decision {
            label: hit.impact.as_label(),
            rule: DecisionRule::RepeatedKeyword,
            trace: vec![format!(
                "repeated keyword: '{}' appears {} times in content, impact {}",
                hit.keyword, count, hit.impact
            )],
        })
    }

    fn fallback(sentiment: &SentimentResult) -> Decision {
        let score = sentiment
            .valid_score()
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "n/a".to_string());
        debug!("FusionDecider: rule 4 (fallback) following sentiment");
        Decision {
            label: sentiment.label,
            rule: DecisionRule::SentimentFallback,
            trace: vec![format!(
                "no precedence rule fired, following sentiment: label '{}' (score {})",
                sentiment.label, score
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{SentimentDistribution, SentimentLabel};

    fn sentiment(label: SentimentLabel, score: f64) -> SentimentResult {
        SentimentResult::new(
            label,
            score,
            SentimentDistribution {
                positive: 0.0,
                negative: 0.0,
                neutral: 0.0,
            },
        )
    }

    fn hit(keyword: &str, impact: Impact) -> KeywordHit {
        KeywordHit {
            keyword: keyword.to_string(),
            impact,
            in_title_or_lead: false,
            occurrences: 1,
        }
    }

    #[test]
    fn test_negative_lead_keyword_beats_positive() {
        let hits = vec![hit("surge", Impact::Positive), hit("investigation", Impact::Negative)];
        let decision = FusionDecider::decide(
            &sentiment(SentimentLabel::Positive, 0.99),
            &hits,
            "Shares surge despite investigation",
            "",
        );
        assert_eq!(decision.label, SentimentLabel::Negative);
        assert_eq!(decision.rule, DecisionRule::LeadKeywordNegative);
        assert_eq!(decision.trace.len(), 1);
        assert!(decision.trace[0].contains("investigation"));
    }

    #[test]
    fn test_positive_lead_keyword() {
        let hits = vec![hit("surge", Impact::Positive)];
        let decision = FusionDecider::decide(
            &sentiment(SentimentLabel::Neutral, 0.6),
            &hits,
            "Quarterly update",
            "Profit surge reported in the first sentence of the article.",
        );
        assert_eq!(decision.label, SentimentLabel::Positive);
        assert_eq!(decision.rule, DecisionRule::LeadKeywordPositive);
    }

    #[test]
    fn test_keyword_beyond_lead_is_not_important() {
        let content = format!("{} decline", "a".repeat(120));
        let hits = vec![hit("decline", Impact::Negative)];
        let decision = FusionDecider::decide(
            &sentiment(SentimentLabel::Positive, 0.5),
            &hits,
            "Title",
            &content,
        );
        assert_eq!(decision.rule, DecisionRule::SentimentFallback);
        assert_eq!(decision.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_high_confidence_sentiment() {
        let decision =
            FusionDecider::decide(&sentiment(SentimentLabel::Negative, 0.95), &[], "t", "c");
        assert_eq!(decision.label, SentimentLabel::Negative);
        assert_eq!(decision.rule, DecisionRule::HighConfidenceSentiment);
    }

    #[test]
    fn test_threshold_is_strict() {
        let decision =
            FusionDecider::decide(&sentiment(SentimentLabel::Negative, 0.8), &[], "t", "c");
        assert_eq!(decision.rule, DecisionRule::SentimentFallback);
    }

    #[test]
    fn test_missing_score_falls_through() {
        let content = format!("{} loss loss loss", "x".repeat(120));
        let hits = vec![hit("loss", Impact::Negative)];
        let decision = FusionDecider::decide(
            &SentimentResult::unavailable("classifier timeout"),
            &hits,
            "Title",
            &content,
        );
        assert_eq!(decision.rule, DecisionRule::RepeatedKeyword);
        assert_eq!(decision.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_repeated_keyword_first_in_table_order_wins() {
        let content = format!(
            "{} gain loss loss loss gain gain gain gain",
            "x".repeat(120)
        );
        let hits = vec![hit("loss", Impact::Negative), hit("gain", Impact::Positive)];
        let decision = FusionDecider::decide(
            &sentiment(SentimentLabel::Neutral, 0.4),
            &hits,
            "Title",
            &content,
        );
        assert_eq!(decision.label, SentimentLabel::Negative);
        assert!(decision.trace[0].contains("'loss' appears 3 times"));
    }

    #[test]
    fn test_two_occurrences_are_not_enough() {
        let content = format!("{} loss loss", "x".repeat(120));
        let hits = vec![hit("loss", Impact::Negative)];
        let decision = FusionDecider::decide(
            &sentiment(SentimentLabel::Positive, 0.3),
            &hits,
            "Title",
            &content,
        );
        assert_eq!(decision.rule, DecisionRule::SentimentFallback);
        assert_eq!(decision.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_fallback_trace_mentions_missing_score() {
        let decision =
            FusionDecider::decide(&SentimentResult::unavailable("error"), &[], "t", "c");
        assert_eq!(decision.label, SentimentLabel::Neutral);
        assert!(decision.trace[0].contains("n/a"));
    }
}
