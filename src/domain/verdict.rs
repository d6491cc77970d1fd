use crate::domain::lexicon::Impact;
use crate::domain::quality::QualityReport;
use crate::domain::sentiment::{SentimentLabel, SentimentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the article a security name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionClass {
    Title,
    ContentFront,
    ContentMiddle,
    ContentOther,
}

impl PositionClass {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Title => 0.9,
            Self::ContentFront => 0.7,
            Self::ContentMiddle => 0.5,
            Self::ContentOther => 0.3,
        }
    }
}

impl fmt::Display for PositionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::ContentFront => write!(f, "content_front"),
            Self::ContentMiddle => write!(f, "content_middle"),
            Self::ContentOther => write!(f, "content_other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl From<SentimentLabel> for Direction {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => Self::Up,
            SentimentLabel::Negative => Self::Down,
            SentimentLabel::Neutral => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityMatch {
    pub name: String,
    pub code: String,
    pub sector: String,
    pub position: PositionClass,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_tier: Option<ConfidenceTier>,
}

/// A rule-table keyword present in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub impact: Impact,
    pub in_title_or_lead: bool,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityCount {
    pub positive: usize,
    pub negative: usize,
    pub net: i64,
}

/// Financial keywords of one category found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHit {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Rung of the fusion ladder that produced the final label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    LeadKeywordNegative,
    LeadKeywordPositive,
    HighConfidenceSentiment,
    RepeatedKeyword,
    SentimentFallback,
}

impl DecisionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadKeywordNegative => "lead_keyword_negative",
            Self::LeadKeywordPositive => "lead_keyword_positive",
            Self::HighConfidenceSentiment => "high_confidence_sentiment",
            Self::RepeatedKeyword => "repeated_keyword",
            Self::SentimentFallback => "sentiment_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: SentimentLabel,
    pub rule: DecisionRule,
    pub trace: Vec<String>,
}

/// Final record for one news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub id: String,
    pub source: String,
    pub title: String,
    pub sentiment: SentimentResult,
    pub polarity_count: PolarityCount,
    pub keyword_hits: Vec<KeywordHit>,
    pub financial_keywords: Vec<CategoryHit>,
    pub final_label: SentimentLabel,
    pub decision_rule: DecisionRule,
    pub explanation_trace: Vec<String>,
    pub keyword_explanations: Vec<String>,
    pub related_securities: Vec<SecurityMatch>,
    /// Filled in by the batch driver once processing time is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_quality: Option<QualityReport>,
    pub analyzed_at: DateTime<Utc>,
}

impl Verdict {
    /// Highest extraction confidence among related securities, 0 when none.
    pub fn top_security_confidence(&self) -> f64 {
        self.related_securities
            .first()
            .map(|s| s.confidence)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_confidence_ladder() {
        assert_eq!(PositionClass::Title.confidence(), 0.9);
        assert_eq!(PositionClass::ContentFront.confidence(), 0.7);
        assert_eq!(PositionClass::ContentMiddle.confidence(), 0.5);
        assert_eq!(PositionClass::ContentOther.confidence(), 0.3);
    }

    #[test]
    fn test_direction_from_label() {
        assert_eq!(Direction::from(SentimentLabel::Positive), Direction::Up);
        assert_eq!(Direction::from(SentimentLabel::Negative), Direction::Down);
        assert_eq!(Direction::from(SentimentLabel::Neutral), Direction::Neutral);
    }

    #[test]
    fn test_security_match_serialization_omits_unassigned_direction() {
        let m = SecurityMatch {
            name: "셀트리온".to_string(),
            code: "068270".to_string(),
            sector: "의약품".to_string(),
            position: PositionClass::ContentFront,
            confidence: 0.7,
            direction: None,
            confidence_tier: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["position"], "content_front");
        assert!(json.get("direction").is_none());
    }
}
