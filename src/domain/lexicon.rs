//! Immutable lookup tables consulted by every analysis component.
//!
//! The [`Lexicon`] is built once at startup from the registry loaders and shared
//! read-only (behind an `Arc`) for the lifetime of a processing run.

use crate::domain::sentiment::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A listed security from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub name: String,
    pub code: String,
    pub sector: String,
}

/// Market impact attached to a rule keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
}

impl Impact {
    pub fn as_label(&self) -> SentimentLabel {
        match self {
            Self::Positive => SentimentLabel::Positive,
            Self::Negative => SentimentLabel::Negative,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for Impact {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "긍정적" | "긍정" => Ok(Self::Positive),
            "negative" | "부정적" | "부정" => Ok(Self::Negative),
            _ => anyhow::bail!("Invalid impact: {}. Must be 'positive' or 'negative'", s),
        }
    }
}

/// One keyword → impact rule. Table order is load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub keyword: String,
    pub impact: Impact,
}

/// Named group of financial keywords (e.g. "corporate_activities").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Curated description of what a keyword means for a sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordExplanation {
    pub keyword: String,
    pub sector: String,
    pub description: String,
    pub impact: String,
}

/// Sector marker meaning "applies to every sector".
pub const ALL_SECTORS: &str = "전 업종";

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    securities: Vec<SecurityRecord>,
    rules: Vec<RuleEntry>,
    positive_words: HashSet<String>,
    negative_words: HashSet<String>,
    categories: Vec<KeywordCategory>,
    explanations: Vec<KeywordExplanation>,
}

impl Lexicon {
    pub fn new(
        securities: Vec<SecurityRecord>,
        rules: Vec<RuleEntry>,
        positive_words: HashSet<String>,
        negative_words: HashSet<String>,
    ) -> Self {
        Self {
            securities,
            rules: dedup_rules(rules),
            positive_words,
            negative_words,
            categories: Vec::new(),
            explanations: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<KeywordCategory>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_explanations(mut self, explanations: Vec<KeywordExplanation>) -> Self {
        self.explanations = explanations;
        self
    }

    pub fn securities(&self) -> &[SecurityRecord] {
        &self.securities
    }

    /// Rules in load order.
    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    pub fn positive_words(&self) -> &HashSet<String> {
        &self.positive_words
    }

    pub fn negative_words(&self) -> &HashSet<String> {
        &self.negative_words
    }

    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    pub fn explanations(&self) -> &[KeywordExplanation] {
        &self.explanations
    }
}

// A keyword listed twice keeps its first position and its last impact,
// the same outcome as re-inserting a key into an insertion-ordered map.
fn dedup_rules(rules: Vec<RuleEntry>) -> Vec<RuleEntry> {
    let mut out: Vec<RuleEntry> = Vec::with_capacity(rules.len());
    for rule in rules {
        if let Some(existing) = out.iter_mut().find(|r| r.keyword == rule.keyword) {
            existing.impact = rule.impact;
        } else {
            out.push(rule);
        }
    }
    out
}
