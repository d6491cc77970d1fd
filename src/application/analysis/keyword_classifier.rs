use crate::domain::lexicon::{KeywordCategory, RuleEntry};
use crate::domain::news::AnalysisDocument;
use crate::domain::verdict::{CategoryHit, KeywordHit};

/// Scans text for rule-table keywords by literal containment.
pub struct KeywordImpactClassifier;

impl KeywordImpactClassifier {
    /// One hit per rule keyword present in the text, in rule-table order.
    pub fn scan(document: &AnalysisDocument, rules: &[RuleEntry]) -> Vec<KeywordHit> {
        let lead = document.lead();
        rules
            .iter()
            .filter(|rule| !rule.keyword.is_empty())
            .filter(|rule| document.text.contains(rule.keyword.as_str()))
            .map(|rule| {
                let keyword = rule.keyword.as_str();
                KeywordHit {
                    keyword: rule.keyword.clone(),
                    impact: rule.impact,
                    in_title_or_lead: document.title.contains(keyword) || lead.contains(keyword),
                    occurrences: document.text.matches(keyword).count(),
                }
            })
            .collect()
    }

    /// Financial keywords present in the text, grouped by category. Empty
    /// categories are omitted.
    pub fn categorize(text: &str, categories: &[KeywordCategory]) -> Vec<CategoryHit> {
        categories
            .iter()
            .filter_map(|category| {
                let keywords: Vec<String> = category
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty() && text.contains(k.as_str()))
                    .cloned()
                    .collect();
                (!keywords.is_empty()).then(|| CategoryHit {
                    category: category.name.clone(),
                    keywords,
                })
            })
            .collect()
    }
}
