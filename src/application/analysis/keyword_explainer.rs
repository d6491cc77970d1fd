use crate::domain::lexicon::{ALL_SECTORS, KeywordExplanation};
use crate::domain::verdict::SecurityMatch;

const NO_COMPANY: &str = "n/a";

/// Turns explanation-table entries into readable sentences for the most
/// relevant security of an item.
pub struct KeywordExplainer;

impl KeywordExplainer {
    /// Without a related security, only sector-agnostic entries apply.
    pub fn explain(
        text: &str,
        top_security: Option<&SecurityMatch>,
        explanations: &[KeywordExplanation],
    ) -> Vec<String> {
        let (company, sector) = match top_security {
            Some(s) => (s.name.as_str(), s.sector.as_str()),
            None => (NO_COMPANY, ALL_SECTORS),
        };

        explanations
            .iter()
            .filter(|e| !e.keyword.is_empty() && text.contains(e.keyword.as_str()))
            .filter(|e| e.sector == sector || e.sector == ALL_SECTORS)
            .map(|e| {
                format!(
                    "{}: {} is {}, a {} factor.",
                    company, e.keyword, e.description, e.impact
                )
            })
            .collect()
    }
}
