//! Pure per-item analysis: extraction, keyword scan, polarity, fusion and
//! direction assignment over an already composed document.
//!
//! The three table scans are memoized in the shared result cache by content
//! fingerprint, so re-delivered articles skip the work.

use crate::application::analysis::{
    DirectionAssigner, FusionDecider, KeywordExplainer, KeywordImpactClassifier, PolarityScorer,
    SecurityExtractor,
};
use crate::application::cache::{Fingerprint, TtlCache};
use crate::config::ExtractionConfig;
use crate::domain::lexicon::Lexicon;
use crate::domain::news::{AnalysisDocument, NewsItem};
use crate::domain::sentiment::SentimentResult;
use crate::domain::verdict::{KeywordHit, PolarityCount, SecurityMatch, Verdict};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

pub struct NewsAnalyzer {
    lexicon: Arc<Lexicon>,
    extractor: SecurityExtractor,
    cache: Arc<TtlCache>,
}

impl NewsAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>, config: ExtractionConfig, cache: Arc<TtlCache>) -> Self {
        Self {
            lexicon,
            extractor: SecurityExtractor::new(config),
            cache,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    pub fn extract_securities(&self, text: &str) -> Vec<SecurityMatch> {
        let key = Fingerprint::builder("extract_securities")
            .arg(text)
            .named("config", self.extractor.config())
            .finish();
        self.cache.memoize(key, || {
            self.extractor.extract(text, self.lexicon.securities())
        })
    }

    pub fn scan_keywords(&self, document: &AnalysisDocument) -> Vec<KeywordHit> {
        let key = Fingerprint::builder("scan_keywords").arg(document).finish();
        self.cache.memoize(key, || {
            KeywordImpactClassifier::scan(document, self.lexicon.rules())
        })
    }

    pub fn score_polarity(&self, text: &str) -> PolarityCount {
        let key = Fingerprint::builder("score_polarity").arg(text).finish();
        self.cache.memoize(key, || {
            PolarityScorer::score(
                text,
                self.lexicon.positive_words(),
                self.lexicon.negative_words(),
            )
        })
    }

    /// Builds the verdict for one item given its classifier result.
    pub fn analyze(
        &self,
        item: &NewsItem,
        document: &AnalysisDocument,
        sentiment: SentimentResult,
    ) -> Verdict {
        let text = document.text.as_str();

        let securities = self.extract_securities(text);
        let keyword_hits = self.scan_keywords(document);
        let polarity_count = self.score_polarity(text);
        let financial_keywords =
            KeywordImpactClassifier::categorize(text, self.lexicon.categories());

        let decision =
            FusionDecider::decide(&sentiment, &keyword_hits, &document.title, &document.content);
        let related_securities = DirectionAssigner::annotate(securities, sentiment.label);
        let keyword_explanations = KeywordExplainer::explain(
            text,
            related_securities.first(),
            self.lexicon.explanations(),
        );

        debug!(
            "NewsAnalyzer: {} -> {} via {} ({} securities, {} keywords)",
            item.id,
            decision.label,
            decision.rule.as_str(),
            related_securities.len(),
            keyword_hits.len()
        );

        Verdict {
            id: item.id.clone(),
            source: item.source.clone(),
            title: item.title.clone(),
            sentiment,
            polarity_count,
            keyword_hits,
            financial_keywords,
            final_label: decision.label,
            decision_rule: decision.rule,
            explanation_trace: decision.trace,
            keyword_explanations,
            related_securities,
            analysis_quality: None,
            analyzed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lexicon::{Impact, RuleEntry, SecurityRecord};
    use crate::domain::sentiment::{SentimentDistribution, SentimentLabel};
    use crate::domain::verdict::{ConfidenceTier, DecisionRule, Direction};
    use std::collections::HashSet;
    use std::time::Duration;

    fn lexicon() -> Lexicon {
        Lexicon::new(
            vec![SecurityRecord {
                name: "Acme".to_string(),
                code: "000001".to_string(),
                sector: "Industrials".to_string(),
            }],
            vec![RuleEntry {
                keyword: "recall".to_string(),
                impact: Impact::Negative,
            }],
            ["growth".to_string()].into_iter().collect(),
            HashSet::new(),
        )
    }

    fn analyzer() -> NewsAnalyzer {
        NewsAnalyzer::new(
            Arc::new(lexicon()),
            ExtractionConfig::default(),
            Arc::new(TtlCache::new(100, Duration::from_secs(60))),
        )
    }

    fn item(title: &str, content: &str) -> NewsItem {
        NewsItem {
            id: "n1".to_string(),
            source: "wire".to_string(),
            title: title.to_string(),
            content: Some(content.to_string()),
            link: None,
            published: None,
        }
    }

    #[test]
    fn test_title_keyword_overrides_positive_classifier_label_only() {
        let analyzer = analyzer();
        let news = item(
            "Acme announces recall",
            "The company said the move affects a small share of units and expects growth next year.",
        );
        let doc = AnalysisDocument::compose(&news.title, news.content.as_deref());
        let sentiment = SentimentResult::new(
            SentimentLabel::Positive,
            0.92,
            SentimentDistribution {
                positive: 0.92,
                negative: 0.03,
                neutral: 0.05,
            },
        );

        let verdict = analyzer.analyze(&news, &doc, sentiment);

        assert_eq!(verdict.final_label, SentimentLabel::Negative);
        assert_eq!(verdict.decision_rule, DecisionRule::LeadKeywordNegative);
        assert_eq!(verdict.related_securities.len(), 1);
        let acme = &verdict.related_securities[0];
        // Direction follows the classifier, not the fused label
        assert_eq!(acme.direction, Some(Direction::Up));
        // Body is short enough that the appended title sits in the title window
        assert_eq!(acme.confidence_tier, Some(ConfidenceTier::High));
        assert_eq!(verdict.polarity_count.positive, 1);
    }

    #[test]
    fn test_direction_ignores_lead_keyword_when_classifier_neutral() {
        let lexicon = Lexicon::new(
            vec![SecurityRecord {
                name: "Acme".to_string(),
                code: "000001".to_string(),
                sector: "Industrials".to_string(),
            }],
            vec![RuleEntry {
                keyword: "surge".to_string(),
                impact: Impact::Positive,
            }],
            HashSet::new(),
            HashSet::new(),
        );
        let analyzer = NewsAnalyzer::new(
            Arc::new(lexicon),
            ExtractionConfig::default(),
            Arc::new(TtlCache::new(100, Duration::from_secs(60))),
        );
        let news = item("Acme profit surge", "");
        let doc = AnalysisDocument::compose(&news.title, None);
        let sentiment = SentimentResult::new(
            SentimentLabel::Neutral,
            0.6,
            SentimentDistribution {
                positive: 0.2,
                negative: 0.2,
                neutral: 0.6,
            },
        );

        let verdict = analyzer.analyze(&news, &doc, sentiment);

        assert_eq!(verdict.final_label, SentimentLabel::Positive);
        assert_eq!(
            verdict.related_securities[0].direction,
            Some(Direction::Neutral)
        );
    }

    #[test]
    fn test_unavailable_sentiment_gives_neutral_direction() {
        let analyzer = analyzer();
        let news = item("Acme announces recall", "");
        let doc = AnalysisDocument::compose(&news.title, None);

        let verdict = analyzer.analyze(&news, &doc, SentimentResult::unavailable("timeout"));

        assert_eq!(verdict.final_label, SentimentLabel::Negative);
        assert_eq!(
            verdict.related_securities[0].direction,
            Some(Direction::Neutral)
        );
    }

    #[test]
    fn test_scans_are_memoized() {
        let analyzer = analyzer();
        let news = item("Acme update", "");
        let doc = AnalysisDocument::compose(&news.title, None);

        analyzer.analyze(&news, &doc, SentimentResult::unavailable("offline"));
        let first = analyzer.cache().stats();
        analyzer.analyze(&news, &doc, SentimentResult::unavailable("offline"));
        let second = analyzer.cache().stats();

        assert_eq!(first.count, 3);
        assert_eq!(second.hits - first.hits, 3);
    }
}
