//! Security extraction configuration.
//!
//! Window sizes, confidence cut-off, the blacklist of overly generic names and
//! the financial trigger words used by the contextual-relevance check.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters of the analysis text treated as the title window.
    pub max_title_length: usize,
    /// Characters after the title window treated as the content-front window.
    pub max_content_length: usize,
    pub min_confidence: f64,
    /// Names never reported as matches.
    pub blacklist: BTreeSet<String>,
    /// Sector → important names. Loaded and kept, but extraction does not consult it.
    pub whitelist: BTreeMap<String, Vec<String>>,
    /// Any of these anywhere in the text promotes a late match to `content_middle`.
    pub trigger_words: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
            max_content_length: 500,
            min_confidence: 0.6,
            blacklist: default_blacklist(),
            whitelist: default_whitelist(),
            trigger_words: default_trigger_words(),
        }
    }
}

impl ExtractionConfig {
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            anyhow::bail!(
                "MIN_CONFIDENCE must be within [0, 1], got {}",
                self.min_confidence
            );
        }
        if self.max_title_length == 0 {
            anyhow::bail!("MAX_TITLE_LENGTH must be positive");
        }
        Ok(())
    }
}

fn default_blacklist() -> BTreeSet<String> {
    [
        "삼성전자",
        "LG전자",
        "현대차",
        "기아",
        "SK하이닉스",
        "카카오",
        "네이버",
        "쿠팡",
        "배달의민족",
        "삼성생명",
        "교보생명",
        "한화생명",
        "신한은행",
        "KB국민은행",
        "우리은행",
        "하나은행",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_whitelist() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 4] = [
        ("반도체", &["SK하이닉스", "삼성전자", "DB하이텍", "한미반도체"]),
        ("바이오", &["셀트리온", "삼성바이오로직스", "한미약품"]),
        ("자동차", &["현대차", "기아", "현대모비스", "LG화학"]),
        ("게임", &["넥슨", "넷마블", "크래프톤", "펄어비스"]),
    ];
    entries
        .iter()
        .map(|(sector, names)| {
            (
                sector.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect()
}

fn default_trigger_words() -> Vec<String> {
    [
        "주가", "주식", "투자", "매수", "매도", "상승", "하락", "실적", "매출", "이익", "price",
        "stock", "shares", "invest", "buy", "sell", "earnings", "revenue", "profit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
