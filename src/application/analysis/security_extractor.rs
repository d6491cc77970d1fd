//! Security name extraction with position-derived confidence.
//!
//! The analysis text is split into three regions:
//! - **title window**: the first `max_title_length` characters (confidence 0.9)
//! - **content-front window**: the next `max_content_length` characters (0.7)
//! - **rest**: anywhere else; 0.5 when a financial trigger word occurs in the
//!   text, 0.3 otherwise
//!
//! A name only matches as a whole unit: both neighbours must be a string edge,
//! whitespace or punctuation.

use crate::config::ExtractionConfig;
use crate::domain::lexicon::SecurityRecord;
use crate::domain::news::prefix_chars;
use crate::domain::verdict::{PositionClass, SecurityMatch};
use std::collections::HashSet;
use tracing::debug;

pub struct SecurityExtractor {
    config: ExtractionConfig,
}

struct TextWindows<'t> {
    title: &'t str,
    front: &'t str,
    full: &'t str,
}

impl<'t> TextWindows<'t> {
    fn split(text: &'t str, title_len: usize, content_len: usize) -> Self {
        let title = prefix_chars(text, title_len);
        let front = prefix_chars(&text[title.len()..], content_len);
        Self {
            title,
            front,
            full: text,
        }
    }
}

impl SecurityExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Matches above `min_confidence`, highest confidence first, one per name.
    pub fn extract(&self, text: &str, registry: &[SecurityRecord]) -> Vec<SecurityMatch> {
        let windows = TextWindows::split(
            text,
            self.config.max_title_length,
            self.config.max_content_length,
        );
        let has_trigger = self
            .config
            .trigger_words
            .iter()
            .any(|w| !w.is_empty() && text.contains(w.as_str()));

        let mut found: Vec<SecurityMatch> = registry
            .iter()
            .filter(|s| !self.config.is_blacklisted(&s.name))
            .filter_map(|s| {
                let position = classify_position(&s.name, &windows, has_trigger)?;
                debug!(
                    "SecurityExtractor: {} ({}) found in {}",
                    s.name, s.code, position
                );
                Some(SecurityMatch {
                    name: s.name.clone(),
                    code: s.code.clone(),
                    sector: s.sector.clone(),
                    position,
                    confidence: position.confidence(),
                    direction: None,
                    confidence_tier: None,
                })
            })
            .filter(|m| m.confidence >= self.config.min_confidence)
            .collect();

        // Stable sort keeps registry order among equal confidences
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut seen = HashSet::new();
        found.retain(|m| seen.insert(m.name.clone()));

        debug!("SecurityExtractor: {} securities extracted", found.len());
        found
    }
}

fn classify_position(name: &str, windows: &TextWindows<'_>, has_trigger: bool) -> Option<PositionClass> {
    if contains_bounded(windows.title, name) {
        Some(PositionClass::Title)
    } else if contains_bounded(windows.front, name) {
        Some(PositionClass::ContentFront)
    } else if contains_bounded(windows.full, name) {
        if has_trigger {
            Some(PositionClass::ContentMiddle)
        } else {
            Some(PositionClass::ContentOther)
        }
    } else {
        None
    }
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || !c.is_alphanumeric()
}

/// True when `needle` occurs in `haystack` delimited on both sides.
pub fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    // Step one character past each hit so overlapping occurrences are seen.
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let idx = start + offset;
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        if before.is_none_or(is_boundary) && after.is_none_or(is_boundary) {
            return true;
        }
        start = idx + haystack[idx..].chars().next().map_or(1, char::len_utf8);
    }
    false
}
