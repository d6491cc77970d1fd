use crate::domain::verdict::PolarityCount;
use std::collections::HashSet;

/// Minimum token length, in characters, considered a word.
const MIN_TOKEN_CHARS: usize = 2;

pub struct PolarityScorer;

impl PolarityScorer {
    pub fn score(
        text: &str,
        positive_words: &HashSet<String>,
        negative_words: &HashSet<String>,
    ) -> PolarityCount {
        let mut count = PolarityCount::default();
        for token in tokenize(text) {
            if positive_words.contains(&token) {
                count.positive += 1;
            }
            if negative_words.contains(&token) {
                count.negative += 1;
            }
        }
        count.net = count.positive as i64 - count.negative as i64;
        count
    }
}

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Maximal same-script runs of letters at least [`MIN_TOKEN_CHARS`] long,
/// lowercased. "HBM호조" yields "hbm" and "호조".
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_hangul = false;

    for c in text.chars() {
        if !c.is_alphabetic() {
            push_token(&mut tokens, &mut current);
            continue;
        }
        let hangul = is_hangul(c);
        if hangul != current_hangul {
            push_token(&mut tokens, &mut current);
            current_hangul = hangul;
        }
        current.push(c);
    }
    push_token(&mut tokens, &mut current);
    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    if current.chars().count() >= MIN_TOKEN_CHARS {
        tokens.push(current.to_lowercase());
    }
    current.clear();
}
