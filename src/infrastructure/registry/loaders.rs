//! Readers for the static lookup tables.
//!
//! Every loader accepts any `Read` so tests can feed in-memory tables; the
//! path-based wrappers in the parent module add file context to errors.
//! Malformed rows are skipped with a warning. Only unreadable or empty
//! tables are errors.

use crate::domain::errors::RegistryError;
use crate::domain::lexicon::{Impact, KeywordCategory, KeywordExplanation, RuleEntry, SecurityRecord};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use tracing::warn;

pub const SECURITIES_TABLE: &str = "security registry";
pub const RULES_TABLE: &str = "impact rules";
pub const LEXICON_TABLE: &str = "polarity lexicon";
pub const CATEGORIES_TABLE: &str = "keyword categories";
pub const EXPLANATIONS_TABLE: &str = "keyword explanations";

const CODE_WIDTH: usize = 6;

/// Header aliases, English first.
const NAME_COLUMNS: &[&str] = &["name", "회사명"];
const CODE_COLUMNS: &[&str] = &["code", "종목코드"];
const SECTOR_COLUMNS: &[&str] = &["sector", "업종"];
const KEYWORD_COLUMNS: &[&str] = &["keyword", "키워드"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "설명"];
const IMPACT_COLUMNS: &[&str] = &["impact", "영향"];

fn column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&h.trim().trim_start_matches('\u{feff}')))
}

fn required_column(
    table: &'static str,
    headers: &csv::StringRecord,
    aliases: &[&str],
) -> Result<usize, RegistryError> {
    column(headers, aliases).ok_or_else(|| RegistryError::Csv {
        table,
        source: csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("missing column '{}'", aliases[0]),
        )),
    })
}

fn field(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

/// Purely numeric codes are left-padded with zeros to six digits.
pub fn normalize_code(raw: &str) -> String {
    let code = raw.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) && code.len() < CODE_WIDTH {
        format!("{:0>width$}", code, width = CODE_WIDTH)
    } else {
        code.to_string()
    }
}

pub fn read_securities<R: Read>(reader: R) -> Result<Vec<SecurityRecord>, RegistryError> {
    let table = SECURITIES_TABLE;
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| RegistryError::Csv { table, source })?
        .clone();
    let name_idx = required_column(table, &headers, NAME_COLUMNS)?;
    let code_idx = required_column(table, &headers, CODE_COLUMNS)?;
    let sector_idx = required_column(table, &headers, SECTOR_COLUMNS)?;

    let mut securities = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|source| RegistryError::Csv { table, source })?;
        let name = field(&record, name_idx);
        let code = field(&record, code_idx);
        let sector = field(&record, sector_idx);
        if name.is_empty() || code.is_empty() || sector.is_empty() {
            warn!("Registry: skipping incomplete security row {}", line + 2);
            continue;
        }
        securities.push(SecurityRecord {
            name: name.to_string(),
            code: normalize_code(code),
            sector: sector.to_string(),
        });
    }

    if securities.is_empty() {
        return Err(RegistryError::Empty { table });
    }
    Ok(securities)
}

/// JSON object `{keyword: impact}`; key order is table order.
pub fn read_rules<R: Read>(reader: R) -> Result<Vec<RuleEntry>, RegistryError> {
    let table = RULES_TABLE;
    let map: Map<String, Value> =
        serde_json::from_reader(reader).map_err(|source| RegistryError::Json { table, source })?;

    let rules: Vec<RuleEntry> = map
        .into_iter()
        .filter_map(|(keyword, value)| {
            let impact = value.as_str().and_then(|s| s.parse::<Impact>().ok());
            match impact {
                Some(impact) if !keyword.trim().is_empty() => Some(RuleEntry {
                    keyword: keyword.trim().to_string(),
                    impact,
                }),
                _ => {
                    warn!("Registry: skipping rule '{}' with impact {}", keyword, value);
                    None
                }
            }
        })
        .collect();

    if rules.is_empty() {
        return Err(RegistryError::Empty { table });
    }
    Ok(rules)
}

/// Tab-separated `word<TAB>polarity`. Positive and negative word sets.
pub fn read_polarity_lexicon<R: Read>(
    reader: R,
) -> Result<(HashSet<String>, HashSet<String>), RegistryError> {
    let table = LEXICON_TABLE;
    let mut positive = HashSet::new();
    let mut negative = HashSet::new();

    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|source| RegistryError::Io {
            table,
            path: String::new(),
            source,
        })?;
        let mut parts = line.split('\t');
        let (Some(word), Some(polarity)) = (parts.next(), parts.next()) else {
            continue;
        };
        let word = word.trim();
        let Ok(polarity) = polarity.trim().parse::<i32>() else {
            continue;
        };
        if word.is_empty() {
            continue;
        }
        match polarity {
            p if p > 0 => {
                positive.insert(word.to_lowercase());
            }
            p if p < 0 => {
                negative.insert(word.to_lowercase());
            }
            _ => {}
        }
    }

    if positive.is_empty() && negative.is_empty() {
        return Err(RegistryError::Empty { table });
    }
    Ok((positive, negative))
}

/// JSON object `{category: [keyword, ...]}`.
pub fn read_categories<R: Read>(reader: R) -> Result<Vec<KeywordCategory>, RegistryError> {
    let table = CATEGORIES_TABLE;
    let map: Map<String, Value> =
        serde_json::from_reader(reader).map_err(|source| RegistryError::Json { table, source })?;

    Ok(map
        .into_iter()
        .filter_map(|(name, value)| {
            let Some(list) = value.as_array() else {
                warn!("Registry: category '{}' is not a list, skipping", name);
                return None;
            };
            let keywords: Vec<String> = list
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            Some(KeywordCategory { name, keywords })
        })
        .collect())
}

/// CSV `keyword,sector,description,impact`.
pub fn read_explanations<R: Read>(reader: R) -> Result<Vec<KeywordExplanation>, RegistryError> {
    let table = EXPLANATIONS_TABLE;
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| RegistryError::Csv { table, source })?
        .clone();
    let keyword_idx = required_column(table, &headers, KEYWORD_COLUMNS)?;
    let sector_idx = required_column(table, &headers, SECTOR_COLUMNS)?;
    let description_idx = required_column(table, &headers, DESCRIPTION_COLUMNS)?;
    let impact_idx = required_column(table, &headers, IMPACT_COLUMNS)?;

    let mut explanations = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|source| RegistryError::Csv { table, source })?;
        let keyword = field(&record, keyword_idx);
        if keyword.is_empty() {
            continue;
        }
        explanations.push(KeywordExplanation {
            keyword: keyword.to_string(),
            sector: field(&record, sector_idx).to_string(),
            description: field(&record, description_idx).to_string(),
            impact: field(&record, impact_idx).to_string(),
        });
    }
    Ok(explanations)
}
