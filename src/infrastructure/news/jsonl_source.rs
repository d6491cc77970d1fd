use crate::domain::news::NewsItem;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Reads news items, one JSON object per line. Blank and malformed lines are
/// skipped; items without an id get a generated one.
pub fn read_news<R: Read>(reader: R) -> Result<Vec<NewsItem>> {
    let mut items = Vec::new();
    for (number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.context("Failed to read news line")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<NewsItem>(&line) {
            Ok(mut item) => {
                if item.id.trim().is_empty() {
                    item.id = Uuid::new_v4().to_string();
                }
                items.push(item);
            }
            Err(e) => warn!("NewsReader: skipping malformed line {}: {}", number + 1, e),
        }
    }
    Ok(items)
}

pub fn read_news_file(path: impl AsRef<Path>) -> Result<Vec<NewsItem>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Opening news file {}", path.display()))?;
    let items = read_news(file)?;
    info!("NewsReader: loaded {} items from {}", items.len(), path.display());
    Ok(items)
}
