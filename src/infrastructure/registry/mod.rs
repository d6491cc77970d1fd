//! File-backed registry: builds the shared [`Lexicon`] at startup.

pub mod loaders;

use crate::config::PipelineConfig;
use crate::domain::errors::RegistryError;
use crate::domain::lexicon::Lexicon;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

fn open(table: &'static str, path: &str) -> Result<File, RegistryError> {
    File::open(Path::new(path)).map_err(|source| RegistryError::Io {
        table,
        path: path.to_string(),
        source,
    })
}

/// Loads the three mandatory tables and the optional category and
/// explanation tables. Any mandatory failure is fatal.
pub fn load_lexicon(config: &PipelineConfig) -> Result<Lexicon> {
    let securities = loaders::read_securities(open(loaders::SECURITIES_TABLE, &config.securities_path)?)
        .with_context(|| format!("Loading {}", config.securities_path))?;
    let rules = loaders::read_rules(open(loaders::RULES_TABLE, &config.rules_path)?)
        .with_context(|| format!("Loading {}", config.rules_path))?;
    let (positive, negative) =
        loaders::read_polarity_lexicon(open(loaders::LEXICON_TABLE, &config.lexicon_path)?)
            .with_context(|| format!("Loading {}", config.lexicon_path))?;

    info!(
        "Registry: {} securities, {} rules, {} positive / {} negative words",
        securities.len(),
        rules.len(),
        positive.len(),
        negative.len()
    );

    let mut lexicon = Lexicon::new(securities, rules, positive, negative);

    if let Some(path) = &config.categories_path {
        let categories = loaders::read_categories(open(loaders::CATEGORIES_TABLE, path)?)
            .with_context(|| format!("Loading {}", path))?;
        info!("Registry: {} keyword categories", categories.len());
        lexicon = lexicon.with_categories(categories);
    }

    if let Some(path) = &config.explanations_path {
        let explanations = loaders::read_explanations(open(loaders::EXPLANATIONS_TABLE, path)?)
            .with_context(|| format!("Loading {}", path))?;
        info!("Registry: {} keyword explanations", explanations.len());
        lexicon = lexicon.with_explanations(explanations);
    }

    Ok(lexicon)
}
