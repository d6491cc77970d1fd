//! newsimpact - batch news impact analysis
//!
//! Reads news items as JSON lines, classifies each one against the security
//! registry and impact rules, and writes one verdict per line. Metrics are
//! pushed as a `METRICS_JSON:` line on stdout after the run.
//!
//! # Usage
//! ```sh
//! newsimpact --news data/news.jsonl --out verdicts.jsonl
//! ```
//!
//! # Environment Variables
//! - `NEWS_IMPACT_CONFIG` - Optional TOML config file
//! - `RUST_LOG` - Log filter (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use newsimpact::application::cache::{ModelCache, TtlCache};
use newsimpact::application::monitoring::PerformanceMonitor;
use newsimpact::application::pipeline::{BatchProcessor, CachedClassifier, NewsAnalyzer};
use newsimpact::config::Config;
use newsimpact::domain::ports::{SentimentClassifier, TextSource, VerdictSink};
use newsimpact::infrastructure::news::{InMemoryTextSource, NoopTextSource, read_news_file};
use newsimpact::infrastructure::observability::{Metrics, MetricsReporter};
use newsimpact::infrastructure::registry::load_lexicon;
use newsimpact::infrastructure::{JsonlVerdictSink, VaderClassifier};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "News impact analyzer", long_about = None)]
struct Cli {
    /// JSON lines file with news items
    #[arg(short, long)]
    news: String,

    /// Output file for verdicts (stdout when omitted)
    #[arg(short, long)]
    out: Option<String>,

    /// TOML config file (overrides NEWS_IMPACT_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON object of article bodies keyed by link, used when an item body is missing
    #[arg(long)]
    articles: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries verdicts and metrics only
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    info!("newsimpact {} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => Config::load(Some(path.as_str()), |key| std::env::var(key).ok()),
        None => Config::from_env(),
    }
    .context("Invalid configuration")?;
    info!(
        "Configuration loaded: batch_size={}, min_confidence={}, cache={}x{}s",
        config.pipeline.batch_size,
        config.extraction.min_confidence,
        config.cache.max_size,
        config.cache.ttl_seconds
    );

    let lexicon = Arc::new(load_lexicon(&config.pipeline).context("Failed to load registry")?);
    let cache = Arc::new(TtlCache::new(config.cache.max_size, config.cache.ttl()));
    let models = Arc::new(ModelCache::new());

    let vader = models.get_or_load(VaderClassifier::NAME, || Ok(VaderClassifier::new()))?;
    let vader: Arc<dyn SentimentClassifier> = vader;
    let classifier: Arc<dyn SentimentClassifier> =
        Arc::new(CachedClassifier::new(vader, cache.clone()));

    let analyzer = Arc::new(NewsAnalyzer::new(
        lexicon,
        config.extraction.clone(),
        cache.clone(),
    ));
    let monitor = Arc::new(PerformanceMonitor::new(
        config.observability.quality_warnings,
    ));
    let metrics = Metrics::new()?;

    let reporter = MetricsReporter::new(metrics.clone(), cache.clone(), models, monitor.clone());

    let text_source: Arc<dyn TextSource> = match &cli.articles {
        Some(path) => Arc::new(
            InMemoryTextSource::from_json_file(path)
                .with_context(|| format!("Failed to load articles from {}", path))?,
        ),
        None => Arc::new(NoopTextSource),
    };
    let processor = BatchProcessor::new(analyzer, classifier, config.pipeline.clone())
        .with_text_source(text_source)
        .with_monitor(monitor.clone())
        .with_metrics(metrics);

    let items = read_news_file(&cli.news)?;
    let sink: Box<dyn VerdictSink> = match &cli.out {
        Some(path) => Box::new(JsonlVerdictSink::create(path)?),
        None => Box::new(JsonlVerdictSink::stdout()),
    };

    let report = processor.run(items, sink.as_ref()).await?;
    monitor.log_summary();
    info!(
        "Run finished: {} written, {} failed, {} chunk retries",
        report.written, report.failed, report.chunks_retried
    );

    if config.observability.enabled {
        reporter.report();
    } else {
        info!("Metrics reporting disabled.");
    }

    Ok(())
}
