//! Crawl command handler.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;

use crate::config::Config;
use crate::services::Crawler;
use crate::sources::{Corpus, CorpusTextExtractor, HttpFetcher};

use super::write_snapshot;

/// Crawl the corpus to a fixed point.
#[derive(Parser)]
pub struct CrawlCommand {
    /// Corpus root directory (overrides `corpus.root`).
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Maximum number of acquisition passes (overrides `crawl.max_depth`).
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Also extract documents under `drafts/`.
    #[arg(long)]
    pub include_drafts: bool,

    /// Where to write the graph snapshot (overrides `output.path`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CrawlCommand {
    /// Run the crawl and write the final snapshot.
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(root) = self.corpus {
            config.corpus.root = root;
        }
        if let Some(depth) = self.max_depth {
            config.crawl.max_depth = depth;
        }
        if self.include_drafts {
            config.corpus.include_drafts = true;
        }
        let output = self.output.unwrap_or(config.output.path);

        tracing::info!(
            "Crawling {} (max depth {}, drafts {})",
            config.corpus.root.display(),
            config.crawl.max_depth,
            if config.corpus.include_drafts { "included" } else { "excluded" }
        );

        let crawler = Crawler::new(
            Corpus::from_config(&config.corpus),
            Arc::new(CorpusTextExtractor::new()),
            Arc::new(HttpFetcher::new()?),
            config.crawl,
        );
        let report = crawler.run().await?;

        for failure in &report.format_errors {
            tracing::warn!("Unreadable document {}: {}", failure.id, failure.message);
        }
        if !report.failed.is_empty() {
            tracing::warn!("Could not acquire: {:?}", report.failed);
        }
        if !report.unresolved.is_empty() {
            tracing::info!("No source location for: {:?}", report.unresolved);
        }
        if report.breaker_trips() > 0 {
            tracing::warn!("Circuit breaker tripped {} time(s)", report.breaker_trips());
        }
        tracing::info!(
            "Stopped ({:?}) after {} passes; {} acquired, {} still missing",
            report.stop_reason,
            report.iterations,
            report.acquired.len(),
            report.remaining.len()
        );

        write_snapshot(&report.graph, &output)
    }
}
