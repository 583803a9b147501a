//! Graph command handler.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;

use crate::config::Config;
use crate::services::{Crawler, Frontier};
use crate::sources::{Corpus, CorpusTextExtractor, HttpFetcher};

use super::write_snapshot;

/// Build the graph from the local corpus without acquiring anything.
#[derive(Parser)]
pub struct GraphCommand {
    /// Corpus root directory (overrides `corpus.root`).
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Also extract documents under `drafts/`.
    #[arg(long)]
    pub include_drafts: bool,

    /// Where to write the graph snapshot (overrides `output.path`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GraphCommand {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(root) = self.corpus {
            config.corpus.root = root;
        }
        if self.include_drafts {
            config.corpus.include_drafts = true;
        }
        let output = self.output.unwrap_or(config.output.path);

        // The fetcher is never called on a single extraction pass
        let crawler = Crawler::new(
            Corpus::from_config(&config.corpus),
            Arc::new(CorpusTextExtractor::new()),
            Arc::new(HttpFetcher::new()?),
            config.crawl,
        );
        let pass = crawler.extract_pass().await?;

        for failure in &pass.format_errors {
            tracing::warn!("Unreadable document {}: {}", failure.id, failure.message);
        }
        let frontier = Frontier::compute(&pass.graph);
        tracing::info!(
            "{} documents extracted, {} acquirable documents missing",
            pass.extractions.len(),
            frontier.len()
        );

        write_snapshot(&pass.graph, &output)
    }
}
