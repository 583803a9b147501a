//! CLI module for refgraph.
//!
//! Subcommands:
//! - `crawl`: Extract, assemble and acquire until a fixed point
//! - `graph`: One extraction pass over the local corpus, no network
//! - `extract`: Show the classified references of a single document
//! - `normalize`: Print canonical identifiers for citations or file names

mod crawl;
mod extract;
mod graph;
mod normalize;

use std::path::Path;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;

use crate::models::ReferenceGraph;

pub use crawl::CrawlCommand;
pub use extract::ExtractCommand;
pub use graph::GraphCommand;
pub use normalize::NormalizeCommand;

/// refgraph - Reference graph crawler for technical standards
#[derive(Parser)]
#[command(name = "refgraph")]
#[command(about = "Build and grow a reference graph over a corpus of standards documents")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Crawl the corpus, acquiring missing RFCs and foundation profiles
    Crawl(CrawlCommand),

    /// Build the graph from local documents only
    Graph(GraphCommand),

    /// Print the classified references of one document as JSON
    Extract(ExtractCommand),

    /// Print canonical identifiers for citations, file names or RFC stems
    Normalize(NormalizeCommand),
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Crawl(cmd) => cmd.run().await,
            Command::Graph(cmd) => cmd.run().await,
            Command::Extract(cmd) => cmd.run().await,
            Command::Normalize(cmd) => cmd.run(),
        }
    }
}

/// Writes the JSON snapshot of `graph` to `path`.
pub(crate) fn write_snapshot(graph: &ReferenceGraph, path: &Path) -> color_eyre::Result<()> {
    let snapshot = graph.snapshot(chrono::Utc::now());
    let json = serde_json::to_string_pretty(&snapshot)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .wrap_err_with(|| format!("Failed to write snapshot to {}", path.display()))?;

    tracing::info!(
        "Wrote {} nodes and {} edges to {}",
        snapshot.stats.nodes,
        snapshot.stats.edges,
        path.display()
    );
    Ok(())
}
