//! The crawl controller.
//!
//! Drives extraction and acquisition to a fixed point:
//!
//! ```text
//! Extracting -> FrontierCheck -> Acquiring -> Extracting -> ...
//!                    |               |
//!                    +---> Done <----+
//! ```
//!
//! `FrontierCheck` stops the crawl when nothing is left to acquire or when the
//! number of acquisition passes has reached `max_depth`. `Acquiring` stops it
//! when a pass brings in no new document and the circuit breaker did not trip.
//! Every acquisition pass is followed by an extraction pass, so the returned
//! graph always reflects the corpus on disk.
//!
//! Execution is sequential. Foundation profiles get one attempt each with a
//! rate-limit delay in between. RFCs get up to `rfc_max_attempts` attempts with
//! exponential backoff and a per-attempt timeout, and a run of
//! `breaker_threshold` consecutive failed items trips a circuit breaker that
//! abandons the rest of the RFCs for the current pass.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, timeout};

use super::assembler::assemble;
use super::frontier::{Frontier, FrontierItem};
use crate::config::CrawlConfig;
use crate::error::AppError;
use crate::extract::ReferenceExtractor;
use crate::models::{DocumentExtraction, ReferenceGraph};
use crate::sources::{Corpus, Fetcher, TextExtractor};

/// States of the crawl loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Extracting,
    FrontierCheck,
    Acquiring,
    Done(StopReason),
}

/// Why the crawl loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The frontier was empty.
    FixedPoint,
    /// `max_depth` acquisition passes have run.
    DepthReached,
    /// The last acquisition pass stored no new document.
    NoProgress,
}

/// Notable non-fatal events of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// The circuit breaker abandoned the remaining RFCs of an acquisition pass.
    BreakerTripped {
        pass: u32,
        consecutive_failures: u32,
        abandoned: Vec<String>,
    },
}

/// A document whose text could not be extracted.
#[derive(Debug, Clone, Serialize)]
pub struct FormatFailure {
    pub id: String,
    pub message: String,
}

/// The result of one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractionPass {
    pub graph: ReferenceGraph,
    pub extractions: Vec<DocumentExtraction>,
    pub format_errors: Vec<FormatFailure>,
}

/// What one acquisition pass did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcquisitionPass {
    /// Newly stored documents.
    pub acquired: Vec<String>,
    /// Items already on disk.
    pub skipped: Vec<String>,
    /// Items whose attempts were exhausted.
    pub failed: Vec<String>,
    /// RFCs never attempted because the circuit breaker tripped.
    pub abandoned: Vec<String>,
    /// Consecutive failures when the breaker tripped, if it did.
    pub breaker_tripped: Option<u32>,
    /// Fetch attempts made, retries included.
    pub attempts: usize,
}

/// Summary of a complete crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Graph from the final extraction pass.
    pub graph: ReferenceGraph,
    pub stop_reason: StopReason,
    /// Extraction passes run.
    pub iterations: u32,
    /// Acquisition passes run.
    pub acquisition_passes: u32,
    pub acquired: Vec<String>,
    /// Items that were still missing after their last attempt.
    pub failed: BTreeSet<String>,
    /// Eligible identifiers with no source location.
    pub unresolved: BTreeSet<String>,
    /// Frontier left when the crawl stopped.
    pub remaining: Vec<String>,
    /// Format errors from the final extraction pass.
    pub format_errors: Vec<FormatFailure>,
    pub events: Vec<CrawlEvent>,
}

impl CrawlReport {
    pub fn breaker_trips(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CrawlEvent::BreakerTripped { .. }))
            .count()
    }
}

/// Runs extraction, assembly and acquisition until a fixed point.
pub struct Crawler {
    corpus: Corpus,
    text: Arc<dyn TextExtractor>,
    fetcher: Arc<dyn Fetcher>,
    config: CrawlConfig,
    extractor: ReferenceExtractor,
}

impl Crawler {
    pub fn new(
        corpus: Corpus,
        text: Arc<dyn TextExtractor>,
        fetcher: Arc<dyn Fetcher>,
        config: CrawlConfig,
    ) -> Self {
        Self {
            corpus,
            text,
            fetcher,
            config,
            extractor: ReferenceExtractor::new(),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Runs the crawl loop to completion.
    ///
    /// Only failing to list the corpus aborts the crawl; format and acquisition
    /// failures are recorded in the report.
    pub async fn run(&self) -> Result<CrawlReport, AppError> {
        let mut report = CrawlReport {
            graph: ReferenceGraph::new(),
            stop_reason: StopReason::FixedPoint,
            iterations: 0,
            acquisition_passes: 0,
            acquired: Vec::new(),
            failed: BTreeSet::new(),
            unresolved: BTreeSet::new(),
            remaining: Vec::new(),
            format_errors: Vec::new(),
            events: Vec::new(),
        };
        let mut frontier = Frontier::default();
        let mut state = CrawlState::Extracting;

        let stop_reason = loop {
            state = match state {
                CrawlState::Extracting => {
                    report.iterations += 1;
                    let pass = self.extract_pass().await?;
                    tracing::info!(
                        "Pass {}: {} documents, {} nodes, {} edges, {} format errors",
                        report.iterations,
                        pass.extractions.len(),
                        pass.graph.node_count(),
                        pass.graph.edge_count(),
                        pass.format_errors.len()
                    );
                    report.graph = pass.graph;
                    report.format_errors = pass.format_errors;
                    CrawlState::FrontierCheck
                }
                CrawlState::FrontierCheck => {
                    frontier = Frontier::compute(&report.graph);
                    for id in &frontier.unresolved {
                        tracing::warn!("No source location for {}, not acquiring", id);
                    }
                    report.unresolved.extend(frontier.unresolved.iter().cloned());
                    report.remaining = frontier.ids();

                    if frontier.is_empty() {
                        CrawlState::Done(StopReason::FixedPoint)
                    } else if report.acquisition_passes >= self.config.max_depth {
                        tracing::info!(
                            "Depth bound {} reached with {} documents still missing",
                            self.config.max_depth,
                            frontier.len()
                        );
                        CrawlState::Done(StopReason::DepthReached)
                    } else {
                        CrawlState::Acquiring
                    }
                }
                CrawlState::Acquiring => {
                    report.acquisition_passes += 1;
                    let pass = self.acquire(&frontier).await;
                    tracing::info!(
                        "Acquisition pass {}: {} acquired, {} skipped, {} failed, {} abandoned",
                        report.acquisition_passes,
                        pass.acquired.len(),
                        pass.skipped.len(),
                        pass.failed.len(),
                        pass.abandoned.len()
                    );
                    if let Some(consecutive_failures) = pass.breaker_tripped {
                        report.events.push(CrawlEvent::BreakerTripped {
                            pass: report.acquisition_passes,
                            consecutive_failures,
                            abandoned: pass.abandoned.clone(),
                        });
                    }
                    for id in &pass.acquired {
                        report.failed.remove(id);
                    }
                    report.failed.extend(pass.failed.iter().cloned());
                    report.acquired.extend(pass.acquired.iter().cloned());

                    // A tripped breaker ends the pass, not the crawl.
                    if pass.acquired.is_empty() && pass.breaker_tripped.is_none() {
                        CrawlState::Done(StopReason::NoProgress)
                    } else {
                        pause(self.config.iteration_delay()).await;
                        CrawlState::Extracting
                    }
                }
                CrawlState::Done(reason) => break reason,
            };
        };

        report.stop_reason = stop_reason;
        tracing::info!(
            "Crawl finished ({:?}) after {} passes: {} nodes, {} edges, {} acquired",
            stop_reason,
            report.iterations,
            report.graph.node_count(),
            report.graph.edge_count(),
            report.acquired.len()
        );
        Ok(report)
    }

    /// Extracts every locally available document and assembles the graph.
    ///
    /// Documents are processed in path order. A document whose text cannot be
    /// extracted still counts as present, with no outgoing references.
    pub async fn extract_pass(&self) -> Result<ExtractionPass, AppError> {
        let documents = self.corpus.documents()?;
        let mut extractions = Vec::with_capacity(documents.len());
        let mut format_errors = Vec::new();

        for document in &documents {
            match self.text.extract_text(&document.path).await {
                Ok(text) => extractions.push(self.extractor.extract(document, &text)),
                Err(err) => {
                    tracing::warn!("Skipping references of {}: {}", document.id, err);
                    format_errors.push(FormatFailure {
                        id: document.id.clone(),
                        message: err.to_string(),
                    });
                    extractions.push(self.extractor.extract(document, ""));
                }
            }
        }

        let graph = assemble(&extractions);
        Ok(ExtractionPass {
            graph,
            extractions,
            format_errors,
        })
    }

    /// Acquires every frontier item, profiles first, then RFCs.
    pub async fn acquire(&self, frontier: &Frontier) -> AcquisitionPass {
        let mut pass = AcquisitionPass::default();
        self.acquire_profiles(&frontier.profiles, &mut pass).await;
        self.acquire_rfcs(&frontier.rfcs, &mut pass).await;
        pass
    }

    async fn acquire_profiles(&self, items: &[FrontierItem], pass: &mut AcquisitionPass) {
        let mut first = true;
        for item in items {
            if self.corpus.contains(&item.id, item.domain) {
                pass.skipped.push(item.id.clone());
                continue;
            }
            if !first {
                pause(self.config.rate_limit()).await;
            }
            first = false;

            pass.attempts += 1;
            match self.attempt(item).await {
                Ok(()) => pass.acquired.push(item.id.clone()),
                Err(err) => {
                    tracing::warn!("Could not acquire {}: {}", item.id, err);
                    pass.failed.push(item.id.clone());
                }
            }
        }
    }

    async fn acquire_rfcs(&self, items: &[FrontierItem], pass: &mut AcquisitionPass) {
        let threshold = self.config.breaker_threshold;
        let mut consecutive_failures = 0u32;
        let mut first = true;

        for (idx, item) in items.iter().enumerate() {
            if self.corpus.contains(&item.id, item.domain) {
                pass.skipped.push(item.id.clone());
                continue;
            }
            if consecutive_failures >= threshold {
                pass.breaker_tripped = Some(consecutive_failures);
                pass.abandoned = items[idx..]
                    .iter()
                    .filter(|i| !self.corpus.contains(&i.id, i.domain))
                    .map(|i| i.id.clone())
                    .collect();
                tracing::warn!(
                    "Circuit breaker tripped after {} consecutive failures, abandoning {} RFCs",
                    consecutive_failures,
                    pass.abandoned.len()
                );
                break;
            }
            if !first {
                pause(self.config.rate_limit()).await;
            }
            first = false;

            match self.acquire_with_retry(item, &mut pass.attempts).await {
                Ok(()) => {
                    consecutive_failures = 0;
                    pass.acquired.push(item.id.clone());
                }
                Err(err) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        "Giving up on {} for this pass ({} consecutive failures): {}",
                        item.id,
                        consecutive_failures,
                        err
                    );
                    pass.failed.push(item.id.clone());
                }
            }
        }
    }

    /// Attempts an item up to `rfc_max_attempts` times with exponential backoff.
    async fn acquire_with_retry(
        &self,
        item: &FrontierItem,
        attempts: &mut usize,
    ) -> Result<(), AppError> {
        let max_attempts = self.config.rfc_max_attempts.max(1);
        let mut attempt = 1;
        loop {
            *attempts += 1;
            match self.attempt(item).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= max_attempts => return Err(err),
                Err(err) => {
                    let delay = self.config.backoff(attempt);
                    tracing::debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        item.id,
                        err,
                        delay
                    );
                    pause(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One bounded fetch-and-store attempt.
    async fn attempt(&self, item: &FrontierItem) -> Result<(), AppError> {
        let limit = self.config.attempt_timeout();
        let content = match timeout(limit, self.fetcher.fetch(&item.location)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::Timeout {
                    id: item.id.clone(),
                    secs: limit.as_secs(),
                })
            }
        };
        if content.is_empty() {
            return Err(AppError::acquisition(&item.id, "empty response"));
        }
        let path = self.corpus.store(&item.id, item.domain, &content).await?;
        tracing::info!("Acquired {} -> {}", item.id, path.display());
        Ok(())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
