//! The reference graph engine.
//!
//! Services turn extractions into a graph, compute what is still missing, and
//! drive acquisition until the corpus stops growing.

mod assembler;
mod crawler;
mod frontier;

pub use assembler::assemble;
pub use crawler::{
    AcquisitionPass, CrawlEvent, CrawlReport, CrawlState, Crawler, ExtractionPass, FormatFailure,
    StopReason,
};
pub use frontier::{resolve, Frontier, FrontierItem};
