//! refgraph - reference graph crawler for technical standards
//!
//! Extracts normative and informative citations from a corpus of standards
//! documents, assembles them into a directed reference graph, and acquires
//! missing external documents until the graph reaches a fixed point.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod services;
pub mod sources;
