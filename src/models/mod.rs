//! Domain models for the reference graph.

mod extraction;
mod graph;
mod identifier;

pub use extraction::{DocumentExtraction, DomainReferences};
pub use graph::{
    DocumentNode, GraphSnapshot, GraphStats, NodeRecord, ReferenceEdge, ReferenceGraph,
};
pub use identifier::{Classification, Domain};
