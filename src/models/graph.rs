//! Reference graph model and the snapshot record handed to renderers.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Classification, Domain};
use crate::extract::profiles;

/// A vertex of the reference graph: one logical document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Canonical identifier.
    pub id: String,
    /// Identifier domain.
    pub domain: Domain,
    /// First token of the identifier (`EN`, `TS`, `RFC`, ...).
    pub doc_type: String,
    /// Stored content, or `None` for a placeholder.
    pub path: Option<PathBuf>,
    /// Whether the stored content is a draft.
    pub is_draft: bool,
}

impl DocumentNode {
    /// Creates a placeholder node with no acquired content.
    pub fn placeholder(id: impl Into<String>, domain: Domain) -> Self {
        let id = id.into();
        let doc_type = id.split_whitespace().next().unwrap_or_default().to_string();
        Self {
            id,
            domain,
            doc_type,
            path: None,
            is_draft: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.path.is_some()
    }

    /// Applies acquired content to this node.
    ///
    /// A placeholder takes the first content it sees. Any content replaces a
    /// draft, but a draft never replaces published content. Documents are
    /// absorbed in path order, so the newest draft version wins. Returns whether
    /// the node changed.
    pub fn absorb(&mut self, path: PathBuf, is_draft: bool) -> bool {
        let replace = match (&self.path, self.is_draft, is_draft) {
            (None, _, _) => true,
            (Some(_), true, _) => true,
            (Some(_), false, _) => false,
        };
        if replace {
            self.path = Some(path);
            self.is_draft = is_draft;
        }
        replace
    }
}

/// A directed citation from one document to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub from: String,
    pub to: String,
    pub classification: Classification,
    pub domain: Domain,
}

/// The node set plus the edge list.
///
/// Reference counts are always derived from the edge list; nodes carry no
/// counters of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGraph {
    nodes: BTreeMap<String, DocumentNode>,
    edges: Vec<ReferenceEdge>,
    edge_index: HashMap<(String, String, Domain), usize>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `id`, creating a placeholder if it does not exist.
    pub fn ensure_node(&mut self, id: &str, domain: Domain) -> &mut DocumentNode {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| DocumentNode::placeholder(id, domain))
    }

    /// Records acquired content for `id`, applying the draft merge rule.
    pub fn absorb_document(
        &mut self,
        id: &str,
        domain: Domain,
        path: PathBuf,
        is_draft: bool,
    ) -> bool {
        self.ensure_node(id, domain).absorb(path, is_draft)
    }

    /// Adds an edge, creating placeholder endpoints as needed.
    ///
    /// Self-loops are dropped. For a given ordered pair and domain only one edge
    /// is kept: a normative edge suppresses an informative one, and an
    /// informative edge is upgraded in place when a normative duplicate arrives.
    /// Returns whether the edge list changed.
    pub fn add_edge(&mut self, edge: ReferenceEdge) -> bool {
        if edge.from == edge.to {
            return false;
        }
        self.ensure_node(&edge.to, edge.domain);

        let key = (edge.from.clone(), edge.to.clone(), edge.domain);
        match self.edge_index.get(&key) {
            Some(&idx) => {
                let existing = &mut self.edges[idx];
                if existing.classification == Classification::Informative
                    && edge.classification == Classification::Normative
                {
                    existing.classification = Classification::Normative;
                    true
                } else {
                    false
                }
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(edge);
                true
            }
        }
    }

    pub fn node(&self, id: &str) -> Option<&DocumentNode> {
        self.nodes.get(id)
    }

    /// Nodes ordered by identifier.
    pub fn nodes(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_present(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(DocumentNode::is_present)
    }

    /// Number of edges pointing at `id`.
    pub fn inbound(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.to == id).count()
    }

    /// Number of edges leaving `id`.
    pub fn outbound(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.from == id).count()
    }

    /// Aggregate statistics for the current node and edge sets.
    pub fn stats(&self) -> GraphStats {
        let mut by_classification = BTreeMap::new();
        let mut by_domain = BTreeMap::new();
        for edge in &self.edges {
            *by_classification.entry(edge.classification).or_insert(0) += 1;
            *by_domain.entry(edge.domain).or_insert(0) += 1;
        }
        let present = self.nodes.values().filter(|n| n.is_present()).count();

        GraphStats {
            nodes: self.nodes.len(),
            present,
            placeholders: self.nodes.len() - present,
            drafts: self.nodes.values().filter(|n| n.is_draft).count(),
            edges: self.edges.len(),
            by_classification,
            by_domain,
        }
    }

    /// Builds the serializable record consumed by renderers.
    pub fn snapshot(&self, generated_at: DateTime<Utc>) -> GraphSnapshot {
        let mut inbound: HashMap<&str, usize> = HashMap::new();
        let mut outbound: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *inbound.entry(edge.to.as_str()).or_insert(0) += 1;
            *outbound.entry(edge.from.as_str()).or_insert(0) += 1;
        }

        let nodes = self
            .nodes
            .values()
            .map(|node| NodeRecord {
                inbound: inbound.get(node.id.as_str()).copied().unwrap_or(0),
                outbound: outbound.get(node.id.as_str()).copied().unwrap_or(0),
                node: node.clone(),
            })
            .collect();

        GraphSnapshot {
            generated_at,
            registry_version: profiles::REGISTRY_VERSION,
            nodes,
            edges: self.edges.clone(),
            stats: self.stats(),
        }
    }
}

/// Aggregate counts over a reference graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub present: usize,
    pub placeholders: usize,
    pub drafts: usize,
    pub edges: usize,
    pub by_classification: BTreeMap<Classification, usize>,
    pub by_domain: BTreeMap<Domain, usize>,
}

/// A node together with its derived reference counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub node: DocumentNode,
    pub inbound: usize,
    pub outbound: usize,
}

/// The flat graph record written for diagram, report and visualization tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub generated_at: DateTime<Utc>,
    /// Version of the foundation-profile alias table the graph was built with.
    pub registry_version: u32,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<ReferenceEdge>,
    pub stats: GraphStats,
}
