//! Per-document extraction results.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Domain;

/// Identifiers found in one document for one domain.
///
/// `informative` never contains an identifier that is also normative, and
/// `all` is the union of both (or the whole-document scan when the document
/// has no references sections).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReferences {
    pub normative: BTreeSet<String>,
    pub informative: BTreeSet<String>,
    pub all: BTreeSet<String>,
}

impl DomainReferences {
    /// Builds the classification for a sectioned document, giving normative precedence.
    pub fn classified(normative: BTreeSet<String>, informative: BTreeSet<String>) -> Self {
        let informative: BTreeSet<String> = informative.difference(&normative).cloned().collect();
        let all = normative.union(&informative).cloned().collect();
        Self {
            normative,
            informative,
            all,
        }
    }

    /// Builds an unclassified result from a whole-document scan.
    pub fn unclassified(all: BTreeSet<String>) -> Self {
        Self {
            all,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// The result of running the reference extractor over one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    /// Canonical identifier of the document itself.
    pub id: String,
    /// Domain of the document itself.
    pub domain: Domain,
    /// Where the document content is stored.
    pub path: PathBuf,
    /// Whether the document is a draft.
    pub is_draft: bool,
    /// False when no references heading was found and the whole text was scanned.
    pub sectioned: bool,
    /// Extracted identifiers keyed by domain. Empty domains are omitted.
    pub references: BTreeMap<Domain, DomainReferences>,
}

impl DocumentExtraction {
    pub fn references_for(&self, domain: Domain) -> Option<&DomainReferences> {
        self.references.get(&domain)
    }

    /// Total number of distinct identifiers across all domains.
    pub fn reference_count(&self) -> usize {
        self.references.values().map(|r| r.all.len()).sum()
    }
}
