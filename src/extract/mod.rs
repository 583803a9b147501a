//! Reference extraction: segmentation, pattern matching and normalization.
//!
//! The extractor turns the plain text of one document into a
//! [`DocumentExtraction`]: for every identifier domain, which documents are
//! cited normatively, which informatively, and the union of both.

pub mod normalize;
pub mod patterns;
pub mod profiles;
pub mod sections;

use std::collections::BTreeMap;

use crate::models::{DocumentExtraction, Domain, DomainReferences};
use crate::sources::CorpusDocument;

pub use sections::{segment, Sections};

/// Runs the segmenter and pattern matcher over a document's text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts and classifies the references of one corpus document.
    pub fn extract(&self, document: &CorpusDocument, text: &str) -> DocumentExtraction {
        let (sectioned, references) = Self::classify(text);
        tracing::debug!(
            id = %document.id,
            sectioned,
            references = references.values().map(|r| r.all.len()).sum::<usize>(),
            "Extracted references"
        );

        DocumentExtraction {
            id: document.id.clone(),
            domain: document.domain,
            path: document.path.clone(),
            is_draft: document.is_draft,
            sectioned,
            references,
        }
    }

    /// Classifies the citations in `text` by domain.
    ///
    /// When the text has references headings, identifiers are split into
    /// normative and informative with normative taking precedence. Otherwise the
    /// whole text is scanned, for the primary-standard domain only, and only the
    /// `all` set is filled: external-domain tokens outside a references section
    /// are too often examples or prose.
    pub fn classify(text: &str) -> (bool, BTreeMap<Domain, DomainReferences>) {
        let sections = segment(text);
        if !sections.is_sectioned() {
            let mut references = BTreeMap::new();
            let all = patterns::scan(text, Domain::Etsi);
            if !all.is_empty() {
                references.insert(Domain::Etsi, DomainReferences::unclassified(all));
            }
            return (false, references);
        }

        let references = Domain::ALL
            .into_iter()
            .map(|domain| {
                let normative = sections
                    .normative
                    .map(|region| patterns::scan(region, domain))
                    .unwrap_or_default();
                let informative = sections
                    .informative
                    .map(|region| patterns::scan(region, domain))
                    .unwrap_or_default();
                (domain, DomainReferences::classified(normative, informative))
            })
            .filter(|(_, refs)| !refs.is_empty())
            .collect();
        (true, references)
    }
}
