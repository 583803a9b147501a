//! Graph assembly from a batch of per-document extractions.

use crate::extract::normalize;
use crate::models::{
    Classification, DocumentExtraction, Domain, DomainReferences, ReferenceEdge, ReferenceGraph,
};

/// Builds the reference graph for one pass.
///
/// The graph is a fresh value owned by this call. Every document becomes a
/// present node, every extracted identifier becomes an edge to a (possibly
/// placeholder) node, and reference counts are left to be derived from the
/// edge list, so assembling the same batch twice yields the same graph.
pub fn assemble(batch: &[DocumentExtraction]) -> ReferenceGraph {
    let mut graph = ReferenceGraph::new();

    for doc in batch {
        graph.absorb_document(&doc.id, doc.domain, doc.path.clone(), doc.is_draft);
    }

    for doc in batch {
        for (&domain, refs) in &doc.references {
            for (target, classification) in targets(doc.sectioned, refs) {
                let to = match domain {
                    Domain::Etsi => match normalize::from_citation(target) {
                        Some(id) => id,
                        None => continue,
                    },
                    _ => target.clone(),
                };
                graph.add_edge(ReferenceEdge {
                    from: doc.id.clone(),
                    to,
                    classification,
                    domain,
                });
            }
        }
    }

    tracing::debug!(
        documents = batch.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Assembled reference graph"
    );
    graph
}

/// Identifiers to link with their classification.
///
/// Documents without references sections only have an `all` set; those
/// citations cannot be shown to be normative and are linked as informative.
fn targets(
    sectioned: bool,
    refs: &DomainReferences,
) -> Box<dyn Iterator<Item = (&String, Classification)> + '_> {
    if sectioned {
        Box::new(
            refs.normative
                .iter()
                .map(|id| (id, Classification::Normative))
                .chain(
                    refs.informative
                        .iter()
                        .map(|id| (id, Classification::Informative)),
                ),
        )
    } else {
        Box::new(refs.all.iter().map(|id| (id, Classification::Informative)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn extraction(
        id: &str,
        is_draft: bool,
        references: Vec<(Domain, DomainReferences)>,
    ) -> DocumentExtraction {
        DocumentExtraction {
            id: id.to_string(),
            domain: Domain::Etsi,
            path: format!("{id}.txt").into(),
            is_draft,
            sectioned: true,
            references: references.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    fn sample_batch() -> Vec<DocumentExtraction> {
        vec![
            extraction(
                "EN 319 401",
                false,
                vec![(
                    Domain::Etsi,
                    DomainReferences::classified(set(&["EN 319 411-1"]), BTreeSet::new()),
                )],
            ),
            extraction(
                "EN 319 411-1",
                false,
                vec![
                    (
                        Domain::Etsi,
                        DomainReferences::classified(set(&["EN 319 401"]), set(&["TS 119 312"])),
                    ),
                    (
                        Domain::Rfc,
                        DomainReferences::classified(BTreeSet::new(), set(&["RFC 3647"])),
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn test_assemble_nodes_and_edges() {
        let graph = assemble(&sample_batch());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.is_present("EN 319 401"));
        assert!(!graph.is_present("TS 119 312"));

        let rfc = graph.node("RFC 3647").unwrap();
        assert_eq!(rfc.domain, Domain::Rfc);
        assert_eq!(rfc.doc_type, "RFC");
        assert_eq!(graph.inbound("EN 319 401"), 1);
        assert_eq!(graph.outbound("EN 319 411-1"), 3);
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let batch = sample_batch();
        let first = assemble(&batch);
        let second = assemble(&batch);
        assert_eq!(first, second);
        assert_eq!(first.stats(), second.stats());
    }

    #[test]
    fn test_assemble_is_order_independent_for_counts() {
        let mut batch = sample_batch();
        let forward = assemble(&batch);
        batch.reverse();
        let backward = assemble(&batch);

        for node in forward.nodes() {
            assert_eq!(forward.inbound(&node.id), backward.inbound(&node.id));
            assert_eq!(forward.outbound(&node.id), backward.outbound(&node.id));
        }
        assert_eq!(forward.stats(), backward.stats());
    }

    #[test]
    fn test_self_citation_produces_no_edge() {
        let batch = vec![extraction(
            "EN 319 401",
            false,
            vec![(
                Domain::Etsi,
                DomainReferences::classified(set(&["EN 319 401"]), BTreeSet::new()),
            )],
        )];
        let graph = assemble(&batch);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_draft_does_not_replace_published() {
        let mut draft = extraction("EN 319 401", true, Vec::new());
        draft.path = "drafts/en_319401.txt".into();
        let published = extraction("EN 319 401", false, Vec::new());

        for batch in [
            vec![draft.clone(), published.clone()],
            vec![published.clone(), draft.clone()],
        ] {
            let graph = assemble(&batch);
            let node = graph.node("EN 319 401").unwrap();
            assert!(!node.is_draft);
            assert_eq!(node.path.as_deref(), Some(published.path.as_path()));
        }
    }

    #[test]
    fn test_draft_promotes_placeholder() {
        let citing = extraction(
            "EN 319 411-1",
            false,
            vec![(
                Domain::Etsi,
                DomainReferences::classified(set(&["TS 119 102-1"]), BTreeSet::new()),
            )],
        );
        let draft = extraction("TS 119 102-1", true, Vec::new());
        let graph = assemble(&[citing, draft]);
        let node = graph.node("TS 119 102-1").unwrap();
        assert!(node.is_present());
        assert!(node.is_draft);
        assert_eq!(graph.inbound("TS 119 102-1"), 1);
    }

    #[test]
    fn test_unsectioned_documents_link_informatively() {
        let mut doc = extraction("TR 119 000", false, Vec::new());
        doc.sectioned = false;
        doc.references.insert(
            Domain::Etsi,
            DomainReferences::unclassified(set(&["EN 319 401", "TR 119 000"])),
        );
        let graph = assemble(&[doc]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].classification, Classification::Informative);
    }
}
