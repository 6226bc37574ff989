//! Merge per-chunk graphs into one bounded knowledge graph
//!
//! 1. Nodes are deduplicated by id in chunk order; the first occurrence wins
//!    and later duplicates are discarded, never merged.
//! 2. Relationships are concatenated in chunk order, then within-chunk order.
//! 3. The concatenation is front-truncated to the relationship cap, once.
//! 4. Nodes not referenced by a surviving relationship are pruned.

use ledgerlens_domain::{GraphDocument, KnowledgeGraph, Node, Relationship};
use std::collections::HashSet;
use tracing::info;

/// Merge chunk results, keeping at most `relationship_cap` relationships.
///
/// Deterministic: the same input always yields the same graph.
pub fn merge(per_chunk: &[GraphDocument], relationship_cap: usize) -> KnowledgeGraph {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes: Vec<&Node> = Vec::new();
    for node in per_chunk.iter().flat_map(|doc| &doc.nodes) {
        if seen.insert(node.id.as_str()) {
            nodes.push(node);
        }
    }

    let mut relationships: Vec<&Relationship> = per_chunk
        .iter()
        .flat_map(|doc| &doc.relationships)
        .collect();

    if relationships.len() > relationship_cap {
        info!(
            total = relationships.len(),
            cap = relationship_cap,
            "Pruning relationships to the first {}",
            relationship_cap
        );
        relationships.truncate(relationship_cap);
    }

    let referenced: HashSet<&str> = relationships
        .iter()
        .flat_map(|rel| [rel.source.as_str(), rel.target.as_str()])
        .collect();

    let nodes: Vec<Node> = nodes
        .into_iter()
        .filter(|node| referenced.contains(node.id.as_str()))
        .cloned()
        .collect();

    KnowledgeGraph::new(nodes, relationships.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_domain::UNKNOWN_NODE_TYPE;

    fn doc(nodes: &[(&str, &str)], rels: &[(&str, &str, &str)]) -> GraphDocument {
        GraphDocument::new(
            nodes.iter().map(|(id, t)| Node::new(*id, *t)).collect(),
            rels.iter()
                .map(|(s, t, r)| Relationship::new(*s, *t, *r))
                .collect(),
        )
    }

    #[test]
    fn test_first_node_type_wins() {
        let chunks = vec![
            doc(&[("Acme", "Company")], &[("Acme", "Cloud", "HAS_SEGMENT")]),
            doc(&[("Acme", "Organization")], &[]),
        ];

        let graph = merge(&chunks, 250);
        assert_eq!(graph.node_type("Acme"), "Company");
    }

    #[test]
    fn test_relationships_not_deduplicated() {
        let chunks = vec![
            doc(&[], &[("Acme", "Cloud", "HAS_SEGMENT")]),
            doc(&[], &[("Acme", "Cloud", "HAS_SEGMENT")]),
        ];

        assert_eq!(merge(&chunks, 250).relationship_count(), 2);
    }

    #[test]
    fn test_unreferenced_node_pruned() {
        let chunks = vec![doc(
            &[("Acme", "Company"), ("Cloud", "Business Segment"), ("Orphan", "Person")],
            &[("Acme", "Cloud", "HAS_SEGMENT")],
        )];

        let graph = merge(&chunks, 250);
        assert!(graph.node("Orphan").is_none());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_endpoint_without_node_is_unknown() {
        let chunks = vec![doc(&[("Acme", "Company")], &[("Acme", "Jane Doe", "LED_BY")])];

        let graph = merge(&chunks, 250);
        assert_eq!(graph.node_type("Jane Doe"), UNKNOWN_NODE_TYPE);
    }

    #[test]
    fn test_cap_applies_across_chunks() {
        let chunks = vec![
            doc(&[], &[("A", "B", "R1"), ("A", "C", "R2")]),
            doc(&[], &[("A", "D", "R3"), ("A", "E", "R4")]),
        ];

        let graph = merge(&chunks, 3);
        let kinds: Vec<_> = graph
            .relationships()
            .iter()
            .map(|r| r.rel_type.as_str())
            .collect();
        assert_eq!(kinds, vec!["R1", "R2", "R3"]);
        assert!(graph.node("E").is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(&[], 250).is_empty());
        assert!(merge(&[GraphDocument::empty()], 250).is_empty());
    }

    fn arb_chunk() -> impl proptest::strategy::Strategy<Value = GraphDocument> {
        use proptest::prelude::*;
        (
            proptest::collection::vec(("[a-h]", "[A-C]"), 0..8),
            proptest::collection::vec(("[a-h]", "[a-h]", "[X-Z]"), 0..12),
        )
            .prop_map(|(nodes, rels)| {
                GraphDocument::new(
                    nodes.into_iter().map(|(id, t)| Node::new(id, t)).collect(),
                    rels.into_iter()
                        .map(|(s, t, r)| Relationship::new(s, t, r))
                        .collect(),
                )
            })
    }

    proptest::proptest! {
        #[test]
        fn prop_merge_is_deterministic(chunks in proptest::collection::vec(arb_chunk(), 0..6), cap in 0usize..40) {
            proptest::prop_assert_eq!(merge(&chunks, cap), merge(&chunks, cap));
        }

        #[test]
        fn prop_cap_keeps_prefix_and_prunes(chunks in proptest::collection::vec(arb_chunk(), 0..6), cap in 0usize..40) {
            let graph = merge(&chunks, cap);
            let all: Vec<Relationship> = chunks.iter().flat_map(|c| c.relationships.clone()).collect();
            let expected: Vec<Relationship> = all.into_iter().take(cap).collect();

            proptest::prop_assert_eq!(graph.relationships(), expected.as_slice());

            let referenced: HashSet<&str> = graph
                .relationships()
                .iter()
                .flat_map(|r| [r.source.as_str(), r.target.as_str()])
                .collect();
            for node in graph.nodes() {
                proptest::prop_assert!(referenced.contains(node.id.as_str()));
            }
            for id in &referenced {
                proptest::prop_assert!(graph.node(id).is_some());
            }
        }

        #[test]
        fn prop_first_seen_type_survives(chunks in proptest::collection::vec(arb_chunk(), 1..6)) {
            let graph = merge(&chunks, usize::MAX);
            for node in graph.nodes() {
                let first = chunks
                    .iter()
                    .flat_map(|c| &c.nodes)
                    .find(|n| n.id == node.id);
                if let Some(first) = first {
                    proptest::prop_assert_eq!(&first.node_type, &node.node_type);
                }
            }
        }
    }
}
