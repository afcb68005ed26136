//! Property tests for builder determinism and structural invariants.

use proptest::prelude::*;

use stratus_core::{DependencyGraph, EdgeKind, EdgeMetadata, Node, NodeKind};
use stratus_graph::build::GraphBuilder;
use stratus_graph::merge::{MergeOptions, NodeConflictStrategy, merge};
use stratus_graph::validate::validate;

const NODE_POOL: usize = 12;

fn node_name(index: usize) -> String {
    format!("node-{index}")
}

/// One randomized build sequence: node inserts, edge inserts between
/// already-present nodes, then node removals.
#[derive(Debug, Clone)]
struct BuildSequence {
    nodes: Vec<usize>,
    edges: Vec<(usize, usize)>,
    removals: Vec<usize>,
}

fn sequence_strategy() -> impl Strategy<Value = BuildSequence> {
    (
        prop::collection::vec(0..NODE_POOL, 1..20),
        prop::collection::vec((0..NODE_POOL, 0..NODE_POOL), 0..30),
        prop::collection::vec(0..NODE_POOL, 0..6),
    )
        .prop_map(|(nodes, edges, removals)| BuildSequence {
            nodes,
            edges,
            removals,
        })
}

fn apply(sequence: &BuildSequence) -> DependencyGraph {
    let mut builder = GraphBuilder::new("prop");
    for &index in &sequence.nodes {
        builder
            .add_node(Node::new(
                node_name(index),
                NodeKind::TerraformResource,
                node_name(index),
            ))
            .expect("node ids are never empty");
    }
    for &(source, target) in &sequence.edges {
        let (source, target) = (node_name(source), node_name(target));
        // Endpoints the sequence never inserted are rejected by the
        // builder; those edges are simply skipped.
        let _kept = builder
            .add_edge_between(&source, &target, EdgeKind::References, EdgeMetadata::default())
            .is_ok();
    }
    for &index in &sequence.removals {
        builder.remove_node(&node_name(index));
    }
    builder.build()
}

proptest! {
    /// Identical add/remove sequences yield identical node/edge sets,
    /// counts, and content hash (timestamps excluded).
    #[test]
    fn identical_sequences_build_identical_graphs(sequence in sequence_strategy()) {
        let first = apply(&sequence);
        let second = apply(&sequence);

        prop_assert_eq!(&first.nodes, &second.nodes);
        prop_assert_eq!(&first.edges, &second.edges);
        prop_assert_eq!(&first.metadata.node_counts, &second.metadata.node_counts);
        prop_assert_eq!(&first.metadata.edge_counts, &second.metadata.edge_counts);
        prop_assert_eq!(&first.metadata.content_hash, &second.metadata.content_hash);
    }

    /// Whatever the sequence, cascade removal leaves no dangling edges:
    /// every surviving edge has both endpoints present.
    #[test]
    fn built_graphs_always_validate(sequence in sequence_strategy()) {
        let graph = apply(&sequence);
        let report = validate(&graph);
        prop_assert!(report.is_valid, "errors: {:?}", report.errors);
    }

    /// Per-kind counts always sum to the node/edge totals.
    #[test]
    fn metadata_counts_are_consistent(sequence in sequence_strategy()) {
        let graph = apply(&sequence);
        let node_total: usize = graph.metadata.node_counts.values().sum();
        let edge_total: usize = graph.metadata.edge_counts.values().sum();
        prop_assert_eq!(node_total, graph.node_count());
        prop_assert_eq!(edge_total, graph.edge_count());
    }

    /// Namespacing makes the `Error` conflict strategy safe for any pair
    /// of graphs, even with fully overlapping raw ids.
    #[test]
    fn prefixed_merge_never_conflicts(
        first in sequence_strategy(),
        second in sequence_strategy(),
    ) {
        let graphs = [apply(&first), apply(&second)];
        let merged = merge(
            &graphs,
            &MergeOptions {
                strategy: NodeConflictStrategy::Error,
                node_id_prefix: Some("scan".to_string()),
            },
        );
        prop_assert!(merged.is_ok());

        let merged = merged.expect("checked ok");
        prop_assert_eq!(
            merged.node_count(),
            graphs[0].node_count() + graphs[1].node_count()
        );
        prop_assert_eq!(
            merged.edge_count(),
            graphs[0].edge_count() + graphs[1].edge_count()
        );
        prop_assert!(validate(&merged).is_valid);
    }
}
