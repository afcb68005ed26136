//! Multi-graph union with node-conflict resolution.
//!
//! # Overview
//!
//! Merging unions all nodes and concatenates all edge lists (no edge
//! deduplication: the merged edge count is the sum of the inputs). Node id
//! collisions resolve per [`NodeConflictStrategy`]; independently-built
//! subgraphs that may collide accidentally can instead be namespaced with
//! `node_id_prefix`, which rewrites every node and edge id with a
//! per-source-graph index.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use stratus_core::{DependencyGraph, GraphError, Node, model::metadata::merge_into};

use crate::build::{BuildConfig, GraphBuilder};

/// How to resolve two nodes carrying the same id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeConflictStrategy {
    /// The earliest graph's node wins.
    KeepFirst,
    /// The latest graph's node wins.
    #[default]
    KeepLast,
    /// The latest node wins, with metadata shallow-merged (later values win
    /// per key).
    Merge,
    /// Raise [`GraphError::NodeConflict`] naming the offending id.
    Error,
}

/// Knobs for [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    #[serde(default)]
    pub strategy: NodeConflictStrategy,
    /// When set, every node/edge id becomes `{prefix}{graph_index}:{id}`,
    /// making collisions across inputs impossible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id_prefix: Option<String>,
}

/// Union `graphs` into one snapshot with recomputed metadata.
///
/// # Errors
///
/// `GraphError::NodeConflict` under the `Error` strategy when the same
/// (possibly prefixed) node id appears in more than one input.
#[instrument(skip(graphs, options), fields(inputs = graphs.len()))]
pub fn merge(
    graphs: &[DependencyGraph],
    options: &MergeOptions,
) -> Result<DependencyGraph, GraphError> {
    let mut builder = GraphBuilder::with_config(
        "merged",
        BuildConfig {
            validate_on_add: false,
            allow_duplicate_edges: true,
        },
    );
    let mut seen_nodes: std::collections::HashMap<String, Node> = std::collections::HashMap::new();

    for (index, graph) in graphs.iter().enumerate() {
        for id in graph.node_ids() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let mut node = node.clone();
            node.id = rewrite_id(&node.id, index, options);

            match seen_nodes.get(&node.id) {
                None => {
                    seen_nodes.insert(node.id.clone(), node);
                }
                Some(existing) => match options.strategy {
                    NodeConflictStrategy::KeepFirst => {
                        debug!(node_id = %node.id, "conflict: keeping first");
                    }
                    NodeConflictStrategy::KeepLast => {
                        seen_nodes.insert(node.id.clone(), node);
                    }
                    NodeConflictStrategy::Merge => {
                        let mut merged_metadata = existing.metadata.clone();
                        merge_into(&mut merged_metadata, &node.metadata);
                        node.metadata = merged_metadata;
                        seen_nodes.insert(node.id.clone(), node);
                    }
                    NodeConflictStrategy::Error => {
                        return Err(GraphError::NodeConflict { node_id: node.id });
                    }
                },
            }
        }

        for edge in &graph.edges {
            let mut edge = edge.clone();
            edge.id = rewrite_id(&edge.id, index, options);
            edge.source = rewrite_id(&edge.source, index, options);
            edge.target = rewrite_id(&edge.target, index, options);
            builder.push_edge_unchecked(edge);
        }
    }

    for (_, node) in seen_nodes {
        builder.insert_node_unchecked(node);
    }

    Ok(builder.build())
}

fn rewrite_id(id: &str, graph_index: usize, options: &MergeOptions) -> String {
    options.node_id_prefix.as_ref().map_or_else(
        || id.to_string(),
        |prefix| format!("{prefix}{graph_index}:{id}"),
    )
}

#[cfg(test)]
mod tests {
    use super::{MergeOptions, NodeConflictStrategy, merge};
    use crate::build::GraphBuilder;
    use crate::validate::validate;
    use stratus_core::{
        DependencyGraph, EdgeKind, EdgeMetadata, GraphError, MetaValue, Node, NodeKind,
    };

    fn graph(id: &str, nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut builder = GraphBuilder::new(id);
        for node_id in nodes {
            builder
                .add_node(Node::new(*node_id, NodeKind::TerraformResource, *node_id))
                .expect("node");
        }
        for (source, target) in edges {
            builder
                .add_edge_between(source, target, EdgeKind::References, EdgeMetadata::default())
                .expect("edge");
        }
        builder.build()
    }

    fn node_with_meta(id: &str, key: &str, value: &str) -> Node {
        let mut node = Node::new(id, NodeKind::TerraformResource, id);
        node.metadata.insert(key.to_string(), value.into());
        node
    }

    #[test]
    fn single_graph_merge_is_a_noop_on_counts() {
        let g = graph("g", &["a", "b"], &[("a", "b")]);
        let merged = merge(std::slice::from_ref(&g), &MergeOptions::default()).expect("merge");
        assert_eq!(merged.node_count(), g.node_count());
        assert_eq!(merged.edge_count(), g.edge_count());
    }

    #[test]
    fn disjoint_graphs_sum_exactly() {
        let g1 = graph("g1", &["a", "b"], &[("a", "b")]);
        let g2 = graph("g2", &["c", "d"], &[("c", "d")]);
        let merged = merge(&[g1, g2], &MergeOptions::default()).expect("merge");

        assert_eq!(merged.node_count(), 4);
        assert_eq!(merged.edge_count(), 2);
        assert!(validate(&merged).is_valid);
    }

    #[test]
    fn edge_lists_concatenate_without_dedup() {
        let g1 = graph("g1", &["a", "b"], &[("a", "b")]);
        let g2 = graph("g2", &["a", "b"], &[("a", "b")]);
        let merged = merge(&[g1, g2], &MergeOptions::default()).expect("merge");

        assert_eq!(merged.node_count(), 2);
        assert_eq!(merged.edge_count(), 2, "identical edges are both kept");
    }

    #[test]
    fn keep_first_and_keep_last() {
        let mut b1 = GraphBuilder::new("g1");
        b1.add_node(node_with_meta("shared", "origin", "first"))
            .expect("node");
        let mut b2 = GraphBuilder::new("g2");
        b2.add_node(node_with_meta("shared", "origin", "second"))
            .expect("node");
        let (g1, g2) = (b1.build(), b2.build());

        let first = merge(
            &[g1.clone(), g2.clone()],
            &MergeOptions {
                strategy: NodeConflictStrategy::KeepFirst,
                node_id_prefix: None,
            },
        )
        .expect("merge");
        assert_eq!(
            first.node("shared").and_then(|n| n.metadata["origin"].as_str()),
            Some("first")
        );

        let last = merge(
            &[g1, g2],
            &MergeOptions {
                strategy: NodeConflictStrategy::KeepLast,
                node_id_prefix: None,
            },
        )
        .expect("merge");
        assert_eq!(
            last.node("shared").and_then(|n| n.metadata["origin"].as_str()),
            Some("second")
        );
    }

    #[test]
    fn merge_strategy_shallow_merges_metadata() {
        let mut b1 = GraphBuilder::new("g1");
        let mut node = node_with_meta("shared", "origin", "first");
        node.metadata
            .insert("only_first".to_string(), MetaValue::Bool(true));
        b1.add_node(node).expect("node");

        let mut b2 = GraphBuilder::new("g2");
        b2.add_node(node_with_meta("shared", "origin", "second"))
            .expect("node");

        let merged = merge(
            &[b1.build(), b2.build()],
            &MergeOptions {
                strategy: NodeConflictStrategy::Merge,
                node_id_prefix: None,
            },
        )
        .expect("merge");

        let shared = merged.node("shared").expect("shared node");
        assert_eq!(shared.metadata["origin"].as_str(), Some("second"));
        assert_eq!(shared.metadata["only_first"].as_bool(), Some(true));
    }

    #[test]
    fn error_strategy_names_the_conflict() {
        let g1 = graph("g1", &["shared"], &[]);
        let g2 = graph("g2", &["shared"], &[]);
        let err = merge(
            &[g1, g2],
            &MergeOptions {
                strategy: NodeConflictStrategy::Error,
                node_id_prefix: None,
            },
        )
        .expect_err("conflict");
        assert_eq!(
            err,
            GraphError::NodeConflict {
                node_id: "shared".to_string()
            }
        );
    }

    #[test]
    fn prefix_namespaces_away_collisions() {
        let g1 = graph("g1", &["web", "db"], &[("web", "db")]);
        let g2 = graph("g2", &["web", "db"], &[("web", "db")]);
        let merged = merge(
            &[g1, g2],
            &MergeOptions {
                strategy: NodeConflictStrategy::Error,
                node_id_prefix: Some("m".to_string()),
            },
        )
        .expect("prefixed ids cannot conflict");

        assert_eq!(merged.node_count(), 4);
        assert_eq!(merged.edge_count(), 2);
        assert!(merged.contains_node("m0:web"));
        assert!(merged.contains_node("m1:web"));
        assert!(validate(&merged).is_valid, "edge endpoints were rewritten");
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let merged = merge(&[], &MergeOptions::default()).expect("merge");
        assert_eq!(merged.node_count(), 0);
        assert_eq!(merged.edge_count(), 0);
    }
}
