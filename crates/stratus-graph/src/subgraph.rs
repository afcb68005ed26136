//! Filtered subgraph derivation.
//!
//! A seed set (explicit ids, node kinds, or both) is optionally expanded to
//! its neighborhood, then the selected nodes and the edges wholly inside the
//! selection are rebuilt into a fresh snapshot with recomputed metadata.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use stratus_core::{DependencyGraph, EdgeKind, NodeKind};

use crate::build::{BuildConfig, GraphBuilder};
use crate::index::{forward_adjacency, reverse_adjacency};

/// Node/edge selection for [`extract_subgraph`].
///
/// With neither `node_ids` nor `node_kinds`, every node seeds the
/// selection (useful for plain edge-kind filtering).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_kinds: Option<Vec<NodeKind>>,
    /// Keep only edges of these kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_kinds: Option<Vec<EdgeKind>>,
    /// Expand the seed set to neighbors within `max_distance` hops, both
    /// directions.
    #[serde(default)]
    pub include_connected: bool,
    #[serde(default)]
    pub max_distance: usize,
}

/// Derive a new graph containing the filtered selection.
///
/// Edges survive only when their kind matches the filter (if any) and both
/// endpoints are selected. Metadata is recomputed for the derived snapshot.
#[must_use]
#[instrument(skip(graph, filter), fields(graph_id = %graph.id))]
pub fn extract_subgraph(graph: &DependencyGraph, filter: &SubgraphFilter) -> DependencyGraph {
    let mut selected: HashSet<&str> = seed_nodes(graph, filter);

    if filter.include_connected && filter.max_distance > 0 {
        expand_selection(graph, &mut selected, filter.max_distance);
    }

    // Validation is off: endpoints are guaranteed selected, and the source
    // snapshot may itself have been built permissively.
    let mut builder = GraphBuilder::with_config(
        format!("{}:subgraph", graph.id),
        BuildConfig {
            validate_on_add: false,
            allow_duplicate_edges: true,
        },
    );

    for id in graph.node_ids() {
        if selected.contains(id) {
            if let Some(node) = graph.node(id) {
                builder.insert_node_unchecked(node.clone());
            }
        }
    }

    for edge in &graph.edges {
        let kind_ok = filter
            .edge_kinds
            .as_deref()
            .is_none_or(|kinds| kinds.contains(&edge.kind));
        if kind_ok
            && selected.contains(edge.source.as_str())
            && selected.contains(edge.target.as_str())
        {
            builder.push_edge_unchecked(edge.clone());
        }
    }

    builder.build()
}

fn seed_nodes<'a>(graph: &'a DependencyGraph, filter: &SubgraphFilter) -> HashSet<&'a str> {
    if filter.node_ids.is_none() && filter.node_kinds.is_none() {
        return graph.nodes.keys().map(String::as_str).collect();
    }

    let mut seeds: HashSet<&str> = HashSet::new();
    if let Some(ids) = &filter.node_ids {
        for id in ids {
            if let Some(node) = graph.node(id) {
                seeds.insert(node.id.as_str());
            }
        }
    }
    if let Some(kinds) = &filter.node_kinds {
        for node in graph.nodes.values() {
            if kinds.contains(&node.kind) {
                seeds.insert(node.id.as_str());
            }
        }
    }
    seeds
}

/// Grow `selected` by BFS over both edge directions, up to `max_distance`
/// hops from the original seeds.
fn expand_selection<'a>(
    graph: &'a DependencyGraph,
    selected: &mut HashSet<&'a str>,
    max_distance: usize,
) {
    let outgoing = forward_adjacency(graph, None);
    let incoming = reverse_adjacency(graph, None);

    let mut queue: VecDeque<(&str, usize)> =
        selected.iter().map(|&id| (id, 0_usize)).collect();

    while let Some((current, distance)) = queue.pop_front() {
        if distance >= max_distance {
            continue;
        }
        for adj in [&outgoing, &incoming] {
            for &next in adj.get(current).map_or(&[][..], Vec::as_slice) {
                if selected.insert(next) {
                    queue.push_back((next, distance + 1));
                }
            }
        }
    }
}
