//! Read-only traversal queries: dependents, dependencies, shortest path.
//!
//! # Direction
//!
//! Downstream follows edges *backward* (who points into this node: its
//! dependents, the things a change here ripples out to). Upstream follows
//! edges forward (what this node depends on). A missing start id yields an
//! empty result, never an error.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use stratus_core::{DependencyGraph, EdgeKind, GraphEdge, Node};

use crate::index::{forward_adjacency, reverse_adjacency};

// ---------------------------------------------------------------------------
// Options and result types
// ---------------------------------------------------------------------------

/// Knobs for [`downstream`] / [`upstream`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOptions {
    /// Stop after this many hops from the start node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Include the start node itself in the result set.
    #[serde(default)]
    pub include_start: bool,
    /// Only walk edges of these kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_kinds: Option<Vec<EdgeKind>>,
}

/// The walk from the start node to one visited node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPath {
    pub start_node_id: String,
    /// Node ids from the start to the visited node, inclusive.
    pub node_ids: Vec<String>,
    /// Hop count (`node_ids.len() - 1`).
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub max_depth_reached: usize,
}

/// The result of one traversal query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    /// Visited nodes in discovery order.
    pub nodes: Vec<Node>,
    /// Kind-eligible edges between visited nodes (start included), in the
    /// snapshot's edge order.
    pub edges: Vec<GraphEdge>,
    /// One path per visited node.
    pub paths: Vec<TraversalPath>,
    pub stats: TraversalStats,
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Nodes that transitively depend on `start_id` (edges followed backward).
#[must_use]
#[instrument(skip(graph, options), fields(graph_id = %graph.id))]
pub fn downstream(
    graph: &DependencyGraph,
    start_id: &str,
    options: &TraversalOptions,
) -> Traversal {
    let adj = reverse_adjacency(graph, options.edge_kinds.as_deref());
    walk(graph, start_id, options, &adj)
}

/// Nodes that `start_id` transitively depends on (edges followed forward).
#[must_use]
#[instrument(skip(graph, options), fields(graph_id = %graph.id))]
pub fn upstream(graph: &DependencyGraph, start_id: &str, options: &TraversalOptions) -> Traversal {
    let adj = forward_adjacency(graph, options.edge_kinds.as_deref());
    walk(graph, start_id, options, &adj)
}

fn walk(
    graph: &DependencyGraph,
    start_id: &str,
    options: &TraversalOptions,
    adj: &HashMap<&str, Vec<&str>>,
) -> Traversal {
    if !graph.contains_node(start_id) {
        return Traversal::default();
    }

    let mut depth: HashMap<&str, usize> = HashMap::from([(start_id, 0)]);
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::from([start_id]);

    while let Some(current) = queue.pop_front() {
        let current_depth = depth[current];
        if options.max_depth.is_some_and(|limit| current_depth >= limit) {
            continue;
        }
        for &next in adj.get(current).map_or(&[][..], Vec::as_slice) {
            if depth.contains_key(next) {
                continue;
            }
            depth.insert(next, current_depth + 1);
            parent.insert(next, current);
            order.push(next);
            queue.push_back(next);
        }
    }

    let mut nodes: Vec<Node> = Vec::with_capacity(order.len() + 1);
    let mut paths: Vec<TraversalPath> = Vec::with_capacity(order.len() + 1);
    if options.include_start {
        if let Some(node) = graph.node(start_id) {
            nodes.push(node.clone());
        }
        paths.push(TraversalPath {
            start_node_id: start_id.to_string(),
            node_ids: vec![start_id.to_string()],
            length: 0,
        });
    }
    for &id in &order {
        if let Some(node) = graph.node(id) {
            nodes.push(node.clone());
        }
        paths.push(reconstruct_path(start_id, id, &parent));
    }

    // Result-set membership for edge collection always includes the start,
    // so connecting edges survive even when the start node is excluded.
    let mut in_result: HashSet<&str> = order.iter().copied().collect();
    in_result.insert(start_id);
    let edges: Vec<GraphEdge> = graph
        .edges
        .iter()
        .filter(|edge| {
            options
                .edge_kinds
                .as_deref()
                .is_none_or(|kinds| kinds.contains(&edge.kind))
                && in_result.contains(edge.source.as_str())
                && in_result.contains(edge.target.as_str())
        })
        .cloned()
        .collect();

    let max_depth_reached = order.iter().map(|id| depth[id]).max().unwrap_or(0);

    Traversal {
        stats: TraversalStats {
            nodes_visited: nodes.len(),
            max_depth_reached,
        },
        nodes,
        edges,
        paths,
    }
}

fn reconstruct_path(start_id: &str, end_id: &str, parent: &HashMap<&str, &str>) -> TraversalPath {
    let mut node_ids: Vec<String> = vec![end_id.to_string()];
    let mut cursor = end_id;
    while cursor != start_id {
        let Some(&previous) = parent.get(cursor) else {
            break;
        };
        node_ids.push(previous.to_string());
        cursor = previous;
    }
    node_ids.reverse();

    TraversalPath {
        start_node_id: start_id.to_string(),
        length: node_ids.len().saturating_sub(1),
        node_ids,
    }
}

/// Unweighted shortest path from `source_id` to `target_id` along edge
/// direction. `None` when either id is absent or no path exists; a present
/// `source_id == target_id` yields a zero-length path of just that node.
#[must_use]
pub fn shortest_path(
    graph: &DependencyGraph,
    source_id: &str,
    target_id: &str,
) -> Option<TraversalPath> {
    if !graph.contains_node(source_id) || !graph.contains_node(target_id) {
        return None;
    }
    if source_id == target_id {
        return Some(TraversalPath {
            start_node_id: source_id.to_string(),
            node_ids: vec![source_id.to_string()],
            length: 0,
        });
    }

    let adj = forward_adjacency(graph, None);
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::from([source_id]);
    let mut queue: VecDeque<&str> = VecDeque::from([source_id]);

    while let Some(current) = queue.pop_front() {
        for &next in adj.get(current).map_or(&[][..], Vec::as_slice) {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == target_id {
                return Some(reconstruct_path(source_id, target_id, &parent));
            }
            queue.push_back(next);
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
