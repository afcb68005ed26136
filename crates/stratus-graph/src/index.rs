//! Internal adapters between a [`DependencyGraph`] snapshot and the
//! structures the algorithms want: a petgraph [`DiGraph`] for SCC work and
//! plain adjacency maps for BFS traversals.
//!
//! Edges whose endpoints are missing from the node set are skipped here;
//! the validator is the component that reports them.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use stratus_core::{DependencyGraph, EdgeKind};

/// A petgraph view of a snapshot.
///
/// Node weights are node ids; edge weights index into the snapshot's edge
/// sequence. Nodes are inserted in sorted-id order so index assignment is
/// deterministic across builds.
pub(crate) struct GraphIndex {
    pub graph: DiGraph<String, usize>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl GraphIndex {
    pub fn from_graph(source: &DependencyGraph) -> Self {
        let mut graph = DiGraph::<String, usize>::new();
        let mut node_map: HashMap<String, NodeIndex> =
            HashMap::with_capacity(source.node_count());

        for id in source.node_ids() {
            let idx = graph.add_node(id.to_string());
            node_map.insert(id.to_string(), idx);
        }

        for (position, edge) in source.edges.iter().enumerate() {
            let (Some(&from), Some(&to)) =
                (node_map.get(&edge.source), node_map.get(&edge.target))
            else {
                continue;
            };
            graph.add_edge(from, to, position);
        }

        Self { graph, node_map }
    }

    pub fn node_id(&self, idx: NodeIndex) -> &str {
        self.graph.node_weight(idx).map_or("", String::as_str)
    }
}

/// `source -> [target]` adjacency over edges with both endpoints present,
/// optionally restricted to the given edge kinds. Neighbor order follows
/// edge insertion order.
pub(crate) fn forward_adjacency<'a>(
    graph: &'a DependencyGraph,
    kinds: Option<&[EdgeKind]>,
) -> HashMap<&'a str, Vec<&'a str>> {
    adjacency(graph, kinds, false)
}

/// `target -> [source]` adjacency, the reverse orientation of
/// [`forward_adjacency`].
pub(crate) fn reverse_adjacency<'a>(
    graph: &'a DependencyGraph,
    kinds: Option<&[EdgeKind]>,
) -> HashMap<&'a str, Vec<&'a str>> {
    adjacency(graph, kinds, true)
}

fn adjacency<'a>(
    graph: &'a DependencyGraph,
    kinds: Option<&[EdgeKind]>,
    reverse: bool,
) -> HashMap<&'a str, Vec<&'a str>> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in &graph.edges {
        if kinds.is_some_and(|wanted| !wanted.contains(&edge.kind)) {
            continue;
        }
        if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target) {
            continue;
        }
        let (from, to) = if reverse {
            (edge.target.as_str(), edge.source.as_str())
        } else {
            (edge.source.as_str(), edge.target.as_str())
        };
        adj.entry(from).or_default().push(to);
    }

    adj
}

#[cfg(test)]
mod tests {
    use super::{GraphIndex, forward_adjacency, reverse_adjacency};
    use crate::build::GraphBuilder;
    use stratus_core::{EdgeKind, EdgeMetadata, Node, NodeKind};

    fn sample() -> stratus_core::DependencyGraph {
        let mut builder = GraphBuilder::new("idx-test");
        for id in ["a", "b", "c"] {
            builder
                .add_node(Node::new(id, NodeKind::TerraformResource, id))
                .expect("add node");
        }
        builder
            .add_edge_between("a", "b", EdgeKind::References, EdgeMetadata::default())
            .expect("edge");
        builder
            .add_edge_between("b", "c", EdgeKind::DependsOn, EdgeMetadata::default())
            .expect("edge");
        builder.build()
    }

    #[test]
    fn index_mirrors_snapshot_shape() {
        let graph = sample();
        let index = GraphIndex::from_graph(&graph);
        assert_eq!(index.graph.node_count(), 3);
        assert_eq!(index.graph.edge_count(), 2);

        let a = index.node_map["a"];
        let b = index.node_map["b"];
        assert!(index.graph.contains_edge(a, b));
        assert_eq!(index.node_id(a), "a");
    }

    #[test]
    fn adjacency_respects_kind_filter_and_direction() {
        let graph = sample();

        let forward = forward_adjacency(&graph, None);
        assert_eq!(forward["a"], vec!["b"]);

        let reverse = reverse_adjacency(&graph, None);
        assert_eq!(reverse["b"], vec!["a"]);

        let only_depends = forward_adjacency(&graph, Some(&[EdgeKind::DependsOn]));
        assert!(!only_depends.contains_key("a"));
        assert_eq!(only_depends["b"], vec!["c"]);
    }
}
