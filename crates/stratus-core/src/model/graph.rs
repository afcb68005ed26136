use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::edge::{EdgeKind, GraphEdge};
use crate::model::node::{Node, NodeKind};

/// Build-time metadata attached to a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub created_at: DateTime<Utc>,
    /// Deduplicated set of `location.file` values across all nodes.
    pub source_files: BTreeSet<String>,
    pub node_counts: BTreeMap<NodeKind, usize>,
    pub edge_counts: BTreeMap<EdgeKind, usize>,
    /// Wall-clock time the builder spent, in whole milliseconds.
    pub build_ms: u64,
    /// Hash of the sorted node/edge sets, for cache invalidation.
    /// Identical build sequences produce identical hashes.
    pub content_hash: String,
}

/// An immutable dependency graph snapshot.
///
/// Produced by the engine's builder; mutation happens only through the
/// builder that produced it. Read-only traversal, validation, and scoring
/// over a snapshot may run concurrently without synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub id: String,
    /// Nodes keyed by id. Keys are unique; ids are stable strings so the
    /// persistence layer can map them to storage identifiers.
    pub nodes: HashMap<String, Node>,
    /// Ordered edge sequence. Duplicates are permitted when the builder is
    /// configured to keep them.
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

impl DependencyGraph {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All node ids, sorted for deterministic listings.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Edges whose source is `id`, in insertion order.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    /// Edges whose target is `id`, in insertion order.
    pub fn edges_to<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |edge| edge.target == id)
    }
}
