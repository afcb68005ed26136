//! Incremental, validated construction of dependency graph snapshots.
//!
//! # Overview
//!
//! [`GraphBuilder`] is a mutable accumulator owned by a single scan.
//! `build()` materializes a frozen [`DependencyGraph`] with recomputed
//! metadata (per-kind counts, deduplicated source files, content hash,
//! elapsed build time); downstream consumers never observe partially-built
//! state. The builder remains reusable afterwards.
//!
//! ## Determinism
//!
//! Identical add/remove sequences yield identical node/edge sets, counts,
//! and content hash. Only the `created_at` timestamp and `build_ms` vary
//! between runs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use stratus_core::{
    DependencyGraph, EdgeKind, EdgeMetadata, GraphEdge, GraphError, GraphMetadata, Node, NodeKind,
};

/// Builder behavior toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Reject empty node ids and dangling edge endpoints at add time.
    pub validate_on_add: bool,
    /// Keep every edge regardless of `(source, target, kind)` duplication.
    pub allow_duplicate_edges: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            validate_on_add: true,
            allow_duplicate_edges: false,
        }
    }
}

/// Derive a deterministic edge id from its endpoints and kind.
///
/// Used by [`GraphBuilder::add_edge_between`] so parsers that do not mint
/// their own ids still produce stable, collision-free identifiers.
#[must_use]
pub fn deterministic_edge_id(source: &str, target: &str, kind: EdgeKind) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\x00");
    hasher.update(target.as_bytes());
    hasher.update(b"\x00");
    hasher.update(kind.as_str().as_bytes());
    let hex = hasher.finalize().to_hex();
    format!("e-{}", &hex.as_str()[..16])
}

/// Mutable accumulator that yields immutable [`DependencyGraph`] snapshots.
///
/// Not safe for concurrent mutation; each scan owns its own builder.
#[derive(Debug)]
pub struct GraphBuilder {
    id: String,
    config: BuildConfig,
    nodes: HashMap<String, Node>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<(String, String, EdgeKind)>,
    started: Instant,
}

impl GraphBuilder {
    /// Create a builder with the default config (validation on, duplicate
    /// edges collapsed).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, BuildConfig::default())
    }

    #[must_use]
    pub fn with_config(id: impl Into<String>, config: BuildConfig) -> Self {
        Self {
            id: id.into(),
            config,
            nodes: HashMap::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Insert or overwrite a node by id (last-write-wins).
    ///
    /// # Errors
    ///
    /// `GraphError::InvalidNode` when the id is empty and
    /// `validate_on_add` is set.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.config.validate_on_add && node.id.is_empty() {
            return Err(GraphError::InvalidNode);
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Append an edge, collapsing `(source, target, kind)` duplicates
    /// unless the builder allows them. Returns whether the edge was kept.
    ///
    /// # Errors
    ///
    /// `GraphError::DanglingSource` / `GraphError::DanglingTarget` when an
    /// endpoint is absent from the node set and `validate_on_add` is set.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Result<bool, GraphError> {
        if self.config.validate_on_add {
            if !self.nodes.contains_key(&edge.source) {
                return Err(GraphError::DanglingSource {
                    edge_id: edge.id,
                    node_id: edge.source,
                });
            }
            if !self.nodes.contains_key(&edge.target) {
                return Err(GraphError::DanglingTarget {
                    edge_id: edge.id,
                    node_id: edge.target,
                });
            }
        }

        if !self.config.allow_duplicate_edges {
            let key = (edge.source.clone(), edge.target.clone(), edge.kind);
            if !self.edge_keys.insert(key) {
                debug!(edge_id = %edge.id, "duplicate edge collapsed");
                return Ok(false);
            }
        }

        self.edges.push(edge);
        Ok(true)
    }

    /// Convenience wrapper that mints a deterministic id from the
    /// endpoints and kind, then delegates to [`Self::add_edge`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::add_edge`].
    pub fn add_edge_between(
        &mut self,
        source: &str,
        target: &str,
        kind: EdgeKind,
        metadata: EdgeMetadata,
    ) -> Result<bool, GraphError> {
        let id = deterministic_edge_id(source, target, kind);
        let edge = GraphEdge::new(id, source, target, kind).with_metadata(metadata);
        self.add_edge(edge)
    }

    /// Remove a node and cascade removal of every edge touching it.
    /// Returns whether a node was present.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_none() {
            return false;
        }
        self.edges
            .retain(|edge| edge.source != id && edge.target != id);
        self.edge_keys
            .retain(|(source, target, _)| source != id && target != id);
        true
    }

    /// Remove an edge by id. Returns whether it was present.
    pub fn remove_edge(&mut self, id: &str) -> bool {
        let Some(position) = self.edges.iter().position(|edge| edge.id == id) else {
            return false;
        };
        let edge = self.edges.remove(position);
        self.edge_keys
            .remove(&(edge.source, edge.target, edge.kind));
        true
    }

    /// Empty all accumulated state and restart the build clock.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.edge_keys.clear();
        self.started = Instant::now();
    }

    /// Materialize an immutable snapshot with recomputed metadata.
    ///
    /// The builder keeps its state and restarts its build clock, so further
    /// mutation and later builds are fine.
    #[instrument(skip(self), fields(graph_id = %self.id))]
    pub fn build(&mut self) -> DependencyGraph {
        let mut node_counts: BTreeMap<NodeKind, usize> = BTreeMap::new();
        let mut source_files: BTreeSet<String> = BTreeSet::new();
        for node in self.nodes.values() {
            *node_counts.entry(node.kind).or_default() += 1;
            if !node.location.file.is_empty() {
                source_files.insert(node.location.file.clone());
            }
        }

        let mut edge_counts: BTreeMap<EdgeKind, usize> = BTreeMap::new();
        for edge in &self.edges {
            *edge_counts.entry(edge.kind).or_default() += 1;
        }

        let content_hash = compute_content_hash(&self.nodes, &self.edges);
        let build_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.started = Instant::now();

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            build_ms,
            "graph snapshot built"
        );

        DependencyGraph {
            id: self.id.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            metadata: GraphMetadata {
                created_at: Utc::now(),
                source_files,
                node_counts,
                edge_counts,
                build_ms,
                content_hash,
            },
        }
    }

    /// Insert a node bypassing validation. Used by derivation paths
    /// (subgraph, merge) whose inputs are already-built snapshots.
    pub(crate) fn insert_node_unchecked(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Append an edge bypassing validation and deduplication.
    pub(crate) fn push_edge_unchecked(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }
}

/// Hash of the sorted node-id and edge-key sets, for cache invalidation.
fn compute_content_hash(nodes: &HashMap<String, Node>, edges: &[GraphEdge]) -> String {
    let mut node_ids: Vec<&str> = nodes.keys().map(String::as_str).collect();
    node_ids.sort_unstable();

    let mut edge_keys: Vec<String> = edges
        .iter()
        .map(|edge| format!("{}\x00{}\x00{}", edge.source, edge.target, edge.kind))
        .collect();
    edge_keys.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for id in node_ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for key in &edge_keys {
        hasher.update(key.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}
