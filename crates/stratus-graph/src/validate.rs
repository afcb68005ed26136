//! Structural soundness checks over a built graph.
//!
//! # Overview
//!
//! [`validate`] partitions findings into errors (dangling edge endpoints,
//! which make the graph unsound) and warnings (self-loops, orphan nodes,
//! cycles: legal but worth surfacing). Errors flip `is_valid`; warnings
//! never do.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use stratus_core::DependencyGraph;

use crate::index::forward_adjacency;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Stable issue codes for repository/API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    DanglingSource,
    DanglingTarget,
    SelfLoop,
    OrphanNode,
    CycleDetected,
}

impl IssueCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DanglingSource => "DANGLING_SOURCE",
            Self::DanglingTarget => "DANGLING_TARGET",
            Self::SelfLoop => "SELF_LOOP",
            Self::OrphanNode => "ORPHAN_NODE",
            Self::CycleDetected => "CYCLE_DETECTED",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    /// The node or edge id the finding is about, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// The outcome of validating one graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a snapshot's structure.
///
/// Errors: `DANGLING_SOURCE`, `DANGLING_TARGET`. Warnings: `SELF_LOOP`,
/// `ORPHAN_NODE`, `CYCLE_DETECTED` (one warning regardless of cycle count).
#[must_use]
#[instrument(skip(graph), fields(graph_id = %graph.id))]
pub fn validate(graph: &DependencyGraph) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for edge in &graph.edges {
        if !graph.contains_node(&edge.source) {
            errors.push(ValidationIssue {
                code: IssueCode::DanglingSource,
                message: format!(
                    "edge `{}` references missing source node `{}`",
                    edge.id, edge.source
                ),
                subject_id: Some(edge.id.clone()),
            });
        }
        if !graph.contains_node(&edge.target) {
            errors.push(ValidationIssue {
                code: IssueCode::DanglingTarget,
                message: format!(
                    "edge `{}` references missing target node `{}`",
                    edge.id, edge.target
                ),
                subject_id: Some(edge.id.clone()),
            });
        }
        if edge.source == edge.target {
            warnings.push(ValidationIssue {
                code: IssueCode::SelfLoop,
                message: format!("edge `{}` loops `{}` onto itself", edge.id, edge.source),
                subject_id: Some(edge.id.clone()),
            });
        }
    }

    for id in find_orphan_nodes(graph) {
        warnings.push(ValidationIssue {
            code: IssueCode::OrphanNode,
            message: format!("node `{id}` has no incoming or outgoing edges"),
            subject_id: Some(id),
        });
    }

    if has_cycles(graph) {
        warnings.push(ValidationIssue {
            code: IssueCode::CycleDetected,
            message: "graph contains at least one dependency cycle".to_string(),
            subject_id: None,
        });
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Whether the graph contains a directed cycle.
///
/// Three-color DFS: nodes start white, turn gray while on the current DFS
/// path, and black once fully explored. An edge reaching a gray node is a
/// back-edge, which closes a cycle. Empty graphs have none.
#[must_use]
pub fn has_cycles(graph: &DependencyGraph) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let adj = forward_adjacency(graph, None);
    let mut colors: HashMap<&str, Color> = graph
        .nodes
        .keys()
        .map(|id| (id.as_str(), Color::White))
        .collect();

    for root in graph.node_ids() {
        if colors.get(root) != Some(&Color::White) {
            continue;
        }

        // Iterative DFS; each frame is (node, next-neighbor offset).
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        colors.insert(root, Color::Gray);

        while let Some(&(node, offset)) = stack.last() {
            let neighbors = adj.get(node).map_or(&[][..], Vec::as_slice);
            if let Some(&next) = neighbors.get(offset) {
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                match colors.get(next) {
                    Some(Color::Gray) => return true,
                    Some(Color::White) => {
                        colors.insert(next, Color::Gray);
                        stack.push((next, 0));
                    }
                    _ => {}
                }
            } else {
                colors.insert(node, Color::Black);
                stack.pop();
            }
        }
    }

    false
}

/// Node ids with zero in-degree and zero out-degree, sorted.
#[must_use]
pub fn find_orphan_nodes(graph: &DependencyGraph) -> Vec<String> {
    let mut touched: HashSet<&str> = HashSet::new();
    for edge in &graph.edges {
        touched.insert(edge.source.as_str());
        touched.insert(edge.target.as_str());
    }

    let mut orphans: Vec<String> = graph
        .nodes
        .keys()
        .filter(|id| !touched.contains(id.as_str()))
        .cloned()
        .collect();
    orphans.sort_unstable();
    orphans
}

/// Node ids not reachable from `start_id` along outgoing edges, sorted.
///
/// An unknown `start_id` makes every node unreachable.
#[must_use]
pub fn find_unreachable_nodes(graph: &DependencyGraph, start_id: &str) -> Vec<String> {
    if !graph.contains_node(start_id) {
        return graph.node_ids().iter().map(ToString::to_string).collect();
    }

    let adj = forward_adjacency(graph, None);
    let mut visited: HashSet<&str> = HashSet::from([start_id]);
    let mut queue: VecDeque<&str> = VecDeque::from([start_id]);

    while let Some(current) = queue.pop_front() {
        for &next in adj.get(current).map_or(&[][..], Vec::as_slice) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let mut unreachable: Vec<String> = graph
        .nodes
        .keys()
        .filter(|id| !visited.contains(id.as_str()))
        .cloned()
        .collect();
    unreachable.sort_unstable();
    unreachable
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
