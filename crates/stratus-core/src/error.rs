//! Typed structural errors for graph construction and merging.
//!
//! These are the only failure modes in the workspace. Scoring and read-only
//! graph queries return data (empty results, `None`, zero scores) instead of
//! errors; see the engine crate for those conventions.

/// A structural error raised by the graph builder or merger.
///
/// Callers either handle these or configure around them (disable
/// validate-on-add, pick a non-`Error` merge strategy). They are never
/// silently dropped while validation is enabled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node was added without an id.
    #[error("node is missing an id")]
    InvalidNode,

    /// An edge references a source node that is not in the node set.
    #[error("edge `{edge_id}` references missing source node `{node_id}`")]
    DanglingSource { edge_id: String, node_id: String },

    /// An edge references a target node that is not in the node set.
    #[error("edge `{edge_id}` references missing target node `{node_id}`")]
    DanglingTarget { edge_id: String, node_id: String },

    /// The same node id appeared in more than one input graph while merging
    /// with the `Error` conflict strategy.
    #[error("node id `{node_id}` conflicts across merged graphs")]
    NodeConflict { node_id: String },
}

impl GraphError {
    /// Stable machine-readable code for repository/API consumers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidNode => "INVALID_NODE",
            Self::DanglingSource { .. } => "DANGLING_SOURCE",
            Self::DanglingTarget { .. } => "DANGLING_TARGET",
            Self::NodeConflict { .. } => "NODE_CONFLICT",
        }
    }
}
