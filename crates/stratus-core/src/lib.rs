#![forbid(unsafe_code)]
//! stratus-core library.
//!
//! Immutable value types shared by the stratus engine and its collaborators:
//! graph nodes and edges, built graph snapshots, relationship evidence, and
//! confidence scores. Parsers produce these types, `stratus-graph` assembles
//! and scores them, and the repository layer persists them.
//!
//! # Conventions
//!
//! - **Errors**: typed [`GraphError`] values; construction helpers never
//!   panic.
//! - **Serialization**: every outward-facing type derives `Serialize` /
//!   `Deserialize`; unit enums use snake_case string forms.

pub mod error;
pub mod model;

pub use error::GraphError;
pub use model::edge::{EdgeKind, EdgeMetadata, GraphEdge};
pub use model::evidence::{Evidence, EvidenceCategory, EvidenceCollection, EvidenceKind};
pub use model::graph::{DependencyGraph, GraphMetadata};
pub use model::location::SourceLocation;
pub use model::metadata::{MetaValue, Metadata};
pub use model::node::{ModuleInfo, Node, NodeKind, ResourceInfo};
pub use model::rule::{ConditionOperator, ScoringCondition, ScoringRule};
pub use model::score::{ConfidenceLevel, ConfidenceScore, ScoreBreakdown};
