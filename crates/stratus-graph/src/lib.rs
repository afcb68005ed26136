#![forbid(unsafe_code)]
//! stratus-graph library.
//!
//! # Overview
//!
//! The dependency graph engine and the evidence-based confidence scoring
//! engine. Parsers feed candidate nodes, edges, and evidence in; this crate
//! assembles them into immutable [`stratus_core::DependencyGraph`]
//! snapshots, answers structural queries over them, and scores the evidence
//! backing each relationship.
//!
//! ## Pipeline
//!
//! ```text
//! parser candidates (Node / GraphEdge / Evidence)
//!        ↓  build::GraphBuilder            (validated, incremental)
//! DependencyGraph snapshot
//!   ├─ validate::validate()                structural soundness report
//!   ├─ cycles::detect_cycles()             Tarjan SCC enumeration
//!   ├─ traverse::downstream()/upstream()   dependents / dependencies
//!   ├─ impact::analyze_impact()            blast radius + risk level
//!   ├─ subgraph::extract_subgraph()        filtered derivation
//!   └─ merge::merge()                      multi-graph union
//!
//! evidence per relationship
//!        ↓  rules::evaluate()              custom rule contributions
//!        ↓  score::calculate()             weighted ConfidenceScore
//! ```
//!
//! # Conventions
//!
//! - **Errors**: structural failures are typed [`stratus_core::GraphError`]
//!   values; read-only queries return empty results or `None` for missing
//!   ids, and scoring always returns a well-formed score.
//! - **Logging**: `tracing` macros; engine entry points carry
//!   `#[instrument]`.
//! - **Concurrency**: everything is synchronous and CPU-bound; builders are
//!   single-owner, snapshots are safe to share read-only.

pub mod build;
pub mod cycles;
pub mod impact;
mod index;
pub mod merge;
pub mod rules;
pub mod score;
pub mod subgraph;
pub mod traverse;
pub mod validate;

pub use build::{BuildConfig, GraphBuilder, deterministic_edge_id};
pub use cycles::{Cycle, CycleReport, CycleStats, detect_cycles};
pub use impact::{
    ImpactOptions, ImpactReport, ImpactSummary, RiskLevel, RiskThresholds, analyze_impact,
    analyze_impact_with,
};
pub use merge::{MergeOptions, NodeConflictStrategy, merge};
pub use rules::{RuleMatch, applicable_rules, evaluate, matches_condition};
pub use score::{ScoringConfig, calculate, evidence_multiplier, merge_scores, validate_score};
pub use subgraph::{SubgraphFilter, extract_subgraph};
pub use traverse::{
    Traversal, TraversalOptions, TraversalPath, TraversalStats, downstream, shortest_path,
    upstream,
};
pub use validate::{
    IssueCode, ValidationIssue, ValidationReport, find_orphan_nodes, find_unreachable_nodes,
    has_cycles, validate,
};
