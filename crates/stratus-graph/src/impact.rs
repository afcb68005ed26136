//! Blast-radius analysis for changed nodes.
//!
//! # Overview
//!
//! Built on downstream reachability: a multi-source BFS from every changed
//! node over reversed edges finds everything that depends on the change.
//! Nodes one hop out are the direct impact; anything deeper is transitive.
//! The union's size classifies risk against configurable thresholds.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use stratus_core::{DependencyGraph, NodeKind};

use crate::index::reverse_adjacency;

// ---------------------------------------------------------------------------
// Options and result types
// ---------------------------------------------------------------------------

/// Risk bands for a change's blast radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cutoffs mapping impacted-node counts to risk bands.
///
/// The default is the fixed policy `0 -> low`, `1..=5 -> medium`,
/// `6..=20 -> high`, `>20 -> critical`; call sites needing a stricter
/// policy pass their own thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Highest impacted count still classified `medium`.
    pub medium_max: usize,
    /// Highest impacted count still classified `high`.
    pub high_max: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium_max: 5,
            high_max: 20,
        }
    }
}

impl RiskThresholds {
    #[must_use]
    pub const fn classify(&self, total_impacted: usize) -> RiskLevel {
        if total_impacted == 0 {
            RiskLevel::Low
        } else if total_impacted <= self.medium_max {
            RiskLevel::Medium
        } else if total_impacted <= self.high_max {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// Knobs for [`analyze_impact_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactOptions {
    /// Stop the downstream walk after this many hops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub thresholds: RiskThresholds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub total_impacted: usize,
    /// Impacted node counts grouped by kind; sums to `total_impacted`.
    pub impact_by_kind: BTreeMap<NodeKind, usize>,
    pub risk_level: RiskLevel,
}

/// The blast radius of a set of changed nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Ids one downstream hop from any changed node, sorted.
    pub direct_impact: Vec<String>,
    /// Ids at depth two or more, excluding anything already direct, sorted.
    pub transitive_impact: Vec<String>,
    pub summary: ImpactSummary,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// [`analyze_impact_with`] under default options.
#[must_use]
pub fn analyze_impact(graph: &DependencyGraph, changed_node_ids: &[String]) -> ImpactReport {
    analyze_impact_with(graph, changed_node_ids, &ImpactOptions::default())
}

/// Classify the blast radius of `changed_node_ids`.
///
/// Changed nodes are excluded from their own impact sets, even when cycles
/// make them reachable from themselves. Unknown ids contribute nothing.
#[must_use]
#[instrument(skip(graph, options), fields(graph_id = %graph.id))]
pub fn analyze_impact_with(
    graph: &DependencyGraph,
    changed_node_ids: &[String],
    options: &ImpactOptions,
) -> ImpactReport {
    let adj = reverse_adjacency(graph, None);

    // Multi-source BFS; depth is the minimum hop count from any changed node.
    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for id in changed_node_ids {
        if graph.contains_node(id) && !depth.contains_key(id.as_str()) {
            depth.insert(id.as_str(), 0);
            queue.push_back(id.as_str());
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_depth = depth[current];
        if options.max_depth.is_some_and(|limit| current_depth >= limit) {
            continue;
        }
        for &next in adj.get(current).map_or(&[][..], Vec::as_slice) {
            if !depth.contains_key(next) {
                depth.insert(next, current_depth + 1);
                queue.push_back(next);
            }
        }
    }

    let mut direct_impact: Vec<String> = Vec::new();
    let mut transitive_impact: Vec<String> = Vec::new();
    let mut impact_by_kind: BTreeMap<NodeKind, usize> = BTreeMap::new();

    for (&id, &hops) in &depth {
        if hops == 0 {
            continue;
        }
        if let Some(node) = graph.node(id) {
            *impact_by_kind.entry(node.kind).or_default() += 1;
        }
        if hops == 1 {
            direct_impact.push(id.to_string());
        } else {
            transitive_impact.push(id.to_string());
        }
    }
    direct_impact.sort_unstable();
    transitive_impact.sort_unstable();

    let total_impacted = direct_impact.len() + transitive_impact.len();
    let risk_level = options.thresholds.classify(total_impacted);

    ImpactReport {
        direct_impact,
        transitive_impact,
        summary: ImpactSummary {
            total_impacted,
            impact_by_kind,
            risk_level,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
