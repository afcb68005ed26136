//! Criterion benchmarks for the engine hot paths: build, traversal, and
//! cycle detection over a layered synthetic graph.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use stratus_core::{DependencyGraph, EdgeKind, EdgeMetadata, Node, NodeKind};
use stratus_graph::build::GraphBuilder;
use stratus_graph::cycles::detect_cycles;
use stratus_graph::impact::analyze_impact;
use stratus_graph::traverse::{TraversalOptions, downstream};

const LAYERS: usize = 25;
const WIDTH: usize = 20;

/// A layered DAG: every node references one node in the previous layer,
/// plus a handful of cross-links.
fn layered_graph() -> DependencyGraph {
    let mut builder = GraphBuilder::new("bench");
    for layer in 0..LAYERS {
        for slot in 0..WIDTH {
            builder
                .add_node(Node::new(
                    format!("n{layer}-{slot}"),
                    NodeKind::TerraformResource,
                    format!("n{layer}-{slot}"),
                ))
                .expect("node");
        }
    }
    for layer in 1..LAYERS {
        for slot in 0..WIDTH {
            builder
                .add_edge_between(
                    &format!("n{layer}-{slot}"),
                    &format!("n{}-{}", layer - 1, slot),
                    EdgeKind::References,
                    EdgeMetadata::default(),
                )
                .expect("edge");
            if slot % 4 == 0 {
                builder
                    .add_edge_between(
                        &format!("n{layer}-{slot}"),
                        &format!("n{}-{}", layer - 1, (slot + 1) % WIDTH),
                        EdgeKind::DependsOn,
                        EdgeMetadata::default(),
                    )
                    .expect("edge");
            }
        }
    }
    builder.build()
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_layered_500", |b| {
        b.iter(|| black_box(layered_graph()));
    });
}

fn bench_downstream(c: &mut Criterion) {
    let graph = layered_graph();
    c.bench_function("downstream_from_root", |b| {
        b.iter(|| {
            black_box(downstream(
                &graph,
                "n0-0",
                &TraversalOptions::default(),
            ))
        });
    });
}

fn bench_detect_cycles(c: &mut Criterion) {
    let graph = layered_graph();
    c.bench_function("detect_cycles_layered", |b| {
        b.iter(|| black_box(detect_cycles(&graph)));
    });
}

fn bench_impact(c: &mut Criterion) {
    let graph = layered_graph();
    let changed = vec!["n0-0".to_string(), "n0-1".to_string()];
    c.bench_function("impact_two_roots", |b| {
        b.iter(|| black_box(analyze_impact(&graph, &changed)));
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_downstream,
    bench_detect_cycles,
    bench_impact
);
criterion_main!(benches);
