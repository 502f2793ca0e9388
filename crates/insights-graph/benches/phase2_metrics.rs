//! Benchmarks for the Phase 2 centrality metrics (§4.3) on a synthetic
//! dependency chain with periodic cross-links, sized to the Medium tier.

use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use insights_core::config::AnalysisConfig;
use insights_core::model::{Dependency, DependencyType, Issue};
use insights_graph::graph::build::Graph;
use insights_graph::metrics::betweenness::betweenness_centrality;
use insights_graph::metrics::hits::hits;
use insights_graph::metrics::pagerank::{PageRankConfig, pagerank};

fn synthetic_issues(n: usize) -> Vec<Issue> {
    (0..n)
        .map(|i| {
            let mut deps = Vec::new();
            if i > 0 {
                deps.push(Dependency {
                    depends_on_id: format!("issue-{}", i - 1),
                    dep_type: DependencyType::Blocks,
                });
            }
            if i > 5 {
                deps.push(Dependency {
                    depends_on_id: format!("issue-{}", i - 5),
                    dep_type: DependencyType::Blocks,
                });
            }
            Issue {
                id: format!("issue-{i}"),
                dependencies: deps,
                ..Issue::default()
            }
        })
        .collect()
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(60)
}

fn bench_pagerank(c: &mut Criterion) {
    let issues = synthetic_issues(500);
    let graph = Graph::build(&issues);
    c.bench_function("pagerank_500", |b| {
        b.iter(|| pagerank(&graph, &PageRankConfig::default(), deadline()));
    });
}

fn bench_betweenness(c: &mut Criterion) {
    let issues = synthetic_issues(500);
    let graph = Graph::build(&issues);
    let config = AnalysisConfig::for_graph(graph.node_count(), true);
    c.bench_function("betweenness_500", |b| {
        b.iter(|| betweenness_centrality(&graph, &config, deadline()));
    });
}

fn bench_hits(c: &mut Criterion) {
    let issues = synthetic_issues(500);
    let graph = Graph::build(&issues);
    let config = AnalysisConfig::for_graph(graph.node_count(), true);
    c.bench_function("hits_500", |b| {
        b.iter(|| hits(&graph, &config, 100, 1e-6, deadline()));
    });
}

criterion_group!(benches, bench_pagerank, bench_betweenness, bench_hits);
criterion_main!(benches);
