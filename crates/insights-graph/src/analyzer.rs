//! Two-phase graph analyzer (§4.3, §4.4).
//!
//! Phase 1 (degree, topological order, density) runs synchronously on the
//! calling thread — it's O(|V|+|E|) and always cheap enough to finish
//! within its own deadline. Phase 2 (PageRank, betweenness, HITS,
//! eigenvector, k-core, articulation points, critical path, cycle
//! enumeration) is CPU-bound and iterative, so it runs on a bounded pool of
//! scoped OS threads pulling jobs from an `mpsc` channel — no `tokio`
//! anywhere in this crate's dependency graph, matching the rest of the
//! synchronous teacher codebase this was grounded on. Each job honors its
//! own `Instant` deadline and reports a [`MetricStatus`] rather than
//! failing the whole analysis; a shared `Arc<AtomicBool>` lets a caller
//! cancel jobs that haven't started yet.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Instant;

use insights_core::config::AnalysisConfig;
use insights_core::model::Issue;

use crate::graph::build::Graph;
use crate::graph::critical_path::{self, CriticalPathStats};
use crate::graph::cycles::{self, CycleReport};
use crate::graph::stats::GraphStats;
use crate::graph::toposort;
use crate::metrics::basic::{self, DegreeCentrality};
use crate::metrics::hits::{self, HitsScores};
use crate::metrics::{articulation, betweenness, eigenvector, kcore, pagerank};
use crate::metrics::{MetricOutcome, MetricStatus};

/// Everything Phase 1 computes, available the instant [`analyze`] returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase1Stats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub topological_order: Option<Vec<String>>,
    pub cycles_present: bool,
    pub degree: DegreeCentrality,
}

/// Everything Phase 2 computes, available after [`AnalysisHandle::wait_phase2`].
#[derive(Debug, Clone, PartialEq)]
pub struct Phase2Stats {
    pub pagerank: MetricOutcome<HashMap<String, f64>>,
    pub betweenness: MetricOutcome<HashMap<String, f64>>,
    pub hits: MetricOutcome<HitsScores>,
    pub eigenvector: MetricOutcome<HashMap<String, f64>>,
    pub k_core: MetricOutcome<HashMap<String, u32>>,
    pub articulation_points: MetricOutcome<Vec<String>>,
    pub critical_path: MetricOutcome<CriticalPathStats>,
    pub cycles: MetricOutcome<CycleReport>,
}

/// The full per-run result, flattened for JSON emission (§4.3 `DerivedStats`).
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub topological_order: Option<Vec<String>>,
    pub cycles_present: bool,
    pub in_degree: HashMap<String, usize>,
    pub out_degree: HashMap<String, usize>,
    pub pagerank: HashMap<String, f64>,
    pub betweenness: HashMap<String, f64>,
    pub eigenvector: HashMap<String, f64>,
    pub hub_score: HashMap<String, f64>,
    pub authority_score: HashMap<String, f64>,
    pub critical_path_score: HashMap<String, u32>,
    pub core_number: HashMap<String, u32>,
    pub slack: HashMap<String, u32>,
    pub articulation_points: Vec<String>,
    pub cycles: Vec<Vec<String>>,
    pub cycles_truncated: bool,
    pub metric_status: HashMap<&'static str, MetricStatus>,
    pub elapsed_ms: HashMap<&'static str, u64>,
}

impl DerivedStats {
    #[must_use]
    pub fn assemble(phase1: Phase1Stats, phase2: Phase2Stats) -> Self {
        let mut metric_status = HashMap::with_capacity(8);
        let mut elapsed_ms = HashMap::with_capacity(8);
        macro_rules! record {
            ($name:literal, $outcome:expr) => {
                metric_status.insert($name, $outcome.status.clone());
                elapsed_ms.insert($name, $outcome.elapsed_ms);
            };
        }
        record!("pagerank", phase2.pagerank);
        record!("betweenness", phase2.betweenness);
        record!("hits", phase2.hits);
        record!("eigenvector", phase2.eigenvector);
        record!("k_core", phase2.k_core);
        record!("articulation", phase2.articulation_points);
        record!("critical_path", phase2.critical_path);
        record!("cycles", phase2.cycles);

        Self {
            node_count: phase1.node_count,
            edge_count: phase1.edge_count,
            density: phase1.density,
            topological_order: phase1.topological_order,
            cycles_present: phase1.cycles_present,
            in_degree: phase1.degree.in_degree,
            out_degree: phase1.degree.out_degree,
            pagerank: phase2.pagerank.value,
            betweenness: phase2.betweenness.value,
            eigenvector: phase2.eigenvector.value,
            hub_score: phase2.hits.value.hubs,
            authority_score: phase2.hits.value.authorities,
            critical_path_score: phase2.critical_path.value.depth,
            core_number: phase2.k_core.value,
            slack: phase2.critical_path.value.slack,
            articulation_points: phase2.articulation_points.value,
            cycles: phase2.cycles.value.cycles,
            cycles_truncated: phase2.cycles.value.truncated,
            metric_status,
            elapsed_ms,
        }
    }
}

/// A started analysis: Phase 1 results plus a handle to run and collect
/// Phase 2. Borrows `graph` and `config` for its lifetime rather than
/// cloning them into worker threads.
pub struct AnalysisHandle<'a> {
    graph: &'a Graph,
    config: &'a AnalysisConfig,
    cancel: Arc<AtomicBool>,
    pub phase1: Phase1Stats,
}

impl<'a> AnalysisHandle<'a> {
    /// Request cancellation of any Phase 2 job that hasn't started yet.
    /// Jobs already running finish and report their true result; only
    /// jobs still queued are marked `skipped(reason=cancelled)`.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Run every Phase 2 metric on a bounded worker pool and block until
    /// all have reported a result (computed, approximate, timed out, or
    /// skipped).
    #[must_use]
    pub fn wait_phase2(&self) -> Phase2Stats {
        run_phase2(self.graph, self.config, self.phase1.topological_order.as_deref(), &self.cancel)
    }
}

/// Run Phase 1 synchronously and return a handle for Phase 2.
#[must_use]
pub fn analyze<'a>(graph: &'a Graph, config: &'a AnalysisConfig) -> AnalysisHandle<'a> {
    let graph_stats = GraphStats::compute(graph);
    let topological_order = toposort::topological_order(graph);
    let cycles_present = topological_order.is_none();
    let degree = basic::degree_centrality(graph);

    let phase1 = Phase1Stats {
        node_count: graph_stats.node_count,
        edge_count: graph_stats.edge_count,
        density: graph_stats.density,
        topological_order,
        cycles_present,
        degree,
    };

    AnalysisHandle {
        graph,
        config,
        cancel: Arc::new(AtomicBool::new(false)),
        phase1,
    }
}

/// Convenience: Phase 1 + Phase 2 in one call, for callers that don't need
/// the early-return handle (most CLI commands).
#[must_use]
pub fn analyze_full(graph: &Graph, issues: &[Issue], config: &AnalysisConfig) -> DerivedStats {
    let _ = issues; // impact scoring consumes issues separately; kept for API symmetry
    let handle = analyze(graph, config);
    let phase1 = handle.phase1.clone();
    let phase2 = handle.wait_phase2();
    DerivedStats::assemble(phase1, phase2)
}

enum Job {
    PageRank,
    Betweenness,
    Hits,
    Eigenvector,
    KCore,
    Articulation,
    CriticalPath,
    Cycles,
}

enum JobResult {
    PageRank(MetricOutcome<HashMap<String, f64>>),
    Betweenness(MetricOutcome<HashMap<String, f64>>),
    Hits(MetricOutcome<HitsScores>),
    Eigenvector(MetricOutcome<HashMap<String, f64>>),
    KCore(MetricOutcome<HashMap<String, u32>>),
    Articulation(MetricOutcome<Vec<String>>),
    CriticalPath(MetricOutcome<CriticalPathStats>),
    Cycles(MetricOutcome<CycleReport>),
}

const WORKER_CAP: usize = 8;

fn run_phase2(
    graph: &Graph,
    config: &AnalysisConfig,
    topo_order: Option<&[String]>,
    cancel: &AtomicBool,
) -> Phase2Stats {
    let jobs = [
        Job::PageRank,
        Job::Betweenness,
        Job::Hits,
        Job::Eigenvector,
        Job::KCore,
        Job::Articulation,
        Job::CriticalPath,
        Job::Cycles,
    ];

    let (job_tx, job_rx) = mpsc::channel::<Job>();
    for job in jobs {
        job_tx.send(job).expect("receiver outlives this loop");
    }
    drop(job_tx);
    let job_rx = Mutex::new(job_rx);

    let (res_tx, res_rx) = mpsc::channel::<JobResult>();
    let worker_count = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
        .min(WORKER_CAP);

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let job_rx = &job_rx;
            let res_tx = res_tx.clone();
            scope.spawn(move || {
                loop {
                    let job = {
                        let rx = job_rx.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        rx.recv()
                    };
                    let Ok(job) = job else { break };
                    let result = run_job(job, graph, config, topo_order, cancel);
                    if res_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(res_tx);

        let mut pagerank = None;
        let mut betweenness = None;
        let mut hits = None;
        let mut eigenvector = None;
        let mut k_core = None;
        let mut articulation_points = None;
        let mut critical_path = None;
        let mut cycles = None;

        while let Ok(result) = res_rx.recv() {
            match result {
                JobResult::PageRank(r) => pagerank = Some(r),
                JobResult::Betweenness(r) => betweenness = Some(r),
                JobResult::Hits(r) => hits = Some(r),
                JobResult::Eigenvector(r) => eigenvector = Some(r),
                JobResult::KCore(r) => k_core = Some(r),
                JobResult::Articulation(r) => articulation_points = Some(r),
                JobResult::CriticalPath(r) => critical_path = Some(r),
                JobResult::Cycles(r) => cycles = Some(r),
            }
        }

        Phase2Stats {
            pagerank: pagerank.unwrap_or_else(|| skipped_map("worker pool produced no result")),
            betweenness: betweenness.unwrap_or_else(|| skipped_map("worker pool produced no result")),
            hits: hits.unwrap_or_else(|| MetricOutcome::skipped(HitsScores::default(), "worker pool produced no result")),
            eigenvector: eigenvector.unwrap_or_else(|| skipped_map("worker pool produced no result")),
            k_core: k_core.unwrap_or_else(|| skipped_map("worker pool produced no result")),
            articulation_points: articulation_points
                .unwrap_or_else(|| MetricOutcome::skipped(Vec::new(), "worker pool produced no result")),
            critical_path: critical_path
                .unwrap_or_else(|| MetricOutcome::skipped(CriticalPathStats::default(), "worker pool produced no result")),
            cycles: cycles.unwrap_or_else(|| {
                MetricOutcome::skipped(
                    CycleReport {
                        cycles: Vec::new(),
                        truncated: false,
                    },
                    "worker pool produced no result",
                )
            }),
        }
    })
}

fn skipped_map<V>(reason: &str) -> MetricOutcome<HashMap<String, V>> {
    MetricOutcome::skipped(HashMap::new(), reason.to_string())
}

fn run_job(
    job: Job,
    graph: &Graph,
    config: &AnalysisConfig,
    topo_order: Option<&[String]>,
    cancel: &AtomicBool,
) -> JobResult {
    if cancel.load(Ordering::Relaxed) {
        return skip(job);
    }
    let deadline = Instant::now() + config.metric_deadline;

    match job {
        Job::PageRank => JobResult::PageRank(pagerank::pagerank(
            graph,
            &pagerank::PageRankConfig::default(),
            deadline,
        )),
        Job::Betweenness => {
            JobResult::Betweenness(betweenness::betweenness_centrality(graph, config, deadline))
        }
        Job::Hits => JobResult::Hits(hits::hits(graph, config, 100, 1e-6, deadline)),
        Job::Eigenvector => JobResult::Eigenvector(eigenvector::eigenvector_centrality(graph, deadline)),
        Job::KCore => JobResult::KCore(kcore::k_core(graph, deadline)),
        Job::Articulation => JobResult::Articulation(articulation::articulation_points(graph, deadline)),
        Job::CriticalPath => JobResult::CriticalPath(match topo_order {
            Some(order) => MetricOutcome::computed(critical_path::compute(graph, order), Instant::now()),
            None => MetricOutcome::skipped(
                CriticalPathStats::default(),
                "cycles present, no topological order",
            ),
        }),
        Job::Cycles => {
            let report = cycles::enumerate_cycles(graph, config.cycle_cap, deadline);
            let outcome = if report.truncated {
                MetricOutcome::approx(report, Instant::now(), None)
            } else {
                MetricOutcome::computed(report, Instant::now())
            };
            JobResult::Cycles(outcome)
        }
    }
}

fn skip(job: Job) -> JobResult {
    let reason = "cancelled";
    match job {
        Job::PageRank => JobResult::PageRank(skipped_map(reason)),
        Job::Betweenness => JobResult::Betweenness(skipped_map(reason)),
        Job::Hits => JobResult::Hits(MetricOutcome::skipped(HitsScores::default(), reason)),
        Job::Eigenvector => JobResult::Eigenvector(skipped_map(reason)),
        Job::KCore => JobResult::KCore(skipped_map(reason)),
        Job::Articulation => JobResult::Articulation(MetricOutcome::skipped(Vec::new(), reason)),
        Job::CriticalPath => {
            JobResult::CriticalPath(MetricOutcome::skipped(CriticalPathStats::default(), reason))
        }
        Job::Cycles => JobResult::Cycles(MetricOutcome::skipped(
            CycleReport {
                cycles: Vec::new(),
                truncated: false,
            },
            reason,
        )),
    }
}
