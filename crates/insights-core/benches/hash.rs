use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use insights_core::hash::DataHash;
use insights_core::model::{Dependency, DependencyType, Issue, Status};

const TIERS: &[usize] = &[50, 500, 2_000];

fn synthetic_issues(n: usize) -> Vec<Issue> {
    (0..n)
        .map(|i| Issue {
            id: format!("issue-{i}"),
            title: format!("title {i}"),
            status: if i % 5 == 0 { Status::Closed } else { Status::Open },
            priority: (i % 5) as u8,
            dependencies: if i > 0 {
                vec![Dependency {
                    depends_on_id: format!("issue-{}", i - 1),
                    dep_type: DependencyType::Blocks,
                }]
            } else {
                Vec::new()
            },
            ..Default::default()
        })
        .collect()
}

fn bench_data_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash.data_hash");

    for &n in TIERS {
        let issues = synthetic_issues(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("compute", n), &issues, |b, issues| {
            b.iter(|| black_box(DataHash::compute(issues)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_data_hash);
criterion_main!(benches);
