use std::{sync::Arc, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graphbridge::{
    ConnectionConfig, GraphWorkspace, Network, ParameterMode, SqliteConnection,
    assembler::assemble_graph,
    bench_utils::{GraphShape, generate_workspace, perturb_workspace},
    reconcile::reconcile,
    upload::upload_workspace,
};

const LINE_SEED: u64 = 0xA17C;
const ER_SEED: u64 = 0xB25F;
const PERTURB_SEED: u64 = 0xD4E1;
const PERTURB_STRIDE: usize = 10;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

struct BenchCase {
    id: String,
    base: Arc<GraphWorkspace>,
    fresh: Arc<GraphWorkspace>,
}

fn bench_scales() -> &'static [usize] {
    #[cfg(feature = "bench-ci")]
    {
        &[1_000, 5_000]
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        &[10_000, 50_000]
    }
}

fn bench_cases() -> Vec<BenchCase> {
    let mut cases = Vec::new();
    for &nodes in bench_scales() {
        let shapes = [
            ("line", GraphShape::Line, LINE_SEED),
            (
                "er",
                GraphShape::RandomErdosRenyi {
                    edges: nodes.saturating_mul(3),
                },
                ER_SEED,
            ),
        ];
        for (label, shape, seed) in shapes {
            let base = generate_workspace(shape, nodes, seed + nodes as u64);
            let fresh = perturb_workspace(&base, PERTURB_STRIDE, PERTURB_SEED);
            cases.push(BenchCase {
                id: format!("{label}_{nodes}"),
                base: Arc::new(base),
                fresh: Arc::new(fresh),
            });
        }
    }
    cases
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        let base = case.base.clone();
        group.bench_function(BenchmarkId::from_parameter(case.id), |b| {
            b.iter(|| {
                let mut network = Network::new("bench");
                assemble_graph(&mut network, &base).expect("assemble");
            });
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        let base = case.base.clone();
        let fresh = case.fresh.clone();
        group.bench_function(BenchmarkId::from_parameter(case.id), |b| {
            b.iter_batched(
                || {
                    let mut network = Network::new("bench");
                    assemble_graph(&mut network, &base).expect("assemble");
                    network
                },
                |mut network| reconcile(&mut network, &fresh).expect("reconcile"),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_upload(c: &mut Criterion) {
    let mut group = c.benchmark_group("upload");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        for mode in [ParameterMode::Typed, ParameterMode::Text] {
            let base = case.base.clone();
            let id = format!("{}_{mode:?}", case.id).to_lowercase();
            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                b.iter(|| {
                    let mut conn =
                        SqliteConnection::open(&ConnectionConfig::in_memory()).expect("open");
                    upload_workspace(&mut conn, &base, mode).expect("upload");
                });
            });
        }
    }
    group.finish();
}

criterion_group!(
    name = reconcile_benches;
    config = Criterion::default();
    targets = bench_assemble, bench_reconcile, bench_upload
);
criterion_main!(reconcile_benches);
