use criterion::{criterion_group, criterion_main, Criterion};
use sketch_core::Target;
use sketch_ir::{elementwise_chain, matmul_relu};
use sketch_search::{SearchConfig, SearchSpace, TuneTask};

fn matmul_relu_task() -> TuneTask {
    TuneTask::from_module(
        "matmul_relu",
        Target::host(),
        matmul_relu(128, 128, 64),
        vec!["D".into()],
    )
}

fn chain_task() -> TuneTask {
    let module = elementwise_chain(4, 64, 64).expect("chain");
    TuneTask::from_module("chain", Target::nvgpu(), module, vec!["T3".into()])
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_generation");
    group.sample_size(20);
    for strategy in ["rule_prune", "random_prune"] {
        group.bench_function(format!("matmul_relu_{strategy}"), |b| {
            b.iter(|| {
                let mut space =
                    SearchSpace::new(matmul_relu_task(), SearchConfig::default()).expect("space");
                space.get_initial_sketch(16, strategy).expect("sketches")
            });
        });
    }
    group.bench_function("chain_random_mutation", |b| {
        b.iter(|| {
            let mut space = SearchSpace::new(chain_task(), SearchConfig::default()).expect("space");
            space.get_random_initial_sketch(16).expect("sketches")
        });
    });
    group.finish();
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
