// Criterion benchmarks for the BiteSwipe deck engine

use bite_swipe::core::{distance::haversine_distance, order_by_distance, NoopProjection, SwipeConfig, SwipeEngine};
use bite_swipe::models::{Candidate, Coordinates};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn create_candidate(id: usize, lat: f64, lon: f64) -> Candidate {
    Candidate::new(format!("place_{}", id), format!("Restaurant {}", id), Coordinates::new(lat, lon))
}

fn create_candidates(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.0013) % 0.2;
            let lon_offset = (i as f64 * 0.0007) % 0.2;
            create_candidate(i, 1.3521 + lat_offset, 103.8198 - lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(1.3521),
                black_box(103.8198),
                black_box(1.2834),
                black_box(103.8607),
            )
        });
    });
}

fn bench_order_by_distance(c: &mut Criterion) {
    let origin = Coordinates::new(1.3521, 103.8198);
    let mut group = c.benchmark_group("feed");

    for candidate_count in [20, 60, 250, 1000].iter() {
        let candidates = create_candidates(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("order_by_distance", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| order_by_distance(black_box(&origin), black_box(candidates.clone())));
            },
        );
    }

    group.finish();
}

fn bench_swipe_cycle(c: &mut Criterion) {
    let candidates = create_candidates(60);

    c.bench_function("select_complete_undo_60_cards", |b| {
        b.iter_batched(
            || {
                let mut engine = SwipeEngine::new(SwipeConfig::default(), Arc::new(NoopProjection)).unwrap();
                engine.load(candidates.clone()).unwrap();
                engine
            },
            |mut engine| {
                while let Some(request) = engine.request_select() {
                    engine.complete_transition(request.id).unwrap();
                }
                while engine.undo().unwrap() {}
                black_box(engine.stack_len())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_order_by_distance,
    bench_swipe_cycle
);

criterion_main!(benches);
