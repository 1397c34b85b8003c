use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emojidex::{
    filter::filter, AtomicState, Catalog, Category, KvStore, MemoryStore, Session, SessionState,
    UserStore, View,
};
use std::time::Duration;

fn state() -> SessionState {
    let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
    SessionState::new(Session::new(Catalog::builtin(), store, View::Home))
}

pub fn bench_filter(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("filter");
    group.sample_size(100);

    for query in ["", "face", "bear", "zzzz"] {
        group.bench_with_input(BenchmarkId::new("query", query), &query, |b, query| {
            b.iter(|| filter(black_box(&catalog), black_box(query), &[]));
        });
    }

    group.bench_function("query_and_categories", |b| {
        let categories = [Category::Animals, Category::Food];
        b.iter(|| filter(black_box(&catalog), black_box("a"), black_box(&categories)));
    });

    group.finish();
}

pub fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshots");
    group.sample_size(100);

    group.bench_function("session_snapshot", |b| {
        let state = state();
        b.iter(|| black_box(&state).snapshot());
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(5));
    targets = bench_filter, bench_snapshots
);
criterion_main!(benches);
