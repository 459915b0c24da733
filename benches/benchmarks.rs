use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use viewstate::{field_equals, text_contains, FilterStore, PaginationStore, PredicateSet, Signal};

#[derive(Clone)]
struct Row {
    name: String,
    status: &'static str,
}

fn rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row {
            name: format!("row {i}"),
            status: if i % 2 == 0 { "active" } else { "inactive" },
        })
        .collect()
}

fn predicates() -> PredicateSet<Row> {
    PredicateSet::new()
        .with("status", field_equals(|r: &Row| r.status))
        .with("search", text_contains(|r: &Row| vec![r.name.as_str()]))
}

fn signal_write_benchmark(c: &mut Criterion) {
    let signal: Signal<i32> = Signal::new(0);

    c.bench_function("signal_write", |b| {
        let mut i = 0;
        b.iter(|| {
            signal.set(black_box(i));
            i += 1;
        });
    });
}

fn filter_recompute_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_recompute");

    for size in [100, 1_000, 10_000].iter() {
        let store = FilterStore::new(rows(*size), predicates());

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                store.set_filter("status", if flip { "active" } else { "inactive" });
                black_box(store.filtered_count());
            });
        });
    }
    group.finish();
}

fn filter_cached_read_benchmark(c: &mut Criterion) {
    let store = FilterStore::new(rows(10_000), predicates());
    store.set_filter("search", "row 9");

    c.bench_function("filter_cached_read", |b| {
        b.iter(|| {
            black_box(store.filtered_count());
        });
    });
}

fn page_navigation_benchmark(c: &mut Criterion) {
    let store = PaginationStore::new(rows(10_000), 25);

    c.bench_function("page_navigation", |b| {
        let mut page = 0i64;
        b.iter(|| {
            page = (page + 7) % 400;
            store.go_to_page(black_box(page));
            black_box(store.with_page_slice(|rows| rows.len()));
        });
    });
}

criterion_group!(
    benches,
    signal_write_benchmark,
    filter_recompute_benchmark,
    filter_cached_read_benchmark,
    page_navigation_benchmark,
);
criterion_main!(benches);
