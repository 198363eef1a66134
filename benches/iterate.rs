use std::hint::black_box;

use criterion::*;

use archetype_query::{Filter, OrderedQuery, Query, World};

mod common;
use common::*;

fn iterate_benchmark(c: &mut Criterion) {
    let ids = init_components();

    let mut world = World::new();
    populate(&mut world, RECORDS_SMALL).expect("populate failed");

    let mut group = c.benchmark_group("iterate");

    group.bench_function("iter_30k", |b| {
        let mut query = Query::new(Filter::contains(&[ids.arrival]));
        b.iter(|| {
            let mut count = 0usize;
            for entry in query.iter(&world) {
                count += 1;
                black_box(entry);
            }
            black_box(count)
        });
    });

    group.bench_function("count_30k", |b| {
        let mut query = Query::new(Filter::contains(&[ids.agent]) & !Filter::contains(&[ids.wealth]));
        b.iter(|| black_box(query.count(&world)));
    });

    group.bench_function("iter_ordered_30k", |b| {
        let mut ordered = OrderedQuery::<Arrival>::new(Filter::contains(&[ids.arrival]));
        b.iter(|| {
            let mut count = 0usize;
            for entry in ordered.iter_ordered(&world, ids.arrival).expect("ordered pass failed") {
                count += 1;
                black_box(entry);
            }
            black_box(count)
        });
    });

    group.bench_function("each_ordered_30k", |b| {
        let mut ordered = OrderedQuery::<Arrival>::new(Filter::contains(&[ids.arrival]));
        b.iter(|| {
            let mut count = 0usize;
            ordered
                .each_ordered(&mut world, ids.arrival, |_, entity| {
                    count += 1;
                    black_box(entity);
                })
                .expect("ordered pass failed");
            black_box(count)
        });
    });

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
