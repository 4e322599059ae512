//! Creature Database Benchmark Suite
//!
//! Editor-scale targets (a designer should never notice the store):
//!   store_find_last_of_200 .......... < 5μs
//!   store_update_middle_of_200 ...... < 200μs (includes full save)
//!   store_add_remove_200 ............ < 400μs (two full saves)
//!   editor_rows_filtered_200 ........ < 50μs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use creaturedb_bench::{make_creature, populated_store};
use creaturedb_core::persistence::encode_document;
use creaturedb_core::{CreatureDefaults, CreatureId};
use creaturedb_editor::EditorSession;

const N: u32 = 200;

/// Benchmark: worst-case linear lookup.
fn bench_find(c: &mut Criterion) {
    let store = populated_store(N);
    let last = make_creature(N - 1).id;
    c.bench_function("store_find_last_of_200", |b| {
        b.iter(|| black_box(store.find(black_box(&last))));
    });
}

/// Benchmark: replace one record and persist the collection.
fn bench_update(c: &mut Criterion) {
    let mut store = populated_store(N);
    let id = make_creature(N / 2).id;
    let mut health = 0.0_f32;
    c.bench_function("store_update_middle_of_200", |b| {
        b.iter(|| {
            health += 1.0;
            store
                .update_with(&id, |creature| creature.health = health)
                .expect("update");
        });
    });
}

/// Benchmark: append then delete, two saves per iteration.
fn bench_add_remove(c: &mut Criterion) {
    let mut store = populated_store(N);
    let extra = make_creature(N + 1);
    let extra_id: CreatureId = extra.id.clone();
    c.bench_function("store_add_remove_200", |b| {
        b.iter(|| {
            store.add(extra.clone()).expect("add");
            store.remove(&extra_id).expect("remove");
        });
    });
}

/// Benchmark: encode the full asset document.
fn bench_encode(c: &mut Criterion) {
    let creatures = populated_store(N).all();
    c.bench_function("asset_encode_200", |b| {
        b.iter(|| black_box(encode_document(black_box(&creatures), true).expect("encode")));
    });
}

/// Benchmark: filtered list rows as the search box would request them.
fn bench_rows(c: &mut Criterion) {
    let mut session = EditorSession::new(populated_store(N), CreatureDefaults::default());
    session.set_search("number 1");
    c.bench_function("editor_rows_filtered_200", |b| {
        b.iter(|| black_box(session.rows()));
    });
}

criterion_group!(
    benches,
    bench_find,
    bench_update,
    bench_add_remove,
    bench_encode,
    bench_rows,
);
criterion_main!(benches);
