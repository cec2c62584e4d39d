use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use ragdex::{Document, VectorIndex};
use tempfile::TempDir;

const DIMENSIONS: usize = 384;
const NUM_QUERIES: usize = 10;
const TOP_K: usize = 5;

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(10))
        .warm_up_time(std::time::Duration::from_secs(2))
        .configure_from_args()
}

fn random_vectors(rng: &mut StdRng, count: usize) -> Vec<Vec<f32>> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..count)
        .map(|_| normal.sample_iter(&mut *rng).take(DIMENSIONS).collect())
        .collect()
}

fn build_index(rng: &mut StdRng, size: usize) -> VectorIndex {
    let documents = (0..size).map(|i| Document::new(format!("chunk {}", i))).collect();
    let mut index = VectorIndex::new();
    index.add(documents, random_vectors(rng, size)).unwrap();
    index
}

fn search_embeddings(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let queries = random_vectors(&mut rng, NUM_QUERIES);

    let mut group = c.benchmark_group("similarity_search");
    for size in [1_000, 10_000, 50_000] {
        let index = build_index(&mut rng, size);
        group.bench_with_input(BenchmarkId::new("exhaustive", size), &index, |b, index| {
            b.iter(|| {
                for query in &queries {
                    let hits = index.similarity_search(query, TOP_K).unwrap();
                    assert_eq!(hits.len(), TOP_K);
                }
            })
        });
    }
    group.finish();
}

fn save_and_load(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let index = build_index(&mut rng, 10_000);
    let dir = TempDir::new().unwrap();

    c.bench_function("save_10000_entries", |b| {
        b.iter(|| index.save("bench", dir.path()).unwrap())
    });

    index.save("bench", dir.path()).unwrap();
    c.bench_function("load_10000_entries", |b| {
        b.iter(|| VectorIndex::load("bench", dir.path()).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = search_embeddings, save_and_load
}
criterion_main!(benches);
