use collabgraph::graph::{Artist, CollabGraph, Collaboration, LoadOptions};
use collabgraph::learn::{RepresentationLearner, RuleScorer, RuleWeights};
use collabgraph::rank::{rank, rank_embeddings, RankConfig, Selection};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random graph with roughly `degree` collaborations per artist
fn random_graph(size: usize, degree: usize) -> CollabGraph {
    let mut rng = StdRng::seed_from_u64(7);
    let artists = (0..size)
        .map(|i| {
            let mut a = Artist::new(format!("id{}", i), format!("Artist {}", i));
            a.popularity = Some(rng.gen_range(0.0..100.0));
            a
        })
        .collect();
    let collabs: Vec<Collaboration> = (0..size * degree / 2)
        .map(|_| {
            Collaboration::new(
                format!("id{}", rng.gen_range(0..size)),
                format!("id{}", rng.gen_range(0..size)),
            )
        })
        .collect();
    CollabGraph::load(artists, &collabs, LoadOptions::default())
}

fn random_embeddings(rows: usize, dim: usize) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(11);
    Array2::from_shape_fn((rows, dim), |_| rng.gen_range(-1.0..1.0))
}

/// Benchmark cosine ranking with per-node and global selection
fn bench_embedding_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("embedding_ranking");

    for size in [100, 500, 1000].iter() {
        let graph = random_graph(*size, 6);
        let embeddings = random_embeddings(*size, 32);

        let per_node = RankConfig {
            selection: Selection::PerNode { k: 10 },
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("per_node", size), size, |b, _| {
            b.iter(|| rank_embeddings(&graph, &embeddings, &per_node))
        });

        let global = RankConfig {
            selection: Selection::Global { limit: 200 },
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("global", size), size, |b, _| {
            b.iter(|| rank_embeddings(&graph, &embeddings, &global))
        });
    }
    group.finish();
}

/// Benchmark rule scoring plus filtering
fn bench_rule_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_ranking");

    for size in [100, 1000, 5000].iter() {
        let graph = random_graph(*size, 6);
        let config = RankConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut scorer = RuleScorer::new(RuleWeights::default()).with_min_shared(1);
                let representation = scorer.learn(&graph).unwrap();
                rank(&graph, &representation, &config).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_embedding_ranking, bench_rule_ranking);
criterion_main!(benches);
