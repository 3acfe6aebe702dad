use collabgraph::graph::{Artist, CollabGraph, Collaboration, LoadOptions};
use collabgraph::table::{read_artists, read_collaborations};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn random_tables(seed: u64, artists: usize, rows: usize) -> (Vec<Artist>, Vec<Collaboration>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let list = (0..artists)
        .map(|i| {
            let mut a = Artist::new(format!("id{:03}", i), format!("Artist {}", i));
            a.popularity = Some(rng.gen_range(0.0..100.0));
            a.followers = if rng.gen_bool(0.8) { Some(rng.gen_range(0.0..1e6)) } else { None };
            a
        })
        .collect();
    // Includes self-pairs, duplicates and unknown artists
    let collabs = (0..rows)
        .map(|_| {
            let a = rng.gen_range(0..artists + 3);
            let b = rng.gen_range(0..artists + 3);
            Collaboration::new(format!("id{:03}", a), format!("id{:03}", b))
        })
        .collect();
    (list, collabs)
}

#[test]
fn test_adjacency_is_symmetric() {
    for seed in 0..5 {
        let (artists, collabs) = random_tables(seed, 30, 80);
        for connected_only in [false, true] {
            let graph = CollabGraph::load(artists.clone(), &collabs, LoadOptions { connected_only });
            let edges: HashSet<(usize, usize)> = graph.edge_index.iter().copied().collect();

            assert_eq!(edges.len(), graph.edge_index.len(), "duplicate directed edge");
            for &(i, j) in &edges {
                assert_ne!(i, j);
                assert!(edges.contains(&(j, i)), "missing reverse of ({}, {})", i, j);
                assert!(graph.view.has_edge(i, j));
                assert!(graph.is_existing(i, j));
            }
            assert_eq!(graph.view.edge_count() * 2, edges.len());
        }
    }
}

#[test]
fn test_features_standardized() {
    let (artists, collabs) = random_tables(11, 40, 60);
    let graph = CollabGraph::load(artists, &collabs, LoadOptions::default());

    assert_eq!(graph.features.shape(), &[40, 6]);
    assert!(graph.features.iter().all(|v| v.is_finite()));
    // Popularity column has mean ~0
    let mean: f32 = graph.features.column(1).sum() / 40.0;
    assert!(mean.abs() < 1e-4);
    // No album counts at all: constant column becomes zeros
    assert!(graph.features.column(2).iter().all(|&v| v == 0.0));
}

#[test]
fn test_load_from_files_scenario() {
    let dir = TempDir::new().unwrap();
    let artists_path = dir.path().join("artists.csv");
    let collabs_path = dir.path().join("collaborations.csv");
    fs::write(&artists_path, "id,name\nA,A\nB,B\nC,C\nD,D\n").unwrap();
    fs::write(&collabs_path, "artist_id,collaboration_id\nA,B\nB,C\n").unwrap();

    let artists = read_artists(&artists_path).unwrap();
    let collabs = read_collaborations(&collabs_path).unwrap();
    let graph = CollabGraph::load(artists, &collabs, LoadOptions::default());

    for pair in [(0, 1), (1, 0), (1, 2), (2, 1)] {
        assert!(graph.edge_index.contains(&pair));
    }
    assert_eq!(graph.edge_index.len(), 4);
    assert!(graph.view.neighbors(3).is_empty());
}
