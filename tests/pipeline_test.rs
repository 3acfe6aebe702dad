use collabgraph::table::{read_report, write_predictions};
use collabgraph::{Method, Pipeline, PipelineConfig, PredictionKind, Selection};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ARTISTS: &str = "\
id,name,followers,genres,popularity,num_albums,debut_year,last_active_year,active_years,country,begin_area
a,Artist A,1000,\"pop, rock\",50,3,2001,2020,19,US,Chicago
b,Artist B,5000,pop,55,5,1999,2021,22,US,Chicago
c,Artist C,800,rock,52,2,2005,2019,14,US,Detroit
d,Artist D,90,jazz,12,1,2015,2016,1,FR,Paris
";

const COLLABORATIONS: &str = "\
artist_1,artist_2
a,b
b,c
";

fn write_tables(dir: &Path, artists: &str, collaborations: &str) -> (PathBuf, PathBuf) {
    let artists_path = dir.join("artists.csv");
    let collabs_path = dir.join("collaborations.csv");
    fs::write(&artists_path, artists).unwrap();
    fs::write(&collabs_path, collaborations).unwrap();
    (artists_path, collabs_path)
}

fn config(dir: &Path, method: Method, output: &str) -> PipelineConfig {
    let (artists, collaborations) = write_tables(dir, ARTISTS, COLLABORATIONS);
    let mut config = PipelineConfig::for_method(method);
    config.artists = artists;
    config.collaborations = collaborations;
    config.output = Some(dir.join(output));
    config
}

fn existing() -> HashSet<(String, String)> {
    [("Artist A", "Artist B"), ("Artist B", "Artist C")]
        .iter()
        .flat_map(|(x, y)| [(x.to_string(), y.to_string()), (y.to_string(), x.to_string())])
        .collect()
}

#[test]
fn test_rules_surface_common_neighbor_pair() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), Method::Rules, "out/rules.csv");

    let summary = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(summary.predictions, 1);

    let report = read_report(dir.path().join("out/rules.csv")).unwrap();
    assert_eq!(report.headers.len(), 8);
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(&row[0], "Artist A");
    assert_eq!(&row[1], "Artist C");
    assert_eq!(&row[2], "1");
    assert_eq!(&row[3], "1");
    assert_eq!(&row[4], "2.00");
    assert_eq!(&row[5], "true");
    assert_eq!(&row[6], "false");
    // 1 + 0.5 + 1/3 + 0.25
    assert_eq!(&row[7], "2.08");
}

#[test]
fn test_rules_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), Method::Rules, "first.csv");
    config.rule_filter.min_common_neighbors = 0;
    config.rule_filter.max_popularity_diff = 100.0;

    Pipeline::new(config.clone()).unwrap().run().unwrap();
    config.output = Some(dir.path().join("second.csv"));
    Pipeline::new(config).unwrap().run().unwrap();

    let first = fs::read_to_string(dir.path().join("first.csv")).unwrap();
    let second = fs::read_to_string(dir.path().join("second.csv")).unwrap();
    assert_eq!(first, second);
    // All 4 non-collaborating pairs
    assert_eq!(first.lines().count(), 5);
}

#[test]
fn test_sage_predictions_exclude_self_and_existing() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), Method::Sage, "sage.csv");
    config.sage.epochs = 20;
    config.embeddings_out = Some(dir.path().join("emb/sage.json"));

    let summary = Pipeline::new(config).unwrap().run().unwrap();
    assert!(summary.final_loss.is_some());

    let report = read_report(dir.path().join("sage.csv")).unwrap();
    assert_eq!(report.headers, vec!["Artist 1", "Artist 2", "Score"]);
    assert!(!report.is_empty());
    let known = existing();
    for row in &report.rows {
        assert_ne!(row[0], row[1]);
        assert!(!known.contains(&(row[0].clone(), row[1].clone())));
        let score: f64 = row[2].parse().unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("emb/sage.json")).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);
    assert_eq!(json[0]["embedding"].as_array().unwrap().len(), 16);
}

#[test]
fn test_node2vec_global_ranking() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), Method::Node2Vec, "node2vec.csv");
    config.node2vec.epochs = 5;
    config.node2vec.embedding_dim = 8;

    let summary = Pipeline::new(config).unwrap().run().unwrap();
    // Isolated D is dropped, leaving only A-C as a candidate
    assert_eq!(summary.nodes, 3);
    assert_eq!(summary.predictions, 1);

    let report = read_report(dir.path().join("node2vec.csv")).unwrap();
    assert_eq!(&report.rows[0][0], "Artist A");
    assert_eq!(&report.rows[0][1], "Artist C");
}

#[test]
fn test_per_node_dedupe() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), Method::Sage, "dedupe.csv");
    config.sage.epochs = 5;
    config.selection = Some(Selection::PerNode { k: 3 });
    config.dedupe_mirrored = true;

    Pipeline::new(config).unwrap().run().unwrap();

    let report = read_report(dir.path().join("dedupe.csv")).unwrap();
    let mut seen = HashSet::new();
    for row in &report.rows {
        let key = if row[0] < row[1] {
            (row[0].clone(), row[1].clone())
        } else {
            (row[1].clone(), row[0].clone())
        };
        assert!(seen.insert(key), "mirrored pair in output");
    }
    // 6 pairs among 4 artists minus 2 collaborations
    assert_eq!(report.len(), 4);
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::for_method(Method::Rules);
    config.artists = dir.path().join("nope.csv");
    config.collaborations = dir.path().join("nope.csv");
    config.output = Some(dir.path().join("out.csv"));

    assert!(Pipeline::new(config).unwrap().run().is_err());
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn test_empty_tables() {
    let dir = TempDir::new().unwrap();
    let (artists, collaborations) = write_tables(dir.path(), "id,name\n", "artist_1,artist_2\n");
    let mut config = PipelineConfig::for_method(Method::Sage);
    config.artists = artists;
    config.collaborations = collaborations;
    config.output = Some(dir.path().join("empty.csv"));

    let summary = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(summary.predictions, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("empty.csv")).unwrap(),
        "Artist 1,Artist 2,Score\n"
    );
}

#[test]
fn test_writer_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a/b/c.csv");
    write_predictions(&path, PredictionKind::Embedding, &[]).unwrap();
    assert!(path.exists());
}
