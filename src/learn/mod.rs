//! Representation learners
//!
//! Each learner turns a loaded [`CollabGraph`] into something the ranker can
//! score: node embeddings (GraphSAGE, node2vec) or explicit pair scores
//! (the rule-based scorer).

pub mod node2vec;
pub mod optim;
pub mod rules;
pub mod sage;

use crate::graph::CollabGraph;
use ndarray::Array2;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub use node2vec::{Node2VecConfig, Node2VecLearner};
pub use rules::{RuleCandidate, RuleFeatures, RuleScorer, RuleWeights};
pub use sage::{SageConfig, SageLearner};

/// Learner errors
#[derive(Error, Debug)]
pub enum LearnError {
    #[error("Invalid learner configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature matrix has {got} rows, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LearnResult<T> = Result<T, LearnError>;

/// A learning strategy, selected at configuration time
pub trait RepresentationLearner {
    /// Short method name used in logs
    fn name(&self) -> &'static str;

    /// Learn a representation of every indexed node (or pair)
    fn learn(&mut self, graph: &CollabGraph) -> LearnResult<Representation>;
}

/// What a learner produces
#[derive(Debug, Clone)]
pub enum Representation {
    /// One row per node, aligned with the node index
    Embeddings(Embeddings),
    /// Scored candidate pairs, none of them existing collaborations
    PairScores(Vec<RuleCandidate>),
}

/// Node embedding matrix plus the training loss curve
#[derive(Debug, Clone)]
pub struct Embeddings {
    pub matrix: Array2<f32>,
    pub loss_history: Vec<f32>,
}

#[derive(Serialize)]
struct EmbeddingRecord<'a> {
    id: &'a str,
    name: &'a str,
    embedding: Vec<f32>,
}

impl Embeddings {
    pub fn new(matrix: Array2<f32>, loss_history: Vec<f32>) -> Self {
        Self { matrix, loss_history }
    }

    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn final_loss(&self) -> Option<f32> {
        self.loss_history.last().copied()
    }

    /// Serialize as a JSON array of `{id, name, embedding}` records in node order
    pub fn to_json(&self, graph: &CollabGraph) -> LearnResult<String> {
        if self.matrix.nrows() != graph.node_count() {
            return Err(LearnError::ShapeMismatch {
                expected: graph.node_count(),
                got: self.matrix.nrows(),
            });
        }
        let records: Vec<EmbeddingRecord<'_>> = graph
            .artists
            .iter()
            .zip(self.matrix.rows())
            .map(|(artist, row)| EmbeddingRecord {
                id: artist.id.as_str(),
                name: &artist.name,
                embedding: row.to_vec(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Write [`Embeddings::to_json`] to a file, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>, graph: &CollabGraph) -> LearnResult<()> {
        let path = path.as_ref();
        let io_err = |source| LearnError::Io {
            path: path.display().to_string(),
            source,
        };
        let json = self.to_json(graph)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, json).map_err(io_err)?;
        info!("Wrote {} embeddings to {}", self.matrix.nrows(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Artist, Collaboration, LoadOptions};
    use ndarray::array;

    fn graph() -> CollabGraph {
        CollabGraph::load(
            vec![Artist::new("a", "Alpha"), Artist::new("b", "Beta")],
            &[Collaboration::new("a", "b")],
            LoadOptions::default(),
        )
    }

    #[test]
    fn test_embedding_json_records() {
        let emb = Embeddings::new(array![[1.0, 0.0], [0.5, 0.25]], vec![0.7, 0.6]);
        let json: serde_json::Value = serde_json::from_str(&emb.to_json(&graph()).unwrap()).unwrap();

        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[1]["name"], "Beta");
        assert_eq!(json[1]["embedding"][1], 0.25);
        assert_eq!(emb.final_loss(), Some(0.6));
        assert_eq!(emb.dim(), 2);
    }

    #[test]
    fn test_embedding_json_row_mismatch() {
        let emb = Embeddings::new(array![[1.0, 0.0]], Vec::new());
        assert!(matches!(
            emb.to_json(&graph()),
            Err(LearnError::ShapeMismatch { expected: 2, got: 1 })
        ));
    }
}
