//! Link ranking
//!
//! Turns a learned [`Representation`] into an ordered list of predicted
//! collaborations. No ranked pair is ever a self-pair or a known
//! collaboration.

pub mod embedding;
pub mod rules;

use crate::graph::{ArtistId, CollabGraph};
use crate::learn::{Representation, RuleFeatures};
use collabgraph_algorithms::NodeIdx;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use embedding::rank_embeddings;
pub use rules::rank_rule_candidates;

/// Ranking errors
#[derive(Error, Debug)]
pub enum RankError {
    #[error("Embedding matrix has {got} rows but the graph has {expected} nodes")]
    EmbeddingShape { expected: usize, got: usize },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

pub type RankResult<T> = Result<T, RankError>;

/// Which output table layout a ranking uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    Embedding,
    Rule,
}

/// A predicted collaboration
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub artist_1: ArtistId,
    pub artist_2: ArtistId,
    pub name_1: String,
    pub name_2: String,
    pub score: f64,
    /// Present for rule-based predictions only
    pub rule: Option<RuleFeatures>,
}

impl Prediction {
    pub(crate) fn between(graph: &CollabGraph, u: NodeIdx, v: NodeIdx, score: f64) -> Self {
        let (a, b) = (graph.artist(u), graph.artist(v));
        Prediction {
            artist_1: a.id.clone(),
            artist_2: b.id.clone(),
            name_1: a.name.clone(),
            name_2: b.name.clone(),
            score,
            rule: None,
        }
    }
}

/// How embedding candidates are selected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Selection {
    /// The `k` best partners of every node, in node order
    PerNode { k: usize },
    /// The `limit` best unordered pairs overall
    Global { limit: usize },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::PerNode { k: 10 }
    }
}

/// Thresholds applied to rule candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFilter {
    pub min_common_neighbors: usize,
    pub min_common_genres: usize,
    pub max_popularity_diff: f64,
}

impl Default for RuleFilter {
    fn default() -> Self {
        Self {
            min_common_neighbors: 1,
            min_common_genres: 0,
            max_popularity_diff: 10.0,
        }
    }
}

impl RuleFilter {
    pub fn accepts(&self, features: &RuleFeatures) -> bool {
        features.shared_neighbors >= self.min_common_neighbors
            && features.genre_overlap >= self.min_common_genres
            && features.popularity_diff <= self.max_popularity_diff
    }
}

/// Ranker settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankConfig {
    pub selection: Selection,
    /// Keep only the first of two mirrored per-node pairs
    pub dedupe_mirrored: bool,
    pub rule_filter: RuleFilter,
}

/// Ranked output together with its table layout
#[derive(Debug, Clone)]
pub struct Ranking {
    pub kind: PredictionKind,
    pub predictions: Vec<Prediction>,
}

impl Ranking {
    pub fn is_rule_based(&self) -> bool {
        self.kind == PredictionKind::Rule
    }
}

/// Rank any representation
pub fn rank(graph: &CollabGraph, representation: &Representation, config: &RankConfig) -> RankResult<Ranking> {
    let ranking = match representation {
        Representation::Embeddings(embeddings) => Ranking {
            kind: PredictionKind::Embedding,
            predictions: rank_embeddings(graph, &embeddings.matrix, config)?,
        },
        Representation::PairScores(candidates) => Ranking {
            kind: PredictionKind::Rule,
            predictions: rank_rule_candidates(graph, candidates, &config.rule_filter),
        },
    };
    info!("Ranked {} candidate collaborations", ranking.predictions.len());
    Ok(ranking)
}
