//! Rule-based pair scoring
//!
//! No training: every candidate pair of artists gets structural and
//! attribute features (shared collaborators, shared genres, popularity gap,
//! same country, same city) combined into one weighted score.

use super::{LearnError, LearnResult, Representation, RepresentationLearner};
use crate::graph::{Artist, CollabGraph};
use collabgraph_algorithms::{common_neighbor_count, NodeIdx};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Weights of the rule score terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub shared_neighbors: f64,
    pub genre_overlap: f64,
    /// Weight of `1 / (1 + popularity_diff)`
    pub popularity: f64,
    pub same_country: f64,
    pub same_city: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            shared_neighbors: 1.0,
            genre_overlap: 0.5,
            popularity: 1.0,
            same_country: 0.25,
            same_city: 0.25,
        }
    }
}

impl RuleWeights {
    /// Weights must be finite and non-negative
    pub fn validate(&self) -> LearnResult<()> {
        let named = [
            ("shared_neighbors", self.shared_neighbors),
            ("genre_overlap", self.genre_overlap),
            ("popularity", self.popularity),
            ("same_country", self.same_country),
            ("same_city", self.same_city),
        ];
        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(LearnError::InvalidConfig(format!(
                    "rule weight {} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }

    pub fn score(&self, features: &RuleFeatures) -> f64 {
        self.shared_neighbors * features.shared_neighbors as f64
            + self.genre_overlap * features.genre_overlap as f64
            + self.popularity / (1.0 + features.popularity_diff)
            + if features.same_country { self.same_country } else { 0.0 }
            + if features.same_city { self.same_city } else { 0.0 }
    }
}

/// Features of one candidate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFeatures {
    pub shared_neighbors: usize,
    pub genre_overlap: usize,
    pub popularity_diff: f64,
    pub same_country: bool,
    pub same_city: bool,
}

impl RuleFeatures {
    fn between(a: &Artist, b: &Artist, shared_neighbors: usize) -> Self {
        Self {
            shared_neighbors,
            genre_overlap: a.shared_genres(b),
            popularity_diff: a.popularity_diff(b),
            same_country: a.same_country(b),
            same_city: a.same_locality(b),
        }
    }
}

/// A scored, not-yet-existing pair. `u` holds the artist with the smaller id.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCandidate {
    pub u: NodeIdx,
    pub v: NodeIdx,
    pub features: RuleFeatures,
    pub score: f64,
}

/// Rule-based "learner"
pub struct RuleScorer {
    weights: RuleWeights,
    min_shared: usize,
}

impl RuleScorer {
    pub fn new(weights: RuleWeights) -> Self {
        Self { weights, min_shared: 0 }
    }

    /// Only score pairs with at least this many shared collaborators.
    ///
    /// With a positive minimum, candidates are drawn from two-hop
    /// neighborhoods instead of all pairs.
    pub fn with_min_shared(mut self, min_shared: usize) -> Self {
        self.min_shared = min_shared;
        self
    }

    fn candidates_for(&self, graph: &CollabGraph, u: NodeIdx) -> Vec<RuleCandidate> {
        let view = &graph.view;
        let anchor = graph.artist(u);

        let partners: Vec<NodeIdx> = if self.min_shared > 0 {
            let mut two_hop: FxHashSet<NodeIdx> = FxHashSet::default();
            for &mid in view.neighbors(u) {
                two_hop.extend(view.neighbors(mid).iter().copied());
            }
            let mut partners: Vec<NodeIdx> = two_hop.into_iter().collect();
            partners.sort_unstable();
            partners
        } else {
            (0..graph.node_count()).collect()
        };

        partners
            .into_iter()
            .filter(|&w| w != u && anchor.id < graph.artist(w).id && !graph.is_existing(u, w))
            .filter_map(|w| {
                let shared = common_neighbor_count(view, u, w);
                if shared < self.min_shared {
                    return None;
                }
                let features = RuleFeatures::between(anchor, graph.artist(w), shared);
                let score = self.weights.score(&features);
                Some(RuleCandidate { u, v: w, features, score })
            })
            .collect()
    }
}

impl RepresentationLearner for RuleScorer {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn learn(&mut self, graph: &CollabGraph) -> LearnResult<Representation> {
        self.weights.validate()?;
        let scorer = &*self;

        let candidates: Vec<RuleCandidate> = (0..graph.node_count())
            .into_par_iter()
            .flat_map_iter(|u| scorer.candidates_for(graph, u))
            .collect();

        info!(
            "Scored {} candidate pairs over {} artists",
            candidates.len(),
            graph.node_count()
        );
        Ok(Representation::PairScores(candidates))
    }
}
