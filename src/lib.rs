//! Collabgraph
//!
//! Link prediction over a music collaboration graph: artists are nodes,
//! known collaborations are undirected edges, and the output is a ranked
//! list of artist pairs that have not worked together yet but plausibly
//! could.
//!
//! # Pipeline
//!
//! 1. Table I/O reads the artist and collaboration tables ([`table`])
//! 2. The graph loader builds a dense node index, symmetric edge list and
//!    standardized feature matrix ([`graph`])
//! 3. A representation learner produces node embeddings or pair scores
//!    ([`learn`]):
//!    - GraphSAGE message passing over node features
//!    - node2vec random-walk embeddings over topology only
//!    - rule-based scores from shared collaborators, genres, popularity
//!      and location
//! 4. The link ranker selects candidate pairs, never self-pairs or known
//!    collaborations ([`rank`])
//! 5. The result writer serializes the ranking as CSV ([`table`])
//!
//! ## Example Usage
//!
//! ```rust
//! use collabgraph::{Artist, Collaboration, Method, Pipeline, PipelineConfig};
//!
//! let artists = vec![
//!     Artist::new("a", "Alpha"),
//!     Artist::new("b", "Beta"),
//!     Artist::new("c", "Gamma"),
//! ];
//! let collaborations = vec![Collaboration::new("a", "b"), Collaboration::new("b", "c")];
//!
//! let pipeline = Pipeline::new(PipelineConfig::for_method(Method::Rules)).unwrap();
//! let output = pipeline.run_tables(artists, &collaborations).unwrap();
//!
//! // Alpha and Gamma share Beta
//! assert_eq!(output.ranking.predictions.len(), 1);
//! assert_eq!(output.ranking.predictions[0].name_1, "Alpha");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod learn;
pub mod pipeline;
pub mod rank;
pub mod table;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, Method, PipelineConfig};

pub use graph::{Artist, ArtistId, CollabGraph, Collaboration, LoadOptions, NodeIndex, PairKey, PairSet};

pub use learn::{
    Embeddings, LearnError, LearnResult, Node2VecConfig, Node2VecLearner, Representation,
    RepresentationLearner, RuleCandidate, RuleFeatures, RuleScorer, RuleWeights, SageConfig,
    SageLearner,
};

pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineResult, RunSummary};

pub use rank::{
    Prediction, PredictionKind, RankConfig, RankError, RankResult, Ranking, RuleFilter, Selection,
};

pub use table::{Report, TableError, TableResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
