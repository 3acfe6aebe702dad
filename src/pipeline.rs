//! End-to-end prediction run
//!
//! Read tables, load the graph, learn a representation, rank candidates and
//! write the prediction table. Each run is a single pass over immutable
//! inputs and writes a fresh output file.

use crate::config::{ConfigError, Method, PipelineConfig};
use crate::graph::{Artist, CollabGraph, Collaboration};
use crate::learn::{
    LearnError, Node2VecLearner, Representation, RepresentationLearner, RuleScorer, SageLearner,
};
use crate::rank::{self, RankError, Ranking};
use crate::table::{self, TableError};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Any failure of a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    Rank(#[from] RankError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// What a run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub method: Method,
    pub artists: usize,
    pub nodes: usize,
    pub collaborations: usize,
    pub dropped_collaborations: usize,
    pub predictions: usize,
    pub final_loss: Option<f32>,
    pub output: PathBuf,
    pub elapsed_ms: u128,
}

/// Result of an in-memory run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: CollabGraph,
    pub representation: Representation,
    pub ranking: Ranking,
}

/// A configured prediction pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate the configuration and build a pipeline
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        for setting in config.ignored_settings() {
            warn!("{} is ignored by the {} method", setting, config.method);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The learner for the configured method
    pub fn learner(&self) -> Box<dyn RepresentationLearner> {
        let config = &self.config;
        match config.method {
            Method::Sage => Box::new(SageLearner::new(config.sage.clone())),
            Method::Node2Vec => Box::new(Node2VecLearner::new(config.node2vec.clone())),
            Method::Rules => Box::new(
                RuleScorer::new(config.rule_weights.clone())
                    .with_min_shared(config.rule_filter.min_common_neighbors),
            ),
        }
    }

    /// Run on tables already in memory; nothing is written
    pub fn run_tables(&self, artists: Vec<Artist>, collaborations: &[Collaboration]) -> PipelineResult<PipelineOutput> {
        let graph = CollabGraph::load(artists, collaborations, self.config.load_options());

        let mut learner = self.learner();
        info!("Learning representation with {}", learner.name());
        let representation = learner.learn(&graph)?;

        let ranking = rank::rank(&graph, &representation, &self.config.rank_config())?;
        Ok(PipelineOutput {
            graph,
            representation,
            ranking,
        })
    }

    /// Read the configured tables, predict, and write the prediction table
    pub fn run(&self) -> PipelineResult<RunSummary> {
        let start = Instant::now();
        let config = &self.config;
        info!("Starting {} run", config.method);

        let artists = table::read_artists(&config.artists)?;
        let artist_count = artists.len();
        let collaborations = table::read_collaborations(&config.collaborations)?;

        let output = self.run_tables(artists, &collaborations)?;

        let final_loss = match &output.representation {
            Representation::Embeddings(embeddings) => {
                if let Some(path) = &config.embeddings_out {
                    embeddings.write_json(path, &output.graph)?;
                }
                embeddings.final_loss()
            }
            Representation::PairScores(_) => None,
        };

        let output_path = config.output_path();
        table::write_predictions(&output_path, output.ranking.kind, &output.ranking.predictions)?;

        let summary = RunSummary {
            method: config.method,
            artists: artist_count,
            nodes: output.graph.node_count(),
            collaborations: output.graph.existing.len(),
            dropped_collaborations: output.graph.dropped_edges,
            predictions: output.ranking.predictions.len(),
            final_loss,
            output: output_path,
            elapsed_ms: start.elapsed().as_millis(),
        };
        info!(
            "Finished {} run: {} predictions in {} ms",
            summary.method, summary.predictions, summary.elapsed_ms
        );
        Ok(summary)
    }
}
