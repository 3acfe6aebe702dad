//! Cosine ranking over node embeddings

use super::{Prediction, RankConfig, RankError, RankResult, Selection};
use crate::graph::CollabGraph;
use collabgraph_algorithms::{cosine_matrix, top_k_per_row, NodeIdx};
use ndarray::Array2;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use tracing::debug;

/// Rank candidate pairs by cosine similarity of their embeddings.
///
/// Per-node selection keeps node order and, within a node, descending
/// score. Global selection is sorted by descending score.
pub fn rank_embeddings(
    graph: &CollabGraph,
    embeddings: &Array2<f32>,
    config: &RankConfig,
) -> RankResult<Vec<Prediction>> {
    let n = graph.node_count();
    if embeddings.nrows() != n {
        return Err(RankError::EmbeddingShape {
            expected: n,
            got: embeddings.nrows(),
        });
    }

    let scores = cosine_matrix(embeddings);
    let pairs = match config.selection {
        Selection::PerNode { k } => {
            if k == 0 {
                return Err(RankError::InvalidSelection("k must be positive".to_string()));
            }
            per_node(graph, &scores, k, config.dedupe_mirrored)
        }
        Selection::Global { limit } => global(graph, &scores, limit),
    };

    Ok(pairs
        .into_iter()
        .map(|(u, v, score)| Prediction::between(graph, u, v, score as f64))
        .collect())
}

fn per_node(graph: &CollabGraph, scores: &Array2<f32>, k: usize, dedupe: bool) -> Vec<(NodeIdx, NodeIdx, f32)> {
    let mut seen = FxHashSet::default();
    let mut pairs = Vec::new();
    let mut existing_skipped = 0usize;

    for (u, row) in top_k_per_row(scores, k).into_iter().enumerate() {
        for (v, score) in row {
            if graph.is_existing(u, v) {
                existing_skipped += 1;
                continue;
            }
            if dedupe && !seen.insert((u.min(v), u.max(v))) {
                continue;
            }
            pairs.push((u, v, score));
        }
    }

    debug!("Per-node top-{}: {} pairs, {} known collaborations removed", k, pairs.len(), existing_skipped);
    pairs
}

fn global(graph: &CollabGraph, scores: &Array2<f32>, limit: usize) -> Vec<(NodeIdx, NodeIdx, f32)> {
    let n = graph.node_count();
    let mut pairs: Vec<(NodeIdx, NodeIdx, f32)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|u| {
            ((u + 1)..n)
                .filter(move |&v| !graph.is_existing(u, v))
                .map(move |v| (u, v, scores[[u, v]]))
                .filter(|(_, _, s)| s.is_finite())
        })
        .collect();

    pairs.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });
    pairs.truncate(limit);

    debug!("Global top-{}: {} pairs", limit, pairs.len());
    pairs
}
