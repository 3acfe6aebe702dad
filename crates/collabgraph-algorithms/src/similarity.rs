//! Embedding similarity and top-K selection
//!
//! Embeddings are rows of an `(N, dim)` matrix. After L2 normalization the
//! dot product of two rows is their cosine similarity.

use super::common::NodeIdx;
use ndarray::{Array2, Axis};
use rayon::prelude::*;

/// L2-normalize every row. Rows with zero norm stay zero.
pub fn normalize_rows(embeddings: &Array2<f32>) -> Array2<f32> {
    let mut normalized = embeddings.clone();
    for mut row in normalized.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > f32::EPSILON {
            row.mapv_inplace(|x| x / norm);
        } else {
            row.fill(0.0);
        }
    }
    normalized
}

/// All-pairs cosine similarity with the diagonal masked to negative infinity.
///
/// Off-diagonal values are clamped into `[-1, 1]`.
pub fn cosine_matrix(embeddings: &Array2<f32>) -> Array2<f32> {
    let unit = normalize_rows(embeddings);
    let mut scores = unit.dot(&unit.t());
    scores.mapv_inplace(|s| s.clamp(-1.0, 1.0));
    for i in 0..scores.nrows() {
        scores[[i, i]] = f32::NEG_INFINITY;
    }
    scores
}

/// The `k` highest-scoring columns of every row, best first.
///
/// The row's own index and non-finite scores are never selected, so a row
/// yields fewer than `k` entries when not enough candidates exist. Ties
/// resolve to the lower column index.
pub fn top_k_per_row(scores: &Array2<f32>, k: usize) -> Vec<Vec<(NodeIdx, f32)>> {
    (0..scores.nrows())
        .into_par_iter()
        .map(|i| {
            let row = scores.row(i);
            let mut candidates: Vec<(NodeIdx, f32)> = row
                .iter()
                .enumerate()
                .filter(|&(j, s)| j != i && s.is_finite())
                .map(|(j, &s)| (j, s))
                .collect();
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            candidates.truncate(k);
            candidates
        })
        .collect()
}
