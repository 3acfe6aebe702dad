//! Threshold filter and ordering for rule-scored pairs

use super::{Prediction, RuleFilter};
use crate::graph::CollabGraph;
use crate::learn::RuleCandidate;
use std::cmp::Ordering;
use tracing::debug;

/// Filter rule candidates and order them by descending score.
///
/// Ties fall back to more shared collaborators, then to artist names, so the
/// output order does not depend on how candidates were produced.
pub fn rank_rule_candidates(graph: &CollabGraph, candidates: &[RuleCandidate], filter: &RuleFilter) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = candidates
        .iter()
        .filter(|c| filter.accepts(&c.features))
        .filter(|c| c.u != c.v && !graph.is_existing(c.u, c.v))
        .map(|c| Prediction {
            rule: Some(c.features.clone()),
            ..Prediction::between(graph, c.u, c.v, c.score)
        })
        .collect();

    predictions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| shared(b).cmp(&shared(a)))
            .then_with(|| a.name_1.cmp(&b.name_1))
            .then_with(|| a.name_2.cmp(&b.name_2))
            .then_with(|| a.artist_1.cmp(&b.artist_1))
            .then_with(|| a.artist_2.cmp(&b.artist_2))
    });

    debug!(
        "{} of {} rule candidates passed the filter",
        predictions.len(),
        candidates.len()
    );
    predictions
}

fn shared(prediction: &Prediction) -> usize {
    prediction.rule.as_ref().map_or(0, |r| r.shared_neighbors)
}
