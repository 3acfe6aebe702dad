//! Negative sampling of non-edges
//!
//! Draws directed node pairs that are neither self-pairs nor existing edges,
//! used as the contrastive signal for link-prediction training.

use super::common::{GraphView, NodeIdx};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Sample up to `count` distinct directed pairs `(u, v)` with `u != v` and no edge between them.
///
/// Returns fewer than `count` pairs only when the graph does not have that
/// many non-edges.
pub fn sample_negative_edges<R: Rng>(
    view: &GraphView,
    count: usize,
    rng: &mut R,
) -> Vec<(NodeIdx, NodeIdx)> {
    let n = view.node_count;
    if n < 2 || count == 0 {
        return Vec::new();
    }

    let available = n * (n - 1) - view.targets.len();
    if available == 0 {
        return Vec::new();
    }
    let count = count.min(available);

    // Dense regime: rejection sampling would spin, enumerate instead.
    if count * 2 >= available {
        let mut all = Vec::with_capacity(available);
        for u in 0..n {
            for v in 0..n {
                if u != v && !view.has_edge(u, v) {
                    all.push((u, v));
                }
            }
        }
        all.shuffle(rng);
        all.truncate(count);
        return all;
    }

    let mut seen = HashSet::with_capacity(count);
    let mut pairs = Vec::with_capacity(count);
    while pairs.len() < count {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v || view.has_edge(u, v) {
            continue;
        }
        if seen.insert((u, v)) {
            pairs.push((u, v));
        }
    }
    pairs
}
