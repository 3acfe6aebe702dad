//! Random walk generation
//!
//! Uniform walks (DeepWalk) and biased 2nd-order walks as described in
//! Grover & Leskovec, "node2vec: Scalable Feature Learning for Networks" (KDD 2016).
//!
//! Walk rounds run in parallel; each round owns an RNG seeded from
//! `seed + round`, so the output is reproducible for a fixed seed.

use super::common::{GraphView, NodeIdx};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Configuration for random walks.
#[derive(Debug, Clone, Copy)]
pub struct RandomWalkConfig {
    /// Length of each random walk (number of nodes, start included).
    pub walk_length: usize,
    /// Number of walks to start from each node.
    pub walks_per_node: usize,
    /// Return parameter (p): likelihood of revisiting the previous node.
    pub p: f64,
    /// In-out parameter (q): q < 1 favors moving away from the previous node.
    pub q: f64,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            walk_length: 15,
            walks_per_node: 10,
            p: 1.0,
            q: 1.0,
            seed: 42,
        }
    }
}

/// Generate `walks_per_node` walks from every node of the view.
///
/// Isolated nodes yield walks of length one.
pub fn generate_walks(view: &GraphView, config: RandomWalkConfig) -> Vec<Vec<NodeIdx>> {
    if view.node_count == 0 || config.walk_length == 0 {
        return Vec::new();
    }

    let unbiased = (config.p - 1.0).abs() < f64::EPSILON && (config.q - 1.0).abs() < f64::EPSILON;

    (0..config.walks_per_node)
        .into_par_iter()
        .map(|round| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(round as u64));
            let mut starts: Vec<NodeIdx> = (0..view.node_count).collect();
            starts.shuffle(&mut rng);

            starts
                .into_iter()
                .map(|start| {
                    if unbiased {
                        uniform_walk(view, start, config.walk_length, &mut rng)
                    } else {
                        biased_walk(view, start, &config, &mut rng)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

fn uniform_walk<R: Rng>(view: &GraphView, start: NodeIdx, length: usize, rng: &mut R) -> Vec<NodeIdx> {
    let mut walk = Vec::with_capacity(length);
    walk.push(start);

    let mut curr = start;
    while walk.len() < length {
        let Some(&next) = view.neighbors(curr).choose(rng) else {
            break;
        };
        walk.push(next);
        curr = next;
    }
    walk
}

/// O(1) expected time per step via rejection sampling.
///
/// Rejection needs every weight finite and positive. Otherwise (p or q zero,
/// infinite or NaN) each step samples the exact distribution instead, so a
/// walk stuck at a leaf with a zero return weight still moves.
fn biased_walk<R: Rng>(view: &GraphView, start: NodeIdx, config: &RandomWalkConfig, rng: &mut R) -> Vec<NodeIdx> {
    let mut walk = Vec::with_capacity(config.walk_length);
    walk.push(start);

    let return_weight = 1.0 / config.p;
    let away_weight = 1.0 / config.q;
    let max_weight = return_weight.max(1.0).max(away_weight);
    let rejection = return_weight > 0.0 && away_weight > 0.0 && max_weight.is_finite();

    let weight = |prev: NodeIdx, candidate: NodeIdx| {
        if candidate == prev {
            return_weight
        } else if view.has_edge(prev, candidate) {
            1.0
        } else {
            away_weight
        }
    };

    let mut prev: Option<NodeIdx> = None;
    let mut curr = start;
    while walk.len() < config.walk_length {
        let neighbors = view.neighbors(curr);
        if neighbors.is_empty() {
            break;
        }

        let next = match prev {
            None => neighbors[rng.gen_range(0..neighbors.len())],
            Some(prev_node) if rejection => loop {
                let candidate = neighbors[rng.gen_range(0..neighbors.len())];
                if rng.gen::<f64>() < weight(prev_node, candidate) / max_weight {
                    break candidate;
                }
            },
            Some(prev_node) => {
                let weights: Vec<f64> = neighbors.iter().map(|&c| weight(prev_node, c)).collect();
                exact_step(neighbors, &weights, rng)
            }
        };

        walk.push(next);
        prev = Some(curr);
        curr = next;
    }
    walk
}

/// Draw a neighbor proportionally to `weights`.
///
/// Infinite weights win outright, NaN counts as zero, and an all-zero row
/// falls back to a uniform pick.
fn exact_step<R: Rng>(neighbors: &[NodeIdx], weights: &[f64], rng: &mut R) -> NodeIdx {
    let dominant: Vec<NodeIdx> = neighbors
        .iter()
        .zip(weights)
        .filter(|&(_, w)| *w == f64::INFINITY)
        .map(|(&n, _)| n)
        .collect();
    if let Some(&next) = dominant.choose(rng) {
        return next;
    }

    let total: f64 = weights.iter().filter(|&&w| w > 0.0).sum();
    if !(total > 0.0) {
        return neighbors[rng.gen_range(0..neighbors.len())];
    }

    let mut target = rng.gen::<f64>() * total;
    let mut last = neighbors[0];
    for (&n, &w) in neighbors.iter().zip(weights) {
        if !(w > 0.0) {
            continue;
        }
        if target < w {
            return n;
        }
        target -= w;
        last = n;
    }
    last
}
