//! Random-walk embeddings (node2vec)
//!
//! Nodes appearing in similar random-walk contexts get similar embeddings.
//! Walks are treated as sentences and trained with skip-gram and negative
//! sampling (SGNS):
//!
//! ```text
//! L = -log σ(v_ctx · v_center) - Σ_neg log σ(-v_neg · v_center)
//! ```
//!
//! Fresh walks are drawn every epoch. Each walk is cut into windows of
//! `context_size` nodes; the first node of a window is the center and the
//! rest are its positive contexts. Node features are ignored.

use super::{Embeddings, LearnError, LearnResult, Representation, RepresentationLearner};
use crate::graph::CollabGraph;
use collabgraph_algorithms::{generate_walks, NodeIdx, RandomWalkConfig};
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// node2vec hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node2VecConfig {
    pub embedding_dim: usize,
    pub walk_length: usize,
    /// Window length in nodes, center included
    pub context_size: usize,
    pub walks_per_node: usize,
    /// Negative samples per positive pair
    pub negative_samples: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    /// Floor for the linear learning-rate decay
    pub min_learning_rate: f32,
    /// Return parameter
    pub p: f64,
    /// In-out parameter
    pub q: f64,
    pub log_every: usize,
    pub seed: u64,
}

impl Default for Node2VecConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 32,
            walk_length: 15,
            context_size: 10,
            walks_per_node: 10,
            negative_samples: 5,
            epochs: 200,
            learning_rate: 0.01,
            min_learning_rate: 0.0001,
            p: 1.0,
            q: 1.0,
            log_every: 10,
            seed: 42,
        }
    }
}

impl Node2VecConfig {
    pub fn validate(&self) -> LearnResult<()> {
        if self.embedding_dim == 0 || self.walks_per_node == 0 {
            return Err(LearnError::InvalidConfig(
                "embedding_dim and walks_per_node must be positive".to_string(),
            ));
        }
        if self.context_size < 2 || self.walk_length < self.context_size {
            return Err(LearnError::InvalidConfig(format!(
                "need 2 <= context_size ({}) <= walk_length ({})",
                self.context_size, self.walk_length
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0)
            || !(self.min_learning_rate <= self.learning_rate)
        {
            return Err(LearnError::InvalidConfig(
                "learning_rate must be positive and at least min_learning_rate".to_string(),
            ));
        }
        // Infinite p or q zeroes a transition weight
        for (name, value) in [("p", self.p), ("q", self.q)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LearnError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Skip-gram model: target embeddings (the output) and context embeddings
struct SkipGram {
    target: Array2<f32>,
    context: Array2<f32>,
    /// Pre-update context row, reused across steps
    scratch: Array1<f32>,
}

impl SkipGram {
    fn new<R: Rng>(num_nodes: usize, dim: usize, rng: &mut R) -> Self {
        let bound = 0.5 / dim as f32;
        let dist = Uniform::new_inclusive(-bound, bound);
        Self {
            target: Array2::from_shape_fn((num_nodes, dim), |_| dist.sample(rng)),
            context: Array2::zeros((num_nodes, dim)),
            scratch: Array1::zeros(dim),
        }
    }

    /// One SGD step on a (center, context) pair; returns the pair's loss
    fn train_pair(&mut self, center: NodeIdx, ctx: NodeIdx, positive: bool, lr: f32) -> f32 {
        let dot = self.target.row(center).dot(&self.context.row(ctx));
        let label = if positive { 1.0 } else { 0.0 };
        let sig = sigmoid(dot);
        let grad = (label - sig) * lr;

        self.scratch.assign(&self.context.row(ctx));
        self.context.row_mut(ctx).scaled_add(grad, &self.target.row(center));
        self.target.row_mut(center).scaled_add(grad, &self.scratch);

        let p = if positive { sig } else { 1.0 - sig };
        -(p.max(1e-7)).ln()
    }
}

/// node2vec representation learner
pub struct Node2VecLearner {
    config: Node2VecConfig,
}

impl Node2VecLearner {
    pub fn new(config: Node2VecConfig) -> Self {
        Self { config }
    }
}

impl RepresentationLearner for Node2VecLearner {
    fn name(&self) -> &'static str {
        "node2vec"
    }

    fn learn(&mut self, graph: &CollabGraph) -> LearnResult<Representation> {
        let config = &self.config;
        config.validate()?;
        let n = graph.node_count();
        if n == 0 {
            return Ok(Representation::Embeddings(Embeddings::new(
                Array2::zeros((0, config.embedding_dim)),
                Vec::new(),
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut model = SkipGram::new(n, config.embedding_dim, &mut rng);
        info!(
            "Training node2vec: {} nodes, dim {}, {} walks/node of length {}, {} epochs",
            n, config.embedding_dim, config.walks_per_node, config.walk_length, config.epochs
        );

        let mut loss_history = Vec::with_capacity(config.epochs);
        for epoch in 0..config.epochs {
            let lr = decayed_learning_rate(config, epoch);
            let walks = generate_walks(
                &graph.view,
                RandomWalkConfig {
                    walk_length: config.walk_length,
                    walks_per_node: config.walks_per_node,
                    p: config.p,
                    q: config.q,
                    seed: config.seed.wrapping_add((epoch as u64) << 32),
                },
            );

            let mut total_loss = 0.0f64;
            let mut pairs = 0usize;
            for walk in &walks {
                for window in context_windows(walk, config.context_size) {
                    let center = window[0];
                    for &ctx in &window[1..] {
                        total_loss += model.train_pair(center, ctx, true, lr) as f64;
                        pairs += 1;
                        for _ in 0..config.negative_samples {
                            let negative = rng.gen_range(0..n);
                            if negative == ctx {
                                continue;
                            }
                            total_loss += model.train_pair(center, negative, false, lr) as f64;
                            pairs += 1;
                        }
                    }
                }
            }

            let loss = if pairs == 0 { 0.0 } else { (total_loss / pairs as f64) as f32 };
            loss_history.push(loss);
            if config.log_every > 0 && (epoch % config.log_every == 0 || epoch + 1 == config.epochs) {
                info!("Epoch {:03} | Loss: {:.4}", epoch + 1, loss);
            } else {
                debug!("Epoch {:03} | Loss: {:.4} | lr {:.5}", epoch + 1, loss, lr);
            }
        }

        Ok(Representation::Embeddings(Embeddings::new(model.target, loss_history)))
    }
}

/// Windows of `size` consecutive nodes; a walk shorter than `size` forms one window.
fn context_windows(walk: &[NodeIdx], size: usize) -> Vec<&[NodeIdx]> {
    if walk.len() < 2 {
        return Vec::new();
    }
    if walk.len() < size {
        return vec![walk];
    }
    walk.windows(size).collect()
}

fn decayed_learning_rate(config: &Node2VecConfig, epoch: usize) -> f32 {
    if config.epochs == 0 {
        return config.learning_rate;
    }
    let progress = epoch as f32 / config.epochs as f32;
    let lr = config.learning_rate - (config.learning_rate - config.min_learning_rate) * progress;
    lr.max(config.min_learning_rate)
}

fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Artist, Collaboration, LoadOptions};
    use collabgraph_algorithms::cosine_matrix;

    /// Two 5-node rings joined by nothing
    fn two_rings() -> CollabGraph {
        let artists: Vec<Artist> = (0..10).map(|i| Artist::new(format!("n{}", i), format!("N{}", i))).collect();
        let mut collabs = Vec::new();
        for base in [0, 5] {
            for k in 0..5 {
                let a = base + k;
                let b = base + (k + 1) % 5;
                collabs.push(Collaboration::new(format!("n{}", a), format!("n{}", b)));
            }
        }
        CollabGraph::load(artists, &collabs, LoadOptions { connected_only: true })
    }

    fn small_config() -> Node2VecConfig {
        Node2VecConfig {
            embedding_dim: 8,
            walk_length: 8,
            context_size: 4,
            walks_per_node: 4,
            epochs: 30,
            learning_rate: 0.05,
            ..Default::default()
        }
    }

    fn embeddings(rep: Representation) -> Embeddings {
        match rep {
            Representation::Embeddings(e) => e,
            Representation::PairScores(_) => panic!("expected embeddings"),
        }
    }

    #[test]
    fn test_context_windows() {
        let walk = [0, 1, 2, 3, 4];
        let windows = context_windows(&walk, 3);
        assert_eq!(windows, vec![&[0, 1, 2][..], &[1, 2, 3][..], &[2, 3, 4][..]]);

        assert_eq!(context_windows(&[7, 8], 3), vec![&[7, 8][..]]);
        assert!(context_windows(&[7], 3).is_empty());
    }

    #[test]
    fn test_train_pair_uses_pre_update_context() {
        let mut model = SkipGram {
            target: ndarray::arr2(&[[1.0, 0.0], [0.0, 1.0]]),
            context: ndarray::arr2(&[[0.0, 0.5], [0.0, 0.0]]),
            scratch: Array1::zeros(2),
        };

        // dot = 0, sigmoid = 0.5, grad = (1 - 0.5) * 0.2 = 0.1
        let loss = model.train_pair(0, 0, true, 0.2);
        assert!((loss - std::f32::consts::LN_2).abs() < 1e-6);
        let close = |row: ndarray::ArrayView1<f32>, expected: [f32; 2]| {
            row.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-6)
        };
        assert!(close(model.context.row(0), [0.1, 0.5]));
        // Target moves along the old context row, not the updated one
        assert!(close(model.target.row(0), [1.0, 0.05]));
        // Untouched rows stay put
        assert_eq!(model.target.row(1).to_vec(), vec![0.0, 1.0]);
        assert_eq!(model.context.row(1).to_vec(), vec![0.0, 0.0]);

        // A negative pair pushes the two rows apart
        let before = model.target.row(1).dot(&model.context.row(0));
        model.train_pair(1, 0, false, 0.2);
        assert!(model.target.row(1).dot(&model.context.row(0)) < before);
    }

    #[test]
    fn test_learning_rate_decays_to_floor() {
        let config = Node2VecConfig::default();
        assert_eq!(decayed_learning_rate(&config, 0), config.learning_rate);
        let last = decayed_learning_rate(&config, config.epochs - 1);
        assert!(last < config.learning_rate);
        assert!(last >= config.min_learning_rate);
    }

    #[test]
    fn test_embedding_shape() {
        let graph = two_rings();
        let emb = embeddings(Node2VecLearner::new(small_config()).learn(&graph).unwrap());

        assert_eq!(emb.matrix.shape(), &[10, 8]);
        assert_eq!(emb.loss_history.len(), 30);
        assert!(emb.matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_ring_members_closer_than_strangers() {
        let graph = two_rings();
        let emb = embeddings(Node2VecLearner::new(small_config()).learn(&graph).unwrap());
        let sim = cosine_matrix(&emb.matrix);

        // Average within-ring vs cross-ring similarity for node 0
        let within: f32 = (1..5).map(|j| sim[[0, j]]).sum::<f32>() / 4.0;
        let across: f32 = (5..10).map(|j| sim[[0, j]]).sum::<f32>() / 5.0;
        assert!(within > across, "within {} <= across {}", within, across);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let graph = two_rings();
        let config = Node2VecConfig {
            walk_length: 3,
            context_size: 5,
            ..Default::default()
        };
        assert!(matches!(
            Node2VecLearner::new(config).learn(&graph),
            Err(LearnError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_walk_bias_rejected() {
        let graph = two_rings();
        for (p, q) in [(f64::INFINITY, 1.0), (1.0, f64::INFINITY), (f64::NAN, 1.0), (0.0, 1.0)] {
            let config = Node2VecConfig { p, q, ..small_config() };
            assert!(
                matches!(
                    Node2VecLearner::new(config).learn(&graph),
                    Err(LearnError::InvalidConfig(_))
                ),
                "p={} q={} accepted",
                p,
                q
            );
        }
    }
}
