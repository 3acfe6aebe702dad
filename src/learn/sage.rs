//! GraphSAGE link-prediction learner
//!
//! Two mean-aggregation layers (Hamilton et al., 2017):
//!
//! ```text
//! h_i' = W_neigh * mean({h_j : j in N(i)}) + b + W_self * h_i
//! ```
//!
//! ReLU follows the first layer only. Training treats every known directed
//! edge as a positive pair and draws half as many non-edges as negatives each
//! epoch. Pair score is the dot product of the endpoint embeddings, loss is
//! binary cross-entropy with logits. There is no validation split or early
//! stopping; every epoch trains on the full edge set.

use super::optim::{Adam, Moments};
use super::{Embeddings, LearnError, LearnResult, Representation, RepresentationLearner};
use crate::graph::CollabGraph;
use collabgraph_algorithms::{sample_negative_edges, GraphView, NodeIdx};
use ndarray::{Array1, Array2, Axis, Zip};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Largest accepted `negative_ratio`
pub const MAX_NEGATIVE_RATIO: f64 = 10.0;

/// GraphSAGE hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SageConfig {
    pub hidden_dim: usize,
    pub output_dim: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    /// Negatives drawn per epoch, as a fraction of the directed positive count
    pub negative_ratio: f64,
    /// Log the loss every this many epochs (and at the last one)
    pub log_every: usize,
    pub seed: u64,
}

impl Default for SageConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 32,
            output_dim: 16,
            epochs: 100,
            learning_rate: 0.01,
            negative_ratio: 0.5,
            log_every: 10,
            seed: 42,
        }
    }
}

impl SageConfig {
    pub fn validate(&self) -> LearnResult<()> {
        if self.hidden_dim == 0 || self.output_dim == 0 {
            return Err(LearnError::InvalidConfig(
                "GraphSAGE dimensions must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(LearnError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=MAX_NEGATIVE_RATIO).contains(&self.negative_ratio) {
            return Err(LearnError::InvalidConfig(format!(
                "negative_ratio must be within [0, {}], got {}",
                MAX_NEGATIVE_RATIO, self.negative_ratio
            )));
        }
        Ok(())
    }
}

/// One mean-aggregation layer with its Adam moments
struct SageLayer {
    w_neigh: Array2<f32>,
    w_self: Array2<f32>,
    bias: Array1<f32>,
    m_neigh: Moments<ndarray::Ix2>,
    m_self: Moments<ndarray::Ix2>,
    m_bias: Moments<ndarray::Ix1>,
}

impl SageLayer {
    /// Glorot-uniform weights, zero bias
    fn new<R: Rng>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let w_neigh = Array2::from_shape_fn((in_dim, out_dim), |_| dist.sample(rng));
        let w_self = Array2::from_shape_fn((in_dim, out_dim), |_| dist.sample(rng));
        let bias = Array1::zeros(out_dim);

        Self {
            m_neigh: Moments::zeros_like(&w_neigh),
            m_self: Moments::zeros_like(&w_self),
            m_bias: Moments::zeros_like(&bias),
            w_neigh,
            w_self,
            bias,
        }
    }

    /// Returns the neighbor aggregate (kept for the backward pass) and the layer output
    fn forward(&self, view: &GraphView, x: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
        let agg = mean_aggregate(view, x);
        let out = agg.dot(&self.w_neigh) + x.dot(&self.w_self) + &self.bias;
        (agg, out)
    }

    /// Gradient of the loss with respect to the layer input
    fn input_grad(&self, view: &GraphView, grad_out: &Array2<f32>) -> Array2<f32> {
        let through_neighbors = mean_aggregate_transpose(view, &grad_out.dot(&self.w_neigh.t()));
        grad_out.dot(&self.w_self.t()) + through_neighbors
    }

    fn apply_gradients(&mut self, adam: &Adam, x: &Array2<f32>, agg: &Array2<f32>, grad_out: &Array2<f32>) {
        let g_neigh = agg.t().dot(grad_out);
        let g_self = x.t().dot(grad_out);
        let g_bias = grad_out.sum_axis(Axis(0));

        adam.update(&mut self.w_neigh, &g_neigh, &mut self.m_neigh);
        adam.update(&mut self.w_self, &g_self, &mut self.m_self);
        adam.update(&mut self.bias, &g_bias, &mut self.m_bias);
    }
}

/// Intermediate activations of one forward pass
struct Forward {
    agg1: Array2<f32>,
    pre1: Array2<f32>,
    h1: Array2<f32>,
    agg2: Array2<f32>,
    z: Array2<f32>,
}

struct SageModel {
    layer1: SageLayer,
    layer2: SageLayer,
}

impl SageModel {
    fn forward(&self, view: &GraphView, x: &Array2<f32>) -> Forward {
        let (agg1, pre1) = self.layer1.forward(view, x);
        let h1 = pre1.mapv(|v| v.max(0.0));
        let (agg2, z) = self.layer2.forward(view, &h1);
        Forward { agg1, pre1, h1, agg2, z }
    }

    fn backward(&mut self, adam: &Adam, view: &GraphView, x: &Array2<f32>, fwd: &Forward, grad_z: &Array2<f32>) {
        let mut grad_pre1 = self.layer2.input_grad(view, grad_z);
        Zip::from(&mut grad_pre1).and(&fwd.pre1).for_each(|g, &p| {
            if p <= 0.0 {
                *g = 0.0;
            }
        });

        self.layer2.apply_gradients(adam, &fwd.h1, &fwd.agg2, grad_z);
        self.layer1.apply_gradients(adam, x, &fwd.agg1, &grad_pre1);
    }
}

/// GraphSAGE representation learner
pub struct SageLearner {
    config: SageConfig,
}

impl SageLearner {
    pub fn new(config: SageConfig) -> Self {
        Self { config }
    }
}

impl RepresentationLearner for SageLearner {
    fn name(&self) -> &'static str {
        "sage"
    }

    fn learn(&mut self, graph: &CollabGraph) -> LearnResult<Representation> {
        let config = &self.config;
        config.validate()?;

        let x = &graph.features;
        let n = graph.node_count();
        if x.nrows() != n {
            return Err(LearnError::ShapeMismatch {
                expected: n,
                got: x.nrows(),
            });
        }
        if n == 0 {
            return Ok(Representation::Embeddings(Embeddings::new(
                Array2::zeros((0, config.output_dim)),
                Vec::new(),
            )));
        }

        let view = &graph.view;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut model = SageModel {
            layer1: SageLayer::new(x.ncols(), config.hidden_dim, &mut rng),
            layer2: SageLayer::new(config.hidden_dim, config.output_dim, &mut rng),
        };
        let mut adam = Adam::new(config.learning_rate);

        let positives = &graph.edge_index;
        let negative_count = (positives.len() as f64 * config.negative_ratio) as usize;
        info!(
            "Training GraphSAGE: {} nodes, {} positive pairs, {} negatives per epoch, {} epochs",
            n,
            positives.len(),
            negative_count,
            config.epochs
        );

        let mut loss_history = Vec::with_capacity(config.epochs);
        for epoch in 0..config.epochs {
            let fwd = model.forward(view, x);
            let negatives = sample_negative_edges(view, negative_count, &mut rng);
            let total = positives.len() + negatives.len();
            if total == 0 {
                debug!("No training pairs, skipping optimization");
                break;
            }

            let mut grad_z = Array2::<f32>::zeros(fwd.z.raw_dim());
            let mut loss = 0.0f64;
            for (pairs, label) in [(positives.as_slice(), 1.0f32), (negatives.as_slice(), 0.0f32)] {
                for &(u, v) in pairs {
                    let score = fwd.z.row(u).dot(&fwd.z.row(v));
                    loss += bce_with_logits(score, label) as f64;
                    let g = (sigmoid(score) - label) / total as f32;
                    accumulate_pair_grad(&mut grad_z, &fwd.z, u, v, g);
                }
            }
            let loss = (loss / total as f64) as f32;
            loss_history.push(loss);

            adam.next_step();
            model.backward(&adam, view, x, &fwd, &grad_z);

            if config.log_every > 0 && (epoch % config.log_every == 0 || epoch + 1 == config.epochs) {
                info!("Epoch {:3} | Loss: {:.4}", epoch, loss);
            }
        }

        let z = model.forward(view, x).z;
        Ok(Representation::Embeddings(Embeddings::new(z, loss_history)))
    }
}

fn accumulate_pair_grad(grad_z: &mut Array2<f32>, z: &Array2<f32>, u: NodeIdx, v: NodeIdx, g: f32) {
    grad_z.row_mut(u).scaled_add(g, &z.row(v));
    grad_z.row_mut(v).scaled_add(g, &z.row(u));
}

/// Row i becomes the mean of its neighbors' rows (zero for isolated nodes)
fn mean_aggregate(view: &GraphView, x: &Array2<f32>) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros(x.raw_dim());
    for i in 0..view.node_count {
        let neighbors = view.neighbors(i);
        if neighbors.is_empty() {
            continue;
        }
        let mut row = out.row_mut(i);
        for &j in neighbors {
            row += &x.row(j);
        }
        row /= neighbors.len() as f32;
    }
    out
}

/// Adjoint of [`mean_aggregate`]: row j collects `g_i / deg(i)` from every neighbor i
fn mean_aggregate_transpose(view: &GraphView, g: &Array2<f32>) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros(g.raw_dim());
    for j in 0..view.node_count {
        let mut row = out.row_mut(j);
        for &i in view.neighbors(j) {
            row.scaled_add(1.0 / view.degree(i) as f32, &g.row(i));
        }
    }
    out
}

fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn bce_with_logits(logit: f32, label: f32) -> f32 {
    logit.max(0.0) - logit * label + (-logit.abs()).exp().ln_1p()
}
