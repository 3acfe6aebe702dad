//! Adam optimizer over ndarray parameters

use ndarray::{Array, Dimension, Zip};

/// First and second moment estimates for one parameter tensor
#[derive(Debug, Clone)]
pub struct Moments<D: Dimension> {
    m: Array<f32, D>,
    v: Array<f32, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f32, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }
}

/// Adam (Kingma & Ba, 2015) with bias correction
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    step: i32,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
        }
    }

    /// Advance the timestep. Call once per optimization step, before `update`.
    pub fn next_step(&mut self) {
        self.step += 1;
    }

    /// Apply one update to `param` given its gradient
    pub fn update<D: Dimension>(&self, param: &mut Array<f32, D>, grad: &Array<f32, D>, moments: &mut Moments<D>) {
        let t = self.step.max(1);
        let (b1, b2) = (self.beta1, self.beta2);
        let correction1 = 1.0 - b1.powi(t);
        let correction2 = 1.0 - b2.powi(t);
        let lr = self.learning_rate;
        let eps = self.epsilon;

        Zip::from(param)
            .and(grad)
            .and(&mut moments.m)
            .and(&mut moments.v)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / correction1;
                let v_hat = *v / correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
    }
}
