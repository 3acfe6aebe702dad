//! Node feature matrix construction

use super::artist::{Artist, FEATURE_COUNT};
use ndarray::Array2;

/// Build the `(N, FEATURE_COUNT)` feature matrix for `artists`, column-wise standardized.
///
/// Missing values are imputed to zero before standardization. Standard
/// deviation uses the sample estimator (n - 1). Columns whose deviation is
/// zero or undefined are emitted as all zeros.
pub fn standardized_features(artists: &[Artist]) -> Array2<f32> {
    let n = artists.len();
    let mut raw = Array2::<f64>::zeros((n, FEATURE_COUNT));
    for (i, artist) in artists.iter().enumerate() {
        for (j, value) in artist.numeric_features().into_iter().enumerate() {
            raw[[i, j]] = value;
        }
    }

    let mut features = Array2::<f32>::zeros((n, FEATURE_COUNT));
    if n < 2 {
        return features;
    }

    for j in 0..FEATURE_COUNT {
        let column = raw.column(j);
        let mean = column.sum() / n as f64;
        let variance = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = variance.sqrt();
        if !std.is_finite() || std <= f64::EPSILON {
            continue;
        }
        for i in 0..n {
            features[[i, j]] = ((raw[[i, j]] - mean) / std) as f32;
        }
    }

    features
}
