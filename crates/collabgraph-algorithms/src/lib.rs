pub mod common;
pub mod sampling;
pub mod similarity;
pub mod topology;
pub mod walk;

pub use common::{GraphView, NodeIdx};
pub use sampling::sample_negative_edges;
pub use similarity::{cosine_matrix, normalize_rows, top_k_per_row};
pub use topology::common_neighbor_count;
pub use walk::{generate_walks, RandomWalkConfig};
