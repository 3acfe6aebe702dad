//! Graph topology analysis algorithms
//!
//! Neighborhood overlap measures used by rule-based link prediction.

use super::common::{GraphView, NodeIdx};

/// Count of distinct nodes adjacent to both `u` and `v`.
///
/// Both neighbor lists are sorted, so this is a linear merge.
pub fn common_neighbor_count(view: &GraphView, u: NodeIdx, v: NodeIdx) -> usize {
    let a = view.neighbors(u);
    let b = view.neighbors(v);
    let (mut i, mut j) = (0, 0);
    let mut count = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }

    count
}
