//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of an undirected graph topology for
//! algorithm execution.

/// Dense node index (0..N)
pub type NodeIdx = usize;

/// A dense, integer-indexed view of an undirected graph using Compressed Sparse Row (CSR) format.
///
/// Every undirected edge is stored in both endpoint rows. Neighbor lists are
/// sorted and free of duplicates, so membership tests are binary searches.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices
    pub targets: Vec<NodeIdx>,
}

impl GraphView {
    /// Build a view from directed index pairs.
    ///
    /// Each pair is inserted in both directions; self-loops and pairs that
    /// reference an index outside `0..node_count` are ignored.
    pub fn from_edges(node_count: usize, edges: &[(NodeIdx, NodeIdx)]) -> Self {
        let mut adjacency: Vec<Vec<NodeIdx>> = vec![Vec::new(); node_count];
        for &(u, v) in edges {
            if u == v || u >= node_count || v >= node_count {
                continue;
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        Self::from_adjacency_list(adjacency)
    }

    /// Helper to create a GraphView from adjacency lists
    pub fn from_adjacency_list(adjacency: Vec<Vec<NodeIdx>>) -> Self {
        let node_count = adjacency.len();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();

        offsets.push(0);
        for mut neighbors in adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
            targets.extend(neighbors);
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            offsets,
            targets,
        }
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: NodeIdx) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get the sorted neighbors of a node
    pub fn neighbors(&self, idx: NodeIdx) -> &[NodeIdx] {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.targets[start..end]
    }

    /// Whether an undirected edge connects `u` and `v`
    pub fn has_edge(&self, u: NodeIdx, v: NodeIdx) -> bool {
        if u >= self.node_count || v >= self.node_count {
            return false;
        }
        self.neighbors(u).binary_search(&v).is_ok()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// All edges as directed pairs, both directions included.
    pub fn directed_edges(&self) -> Vec<(NodeIdx, NodeIdx)> {
        let mut edges = Vec::with_capacity(self.targets.len());
        for u in 0..self.node_count {
            for &v in self.neighbors(u) {
                edges.push((u, v));
            }
        }
        edges
    }
}
