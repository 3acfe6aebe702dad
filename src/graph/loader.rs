//! Graph loader
//!
//! Turns the artist and collaboration tables into a dense, undirected graph:
//! a node index over artist identifiers, symmetric directed index pairs,
//! a CSR adjacency view and a standardized feature matrix.

use super::artist::{Artist, Collaboration};
use super::features::standardized_features;
use super::types::{ArtistId, PairSet};
use collabgraph_algorithms::{GraphView, NodeIdx};
use indexmap::IndexSet;
use ndarray::Array2;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Bijection between artist identifiers and dense positions `0..N`
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    ids: IndexSet<ArtistId>,
}

impl NodeIndex {
    /// Index `ids` in iteration order; repeated identifiers keep their first position.
    pub fn build<'a>(ids: impl IntoIterator<Item = &'a ArtistId>) -> Self {
        Self {
            ids: ids.into_iter().cloned().collect(),
        }
    }

    pub fn index_of(&self, id: &ArtistId) -> Option<NodeIdx> {
        self.ids.get_index_of(id)
    }

    pub fn id_of(&self, idx: NodeIdx) -> Option<&ArtistId> {
        self.ids.get_index(idx)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Loader options
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Keep only artists referenced by at least one collaboration
    pub connected_only: bool,
}

/// The loaded collaboration graph
#[derive(Debug, Clone)]
pub struct CollabGraph {
    /// Node index the rest of the graph is aligned with
    pub index: NodeIndex,
    /// Artists in index order
    pub artists: Vec<Artist>,
    /// Directed index pairs, both directions of every collaboration
    pub edge_index: Vec<(NodeIdx, NodeIdx)>,
    /// CSR adjacency over the same edges
    pub view: GraphView,
    /// Standardized numeric features, one row per node
    pub features: Array2<f32>,
    /// Every known collaboration, by artist identifier
    pub existing: PairSet,
    /// Collaboration rows whose artists are not indexed
    pub dropped_edges: usize,
}

impl CollabGraph {
    /// Build the graph.
    ///
    /// Collaborations are deduplicated as unordered pairs. Rows that are
    /// self-pairs or reference an artist missing from the index are dropped
    /// without error, but still count as known collaborations.
    pub fn load(artists: Vec<Artist>, collaborations: &[Collaboration], options: LoadOptions) -> Self {
        let mut existing = PairSet::new();
        for collab in collaborations {
            existing.insert(&collab.artist_1, &collab.artist_2);
        }

        let artists = select_artists(artists, &existing, options);
        let index = NodeIndex::build(artists.iter().map(|a| &a.id));

        let mut edge_index = Vec::with_capacity(existing.len() * 2);
        let mut dropped_edges = 0;
        for pair in existing.iter() {
            match (index.index_of(pair.low()), index.index_of(pair.high())) {
                (Some(i), Some(j)) => {
                    edge_index.push((i, j));
                    edge_index.push((j, i));
                }
                _ => {
                    debug!("Dropping collaboration {} with unindexed artist", pair);
                    dropped_edges += 1;
                }
            }
        }
        // PairSet iteration order is unspecified; keep the edge list reproducible.
        edge_index.sort_unstable();

        let view = GraphView::from_edges(index.len(), &edge_index);
        let features = standardized_features(&artists);

        info!(
            "Graph loaded: {} nodes, {} directed edges ({} collaborations dropped)",
            index.len(),
            edge_index.len(),
            dropped_edges
        );

        CollabGraph {
            index,
            artists,
            edge_index,
            view,
            features,
            existing,
            dropped_edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn artist(&self, idx: NodeIdx) -> &Artist {
        &self.artists[idx]
    }

    /// Whether the artists at two indices already collaborated
    pub fn is_existing(&self, u: NodeIdx, v: NodeIdx) -> bool {
        self.existing.contains(&self.artists[u].id, &self.artists[v].id)
    }
}

fn select_artists(artists: Vec<Artist>, existing: &PairSet, options: LoadOptions) -> Vec<Artist> {
    let connected: Option<HashSet<&ArtistId>> = options
        .connected_only
        .then(|| existing.iter().flat_map(|p| [p.low(), p.high()]).collect());

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(artists.len());
    for artist in artists {
        if let Some(ref connected) = connected {
            if !connected.contains(&artist.id) {
                continue;
            }
        }
        if !seen.insert(artist.id.clone()) {
            warn!("Duplicate artist id {} in artist table, keeping first row", artist.id);
            continue;
        }
        selected.push(artist);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artists(ids: &[&str]) -> Vec<Artist> {
        ids.iter().map(|id| Artist::new(*id, id.to_uppercase())).collect()
    }

    #[test]
    fn test_node_index_bijection() {
        let ids: Vec<ArtistId> = vec!["x".into(), "y".into(), "x".into()];
        let index = NodeIndex::build(&ids);

        assert_eq!(index.len(), 2);
        assert_eq!(index.index_of(&"y".into()), Some(1));
        assert_eq!(index.id_of(0).map(|id| id.as_str()), Some("x"));
        assert_eq!(index.id_of(2), None);
    }

    #[test]
    fn test_load_symmetrizes_and_dedups() {
        let collabs = vec![
            Collaboration::new("a", "b"),
            Collaboration::new("b", "a"),
            Collaboration::new("b", "c"),
        ];
        let graph = CollabGraph::load(artists(&["a", "b", "c", "d"]), &collabs, LoadOptions::default());

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_index, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
        assert_eq!(graph.view.edge_count(), 2);
        assert_eq!(graph.features.nrows(), 4);
    }

    #[test]
    fn test_unknown_artists_dropped_silently() {
        let collabs = vec![Collaboration::new("a", "ghost"), Collaboration::new("a", "b")];
        let graph = CollabGraph::load(artists(&["a", "b"]), &collabs, LoadOptions::default());

        assert_eq!(graph.edge_index.len(), 2);
        assert_eq!(graph.dropped_edges, 1);
        // Still known, so never predicted
        assert!(graph.existing.contains(&"ghost".into(), &"a".into()));
    }

    #[test]
    fn test_self_collaboration_ignored() {
        let collabs = vec![Collaboration::new("a", "a")];
        let graph = CollabGraph::load(artists(&["a", "b"]), &collabs, LoadOptions::default());

        assert!(graph.edge_index.is_empty());
        assert!(graph.existing.is_empty());
    }

    #[test]
    fn test_connected_only_rebuilds_index() {
        let collabs = vec![Collaboration::new("c", "d")];
        let graph = CollabGraph::load(
            artists(&["a", "b", "c", "d"]),
            &collabs,
            LoadOptions { connected_only: true },
        );

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.index.index_of(&"c".into()), Some(0));
        assert_eq!(graph.index.index_of(&"a".into()), None);
        assert_eq!(graph.edge_index, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_empty_tables() {
        let graph = CollabGraph::load(Vec::new(), &[], LoadOptions::default());
        assert_eq!(graph.node_count(), 0);
        assert!(graph.edge_index.is_empty());
    }
}
