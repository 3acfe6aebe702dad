//! Collaboration graph model
//!
//! This module implements the data model the predictors work on:
//! - Artists with numeric and categorical attributes
//! - Collaborations as unordered, deduplicated artist pairs
//! - A dense node index and symmetric adjacency built by the loader

pub mod artist;
pub mod features;
pub mod loader;
pub mod types;

// Re-export main types
pub use artist::{Artist, Collaboration, FEATURE_COLUMNS, FEATURE_COUNT};
pub use features::standardized_features;
pub use loader::{CollabGraph, LoadOptions, NodeIndex};
pub use types::{ArtistId, PairKey, PairSet};
