//! Core type definitions for the collaboration graph

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an artist (the music service's catalog id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ArtistId(String);

impl ArtistId {
    pub fn new(id: impl Into<String>) -> Self {
        ArtistId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArtistId {
    fn from(s: String) -> Self {
        ArtistId(s)
    }
}

impl From<&str> for ArtistId {
    fn from(s: &str) -> Self {
        ArtistId(s.to_string())
    }
}

/// An unordered artist pair, stored with the smaller identifier first.
///
/// `(a, b)` and `(b, a)` normalize to the same key. Self-pairs cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: ArtistId,
    high: ArtistId,
}

impl PairKey {
    /// Normalize a pair. Returns `None` when both sides are the same artist.
    pub fn new(a: ArtistId, b: ArtistId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(PairKey { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(PairKey { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> &ArtistId {
        &self.low
    }

    pub fn high(&self) -> &ArtistId {
        &self.high
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

/// Set of known collaborations keyed on the normalized pair
#[derive(Debug, Clone, Default)]
pub struct PairSet {
    pairs: FxHashSet<PairKey>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair; returns false for self-pairs and pairs already present.
    pub fn insert(&mut self, a: &ArtistId, b: &ArtistId) -> bool {
        match PairKey::new(a.clone(), b.clone()) {
            Some(key) => self.pairs.insert(key),
            None => false,
        }
    }

    pub fn contains(&self, a: &ArtistId, b: &ArtistId) -> bool {
        match PairKey::new(a.clone(), b.clone()) {
            Some(key) => self.pairs.contains(&key),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairKey> {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_id() {
        let id = ArtistId::new("4Z8W4fKeB5YxbusRsdQVPb");
        assert_eq!(id.as_str(), "4Z8W4fKeB5YxbusRsdQVPb");
        assert_eq!(format!("{}", id), "4Z8W4fKeB5YxbusRsdQVPb");
    }

    #[test]
    fn test_pair_key_is_unordered() {
        let ab = PairKey::new("a".into(), "b".into()).unwrap();
        let ba = PairKey::new("b".into(), "a".into()).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low().as_str(), "a");
        assert_eq!(ab.high().as_str(), "b");
    }

    #[test]
    fn test_pair_key_rejects_self_pair() {
        assert!(PairKey::new("a".into(), "a".into()).is_none());
    }

    #[test]
    fn test_pair_set_dedup() {
        let mut set = PairSet::new();
        let a = ArtistId::new("a");
        let b = ArtistId::new("b");

        assert!(set.insert(&a, &b));
        assert!(!set.insert(&b, &a));
        assert!(!set.insert(&a, &a));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&b, &a));
        assert!(!set.contains(&a, &a));
    }
}
