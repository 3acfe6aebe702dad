//! Artist and collaboration records
//!
//! Artists are created by ingestion and are immutable for the rest of a run.

use super::types::ArtistId;
use serde::{Deserialize, Serialize};

/// Number of numeric attribute columns
pub const FEATURE_COUNT: usize = 6;

/// Numeric attribute columns, in feature-matrix order
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "followers",
    "popularity",
    "num_albums",
    "debut_year",
    "last_active_year",
    "active_years",
];

/// An artist node with its catalog attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub followers: Option<f64>,
    pub popularity: Option<f64>,
    pub num_albums: Option<f64>,
    pub debut_year: Option<f64>,
    pub last_active_year: Option<f64>,
    pub active_years: Option<f64>,
    /// Normalized genre tokens (trimmed, lowercase, no empties)
    pub genres: Vec<String>,
    pub country: Option<String>,
    /// City or region the artist started in
    pub locality: Option<String>,
}

impl Artist {
    /// Create an artist with no attributes besides its name
    pub fn new(id: impl Into<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            followers: None,
            popularity: None,
            num_albums: None,
            debut_year: None,
            last_active_year: None,
            active_years: None,
            genres: Vec::new(),
            country: None,
            locality: None,
        }
    }

    /// Split a comma-joined genre string into normalized tokens.
    pub fn parse_genres(raw: &str) -> Vec<String> {
        let mut genres: Vec<String> = Vec::new();
        for token in raw.split(',').map(|g| g.trim().to_lowercase()) {
            if !token.is_empty() && !genres.contains(&token) {
                genres.push(token);
            }
        }
        genres
    }

    /// Numeric attributes in `FEATURE_COLUMNS` order, missing values imputed to zero
    pub fn numeric_features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.followers,
            self.popularity,
            self.num_albums,
            self.debut_year,
            self.last_active_year,
            self.active_years,
        ]
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
    }

    /// Number of genre tokens both artists carry
    pub fn shared_genres(&self, other: &Artist) -> usize {
        self.genres.iter().filter(|g| other.genres.contains(g)).count()
    }

    /// Absolute popularity difference, missing popularity read as zero
    pub fn popularity_diff(&self, other: &Artist) -> f64 {
        (self.popularity.unwrap_or(0.0) - other.popularity.unwrap_or(0.0)).abs()
    }

    pub fn same_country(&self, other: &Artist) -> bool {
        same_place(self.country.as_deref(), other.country.as_deref())
    }

    pub fn same_locality(&self, other: &Artist) -> bool {
        same_place(self.locality.as_deref(), other.locality.as_deref())
    }
}

fn same_place(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(str::trim), b.map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// A known collaboration between two artists (undirected)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub artist_1: ArtistId,
    pub artist_2: ArtistId,
}

impl Collaboration {
    pub fn new(a: impl Into<ArtistId>, b: impl Into<ArtistId>) -> Self {
        Self {
            artist_1: a.into(),
            artist_2: b.into(),
        }
    }
}
