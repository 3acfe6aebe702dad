//! Artist and collaboration table readers

use super::{TableError, TableResult};
use crate::graph::{Artist, ArtistId, Collaboration};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One row of the artist table.
///
/// Only `id` is required. Absent columns, empty cells and unparsable numbers
/// all read as missing.
#[derive(Debug, Deserialize)]
struct ArtistRow {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    followers: Option<f64>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    num_albums: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    debut_year: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    last_active_year: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    active_years: Option<f64>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default, alias = "locality")]
    begin_area: Option<String>,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist {
            id: ArtistId::new(row.id),
            name: row.name,
            followers: row.followers,
            popularity: row.popularity,
            num_albums: row.num_albums,
            debut_year: row.debut_year,
            last_active_year: row.last_active_year,
            active_years: row.active_years,
            genres: row.genres.as_deref().map(Artist::parse_genres).unwrap_or_default(),
            country: row.country.filter(|c| !c.is_empty()),
            locality: row.begin_area.filter(|c| !c.is_empty()),
        }
    }
}

/// One row of the collaboration table (also accepts the ingest header names)
#[derive(Debug, Deserialize)]
struct CollaborationRow {
    #[serde(alias = "artist_id")]
    artist_1: String,
    #[serde(alias = "collaboration_id")]
    artist_2: String,
}

/// Read the artist table from a CSV file
pub fn read_artists(path: impl AsRef<Path>) -> TableResult<Vec<Artist>> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let reader = csv_reader_from_path(path)?;
    read_artist_rows(reader, &label)
}

/// Read the artist table from any reader; `source` names it in errors
pub fn read_artists_from<R: Read>(reader: R, source: &str) -> TableResult<Vec<Artist>> {
    read_artist_rows(csv_reader(reader), source)
}

/// Read the collaboration table from a CSV file
pub fn read_collaborations(path: impl AsRef<Path>) -> TableResult<Vec<Collaboration>> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let reader = csv_reader_from_path(path)?;
    read_collaboration_rows(reader, &label)
}

/// Read the collaboration table from any reader; `source` names it in errors
pub fn read_collaborations_from<R: Read>(reader: R, source: &str) -> TableResult<Vec<Collaboration>> {
    read_collaboration_rows(csv_reader(reader), source)
}

fn read_artist_rows<R: Read>(reader: csv::Reader<R>, source: &str) -> TableResult<Vec<Artist>> {
    let artists: Vec<Artist> = read_rows::<R, ArtistRow>(reader, source, |row| {
        if row.id.is_empty() {
            Err("empty artist id".to_string())
        } else {
            Ok(())
        }
    })?
    .into_iter()
    .map(Artist::from)
    .collect();

    info!("Read {} artists from {}", artists.len(), source);
    Ok(artists)
}

fn read_collaboration_rows<R: Read>(reader: csv::Reader<R>, source: &str) -> TableResult<Vec<Collaboration>> {
    let collaborations: Vec<Collaboration> = read_rows::<R, CollaborationRow>(reader, source, |row| {
        if row.artist_1.is_empty() || row.artist_2.is_empty() {
            Err("empty artist id in collaboration".to_string())
        } else {
            Ok(())
        }
    })?
    .into_iter()
    .map(|row| Collaboration::new(row.artist_1, row.artist_2))
    .collect();

    info!("Read {} collaborations from {}", collaborations.len(), source);
    Ok(collaborations)
}

fn read_rows<R, T>(
    mut reader: csv::Reader<R>,
    source: &str,
    validate: impl Fn(&T) -> Result<(), String>,
) -> TableResult<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let headers = reader
        .headers()
        .map_err(|e| TableError::csv(source, e))?
        .clone();
    debug!("{} columns: {:?}", source, headers);

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| TableError::csv(source, e))?
    {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| TableError::csv(source, e))?;
        validate(&row).map_err(|message| TableError::InvalidRow {
            path: source.to_string(),
            line,
            message,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn csv_reader_from_path(path: &Path) -> TableResult<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(csv_reader(file))
}
