//! Prediction table writer and report reader

use super::{TableError, TableResult};
use crate::rank::{Prediction, PredictionKind};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

const EMBEDDING_HEADER: [&str; 3] = ["Artist 1", "Artist 2", "Score"];

const RULE_HEADER: [&str; 8] = [
    "Artist 1",
    "Artist 2",
    "Shared Neighbors",
    "Genre Overlap",
    "Popularity Diff",
    "Same Country",
    "Same City",
    "Score",
];

/// Write ranked predictions to a CSV file, creating parent directories as needed.
///
/// Rows are written in the order given.
pub fn write_predictions(
    path: impl AsRef<Path>,
    kind: PredictionKind,
    predictions: &[Prediction],
) -> TableResult<()> {
    let path = path.as_ref();
    let label = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TableError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let file = std::fs::File::create(path).map_err(|source| TableError::Io {
        path: label.clone(),
        source,
    })?;
    write_predictions_to(file, kind, predictions, &label)?;

    info!("Wrote {} predictions to {}", predictions.len(), label);
    Ok(())
}

/// Write ranked predictions to any writer; `target` names it in errors
pub fn write_predictions_to<W: Write>(
    writer: W,
    kind: PredictionKind,
    predictions: &[Prediction],
    target: &str,
) -> TableResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let err = |e| TableError::csv(target, e);

    match kind {
        PredictionKind::Embedding => csv_writer.write_record(EMBEDDING_HEADER).map_err(err)?,
        PredictionKind::Rule => csv_writer.write_record(RULE_HEADER).map_err(err)?,
    }

    for prediction in predictions {
        let record = match (kind, &prediction.rule) {
            (PredictionKind::Rule, Some(rule)) => vec![
                prediction.name_1.clone(),
                prediction.name_2.clone(),
                rule.shared_neighbors.to_string(),
                rule.genre_overlap.to_string(),
                format!("{:.2}", rule.popularity_diff),
                rule.same_country.to_string(),
                rule.same_city.to_string(),
                format!("{:.2}", prediction.score),
            ],
            (PredictionKind::Rule, None) => {
                return Err(TableError::InvalidRow {
                    path: target.to_string(),
                    line: 0,
                    message: format!(
                        "prediction {} x {} has no rule features",
                        prediction.name_1, prediction.name_2
                    ),
                })
            }
            (PredictionKind::Embedding, _) => vec![
                prediction.name_1.clone(),
                prediction.name_2.clone(),
                prediction.score.to_string(),
            ],
        };
        csv_writer.write_record(&record).map_err(err)?;
    }

    csv_writer.flush().map_err(|source| TableError::Io {
        path: target.to_string(),
        source,
    })?;
    Ok(())
}

/// A prediction table read back for display
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as header-keyed objects, for JSON output
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Read any prediction table written by [`write_predictions`]
pub fn read_report(path: impl AsRef<Path>) -> TableResult<Report> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: label.clone(),
        source,
    })?;
    read_report_from(file, &label)
}

pub(crate) fn read_report_from<R: Read>(reader: R, source: &str) -> TableResult<Report> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| TableError::csv(source, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| TableError::csv(source, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Report { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ArtistId;
    use crate::learn::RuleFeatures;

    fn prediction(a: &str, b: &str, score: f64, rule: Option<RuleFeatures>) -> Prediction {
        Prediction {
            artist_1: ArtistId::new(a),
            artist_2: ArtistId::new(b),
            name_1: a.to_uppercase(),
            name_2: b.to_uppercase(),
            score,
            rule,
        }
    }

    fn written(kind: PredictionKind, predictions: &[Prediction]) -> String {
        let mut buf = Vec::new();
        write_predictions_to(&mut buf, kind, predictions, "mem").unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_embedding_rows() {
        let out = written(PredictionKind::Embedding, &[prediction("a", "b", 0.5, None)]);
        assert_eq!(out, "Artist 1,Artist 2,Score\nA,B,0.5\n");
    }

    #[test]
    fn test_rule_rows_round_to_two_decimals() {
        let rule = RuleFeatures {
            shared_neighbors: 2,
            genre_overlap: 1,
            popularity_diff: 3.0,
            same_country: true,
            same_city: false,
        };
        let out = written(PredictionKind::Rule, &[prediction("a", "c", 2.98765, Some(rule))]);

        assert_eq!(
            out,
            "Artist 1,Artist 2,Shared Neighbors,Genre Overlap,Popularity Diff,Same Country,Same City,Score\n\
             A,C,2,1,3.00,true,false,2.99\n"
        );
    }

    #[test]
    fn test_empty_output_still_has_header() {
        let out = written(PredictionKind::Embedding, &[]);
        assert_eq!(out, "Artist 1,Artist 2,Score\n");
    }

    #[test]
    fn test_rule_kind_requires_features() {
        let mut buf = Vec::new();
        let result = write_predictions_to(
            &mut buf,
            PredictionKind::Rule,
            &[prediction("a", "b", 1.0, None)],
            "mem",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_report_round_trip() {
        let out = written(PredictionKind::Embedding, &[prediction("a", "b", 0.25, None)]);
        let report = read_report_from(out.as_bytes(), "mem").unwrap();

        assert_eq!(report.headers, vec!["Artist 1", "Artist 2", "Score"]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.to_json()[0]["Score"], "0.25");
    }
}
