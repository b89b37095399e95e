//! Tabular record input.
//!
//! Records are the unit of work for acquisition and the index space of the
//! aligned dataset. This module reads them from CSV files with a header row.
//! Columns are matched by name, so extra columns are ignored:
//!
//! | field      | accepted headers                 |
//! |------------|----------------------------------|
//! | identifier | `id`, `identifier`               |
//! | latitude   | `lat`, `latitude`                |
//! | longitude  | `long`, `lon`, `longitude`       |

mod types;

pub use types::{Record, RecordError, RecordId};

use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "identifier")]
    id: String,
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    long: f64,
}

/// Reads records from a CSV file.
pub fn read_csv(path: &Path) -> Result<Vec<Record>, RecordError> {
    let file = File::open(path).map_err(|source| RecordError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    from_reader(file)
}

/// Reads records from any CSV source, preserving row order.
///
/// Identifiers are trimmed and must be unique.
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Record>, RecordError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let malformed = |line: u64, e: csv::Error| RecordError::Malformed {
        line,
        message: e.to_string(),
    };

    let headers = csv_reader.headers().map_err(|e| malformed(1, e))?.clone();
    let mut row = csv::StringRecord::new();
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    loop {
        let line = csv_reader.position().line();
        match csv_reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(malformed(line, e)),
        }
        let line = row.position().map(|p| p.line()).unwrap_or(line);
        let parsed: CsvRow = row
            .deserialize(Some(&headers))
            .map_err(|e| malformed(line, e))?;

        let id = RecordId::new(parsed.id);
        if !seen.insert(id.clone()) {
            return Err(RecordError::DuplicateId { id, line });
        }

        records.push(Record {
            id,
            latitude: parsed.lat,
            longitude: parsed.long,
        });
    }

    Ok(records)
}
