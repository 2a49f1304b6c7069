//! JSON-lines gazetteer files: one serialized [`CandidateRecord`] per line.
//!
//! Blank lines and lines starting with `#` are skipped. Missing fields take their
//! defaults, so a minimal line is
//! `{"place_type": "city", "name": "Springfield", "latitude": 39.8, "longitude": -89.64}`.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use locus::CandidateRecord;
use tracing::{info, instrument};

use crate::error::{IndexError, Result};

/// Parse every record from `reader`.
pub fn read_gazetteer(reader: impl BufRead) -> Result<Vec<CandidateRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| IndexError::Gazetteer {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[instrument(name = "Load gazetteer", level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_gazetteer(path: impl AsRef<Path>) -> Result<Vec<CandidateRecord>> {
    let records = read_gazetteer(BufReader::new(File::open(path.as_ref())?))?;
    info!(records = records.len(), "Gazetteer loaded");
    Ok(records)
}

/// Write `records` one per line.
pub fn write_gazetteer<'r>(
    writer: impl Write,
    records: impl IntoIterator<Item = &'r CandidateRecord>,
) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
