use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;

use crate::error::SessionError;

/// Reads exactly `expected` sample rows from a headerless CSV, taking the
/// first field of each row as a base-10 integer. Rows beyond `expected` are
/// ignored; a missing file, short table, or non-numeric value is fatal.
pub fn read_samples(path: &Path, expected: usize) -> Result<Vec<i16>, SessionError> {
    let malformed = |reason: String| SessionError::MalformedInput {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|e| malformed(e.to_string()))?;
    let reader = BufReader::new(file);

    let mut samples = Vec::with_capacity(expected);
    let mut total_rows = 0usize;
    for (index, line) in reader.lines().enumerate() {
        total_rows += 1;
        if samples.len() == expected {
            continue; // keep counting so the warning below is accurate
        }
        let line = line.map_err(|e| malformed(format!("row {}: {e}", index + 1)))?;
        let field = line.split(',').next().unwrap_or("").trim();
        let value: i16 = field.parse().map_err(|_| {
            malformed(format!("row {}: {field:?} is not a 16-bit integer", index + 1))
        })?;
        samples.push(value);
    }
    if samples.len() < expected {
        return Err(malformed(format!(
            "expected {expected} rows, found {}",
            samples.len()
        )));
    }
    if total_rows > expected {
        warn!(
            "{}: ignoring {} extra rows past the first {expected}",
            path.display(),
            total_rows - expected
        );
    }
    Ok(samples)
}

/// Writes one magnitude per row, truncating any existing file at `path`.
pub fn write_magnitudes(path: &Path, magnitudes: &[i16]) -> Result<(), SessionError> {
    let io_err = |source: std::io::Error| SessionError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for magnitude in magnitudes {
        writeln!(writer, "{magnitude}").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}
