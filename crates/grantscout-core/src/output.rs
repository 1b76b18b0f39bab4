use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::models::GrantBatch;

/// Destination name meaning standard output.
pub const STDOUT_DESTINATION: &str = "-";

/// Write `batch` as newline-delimited JSON, one record per line.
///
/// Returns the number of records written. Lines are written in batch order,
/// so a failure part-way leaves the lines already written valid.
pub fn write_jsonl<W: Write>(batch: &GrantBatch, writer: W) -> Result<usize, AppError> {
    let mut writer = BufWriter::new(writer);
    let mut written = 0;
    for record in batch.records() {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Open the output destination, creating or truncating a file, or standard
/// output for [`STDOUT_DESTINATION`].
pub fn open_destination(destination: &str) -> Result<Box<dyn Write + Send>, AppError> {
    if destination == STDOUT_DESTINATION {
        return Ok(Box::new(io::stdout()));
    }
    let file = File::create(Path::new(destination))?;
    Ok(Box::new(file))
}
