//! Delimited text export of projected rows.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::info;

use super::ShipmentRow;
use crate::error::{Result, ShipxError};

/// Header row of every export.
pub const HEADERS: [&str; 4] = ["Order Number", "Tracking Number", "Due Date", "Trade-In Devices"];

/// Write the header and one line per row.
///
/// Fields holding the delimiter, a quote or a line break are quoted. The
/// header is written even when there are no rows.
pub fn write_rows<W: Write>(writer: W, rows: &[ShipmentRow], delimiter: u8) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export rows to a file, replacing it.
pub fn export_csv(path: &Path, rows: &[ShipmentRow], delimiter: u8) -> Result<()> {
    let file = File::create(path)?;
    write_rows(file, rows, delimiter)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Rows as delimited text.
pub fn to_csv_string(rows: &[ShipmentRow], delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows, delimiter)?;
    String::from_utf8(buffer).map_err(|e| ShipxError::Config(format!("export is not UTF-8: {}", e)))
}

/// Parse exported text back into rows.
pub fn read_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<ShipmentRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADERS.iter().copied()) {
        return Err(ShipxError::Config(format!(
            "unexpected export header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    rdr.deserialize()
        .map(|record| record.map_err(ShipxError::from))
        .collect()
}
