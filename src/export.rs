use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::record::TimerRecord;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write records as CSV with the stored field names as header
pub fn write_csv<W: Write>(records: &[TimerRecord], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(records: &[TimerRecord], path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_csv(records, file)?;
    Ok(records.len())
}
