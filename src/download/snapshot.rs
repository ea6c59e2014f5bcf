use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::client::decode_records;
use crate::error::IngestError;
use crate::parser::RawRecord;
use crate::ui::Ui;

pub const DEFAULT_SNAPSHOT_FILE: &str = "meteorites.json";

/// Save decoded records as pretty-printed JSON
pub fn write_snapshot(path: &Path, records: &[RawRecord]) -> Result<(), IngestError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records).map_err(IngestError::Encode)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a dataset saved by [`write_snapshot`], or any file holding the raw
/// response body
pub fn read_snapshot(path: &Path, ui: &mut impl Ui) -> Result<Vec<RawRecord>, IngestError> {
    let body = std::fs::read_to_string(path)?;
    decode_records(&body, ui)
}
