use crate::results::OutputRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column order of the output file
pub const HEADER: [&str; 4] = ["category", "title", "summary", "url"];

/// Writes the header and every record. The header is written even when
/// there are no records.
pub fn write_records<W: Write>(writer: W, records: &[OutputRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Creates or truncates `path` and writes the records to it
pub fn write_csv(path: &Path, records: &[OutputRecord]) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_records(file, records)?;
    ::log::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
