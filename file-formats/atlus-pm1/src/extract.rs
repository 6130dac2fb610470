//! Read path: pulling a section's raw bytes out of a container

use crate::section::SectionTable;
use crate::Result;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Read the raw bytes of the single section carrying `kind` from a stream
///
/// Returns `Ok(None)` when no section matches, which is distinct from a
/// present section with a zero-length payload (`Ok(Some(vec![]))`). The
/// recorded byte range is checked against the stream length before reading.
pub fn read_section<R: Read + Seek>(reader: &mut R, kind: i32) -> Result<Option<Vec<u8>>> {
    let table = SectionTable::read(reader)?;
    let Some(located) = table.locate(kind)? else {
        return Ok(None);
    };

    let entry = located.entry;
    let file_len = reader.seek(SeekFrom::End(0))?;
    entry.payload_end(file_len)?;

    reader.seek(SeekFrom::Start(entry.offset as u64))?;
    let mut data = vec![0u8; entry.size as usize];
    reader.read_exact(&mut data)?;

    debug!(
        "extracted {} bytes of section type {kind} from offset {}",
        entry.size, entry.offset
    );
    Ok(Some(data))
}

/// Read the raw bytes of the single section carrying `kind` from a file
///
/// The file handle is opened, used, and closed within this call.
pub fn extract_section<P: AsRef<Path>>(path: P, kind: i32) -> Result<Option<Vec<u8>>> {
    let mut reader = BufReader::new(File::open(path)?);
    read_section(&mut reader, kind)
}
