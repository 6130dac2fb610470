//! Write path: replacing a section's payload in place or by relocation

use crate::section::{LocatedSection, SectionTable, OFFSET_FIELD_OFFSET, SIZE_FIELD_OFFSET};
use crate::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use log::{info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::Path;

/// Alignment boundary for relocated payloads
pub const SECTION_ALIGNMENT: u64 = 16;

/// Outcome of a successful injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// The new payload fit inside the old section footprint
    InPlace {
        /// Payload offset, unchanged from the original entry
        offset: u64,
        /// New payload length
        len: usize,
    },
    /// The new payload was appended to aligned space at the end of the file
    Relocated {
        /// Offset of the now-orphaned old payload
        old_offset: u64,
        /// Aligned offset of the appended payload
        new_offset: u64,
        /// New payload length
        len: usize,
    },
}

/// Round `value` up to the next multiple of `alignment`
fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

fn write_zeros<W: Write>(writer: &mut W, len: u64) -> Result<()> {
    const ZEROS: [u8; 64] = [0u8; 64];
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(ZEROS.len() as u64) as usize;
        writer.write_all(&ZEROS[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Patch a located section with a new payload on an open stream
///
/// The entry's `size` field is rewritten first in both strategies. A payload
/// no larger than the old one is written over the old bytes and the tail of
/// the old footprint is zero-filled; the `offset` field is left alone. A
/// larger payload is appended at the next 16-byte boundary past the current
/// end of the stream, with the alignment gap zero-filled and the `offset`
/// field rewritten. The old payload bytes are orphaned, not reclaimed.
pub fn write_section<W: Write + Seek>(
    writer: &mut W,
    located: &LocatedSection,
    data: &[u8],
) -> Result<Injection> {
    let entry = located.entry;
    if entry.size < 0 || entry.offset < 0 {
        return Err(Error::invalid_format(format!(
            "negative section bounds for type tag {}: offset {}, size {}",
            entry.kind, entry.offset, entry.size
        )));
    }
    let new_len = i32::try_from(data.len())
        .map_err(|_| Error::OversizedPayload { len: data.len() })?;

    writer.seek(SeekFrom::Start(located.table_offset + SIZE_FIELD_OFFSET))?;
    writer.write_i32::<LittleEndian>(new_len)?;

    if new_len <= entry.size {
        writer.seek(SeekFrom::Start(entry.offset as u64))?;
        writer.write_all(data)?;
        write_zeros(writer, (entry.size - new_len) as u64)?;

        info!(
            "overwrote section type {} in place at offset {} ({} -> {new_len} bytes)",
            entry.kind, entry.offset, entry.size
        );
        Ok(Injection::InPlace {
            offset: entry.offset as u64,
            len: data.len(),
        })
    } else {
        let file_len = writer.seek(SeekFrom::End(0))?;
        let new_offset = align_up(file_len, SECTION_ALIGNMENT);
        let new_offset_field = i32::try_from(new_offset).map_err(|_| {
            Error::invalid_format(format!(
                "relocated payload offset {new_offset:#x} does not fit the section table"
            ))
        })?;

        writer.seek(SeekFrom::Start(located.table_offset + OFFSET_FIELD_OFFSET))?;
        writer.write_i32::<LittleEndian>(new_offset_field)?;

        writer.seek(SeekFrom::Start(file_len))?;
        write_zeros(writer, new_offset - file_len)?;
        writer.write_all(data)?;

        info!(
            "relocated section type {} from offset {} to {new_offset} ({} -> {new_len} bytes)",
            entry.kind, entry.offset, entry.size
        );
        warn!(
            "{} orphaned bytes remain at offset {}",
            entry.size, entry.offset
        );
        Ok(Injection::Relocated {
            old_offset: entry.offset as u64,
            new_offset,
            len: data.len(),
        })
    }
}

/// Replace the payload of the single section carrying `kind`, writing the
/// patched container to `out_path`
///
/// The read pass opens `path`, captures the entry and its table record
/// offset, and closes before any write happens. When `out_path` differs from
/// `path`, the output first becomes a byte-for-byte copy of the input and the
/// patch is applied to the copy, leaving the input untouched. A missing
/// section aborts with [`Error::SectionNotFound`] and writes nothing.
pub fn inject_section_to<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    out_path: Q,
    kind: i32,
    data: &[u8],
) -> Result<Injection> {
    let path = path.as_ref();
    let out_path = out_path.as_ref();

    // Read pass: handle closes at the end of this block, before the write
    // pass opens one on the same path.
    let located = {
        let mut reader = BufReader::new(File::open(path)?);
        let table = SectionTable::read(&mut reader)?;
        table
            .locate(kind)?
            .ok_or(Error::SectionNotFound { kind })?
    };

    // An aliased spelling of the input (`..` segments, symlinks) must not
    // take the copy branch: fs::copy truncates its destination before
    // reading, which would empty the container. Canonicalization fails for
    // an output that does not exist yet, which is necessarily a distinct
    // file.
    let same_file = path == out_path
        || matches!(
            (fs::canonicalize(path), fs::canonicalize(out_path)),
            (Ok(input), Ok(output)) if input == output
        );
    if !same_file {
        fs::copy(path, out_path)?;
    }

    let mut file = OpenOptions::new().read(true).write(true).open(out_path)?;
    write_section(&mut file, &located, data)
}

/// Replace the payload of the single section carrying `kind` in place
///
/// Patches the same file the table was read from. A failure mid-write can
/// leave the container partially patched; callers that need the original
/// intact on failure should use [`inject_section_to`] with a separate output
/// path and rename over the original on success.
pub fn inject_section<P: AsRef<Path>>(path: P, kind: i32, data: &[u8]) -> Result<Injection> {
    let path = path.as_ref();
    inject_section_to(path, path, kind, data)
}
