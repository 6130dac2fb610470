//! PM1 section table structures and parsing

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Read, Seek, SeekFrom, Write};

/// File offset of the section count field in the container header
pub const SECTION_COUNT_OFFSET: u64 = 0x10;

/// File offset at which the section table begins
pub const SECTION_TABLE_OFFSET: u64 = 0x20;

/// Size of one section table entry in bytes
pub const SECTION_ENTRY_SIZE: u64 = 16;

/// Type tag of the embedded message script section
pub const MESSAGE_SCRIPT_KIND: i32 = 6;

/// Byte offset of the `size` field within an entry record
pub(crate) const SIZE_FIELD_OFFSET: u64 = 4;

/// Byte offset of the `offset` field within an entry record
pub(crate) const OFFSET_FIELD_OFFSET: u64 = 12;

/// One 16-byte section table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    /// Section kind tag
    pub kind: i32,
    /// Byte length of the section's payload
    pub size: i32,
    /// Number of logical items packed in the payload
    pub count: i32,
    /// Absolute byte offset of the payload within the file
    pub offset: i32,
}

impl SectionEntry {
    /// Read one entry record from the current stream position
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            kind: reader.read_i32::<LittleEndian>()?,
            size: reader.read_i32::<LittleEndian>()?,
            count: reader.read_i32::<LittleEndian>()?,
            offset: reader.read_i32::<LittleEndian>()?,
        })
    }

    /// Write one entry record at the current stream position
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.kind)?;
        writer.write_i32::<LittleEndian>(self.size)?;
        writer.write_i32::<LittleEndian>(self.count)?;
        writer.write_i32::<LittleEndian>(self.offset)?;
        Ok(())
    }

    /// Exclusive end offset of the payload, or an error for negative fields
    pub(crate) fn payload_end(&self, file_len: u64) -> Result<u64> {
        if self.size < 0 || self.offset < 0 {
            return Err(Error::invalid_format(format!(
                "negative section bounds for type tag {}: offset {}, size {}",
                self.kind, self.offset, self.size
            )));
        }
        let end = self.offset as u64 + self.size as u64;
        if end > file_len {
            return Err(Error::SectionOutOfBounds {
                kind: self.kind,
                offset: self.offset,
                size: self.size,
                file_len,
            });
        }
        Ok(end)
    }
}

/// A section entry paired with the absolute file offset of its table record
///
/// The table offset is what the injector patches, so it travels with the
/// entry instead of being recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedSection {
    /// The parsed entry
    pub entry: SectionEntry,
    /// Absolute file offset of the entry's 16-byte record
    pub table_offset: u64,
}

/// Parsed section table of a PM1 container
#[derive(Debug, Clone)]
pub struct SectionTable {
    entries: Vec<(SectionEntry, u64)>,
}

impl SectionTable {
    /// Read the section table from a container stream
    ///
    /// Seeks to the header's section count, then reads the contiguous entry
    /// records starting at 0x20. Field values are not validated here; a
    /// truncated table surfaces as an I/O error.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(SECTION_COUNT_OFFSET))?;
        let section_count = reader.read_u32::<LittleEndian>()?;

        reader.seek(SeekFrom::Start(SECTION_TABLE_OFFSET))?;
        let mut entries = Vec::new();
        for index in 0..section_count {
            let table_offset = SECTION_TABLE_OFFSET + u64::from(index) * SECTION_ENTRY_SIZE;
            let entry = SectionEntry::read(reader)?;
            entries.push((entry, table_offset));
        }

        debug!("parsed {section_count} section table entries");
        Ok(Self { entries })
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order, each paired with its table record offset
    pub fn entries(&self) -> &[(SectionEntry, u64)] {
        &self.entries
    }

    /// Find the single entry carrying the given type tag
    ///
    /// Returns `Ok(None)` when no entry matches. A second matching entry or
    /// a matching entry whose item count is not exactly 1 is a structural
    /// violation and is reported as an error; the whole table is scanned
    /// before deciding.
    pub fn locate(&self, kind: i32) -> Result<Option<LocatedSection>> {
        let mut matches = self.entries.iter().filter(|(entry, _)| entry.kind == kind);

        let Some(&(entry, table_offset)) = matches.next() else {
            return Ok(None);
        };

        let extra = matches.count();
        if extra > 0 {
            return Err(Error::DuplicateSection {
                kind,
                found: extra + 1,
            });
        }
        if entry.count != 1 {
            return Err(Error::UnexpectedItemCount {
                kind,
                count: entry.count,
            });
        }

        debug!(
            "located section type {kind} at payload offset {}, table record at {table_offset:#x}",
            entry.offset
        );
        Ok(Some(LocatedSection {
            entry,
            table_offset,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table_bytes(entries: &[SectionEntry]) -> Vec<u8> {
        let mut data = vec![0u8; SECTION_TABLE_OFFSET as usize];
        data[SECTION_COUNT_OFFSET as usize..SECTION_COUNT_OFFSET as usize + 4]
            .copy_from_slice(&(entries.len() as u32).to_le_bytes());
        for entry in entries {
            entry.write(&mut data).unwrap();
        }
        data
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = SectionEntry {
            kind: 6,
            size: 8,
            count: 1,
            offset: 64,
        };
        let mut buf = Vec::new();
        entry.write(&mut buf).unwrap();
        assert_eq!(buf.len(), SECTION_ENTRY_SIZE as usize);

        let parsed = SectionEntry::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_read_table() {
        let entries = [
            SectionEntry {
                kind: 1,
                size: 16,
                count: 4,
                offset: 48,
            },
            SectionEntry {
                kind: 6,
                size: 8,
                count: 1,
                offset: 64,
            },
        ];
        let table = SectionTable::read(&mut Cursor::new(table_bytes(&entries))).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].0, entries[0]);
        assert_eq!(table.entries()[0].1, 0x20);
        assert_eq!(table.entries()[1].0, entries[1]);
        assert_eq!(table.entries()[1].1, 0x30);
    }

    #[test]
    fn test_read_truncated_table() {
        let entries = [SectionEntry {
            kind: 6,
            size: 8,
            count: 1,
            offset: 64,
        }];
        let mut data = table_bytes(&entries);
        data.truncate(data.len() - 4);

        let err = SectionTable::read(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_locate_found() {
        let entries = [
            SectionEntry {
                kind: 1,
                size: 16,
                count: 4,
                offset: 48,
            },
            SectionEntry {
                kind: 6,
                size: 8,
                count: 1,
                offset: 64,
            },
        ];
        let table = SectionTable::read(&mut Cursor::new(table_bytes(&entries))).unwrap();

        let located = table.locate(6).unwrap().unwrap();
        assert_eq!(located.entry, entries[1]);
        assert_eq!(located.table_offset, 0x30);
    }

    #[test]
    fn test_locate_absent() {
        let entries = [SectionEntry {
            kind: 1,
            size: 16,
            count: 4,
            offset: 48,
        }];
        let table = SectionTable::read(&mut Cursor::new(table_bytes(&entries))).unwrap();
        assert!(table.locate(6).unwrap().is_none());
    }

    #[test]
    fn test_locate_duplicate() {
        let entry = SectionEntry {
            kind: 6,
            size: 8,
            count: 1,
            offset: 64,
        };
        let table = SectionTable::read(&mut Cursor::new(table_bytes(&[entry, entry]))).unwrap();

        let err = table.locate(6).unwrap_err();
        assert!(matches!(err, Error::DuplicateSection { kind: 6, found: 2 }));
    }

    #[test]
    fn test_locate_unexpected_item_count() {
        let entries = [SectionEntry {
            kind: 6,
            size: 8,
            count: 3,
            offset: 64,
        }];
        let table = SectionTable::read(&mut Cursor::new(table_bytes(&entries))).unwrap();

        let err = table.locate(6).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedItemCount { kind: 6, count: 3 }
        ));
    }

    #[test]
    fn test_payload_end_bounds() {
        let entry = SectionEntry {
            kind: 6,
            size: 8,
            count: 1,
            offset: 64,
        };
        assert_eq!(entry.payload_end(72).unwrap(), 72);

        let err = entry.payload_end(71).unwrap_err();
        assert!(matches!(err, Error::SectionOutOfBounds { kind: 6, .. }));

        let negative = SectionEntry {
            kind: 6,
            size: -1,
            count: 1,
            offset: 64,
        };
        assert!(matches!(
            negative.payload_end(72).unwrap_err(),
            Error::InvalidFormat(_)
        ));
    }
}
