//! # atlus_pm1 - PM1 container section patcher
//!
//! Reader and writer for the section table of Atlus PM1 event containers.
//! A PM1 file records its sections in a fixed-layout table: the section
//! count lives at offset 0x10 and contiguous 16-byte entries
//! `{type, size, count, offset}` start at offset 0x20, all little-endian.
//!
//! The library extracts the raw bytes of one section by its type tag, and
//! swaps in a replacement payload of any length while keeping the container
//! consistent: a payload that fits the old footprint is overwritten in place
//! with a zero-filled tail, a larger one is appended to 16-byte-aligned
//! space at the end of the file and the table entry is re-pointed at it.
//! Relocation leaves the old payload bytes orphaned in the file; they are
//! never reclaimed.
//!
//! ## Examples
//!
//! ```no_run
//! use atlus_pm1::{MESSAGE_SCRIPT_KIND, extract_section, inject_section};
//!
//! # fn main() -> Result<(), atlus_pm1::Error> {
//! // Pull the embedded message script out of an event container
//! match extract_section("event.pm1", MESSAGE_SCRIPT_KIND)? {
//!     Some(script) => println!("message script: {} bytes", script.len()),
//!     None => println!("no message script present"),
//! }
//!
//! // Swap in a recompiled script
//! let compiled: Vec<u8> = std::fs::read("event.bmd")?;
//! let outcome = inject_section("event.pm1", MESSAGE_SCRIPT_KIND, &compiled)?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod extract;
pub mod inject;
pub mod section;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{extract_section, read_section};
pub use inject::{Injection, SECTION_ALIGNMENT, inject_section, inject_section_to, write_section};
pub use section::{
    LocatedSection, MESSAGE_SCRIPT_KIND, SECTION_COUNT_OFFSET, SECTION_ENTRY_SIZE,
    SECTION_TABLE_OFFSET, SectionEntry, SectionTable,
};
