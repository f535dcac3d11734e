//! Trailing file table that follows the two streams in legacy containers.
//!
//! ```text
//! repeat:
//!   u32   name_len        (> MAX_TABLE_NAME_LEN → end of data)
//!   u8[]  name            (empty after NUL-trim → end of table)
//!   u32   size
//!   u8[]  payload[size]
//! ```
//!
//! Running out of input anywhere in an entry is the normal way these tables
//! end, so the walk never fails on malformed data.  Only genuine I/O errors
//! propagate.

use log::debug;
use serde::Serialize;
use std::io::{self, Read, Seek, SeekFrom};

use crate::io_stream::{decode_cstring, try_read_exact, try_read_u32};
use crate::table::TableEntry;

/// Name lengths above this are treated as the end of valid data.
pub const MAX_TABLE_NAME_LEN: u32 = 4096;

/// Why a trailing-table walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WalkEnd {
    /// Empty-name sentinel entry.
    Sentinel,
    /// Name length above [`MAX_TABLE_NAME_LEN`].
    OversizedName(u32),
    /// Input ended inside an entry header.
    Exhausted,
    /// Entry payload runs past the end of the input.
    PayloadOverrun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailingTable {
    pub entries: Vec<TableEntry>,
    pub end:     WalkEnd,
}

/// Walk the table starting at absolute offset `start`.
pub fn walk_trailing_table<R: Read + Seek>(
    reader:    &mut R,
    start:     u64,
    input_len: u64,
) -> io::Result<TrailingTable> {
    reader.seek(SeekFrom::Start(start))?;
    let mut entries = Vec::new();

    let end = loop {
        let Some(name_len) = try_read_u32(reader)? else { break WalkEnd::Exhausted };
        if name_len > MAX_TABLE_NAME_LEN {
            break WalkEnd::OversizedName(name_len);
        }
        let Some(name_bytes) = try_read_exact(reader, name_len as usize)? else {
            break WalkEnd::Exhausted;
        };
        let Some(size) = try_read_u32(reader)? else { break WalkEnd::Exhausted };

        let name = decode_cstring(&name_bytes);
        if name.is_empty() {
            break WalkEnd::Sentinel;
        }

        let offset = reader.stream_position()?;
        let next   = offset + size as u64;
        if next > input_len {
            break WalkEnd::PayloadOverrun;
        }
        entries.push(TableEntry { name, offset, size: size as u64 });
        reader.seek(SeekFrom::Start(next))?;
    };

    debug!("trailing table: {} entries, ended by {:?}", entries.len(), end);
    Ok(TrailingTable { entries, end })
}
