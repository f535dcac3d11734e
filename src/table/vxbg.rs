//! VXBG sub-format: a table of NUL-terminated names and sizes, followed by
//! the payloads packed back to back.
//!
//! ```text
//! +0   "VXBG"
//! +4   u32 base_field
//! +8   { cstring name ; u32 size } ...      until cursor reaches base
//! base payload[0] payload[1] ...
//! ```
//!
//! `base = sub_header + VXBG_SUBHEADER_SIZE + base_field`.  Unlike the
//! trailing table, every malformation here is an error.

use log::debug;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{NmoError, Result};
use crate::table::TableEntry;

pub const VXBG_MAGIC: &[u8; 4] = b"VXBG";
pub const VXBG_SUBHEADER_SIZE: u64 = 8;
/// Longest name scanned for a terminator, NUL included.
pub const MAX_VXBG_NAME_LEN: usize = 260;

pub fn walk_vxbg_table<R: Read + Seek>(
    reader:            &mut R,
    sub_header_offset: u64,
    input_len:         u64,
) -> Result<Vec<TableEntry>> {
    let available = input_len.saturating_sub(sub_header_offset);
    if available < VXBG_SUBHEADER_SIZE {
        return Err(NmoError::TruncatedHeader { available: available as usize });
    }

    reader.seek(SeekFrom::Start(sub_header_offset))?;
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != VXBG_MAGIC {
        return Err(NmoError::UnsupportedSignature { magic_hex: hex::encode(magic) });
    }
    let base_field = reader.read_u32::<LittleEndian>()?;

    let base = sub_header_offset + VXBG_SUBHEADER_SIZE + base_field as u64;
    if base > input_len {
        return Err(NmoError::FileTruncated { declared: base, actual: input_len });
    }
    debug!("VXBG table at {:#x}, payloads from {:#x}", sub_header_offset, base);

    let mut entries = Vec::new();
    let mut cursor  = sub_header_offset + VXBG_SUBHEADER_SIZE;
    let mut payload = base;

    while cursor < base {
        let index = entries.len();

        let limit = (input_len - cursor).min(MAX_VXBG_NAME_LEN as u64);
        reader.seek(SeekFrom::Start(cursor))?;
        let mut scan = Vec::with_capacity(limit as usize);
        reader.by_ref().take(limit).read_to_end(&mut scan)?;

        let nul = match scan.iter().position(|&b| b == 0) {
            Some(n) => n,
            None if limit < MAX_VXBG_NAME_LEN as u64 => {
                return Err(NmoError::TruncatedRecord { index });
            }
            None => return Err(NmoError::UnterminatedName { offset: cursor }),
        };
        let name = String::from_utf8_lossy(&scan[..nul]).into_owned();
        cursor += nul as u64 + 1;

        if input_len - cursor < 4 {
            return Err(NmoError::TruncatedRecord { index });
        }
        reader.seek(SeekFrom::Start(cursor))?;
        let size = reader.read_u32::<LittleEndian>()? as u64;
        cursor += 4;

        if payload + size > input_len {
            return Err(NmoError::SliceOutOfRange {
                index,
                start: payload,
                size,
                len:   input_len,
            });
        }
        entries.push(TableEntry { name, offset: payload, size });
        payload += size;
    }

    debug!("VXBG table: {} entries", entries.len());
    Ok(entries)
}
