//! Flat file tables used by the pre-component container variants.
//!
//! Both variants describe a sequence of named payloads laid out back to
//! back in the input.  The walkers only locate entries; payloads are read
//! later, one entry at a time, straight from the input.

pub mod legacy;
pub mod vxbg;

use serde::Serialize;
use std::io::{Read, Seek};

use crate::error::Result;
use crate::io_stream::read_exact_at;

pub use legacy::{walk_trailing_table, TrailingTable, WalkEnd, MAX_TABLE_NAME_LEN};
pub use vxbg::{walk_vxbg_table, MAX_VXBG_NAME_LEN, VXBG_MAGIC, VXBG_SUBHEADER_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub name:   String,
    /// Absolute offset of the payload in the input.
    pub offset: u64,
    pub size:   u64,
}

impl TableEntry {
    pub fn read_payload<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        Ok(read_exact_at(reader, self.offset, self.size as usize)?)
    }
}
