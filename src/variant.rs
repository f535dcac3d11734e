//! Container variant selection.
//!
//! The leading magic is inspected exactly once and mapped onto a closed set
//! of strategies:
//!
//! | Leading bytes   | Variant                |
//! |-----------------|------------------------|
//! | `VXBG`          | [`ContainerVariant::Vxbg`] |
//! | `Nemo Fi\0`     | [`ContainerVariant::StrictRecord`] |
//! | `Nemo Fi\x01`   | [`ContainerVariant::LegacyTrailingTable`] |
//! | anything else   | signature scan, then one of the two above |
//!
//! Each strategy decodes independently; they share only the header codec
//! and byte I/O helpers.

use log::info;
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};

use crate::error::{NmoError, Result};
use crate::header::{ContainerHeader, HeaderLayout};
use crate::io_stream::stream_len;
use crate::recovery::{locate_header, HeaderLocation};
use crate::strict::{decode_strict, StrictContents};
use crate::table::{walk_trailing_table, walk_vxbg_table, TableEntry, WalkEnd, VXBG_MAGIC};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContainerVariant {
    /// Component table + objects stream, sliced by record offsets.
    StrictRecord { header: ContainerHeader, location: HeaderLocation },
    /// Two streams followed by a flat length-prefixed file table.
    LegacyTrailingTable { header: ContainerHeader, location: HeaderLocation },
    /// VXBG sub-header with a cstring/size file table.
    Vxbg { sub_header_offset: u64 },
}

impl ContainerVariant {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerVariant::StrictRecord { .. }        => "strict-record",
            ContainerVariant::LegacyTrailingTable { .. } => "legacy-trailing-table",
            ContainerVariant::Vxbg { .. }                => "vxbg",
        }
    }

    pub fn header(&self) -> Option<(&ContainerHeader, HeaderLocation)> {
        match self {
            ContainerVariant::StrictRecord { header, location }
            | ContainerVariant::LegacyTrailingTable { header, location } => Some((header, *location)),
            ContainerVariant::Vxbg { .. } => None,
        }
    }

    fn from_header(header: ContainerHeader, location: HeaderLocation) -> Self {
        match header.layout {
            HeaderLayout::Standard => ContainerVariant::StrictRecord { header, location },
            HeaderLayout::Legacy   => ContainerVariant::LegacyTrailingTable { header, location },
        }
    }
}

/// Inspect the leading bytes of `reader` and select a variant.
///
/// Falls back to [`locate_header`] when the magic at offset 0 is unknown.
pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<ContainerVariant> {
    let mut lead = Vec::with_capacity(VXBG_MAGIC.len());
    reader.seek(SeekFrom::Start(0))?;
    reader.by_ref().take(VXBG_MAGIC.len() as u64).read_to_end(&mut lead)?;
    if lead == VXBG_MAGIC {
        info!("selected vxbg variant");
        return Ok(ContainerVariant::Vxbg { sub_header_offset: 0 });
    }

    let (header, location) = match ContainerHeader::read_at(reader, 0) {
        Ok(h) => {
            let location = HeaderLocation { offset: 0, layout: h.layout };
            (h, location)
        }
        Err(NmoError::UnsupportedSignature { .. }) => {
            let location = locate_header(reader)?;
            (ContainerHeader::read_at(reader, location.offset)?, location)
        }
        Err(e) => return Err(e),
    };

    let variant = ContainerVariant::from_header(header, location);
    info!("selected {} variant ({} header at {:#x})", variant.name(), location.layout.name(), location.offset);
    Ok(variant)
}

// ── Decoding ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    LegacyTrailing,
    Vxbg,
}

/// Entries found by one of the flat-table strategies.  Payloads stay in
/// the input until extracted.
#[derive(Debug, Clone, Serialize)]
pub struct TableContents {
    pub kind:     TableKind,
    pub entries:  Vec<TableEntry>,
    /// Set for trailing tables only.
    pub walk_end: Option<WalkEnd>,
}

#[derive(Debug, Clone)]
pub enum DecodedContainer {
    Strict(StrictContents),
    Table(TableContents),
}

/// Run the strategy for `variant` against `reader`.
pub fn decode<R: Read + Seek>(reader: &mut R, variant: &ContainerVariant) -> Result<DecodedContainer> {
    let input_len = stream_len(reader)?;
    match variant {
        ContainerVariant::StrictRecord { header, location } => {
            decode_strict(reader, header, *location, input_len).map(DecodedContainer::Strict)
        }
        ContainerVariant::LegacyTrailingTable { header, location } => {
            let declared = location.offset + header.declared_len();
            if declared > input_len {
                return Err(NmoError::FileTruncated { declared, actual: input_len });
            }
            let table = walk_trailing_table(reader, declared, input_len)?;
            Ok(DecodedContainer::Table(TableContents {
                kind:     TableKind::LegacyTrailing,
                entries:  table.entries,
                walk_end: Some(table.end),
            }))
        }
        ContainerVariant::Vxbg { sub_header_offset } => {
            let entries = walk_vxbg_table(reader, *sub_header_offset, input_len)?;
            Ok(DecodedContainer::Table(TableContents {
                kind:     TableKind::Vxbg,
                entries,
                walk_end: None,
            }))
        }
    }
}
