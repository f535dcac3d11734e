//! Strict record strategy: two conditionally compressed streams, a
//! component table, and object slices derived from it.
//!
//! ```text
//! [header 64][components packed][objects packed]
//!             │                  │
//!             ▼ inflate          ▼ inflate
//!       component records ──► object slices over the objects buffer
//! ```

use log::debug;
use std::io::{Read, Seek};

use crate::codec::decompress_exact;
use crate::error::{NmoError, Result};
use crate::header::{ContainerHeader, HEADER_SIZE};
use crate::index::{parse_component_table, ComponentRecord};
use crate::io_stream::read_exact_at;
use crate::recovery::HeaderLocation;
use crate::slice::{build_object_slices, ObjectSlice};

/// Everything the strict strategy produces for one input.
#[derive(Debug, Clone)]
pub struct StrictContents {
    pub header:     ContainerHeader,
    pub location:   HeaderLocation,
    /// Decoded components stream.
    pub components: Vec<u8>,
    /// Decoded objects stream; every slice indexes into this.
    pub objects:    Vec<u8>,
    pub records:    Vec<ComponentRecord>,
    pub slices:     Vec<ObjectSlice>,
}

/// Decode a strict container whose header sits at `location`.
///
/// The declared sizes are checked against `input_len` before any stream is
/// read or inflated.
pub fn decode_strict<R: Read + Seek>(
    reader:    &mut R,
    header:    &ContainerHeader,
    location:  HeaderLocation,
    input_len: u64,
) -> Result<StrictContents> {
    let declared = location.offset + header.declared_len();
    if declared > input_len {
        return Err(NmoError::FileTruncated { declared, actual: input_len });
    }

    let components_at = location.offset + HEADER_SIZE as u64;
    let objects_at    = components_at + header.components_packed_size as u64;
    let comp_raw = read_exact_at(reader, components_at, header.components_packed_size as usize)?;
    let obj_raw  = read_exact_at(reader, objects_at, header.objects_packed_size as usize)?;

    let components = decompress_exact(comp_raw, header.components_packed_size, header.components_size)?;
    let objects    = decompress_exact(obj_raw, header.objects_packed_size, header.objects_size)?;

    let records = parse_component_table(&components, header.components_count as usize)?;
    let slices  = build_object_slices(&records, header.objects_base(), objects.len() as u64)?;
    debug!("{} component records → {} object slices", records.len(), slices.len());

    Ok(StrictContents {
        header: header.clone(),
        location,
        components,
        objects,
        records,
        slices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderLayout;
    use std::io::Cursor;

    fn component(id: i32, class_id: i32, offset: i32, name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for v in [id, class_id, offset, name.len() as i32 + 1] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out
    }

    /// Stored (uncompressed) strict container.
    fn stored(records: &[Vec<u8>], objects: &[u8]) -> (ContainerHeader, Vec<u8>) {
        let comps: Vec<u8> = records.concat();
        let mut h = ContainerHeader::new(HeaderLayout::Standard);
        h.components_packed_size = comps.len() as u32;
        h.components_size        = comps.len() as u32;
        h.objects_packed_size    = objects.len() as u32;
        h.objects_size           = objects.len() as u32;
        h.components_count       = records.len() as u32;
        let mut file = h.encode().to_vec();
        file.extend(comps);
        file.extend_from_slice(objects);
        (h, file)
    }

    fn at_zero() -> HeaderLocation {
        HeaderLocation { offset: 0, layout: HeaderLayout::Standard }
    }

    #[test]
    fn single_record_at_base_yields_bootstrap_and_object() {
        let base = 64 + component(1, 21, 0, "Level").len() as i32;
        let (h, file) = stored(&[component(1, 21, base, "Level")], &[9u8; 40]);
        let len = file.len() as u64;
        let out = decode_strict(&mut Cursor::new(file), &h, at_zero(), len).unwrap();
        assert_eq!(out.slices.len(), 2);
        assert_eq!(out.slices[0].size, 0);
        assert_eq!(out.slices[1].size, 40);
        assert_eq!(out.slices[1].name, "Level");
        assert_eq!(out.objects, vec![9u8; 40]);
    }

    #[test]
    fn short_input_fails_before_reading_streams() {
        let (h, mut file) = stored(&[component(1, 21, 100, "x")], &[0u8; 40]);
        file.truncate(file.len() - 1);
        let len = file.len() as u64;
        match decode_strict(&mut Cursor::new(file), &h, at_zero(), len) {
            Err(NmoError::FileTruncated { declared, actual }) => assert_eq!(declared, actual + 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn count_exceeding_table_is_truncated_record() {
        let (mut h, _) = stored(&[component(1, 21, 100, "x")], &[0u8; 4]);
        h.components_count = 2;
        let mut file = h.encode().to_vec();
        file.extend(component(1, 21, 100, "x"));
        file.extend_from_slice(&[0u8; 4]);
        let len = file.len() as u64;
        assert!(matches!(
            decode_strict(&mut Cursor::new(file), &h, at_zero(), len),
            Err(NmoError::TruncatedRecord { index: 1 })
        ));
    }
}
