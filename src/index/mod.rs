use serde::Serialize;

use crate::error::{NmoError, Result};
use crate::io_stream::{decode_cstring, ByteCursor};

/// Fixed part of a component record: id, class, offset, name length.
pub const RECORD_HEADER_SIZE: usize = 16;

/// One entry of the decompressed components stream.
///
/// `offset` is absolute in the objects address space (see
/// [`ContainerHeader::objects_base`](crate::header::ContainerHeader::objects_base)).
/// Offsets may repeat and are not stored in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRecord {
    pub id:       i32,
    pub class_id: i32,
    pub offset:   i32,
    pub name:     String,
}

/// Parse exactly `count` records from the start of `buf`.
///
/// Trailing bytes after the last record are ignored.
pub fn parse_component_table(buf: &[u8], count: usize) -> Result<Vec<ComponentRecord>> {
    // Each record needs at least 16 bytes; don't trust `count` for capacity.
    let mut records = Vec::with_capacity(count.min(buf.len() / RECORD_HEADER_SIZE));
    let mut cur = ByteCursor::new(buf);

    for index in 0..count {
        if cur.remaining() < RECORD_HEADER_SIZE {
            return Err(NmoError::TruncatedRecord { index });
        }
        let (id, class_id, offset, name_len) = match (
            cur.read_i32(),
            cur.read_i32(),
            cur.read_i32(),
            cur.read_i32(),
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => return Err(NmoError::TruncatedRecord { index }),
        };

        let name_bytes = usize::try_from(name_len)
            .ok()
            .and_then(|n| cur.take(n))
            .ok_or(NmoError::InvalidRecordLength { index, len: name_len as i64 })?;

        records.push(ComponentRecord {
            id,
            class_id,
            offset,
            name: decode_cstring(name_bytes),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i32, class_id: i32, offset: i32, name: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&class_id.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&(name.len() as i32).to_le_bytes());
        out.extend_from_slice(name);
        out
    }

    #[test]
    fn parses_sequential_records() {
        let mut buf = record(5, 32, 0x200, b"Box Mesh\0");
        buf.extend(record(6, 30, 0x180, b"Mat\0pad"));
        buf.extend(record(7, -1, 0x300, b""));

        let recs = parse_component_table(&buf, 3).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], ComponentRecord { id: 5, class_id: 32, offset: 0x200, name: "Box Mesh".into() });
        assert_eq!(recs[1].name, "Mat");
        assert_eq!(recs[2].class_id, -1);
        assert_eq!(recs[2].name, "");
    }

    #[test]
    fn zero_count_reads_nothing() {
        assert!(parse_component_table(&[1, 2, 3], 0).unwrap().is_empty());
    }

    #[test]
    fn short_fixed_part_is_truncated_record() {
        let mut buf = record(1, 1, 0, b"a");
        buf.extend_from_slice(&[0u8; 10]);
        match parse_component_table(&buf, 2) {
            Err(NmoError::TruncatedRecord { index: 1 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn negative_name_length_is_invalid() {
        let mut buf = record(1, 1, 0, b"");
        buf[12..16].copy_from_slice(&(-4i32).to_le_bytes());
        match parse_component_table(&buf, 1) {
            Err(NmoError::InvalidRecordLength { index: 0, len: -4 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn name_past_buffer_end_is_invalid() {
        let mut buf = record(1, 1, 0, b"abc");
        buf[12..16].copy_from_slice(&50i32.to_le_bytes());
        match parse_component_table(&buf, 1) {
            Err(NmoError::InvalidRecordLength { index: 0, len: 50 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
