//! Object slices: contiguous byte ranges of the decoded objects buffer.
//!
//! Component records only carry a start offset; each object's extent runs
//! up to the next record's offset (or to the end of the objects stream for
//! the last one).  Bytes between the stream start and the first record form
//! a synthetic bootstrap slice.  The resulting list partitions
//! `[0, objects_size)` exactly: no gaps, no overlaps.  Records sharing an
//! offset produce zero-length slices, which are kept.

use serde::Serialize;

use crate::error::{NmoError, Result};
use crate::index::ComponentRecord;
use crate::sanitize::sanitize_file_name;
use crate::types::class_name;

/// Class of the synthetic leading slice (`PARAMETEROPERATION`).
pub const BOOTSTRAP_CLASS_ID: i32 = 4;
pub const BOOTSTRAP_NAME: &str = "PARAMETEROPERATION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSlice {
    pub index:    usize,
    pub class_id: i32,
    pub id:       i32,
    pub name:     String,
    /// Relative to the start of the decoded objects buffer.
    pub start:    u64,
    pub size:     u64,
}

impl ObjectSlice {
    pub fn type_name(&self) -> String {
        class_name(self.class_id).into_owned()
    }

    /// `<index:04>_<TypeName>_<id>_<sanitized name>.bin`
    pub fn file_name(&self) -> String {
        format!(
            "{:04}_{}_{}_{}.bin",
            self.index,
            class_name(self.class_id),
            self.id,
            sanitize_file_name(&self.name),
        )
    }

    /// Borrow this slice's bytes from the decoded objects buffer.
    pub fn bytes<'a>(&self, objects: &'a [u8]) -> Result<&'a [u8]> {
        let out_of_range = || NmoError::SliceOutOfRange {
            index: self.index,
            start: self.start,
            size:  self.size,
            len:   objects.len() as u64,
        };
        let start = usize::try_from(self.start).map_err(|_| out_of_range())?;
        let size  = usize::try_from(self.size).map_err(|_| out_of_range())?;
        let end   = start.checked_add(size).ok_or_else(out_of_range)?;
        objects.get(start..end).ok_or_else(out_of_range)
    }
}

/// Derive the ordered slice list.
///
/// `base` is the absolute offset record offsets are measured from and
/// `objects_size` the decoded objects buffer length.  Records are ordered
/// by `(offset, original index)` so duplicate offsets come out in a
/// deterministic order.
pub fn build_object_slices(
    records:      &[ComponentRecord],
    base:         i64,
    objects_size: u64,
) -> Result<Vec<ObjectSlice>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted: Vec<(usize, &ComponentRecord)> = records.iter().enumerate().collect();
    sorted.sort_by_key(|&(i, r)| (r.offset, i));

    let end_abs = base + objects_size as i64;

    let first_offset = sorted[0].1.offset as i64;
    let lead = first_offset - base;
    if lead < 0 {
        return Err(NmoError::InvalidLayout { first_offset, base });
    }

    let mut slices = Vec::with_capacity(sorted.len() + 1);
    slices.push(ObjectSlice {
        index:    0,
        class_id: BOOTSTRAP_CLASS_ID,
        id:       0,
        name:     BOOTSTRAP_NAME.to_owned(),
        start:    0,
        size:     lead as u64,
    });

    for (i, &(_, rec)) in sorted.iter().enumerate() {
        let start_abs = rec.offset as i64;
        let next_abs  = sorted.get(i + 1).map_or(end_abs, |&(_, next)| next.offset as i64);

        let size = next_abs - start_abs;
        if size < 0 {
            return Err(NmoError::NonMonotonicOffsets { index: i + 1 });
        }
        let start = start_abs - base;
        if start < 0 {
            return Err(NmoError::OffsetBeforeBase { index: i + 1, offset: start_abs, base });
        }

        let name = if rec.name.trim().is_empty() {
            format!("unnamed_{i}")
        } else {
            rec.name.clone()
        };

        slices.push(ObjectSlice {
            index: i + 1,
            class_id: rec.class_id,
            id: rec.id,
            name,
            start: start as u64,
            size:  size as u64,
        });
    }
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(id: i32, offset: i32, name: &str) -> ComponentRecord {
        ComponentRecord { id, class_id: 32, offset, name: name.to_owned() }
    }

    fn assert_partitions(slices: &[ObjectSlice], total: u64) {
        let mut cursor = 0u64;
        for s in slices {
            assert_eq!(s.start, cursor, "gap or overlap at slice {}", s.index);
            cursor += s.size;
        }
        assert_eq!(cursor, total);
    }

    #[test]
    fn empty_records_give_no_slices() {
        assert!(build_object_slices(&[], 64, 1000).unwrap().is_empty());
    }

    #[test]
    fn duplicate_offsets_keep_zero_length_slices() {
        // Objects stream spans absolute [100, 200).
        let recs = [rec(1, 100, "a"), rec(2, 100, "b"), rec(3, 150, "c")];
        let slices = build_object_slices(&recs, 100, 100).unwrap();
        let sizes:  Vec<u64> = slices.iter().map(|s| s.size).collect();
        let starts: Vec<u64> = slices.iter().map(|s| s.start).collect();
        assert_eq!(sizes,  [0, 0, 50, 50]);
        assert_eq!(starts, [0, 0, 0, 50]);
        assert_partitions(&slices, 100);
    }

    #[test]
    fn duplicate_offsets_follow_original_order() {
        let recs = [rec(9, 120, "late"), rec(1, 100, "x"), rec(2, 100, "y"), rec(3, 100, "z")];
        let slices = build_object_slices(&recs, 100, 40).unwrap();
        let ids: Vec<i32> = slices.iter().skip(1).map(|s| s.id).collect();
        assert_eq!(ids, [1, 2, 3, 9]);
        assert_eq!(slices[3].size, 20);
    }

    #[test]
    fn single_record_at_base() {
        let slices = build_object_slices(&[rec(7, 64, "Level")], 64, 40).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].class_id, BOOTSTRAP_CLASS_ID);
        assert_eq!(slices[0].name, BOOTSTRAP_NAME);
        assert_eq!((slices[0].start, slices[0].size), (0, 0));
        assert_eq!((slices[1].start, slices[1].size), (0, 40));
    }

    #[test]
    fn leading_gap_becomes_bootstrap_slice() {
        let slices = build_object_slices(&[rec(1, 90, "a")], 64, 50).unwrap();
        assert_eq!(slices[0].size, 26);
        assert_eq!(slices[1].start, 26);
        assert_eq!(slices[1].size, 24);
    }

    #[test]
    fn blank_names_get_placeholders() {
        let recs = [rec(1, 10, "  "), rec(2, 20, "")];
        let slices = build_object_slices(&recs, 10, 20).unwrap();
        assert_eq!(slices[1].name, "unnamed_0");
        assert_eq!(slices[2].name, "unnamed_1");
    }

    #[test]
    fn record_before_base_is_invalid_layout() {
        match build_object_slices(&[rec(1, 50, "a")], 64, 10) {
            Err(NmoError::InvalidLayout { first_offset: 50, base: 64 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn record_past_stream_end_is_non_monotonic() {
        match build_object_slices(&[rec(1, 64, "a"), rec(2, 200, "b")], 64, 100) {
            Err(NmoError::NonMonotonicOffsets { index: 2 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn file_name_uses_registry_and_sanitizer() {
        let s = ObjectSlice { index: 3, class_id: 32, id: 41, name: "a/b".into(), start: 0, size: 0 };
        assert_eq!(s.file_name(), "0003_MESH_41_a_b.bin");
        let s = ObjectSlice { class_id: 4242, ..s };
        assert_eq!(s.file_name(), "0003_TYPE_4242_41_a_b.bin");
    }

    #[test]
    fn bytes_checks_bounds() {
        let buf = [1u8, 2, 3, 4];
        let ok = ObjectSlice { index: 1, class_id: 1, id: 1, name: "o".into(), start: 1, size: 2 };
        assert_eq!(ok.bytes(&buf).unwrap(), &[2, 3]);
        let bad = ObjectSlice { size: 4, ..ok };
        assert!(matches!(bad.bytes(&buf), Err(NmoError::SliceOutOfRange { index: 1, .. })));
    }

    proptest! {
        #[test]
        fn slices_partition_objects_buffer(
            base in 0i64..10_000,
            size in 0u64..5_000,
            rel in prop::collection::vec(0u64..=5_000, 0..40),
        ) {
            let recs: Vec<ComponentRecord> = rel
                .iter()
                .enumerate()
                .map(|(i, &r)| rec(i as i32, (base + (r % (size + 1)) as i64) as i32, ""))
                .collect();
            let slices = build_object_slices(&recs, base, size).unwrap();
            if recs.is_empty() {
                prop_assert!(slices.is_empty());
            } else {
                prop_assert_eq!(slices.len(), recs.len() + 1);
                let mut cursor = 0u64;
                for s in &slices {
                    prop_assert_eq!(s.start, cursor);
                    cursor += s.size;
                }
                prop_assert_eq!(cursor, size);
            }
        }
    }
}
