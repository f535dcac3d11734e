//! Fixed 64-byte container header.
//!
//! Two field orderings exist in the wild.  Both start with an 8-byte magic
//! that selects the [`HeaderLayout`]; every remaining field is a
//! little-endian `u32` at a fixed offset given by that layout.  Fields are
//! always read individually at their offset, never overlaid onto a struct.
//!
//! ```text
//! offset  Standard ("Nemo Fi\0")     Legacy ("Nemo Fi\x01")
//!  0      magic[8]                   magic[8]
//!  8      date                       crc
//! 12      crc                        date
//! 16      plugin1                    flags
//! 20      plugin2                    plugin1
//! 24      flags                      plugin2
//! 28      components_packed_size     components_packed_size
//! 32      objects_packed_size        components_size
//! 36      objects_size               objects_packed_size
//! 40      add_path                   objects_size
//! 44      components_count           components_count
//! 48      objects_count              objects_count
//! 52      reserved (0)               add_path
//! 56      version                    version
//! 60      components_size            reserved (0)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::error::{NmoError, Result};

pub const HEADER_SIZE: usize = 64;
pub const MAGIC_STANDARD: &[u8; 8] = b"Nemo Fi\0";
pub const MAGIC_LEGACY:   &[u8; 8] = b"Nemo Fi\x01";

// ── Layouts ──────────────────────────────────────────────────────────────────

/// Byte offset of every 32-bit field for one layout.
struct FieldMap {
    date:                   usize,
    crc:                    usize,
    plugin1:                usize,
    plugin2:                usize,
    flags:                  usize,
    components_packed_size: usize,
    components_size:        usize,
    objects_packed_size:    usize,
    objects_size:           usize,
    add_path:               usize,
    components_count:       usize,
    objects_count:          usize,
    reserved:               usize,
    version:                usize,
}

const STANDARD_FIELDS: FieldMap = FieldMap {
    date:                   8,
    crc:                    12,
    plugin1:                16,
    plugin2:                20,
    flags:                  24,
    components_packed_size: 28,
    objects_packed_size:    32,
    objects_size:           36,
    add_path:               40,
    components_count:       44,
    objects_count:          48,
    reserved:               52,
    version:                56,
    components_size:        60,
};

const LEGACY_FIELDS: FieldMap = FieldMap {
    crc:                    8,
    date:                   12,
    flags:                  16,
    plugin1:                20,
    plugin2:                24,
    components_packed_size: 28,
    components_size:        32,
    objects_packed_size:    36,
    objects_size:           40,
    components_count:       44,
    objects_count:          48,
    add_path:               52,
    version:                56,
    reserved:               60,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderLayout {
    Standard,
    Legacy,
}

impl HeaderLayout {
    pub const ALL: [HeaderLayout; 2] = [HeaderLayout::Standard, HeaderLayout::Legacy];

    pub fn magic(self) -> &'static [u8; 8] {
        match self {
            HeaderLayout::Standard => MAGIC_STANDARD,
            HeaderLayout::Legacy   => MAGIC_LEGACY,
        }
    }

    /// Select a layout from the leading magic bytes.
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|l| magic.starts_with(l.magic()))
    }

    pub fn name(self) -> &'static str {
        match self {
            HeaderLayout::Standard => "standard",
            HeaderLayout::Legacy   => "legacy",
        }
    }

    fn fields(self) -> &'static FieldMap {
        match self {
            HeaderLayout::Standard => &STANDARD_FIELDS,
            HeaderLayout::Legacy   => &LEGACY_FIELDS,
        }
    }
}

// ── Packed sub-fields ────────────────────────────────────────────────────────

/// DOS-style date bitfield: `yyyyyyy mmmm ddddd hhhhh mmmmmm sssss`,
/// year counted from 1980, seconds stored halved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DosDate(pub u32);

impl DosDate {
    pub fn year(self)   -> u32 { ((self.0 >> 25) & 0x7F) + 1980 }
    pub fn month(self)  -> u32 { (self.0 >> 21) & 0x0F }
    pub fn day(self)    -> u32 { (self.0 >> 16) & 0x1F }
    pub fn hour(self)   -> u32 { (self.0 >> 11) & 0x1F }
    pub fn minute(self) -> u32 { (self.0 >> 5) & 0x3F }
    pub fn second(self) -> u32 { (self.0 & 0x1F) * 2 }

    /// `None` when the bitfield does not name a real calendar instant
    /// (month 0, hour 31, ...).
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year() as i32, self.month(), self.day())?
            .and_hms_opt(self.hour(), self.minute(), self.second())
    }

    /// Pack a timestamp.  Odd seconds round down; years outside
    /// 1980..=2107 return `None`.
    pub fn from_datetime(dt: NaiveDateTime) -> Option<Self> {
        let year = u32::try_from(dt.year()).ok()?.checked_sub(1980)?;
        if year > 0x7F {
            return None;
        }
        Some(DosDate(
            (year << 25)
                | (dt.month() << 21)
                | (dt.day() << 16)
                | (dt.hour() << 11)
                | (dt.minute() << 5)
                | (dt.second() / 2),
        ))
    }
}

/// Valid dates render through chrono; anything else shows the raw
/// sub-fields so the value is still visible.
impl fmt::Display for DosDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02} (invalid)",
                self.year(), self.month(), self.day(),
                self.hour(), self.minute(), self.second(),
            ),
        }
    }
}

impl Serialize for DosDate {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Version word packed as four bytes, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackedVersion(pub u32);

impl PackedVersion {
    pub fn major(self) -> u8 { (self.0 >> 24) as u8 }
    pub fn minor(self) -> u8 { (self.0 >> 16) as u8 }
    pub fn patch(self) -> u8 { (self.0 >> 8) as u8 }
    pub fn build(self) -> u8 { self.0 as u8 }
}

impl fmt::Display for PackedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major(), self.minor(), self.patch(), self.build())
    }
}

impl Serialize for PackedVersion {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

// ── ContainerHeader ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHeader {
    pub layout:                 HeaderLayout,
    pub date:                   DosDate,
    pub crc:                    u32,
    pub plugin1:                u32,
    pub plugin2:                u32,
    pub flags:                  u32,
    pub components_packed_size: u32,
    /// Explicit uncompressed size of the components stream.
    pub components_size:        u32,
    pub objects_packed_size:    u32,
    pub objects_size:           u32,
    pub add_path:               u32,
    pub components_count:       u32,
    pub objects_count:          u32,
    pub reserved:               u32,
    pub version:                PackedVersion,
}

impl ContainerHeader {
    /// An all-zero header of the given layout.
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            date:                   DosDate::default(),
            crc:                    0,
            plugin1:                0,
            plugin2:                0,
            flags:                  0,
            components_packed_size: 0,
            components_size:        0,
            objects_packed_size:    0,
            objects_size:           0,
            add_path:               0,
            components_count:       0,
            objects_count:          0,
            reserved:               0,
            version:                PackedVersion::default(),
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(NmoError::TruncatedHeader { available: buf.len() });
        }
        let layout = HeaderLayout::from_magic(&buf[..8]).ok_or_else(|| {
            NmoError::UnsupportedSignature { magic_hex: hex::encode(&buf[..8]) }
        })?;
        let f = layout.fields();
        let at = |off: usize| LittleEndian::read_u32(&buf[off..off + 4]);

        Ok(Self {
            layout,
            date:                   DosDate(at(f.date)),
            crc:                    at(f.crc),
            plugin1:                at(f.plugin1),
            plugin2:                at(f.plugin2),
            flags:                  at(f.flags),
            components_packed_size: at(f.components_packed_size),
            components_size:        at(f.components_size),
            objects_packed_size:    at(f.objects_packed_size),
            objects_size:           at(f.objects_size),
            add_path:               at(f.add_path),
            components_count:       at(f.components_count),
            objects_count:          at(f.objects_count),
            reserved:               at(f.reserved),
            version:                PackedVersion(at(f.version)),
        })
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..8].copy_from_slice(self.layout.magic());
        let f = self.layout.fields();
        let fields = [
            (f.date,                   self.date.0),
            (f.crc,                    self.crc),
            (f.plugin1,                self.plugin1),
            (f.plugin2,                self.plugin2),
            (f.flags,                  self.flags),
            (f.components_packed_size, self.components_packed_size),
            (f.components_size,        self.components_size),
            (f.objects_packed_size,    self.objects_packed_size),
            (f.objects_size,           self.objects_size),
            (f.add_path,               self.add_path),
            (f.components_count,       self.components_count),
            (f.objects_count,          self.objects_count),
            (f.reserved,               self.reserved),
            (f.version,                self.version.0),
        ];
        for (off, value) in fields {
            LittleEndian::write_u32(&mut buf[off..off + 4], value);
        }
        buf
    }

    /// Read and decode the header starting at absolute `offset`.
    pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        reader.by_ref().take(HEADER_SIZE as u64).read_to_end(&mut buf)?;
        Self::decode(&buf)
    }

    /// Header plus both compressed streams, measured from the header start.
    pub fn declared_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.components_packed_size as u64 + self.objects_packed_size as u64
    }

    /// Absolute start of the objects address space that component record
    /// offsets are expressed in.
    pub fn objects_base(&self) -> i64 {
        HEADER_SIZE as i64 + self.components_size as i64
    }
}
