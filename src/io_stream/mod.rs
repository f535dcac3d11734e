//! Byte-level I/O primitives shared by every parser.
//!
//! # In-memory buffers
//! [`ByteCursor`] walks a decoded buffer (the components stream) with
//! bounds-checked little-endian reads.  A read that would run past the end
//! returns `None` and leaves the cursor untouched, so callers decide which
//! error that maps to.
//!
//! # Seekable input
//! The positioned helpers operate on the raw input stream.  They never
//! buffer more than the requested length.
//!
//! # Endianness
//! All integers in the container are little-endian.  No runtime
//! negotiation is ever performed.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

// ── ByteCursor ────────────────────────────────────────────────────────────────

/// Bounds-checked little-endian reader over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }
}

// ── Strings ───────────────────────────────────────────────────────────────────

/// Decode `bytes` up to (excluding) the first NUL as UTF-8.
/// Bytes after the NUL are ignored; invalid sequences become U+FFFD.
pub fn decode_cstring(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

// ── Seekable helpers ──────────────────────────────────────────────────────────

/// Total length of a seekable stream.  The current position is preserved.
pub fn stream_len<S: Seek>(stream: &mut S) -> io::Result<u64> {
    let pos = stream.stream_position()?;
    let end = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(pos))?;
    Ok(end)
}

/// Read exactly `len` bytes starting at absolute `offset`.
pub fn read_exact_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Like [`read_exact_at`] but a short read yields `None` instead of an error.
pub fn try_read_exact<R: Read>(reader: &mut R, len: usize) -> io::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; len];
    match reader.read_exact(&mut buf) {
        Ok(())                                                => Ok(Some(buf)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e)                                                => Err(e),
    }
}

/// Read a little-endian `u32`; a clean or partial EOF yields `None`.
pub fn try_read_u32<R: Read>(reader: &mut R) -> io::Result<Option<u32>> {
    match reader.read_u32::<LittleEndian>() {
        Ok(v)                                                 => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e)                                                => Err(e),
    }
}
