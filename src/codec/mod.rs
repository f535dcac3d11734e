//! Stream decompression for the components and objects streams.
//!
//! # Encoding rules
//! The container carries no codec id.  A stream's encoding is implied by
//! its two declared sizes:
//!   - packed size == unpacked size → the bytes are stored verbatim.
//!   - anything else                → the bytes are a zlib bitstream.
//!
//! A zlib stream MUST inflate to exactly the declared unpacked size.  A
//! stream that ends early is a hard failure; output is never silently
//! truncated.  Bytes the stream would produce past the declared size are
//! not read.  No checksum beyond zlib's own Adler-32 is verified.

use flate2::read::ZlibDecoder;
use log::debug;
use serde::Serialize;
use std::io::Read;

use crate::error::{NmoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamEncoding {
    Stored,
    Zlib,
}

impl StreamEncoding {
    #[inline]
    pub fn for_sizes(packed: u32, unpacked: u32) -> Self {
        if packed == unpacked { StreamEncoding::Stored } else { StreamEncoding::Zlib }
    }

    /// Human-readable name; diagnostics only, never parsed.
    pub fn name(self) -> &'static str {
        match self {
            StreamEncoding::Stored => "stored",
            StreamEncoding::Zlib   => "zlib",
        }
    }
}

/// Decode one stream to exactly `unpacked` bytes.
///
/// Stored streams are returned unchanged (no copy).
pub fn decompress_exact(raw: Vec<u8>, packed: u32, unpacked: u32) -> Result<Vec<u8>> {
    let encoding = StreamEncoding::for_sizes(packed, unpacked);
    debug!("stream {} B → {} B ({})", packed, unpacked, encoding.name());
    match encoding {
        StreamEncoding::Stored => Ok(raw),
        StreamEncoding::Zlib   => inflate_exact(&raw, unpacked as usize),
    }
}

/// Inflate a zlib stream into a buffer of exactly `expected` bytes.
///
/// The buffer grows with the inflated output, so a header declaring a huge
/// size over a tiny stream costs no more than the stream itself yields.
pub fn inflate_exact(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(expected as u64);
    let mut out     = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| NmoError::Decompression(e.to_string()))?;

    if out.len() < expected {
        return Err(NmoError::ShortDecompression { expected, actual: out.len() });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn equal_sizes_are_passthrough() {
        // Not valid zlib: proves no inflate is attempted.
        let raw = vec![0xFFu8, 0x00, 0x13, 0x37];
        let out = decompress_exact(raw.clone(), 4, 4).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn inflates_to_declared_size() {
        let plain: Vec<u8> = (0..4000u32).map(|i| (i % 13) as u8).collect();
        let packed = zlib(&plain);
        let out = decompress_exact(packed.clone(), packed.len() as u32, plain.len() as u32).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn stops_at_declared_size_when_stream_is_longer() {
        let plain = vec![b'x'; 500];
        let out = inflate_exact(&zlib(&plain), 100).unwrap();
        assert_eq!(out, vec![b'x'; 100]);
    }

    #[test]
    fn short_stream_is_short_decompression() {
        let plain = vec![7u8; 10];
        let packed = zlib(&plain);
        match decompress_exact(packed.clone(), packed.len() as u32, 1000) {
            Err(NmoError::ShortDecompression { expected: 1000, actual: 10 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_declaration_fails_without_preallocating() {
        let packed = zlib(b"tiny");
        match decompress_exact(packed.clone(), packed.len() as u32, u32::MAX) {
            Err(NmoError::ShortDecompression { expected, actual: 4 }) => {
                assert_eq!(expected, u32::MAX as usize);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn garbage_is_decompression_error() {
        let junk = vec![0x12u8, 0x34, 0x56, 0x78, 0x9A];
        assert!(matches!(inflate_exact(&junk, 64), Err(NmoError::Decompression(_))));
    }

    #[test]
    fn encoding_selection() {
        assert_eq!(StreamEncoding::for_sizes(10, 10), StreamEncoding::Stored);
        assert_eq!(StreamEncoding::for_sizes(10, 40), StreamEncoding::Zlib);
    }
}
