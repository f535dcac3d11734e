//! Signature scanner: locate a header that does not start at offset 0.
//!
//! # How it works
//!
//! The input is read forward in fixed windows of [`SCAN_WINDOW`] bytes.
//! The last `signature.len() - 1` bytes of each window are carried into the
//! next one, so a signature straddling a window boundary is still seen
//! exactly once.  The first match wins; reaching end of input without one
//! yields `None`.
//!
//! Memory use is one window plus the overlap, regardless of input size.

use std::io::{self, Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::error::{NmoError, Result};
use crate::header::HeaderLayout;
use crate::recovery::HeaderLocation;

/// Default scan window: 64 KiB.
pub const SCAN_WINDOW: usize = 64 * 1024;

/// Find the first absolute offset of `signature` in `reader`.
pub fn find_signature<R: Read + Seek>(reader: &mut R, signature: &[u8]) -> io::Result<Option<u64>> {
    find_signature_with_window(reader, signature, SCAN_WINDOW)
}

/// [`find_signature`] with an explicit window size.  The window is raised
/// to the signature length if smaller.
pub fn find_signature_with_window<R: Read + Seek>(
    reader:    &mut R,
    signature: &[u8],
    window:    usize,
) -> io::Result<Option<u64>> {
    if signature.is_empty() {
        return Ok(Some(0));
    }
    let window  = window.max(signature.len());
    let overlap = signature.len() - 1;

    reader.seek(SeekFrom::Start(0))?;
    let mut buf     = vec![0u8; window + overlap];
    let mut carried = 0usize;
    // Absolute offset of buf[0].
    let mut base    = 0u64;

    loop {
        let n      = fill(reader, &mut buf[carried..carried + window])?;
        let filled = carried + n;

        if let Some(pos) = buf[..filled]
            .windows(signature.len())
            .position(|w| w == signature)
        {
            return Ok(Some(base + pos as u64));
        }
        if n < window {
            return Ok(None);
        }

        let keep = overlap.min(filled);
        buf.copy_within(filled - keep..filled, 0);
        base   += (filled - keep) as u64;
        carried = keep;
    }
}

/// Read until `buf` is full or the stream ends.  Returns bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0)                                               => break,
            Ok(n)                                               => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e)                                              => return Err(e),
        }
    }
    Ok(total)
}

/// Search for every known header magic and return the earliest hit.
///
/// Fails with `SignatureNotFound` when no layout's magic occurs anywhere.
pub fn locate_header<R: Read + Seek>(reader: &mut R) -> Result<HeaderLocation> {
    let mut best: Option<HeaderLocation> = None;
    for layout in HeaderLayout::ALL {
        if let Some(offset) = find_signature(reader, layout.magic())? {
            debug!("{} signature found at {:#x}", layout.name(), offset);
            if best.map_or(true, |b| offset < b.offset) {
                best = Some(HeaderLocation { offset, layout });
            }
        }
    }
    let loc = best.ok_or(NmoError::SignatureNotFound)?;
    warn!("header not at offset 0; recovered {} header at {:#x}", loc.layout.name(), loc.offset);
    Ok(loc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MAGIC_LEGACY, MAGIC_STANDARD};
    use std::io::Cursor;

    fn with_sig_at(len: usize, at: usize, sig: &[u8]) -> Cursor<Vec<u8>> {
        let mut data = vec![0xAAu8; len];
        data[at..at + sig.len()].copy_from_slice(sig);
        Cursor::new(data)
    }

    #[test]
    fn finds_signature_inside_first_window() {
        let mut r = with_sig_at(100, 37, MAGIC_STANDARD);
        assert_eq!(find_signature_with_window(&mut r, MAGIC_STANDARD, 64).unwrap(), Some(37));
    }

    #[test]
    fn finds_signature_straddling_every_boundary_position() {
        let window = 16;
        for at in 9..=17 {
            let mut r = with_sig_at(64, at, MAGIC_STANDARD);
            assert_eq!(
                find_signature_with_window(&mut r, MAGIC_STANDARD, window).unwrap(),
                Some(at as u64),
                "signature at {at}",
            );
        }
    }

    #[test]
    fn reports_first_of_several_matches() {
        let mut data = vec![0u8; 200];
        data[150..158].copy_from_slice(MAGIC_STANDARD);
        data[70..78].copy_from_slice(MAGIC_STANDARD);
        let mut r = Cursor::new(data);
        assert_eq!(find_signature_with_window(&mut r, MAGIC_STANDARD, 32).unwrap(), Some(70));
    }

    #[test]
    fn missing_signature_is_none() {
        let mut r = Cursor::new(vec![0x55u8; 1000]);
        assert_eq!(find_signature_with_window(&mut r, MAGIC_STANDARD, 64).unwrap(), None);
        let mut empty = Cursor::new(Vec::new());
        assert_eq!(find_signature(&mut empty, MAGIC_STANDARD).unwrap(), None);
    }

    #[test]
    fn locate_header_prefers_earliest_layout() {
        let mut data = vec![0u8; 300];
        data[200..208].copy_from_slice(MAGIC_STANDARD);
        data[40..48].copy_from_slice(MAGIC_LEGACY);
        let loc = locate_header(&mut Cursor::new(data)).unwrap();
        assert_eq!(loc, HeaderLocation { offset: 40, layout: HeaderLayout::Legacy });
        assert!(loc.is_shifted());
    }

    #[test]
    fn locate_header_without_any_magic_fails() {
        match locate_header(&mut Cursor::new(vec![1u8; 500])) {
            Err(NmoError::SignatureNotFound) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
