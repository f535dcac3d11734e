pub mod scanner;

use serde::Serialize;

use crate::header::HeaderLayout;

pub use scanner::{find_signature, find_signature_with_window, locate_header, SCAN_WINDOW};

/// Where a header was found, and which layout its magic selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderLocation {
    pub offset: u64,
    pub layout: HeaderLayout,
}

impl HeaderLocation {
    /// `true` when the header did not sit at offset 0.
    pub fn is_shifted(&self) -> bool {
        self.offset != 0
    }
}
