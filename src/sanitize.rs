//! Turn names taken from the container into safe single-component
//! file names.

/// Upper bound on a sanitized name, in characters.
pub const MAX_FILE_NAME_CHARS: usize = 160;
pub const PLACEHOLDER_NAME: &str = "noname";

/// Characters rejected in a file name on at least one supported platform.
/// The Windows set is a superset of the POSIX one, so it applies everywhere.
#[inline]
fn is_invalid(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/') || (c as u32) < 0x20
}

/// Replace invalid characters with `_`, collapse `..`, trim, fall back to
/// a placeholder when empty or only dots, and cap at [`MAX_FILE_NAME_CHARS`].
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name.chars().map(|c| if is_invalid(c) { '_' } else { c }).collect();
    let collapsed = replaced.replace("..", "_");
    let trimmed = collapsed.trim();
    // "." names the output directory itself.
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return PLACEHOLDER_NAME.to_owned();
    }
    trimmed.chars().take(MAX_FILE_NAME_CHARS).collect()
}
