//! Character and segment checks shared by the resolvers.

use crate::errors::{InteropError, Result};

const INVALID_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// True for DOS device names (`CON`, `nul.txt`, `Com1`, ...), which the legacy
/// parser maps to devices instead of files.
pub fn is_reserved_device_name(segment: &str) -> bool {
    let stem = segment.split('.').next().unwrap_or(segment).trim_end();
    RESERVED_NAMES
        .iter()
        .any(|name| stem.eq_ignore_ascii_case(name))
}

/// Reject NUL, control characters and the wildcard/redirection set.
/// `allow_colon` is only true for device-namespace remainders.
pub(crate) fn check_chars(text: &str, whole: &str, allow_colon: bool) -> Result<()> {
    for c in text.chars() {
        if c == '\0' {
            return Err(InteropError::invalid_path(whole, "embedded NUL character"));
        }
        if (c as u32) < 0x20 {
            return Err(InteropError::invalid_path(
                whole,
                format!("control character U+{:04X}", c as u32),
            ));
        }
        if INVALID_CHARS.contains(&c) {
            return Err(InteropError::invalid_path(whole, format!("illegal character '{c}'")));
        }
        if c == ':' && !allow_colon {
            return Err(InteropError::invalid_path(
                whole,
                "':' is only allowed after a drive letter",
            ));
        }
    }
    Ok(())
}

/// Segments the legacy parser would silently alter: device names and names
/// ending in a dot or space.
pub(crate) fn forces_prefix(segment: &str) -> bool {
    is_reserved_device_name(segment) || segment.ends_with('.') || segment.ends_with(' ')
}
