use super::extended::{has_drive, ExtendedPath, PathKind};
use super::validate::check_chars;
use super::{strip_prefix_ci, DEVICE_PREFIX, LONG_PATH_PREFIX};
use crate::errors::{InteropError, Result};

/// Resolve a raw device or volume designator for device-control calls.
///
/// Accepted: `\\.\...` (kept), `\\?\Volume{GUID}` (kept), a drive letter in
/// the forms `C`, `C:` or `C:\` (-> `\\.\C:`), and a physical drive as `N` or
/// `PhysicalDriveN` (-> `\\.\PhysicalDriveN`). One trailing separator is
/// dropped because a trailing `\` opens the root directory instead of the
/// volume.
pub fn device_path(raw: &str) -> Result<ExtendedPath> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InteropError::invalid_path(raw, "device designator is empty"));
    }
    let text = trimmed.replace('/', "\\");

    if let Some(rest) = text.strip_prefix(DEVICE_PREFIX) {
        let rest = rest.strip_suffix('\\').unwrap_or(rest);
        if rest.is_empty() {
            return Err(InteropError::invalid_path(raw, "missing device name"));
        }
        check_chars(rest, raw, true)?;
        return Ok(ExtendedPath::new(format!("{DEVICE_PREFIX}{rest}"), PathKind::Device));
    }

    if let Some(rest) = text.strip_prefix(LONG_PATH_PREFIX) {
        if strip_prefix_ci(rest, "Volume{").is_some() {
            let rest = rest.strip_suffix('\\').unwrap_or(rest);
            check_chars(rest, raw, false)?;
            return Ok(ExtendedPath::new(format!("{LONG_PATH_PREFIX}{rest}"), PathKind::Volume));
        }
        return Err(InteropError::invalid_path(raw, "not a volume designator"));
    }

    let bytes = text.as_bytes();
    let drive_letter = match bytes.len() {
        1 if bytes[0].is_ascii_alphabetic() => Some(bytes[0] as char),
        2 | 3 if has_drive(&text) && (bytes.len() == 2 || bytes[2] == b'\\') => {
            Some(bytes[0] as char)
        }
        _ => None,
    };
    if let Some(letter) = drive_letter {
        return Ok(ExtendedPath::new(
            format!("{DEVICE_PREFIX}{}:", letter.to_ascii_uppercase()),
            PathKind::Device,
        ));
    }

    let number = strip_prefix_ci(&text, "PhysicalDrive").unwrap_or(&text);
    if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
        let n: u32 = number
            .parse()
            .map_err(|_| InteropError::invalid_path(raw, "physical drive number out of range"))?;
        return Ok(ExtendedPath::new(
            format!("{DEVICE_PREFIX}PhysicalDrive{n}"),
            PathKind::Device,
        ));
    }

    Err(InteropError::invalid_path(
        raw,
        "expected a drive letter, a physical drive number, or a device path",
    ))
}
