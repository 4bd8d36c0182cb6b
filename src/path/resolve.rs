//! Resolution of user path strings into `ExtendedPath`.
//!
//! Steps, for anything that is not `LongFullPath`:
//!  1) reject empty input and embedded NULs
//!  2) pass device-namespace paths through; validate already-prefixed paths
//!  3) make relative input absolute against the base directory
//!  4) split off the drive or `\\server\share` root, resolve `.`/`..`, drop
//!     empty and trailing segments, validate every segment
//!  5) keep the legacy form when it is short and unambiguous, otherwise add
//!     the `\\?\` or `\\?\UNC\` prefix

use tracing::trace;

use super::extended::{has_drive, ExtendedPath, PathKind};
use super::validate::{check_chars, forces_prefix};
use super::{
    strip_prefix_ci, utf16_len, PathFormat, DEVICE_PREFIX, LEGACY_THRESHOLD, LONG_PATH_PREFIX,
    LONG_UNC_PREFIX, MAX_EXTENDED_PATH, UNC_PREFIX,
};
use crate::errors::{InteropError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    Drive(char),
    Unc { server: String, share: String },
}

impl Root {
    fn render(&self) -> String {
        match self {
            Root::Drive(d) => format!("{d}:\\"),
            Root::Unc { server, share } => format!(r"{UNC_PREFIX}{server}\{share}"),
        }
    }
}

/// Resolve against the process current directory.
pub fn resolve(raw: &str, format: PathFormat, transacted: bool) -> Result<ExtendedPath> {
    let base = if format == PathFormat::RelativePath {
        std::env::current_dir()
            .map(|d| d.to_string_lossy().into_owned())
            .map_err(|e| {
                InteropError::invalid_path(raw, format!("current directory unavailable: {e}"))
            })?
    } else {
        String::new()
    };
    resolve_with_base(raw, format, transacted, &base)
}

/// Resolve against an explicit base directory (used for `RelativePath` only).
pub fn resolve_with_base(
    raw: &str,
    format: PathFormat,
    transacted: bool,
    base: &str,
) -> Result<ExtendedPath> {
    if raw.trim().is_empty() {
        return Err(InteropError::invalid_path(raw, "path is empty"));
    }
    if raw.contains('\0') {
        return Err(InteropError::invalid_path(raw, "embedded NUL character"));
    }

    let path = match format {
        PathFormat::LongFullPath => {
            trace!(raw, "long full path used verbatim");
            return Ok(ExtendedPath::verbatim(raw));
        }
        _ => raw.replace('/', "\\"),
    };

    if let Some(rest) = path.strip_prefix(DEVICE_PREFIX) {
        check_chars(rest, raw, true)?;
        return Ok(ExtendedPath::new(path, PathKind::Device));
    }
    if path.starts_with(LONG_PATH_PREFIX) {
        return resolve_prefixed(&path, raw, transacted);
    }

    let absolute = if format == PathFormat::RelativePath {
        absolutize(&path, base, raw)?
    } else {
        path
    };

    let (root, rest) =
        split_root(&absolute, raw)?.ok_or_else(|| InteropError::invalid_path(raw, "path is not absolute"))?;

    let mut segments: Vec<&str> = Vec::new();
    for seg in rest.split('\\') {
        match seg {
            "" | "." => {}
            ".." => {
                // Clamped at the root, as the OS parser does.
                segments.pop();
            }
            _ => {
                check_chars(seg, raw, false)?;
                segments.push(seg);
            }
        }
    }

    let is_unc = matches!(root, Root::Unc { .. });
    if transacted && is_unc {
        return Err(InteropError::invalid_path(
            raw,
            "network paths cannot take part in a transaction",
        ));
    }

    let mut joined = root.render();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 || is_unc {
            joined.push('\\');
        }
        joined.push_str(seg);
    }
    let kind = if is_unc { PathKind::Unc } else { PathKind::Local };

    let forced = segments.iter().any(|s| forces_prefix(s));
    if utf16_len(&joined) <= LEGACY_THRESHOLD && !forced {
        trace!(raw, resolved = %joined, "legacy form kept");
        return Ok(ExtendedPath::new(joined, kind));
    }

    let prefixed = if is_unc {
        format!("{LONG_UNC_PREFIX}{}", &joined[UNC_PREFIX.len()..])
    } else {
        format!("{LONG_PATH_PREFIX}{joined}")
    };
    check_ceiling(&prefixed, raw)?;
    trace!(raw, resolved = %prefixed, forced, "extended prefix added");
    Ok(ExtendedPath::new(prefixed, kind))
}

/// Input that already carries `\\?\`: validated, one trailing separator
/// dropped, never re-prefixed and never dot-resolved (the OS takes it literally).
fn resolve_prefixed(path: &str, raw: &str, transacted: bool) -> Result<ExtendedPath> {
    if let Some(rest) = strip_prefix_ci(path, LONG_UNC_PREFIX) {
        let mut parts = rest.splitn(3, '\\');
        let server = parts.next().unwrap_or("");
        let share = parts.next().unwrap_or("");
        let remainder = parts.next().unwrap_or("");
        if server.is_empty() || share.is_empty() {
            return Err(InteropError::invalid_path(raw, "UNC path requires a server and share name"));
        }
        check_chars(server, raw, false)?;
        check_chars(share, raw, false)?;
        check_chars(remainder, raw, false)?;
        if transacted {
            return Err(InteropError::invalid_path(
                raw,
                "network paths cannot take part in a transaction",
            ));
        }
        let text = path.strip_suffix('\\').unwrap_or(path);
        check_ceiling(text, raw)?;
        return Ok(ExtendedPath::new(text.to_string(), PathKind::Unc));
    }

    let rest = &path[LONG_PATH_PREFIX.len()..];
    let (kind, root_len) = if has_drive(rest) {
        match rest.as_bytes().get(2) {
            None => (PathKind::Volume, 2),
            Some(b'\\') => {
                check_chars(&rest[3..], raw, false)?;
                (PathKind::Local, 3)
            }
            Some(_) => {
                return Err(InteropError::invalid_path(
                    raw,
                    "drive letter must be followed by a separator",
                ));
            }
        }
    } else {
        let first = rest.split('\\').next().unwrap_or("");
        if first.is_empty() {
            return Err(InteropError::invalid_path(raw, "missing target after \\\\?\\ prefix"));
        }
        check_chars(rest, raw, false)?;
        (PathKind::Volume, first.len() + 1)
    };

    let text = if rest.len() > root_len {
        path.strip_suffix('\\').unwrap_or(path)
    } else {
        path
    };
    check_ceiling(text, raw)?;
    Ok(ExtendedPath::new(text.to_string(), kind))
}

fn check_ceiling(text: &str, raw: &str) -> Result<()> {
    let length = utf16_len(text);
    if length > MAX_EXTENDED_PATH {
        return Err(InteropError::PathTooLong {
            path: raw.to_string(),
            length,
            ceiling: MAX_EXTENDED_PATH,
        });
    }
    Ok(())
}

/// Split `X:\rest` or `\\server\share\rest`; `Ok(None)` when not absolute.
fn split_root<'a>(s: &'a str, raw: &str) -> Result<Option<(Root, &'a str)>> {
    if has_drive(s) && s.as_bytes().get(2) == Some(&b'\\') {
        let drive = s.chars().next().unwrap_or('C');
        return Ok(Some((Root::Drive(drive), &s[3..])));
    }
    if let Some(rest) = s.strip_prefix(UNC_PREFIX) {
        let mut parts = rest.splitn(3, '\\');
        let server = parts.next().unwrap_or("");
        let share = parts.next().unwrap_or("");
        let remainder = parts.next().unwrap_or("");
        if server.is_empty() || share.is_empty() {
            return Err(InteropError::invalid_path(raw, "UNC path requires a server and share name"));
        }
        check_chars(server, raw, false)?;
        check_chars(share, raw, false)?;
        return Ok(Some((
            Root::Unc {
                server: server.to_string(),
                share: share.to_string(),
            },
            remainder,
        )));
    }
    Ok(None)
}

/// Combine a relative path with the base directory.
fn absolutize(path: &str, base: &str, raw: &str) -> Result<String> {
    if (has_drive(path) && path.as_bytes().get(2) == Some(&b'\\')) || path.starts_with(UNC_PREFIX) {
        return Ok(path.to_string());
    }

    let base = base.replace('/', "\\");
    let base_plain = if let Some(rest) = strip_prefix_ci(&base, LONG_UNC_PREFIX) {
        format!("{UNC_PREFIX}{rest}")
    } else if let Some(rest) = base.strip_prefix(LONG_PATH_PREFIX) {
        rest.to_string()
    } else {
        base.clone()
    };
    let (root, _) = split_root(&base_plain, raw)?.ok_or_else(|| {
        InteropError::invalid_path(
            raw,
            format!("current directory '{base}' is not an absolute Windows path"),
        )
    })?;

    if path.starts_with('\\') {
        return Ok(format!("{}{}", root.render(), path));
    }
    if has_drive(path) {
        let drive = path.chars().next().unwrap_or('C');
        let rest = &path[2..];
        return Ok(match root {
            Root::Drive(d) if d.eq_ignore_ascii_case(&drive) => format!(r"{base_plain}\{rest}"),
            _ => format!(r"{drive}:\{rest}"),
        });
    }
    Ok(format!(r"{base_plain}\{path}"))
}
