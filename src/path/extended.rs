use std::fmt;

use super::{strip_prefix_ci, utf16_len, DEVICE_PREFIX, LONG_PATH_PREFIX, LONG_UNC_PREFIX, UNC_PREFIX};

/// Namespace a resolved path lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// `X:\...` or `\\?\X:\...`
    Local,
    /// `\\server\share\...` or `\\?\UNC\server\share\...`
    Unc,
    /// Win32 device namespace, `\\.\...`
    Device,
    /// `\\?\Volume{GUID}\...` and other non-drive `\\?\` targets
    Volume,
}

/// Canonical output of path resolution, ready to hand to the OS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedPath {
    text: String,
    kind: PathKind,
}

impl ExtendedPath {
    pub(crate) fn new(text: String, kind: PathKind) -> Self {
        Self { text, kind }
    }

    /// Wrap a caller-attested canonical path without touching it.
    pub(crate) fn verbatim(text: &str) -> Self {
        Self {
            kind: classify(text),
            text: text.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// True when the path carries the `\\?\` prefix.
    pub fn is_prefixed(&self) -> bool {
        self.text.starts_with(LONG_PATH_PREFIX)
    }

    pub fn utf16_len(&self) -> usize {
        utf16_len(&self.text)
    }

    /// NUL-terminated UTF-16 for the wide Win32 entry points.
    pub fn to_wide(&self) -> Vec<u16> {
        self.text.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Legacy form with any `\\?\` prefix removed, for messages.
    pub fn to_regular_path(&self) -> String {
        if let Some(rest) = strip_prefix_ci(&self.text, LONG_UNC_PREFIX) {
            return format!("{UNC_PREFIX}{rest}");
        }
        match self.text.strip_prefix(LONG_PATH_PREFIX) {
            Some(rest) if self.kind == PathKind::Local => rest.to_string(),
            _ => self.text.clone(),
        }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for ExtendedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for ExtendedPath {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

fn classify(text: &str) -> PathKind {
    if strip_prefix_ci(text, LONG_UNC_PREFIX).is_some() {
        PathKind::Unc
    } else if let Some(rest) = text.strip_prefix(LONG_PATH_PREFIX) {
        if has_drive(rest) {
            PathKind::Local
        } else {
            PathKind::Volume
        }
    } else if text.starts_with(DEVICE_PREFIX) {
        PathKind::Device
    } else if text.starts_with(UNC_PREFIX) {
        PathKind::Unc
    } else {
        PathKind::Local
    }
}

pub(crate) fn has_drive(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}
