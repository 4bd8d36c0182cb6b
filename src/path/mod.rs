//! Path normalization into the OS extended-length form.
//!
//! Resolution is a pure string transformation: no filesystem access happens
//! here. The only process state consulted is the current directory, and only
//! for `PathFormat::RelativePath` through [`resolve`]; [`resolve_with_base`]
//! takes the base explicitly.

mod device;
mod extended;
mod resolve;
mod validate;

use std::fmt;
use std::str::FromStr;

pub use device::device_path;
pub use extended::{ExtendedPath, PathKind};
pub use resolve::{resolve, resolve_with_base};
pub use validate::is_reserved_device_name;

/// Legacy Win32 MAX_PATH, terminating NUL included.
pub const LEGACY_MAX_PATH: usize = 260;
/// Longest path (UTF-16 units) the legacy parser accepts without a prefix.
pub const LEGACY_THRESHOLD: usize = LEGACY_MAX_PATH - 1;
/// Absolute ceiling for extended-length paths, in UTF-16 units.
pub const MAX_EXTENDED_PATH: usize = 32_767;

pub const LONG_PATH_PREFIX: &str = r"\\?\";
pub const LONG_UNC_PREFIX: &str = r"\\?\UNC\";
pub const DEVICE_PREFIX: &str = r"\\.\";
pub const UNC_PREFIX: &str = r"\\";

/// How an input path string must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathFormat {
    /// Relative to the current directory; fully validated.
    #[default]
    RelativePath,
    /// Already absolute; still validated and prefixed when needed.
    FullPath,
    /// Already canonical; used verbatim.
    LongFullPath,
}

impl PathFormat {
    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" | "relativepath" | "rel" => Some(PathFormat::RelativePath),
            "full" | "fullpath" | "absolute" => Some(PathFormat::FullPath),
            "long" | "longfullpath" | "extended" => Some(PathFormat::LongFullPath),
            _ => None,
        }
    }
}

impl fmt::Display for PathFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PathFormat::RelativePath => "relative",
            PathFormat::FullPath => "full",
            PathFormat::LongFullPath => "long",
        };
        f.write_str(s)
    }
}

impl FromStr for PathFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid path format: '{s}'"))
    }
}

/// Length as the OS counts it.
#[inline]
pub(crate) fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// ASCII case-insensitive `strip_prefix`.
pub(crate) fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
