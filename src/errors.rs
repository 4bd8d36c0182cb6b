//! Typed error definitions for ntinterop.
//! A closed set of failure kinds; every environmental failure names the path(s)
//! of the call that produced it.

use thiserror::Error;

/// Stable failure kind, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPath,
    PathTooLong,
    FileNotFound,
    DirectoryNotFound,
    AccessDenied,
    BufferExhausted,
    InvalidBufferAccess,
    TransactionAborted,
    UnknownNative,
}

impl ErrorKind {
    /// snake_case label used as the `kind` field in structured logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidPath => "invalid_path",
            ErrorKind::PathTooLong => "path_too_long",
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::DirectoryNotFound => "directory_not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::BufferExhausted => "buffer_exhausted",
            ErrorKind::InvalidBufferAccess => "invalid_buffer_access",
            ErrorKind::TransactionAborted => "transaction_aborted",
            ErrorKind::UnknownNative => "unknown_native",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum InteropError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Path too long ({length} UTF-16 units, ceiling {ceiling}): {path}")]
    PathTooLong {
        path: String,
        length: usize,
        ceiling: usize,
    },

    #[error("File not found: {path}{}", also(.other))]
    FileNotFound { path: String, other: Option<String> },

    #[error("Directory not found: {path}{}", also(.other))]
    DirectoryNotFound { path: String, other: Option<String> },

    #[error("Access denied on {path}{} [os code: {code}]", also(.other))]
    AccessDenied {
        path: String,
        other: Option<String>,
        code: u32,
    },

    /// `attempts == 1` with `last_size == 0` means the OS reported an undersized
    /// buffer outside the growable invoker, so no size is known.
    #[error("Buffer exhausted querying {path}: gave up after {attempts} attempt(s), last buffer {last_size} bytes")]
    BufferExhausted {
        path: String,
        attempts: u32,
        last_size: usize,
    },

    #[error("Invalid buffer access: {size} bytes at offset {offset} exceeds buffer length {len}")]
    InvalidBufferAccess {
        offset: usize,
        size: usize,
        len: usize,
    },

    #[error("Transaction no longer active for {path}{} [os code: {code}]", also(.other))]
    TransactionAborted {
        path: String,
        other: Option<String>,
        code: u32,
    },

    #[error("Native error {code} on {path}{}", also(.other))]
    UnknownNative {
        code: u32,
        path: String,
        other: Option<String>,
    },
}

fn also(other: &Option<String>) -> String {
    match other {
        Some(p) => format!(" (with {p})"),
        None => String::new(),
    }
}

impl InteropError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InteropError::InvalidPath { .. } => ErrorKind::InvalidPath,
            InteropError::PathTooLong { .. } => ErrorKind::PathTooLong,
            InteropError::FileNotFound { .. } => ErrorKind::FileNotFound,
            InteropError::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            InteropError::AccessDenied { .. } => ErrorKind::AccessDenied,
            InteropError::BufferExhausted { .. } => ErrorKind::BufferExhausted,
            InteropError::InvalidBufferAccess { .. } => ErrorKind::InvalidBufferAccess,
            InteropError::TransactionAborted { .. } => ErrorKind::TransactionAborted,
            InteropError::UnknownNative { .. } => ErrorKind::UnknownNative,
        }
    }

    /// Raw OS code, when the failure came from a native call.
    pub fn native_code(&self) -> Option<u32> {
        match self {
            InteropError::AccessDenied { code, .. }
            | InteropError::TransactionAborted { code, .. }
            | InteropError::UnknownNative { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Primary path the failure refers to (None for buffer access errors).
    pub fn path(&self) -> Option<&str> {
        match self {
            InteropError::InvalidPath { path, .. }
            | InteropError::PathTooLong { path, .. }
            | InteropError::FileNotFound { path, .. }
            | InteropError::DirectoryNotFound { path, .. }
            | InteropError::AccessDenied { path, .. }
            | InteropError::BufferExhausted { path, .. }
            | InteropError::TransactionAborted { path, .. }
            | InteropError::UnknownNative { path, .. } => Some(path),
            InteropError::InvalidBufferAccess { .. } => None,
        }
    }

    /// Process exit status used by the binary, one per kind.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidPath => 10,
            ErrorKind::PathTooLong => 11,
            ErrorKind::FileNotFound => 12,
            ErrorKind::DirectoryNotFound => 13,
            ErrorKind::AccessDenied => 14,
            ErrorKind::BufferExhausted => 15,
            ErrorKind::InvalidBufferAccess => 16,
            ErrorKind::TransactionAborted => 17,
            ErrorKind::UnknownNative => 18,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        InteropError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InteropError>;
