//! Win32 error code -> `InteropError`.
//!
//! Pure mapping: no I/O, no retries. The resulting error always carries the
//! path(s) of the failing call.

use tracing::debug;
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_BAD_NETPATH, ERROR_BAD_NET_NAME, ERROR_BAD_PATHNAME,
    ERROR_DIRECTORY, ERROR_FILENAME_EXCED_RANGE, ERROR_FILE_NOT_FOUND, ERROR_INSUFFICIENT_BUFFER,
    ERROR_INVALID_DRIVE, ERROR_INVALID_NAME, ERROR_INVALID_TRANSACTION, ERROR_LOCK_VIOLATION,
    ERROR_MORE_DATA, ERROR_PATH_NOT_FOUND, ERROR_PRIVILEGE_NOT_HELD, ERROR_SHARING_VIOLATION,
    ERROR_TRANSACTION_ALREADY_ABORTED, ERROR_TRANSACTION_ALREADY_COMMITTED,
    ERROR_TRANSACTION_NOT_ACTIVE, ERROR_UNABLE_TO_REMOVE_REPLACED, ERROR_WRITE_PROTECT,
};

use crate::errors::{ErrorKind, InteropError};
use crate::path::MAX_EXTENDED_PATH;

/// Every code with a dedicated kind. Anything else is `UnknownNative`.
pub const TRANSLATION_TABLE: &[(u32, ErrorKind)] = &[
    (ERROR_FILE_NOT_FOUND, ErrorKind::FileNotFound),
    (ERROR_PATH_NOT_FOUND, ErrorKind::DirectoryNotFound),
    (ERROR_INVALID_DRIVE, ErrorKind::DirectoryNotFound),
    (ERROR_BAD_NETPATH, ErrorKind::DirectoryNotFound),
    (ERROR_BAD_NET_NAME, ErrorKind::DirectoryNotFound),
    (ERROR_ACCESS_DENIED, ErrorKind::AccessDenied),
    (ERROR_SHARING_VIOLATION, ErrorKind::AccessDenied),
    (ERROR_LOCK_VIOLATION, ErrorKind::AccessDenied),
    (ERROR_WRITE_PROTECT, ErrorKind::AccessDenied),
    (ERROR_PRIVILEGE_NOT_HELD, ErrorKind::AccessDenied),
    (ERROR_UNABLE_TO_REMOVE_REPLACED, ErrorKind::AccessDenied),
    (ERROR_INVALID_NAME, ErrorKind::InvalidPath),
    (ERROR_BAD_PATHNAME, ErrorKind::InvalidPath),
    (ERROR_DIRECTORY, ErrorKind::InvalidPath),
    (ERROR_FILENAME_EXCED_RANGE, ErrorKind::PathTooLong),
    (ERROR_INSUFFICIENT_BUFFER, ErrorKind::BufferExhausted),
    (ERROR_MORE_DATA, ErrorKind::BufferExhausted),
    (ERROR_INVALID_TRANSACTION, ErrorKind::TransactionAborted),
    (ERROR_TRANSACTION_NOT_ACTIVE, ErrorKind::TransactionAborted),
    (ERROR_TRANSACTION_ALREADY_ABORTED, ErrorKind::TransactionAborted),
    (ERROR_TRANSACTION_ALREADY_COMMITTED, ErrorKind::TransactionAborted),
];

pub fn lookup(code: u32) -> Option<ErrorKind> {
    TRANSLATION_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, kind)| *kind)
}

/// Build the structured failure for `code` raised by a call on `primary`
/// (and `secondary`, for two-path calls).
pub fn translate(code: u32, primary: &str, secondary: Option<&str>) -> InteropError {
    let path = primary.to_string();
    let other = secondary.map(str::to_string);
    let err = match lookup(code) {
        Some(ErrorKind::FileNotFound) => InteropError::FileNotFound { path, other },
        Some(ErrorKind::DirectoryNotFound) => InteropError::DirectoryNotFound { path, other },
        Some(ErrorKind::AccessDenied) => InteropError::AccessDenied { path, other, code },
        Some(ErrorKind::InvalidPath) => InteropError::InvalidPath {
            path,
            reason: match other {
                Some(o) => format!("rejected by the OS (code {code}, with {o})"),
                None => format!("rejected by the OS (code {code})"),
            },
        },
        Some(ErrorKind::PathTooLong) => InteropError::PathTooLong {
            length: primary.encode_utf16().count(),
            path,
            ceiling: MAX_EXTENDED_PATH,
        },
        // Outside the growable invoker nothing is known about sizes.
        Some(ErrorKind::BufferExhausted) => InteropError::BufferExhausted {
            path,
            attempts: 1,
            last_size: 0,
        },
        Some(ErrorKind::TransactionAborted) => {
            InteropError::TransactionAborted { path, other, code }
        }
        Some(ErrorKind::InvalidBufferAccess) | Some(ErrorKind::UnknownNative) | None => {
            InteropError::UnknownNative { code, path, other }
        }
    };
    debug!(code, kind = err.kind().as_str(), path = primary, "native failure translated");
    err
}
