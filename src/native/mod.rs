//! The native call seam.
//!
//! Every OS call the crate makes goes through [`NativeApi`]. Implementations
//! return raw Win32 error codes; translation into `InteropError` happens in
//! the caller, which knows which paths were involved.
//!
//! - `Win32Api` (Windows only) binds the trait to kernel32/advapi32.
//! - Tests bind it to a simulated device.

mod buffer;
mod handle;
mod transaction;
#[cfg(windows)]
mod windows;

pub use buffer::{FixedLayout, SafeBuffer};
pub use handle::SafeHandle;
pub use transaction::TransactionContext;
#[cfg(windows)]
pub use windows::Win32Api;

use windows_sys::Win32::Storage::FileSystem::{
    FILE_FLAG_BACKUP_SEMANTICS, FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};

use crate::path::ExtendedPath;

pub const GENERIC_READ: u32 = 0x8000_0000;
pub const GENERIC_WRITE: u32 = 0x4000_0000;
pub const READ_CONTROL: u32 = 0x0002_0000;
pub const ACCESS_SYSTEM_SECURITY: u32 = 0x0100_0000;

/// Platform-neutral handle value. Sentinels are never handed to close-handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub isize);

impl RawHandle {
    /// `INVALID_HANDLE_VALUE`
    pub const INVALID: RawHandle = RawHandle(-1);
    /// Null handle; also the "no transaction" parameter.
    pub const NULL: RawHandle = RawHandle(0);

    pub fn is_sentinel(self) -> bool {
        self == Self::INVALID || self == Self::NULL
    }
}

/// Arguments of an open-handle call other than the path and transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    pub access: u32,
    pub share: u32,
    pub disposition: u32,
    pub flags: u32,
}

impl OpenRequest {
    const SHARE_ALL: u32 = FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE;

    /// Existing file or directory, read access.
    pub fn read() -> Self {
        Self {
            access: GENERIC_READ,
            share: FILE_SHARE_READ,
            disposition: OPEN_EXISTING,
            flags: FILE_FLAG_BACKUP_SEMANTICS,
        }
    }

    /// Existing file or directory, security descriptor access only.
    pub fn read_control() -> Self {
        Self {
            access: READ_CONTROL,
            share: Self::SHARE_ALL,
            disposition: OPEN_EXISTING,
            flags: FILE_FLAG_BACKUP_SEMANTICS,
        }
    }

    /// Zero-access device open; enough for metadata-only device-control codes.
    pub fn device_query() -> Self {
        Self {
            access: 0,
            share: FILE_SHARE_READ | FILE_SHARE_WRITE,
            disposition: OPEN_EXISTING,
            flags: 0,
        }
    }

    /// Read/write device open. Physical drives need elevation for this.
    pub fn device_read_write() -> Self {
        Self {
            access: GENERIC_READ | GENERIC_WRITE,
            ..Self::device_query()
        }
    }

    pub fn with_access(mut self, access: u32) -> Self {
        self.access = access;
        self
    }

    pub fn with_share(mut self, share: u32) -> Self {
        self.share = share;
        self
    }

    pub fn with_disposition(mut self, disposition: u32) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

/// Object whose security descriptor is requested.
#[derive(Debug, Clone, Copy)]
pub enum SecurityTarget<'a> {
    Named(&'a ExtendedPath),
    Handle(RawHandle),
}

/// The OS call contracts the core consumes. Failures are raw Win32 codes.
pub trait NativeApi {
    /// `transaction` is `RawHandle::NULL` outside a transaction.
    fn open_handle(
        &self,
        path: &ExtendedPath,
        request: &OpenRequest,
        transaction: RawHandle,
    ) -> Result<RawHandle, u32>;

    /// Returns bytes written into `output`.
    fn device_control(
        &self,
        handle: RawHandle,
        code: u32,
        input: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize, u32>;

    fn replace_file(
        &self,
        replaced: &ExtendedPath,
        replacement: &ExtendedPath,
        backup: Option<&ExtendedPath>,
        flags: u32,
    ) -> Result<(), u32>;

    /// Self-relative descriptor copied out of OS-owned memory.
    fn get_security_descriptor(
        &self,
        target: SecurityTarget<'_>,
        information: u32,
    ) -> Result<SafeBuffer, u32>;

    fn close_handle(&self, handle: RawHandle) -> Result<(), u32>;
}
