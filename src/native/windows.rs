//! `NativeApi` over kernel32/advapi32.

use std::ffi::c_void;
use std::ptr::{null, null_mut};

use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, LocalFree, ERROR_INVALID_PARAMETER, ERROR_SUCCESS, HANDLE,
    INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Security::Authorization::{
    GetNamedSecurityInfoW, GetSecurityInfo, SE_FILE_OBJECT,
};
use windows_sys::Win32::Security::{GetSecurityDescriptorLength, PSECURITY_DESCRIPTOR};
use windows_sys::Win32::Storage::FileSystem::{CreateFileTransactedW, CreateFileW, ReplaceFileW};
use windows_sys::Win32::System::IO::DeviceIoControl;

use super::{NativeApi, OpenRequest, RawHandle, SafeBuffer, SecurityTarget};
use crate::path::ExtendedPath;

/// The real OS. Stateless; every call maps to exactly one Win32 call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Api;

fn as_handle(raw: RawHandle) -> HANDLE {
    raw.0 as HANDLE
}

fn last_error() -> u32 {
    unsafe { GetLastError() }
}

/// Frees an OS-allocated block with LocalFree on every exit path.
struct LocalBlock(PSECURITY_DESCRIPTOR);

impl Drop for LocalBlock {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                LocalFree(self.0);
            }
        }
    }
}

impl NativeApi for Win32Api {
    fn open_handle(
        &self,
        path: &ExtendedPath,
        request: &OpenRequest,
        transaction: RawHandle,
    ) -> Result<RawHandle, u32> {
        let wide = path.to_wide();
        let handle = unsafe {
            if transaction == RawHandle::NULL {
                CreateFileW(
                    wide.as_ptr(),
                    request.access,
                    request.share,
                    null(),
                    request.disposition,
                    request.flags,
                    null_mut(),
                )
            } else {
                CreateFileTransactedW(
                    wide.as_ptr(),
                    request.access,
                    request.share,
                    null(),
                    request.disposition,
                    request.flags,
                    null_mut(),
                    as_handle(transaction),
                    null(),
                    null(),
                )
            }
        };
        if handle == INVALID_HANDLE_VALUE || handle.is_null() {
            return Err(last_error());
        }
        Ok(RawHandle(handle as isize))
    }

    fn device_control(
        &self,
        handle: RawHandle,
        code: u32,
        input: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize, u32> {
        let (in_ptr, in_len) = match input {
            Some(bytes) => (bytes.as_ptr() as *const c_void, bytes.len()),
            None => (null(), 0),
        };
        let in_len = u32::try_from(in_len).map_err(|_| ERROR_INVALID_PARAMETER)?;
        // Oversized output buffers are clamped; the caller only grows by doubling.
        let out_len = u32::try_from(output.len()).unwrap_or(u32::MAX);
        let mut returned: u32 = 0;
        let ok = unsafe {
            DeviceIoControl(
                as_handle(handle),
                code,
                in_ptr,
                in_len,
                output.as_mut_ptr() as *mut c_void,
                out_len,
                &mut returned,
                null_mut(),
            )
        };
        if ok == 0 {
            return Err(last_error());
        }
        Ok(returned as usize)
    }

    fn replace_file(
        &self,
        replaced: &ExtendedPath,
        replacement: &ExtendedPath,
        backup: Option<&ExtendedPath>,
        flags: u32,
    ) -> Result<(), u32> {
        let replaced = replaced.to_wide();
        let replacement = replacement.to_wide();
        let backup = backup.map(ExtendedPath::to_wide);
        let backup_ptr = backup.as_ref().map_or(null(), |w| w.as_ptr());
        let ok = unsafe {
            ReplaceFileW(
                replaced.as_ptr(),
                replacement.as_ptr(),
                backup_ptr,
                flags,
                null(),
                null(),
            )
        };
        if ok == 0 {
            return Err(last_error());
        }
        Ok(())
    }

    fn get_security_descriptor(
        &self,
        target: SecurityTarget<'_>,
        information: u32,
    ) -> Result<SafeBuffer, u32> {
        let mut descriptor: PSECURITY_DESCRIPTOR = null_mut();
        let status = match target {
            SecurityTarget::Named(path) => {
                let wide = path.to_wide();
                unsafe {
                    GetNamedSecurityInfoW(
                        wide.as_ptr(),
                        SE_FILE_OBJECT,
                        information,
                        null_mut(),
                        null_mut(),
                        null_mut(),
                        null_mut(),
                        &mut descriptor,
                    )
                }
            }
            SecurityTarget::Handle(handle) => unsafe {
                GetSecurityInfo(
                    as_handle(handle),
                    SE_FILE_OBJECT,
                    information,
                    null_mut(),
                    null_mut(),
                    null_mut(),
                    null_mut(),
                    &mut descriptor,
                )
            },
        };
        let block = LocalBlock(descriptor);
        if status != ERROR_SUCCESS {
            return Err(status);
        }
        if block.0.is_null() {
            return Ok(SafeBuffer::zeroed(0));
        }
        let len = unsafe { GetSecurityDescriptorLength(block.0) } as usize;
        let bytes = unsafe { std::slice::from_raw_parts(block.0 as *const u8, len) };
        Ok(SafeBuffer::from_bytes(bytes))
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), u32> {
        if unsafe { CloseHandle(as_handle(handle)) } == 0 {
            return Err(last_error());
        }
        Ok(())
    }
}
