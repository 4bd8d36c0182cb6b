//! One entry point per logical operation.
//!
//! Every operation follows the same shape:
//!  1) resolve all path arguments (nothing is opened before this succeeds)
//!  2) open the handles it needs, transaction-scoped when one is supplied
//!  3) issue the call; device-control queries go through `ioctl::invoke`
//!  4) translate failures with the resolved path(s)
//!
//! Handles are `SafeHandle`s owned by the operation's stack frame, so they
//! are released in reverse order on every return path.

use tracing::debug;
use windows_sys::Win32::Foundation::{
    ERROR_INVALID_FUNCTION, ERROR_INVALID_HANDLE, ERROR_NOT_SUPPORTED,
};
use windows_sys::Win32::Storage::FileSystem::{
    REPLACEFILE_IGNORE_MERGE_ERRORS, REPLACEFILE_WRITE_THROUGH,
};

use crate::config::Config;
use crate::errors::{InteropError, Result};
use crate::ioctl::{
    self, DiskExtent, DiskGeometryEx, DriveInfo, DriveLayout, DriveLayoutHeader, GrowthPolicy,
    IoControlCode, PartitionInformationEx, VolumeDiskExtents, DEFAULT_MAX_ATTEMPTS,
};
use crate::native::{
    FixedLayout, NativeApi, OpenRequest, SafeBuffer, SafeHandle, SecurityTarget,
    TransactionContext, ACCESS_SYSTEM_SECURITY,
};
use crate::path::{self, ExtendedPath, PathFormat};
use crate::security::{SecurityDescriptor, SecurityInformation};
use crate::translate::translate;

/// Options shared by every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationOptions<'t> {
    pub transaction: Option<&'t TransactionContext>,
    pub format: PathFormat,
}

impl<'t> OperationOptions<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(mut self, transaction: &'t TransactionContext) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn with_format(mut self, format: PathFormat) -> Self {
        self.format = format;
        self
    }
}

/// How a device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceAccess {
    /// Zero access; enough for the metadata queries.
    #[default]
    Query,
    /// Read/write; physical drives require elevation.
    ReadWrite,
}

impl DeviceAccess {
    fn request(self) -> OpenRequest {
        match self {
            DeviceAccess::Query => OpenRequest::device_query(),
            DeviceAccess::ReadWrite => OpenRequest::device_read_write(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOptions {
    pub ignore_merge_errors: bool,
}

impl ReplaceOptions {
    /// Write-through is always requested.
    pub fn flags(self) -> u32 {
        let mut flags = REPLACEFILE_WRITE_THROUGH;
        if self.ignore_merge_errors {
            flags |= REPLACEFILE_IGNORE_MERGE_ERRORS;
        }
        flags
    }
}

pub struct Dispatcher<A: NativeApi> {
    api: A,
    max_attempts: u32,
    initial_size: Option<usize>,
}

#[cfg(windows)]
impl Dispatcher<crate::native::Win32Api> {
    /// Dispatcher over the real OS.
    pub fn system() -> Self {
        Self::new(crate::native::Win32Api)
    }
}

impl<A: NativeApi> Dispatcher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_size: None,
        }
    }

    pub fn from_config(api: A, config: &Config) -> Self {
        let mut d = Self::new(api).with_max_attempts(config.max_attempts);
        d.initial_size = config.initial_buffer_size;
        d
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override every structure's initial buffer guess.
    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = Some(initial_size);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn policy(&self, header_size: usize) -> GrowthPolicy {
        let policy = GrowthPolicy::for_header(header_size).with_max_attempts(self.max_attempts);
        match self.initial_size {
            Some(size) => policy.with_initial_size(size),
            None => policy,
        }
    }

    pub fn resolve(&self, path: &str, options: &OperationOptions<'_>) -> Result<ExtendedPath> {
        path::resolve(path, options.format, options.transaction.is_some())
    }

    fn open_resolved(
        &self,
        path: &ExtendedPath,
        request: &OpenRequest,
        transaction: Option<&TransactionContext>,
    ) -> Result<SafeHandle<'_>> {
        let tx = TransactionContext::parameter_for(transaction);
        let raw = self
            .api
            .open_handle(path, request, tx)
            .map_err(|code| translate(code, path.as_str(), None))?;
        if raw.is_sentinel() {
            return Err(translate(ERROR_INVALID_HANDLE, path.as_str(), None));
        }
        debug!(
            path = %path,
            handle = raw.0,
            access = request.access,
            transacted = transaction.is_some(),
            "handle opened"
        );
        Ok(SafeHandle::new(&self.api, raw, path.as_str()))
    }

    /// Open a file or directory.
    pub fn open(
        &self,
        path: &str,
        request: &OpenRequest,
        options: &OperationOptions<'_>,
    ) -> Result<SafeHandle<'_>> {
        let resolved = self.resolve(path, options)?;
        self.open_resolved(&resolved, request, options.transaction)
    }

    /// Open a drive, volume or physical disk (see `path::device_path`).
    pub fn open_device(&self, device: &str, access: DeviceAccess) -> Result<SafeHandle<'_>> {
        let resolved = path::device_path(device)?;
        self.open_resolved(&resolved, &access.request(), None)
    }

    /// Growable device-control query. `header_size` is the fixed head of the
    /// expected structure and seeds the initial guess.
    pub fn query(
        &self,
        handle: &SafeHandle<'_>,
        code: IoControlCode,
        input: Option<&[u8]>,
        header_size: usize,
    ) -> Result<SafeBuffer> {
        ioctl::invoke(handle, code, input, self.policy(header_size))
    }

    fn disk_geometry_on(&self, handle: &SafeHandle<'_>) -> Result<DiskGeometryEx> {
        let buffer = self.query(
            handle,
            IoControlCode::DiskGetDriveGeometryEx,
            None,
            DiskGeometryEx::SIZE,
        )?;
        buffer.read_struct(0)
    }

    fn drive_layout_on(&self, handle: &SafeHandle<'_>) -> Result<DriveLayout> {
        let buffer = self.query(
            handle,
            IoControlCode::DiskGetDriveLayoutEx,
            None,
            DriveLayoutHeader::SIZE,
        )?;
        DriveLayout::from_buffer(&buffer)
    }

    fn partition_info_on(&self, handle: &SafeHandle<'_>) -> Result<PartitionInformationEx> {
        let buffer = self.query(
            handle,
            IoControlCode::DiskGetPartitionInfoEx,
            None,
            PartitionInformationEx::SIZE,
        )?;
        buffer.read_struct(0)
    }

    fn volume_disk_extents_on(&self, handle: &SafeHandle<'_>) -> Result<VolumeDiskExtents> {
        let buffer = self.query(
            handle,
            IoControlCode::VolumeGetVolumeDiskExtents,
            None,
            VolumeDiskExtents::HEADER_SIZE + DiskExtent::SIZE,
        )?;
        VolumeDiskExtents::from_buffer(&buffer)
    }

    pub fn get_disk_geometry(&self, device: &str) -> Result<DiskGeometryEx> {
        let handle = self.open_device(device, DeviceAccess::Query)?;
        self.disk_geometry_on(&handle)
    }

    pub fn get_drive_layout(&self, device: &str) -> Result<DriveLayout> {
        let handle = self.open_device(device, DeviceAccess::Query)?;
        self.drive_layout_on(&handle)
    }

    pub fn get_partition_info(&self, device: &str) -> Result<PartitionInformationEx> {
        let handle = self.open_device(device, DeviceAccess::Query)?;
        self.partition_info_on(&handle)
    }

    pub fn get_volume_disk_extents(&self, volume: &str) -> Result<VolumeDiskExtents> {
        let handle = self.open_device(volume, DeviceAccess::Query)?;
        self.volume_disk_extents_on(&handle)
    }

    /// All four structures over one handle. A structure the device does not
    /// answer (invalid function / not supported) is `None`; anything else fails
    /// the whole call.
    pub fn get_drive_info(&self, device: &str, access: DeviceAccess) -> Result<DriveInfo> {
        let handle = self.open_device(device, access)?;
        Ok(DriveInfo {
            device: handle.label().to_string(),
            geometry: unsupported_as_none(self.disk_geometry_on(&handle))?,
            layout: unsupported_as_none(self.drive_layout_on(&handle))?,
            partition: unsupported_as_none(self.partition_info_on(&handle))?,
            extents: unsupported_as_none(self.volume_disk_extents_on(&handle))?,
        })
    }

    /// Replace `destination`'s content with `source`, optionally keeping the
    /// old content at `backup`. Errors name `source` first.
    pub fn replace_file(
        &self,
        source: &str,
        destination: &str,
        backup: Option<&str>,
        replace: ReplaceOptions,
        options: &OperationOptions<'_>,
    ) -> Result<()> {
        let source = self.resolve(source, options)?;
        let destination = self.resolve(destination, options)?;
        let backup = backup.map(|b| self.resolve(b, options)).transpose()?;

        // The OS has no transacted ReplaceFile.
        if options.transaction.is_some() {
            return Err(InteropError::UnknownNative {
                code: ERROR_NOT_SUPPORTED,
                path: source.into_string(),
                other: Some(destination.into_string()),
            });
        }

        let flags = replace.flags();
        debug!(
            source = %source,
            destination = %destination,
            backup = backup.as_ref().map(|b| b.as_str()),
            flags,
            "replace file"
        );
        self.api
            .replace_file(&destination, &source, backup.as_ref(), flags)
            .map_err(|code| translate(code, source.as_str(), Some(destination.as_str())))
    }

    /// Read the descriptor parts selected by `information`. Under a transaction
    /// the read goes through a transacted handle so the transacted view is seen.
    pub fn get_security_descriptor(
        &self,
        path: &str,
        information: SecurityInformation,
        options: &OperationOptions<'_>,
    ) -> Result<SecurityDescriptor> {
        let resolved = self.resolve(path, options)?;
        let buffer = match options.transaction {
            Some(tx) => {
                let mut request = OpenRequest::read_control();
                if information.contains(SecurityInformation::SACL) {
                    request.access |= ACCESS_SYSTEM_SECURITY;
                }
                let handle = self.open_resolved(&resolved, &request, Some(tx))?;
                self.api.get_security_descriptor(
                    SecurityTarget::Handle(handle.raw()),
                    information.bits(),
                )
            }
            None => self
                .api
                .get_security_descriptor(SecurityTarget::Named(&resolved), information.bits()),
        }
        .map_err(|code| translate(code, resolved.as_str(), None))?;
        debug!(path = %resolved, size = buffer.len(), "security descriptor read");
        SecurityDescriptor::from_buffer(buffer)
    }
}

fn unsupported_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if matches!(e.native_code(), Some(ERROR_INVALID_FUNCTION | ERROR_NOT_SUPPORTED)) => {
            debug!(error = %e, "structure not supported by device");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
