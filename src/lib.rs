//! Core library for `ntinterop`.
//!
//! Windows native filesystem and raw-device interop:
//! - `path`: normalization into the extended-length (`\\?\`) form
//! - `native`: the OS call seam, RAII handles and bounds-checked buffers
//! - `ioctl`: growable device-control queries and the disk/volume structures
//! - `translate`: Win32 error code to `InteropError`
//! - `security`: self-relative security descriptors
//! - `dispatch`: one entry point per operation, tying the above together
//!
//! Everything above `native::NativeApi` is platform-neutral; only
//! `native::Win32Api` touches the OS and it is compiled on Windows only.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod ioctl;
pub mod native;
pub mod output;
pub mod path;
pub mod security;
pub mod translate;

pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use config::{load_config, load_config_from_xml_path, Config, LogLevel};
pub use dispatch::{DeviceAccess, Dispatcher, OperationOptions, ReplaceOptions};
pub use errors::{ErrorKind, InteropError, Result};
pub use ioctl::{GrowthPolicy, IoControlCode};
pub use native::{
    FixedLayout, NativeApi, OpenRequest, RawHandle, SafeBuffer, SafeHandle, SecurityTarget,
    TransactionContext,
};
#[cfg(windows)]
pub use native::Win32Api;
pub use path::{device_path, resolve, resolve_with_base, ExtendedPath, PathFormat, PathKind};
pub use security::{SecurityDescriptor, SecurityInformation, Sid};
