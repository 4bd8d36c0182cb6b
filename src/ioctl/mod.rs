//! Device-control requests whose output size is only known after the call.

mod invoke;
mod layouts;

use std::fmt;

pub use invoke::{invoke, GrowthPolicy, DEFAULT_MAX_ATTEMPTS};
pub use layouts::{
    DiskExtent, DiskGeometry, DiskGeometryEx, DriveInfo, DriveLayout, DriveLayoutHeader,
    GptPartition, LayoutDetail, MbrPartition, PartitionDetail, PartitionInformationEx,
    PartitionStyle, VolumeDiskExtents,
};

const FILE_DEVICE_DISK: u32 = 0x0000_0007;
const IOCTL_VOLUME_BASE: u32 = 0x0000_0056;
const METHOD_BUFFERED: u32 = 0;
const FILE_ANY_ACCESS: u32 = 0;

/// The `CTL_CODE` macro.
pub const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// Control codes issued by the dispatcher, plus an escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoControlCode {
    /// `IOCTL_DISK_GET_DRIVE_GEOMETRY_EX`
    DiskGetDriveGeometryEx,
    /// `IOCTL_DISK_GET_PARTITION_INFO_EX`
    DiskGetPartitionInfoEx,
    /// `IOCTL_DISK_GET_DRIVE_LAYOUT_EX`
    DiskGetDriveLayoutEx,
    /// `IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS`
    VolumeGetVolumeDiskExtents,
    Raw(u32),
}

impl IoControlCode {
    pub const fn value(self) -> u32 {
        match self {
            IoControlCode::DiskGetDriveGeometryEx => {
                ctl_code(FILE_DEVICE_DISK, 0x0028, METHOD_BUFFERED, FILE_ANY_ACCESS)
            }
            IoControlCode::DiskGetPartitionInfoEx => {
                ctl_code(FILE_DEVICE_DISK, 0x0012, METHOD_BUFFERED, FILE_ANY_ACCESS)
            }
            IoControlCode::DiskGetDriveLayoutEx => {
                ctl_code(FILE_DEVICE_DISK, 0x0014, METHOD_BUFFERED, FILE_ANY_ACCESS)
            }
            IoControlCode::VolumeGetVolumeDiskExtents => {
                ctl_code(IOCTL_VOLUME_BASE, 0, METHOD_BUFFERED, FILE_ANY_ACCESS)
            }
            IoControlCode::Raw(code) => code,
        }
    }
}

impl fmt::Display for IoControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoControlCode::DiskGetDriveGeometryEx => f.write_str("IOCTL_DISK_GET_DRIVE_GEOMETRY_EX"),
            IoControlCode::DiskGetPartitionInfoEx => f.write_str("IOCTL_DISK_GET_PARTITION_INFO_EX"),
            IoControlCode::DiskGetDriveLayoutEx => f.write_str("IOCTL_DISK_GET_DRIVE_LAYOUT_EX"),
            IoControlCode::VolumeGetVolumeDiskExtents => {
                f.write_str("IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS")
            }
            IoControlCode::Raw(code) => write!(f, "0x{code:08X}"),
        }
    }
}
