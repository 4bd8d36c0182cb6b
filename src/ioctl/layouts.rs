//! Fixed-layout disk and volume structures (winioctl.h), little-endian.
//!
//! Offsets are the x86/x64 layouts; 8-byte members are 8-aligned.

use byteorder::{ByteOrder, LittleEndian as LE};
use uuid::Uuid;

use crate::errors::Result;
use crate::native::{FixedLayout, SafeBuffer};

fn guid_at(b: &[u8], at: usize) -> Uuid {
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&b[at..at + 16]);
    Uuid::from_bytes_le(raw)
}

fn put_guid(out: &mut [u8], at: usize, id: &Uuid) {
    out[at..at + 16].copy_from_slice(&id.to_bytes_le());
}

/// `PARTITION_STYLE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStyle {
    Mbr,
    Gpt,
    Raw,
    Unknown(u32),
}

impl PartitionStyle {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => PartitionStyle::Mbr,
            1 => PartitionStyle::Gpt,
            2 => PartitionStyle::Raw,
            other => PartitionStyle::Unknown(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            PartitionStyle::Mbr => 0,
            PartitionStyle::Gpt => 1,
            PartitionStyle::Raw => 2,
            PartitionStyle::Unknown(v) => v,
        }
    }
}

/// `DISK_GEOMETRY`
/// ```text
///  0  Cylinders          i64
///  8  MediaType          u32
/// 12  TracksPerCylinder  u32
/// 16  SectorsPerTrack    u32
/// 20  BytesPerSector     u32
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskGeometry {
    pub cylinders: i64,
    pub media_type: u32,
    pub tracks_per_cylinder: u32,
    pub sectors_per_track: u32,
    pub bytes_per_sector: u32,
}

impl FixedLayout for DiskGeometry {
    const SIZE: usize = 24;

    fn decode(b: &[u8]) -> Self {
        Self {
            cylinders: LE::read_i64(&b[0..8]),
            media_type: LE::read_u32(&b[8..12]),
            tracks_per_cylinder: LE::read_u32(&b[12..16]),
            sectors_per_track: LE::read_u32(&b[16..20]),
            bytes_per_sector: LE::read_u32(&b[20..24]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        LE::write_i64(&mut out[0..8], self.cylinders);
        LE::write_u32(&mut out[8..12], self.media_type);
        LE::write_u32(&mut out[12..16], self.tracks_per_cylinder);
        LE::write_u32(&mut out[16..20], self.sectors_per_track);
        LE::write_u32(&mut out[20..24], self.bytes_per_sector);
    }
}

/// Fixed head of `DISK_GEOMETRY_EX`: geometry, then `DiskSize` (i64) at 24.
/// The variable partition/detection tail is not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskGeometryEx {
    pub geometry: DiskGeometry,
    pub disk_size: i64,
}

impl FixedLayout for DiskGeometryEx {
    const SIZE: usize = 32;

    fn decode(b: &[u8]) -> Self {
        Self {
            geometry: DiskGeometry::decode(&b[0..24]),
            disk_size: LE::read_i64(&b[24..32]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        self.geometry.encode(&mut out[0..24]);
        LE::write_i64(&mut out[24..32], self.disk_size);
    }
}

/// `DISK_EXTENT`: DiskNumber u32 at 0, StartingOffset i64 at 8, ExtentLength i64 at 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskExtent {
    pub disk_number: u32,
    pub starting_offset: i64,
    pub extent_length: i64,
}

impl FixedLayout for DiskExtent {
    const SIZE: usize = 24;

    fn decode(b: &[u8]) -> Self {
        Self {
            disk_number: LE::read_u32(&b[0..4]),
            starting_offset: LE::read_i64(&b[8..16]),
            extent_length: LE::read_i64(&b[16..24]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        LE::write_u32(&mut out[0..4], self.disk_number);
        out[4..8].fill(0);
        LE::write_i64(&mut out[8..16], self.starting_offset);
        LE::write_i64(&mut out[16..24], self.extent_length);
    }
}

/// `VOLUME_DISK_EXTENTS`: NumberOfDiskExtents u32, padding, then the extents at 8.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeDiskExtents {
    pub extents: Vec<DiskExtent>,
}

impl VolumeDiskExtents {
    pub const HEADER_SIZE: usize = 8;

    pub fn from_buffer(buffer: &SafeBuffer) -> Result<Self> {
        let count = buffer.read_u32(0)? as usize;
        let extents = buffer.read_array::<DiskExtent>(Self::HEADER_SIZE, count)?;
        Ok(Self { extents })
    }

    /// Serialized size for `count` extents.
    pub fn size_for(count: usize) -> usize {
        Self::HEADER_SIZE + count * DiskExtent::SIZE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::size_for(self.extents.len())];
        LE::write_u32(&mut out[0..4], self.extents.len() as u32);
        for (i, extent) in self.extents.iter().enumerate() {
            let at = Self::HEADER_SIZE + i * DiskExtent::SIZE;
            extent.encode(&mut out[at..at + DiskExtent::SIZE]);
        }
        out
    }
}

/// `PARTITION_INFORMATION_MBR`, at offset 32 of the partition entry.
/// ```text
///  0  PartitionType        u8
///  1  BootIndicator        u8
///  2  RecognizedPartition  u8
///  4  HiddenSectors        u32
///  8  PartitionId          GUID
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrPartition {
    pub partition_type: u8,
    pub boot_indicator: bool,
    pub recognized: bool,
    pub hidden_sectors: u32,
    pub partition_id: Uuid,
}

/// `PARTITION_INFORMATION_GPT`, at offset 32 of the partition entry.
/// ```text
///  0  PartitionType  GUID
/// 16  PartitionId    GUID
/// 32  Attributes     u64
/// 40  Name           [u16; 36]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptPartition {
    pub partition_type: Uuid,
    pub partition_id: Uuid,
    pub attributes: u64,
    pub name: String,
}

const GPT_NAME_UNITS: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionDetail {
    Mbr(MbrPartition),
    Gpt(GptPartition),
    None,
}

/// `PARTITION_INFORMATION_EX`
/// ```text
///  0  PartitionStyle           u32
///  8  StartingOffset           i64
/// 16  PartitionLength          i64
/// 24  PartitionNumber          u32
/// 28  RewritePartition         u8
/// 29  IsServicePartition       u8
/// 32  Mbr | Gpt                112 bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInformationEx {
    pub style: PartitionStyle,
    pub starting_offset: i64,
    pub partition_length: i64,
    pub partition_number: u32,
    pub rewrite_partition: bool,
    pub is_service_partition: bool,
    pub detail: PartitionDetail,
}

impl FixedLayout for PartitionInformationEx {
    const SIZE: usize = 144;

    fn decode(b: &[u8]) -> Self {
        let style = PartitionStyle::from_u32(LE::read_u32(&b[0..4]));
        let u = &b[32..144];
        let detail = match style {
            PartitionStyle::Mbr => PartitionDetail::Mbr(MbrPartition {
                partition_type: u[0],
                boot_indicator: u[1] != 0,
                recognized: u[2] != 0,
                hidden_sectors: LE::read_u32(&u[4..8]),
                partition_id: guid_at(u, 8),
            }),
            PartitionStyle::Gpt => {
                let units: Vec<u16> = u[40..40 + GPT_NAME_UNITS * 2]
                    .chunks_exact(2)
                    .map(LE::read_u16)
                    .take_while(|&c| c != 0)
                    .collect();
                PartitionDetail::Gpt(GptPartition {
                    partition_type: guid_at(u, 0),
                    partition_id: guid_at(u, 16),
                    attributes: LE::read_u64(&u[32..40]),
                    name: String::from_utf16_lossy(&units),
                })
            }
            _ => PartitionDetail::None,
        };
        Self {
            style,
            starting_offset: LE::read_i64(&b[8..16]),
            partition_length: LE::read_i64(&b[16..24]),
            partition_number: LE::read_u32(&b[24..28]),
            rewrite_partition: b[28] != 0,
            is_service_partition: b[29] != 0,
            detail,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[..Self::SIZE].fill(0);
        LE::write_u32(&mut out[0..4], self.style.as_u32());
        LE::write_i64(&mut out[8..16], self.starting_offset);
        LE::write_i64(&mut out[16..24], self.partition_length);
        LE::write_u32(&mut out[24..28], self.partition_number);
        out[28] = self.rewrite_partition as u8;
        out[29] = self.is_service_partition as u8;
        let u = &mut out[32..144];
        match &self.detail {
            PartitionDetail::Mbr(m) => {
                u[0] = m.partition_type;
                u[1] = m.boot_indicator as u8;
                u[2] = m.recognized as u8;
                LE::write_u32(&mut u[4..8], m.hidden_sectors);
                put_guid(u, 8, &m.partition_id);
            }
            PartitionDetail::Gpt(g) => {
                put_guid(u, 0, &g.partition_type);
                put_guid(u, 16, &g.partition_id);
                LE::write_u64(&mut u[32..40], g.attributes);
                for (i, unit) in g.name.encode_utf16().take(GPT_NAME_UNITS).enumerate() {
                    LE::write_u16(&mut u[40 + i * 2..42 + i * 2], unit);
                }
            }
            PartitionDetail::None => {}
        }
    }
}

/// Style-specific part of the drive layout header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDetail {
    Mbr {
        signature: u32,
        checksum: u32,
    },
    Gpt {
        disk_id: Uuid,
        starting_usable_offset: i64,
        usable_length: i64,
        max_partition_count: u32,
    },
    None,
}

/// Fixed head of `DRIVE_LAYOUT_INFORMATION_EX`.
/// ```text
///  0  PartitionStyle   u32
///  4  PartitionCount   u32
///  8  Mbr { Signature u32, CheckSum u32 }
///     | Gpt { DiskId GUID, StartingUsableOffset i64 @24,
///             UsableLength i64 @32, MaxPartitionCount u32 @40 }
/// 48  PartitionEntry[PartitionCount]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveLayoutHeader {
    pub style: PartitionStyle,
    pub partition_count: u32,
    pub detail: LayoutDetail,
}

impl FixedLayout for DriveLayoutHeader {
    const SIZE: usize = 48;

    fn decode(b: &[u8]) -> Self {
        let style = PartitionStyle::from_u32(LE::read_u32(&b[0..4]));
        let detail = match style {
            PartitionStyle::Mbr => LayoutDetail::Mbr {
                signature: LE::read_u32(&b[8..12]),
                checksum: LE::read_u32(&b[12..16]),
            },
            PartitionStyle::Gpt => LayoutDetail::Gpt {
                disk_id: guid_at(b, 8),
                starting_usable_offset: LE::read_i64(&b[24..32]),
                usable_length: LE::read_i64(&b[32..40]),
                max_partition_count: LE::read_u32(&b[40..44]),
            },
            _ => LayoutDetail::None,
        };
        Self {
            style,
            partition_count: LE::read_u32(&b[4..8]),
            detail,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[..Self::SIZE].fill(0);
        LE::write_u32(&mut out[0..4], self.style.as_u32());
        LE::write_u32(&mut out[4..8], self.partition_count);
        match self.detail {
            LayoutDetail::Mbr {
                signature,
                checksum,
            } => {
                LE::write_u32(&mut out[8..12], signature);
                LE::write_u32(&mut out[12..16], checksum);
            }
            LayoutDetail::Gpt {
                disk_id,
                starting_usable_offset,
                usable_length,
                max_partition_count,
            } => {
                put_guid(out, 8, &disk_id);
                LE::write_i64(&mut out[24..32], starting_usable_offset);
                LE::write_i64(&mut out[32..40], usable_length);
                LE::write_u32(&mut out[40..44], max_partition_count);
            }
            LayoutDetail::None => {}
        }
    }
}

/// Decoded `DRIVE_LAYOUT_INFORMATION_EX` with its partition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveLayout {
    pub header: DriveLayoutHeader,
    pub partitions: Vec<PartitionInformationEx>,
}

impl DriveLayout {
    pub fn from_buffer(buffer: &SafeBuffer) -> Result<Self> {
        let header = buffer.read_struct::<DriveLayoutHeader>(0)?;
        let partitions = buffer.read_array::<PartitionInformationEx>(
            DriveLayoutHeader::SIZE,
            header.partition_count as usize,
        )?;
        Ok(Self { header, partitions })
    }

    /// MBR tables always report four entries; unused ones have zero length.
    pub fn used_partitions(&self) -> impl Iterator<Item = &PartitionInformationEx> {
        self.partitions.iter().filter(|p| p.partition_length > 0)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let size = DriveLayoutHeader::SIZE + self.partitions.len() * PartitionInformationEx::SIZE;
        let mut out = vec![0u8; size];
        self.header.encode(&mut out[..DriveLayoutHeader::SIZE]);
        for (i, p) in self.partitions.iter().enumerate() {
            let at = DriveLayoutHeader::SIZE + i * PartitionInformationEx::SIZE;
            p.encode(&mut out[at..at + PartitionInformationEx::SIZE]);
        }
        out
    }
}

/// Everything the dispatcher can read about one drive over a single handle.
/// A structure the device does not support is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfo {
    pub device: String,
    pub geometry: Option<DiskGeometryEx>,
    pub layout: Option<DriveLayout>,
    pub partition: Option<PartitionInformationEx>,
    pub extents: Option<VolumeDiskExtents>,
}
