//! Self-relative security descriptors as returned by the retrieval primitive.
//!
//! Only the header, SIDs and ACL headers are decoded; individual ACEs are left
//! to callers (ACL manipulation is not part of this crate).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use byteorder::{ByteOrder, LittleEndian as LE};
use windows_sys::Win32::Security::{
    DACL_SECURITY_INFORMATION, GROUP_SECURITY_INFORMATION, OWNER_SECURITY_INFORMATION,
    SACL_SECURITY_INFORMATION,
};

use crate::errors::{InteropError, Result};
use crate::native::{FixedLayout, SafeBuffer};

/// Which parts of a descriptor to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SecurityInformation(u32);

impl SecurityInformation {
    pub const OWNER: Self = Self(OWNER_SECURITY_INFORMATION);
    pub const GROUP: Self = Self(GROUP_SECURITY_INFORMATION);
    pub const DACL: Self = Self(DACL_SECURITY_INFORMATION);
    /// Requires SeSecurityPrivilege.
    pub const SACL: Self = Self(SACL_SECURITY_INFORMATION);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a comma separated list such as `owner,group,dacl`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut info = Self::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            info |= match part.to_ascii_lowercase().as_str() {
                "owner" => Self::OWNER,
                "group" => Self::GROUP,
                "dacl" => Self::DACL,
                "sacl" => Self::SACL,
                _ => return None,
            };
        }
        (info != Self::empty()).then_some(info)
    }
}

impl BitOr for SecurityInformation {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SecurityInformation {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// `SECURITY_DESCRIPTOR_RELATIVE`
/// ```text
///  0  Revision  u8
///  1  Sbz1      u8
///  2  Control   u16
///  4  Owner     u32 offset
///  8  Group     u32 offset
/// 12  Sacl      u32 offset
/// 16  Dacl      u32 offset
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorHeader {
    pub revision: u8,
    pub control: u16,
    pub owner_offset: u32,
    pub group_offset: u32,
    pub sacl_offset: u32,
    pub dacl_offset: u32,
}

impl FixedLayout for DescriptorHeader {
    const SIZE: usize = 20;

    fn decode(b: &[u8]) -> Self {
        Self {
            revision: b[0],
            control: LE::read_u16(&b[2..4]),
            owner_offset: LE::read_u32(&b[4..8]),
            group_offset: LE::read_u32(&b[8..12]),
            sacl_offset: LE::read_u32(&b[12..16]),
            dacl_offset: LE::read_u32(&b[16..20]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.revision;
        out[1] = 0;
        LE::write_u16(&mut out[2..4], self.control);
        LE::write_u32(&mut out[4..8], self.owner_offset);
        LE::write_u32(&mut out[8..12], self.group_offset);
        LE::write_u32(&mut out[12..16], self.sacl_offset);
        LE::write_u32(&mut out[16..20], self.dacl_offset);
    }
}

/// `ACL` header: revision u8, Sbz1 u8, AclSize u16, AceCount u16, Sbz2 u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AclHeader {
    pub revision: u8,
    pub size: u16,
    pub ace_count: u16,
}

impl FixedLayout for AclHeader {
    const SIZE: usize = 8;

    fn decode(b: &[u8]) -> Self {
        Self {
            revision: b[0],
            size: LE::read_u16(&b[2..4]),
            ace_count: LE::read_u16(&b[4..6]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[..Self::SIZE].fill(0);
        out[0] = self.revision;
        LE::write_u16(&mut out[2..4], self.size);
        LE::write_u16(&mut out[4..6], self.ace_count);
    }
}

/// A security identifier. The 6-byte authority is big-endian, sub-authorities
/// are little-endian u32s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    pub revision: u8,
    pub authority: u64,
    pub sub_authorities: Vec<u32>,
}

impl Sid {
    pub fn new(authority: u64, sub_authorities: &[u32]) -> Self {
        Self {
            revision: 1,
            authority,
            sub_authorities: sub_authorities.to_vec(),
        }
    }

    pub fn read(buffer: &SafeBuffer, offset: usize) -> Result<Self> {
        let revision = buffer.read_u8(offset)?;
        let count = buffer.read_u8(offset + 1)? as usize;
        let authority = buffer
            .read_bytes(offset + 2, 6)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let sub_authorities = (0..count)
            .map(|i| buffer.read_u32(offset + 8 + i * 4))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }

    pub fn byte_len(&self) -> usize {
        8 + 4 * self.sub_authorities.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.byte_len()];
        out[0] = self.revision;
        out[1] = self.sub_authorities.len() as u8;
        out[2..8].copy_from_slice(&self.authority.to_be_bytes()[2..8]);
        for (i, sub) in self.sub_authorities.iter().enumerate() {
            LE::write_u32(&mut out[8 + i * 4..12 + i * 4], *sub);
        }
        out
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        // ConvertSidToStringSid switches to hex above 32 bits.
        if self.authority >= 1 << 32 {
            write!(f, "0x{:012X}", self.authority)?;
        } else {
            write!(f, "{}", self.authority)?;
        }
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

/// Owned self-relative descriptor.
#[derive(Debug)]
pub struct SecurityDescriptor {
    buffer: SafeBuffer,
    header: DescriptorHeader,
}

/// `SE_SELF_RELATIVE`
const SE_SELF_RELATIVE: u16 = 0x8000;

impl SecurityDescriptor {
    pub fn from_buffer(buffer: SafeBuffer) -> Result<Self> {
        let header = buffer.read_struct::<DescriptorHeader>(0)?;
        if header.control & SE_SELF_RELATIVE == 0 {
            return Err(InteropError::InvalidBufferAccess {
                offset: 2,
                size: 2,
                len: buffer.len(),
            });
        }
        Ok(Self { buffer, header })
    }

    pub fn header(&self) -> &DescriptorHeader {
        &self.header
    }

    pub fn revision(&self) -> u8 {
        self.header.revision
    }

    pub fn control(&self) -> u16 {
        self.header.control
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    fn sid_at(&self, offset: u32) -> Result<Option<Sid>> {
        match offset {
            0 => Ok(None),
            at => Sid::read(&self.buffer, at as usize).map(Some),
        }
    }

    fn acl_at(&self, offset: u32) -> Result<Option<AclHeader>> {
        match offset {
            0 => Ok(None),
            at => self.buffer.read_struct::<AclHeader>(at as usize).map(Some),
        }
    }

    pub fn owner(&self) -> Result<Option<Sid>> {
        self.sid_at(self.header.owner_offset)
    }

    pub fn group(&self) -> Result<Option<Sid>> {
        self.sid_at(self.header.group_offset)
    }

    pub fn dacl(&self) -> Result<Option<AclHeader>> {
        self.acl_at(self.header.dacl_offset)
    }

    pub fn sacl(&self) -> Result<Option<AclHeader>> {
        self.acl_at(self.header.sacl_offset)
    }
}
