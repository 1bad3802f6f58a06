//! MBR partition table entries.

use bitflags::bitflags;
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, Unaligned};

/// Offset of the partition table within an MBR or EMBR sector.
pub const MBR_TABLE_OFFSET: usize = 446;

bitflags! {
    /// The flags byte of an MBR entry. Anything besides 0x00 or 0x80
    /// marks a corrupt or non-MBR table.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MbrEntryFlags: u8 {
        const ACTIVE = 0x80;
    }
}

/// One 16-byte MBR partition entry. CHS fields are carried but ignored;
/// `start_lba` is disk-relative in an MBR and EMBR-relative in an EMBR.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Unaligned, Immutable)]
pub struct MbrPartitionEntry {
    pub flags: u8,
    pub start_chs: [u8; 3],
    pub part_type: u8,
    pub end_chs: [u8; 3],
    pub start_lba: U32<LittleEndian>,
    pub size: U32<LittleEndian>,
}

impl MbrPartitionEntry {
    pub fn flags_valid(&self) -> bool {
        MbrEntryFlags::from_bits(self.flags).is_some()
    }

    pub fn is_active(&self) -> bool {
        self.flags == MbrEntryFlags::ACTIVE.bits()
    }

    /// DOS, Windows 95 or Linux extended partition.
    pub fn is_extended(&self) -> bool {
        matches!(self.part_type, 0x05 | 0x0f | 0x85)
    }

    pub fn is_empty(&self) -> bool {
        self.start_lba.get() == 0 || self.size.get() == 0
    }
}

/// Interpret bytes 446..510 of a sector as the four MBR entries. The
/// caller is responsible for having checked the 0xAA55 signature.
pub fn read_mbr_table(sector: &[u8]) -> Option<[MbrPartitionEntry; 4]> {
    if sector.len() < MBR_TABLE_OFFSET + 64 {
        return None;
    }
    <[MbrPartitionEntry; 4]>::read_from_bytes(&sector[MBR_TABLE_OFFSET..MBR_TABLE_OFFSET + 64])
        .ok()
}

/// A table is kept only when at least one entry spans actual sectors and
/// every flags byte is well-formed.
pub fn table_is_valid(table: &[MbrPartitionEntry; 4]) -> bool {
    table.iter().any(|entry| !entry.is_empty()) && table.iter().all(|entry| entry.flags_valid())
}
