//! The volume record and user-visible naming.

use core::fmt;
use std::rc::Rc;

use widestring::{Utf16Str, Utf16String};

use crate::devpath::DevicePath;
use crate::filesystems::FsType;
use crate::firmware::{BlockIo, FileHandle, FsInfo, Handle};
use crate::gpt::EfiGuid;
use crate::partitions::MbrPartitionEntry;
use crate::ui::Image;
use crate::util::{is_in, utf16};

/// `vol_number` of volumes whose root cannot be opened or whose UUID
/// collided with an earlier volume. May repeat; readable numbers never do.
pub const VOL_UNREADABLE: u32 = 999;

/// Generic GPT partition names that say nothing about the volume.
pub const IGNORE_PARTITION_NAMES: &str = "Microsoft basic data,Linux filesystem,Apple HFS/HFS+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskKind {
    #[default]
    Internal,
    External,
    Optical,
    Net,
}

/// One discovered volume: a firmware handle dressed up with everything
/// the scanner could learn about it. Owned exclusively by the scan
/// context; rebuilt from scratch on every scan.
pub struct Volume {
    /// Weak by contract: stale once a child program has run.
    pub device_handle: Option<Handle>,
    /// Durable identity; used to re-resolve the handle on reinit.
    pub device_path: Option<DevicePath>,
    pub whole_disk_device_path: Option<DevicePath>,
    pub block_io: Option<Rc<dyn BlockIo>>,
    pub whole_disk_block_io: Option<Rc<dyn BlockIo>>,
    /// LBA added to every read; non-zero only for synthesized logical
    /// partitions, which read through their parent disk's block I/O.
    pub block_io_offset: u64,
    pub root_dir: Option<Rc<dyn FileHandle>>,
    pub fs_type: FsType,
    /// Raw filesystem UUID; zero when not extractable. Compared for
    /// equality only, never formatted.
    pub vol_uuid: [u8; 16],
    pub part_guid: EfiGuid,
    pub part_type_guid: EfiGuid,
    pub part_name: Option<Utf16String>,
    pub vol_name: Option<Utf16String>,
    pub vol_number: u32,
    pub disk_kind: DiskKind,
    pub has_boot_code: bool,
    pub os_name: Option<&'static str>,
    pub os_icon_name: Option<&'static str>,
    pub is_apple_legacy: bool,
    pub is_mbr_partition: bool,
    pub mbr_partition_index: u32,
    pub mbr_partition_table: Option<[MbrPartitionEntry; 4]>,
    pub is_readable: bool,
    pub vol_badge_image: Option<Image>,
    pub vol_icon_image: Option<Image>,
}

impl Default for Volume {
    fn default() -> Volume {
        Volume {
            device_handle: None,
            device_path: None,
            whole_disk_device_path: None,
            block_io: None,
            whole_disk_block_io: None,
            block_io_offset: 0,
            root_dir: None,
            fs_type: FsType::Unknown,
            vol_uuid: [0; 16],
            part_guid: EfiGuid::ZERO,
            part_type_guid: EfiGuid::ZERO,
            part_name: None,
            vol_name: None,
            vol_number: 0,
            disk_kind: DiskKind::Internal,
            has_boot_code: false,
            os_name: None,
            os_icon_name: None,
            is_apple_legacy: false,
            is_mbr_partition: false,
            mbr_partition_index: 0,
            mbr_partition_table: None,
            is_readable: false,
            vol_badge_image: None,
            vol_icon_image: None,
        }
    }
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("vol_name", &self.vol_name)
            .field("vol_number", &self.vol_number)
            .field("fs_type", &self.fs_type)
            .field("disk_kind", &self.disk_kind)
            .field("is_readable", &self.is_readable)
            .field("block_io_offset", &self.block_io_offset)
            .field("is_mbr_partition", &self.is_mbr_partition)
            .field("mbr_partition_index", &self.mbr_partition_index)
            .field("has_boot_code", &self.has_boot_code)
            .field("os_name", &self.os_name)
            .finish_non_exhaustive()
    }
}

impl Volume {
    /// Derive the user-visible name. Preference order: the filesystem
    /// label, a non-generic GPT partition name, a synthetic
    /// size-and-type description, a bare type description, and finally
    /// `"unknown volume"`.
    pub fn derive_vol_name(&self, fs_info: Option<&FsInfo>) -> Utf16String {
        if let Some(info) = fs_info {
            if !info.label.is_empty() {
                return info.label.clone();
            }
        }

        if let Some(part_name) = &self.part_name {
            if !part_name.is_empty()
                && !is_in(part_name, &utf16(IGNORE_PARTITION_NAMES))
            {
                return part_name.clone();
            }
        }

        if let Some(info) = fs_info {
            let size = size_in_ieee_units(info.volume_size);
            return match self.fs_type.name() {
                Some(name) => utf16(&format!("{size} {name} volume")),
                None => utf16(&format!("{size} volume")),
            };
        }

        match self.fs_type.name() {
            Some(name) => utf16(&format!("{name} volume")),
            None => utf16("unknown volume"),
        }
    }

    /// If `vol_name` has the form `fs<N>` and `N` is this volume's
    /// number, substitute the volume's real name.
    pub fn number_to_name(&self, vol_name: &Utf16Str) -> Option<Utf16String> {
        let units = vol_name.as_slice();
        if units.len() < 3 || units[0] != b'f' as u16 || units[1] != b's' as u16 {
            return None;
        }
        let mut number = 0u32;
        let mut digits = 0;
        for &unit in &units[2..] {
            if !(b'0' as u16..=b'9' as u16).contains(&unit) {
                break;
            }
            number = number.wrapping_mul(10) + u32::from(unit - b'0' as u16);
            digits += 1;
        }
        if digits == 0 || number != self.vol_number {
            return None;
        }
        self.vol_name.clone()
    }
}

/// Render a byte count with IEEE-1541 binary prefixes, dividing by 1024
/// while the value exceeds 1024 or until the prefixes run out. Values
/// that stay below 1024 bytes get a `-byte` suffix.
pub fn size_in_ieee_units(size_in_bytes: u64) -> String {
    const PREFIXES: [char; 8] = [' ', 'K', 'M', 'G', 'T', 'P', 'E', 'Z'];
    let mut value = size_in_bytes;
    let mut index = 0usize;
    while value > 1024 && index < PREFIXES.len() - 1 {
        index += 1;
        value /= 1024;
    }
    if index == 0 {
        format!("{value}-byte")
    } else {
        format!("{value} {}iB", PREFIXES[index])
    }
}
