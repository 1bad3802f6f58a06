//! Byte-pattern filesystem identification.
//!
//! Classifies the first [`SAMPLE_SIZE`] bytes of a volume into a
//! filesystem kind and, where the superblock carries one, a filesystem
//! UUID. The UUID is copied raw; it is only ever compared for equality
//! (RAID-mirror detection), never formatted.

use crate::firmware::MediaInfo;
use crate::util::{read_u16_le, read_u32_le};

/// Bytes probed from the start of every volume. The ReiserFS superblock
/// starts at 64 KiB, so the sample reaches past it.
pub const SAMPLE_SIZE: usize = 69_632;

const EXT_SUPER_MAGIC: u16 = 0xEF53;
const EXT4_FEATURE_INCOMPAT_EXTENTS: u32 = 0x0040;
const EXT4_FEATURE_INCOMPAT_FLEX_BG: u32 = 0x0200;
const EXT3_FEATURE_COMPAT_HAS_JOURNAL: u32 = 0x0004;

const BTRFS_SIGNATURE: &[u8; 8] = b"_BHRfS_M";
const XFS_SIGNATURE: &[u8; 4] = b"XFSB";
const NTFS_SIGNATURE: &[u8; 8] = b"NTFS    ";

const HFSPLUS_MAGIC1: u16 = 0x2B48;
const HFSPLUS_MAGIC2: u16 = 0x5848;

const BOOT_SECTOR_MAGIC: u16 = 0xAA55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsType {
    #[default]
    Unknown,
    WholeDisk,
    Fat,
    HfsPlus,
    Ext2,
    Ext3,
    Ext4,
    ReiserFs,
    Btrfs,
    Xfs,
    Iso9660,
    Ntfs,
}

impl FsType {
    /// Display name, `None` for unidentified volumes.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            FsType::Unknown => None,
            FsType::WholeDisk => Some("whole disk"),
            FsType::Fat => Some("FAT"),
            FsType::HfsPlus => Some("HFS+"),
            FsType::Ext2 => Some("ext2"),
            FsType::Ext3 => Some("ext3"),
            FsType::Ext4 => Some("ext4"),
            FsType::ReiserFs => Some("ReiserFS"),
            FsType::Btrfs => Some("Btrfs"),
            FsType::Xfs => Some("XFS"),
            FsType::Iso9660 => Some("ISO-9660"),
            FsType::Ntfs => Some("NTFS"),
        }
    }
}

/// Result of a probe: the kind plus the raw UUID (zero when the
/// filesystem carries none or the kind stores none we can reach).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsIdentity {
    pub fs_type: FsType,
    pub vol_uuid: [u8; 16],
}

/// Identify the filesystem in `buffer`, read from sector 0 of a volume.
///
/// `try_mount` is consulted only for the FAT-or-raw-device ambiguity: a
/// sector ending in `0xAA55` that is not NTFS is FAT exactly if the
/// firmware's own filesystem driver can open it; otherwise a
/// non-logical-partition medium is a bare whole-disk device.
///
/// Undersized buffers skip the checks they cannot satisfy; the probe
/// itself never fails.
pub fn identify<F>(buffer: &[u8], media: MediaInfo, try_mount: F) -> FsIdentity
where
    F: FnOnce() -> bool,
{
    let mut identity = FsIdentity::default();

    if buffer.len() >= 1124 && read_u16_le(buffer, 1024 + 56) == EXT_SUPER_MAGIC {
        let compat = read_u32_le(buffer, 1024 + 92);
        let incompat = read_u32_le(buffer, 1024 + 96);
        identity.fs_type =
            if incompat & (EXT4_FEATURE_INCOMPAT_EXTENTS | EXT4_FEATURE_INCOMPAT_FLEX_BG) != 0 {
                FsType::Ext4
            } else if compat & EXT3_FEATURE_COMPAT_HAS_JOURNAL != 0 {
                FsType::Ext3
            } else {
                FsType::Ext2
            };
        if buffer.len() >= 1024 + 104 + 16 {
            identity
                .vol_uuid
                .copy_from_slice(&buffer[1024 + 104..1024 + 120]);
        }
        return identity;
    }

    if buffer.len() >= 65_644 {
        let magic = &buffer[65_536 + 52..];
        if magic.starts_with(b"ReIsErFs")
            || magic.starts_with(b"ReIsEr2Fs")
            || magic.starts_with(b"ReIsEr3Fs")
        {
            identity.fs_type = FsType::ReiserFs;
            identity
                .vol_uuid
                .copy_from_slice(&buffer[65_536 + 84..65_536 + 100]);
            return identity;
        }
        if buffer[65_536 + 64..65_536 + 72] == *BTRFS_SIGNATURE {
            identity.fs_type = FsType::Btrfs;
            return identity;
        }
    }

    if buffer.len() >= 512 && buffer[..4] == *XFS_SIGNATURE {
        identity.fs_type = FsType::Xfs;
        return identity;
    }

    if buffer.len() >= 1026 {
        let magic = read_u16_le(buffer, 1024);
        if magic == HFSPLUS_MAGIC1 || magic == HFSPLUS_MAGIC2 {
            identity.fs_type = FsType::HfsPlus;
            return identity;
        }
    }

    if buffer.len() >= 512 && read_u16_le(buffer, 510) == BOOT_SECTOR_MAGIC {
        // NTFS, FAT and raw MBR devices all end the first sector in
        // 0xAA55. NTFS has its own signature; FAT is whatever the
        // firmware's FAT driver accepts; what remains on a non-logical
        // partition is a bare disk.
        if buffer[3..11] == *NTFS_SIGNATURE {
            identity.fs_type = FsType::Ntfs;
            identity.vol_uuid[..8].copy_from_slice(&buffer[0x48..0x50]);
        } else if try_mount() {
            identity.fs_type = FsType::Fat;
        } else if !media.logical_partition {
            identity.fs_type = FsType::WholeDisk;
        }
        return identity;
    }

    if media.block_size == 2048 {
        identity.fs_type = FsType::Iso9660;
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(block_size: u32, logical_partition: bool) -> MediaInfo {
        MediaInfo {
            media_id: 1,
            block_size,
            last_block: 0xFFFF,
            logical_partition,
        }
    }

    fn ext_superblock(incompat: u32, compat: u32, uuid: [u8; 16]) -> Vec<u8> {
        let mut buffer = vec![0u8; 4096];
        buffer[1024 + 56..1024 + 58].copy_from_slice(&EXT_SUPER_MAGIC.to_le_bytes());
        buffer[1024 + 92..1024 + 96].copy_from_slice(&compat.to_le_bytes());
        buffer[1024 + 96..1024 + 100].copy_from_slice(&incompat.to_le_bytes());
        buffer[1024 + 104..1024 + 120].copy_from_slice(&uuid);
        buffer
    }

    #[test]
    fn ext4_by_extents_feature() {
        let uuid = [
            0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
            0xff, 0x00,
        ];
        let buffer = ext_superblock(EXT4_FEATURE_INCOMPAT_EXTENTS, 0, uuid);
        let identity = identify(&buffer, media(512, true), || false);
        assert_eq!(identity.fs_type, FsType::Ext4);
        assert_eq!(identity.vol_uuid, uuid);
    }

    #[test]
    fn ext4_by_flex_bg_feature() {
        let buffer = ext_superblock(EXT4_FEATURE_INCOMPAT_FLEX_BG, 0, [1; 16]);
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Ext4
        );
    }

    #[test]
    fn ext3_by_journal_feature() {
        let buffer = ext_superblock(0, EXT3_FEATURE_COMPAT_HAS_JOURNAL, [1; 16]);
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Ext3
        );
    }

    #[test]
    fn ext2_without_features() {
        let buffer = ext_superblock(0, 0, [1; 16]);
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Ext2
        );
    }

    #[test]
    fn short_buffer_skips_ext_detection() {
        let buffer = ext_superblock(EXT4_FEATURE_INCOMPAT_EXTENTS, 0, [1; 16]);
        let identity = identify(&buffer[..1123], media(512, true), || false);
        assert_eq!(identity.fs_type, FsType::Unknown);
    }

    #[test]
    fn reiserfs_magic_and_uuid() {
        let mut buffer = vec![0u8; SAMPLE_SIZE];
        buffer[65_536 + 52..65_536 + 61].copy_from_slice(b"ReIsEr2Fs");
        buffer[65_536 + 84..65_536 + 100].copy_from_slice(&[7; 16]);
        let identity = identify(&buffer, media(512, true), || false);
        assert_eq!(identity.fs_type, FsType::ReiserFs);
        assert_eq!(identity.vol_uuid, [7; 16]);
    }

    #[test]
    fn btrfs_magic_without_uuid() {
        let mut buffer = vec![0u8; SAMPLE_SIZE];
        buffer[65_536 + 64..65_536 + 72].copy_from_slice(BTRFS_SIGNATURE);
        let identity = identify(&buffer, media(512, true), || false);
        assert_eq!(identity.fs_type, FsType::Btrfs);
        assert_eq!(identity.vol_uuid, [0; 16]);
    }

    #[test]
    fn short_buffer_skips_reiser_and_btrfs() {
        let mut buffer = vec![0u8; 65_643];
        buffer[65_536 + 64..65_536 + 72].copy_from_slice(BTRFS_SIGNATURE);
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Unknown
        );
    }

    #[test]
    fn xfs_magic_at_start() {
        let mut buffer = vec![0u8; 512];
        buffer[..4].copy_from_slice(XFS_SIGNATURE);
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Xfs
        );
    }

    #[test]
    fn hfsplus_magic() {
        let mut buffer = vec![0u8; 2048];
        buffer[1024..1026].copy_from_slice(&HFSPLUS_MAGIC1.to_le_bytes());
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::HfsPlus
        );
    }

    #[test]
    fn ntfs_signature_and_serial() {
        let mut buffer = vec![0u8; 512];
        buffer[3..11].copy_from_slice(NTFS_SIGNATURE);
        buffer[510] = 0x55;
        buffer[511] = 0xAA;
        buffer[0x48..0x50].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04]);
        let identity = identify(&buffer, media(512, true), || false);
        assert_eq!(identity.fs_type, FsType::Ntfs);
        assert_eq!(
            identity.vol_uuid,
            [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn fat_when_firmware_mounts_it() {
        let mut buffer = vec![0u8; 512];
        buffer[510] = 0x55;
        buffer[511] = 0xAA;
        assert_eq!(
            identify(&buffer, media(512, true), || true).fs_type,
            FsType::Fat
        );
    }

    #[test]
    fn whole_disk_when_unmountable_and_not_logical() {
        let mut buffer = vec![0u8; 512];
        buffer[510] = 0x55;
        buffer[511] = 0xAA;
        assert_eq!(
            identify(&buffer, media(512, false), || false).fs_type,
            FsType::WholeDisk
        );
        // an unmountable logical partition stays unknown
        assert_eq!(
            identify(&buffer, media(512, true), || false).fs_type,
            FsType::Unknown
        );
    }

    #[test]
    fn boot_signature_suppresses_iso_fallback() {
        let mut buffer = vec![0u8; 512];
        buffer[510] = 0x55;
        buffer[511] = 0xAA;
        assert_eq!(
            identify(&buffer, media(2048, true), || false).fs_type,
            FsType::Unknown
        );
    }

    #[test]
    fn iso9660_fallback_on_2048_byte_media() {
        let buffer = vec![0u8; 4096];
        assert_eq!(
            identify(&buffer, media(2048, false), || false).fs_type,
            FsType::Iso9660
        );
        assert_eq!(
            identify(&buffer, media(512, false), || false).fs_type,
            FsType::Unknown
        );
    }
}
