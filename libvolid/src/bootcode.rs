//! Legacy boot-sector identification.
//!
//! Inspects the boot sector of a volume for BIOS-era boot loaders and
//! reports which operating system family wrote it, so the menu can label
//! and badge legacy-bootable volumes. Also snapshots the MBR partition
//! table when the sector carries a plausible one.

use crate::partitions::{MbrPartitionEntry, read_mbr_table, table_is_valid};
use crate::util::{find_bytes, read_u16_le, read_u32_le};

const BOOT_SECTOR_MAGIC: u16 = 0xAA55;
const SECTOR_SIZE: usize = 512;

/// What the boot-sector probe concluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootcodeScan {
    /// The sector carries the 0xAA55 signature with real code in front of
    /// it. Media-level checks may still veto bootability later.
    pub bootable: bool,
    pub has_boot_code: bool,
    pub os_name: Option<&'static str>,
    pub os_icon_name: Option<&'static str>,
    pub mbr_table: Option<[MbrPartitionEntry; 4]>,
}

struct BootSignature {
    os_name: &'static str,
    os_icon_name: &'static str,
    matches: fn(&[u8]) -> bool,
}

fn sig_linux(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && (buffer[2..6] == *b"LILO"
            || buffer[6..10] == *b"LILO"
            || buffer[3..11] == *b"SYSLINUX"
            || find_bytes(&buffer[..SECTOR_SIZE], b"ISOLINUX").is_some())
}

fn sig_grub(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && find_bytes(&buffer[..SECTOR_SIZE], b"Geom\0Hard Disk\0Read\0 Error").is_some()
}

fn sig_freebsd_boot0(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && ((read_u32_le(buffer, 502) == 0
            && read_u32_le(buffer, 506) == 50_000
            && read_u16_le(buffer, 510) == BOOT_SECTOR_MAGIC)
            || find_bytes(&buffer[..SECTOR_SIZE], b"Starting the BTX loader").is_some())
}

fn sig_freebsd_boot1(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && read_u16_le(buffer, 510) == BOOT_SECTOR_MAGIC
        && find_bytes(&buffer[..SECTOR_SIZE], b"Boot loader too large").is_some()
        && find_bytes(&buffer[..SECTOR_SIZE], b"I/O error loading boot loader").is_some()
}

fn sig_openbsd(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && (find_bytes(&buffer[..SECTOR_SIZE], b"!Loading").is_some()
            || find_bytes(&buffer[..SECTOR_SIZE], b"/cdboot\0/CDBOOT\0").is_some())
}

fn sig_netbsd(buffer: &[u8]) -> bool {
    (buffer.len() >= SECTOR_SIZE
        && find_bytes(&buffer[..SECTOR_SIZE], b"Not a bootxx image").is_some())
        || (buffer.len() >= 1032 && read_u32_le(buffer, 1028) == 0x7886_b6d1)
}

fn sig_ntldr(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE && find_bytes(&buffer[..SECTOR_SIZE], b"NTLDR").is_some()
}

fn sig_bootmgr(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE && find_bytes(&buffer[..SECTOR_SIZE], b"BOOTMGR").is_some()
}

fn sig_freedos(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && (find_bytes(&buffer[..SECTOR_SIZE], b"CPUBOOT SYS").is_some()
            || find_bytes(&buffer[..SECTOR_SIZE], b"KERNEL  SYS").is_some())
}

fn sig_ecomstation(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && (find_bytes(&buffer[..SECTOR_SIZE], b"OS2LDR").is_some()
            || find_bytes(&buffer[..SECTOR_SIZE], b"OS2BOOT").is_some())
}

fn sig_beos(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE && find_bytes(&buffer[..SECTOR_SIZE], b"Be Boot Loader").is_some()
}

fn sig_zeta(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE && find_bytes(&buffer[..SECTOR_SIZE], b"yT Boot Loader").is_some()
}

fn sig_haiku(buffer: &[u8]) -> bool {
    buffer.len() >= SECTOR_SIZE
        && (find_bytes(&buffer[..SECTOR_SIZE], b"\x04beos\x06system\x05zbeos").is_some()
            || find_bytes(&buffer[..SECTOR_SIZE], b"\x06system\x0chaiku_loader").is_some())
}

// Order matters: the first matching signature wins.
static BOOT_SIGNATURES: &[BootSignature] = &[
    BootSignature {
        os_name: "Linux",
        os_icon_name: "linux",
        matches: sig_linux,
    },
    BootSignature {
        os_name: "Linux",
        os_icon_name: "grub,linux",
        matches: sig_grub,
    },
    BootSignature {
        os_name: "FreeBSD",
        os_icon_name: "freebsd",
        matches: sig_freebsd_boot0,
    },
    BootSignature {
        os_name: "FreeBSD",
        os_icon_name: "freebsd",
        matches: sig_freebsd_boot1,
    },
    BootSignature {
        os_name: "OpenBSD",
        os_icon_name: "openbsd",
        matches: sig_openbsd,
    },
    BootSignature {
        os_name: "NetBSD",
        os_icon_name: "netbsd",
        matches: sig_netbsd,
    },
    BootSignature {
        os_name: "Windows",
        os_icon_name: "win",
        matches: sig_ntldr,
    },
    BootSignature {
        os_name: "Windows",
        os_icon_name: "win8,win",
        matches: sig_bootmgr,
    },
    BootSignature {
        os_name: "FreeDOS",
        os_icon_name: "freedos",
        matches: sig_freedos,
    },
    BootSignature {
        os_name: "eComStation",
        os_icon_name: "ecomstation",
        matches: sig_ecomstation,
    },
    BootSignature {
        os_name: "BeOS",
        os_icon_name: "beos",
        matches: sig_beos,
    },
    BootSignature {
        os_name: "ZETA",
        os_icon_name: "zeta,beos",
        matches: sig_zeta,
    },
    BootSignature {
        os_name: "Haiku",
        os_icon_name: "haiku,beos",
        matches: sig_haiku,
    },
];

// Text left behind by FAT formatters in placeholder boot sectors
// (newfs_msdos, mkdosfs, Windows format).
static DUMMY_SECTOR_TEXTS: &[&[u8]] = &[
    b"Non-system disk",
    b"This is not a bootable disk",
    b"Press any key to restart",
];

/// Classify the boot sector at the start of `buffer`.
pub fn scan_bootcode(buffer: &[u8]) -> BootcodeScan {
    let mut scan = BootcodeScan::default();
    if buffer.len() < SECTOR_SIZE {
        return scan;
    }

    let signature = read_u16_le(buffer, 510);
    if signature == BOOT_SECTOR_MAGIC
        && buffer[0] != 0
        && find_bytes(&buffer[..SECTOR_SIZE], b"EXFAT").is_none()
    {
        scan.bootable = true;
        scan.has_boot_code = true;
    }

    for boot_signature in BOOT_SIGNATURES {
        if (boot_signature.matches)(buffer) {
            scan.has_boot_code = true;
            scan.os_name = Some(boot_signature.os_name);
            scan.os_icon_name = Some(boot_signature.os_icon_name);
            break;
        }
    }

    log::trace!(
        "boot code detection: {} {} ({})",
        if scan.has_boot_code {
            "bootable"
        } else {
            "non-bootable"
        },
        scan.os_name.unwrap_or("-"),
        scan.os_icon_name.unwrap_or("-"),
    );

    for text in DUMMY_SECTOR_TEXTS {
        if find_bytes(&buffer[..SECTOR_SIZE], text).is_some() {
            scan.has_boot_code = false;
        }
    }

    if signature == BOOT_SECTOR_MAGIC {
        if let Some(table) = read_mbr_table(&buffer[..SECTOR_SIZE]) {
            if table_is_valid(&table) {
                scan.mbr_table = Some(table);
            }
        }
    }

    scan
}
