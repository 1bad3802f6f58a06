//! GUIDs and the GPT partition-library collaborator contract.

use std::rc::Rc;

use uuid::Uuid;
use widestring::Utf16String;
use zerocopy::byteorder::{LittleEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, Unaligned};

use crate::firmware::BlockIo;

/// GUID in its firmware wire layout: three little-endian fields followed
/// by eight plain bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Unaligned, Immutable)]
pub struct EfiGuid {
    time_low: U32<LittleEndian>,
    time_mid: U16<LittleEndian>,
    time_hi_and_version: U16<LittleEndian>,
    clock_seq_hi: u8,
    clock_seq_low: u8,
    node: [u8; 6],
}

impl EfiGuid {
    pub const ZERO: EfiGuid = EfiGuid {
        time_low: U32::new(0),
        time_mid: U16::new(0),
        time_hi_and_version: U16::new(0),
        clock_seq_hi: 0,
        clock_seq_low: 0,
        node: [0u8; 6],
    };

    pub fn is_zero(&self) -> bool {
        *self == EfiGuid::ZERO
    }

    pub fn from_bytes(bytes: [u8; 16]) -> EfiGuid {
        EfiGuid::read_from_bytes(&bytes).unwrap_or(EfiGuid::ZERO)
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl Default for EfiGuid {
    fn default() -> EfiGuid {
        EfiGuid::ZERO
    }
}

impl From<EfiGuid> for Uuid {
    fn from(guid: EfiGuid) -> Uuid {
        Uuid::from_fields(
            u32::from(guid.time_low),
            u16::from(guid.time_mid),
            u16::from(guid.time_hi_and_version),
            &[
                guid.clock_seq_hi,
                guid.clock_seq_low,
                guid.node[0],
                guid.node[1],
                guid.node[2],
                guid.node[3],
                guid.node[4],
                guid.node[5],
            ],
        )
    }
}

impl From<Uuid> for EfiGuid {
    fn from(uuid: Uuid) -> EfiGuid {
        let (time_low, time_mid, time_hi, rest) = uuid.as_fields();
        EfiGuid {
            time_low: U32::new(time_low),
            time_mid: U16::new(time_mid),
            time_hi_and_version: U16::new(time_hi),
            clock_seq_hi: rest[0],
            clock_seq_low: rest[1],
            node: [rest[2], rest[3], rest[4], rest[5], rest[6], rest[7]],
        }
    }
}

/// GPT type GUID of a discoverable Linux root filesystem (x86-64).
pub const FREEDESKTOP_ROOT_GUID: EfiGuid = EfiGuid {
    time_low: U32::new(0x4f68_bce3),
    time_mid: U16::new(0xe8cd),
    time_hi_and_version: U16::new(0x4db1),
    clock_seq_hi: 0x96,
    clock_seq_low: 0xe7,
    node: [0xfb, 0xca, 0xf9, 0x84, 0xb7, 0x09],
};

/// True if the input is a conventionally formatted 36-character GUID with
/// dashes in the standard positions and hex digits elsewhere.
pub fn is_guid(input: &str) -> bool {
    let bytes = input.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(i, 8 | 13 | 18 | 23) {
            if b != b'-' {
                return false;
            }
        } else if !b.is_ascii_hexdigit() {
            return false;
        }
    }
    true
}

/// Canonical 36-character display form.
pub fn guid_as_string(guid: &EfiGuid) -> String {
    Uuid::from(*guid).hyphenated().to_string()
}

/// Parse the canonical form, accepting hex digits in either case.
/// Malformed input yields the zero GUID.
pub fn string_as_guid(input: &str) -> EfiGuid {
    if !is_guid(input) {
        return EfiGuid::ZERO;
    }
    match Uuid::try_parse(input) {
        Ok(uuid) => EfiGuid::from(uuid),
        Err(_) => EfiGuid::ZERO,
    }
}

/// Name and type of one GPT partition entry.
#[derive(Debug, Clone)]
pub struct GptPartitionInfo {
    pub name: Utf16String,
    pub type_guid: EfiGuid,
}

/// GUID-keyed lookup into the GPT tables of the scanned disks.
///
/// The scanner drives the lifecycle: `reset` at the start of a scan,
/// `scan_disk` once per block device, `find` while walking device paths.
/// Reading and validating the tables themselves is the collaborator's
/// business.
pub trait GptIndex {
    fn reset(&self);
    fn scan_disk(&self, block_io: &Rc<dyn BlockIo>);
    fn find(&self, part_guid: &EfiGuid) -> Option<GptPartitionInfo>;
}

/// Index that knows no partitions; for platforms without GPT support.
#[derive(Debug, Default)]
pub struct NullGptIndex;

impl GptIndex for NullGptIndex {
    fn reset(&self) {}

    fn scan_disk(&self, _block_io: &Rc<dyn BlockIo>) {}

    fn find(&self, _part_guid: &EfiGuid) -> Option<GptPartitionInfo> {
        None
    }
}
