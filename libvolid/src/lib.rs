//! Firmware volume discovery and classification.
//!
//! Turns the platform's unordered block-I/O handle list into an ordered,
//! labeled set of [`Volume`] records: filesystem kind and UUID, GPT and
//! MBR partition identity, legacy boot code, whole-disk topology and a
//! user-visible name, ready for a boot menu to present.
//!
//! The platform is reached only through the traits in [`firmware`];
//! everything else is deterministic interpretation of the bytes those
//! traits return.

pub mod bootcode;
pub mod devpath;
pub mod files;
pub mod filesystems;
pub mod firmware;
pub mod gpt;
pub mod partitions;
pub mod scan;
pub mod ui;
pub mod util;
pub mod volume;


pub use filesystems::{FsIdentity, FsType, SAMPLE_SIZE};
pub use firmware::{BlockIo, FileHandle, Firmware, FwError, Handle, MediaInfo};
pub use gpt::{EfiGuid, GptIndex, GptPartitionInfo};
pub use scan::{Context, LegacyProfile, ScanConfig, ScanError};
pub use volume::{DiskKind, VOL_UNREADABLE, Volume};
