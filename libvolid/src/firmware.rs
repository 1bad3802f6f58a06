//! Capability traits for the platform firmware.
//!
//! The scanner never talks to boot services directly; everything it needs
//! (block reads, handle enumeration, device paths, filesystem roots,
//! variables, collation, media ejection) goes through [`Firmware`] and the
//! per-device [`BlockIo`] and [`FileHandle`] traits. Real firmware bindings
//! and in-memory test doubles both implement them.

use std::rc::Rc;

use bitflags::bitflags;
use thiserror::Error;
use widestring::{Utf16Str, Utf16String};

use crate::devpath::DevicePath;
use crate::gpt::EfiGuid;

/// Firmware status codes surfaced to the scanner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FwError {
    #[error("not found")]
    NotFound,
    #[error("device error")]
    DeviceError,
    #[error("no media in device")]
    NoMedia,
    #[error("media changed")]
    MediaChanged,
    #[error("unsupported")]
    Unsupported,
    #[error("access denied")]
    AccessDenied,
    #[error("volume corrupted")]
    VolumeCorrupted,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("buffer too small, {required} bytes required")]
    BufferTooSmall { required: usize },
    #[error("out of resources")]
    OutOfResources,
}

/// Opaque firmware handle. Handles rotate when a child program runs; only
/// the device path a handle was resolved from is durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// Media attributes reported by a block device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub media_id: u32,
    pub block_size: u32,
    pub last_block: u64,
    pub logical_partition: bool,
}

/// Raw block access to one device or partition.
///
/// For a given handle the platform hands out one shared instance while the
/// handle stays valid; the topology correlator relies on instance identity
/// (`Rc::ptr_eq`) to match partitions to their whole-disk device.
pub trait BlockIo {
    fn media(&self) -> MediaInfo;
    fn read_blocks(&self, media_id: u32, lba: u64, buffer: &mut [u8]) -> Result<(), FwError>;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttributes: u64 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const RESERVED = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u64 {
        const READ = 0x01;
        const WRITE = 0x02;
        const CREATE = 0x8000_0000_0000_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariableAttributes: u32 {
        const NON_VOLATILE = 0x01;
        const BOOTSERVICE_ACCESS = 0x02;
        const RUNTIME_ACCESS = 0x04;
    }
}

/// One directory entry as returned by [`FileHandle::read_entry`].
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: Utf16String,
    pub size: u64,
    pub attributes: FileAttributes,
}

impl FileInfo {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }
}

/// Filesystem-level information for an opened root.
#[derive(Debug, Clone)]
pub struct FsInfo {
    pub label: Utf16String,
    pub volume_size: u64,
}

/// The running image as reported by the loaded-image capability.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub device_handle: Handle,
    pub file_path: DevicePath,
}

/// An opened file or directory. Handles close on drop.
pub trait FileHandle {
    fn open(&self, name: &Utf16Str, mode: OpenMode) -> Result<Rc<dyn FileHandle>, FwError>;

    /// Read the next directory entry using a caller-chosen buffer size.
    ///
    /// `Ok(None)` marks the end of the listing. A too-small buffer yields
    /// [`FwError::BufferTooSmall`] with the size the firmware claims to
    /// need; buggy firmware is known to report a stale, non-growing size,
    /// which [`crate::files::dir_next_entry`] works around.
    fn read_entry(&self, buffer_size: usize) -> Result<Option<FileInfo>, FwError>;

    fn fs_info(&self) -> Result<FsInfo, FwError>;
}

/// The boot-services surface the scanner consumes.
pub trait Firmware {
    /// All handles carrying the block-I/O capability, in firmware order.
    /// That order defines volume numbering and UUID-dedup priority.
    fn block_io_handles(&self) -> Result<Vec<Handle>, FwError>;

    fn block_io(&self, handle: Handle) -> Result<Rc<dyn BlockIo>, FwError>;

    fn device_path(&self, handle: Handle) -> Result<DevicePath, FwError>;

    /// Resolve the block-device handle reachable through `path`.
    fn locate_block_device(&self, path: &DevicePath) -> Result<Handle, FwError>;

    fn open_root(&self, handle: Handle) -> Result<Rc<dyn FileHandle>, FwError>;

    fn loaded_image(&self, image_handle: Handle) -> Result<LoadedImage, FwError>;

    fn device_path_text(&self, path: &DevicePath) -> Utf16String;

    /// Case-insensitive glob match through the Unicode collation capability.
    fn metai_match(&self, name: &Utf16Str, pattern: &Utf16Str) -> bool;

    fn get_variable(&self, vendor: &EfiGuid, name: &Utf16Str) -> Result<Vec<u8>, FwError>;

    fn set_variable(
        &self,
        vendor: &EfiGuid,
        name: &Utf16Str,
        data: &[u8],
        attributes: VariableAttributes,
    ) -> Result<(), FwError>;

    /// Handles exposing the removable-media eject capability.
    fn ejectable_handles(&self) -> Result<Vec<Handle>, FwError>;

    fn eject(&self, handle: Handle) -> Result<(), FwError>;

    /// Major revision of the system table, for platform quirk gating.
    fn revision_major(&self) -> u16;
}

/// Retrieve a raw firmware variable.
pub fn efivar_get_raw(
    firmware: &dyn Firmware,
    vendor: &EfiGuid,
    name: &Utf16Str,
) -> Result<Vec<u8>, FwError> {
    firmware.get_variable(vendor, name)
}

/// Set a raw firmware variable, optionally surviving reboots.
pub fn efivar_set_raw(
    firmware: &dyn Firmware,
    vendor: &EfiGuid,
    name: &Utf16Str,
    data: &[u8],
    persistent: bool,
) -> Result<(), FwError> {
    let mut attributes = VariableAttributes::BOOTSERVICE_ACCESS | VariableAttributes::RUNTIME_ACCESS;
    if persistent {
        attributes |= VariableAttributes::NON_VOLATILE;
    }
    firmware.set_variable(vendor, name, data, attributes)
}

/// Eject all removable media. Returns `true` if anything was ejected.
pub fn eject_media(firmware: &dyn Firmware) -> bool {
    let handles = match firmware.ejectable_handles() {
        Ok(handles) => handles,
        Err(_) => return false,
    };
    let mut ejected = 0;
    for handle in handles {
        if firmware.eject(handle).is_ok() {
            ejected += 1;
        }
    }
    ejected > 0
}
