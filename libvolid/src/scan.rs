//! Volume scanning, topology correlation and lifecycle.
//!
//! [`Context`] owns the volume set and the weak self/discovered-root
//! references. A scan is a single pass over the firmware handle list
//! followed by a correlation pass that expands MBR extended partitions,
//! links partitions to their whole-disk device and identifies primary
//! MBR partitions by comparing boot sectors.

use std::rc::Rc;

use thiserror::Error;
use widestring::{Utf16Str, Utf16String};

use crate::bootcode::scan_bootcode;
use crate::devpath::{
    DevicePath, DevicePathNode, MEDIA_CDROM_DP, MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP,
    MEDIA_VENDOR_DP, MESSAGING_DEVICE_PATH, MSG_1394_DP, MSG_FIBRECHANNEL_DP, MSG_USB_CLASS_DP,
    MSG_USB_DP, SIGNATURE_TYPE_GUID,
};
use crate::files::file_exists;
use crate::filesystems::{self, FsType, SAMPLE_SIZE};
use crate::firmware::{FileHandle, Firmware, FwError, Handle, LoadedImage, OpenMode};
use crate::gpt::{EfiGuid, FREEDESKTOP_ROOT_GUID, GptIndex};
use crate::partitions::MbrPartitionEntry;
use crate::ui::IconSource;
use crate::util::{clean_path_slashes, find_comma_delimited, find_path, split_device_string,
    split_path_name, stri_eq, utf16};
use crate::volume::{DiskKind, VOL_UNREADABLE, Volume};

const SECTOR_SIZE: usize = 512;

/// Which legacy-boot scheme the platform supports. Boot-sector
/// classification only makes sense on the Mac/BIOS variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyProfile {
    #[default]
    None,
    Mac,
    Uefi,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanConfig {
    pub legacy_profile: LegacyProfile,
    pub hide_badges: bool,
}

/// Fatal start-up failures. Per-volume problems never surface here; they
/// degrade the affected volume and scanning continues.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no loaded-image capability on the running image: {0}")]
    LoadedImage(FwError),
    #[error("cannot open the installation volume")]
    SelfRoot,
    #[error("cannot open the installation directory: {0}")]
    SelfDir(FwError),
}

/// Process-wide scanner state: the volume set, the self references and
/// the collaborator seams, threaded through calls instead of living in
/// globals.
pub struct Context {
    firmware: Rc<dyn Firmware>,
    gpt: Rc<dyn GptIndex>,
    icons: Rc<dyn IconSource>,
    config: ScanConfig,
    volumes: Vec<Volume>,
    self_volume: Option<usize>,
    discovered_root: Option<usize>,
    self_image: Option<LoadedImage>,
    self_dir_path: Utf16String,
    self_root: Option<Rc<dyn FileHandle>>,
    self_dir: Option<Rc<dyn FileHandle>>,
}

impl Context {
    pub fn new(
        firmware: Rc<dyn Firmware>,
        gpt: Rc<dyn GptIndex>,
        icons: Rc<dyn IconSource>,
        config: ScanConfig,
    ) -> Context {
        Context {
            firmware,
            gpt,
            icons,
            config,
            volumes: Vec::new(),
            self_volume: None,
            discovered_root: None,
            self_image: None,
            self_dir_path: Utf16String::new(),
            self_root: None,
            self_dir: None,
        }
    }

    pub fn firmware(&self) -> &Rc<dyn Firmware> {
        &self.firmware
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn self_volume_index(&self) -> Option<usize> {
        self.self_volume
    }

    pub fn self_volume(&self) -> Option<&Volume> {
        self.self_volume.map(|index| &self.volumes[index])
    }

    /// The GPT-identified Linux root partition, if one was seen.
    pub fn discovered_root_index(&self) -> Option<usize> {
        self.discovered_root
    }

    pub fn discovered_root(&self) -> Option<&Volume> {
        self.discovered_root.map(|index| &self.volumes[index])
    }

    /// Directory the running image was loaded from, relative to the self
    /// volume root.
    pub fn self_dir_path(&self) -> &Utf16Str {
        &self.self_dir_path
    }

    pub fn self_dir(&self) -> Option<&Rc<dyn FileHandle>> {
        self.self_dir.as_ref()
    }

    /// Root directory of the installation volume.
    pub fn self_root(&self) -> Option<&Rc<dyn FileHandle>> {
        self.self_root.as_ref()
    }

    /// Resolve the running image and open the installation directory.
    pub fn init(&mut self, image_handle: Handle) -> Result<(), ScanError> {
        let image = self
            .firmware
            .loaded_image(image_handle)
            .map_err(ScanError::LoadedImage)?;
        let path_text = clean_path_slashes(&self.firmware.device_path_text(&image.file_path));
        let dir = find_path(&path_text);
        let (_, dir_path) = split_device_string(&dir);
        self.self_dir_path = dir_path;
        self.self_image = Some(image);
        self.finish_init()
    }

    fn finish_init(&mut self) -> Result<(), ScanError> {
        if self.self_root.is_none() {
            let device_handle = self
                .self_image
                .as_ref()
                .map(|image| image.device_handle)
                .ok_or(ScanError::SelfRoot)?;
            let root = self
                .firmware
                .open_root(device_handle)
                .map_err(|_| ScanError::SelfRoot)?;
            self.self_root = Some(root);
        }
        let root = self.self_root.clone().ok_or(ScanError::SelfRoot)?;
        let dir = root
            .open(&self.self_dir_path, OpenMode::READ)
            .map_err(ScanError::SelfDir)?;
        self.self_dir = Some(dir);
        Ok(())
    }

    /// Close every open handle before handing control to a child
    /// program.
    pub fn uninit(&mut self) {
        if let (Some(index), Some(root)) = (self.self_volume, &self.self_root) {
            if let Some(vol_root) = &self.volumes[index].root_dir {
                if Rc::ptr_eq(root, vol_root) {
                    // drop the alias; the volume owns the handle
                    self.self_root = None;
                }
            }
        }
        self.uninit_volumes();
        self.self_dir = None;
        self.self_root = None;
    }

    /// Re-resolve handles after a child program has run.
    pub fn reinit(&mut self) -> Result<(), ScanError> {
        self.reinit_volumes();
        if self.firmware.revision_major() == 1 {
            // Re-aliasing the self root from the self volume is needed on
            // Macs (firmware major revision 1) but crashes or reboots
            // many UEFI 2.x PCs, so it stays gated on the revision.
            if let Some(index) = self.self_volume {
                if let Some(root) = &self.volumes[index].root_dir {
                    self.self_root = Some(root.clone());
                }
            }
        }
        self.finish_init()
    }

    /// Enumerate every block-I/O handle into a fresh volume set, then
    /// correlate the topology. A failed handle enumeration yields an
    /// empty set; per-handle failures degrade only that volume.
    pub fn scan_volumes(&mut self) {
        self.volumes.clear();
        self.self_volume = None;
        self.discovered_root = None;
        self.gpt.reset();

        let handles = match self.firmware.block_io_handles() {
            Ok(handles) => handles,
            Err(FwError::NotFound) => return, // no filesystems; strange, but true
            Err(err) => {
                log::warn!("error while listing block devices: {err}");
                return;
            }
        };

        let mut uuid_list: Vec<[u8; 16]> = Vec::with_capacity(handles.len());
        let mut next_vol_number = 0u32;

        for handle in handles {
            let mut volume = Volume::default();
            volume.device_handle = Some(handle);
            if let Ok(block_io) = self.firmware.block_io(handle) {
                self.gpt.scan_disk(&block_io);
            }
            self.scan_volume(&mut volume);

            if volume.vol_uuid != [0u8; 16] && uuid_list.contains(&volume.vol_uuid) {
                // second half of a RAID 1 mirror; keep it but hide it
                volume.is_readable = false;
            }
            uuid_list.push(volume.vol_uuid);

            volume.vol_number = if volume.is_readable {
                let number = next_vol_number;
                next_vol_number += 1;
                number
            } else {
                VOL_UNREADABLE
            };

            let index = self.volumes.len();
            if let Some(image) = &self.self_image {
                if volume.device_handle == Some(image.device_handle) {
                    self.self_volume = Some(index);
                }
            }
            if volume.part_type_guid == FREEDESKTOP_ROOT_GUID {
                self.discovered_root = Some(index);
            }
            self.volumes.push(volume);
        }

        if self.self_image.is_some() && self.self_volume.is_none() {
            log::warn!("self volume not found");
        }

        self.correlate_volumes();
    }

    /// Gather everything knowable about one handle: block I/O, boot
    /// sector, device-path topology, root directory and name.
    fn scan_volume(&self, volume: &mut Volume) {
        let Some(handle) = volume.device_handle else {
            return;
        };
        volume.device_path = self.firmware.device_path(handle).ok();
        volume.disk_kind = DiskKind::Internal;

        match self.firmware.block_io(handle) {
            Ok(block_io) => {
                if block_io.media().block_size == 2048 {
                    volume.disk_kind = DiskKind::Optical;
                }
                volume.block_io = Some(block_io);
            }
            Err(err) => {
                log::warn!("cannot get block I/O capability: {err}");
            }
        }

        let mut bootable = self.scan_volume_bootcode(volume);

        let mut whole_disk_done = false;
        if let Some(path) = volume.device_path.clone() {
            for node in path.nodes() {
                if node.node_type == MEDIA_DEVICE_PATH {
                    self.set_part_guid_and_name(volume, &node);
                }
                if node.node_type == MESSAGING_DEVICE_PATH
                    && matches!(
                        node.sub_type,
                        MSG_USB_DP | MSG_USB_CLASS_DP | MSG_1394_DP | MSG_FIBRECHANNEL_DP
                    )
                {
                    // USB/FireWire/FC device
                    volume.disk_kind = DiskKind::External;
                }
                if node.node_type == MEDIA_DEVICE_PATH && node.sub_type == MEDIA_CDROM_DP {
                    // El Torito entry
                    volume.disk_kind = DiskKind::Optical;
                    bootable = true;
                }
                if node.node_type == MEDIA_DEVICE_PATH && node.sub_type == MEDIA_VENDOR_DP {
                    volume.is_apple_legacy = true;
                    // this handle's block I/O aliases the whole device
                    bootable = false;
                }
                if node.node_type == MESSAGING_DEVICE_PATH && !whole_disk_done {
                    whole_disk_done = true;
                    self.link_whole_disk(volume, &path, node.end_offset);
                }
            }
        }

        if !bootable {
            if volume.has_boot_code {
                log::debug!("volume considered non-bootable, but boot code is present");
            }
            volume.has_boot_code = false;
        }

        volume.root_dir = self.firmware.open_root(handle).ok();

        self.set_volume_badge_icon(volume);

        let fs_info = volume
            .root_dir
            .as_ref()
            .and_then(|root| root.fs_info().ok());
        volume.vol_name = Some(volume.derive_vol_name(fs_info.as_ref()));

        let Some(root_dir) = volume.root_dir.clone() else {
            volume.is_readable = false;
            return;
        };
        volume.is_readable = true;

        if self.config.legacy_profile == LegacyProfile::Mac
            && volume.fs_type == FsType::Ntfs
            && volume.has_boot_code
        {
            // VBR boot code on NTFS is only meaningful with the actual
            // boot files in place
            volume.has_boot_code = has_windows_bios_boot_files(volume);
        }

        if volume.vol_icon_image.is_none() {
            volume.vol_icon_image = self
                .icons
                .load_volume_icon(Some(&root_dir), &utf16(".VolumeIcon"));
        }
    }

    /// Read the first [`SAMPLE_SIZE`] bytes, identify the filesystem and,
    /// on legacy-Mac platforms, classify boot code and snapshot the MBR
    /// table. Returns the boot-sector bootable verdict.
    fn scan_volume_bootcode(&self, volume: &mut Volume) -> bool {
        volume.has_boot_code = false;
        volume.os_name = None;
        volume.os_icon_name = None;

        let Some(block_io) = volume.block_io.clone() else {
            return false;
        };
        let media = block_io.media();
        if media.block_size as usize > SAMPLE_SIZE {
            return false;
        }

        let mut buffer = vec![0u8; SAMPLE_SIZE];
        if let Err(err) = block_io.read_blocks(media.media_id, volume.block_io_offset, &mut buffer)
        {
            log::debug!("error while reading boot sector: {err}");
            return false;
        }

        let device_handle = volume.device_handle;
        let firmware = self.firmware.clone();
        let identity = filesystems::identify(&buffer, media, move || {
            device_handle.is_some_and(|handle| firmware.open_root(handle).is_ok())
        });
        volume.fs_type = identity.fs_type;
        volume.vol_uuid = identity.vol_uuid;

        if self.config.legacy_profile != LegacyProfile::Mac {
            return false;
        }

        let scan = scan_bootcode(&buffer);
        volume.has_boot_code = scan.has_boot_code;
        volume.os_name = scan.os_name;
        volume.os_icon_name = scan.os_icon_name;
        if scan.mbr_table.is_some() {
            volume.mbr_partition_table = scan.mbr_table;
        }
        scan.bootable
    }

    /// Record GPT identity from a media node and remember the discovered
    /// root partition.
    fn set_part_guid_and_name(&self, volume: &mut Volume, node: &DevicePathNode<'_>) {
        if node.sub_type != MEDIA_HARDDRIVE_DP {
            return;
        }
        let Some(hard_drive) = node.hard_drive() else {
            return;
        };
        if hard_drive.signature_type != SIGNATURE_TYPE_GUID {
            return;
        }
        volume.part_guid = EfiGuid::from_bytes(hard_drive.signature);
        if let Some(info) = self.gpt.find(&volume.part_guid) {
            volume.part_name = Some(info.name);
            volume.part_type_guid = info.type_guid;
        }
    }

    /// Synthesize the whole-disk device path (everything up to and
    /// including the first messaging node), resolve it and keep its
    /// block I/O. Failures leave the whole-disk fields unset.
    fn link_whole_disk(&self, volume: &mut Volume, path: &DevicePath, end_offset: usize) {
        let disk_path = path.prefix_through(end_offset);
        let Ok(whole_disk_handle) = self.firmware.locate_block_device(&disk_path) else {
            return;
        };
        if let Ok(whole_path) = self.firmware.device_path(whole_disk_handle) {
            volume.whole_disk_device_path = Some(whole_path);
        }
        match self.firmware.block_io(whole_disk_handle) {
            Ok(block_io) => {
                if block_io.media().block_size == 2048 {
                    volume.disk_kind = DiskKind::Optical;
                }
                volume.whole_disk_block_io = Some(block_io);
            }
            Err(_) => {
                volume.whole_disk_block_io = None;
            }
        }
    }

    fn set_volume_badge_icon(&self, volume: &mut Volume) {
        if self.config.hide_badges {
            return;
        }
        if volume.vol_badge_image.is_none() {
            volume.vol_badge_image = self
                .icons
                .load_volume_icon(volume.root_dir.as_ref(), &utf16(".VolumeBadge"));
        }
        if volume.vol_badge_image.is_none() {
            volume.vol_badge_image = self.icons.builtin_badge(volume.disk_kind);
        }
    }

    /// Second pass over the scanned set: expand extended partitions of
    /// self-whole disks, link every partition to its whole-disk volume
    /// and identify primary MBR partitions by their boot sectors.
    fn correlate_volumes(&mut self) {
        let mut index = 0;
        while index < self.volumes.len() {
            let (owns_whole_disk, mbr_table) = {
                let volume = &self.volumes[index];
                let owns = match (&volume.block_io, &volume.whole_disk_block_io) {
                    (Some(block), Some(whole)) => {
                        Rc::ptr_eq(block, whole) && volume.block_io_offset == 0
                    }
                    _ => false,
                };
                (owns, volume.mbr_partition_table)
            };

            if owns_whole_disk {
                if let Some(table) = mbr_table {
                    for entry in table.iter().filter(|entry| entry.is_extended()) {
                        self.scan_extended_partition(index, entry);
                    }
                }
            }

            self.identify_mbr_partition(index);
            index += 1;
        }
    }

    /// Find the whole-disk volume a partition belongs to, then match the
    /// partition against the disk's MBR table by size and by comparing
    /// the boot sector read through both devices.
    fn identify_mbr_partition(&mut self, index: usize) {
        let whole_index = {
            let volume = &self.volumes[index];
            match (&volume.block_io, &volume.whole_disk_block_io) {
                (Some(block), Some(whole)) if !Rc::ptr_eq(block, whole) => {
                    let mut found = None;
                    for (candidate, other) in self.volumes.iter().enumerate() {
                        if let Some(other_block) = &other.block_io {
                            if Rc::ptr_eq(other_block, whole) && other.block_io_offset == 0 {
                                found = Some(candidate);
                            }
                        }
                    }
                    found
                }
                _ => None,
            }
        };
        let Some(whole_index) = whole_index else {
            return;
        };
        let Some(table) = self.volumes[whole_index].mbr_partition_table else {
            return;
        };

        let volume = &self.volumes[index];
        let (Some(block_io), Some(whole_block_io)) =
            (volume.block_io.clone(), volume.whole_disk_block_io.clone())
        else {
            return;
        };
        let block_io_offset = volume.block_io_offset;
        let last_block = block_io.media().last_block;

        let mut matched = None;
        for (entry_index, entry) in table.iter().enumerate() {
            if u64::from(entry.size.get()) != last_block + 1 {
                continue;
            }
            let mut through_partition = [0u8; SECTOR_SIZE];
            let mut through_disk = [0u8; SECTOR_SIZE];
            if block_io
                .read_blocks(block_io.media().media_id, block_io_offset, &mut through_partition)
                .is_err()
            {
                break;
            }
            if whole_block_io
                .read_blocks(
                    whole_block_io.media().media_id,
                    u64::from(entry.start_lba.get()),
                    &mut through_disk,
                )
                .is_err()
            {
                break;
            }
            if through_partition != through_disk {
                continue;
            }
            // a blank sector would compare equal anywhere; demand some
            // actual content
            let sector_sum: u32 = through_partition.iter().map(|&b| u32::from(b)).sum();
            if sector_sum < 1000 {
                continue;
            }
            matched = Some(entry_index);
            break;
        }

        if let Some(entry_index) = matched {
            let volume = &mut self.volumes[index];
            volume.is_mbr_partition = true;
            volume.mbr_partition_index = entry_index as u32;
            if volume.vol_name.is_none() {
                volume.vol_name = Some(utf16(&format!(
                    "Partition {}",
                    entry_index + 1
                )));
            }
        }
    }

    /// Walk the EMBR chain rooted at an extended-partition entry and
    /// synthesize a volume for every logical partition found. The chain
    /// stops at a read failure, a missing signature or the last link.
    fn scan_extended_partition(&mut self, whole_index: usize, mbr_entry: &MbrPartitionEntry) {
        let (block_io, disk_kind, parent_path) = {
            let whole = &self.volumes[whole_index];
            let Some(block_io) = whole.block_io.clone() else {
                return;
            };
            (block_io, whole.disk_kind, whole.device_path.clone())
        };
        let media = block_io.media();

        let ext_base = u64::from(mbr_entry.start_lba.get());
        let mut logical_partition_index = 4u32;
        let mut current = ext_base;

        loop {
            let mut sector = [0u8; SECTOR_SIZE];
            if block_io
                .read_blocks(media.media_id, current, &mut sector)
                .is_err()
            {
                break;
            }
            if sector[510] != 0x55 || sector[511] != 0xAA {
                break;
            }
            let Some(embr_table) = crate::partitions::read_mbr_table(&sector) else {
                break;
            };

            let mut next = 0u64;
            for entry in embr_table.iter() {
                if !entry.flags_valid() || entry.is_empty() {
                    break;
                }
                if entry.is_extended() {
                    next = ext_base + u64::from(entry.start_lba.get());
                    break;
                }

                let mut volume = Volume::default();
                volume.disk_kind = disk_kind;
                volume.is_mbr_partition = true;
                volume.mbr_partition_index = logical_partition_index;
                logical_partition_index += 1;
                volume.vol_name = Some(utf16(&format!(
                    "Partition {}",
                    volume.mbr_partition_index + 1
                )));
                volume.block_io = Some(block_io.clone());
                volume.block_io_offset = current + u64::from(entry.start_lba.get());
                volume.whole_disk_block_io = Some(block_io.clone());
                volume.device_path = parent_path.clone();
                volume.whole_disk_device_path = parent_path.clone();
                volume.vol_number = VOL_UNREADABLE;

                let bootable = self.scan_volume_bootcode(&mut volume);
                if !bootable {
                    volume.has_boot_code = false;
                }
                self.set_volume_badge_icon(&mut volume);

                self.volumes.push(volume);
            }

            if next == 0 {
                break;
            }
            current = next;
        }
    }

    /// Drop every handle-derived capability. The device paths stay; they
    /// are what `reinit_volumes` resolves from.
    pub fn uninit_volumes(&mut self) {
        for volume in &mut self.volumes {
            volume.root_dir = None;
            volume.device_handle = None;
            volume.block_io = None;
            volume.whole_disk_block_io = None;
        }
    }

    /// Re-resolve every volume's handle, block I/O and root directory
    /// from its preserved device paths. Synthesized logical partitions
    /// have no handle of their own; they re-acquire the shared whole-disk
    /// block I/O instead.
    pub fn reinit_volumes(&mut self) {
        for volume in &mut self.volumes {
            if volume.block_io_offset == 0 {
                if let Some(path) = &volume.device_path {
                    match self.firmware.locate_block_device(path) {
                        Ok(handle) => {
                            volume.device_handle = Some(handle);
                            volume.block_io = self.firmware.block_io(handle).ok();
                            volume.root_dir = self.firmware.open_root(handle).ok();
                        }
                        Err(err) => {
                            log::warn!("error re-locating volume device: {err}");
                        }
                    }
                }
                if let Some(path) = &volume.whole_disk_device_path {
                    match self.firmware.locate_block_device(path) {
                        Ok(handle) => {
                            volume.whole_disk_block_io = self.firmware.block_io(handle).ok();
                        }
                        Err(err) => {
                            volume.whole_disk_block_io = None;
                            log::warn!("error re-locating whole-disk device: {err}");
                        }
                    }
                }
            } else if let Some(path) = &volume.whole_disk_device_path {
                if let Ok(handle) = self.firmware.locate_block_device(path) {
                    let block_io = self.firmware.block_io(handle).ok();
                    volume.block_io = block_io.clone();
                    volume.whole_disk_block_io = block_io;
                }
            }
        }
    }

    /// Resolve a loader device path into the volume it lives on plus the
    /// file name, by comparing textual device prefixes.
    pub fn find_volume_and_filename(
        &self,
        load_path: &DevicePath,
    ) -> Option<(usize, Utf16String)> {
        let text = self.firmware.device_path_text(load_path);
        let (device_string, loader) = split_device_string(&text);
        for (index, volume) in self.volumes.iter().enumerate() {
            let Some(path) = &volume.device_path else {
                continue;
            };
            let volume_text = self.firmware.device_path_text(path);
            let (volume_device, _) = split_device_string(&volume_text);
            if stri_eq(&device_string, &volume_device) {
                return Some((index, loader));
            }
        }
        None
    }

    /// True if the given volume/directory/filename triple names an
    /// element of the comma-delimited `list`. List elements may carry
    /// volume (`fs0:` or a name) and path components.
    pub fn filename_in(
        &self,
        volume: Option<&Volume>,
        directory: &Utf16Str,
        filename: &Utf16Str,
        list: &Utf16Str,
    ) -> bool {
        let mut index = 0;
        while let Some(element) = find_comma_delimited(list, index) {
            index += 1;
            let (target_vol, target_path, target_file) = split_path_name(&element);
            let mut found = true;
            if let Some(mut target_vol) = target_vol {
                if let Some(volume) = volume {
                    if let Some(substituted) = volume.number_to_name(&target_vol) {
                        target_vol = substituted;
                    }
                }
                match volume.and_then(|v| v.vol_name.as_ref()) {
                    Some(vol_name) if stri_eq(&target_vol, vol_name) => {}
                    _ => found = false,
                }
            }
            if let Some(target_path) = &target_path {
                if !stri_eq(target_path, directory) {
                    found = false;
                }
            }
            if let Some(target_file) = &target_file {
                if !stri_eq(target_file, filename) {
                    found = false;
                }
            }
            if found {
                return true;
            }
        }
        false
    }
}

/// NTFS volumes only legacy-boot when the Windows loader files exist.
/// Unreadable volumes get the benefit of the doubt.
fn has_windows_bios_boot_files(volume: &Volume) -> bool {
    match &volume.root_dir {
        Some(root) => {
            file_exists(root, &utf16("NTLDR"))
                || file_exists(root, &utf16("bootmgr"))
        }
        None => true,
    }
}
