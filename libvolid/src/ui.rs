//! Icon hooks for the menu layer.
//!
//! The scanner only decides *when* a badge or icon applies; decoding and
//! rendering belong to the menu. Images are opaque byte blobs here.

use std::rc::Rc;

use widestring::Utf16Str;

use crate::firmware::FileHandle;
use crate::volume::DiskKind;

/// An icon as the menu layer will consume it. Contents are opaque to the
/// scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image(pub Vec<u8>);

/// Source of volume badges and icons.
pub trait IconSource {
    /// Load a custom icon (`.VolumeBadge`, `.VolumeIcon`) from a volume
    /// root, in whatever formats the menu supports.
    fn load_volume_icon(
        &self,
        root_dir: Option<&Rc<dyn FileHandle>>,
        base_name: &Utf16Str,
    ) -> Option<Image>;

    /// Built-in badge for a disk kind.
    fn builtin_badge(&self, disk_kind: DiskKind) -> Option<Image>;
}

/// Icon source that provides nothing; volumes simply carry no images.
#[derive(Debug, Default)]
pub struct NullIconSource;

impl IconSource for NullIconSource {
    fn load_volume_icon(
        &self,
        _root_dir: Option<&Rc<dyn FileHandle>>,
        _base_name: &Utf16Str,
    ) -> Option<Image> {
        None
    }

    fn builtin_badge(&self, _disk_kind: DiskKind) -> Option<Image> {
        None
    }
}
