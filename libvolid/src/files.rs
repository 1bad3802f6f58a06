//! File and directory helpers over opened volume roots.

use std::rc::Rc;

use widestring::Utf16Str;

use crate::firmware::{FileHandle, FileInfo, Firmware, FwError, OpenMode};
use crate::util::find_comma_delimited;

/// Directory-entry filter, matching the firmware's attribute bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirFilter {
    All,
    DirectoriesOnly,
    FilesOnly,
}

/// True if `relative_path` can be opened for reading under `base_dir`.
pub fn file_exists(base_dir: &Rc<dyn FileHandle>, relative_path: &Utf16Str) -> bool {
    base_dir.open(relative_path, OpenMode::READ).is_ok()
}

/// Read the next entry matching `filter`, negotiating the buffer size
/// with the firmware.
///
/// Some filesystem drivers answer `BufferTooSmall` with a stale size that
/// never grows; after each such answer the buffer is doubled instead, and
/// after four size retries the read is abandoned.
pub fn dir_next_entry(
    directory: &dyn FileHandle,
    filter: DirFilter,
) -> Result<Option<FileInfo>, FwError> {
    loop {
        let mut last_size = 256usize;
        let mut buffer_size = 256usize;
        let mut iter_count = 0u32;
        let result = loop {
            match directory.read_entry(buffer_size) {
                Err(FwError::BufferTooSmall { required }) if iter_count < 4 => {
                    if required <= last_size {
                        log::warn!(
                            "filesystem driver requests bad buffer size {required} (was {last_size}), using {} instead",
                            last_size * 2
                        );
                        buffer_size = last_size * 2;
                    } else {
                        buffer_size = required;
                    }
                    last_size = buffer_size;
                    iter_count += 1;
                }
                other => break other,
            }
        };
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => return Err(err),
        };
        let Some(info) = entry else {
            return Ok(None);
        };
        let keep = match filter {
            DirFilter::All => true,
            DirFilter::DirectoriesOnly => info.is_directory(),
            DirFilter::FilesOnly => !info.is_directory(),
        };
        if keep {
            return Ok(Some(info));
        }
    }
}

/// Iterator over a directory with optional comma-delimited glob
/// filtering. Patterns are matched case-insensitively through the
/// firmware's collation capability; subdirectories always pass.
pub struct DirIter {
    dir: Option<Rc<dyn FileHandle>>,
    last_status: Result<(), FwError>,
}

impl DirIter {
    /// Open an iterator over `base_dir` itself, or over `relative_path`
    /// beneath it.
    pub fn open(base_dir: &Rc<dyn FileHandle>, relative_path: Option<&Utf16Str>) -> DirIter {
        match relative_path {
            None => DirIter {
                dir: Some(base_dir.clone()),
                last_status: Ok(()),
            },
            Some(path) => match base_dir.open(path, OpenMode::READ) {
                Ok(dir) => DirIter {
                    dir: Some(dir),
                    last_status: Ok(()),
                },
                Err(err) => DirIter {
                    dir: None,
                    last_status: Err(err),
                },
            },
        }
    }

    pub fn next(
        &mut self,
        firmware: &dyn Firmware,
        filter: DirFilter,
        file_pattern: Option<&Utf16Str>,
    ) -> Option<FileInfo> {
        if self.last_status.is_err() {
            return None;
        }
        let dir = self.dir.as_ref()?.clone();
        loop {
            let entry = match dir_next_entry(dir.as_ref(), filter) {
                Ok(entry) => entry,
                Err(err) => {
                    self.last_status = Err(err);
                    return None;
                }
            }?;
            let Some(pattern) = file_pattern else {
                return Some(entry);
            };
            if entry.is_directory() {
                return Some(entry);
            }
            let mut index = 0;
            while let Some(one_pattern) = find_comma_delimited(pattern, index) {
                index += 1;
                if firmware.metai_match(&entry.name, &one_pattern) {
                    return Some(entry);
                }
            }
        }
    }

    pub fn status(&self) -> &Result<(), FwError> {
        &self.last_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::firmware::{FileAttributes, FsInfo};
    use crate::util::utf16;

    struct FakeDir {
        entries: Vec<FileInfo>,
        pos: Cell<usize>,
        needed: usize,
        stale_report: bool,
    }

    impl FakeDir {
        fn new(names: &[(&str, bool)], needed: usize, stale_report: bool) -> FakeDir {
            FakeDir {
                entries: names
                    .iter()
                    .map(|(name, dir)| FileInfo {
                        name: utf16(name),
                        size: 0,
                        attributes: if *dir {
                            FileAttributes::DIRECTORY
                        } else {
                            FileAttributes::empty()
                        },
                    })
                    .collect(),
                pos: Cell::new(0),
                needed,
                stale_report,
            }
        }
    }

    impl FileHandle for FakeDir {
        fn open(&self, _name: &Utf16Str, _mode: OpenMode) -> Result<Rc<dyn FileHandle>, FwError> {
            Err(FwError::Unsupported)
        }

        fn read_entry(&self, buffer_size: usize) -> Result<Option<FileInfo>, FwError> {
            if buffer_size < self.needed {
                let required = if self.stale_report { 100 } else { self.needed };
                return Err(FwError::BufferTooSmall { required });
            }
            let index = self.pos.get();
            if index >= self.entries.len() {
                return Ok(None);
            }
            self.pos.set(index + 1);
            Ok(Some(self.entries[index].clone()))
        }

        fn fs_info(&self) -> Result<FsInfo, FwError> {
            Err(FwError::Unsupported)
        }
    }

    #[test]
    fn reads_entries_with_honest_sizes() {
        let dir = FakeDir::new(&[("a.efi", false), ("sub", true)], 600, false);
        let first = dir_next_entry(&dir, DirFilter::All).unwrap().unwrap();
        assert_eq!(first.name, utf16("a.efi"));
        let second = dir_next_entry(&dir, DirFilter::All).unwrap().unwrap();
        assert!(second.is_directory());
        assert!(dir_next_entry(&dir, DirFilter::All).unwrap().is_none());
    }

    #[test]
    fn doubles_past_stale_buffer_reports() {
        let dir = FakeDir::new(&[("a.efi", false)], 600, true);
        let entry = dir_next_entry(&dir, DirFilter::All).unwrap();
        assert!(entry.is_some());
    }

    #[test]
    fn gives_up_after_four_size_retries() {
        let dir = FakeDir::new(&[("a.efi", false)], 100_000, true);
        let result = dir_next_entry(&dir, DirFilter::All);
        assert!(matches!(result, Err(FwError::BufferTooSmall { .. })));
    }

    #[test]
    fn filters_files_and_directories() {
        let dir = FakeDir::new(&[("a.efi", false), ("sub", true)], 0, false);
        let entry = dir_next_entry(&dir, DirFilter::DirectoriesOnly)
            .unwrap()
            .unwrap();
        assert_eq!(entry.name, utf16("sub"));

        let dir = FakeDir::new(&[("sub", true), ("a.efi", false)], 0, false);
        let entry = dir_next_entry(&dir, DirFilter::FilesOnly).unwrap().unwrap();
        assert_eq!(entry.name, utf16("a.efi"));
    }
}
