//! UTF-16 path and string utilities.
//!
//! Firmware speaks UCS-2, so everything here works on `Utf16Str` code
//! units. Path separators are normalized to backslashes; comparisons are
//! ASCII case-insensitive, matching the collation behavior of the
//! firmware's own string services.

use widestring::{Utf16Str, Utf16String};

const FORWARD_SLASH: u16 = b'/' as u16;
const BACKSLASH: u16 = b'\\' as u16;
const COMMA: u16 = b',' as u16;
const COLON: u16 = b':' as u16;
const DOT: u16 = b'.' as u16;
const SPACE: u16 = b' ' as u16;

const EFI_EXTENSION: [u16; 4] = [DOT, b'e' as u16, b'f' as u16, b'i' as u16];

fn from_units(units: &[u16]) -> Utf16String {
    Utf16String::from_slice_lossy(units).into_owned()
}

/// Encode a Rust string for the firmware boundary.
pub fn utf16(text: &str) -> Utf16String {
    let units: Vec<u16> = text.encode_utf16().collect();
    from_units(&units)
}

pub(crate) fn to_lower_unit(unit: u16) -> u16 {
    if (b'A' as u16..=b'Z' as u16).contains(&unit) {
        unit + 0x20
    } else {
        unit
    }
}

fn eq_units_ci(a: &[u16], b: &[u16]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(&x, &y)| to_lower_unit(x) == to_lower_unit(y))
}

pub(crate) fn read_u16_le(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

pub(crate) fn read_u32_le(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Find `needle` in `haystack`, returning the offset of the first match.
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Normalize a pathname: forward slashes become backslashes, duplicate
/// separators collapse, leading and trailing separators are removed. A
/// path referring to root comes back as `"\"` since some firmware chokes
/// without it. Idempotent.
pub fn clean_path_slashes(path: &Utf16Str) -> Utf16String {
    let mut out: Vec<u16> = Vec::with_capacity(path.len() + 1);
    let mut last_was_slash = false;
    for &unit in path.as_slice() {
        if unit == FORWARD_SLASH || unit == BACKSLASH {
            if !last_was_slash && !out.is_empty() {
                out.push(BACKSLASH);
            }
            last_was_slash = true;
        } else {
            out.push(unit);
            last_was_slash = false;
        }
    }
    if out.last() == Some(&BACKSLASH) {
        out.pop();
    }
    if out.is_empty() {
        out.push(BACKSLASH);
    }
    from_units(&out)
}

/// Split a textual device path into device and filename components at the
/// last `)`. When there is no device component both halves are the whole
/// input.
pub fn split_device_string(in_string: &Utf16Str) -> (Utf16String, Utf16String) {
    let units = in_string.as_slice();
    for i in (0..units.len()).rev() {
        if units[i] == b')' as u16 {
            let device = from_units(&units[..=i]);
            let file = clean_path_slashes(&from_units(&units[i + 1..]));
            return (device, file);
        }
    }
    (in_string.to_owned(), in_string.to_owned())
}

/// Filename portion of a path, without any directory part.
pub fn basename(path: &Utf16Str) -> Utf16String {
    let units = path.as_slice();
    for i in (0..units.len()).rev() {
        if units[i] == BACKSLASH || units[i] == FORWARD_SLASH {
            return from_units(&units[i + 1..]);
        }
    }
    path.to_owned()
}

/// Remove a trailing `.efi`, case-insensitively. Filenames without the
/// extension come back unchanged.
pub fn strip_efi_extension(file_name: &Utf16Str) -> Utf16String {
    let units = file_name.as_slice();
    if units.len() >= 4 && eq_units_ci(&units[units.len() - 4..], &EFI_EXTENSION) {
        from_units(&units[..units.len() - 4])
    } else {
        file_name.to_owned()
    }
}

/// Extension from the final dot onwards, lowercased; empty when the
/// filename has no dot.
pub fn find_extension(path: &Utf16Str) -> Utf16String {
    let units = path.as_slice();
    for i in (0..units.len()).rev() {
        match units[i] {
            DOT => {
                let lowered: Vec<u16> = units[i..].iter().map(|&u| to_lower_unit(u)).collect();
                return from_units(&lowered);
            }
            BACKSLASH | FORWARD_SLASH => break,
            _ => {}
        }
    }
    Utf16String::new()
}

/// Final directory component of a backslash-separated path: for
/// `EFI\foo\bar.efi` this is `foo`.
pub fn find_last_dir_name(path: &Utf16Str) -> Option<Utf16String> {
    let units = path.as_slice();
    let mut start = 0usize;
    let mut end = 0usize;
    for (i, &unit) in units.iter().enumerate() {
        if unit == BACKSLASH {
            start = end;
            end = i;
        }
    }
    if end == 0 {
        return None;
    }
    let mut from = start;
    while from < units.len() && units[from] == BACKSLASH {
        from += 1;
    }
    if end > from {
        Some(from_units(&units[from..end]))
    } else {
        None
    }
}

/// Directory portion of a pathname: for `EFI\foo\bar.efi` this is
/// `EFI\foo`. Empty when the path has no separator.
pub fn find_path(full_path: &Utf16Str) -> Utf16String {
    let units = full_path.as_slice();
    let mut last = 0usize;
    for (i, &unit) in units.iter().enumerate() {
        if unit == BACKSLASH {
            last = i;
        }
    }
    from_units(&units[..last])
}

/// All digits in the input, including intervening non-digit characters:
/// `foo-3.3.4-7.img` yields `3.3.4-7`.
pub fn find_numbers(in_string: &Utf16Str) -> Option<Utf16String> {
    let units = in_string.as_slice();
    let mut start = units.len();
    let mut end = 0usize;
    for (i, &unit) in units.iter().enumerate() {
        if (b'0' as u16..=b'9' as u16).contains(&unit) {
            if start > i {
                start = i;
            }
            if end < i {
                end = i;
            }
        }
    }
    if end == 0 {
        return None;
    }
    Some(from_units(&units[start..=end]))
}

/// Element number `index` (from 0) of a comma-delimited list.
pub fn find_comma_delimited(in_string: &Utf16Str, index: usize) -> Option<Utf16String> {
    let units = in_string.as_slice();
    let mut remaining = index;
    let mut start = 0usize;
    let mut cur = 0usize;
    while remaining > 0 && cur < units.len() {
        if units[cur] == COMMA {
            remaining -= 1;
            start = cur + 1;
        }
        cur += 1;
    }
    while cur < units.len() && units[cur] != COMMA {
        cur += 1;
    }
    if remaining == 0 {
        Some(from_units(&units[start..cur]))
    } else {
        None
    }
}

/// Position of `small` within `big`, case-sensitively.
pub fn find_substring(small: &Utf16Str, big: &Utf16Str) -> Option<usize> {
    let s = small.as_slice();
    let b = big.as_slice();
    if s.is_empty() || b.is_empty() || s.len() > b.len() {
        return None;
    }
    b.windows(s.len()).position(|w| w == s)
}

/// Case-insensitive string equality. Some firmware ships a broken
/// case-insensitive compare, so this never delegates to it.
pub fn stri_eq(first: &Utf16Str, second: &Utf16Str) -> bool {
    eq_units_ci(first.as_slice(), second.as_slice())
}

/// Case-insensitive substring test; an empty needle always matches.
pub fn stri_contains(small: &Utf16Str, big: &Utf16Str) -> bool {
    let s = small.as_slice();
    let b = big.as_slice();
    if s.is_empty() {
        return true;
    }
    if s.len() > b.len() {
        return false;
    }
    b.windows(s.len()).any(|w| eq_units_ci(w, s))
}

/// ASCII-lowercased copy.
pub fn to_lower(in_string: &Utf16Str) -> Utf16String {
    let lowered: Vec<u16> = in_string.as_slice().iter().map(|&u| to_lower_unit(u)).collect();
    from_units(&lowered)
}

/// Restrict a string to `limit` code units: runs of two or more spaces
/// collapse to one (a run reaching the end is dropped entirely), then the
/// string is truncated. Returns `true` if anything changed.
pub fn limit_string_length(the_string: &mut Utf16String, limit: usize) -> bool {
    let units = the_string.as_slice().to_vec();
    let mut out: Vec<u16> = Vec::with_capacity(units.len());
    let mut changed = false;
    let mut i = 0usize;
    while i < units.len() {
        out.push(units[i]);
        if units[i] == SPACE {
            let mut j = i + 1;
            while j < units.len() && units[j] == SPACE {
                j += 1;
                changed = true;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    let trailing = units.iter().rev().take_while(|&&u| u == SPACE).count();
    if trailing >= 2 {
        while out.last() == Some(&SPACE) {
            out.pop();
        }
        changed = true;
    }
    if out.len() > limit {
        out.truncate(limit);
        changed = true;
    }
    if changed {
        *the_string = from_units(&out);
    }
    changed
}

/// Split `fs0:\EFI\BOOT` into `fs0` and `\EFI\BOOT`. `None` when there is
/// no volume component.
pub fn split_volume_and_filename(path: &Utf16Str) -> Option<(Utf16String, Utf16String)> {
    let units = path.as_slice();
    let pos = units.iter().position(|&u| u == COLON)?;
    Some((from_units(&units[..pos]), from_units(&units[pos + 1..])))
}

/// Decompose a pathname that may carry a volume specification into
/// volume, directory and file components; missing components are `None`.
pub fn split_path_name(
    in_path: &Utf16Str,
) -> (Option<Utf16String>, Option<Utf16String>, Option<Utf16String>) {
    let (vol_name, rest) = match split_volume_and_filename(in_path) {
        Some((vol, rest)) => (Some(vol), rest),
        None => (None, in_path.to_owned()),
    };
    let cleaned = clean_path_slashes(&rest);
    let dir = find_path(&cleaned);
    let file_units = &cleaned.as_slice()[dir.len()..];
    let file = clean_path_slashes(&from_units(file_units));
    let dir = if dir.is_empty() { None } else { Some(dir) };
    let file = if file.is_empty() { None } else { Some(file) };
    (vol_name, dir, file)
}

/// True if `small` equals one element of the comma-delimited `list`,
/// case-insensitively.
pub fn is_in(small: &Utf16Str, list: &Utf16Str) -> bool {
    let mut index = 0;
    while let Some(element) = find_comma_delimited(list, index) {
        index += 1;
        if stri_eq(&element, small) {
            return true;
        }
    }
    false
}

/// True if any element of `list` occurs as a substring of `big`,
/// case-insensitively.
pub fn is_in_substring(big: &Utf16Str, list: &Utf16Str) -> bool {
    let mut index = 0;
    while let Some(element) = find_comma_delimited(list, index) {
        index += 1;
        if element.len() <= big.len() && stri_contains(&element, big) {
            return true;
        }
    }
    false
}
