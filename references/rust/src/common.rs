use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::consts::TILE_EXTENSION;
use crate::DecodeError;

pub(crate) fn read_i32_le(bytes: &[u8], offset: usize) -> Result<i32, DecodeError> {
    let value_bytes = bytes
        .get(offset..offset + 4)
        .ok_or(DecodeError::Truncated {
            len: bytes.len(),
            required: offset + 4,
        })?;
    let arr: [u8; 4] = value_bytes.try_into().map_err(|_| DecodeError::Truncated {
        len: bytes.len(),
        required: offset + 4,
    })?;
    Ok(i32::from_le_bytes(arr))
}

/// Output path for a slot: `<base>.<slot>.png`.
///
/// Appends to the raw `OsStr`, so bases that are not valid UTF-8 keep their
/// bytes.
pub fn tile_path(base: &Path, slot: usize) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{slot}.{TILE_EXTENSION}"));
    PathBuf::from(name)
}

/// Resolves `offset..offset + size` inside a region of `available` bytes.
///
/// Returns `None` for negative fields or a range that does not fit.
pub(crate) fn checked_range(offset: i32, size: i32, available: usize) -> Option<(usize, usize)> {
    let start = usize::try_from(offset).ok()?;
    let len = usize::try_from(size).ok()?;
    let end = start.checked_add(len)?;
    (end <= available).then_some((start, end))
}
