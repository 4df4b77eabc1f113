use crate::common::read_i32_le;
use crate::consts::{
    INDEX_ENTRY_LENGTH, METATILE_HEADER_LENGTH, OFFSET_COUNT, OFFSET_INDEX, OFFSET_X, OFFSET_Y,
    OFFSET_Z, SLOT_COUNT,
};
use crate::{DecodeError, IndexEntry, MetaHeader};

/// Decodes the fixed header and index at the start of `bytes`.
///
/// All integer fields are little-endian `i32`. The magic is not checked here;
/// see [`MetaHeader::magic_kind`]. Neither `count` nor the index entries are
/// validated, extraction does that before slicing.
pub fn decode_header(bytes: &[u8]) -> Result<MetaHeader, DecodeError> {
    if bytes.len() < METATILE_HEADER_LENGTH {
        return Err(DecodeError::Truncated {
            len: bytes.len(),
            required: METATILE_HEADER_LENGTH,
        });
    }

    let mut magic = [0_u8; 4];
    magic.copy_from_slice(&bytes[0..4]);

    let mut index = [IndexEntry::default(); SLOT_COUNT];
    for (slot, entry) in index.iter_mut().enumerate() {
        let at = OFFSET_INDEX + slot * INDEX_ENTRY_LENGTH;
        *entry = IndexEntry {
            offset: read_i32_le(bytes, at)?,
            size: read_i32_le(bytes, at + 4)?,
        };
    }

    Ok(MetaHeader {
        magic,
        count: read_i32_le(bytes, OFFSET_COUNT)?,
        x: read_i32_le(bytes, OFFSET_X)?,
        y: read_i32_le(bytes, OFFSET_Y)?,
        z: read_i32_le(bytes, OFFSET_Z)?,
        index,
    })
}
