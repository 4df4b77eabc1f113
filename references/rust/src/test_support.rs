use crate::consts::{METATILE_HEADER_LENGTH, OFFSET_INDEX, SLOT_COUNT};
use crate::IndexEntry;

pub(crate) fn header_bytes(
    magic: [u8; 4],
    count: i32,
    (x, y, z): (i32, i32, i32),
    index: &[IndexEntry],
) -> Vec<u8> {
    assert!(index.len() <= SLOT_COUNT, "index holds at most 64 entries");

    let mut bytes = vec![0_u8; METATILE_HEADER_LENGTH];
    bytes[0..4].copy_from_slice(&magic);
    bytes[4..8].copy_from_slice(&count.to_le_bytes());
    bytes[8..12].copy_from_slice(&x.to_le_bytes());
    bytes[12..16].copy_from_slice(&y.to_le_bytes());
    bytes[16..20].copy_from_slice(&z.to_le_bytes());
    for (slot, entry) in index.iter().enumerate() {
        let at = OFFSET_INDEX + slot * 8;
        bytes[at..at + 4].copy_from_slice(&entry.offset.to_le_bytes());
        bytes[at + 4..at + 8].copy_from_slice(&entry.size.to_le_bytes());
    }
    bytes
}

/// Packs `tiles` back to back into a metatile with `count = tiles.len()`.
pub(crate) fn pack_tiles(magic: [u8; 4], tiles: &[&[u8]]) -> Vec<u8> {
    let mut index = Vec::with_capacity(tiles.len());
    let mut payload = Vec::new();
    for tile in tiles {
        index.push(IndexEntry {
            offset: payload.len() as i32,
            size: tile.len() as i32,
        });
        payload.extend_from_slice(tile);
    }

    let mut bytes = header_bytes(magic, tiles.len() as i32, (0, 0, 0), &index);
    bytes.extend_from_slice(&payload);
    bytes
}
