pub const GRID_SIDE: usize = 8;
pub const SLOT_COUNT: usize = GRID_SIDE * GRID_SIDE;
pub const INDEX_ENTRY_LENGTH: usize = 8;
pub const METATILE_HEADER_LENGTH: usize = OFFSET_INDEX + SLOT_COUNT * INDEX_ENTRY_LENGTH;

pub const MAGIC: [u8; 4] = *b"META";
pub const MAGIC_COMPRESSED: [u8; 4] = *b"METZ";

pub(crate) const OFFSET_COUNT: usize = 4;
pub(crate) const OFFSET_X: usize = 8;
pub(crate) const OFFSET_Y: usize = 12;
pub(crate) const OFFSET_Z: usize = 16;
pub(crate) const OFFSET_INDEX: usize = 20;

pub(crate) const TILE_EXTENSION: &str = "png";
