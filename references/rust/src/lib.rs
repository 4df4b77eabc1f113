//! Decoder and tile extractor for metatile containers.
//!
//! A metatile bundles up to [`SLOT_COUNT`] independently sized tiles behind a
//! fixed 532-byte header: a 4-byte magic (`META` or `METZ`), four little-endian
//! `i32` fields (`count`, `x`, `y`, `z`) and an index of 64 `(offset, size)`
//! pairs. Offsets address the payload region that starts right after the
//! header.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

mod common;
mod consts;
mod decoder;
mod extractor;
mod report;
mod sink;
#[cfg(test)]
mod test_support;

pub use common::tile_path;
pub use consts::{
    GRID_SIDE, INDEX_ENTRY_LENGTH, MAGIC, MAGIC_COMPRESSED, METATILE_HEADER_LENGTH, SLOT_COUNT,
};
pub use decoder::decode_header;
pub use extractor::{extract_tiles, extract_tiles_with};
pub use report::{ExtractionReport, SlotOutcome, WrittenTile};
pub use sink::{FileSink, MemorySink, TileSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicKind {
    /// `META`: tile payloads stored as-is.
    Plain,
    /// `METZ`: tile payloads are compressed. Recognized, never decompressed.
    Compressed,
    Unrecognized,
}

impl MagicKind {
    pub fn from_magic(magic: [u8; 4]) -> Self {
        match magic {
            MAGIC => Self::Plain,
            MAGIC_COMPRESSED => Self::Compressed,
            _ => Self::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexEntry {
    pub offset: i32,
    pub size: i32,
}

/// Decoded fixed header. Fields are carried verbatim from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaHeader {
    pub magic: [u8; 4],
    pub count: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub index: [IndexEntry; SLOT_COUNT],
}

impl MetaHeader {
    pub fn magic_kind(&self) -> MagicKind {
        MagicKind::from_magic(self.magic)
    }

    pub fn is_recognized_magic(&self) -> bool {
        self.magic_kind() != MagicKind::Unrecognized
    }

    pub fn is_compressed(&self) -> bool {
        self.magic_kind() == MagicKind::Compressed
    }

    /// Magic bytes as text, with non-UTF-8 bytes replaced.
    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }

    /// Whether `count` fits the fixed index (`0..=64`).
    pub fn count_in_range(&self) -> bool {
        usize::try_from(self.count).is_ok_and(|count| count <= SLOT_COUNT)
    }

    /// Number of slots extraction will attempt: `count` clamped to `0..=64`.
    pub fn slots_to_extract(&self) -> usize {
        usize::try_from(self.count).map_or(0, |count| count.min(SLOT_COUNT))
    }

    /// The entries selected by `count`, never reaching past the fixed index.
    pub fn valid_entries(&self) -> &[IndexEntry] {
        &self.index[..self.slots_to_extract()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetatileErrorCode {
    Truncated,
    OutOfRange,
    SinkFailed,
    CountOutOfRange,
}

impl MetatileErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Truncated => "TRUNCATED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::SinkFailed => "SINK_FAILED",
            Self::CountOutOfRange => "COUNT_OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for MetatileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("not enough data to be a metatile: got {len} bytes, header needs {required}")]
    Truncated { len: usize, required: usize },
}

impl DecodeError {
    pub fn code(&self) -> MetatileErrorCode {
        match self {
            Self::Truncated { .. } => MetatileErrorCode::Truncated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("slot {slot}: range offset={offset} size={size} is outside the {available} available bytes")]
    OutOfRange {
        slot: usize,
        offset: i32,
        size: i32,
        available: usize,
    },
    #[error("slot {slot}: could not write {}: {reason}", .path.display())]
    SinkFailed {
        slot: usize,
        path: PathBuf,
        reason: String,
    },
    #[error("count {count} is outside 0..=64")]
    CountOutOfRange { count: i32 },
}

impl ExtractionError {
    pub fn code(&self) -> MetatileErrorCode {
        match self {
            Self::OutOfRange { .. } => MetatileErrorCode::OutOfRange,
            Self::SinkFailed { .. } => MetatileErrorCode::SinkFailed,
            Self::CountOutOfRange { .. } => MetatileErrorCode::CountOutOfRange,
        }
    }

    /// Slot the error belongs to, if it is a per-slot error.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::OutOfRange { slot, .. } | Self::SinkFailed { slot, .. } => Some(*slot),
            Self::CountOutOfRange { .. } => None,
        }
    }
}

/// What to do when the sink cannot write a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkErrorPolicy {
    /// Stop at the first failed write.
    #[default]
    Abort,
    /// Record the failure and move on to the next slot.
    Continue,
}

/// Where index offsets are measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OffsetBase {
    /// Start of the payload region, right after the fixed header.
    #[default]
    Payload,
    /// Start of the file. Compatibility mode for writers that used
    /// file-relative offsets.
    File,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub on_sink_error: SinkErrorPolicy,
    pub offset_base: OffsetBase,
}
