use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for extracted tiles.
///
/// `path` is the output path built by [`crate::tile_path`].
pub trait TileSink {
    fn write_tile(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

impl<F> TileSink for F
where
    F: FnMut(&Path, &[u8]) -> io::Result<()>,
{
    fn write_tile(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self(path, bytes)
    }
}

/// Writes each tile to a file at `path`, replacing any existing file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl TileSink for FileSink {
    fn write_tile(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.flush()
    }
}

/// Keeps tiles in memory in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    tiles: Vec<(PathBuf, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[(PathBuf, Vec<u8>)] {
        &self.tiles
    }

    pub fn into_tiles(self) -> Vec<(PathBuf, Vec<u8>)> {
        self.tiles
    }
}

impl TileSink for MemorySink {
    fn write_tile(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.tiles.push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }
}
