use std::fmt;
use std::path::PathBuf;

use crate::{ExtractionError, MetaHeader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenTile {
    pub len: usize,
    pub crc32: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOutcome {
    pub slot: usize,
    pub path: PathBuf,
    pub result: Result<WrittenTile, ExtractionError>,
}

/// Per-slot results of one extraction run, in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub declared_count: i32,
    /// Set when `count` did not fit the index and was clamped.
    pub count_error: Option<ExtractionError>,
    pub outcomes: Vec<SlotOutcome>,
    /// The run stopped early on a sink failure.
    pub aborted: bool,
}

impl ExtractionReport {
    pub fn new(declared_count: i32) -> Self {
        Self {
            declared_count,
            count_error: None,
            outcomes: Vec::new(),
            aborted: false,
        }
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn extracted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .count()
    }

    pub fn bytes_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|tile| tile.len)
            .sum()
    }

    /// Per-slot errors, in slot order. Does not include `count_error`.
    pub fn failures(&self) -> impl Iterator<Item = &ExtractionError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.count_error.is_none() && !self.aborted && self.failures().next().is_none()
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.count_error {
            writeln!(f, "warning: {err}")?;
        }
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(tile) => writeln!(
                    f,
                    "[{}] {}: wrote {} bytes (crc32 {:08x})",
                    outcome.slot,
                    outcome.path.display(),
                    tile.len,
                    tile.crc32
                )?,
                Err(err) => writeln!(f, "[{}] {}: {err}", outcome.slot, outcome.path.display())?,
            }
        }
        if self.aborted {
            writeln!(f, "aborted after first write failure")?;
        }
        write!(
            f,
            "extracted {} of {} slots ({} bytes)",
            self.extracted(),
            self.attempted(),
            self.bytes_written()
        )
    }
}

impl fmt::Display for MetaHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MetaFile {{")?;
        writeln!(f, "  magic = {}", self.magic_str())?;
        writeln!(f, "  count = {}", self.count)?;
        writeln!(f, "  x = {}", self.x)?;
        writeln!(f, "  y = {}", self.y)?;
        writeln!(f, "  z = {}", self.z)?;
        writeln!(f, "  index = {{")?;
        for (slot, entry) in self.index.iter().enumerate() {
            writeln!(
                f,
                "    [{slot}] = {{ .offset = {}, .size = {} }}",
                entry.offset, entry.size
            )?;
        }
        writeln!(f, "  }}")?;
        write!(f, "}}")
    }
}
