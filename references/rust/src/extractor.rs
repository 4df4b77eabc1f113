use std::path::Path;

use crc32fast::hash as crc32;
use tracing::{debug, error, warn};

use crate::common::{checked_range, tile_path};
use crate::consts::METATILE_HEADER_LENGTH;
use crate::report::{ExtractionReport, SlotOutcome, WrittenTile};
use crate::sink::TileSink;
use crate::{ExtractOptions, ExtractionError, MetaHeader, OffsetBase, SinkErrorPolicy};

/// Extracts slots `0..count` with the default options: payload-relative
/// offsets, stop at the first sink failure.
pub fn extract_tiles<B, S>(
    buffer: &[u8],
    header: &MetaHeader,
    base: &B,
    sink: &mut S,
) -> ExtractionReport
where
    B: AsRef<Path> + ?Sized,
    S: TileSink + ?Sized,
{
    extract_tiles_with(buffer, header, base, sink, ExtractOptions::default())
}

/// Extracts slots `0..count` in ascending order, naming each `<base>.<slot>.png`.
///
/// Every range is checked before it is sliced. A bad range only fails its
/// own slot. A failed write stops the run unless `options.on_sink_error` is
/// [`SinkErrorPolicy::Continue`]. At most 64 slots are attempted whatever
/// `count` says.
pub fn extract_tiles_with<B, S>(
    buffer: &[u8],
    header: &MetaHeader,
    base: &B,
    sink: &mut S,
    options: ExtractOptions,
) -> ExtractionReport
where
    B: AsRef<Path> + ?Sized,
    S: TileSink + ?Sized,
{
    let base = base.as_ref();
    let region = match options.offset_base {
        OffsetBase::Payload => buffer.get(METATILE_HEADER_LENGTH..).unwrap_or_default(),
        OffsetBase::File => buffer,
    };

    let mut report = ExtractionReport::new(header.count);
    if !header.count_in_range() {
        warn!(
            count = header.count,
            attempted = header.slots_to_extract(),
            "count does not fit the 64-slot index"
        );
        report.count_error = Some(ExtractionError::CountOutOfRange {
            count: header.count,
        });
    }

    for (slot, entry) in header.valid_entries().iter().enumerate() {
        let path = tile_path(base, slot);

        let Some((start, end)) = checked_range(entry.offset, entry.size, region.len()) else {
            let err = ExtractionError::OutOfRange {
                slot,
                offset: entry.offset,
                size: entry.size,
                available: region.len(),
            };
            warn!(slot, offset = entry.offset, size = entry.size, "skipping slot: {err}");
            report.outcomes.push(SlotOutcome {
                slot,
                path,
                result: Err(err),
            });
            continue;
        };

        let bytes = &region[start..end];
        match sink.write_tile(&path, bytes) {
            Ok(()) => {
                debug!(slot, path = %path.display(), len = bytes.len(), "wrote tile");
                report.outcomes.push(SlotOutcome {
                    slot,
                    path,
                    result: Ok(WrittenTile {
                        len: bytes.len(),
                        crc32: crc32(bytes),
                    }),
                });
            }
            Err(io_err) => {
                error!(slot, path = %path.display(), "could not write tile: {io_err}");
                let err = ExtractionError::SinkFailed {
                    slot,
                    path: path.clone(),
                    reason: io_err.to_string(),
                };
                report.outcomes.push(SlotOutcome {
                    slot,
                    path,
                    result: Err(err),
                });
                if options.on_sink_error == SinkErrorPolicy::Abort {
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    report
}
