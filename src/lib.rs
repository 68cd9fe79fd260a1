#![warn(missing_docs)]
#![warn(clippy::pedantic, clippy::perf)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::module_name_repetitions
)]

/*!
Library to handle the compressed grid payloads of Tiberian Sun style map files.

A map stores its terrain tiles (`IsoMapPack5`) and overlays (`OverlayPack`,
`OverlayDataPack`) as base64 text in numbered INI keys. Underneath the text,
each payload is a sequence of independently compressed chunks: LZO1X for
tiles, Westwood's Format80 for overlays.

```rust
# use std::collections::BTreeMap;
# use mappack::{pack, OverlayCell, PackError, TileRecord};
# fn main() -> Result<(), PackError> {
let mut section: BTreeMap<String, String> = BTreeMap::new();
let tiles = [TileRecord { x: 3, y: 4, tile_index: 12, ..TileRecord::default() }];
pack::write_tiles(&mut section, &tiles, &pack::PackOptions::default())?;
assert_eq!(pack::read_tiles(&section)?, tiles);

let mut overlays = mappack::OverlayGrid::new();
overlays.set(OverlayCell { x: 10, y: 20, overlay_index: 2, frame_index: 5 });
let mut types: BTreeMap<String, String> = BTreeMap::new();
let mut frames = types.clone();
pack::write_overlays(&mut types, &mut frames, &overlays, &pack::PackOptions::default())?;
assert_eq!(pack::read_overlays(&types, &frames)?, overlays);
#
# Ok(())
# }
```
 */

use std::io;

pub mod chunks;
mod formatting;
pub mod format80;
pub mod lzo;
pub mod pack;
mod read_helper;
pub mod records;
pub mod text;
mod write_helper;

pub use chunks::{read_chunks, write_chunks, BlockCodec};
pub use records::{
    decode_overlay_grid, decode_tiles, encode_overlay_grid, encode_tiles, OverlayCell, OverlayGrid,
    TileRecord, MAX_DIM, NO_OVERLAY,
};
pub use text::{from_base64_lines, to_base64_lines, TextSection};

/// A reason why packing or unpacking map data failed.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// A compressed stream ran out early, or referenced data it had not produced.
    #[error("malformed compressed stream at byte {offset}: {reason}")]
    MalformedStream {
        /// Position in the stream of the offending instruction or field.
        offset: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A chunk header or body runs past the end of the payload.
    #[error("chunk at byte {offset} needs {declared} bytes but only {available} remain")]
    TruncatedChunk {
        /// Position of the chunk header in the payload.
        offset: usize,
        /// Bytes the chunk needs.
        declared: usize,
        /// Bytes left in the payload.
        available: usize,
    },
    /// A chunk decoded to fewer bytes than its header declares.
    #[error("chunk at byte {offset} decoded to {actual} bytes instead of {expected}")]
    ChunkLengthMismatch {
        /// Position of the chunk header in the payload.
        offset: usize,
        /// Raw size from the header.
        expected: usize,
        /// Bytes actually decoded.
        actual: usize,
    },
    /// The text payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// A record buffer ends with a partial record.
    #[error("record buffer of {len} bytes is not a multiple of {record_size}")]
    RecordLengthMismatch {
        /// Length of the buffer.
        len: usize,
        /// Size of one record.
        record_size: usize,
    },
    /// A block size of zero, or one that does not fit in a chunk header.
    #[error("block size {0} is not between 1 and 65535")]
    InvalidBlockSize(usize),
    /// A compressed block too large for a chunk header.
    #[error("compressed block of {0} bytes does not fit in a chunk")]
    BlockTooLarge(usize),
    /// An overlay array of the wrong size.
    #[error("overlay data holds {actual} cells instead of {expected}")]
    GridSizeMismatch {
        /// Cells in a full grid.
        expected: usize,
        /// Cells found.
        actual: usize,
    },
    /// IO error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PackError {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        PackError::MalformedStream { offset, reason }
    }
}
