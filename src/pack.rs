//! Reading and writing whole map packs.

use crate::chunks::{BlockCodec, DEFAULT_BLOCK_SIZE};
use crate::records::{self, OverlayGrid, TileRecord, GRID_CELLS};
use crate::text::{self, TextSection};
use crate::PackError;
use log::debug;

/// Section holding the terrain tiles.
pub const ISO_MAP_PACK_SECTION: &str = "IsoMapPack5";
/// Section holding the overlay types.
pub const OVERLAY_PACK_SECTION: &str = "OverlayPack";
/// Section holding the overlay frames.
pub const OVERLAY_DATA_PACK_SECTION: &str = "OverlayDataPack";

/// Options for writing packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    /// Raw size of every chunk but the last.
    pub block_size: usize,
    /// Whether tiles are sorted before packing.
    pub sort_tiles: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            block_size: DEFAULT_BLOCK_SIZE,
            sort_tiles: true,
        }
    }
}

/// Compresses tile records into a chunked payload.
///
/// # Errors
/// Errors if the block size is invalid.
pub fn pack_tiles(tiles: &[TileRecord], options: &PackOptions) -> Result<Vec<u8>, PackError> {
    let raw = if options.sort_tiles {
        let mut sorted = tiles.to_vec();
        TileRecord::sort_for_packing(&mut sorted);
        records::encode_tiles(&sorted)
    } else {
        records::encode_tiles(tiles)
    };
    BlockCodec::Lzo.write_chunks(&raw, options.block_size)
}

/// Decompresses a chunked payload into tile records.
///
/// Records are returned as stored; the "no tile" sentinel is not touched.
///
/// # Errors
/// Errors if the payload is malformed.
pub fn unpack_tiles(data: &[u8]) -> Result<Vec<TileRecord>, PackError> {
    let raw = BlockCodec::Lzo.read_chunks(data)?;
    Ok(records::decode_tiles(&raw))
}

/// Reads the tile records of a map from its `IsoMapPack5` section,
/// replacing the "no tile" sentinel with tile `0`.
///
/// # Errors
/// Errors if the section does not hold a valid pack.
pub fn read_tiles(section: &impl TextSection) -> Result<Vec<TileRecord>, PackError> {
    let data = text::read_section_lines(section)?;
    let tiles: Vec<TileRecord> = unpack_tiles(&data)?
        .into_iter()
        .map(TileRecord::normalized)
        .collect();
    debug!("read {} tile records", tiles.len());
    Ok(tiles)
}

/// Writes the tile records of a map into its `IsoMapPack5` section.
///
/// # Errors
/// Errors if the block size is invalid.
pub fn write_tiles(
    section: &mut impl TextSection,
    tiles: &[TileRecord],
    options: &PackOptions,
) -> Result<(), PackError> {
    let data = pack_tiles(tiles, options)?;
    text::write_section_lines(section, &data);
    debug!("wrote {} tile records in {} bytes", tiles.len(), data.len());
    Ok(())
}

/// Compresses one overlay array into a chunked payload.
///
/// # Errors
/// Errors if the block size is invalid.
pub fn pack_overlay_layer(raw: &[u8], options: &PackOptions) -> Result<Vec<u8>, PackError> {
    BlockCodec::Format80.write_chunks(raw, options.block_size)
}

/// Decompresses one overlay array. An empty payload is `None`.
///
/// # Errors
/// Errors if the payload is malformed, or does not hold a whole grid.
pub fn unpack_overlay_layer(data: &[u8]) -> Result<Option<Vec<u8>>, PackError> {
    if data.is_empty() {
        return Ok(None);
    }
    let raw = BlockCodec::Format80.read_chunks(data)?;
    if raw.len() != GRID_CELLS {
        return Err(PackError::GridSizeMismatch {
            expected: GRID_CELLS,
            actual: raw.len(),
        });
    }
    Ok(Some(raw))
}

/// Reads the overlays of a map from its `OverlayPack` and `OverlayDataPack` sections.
///
/// A missing or empty section reads as an empty layer.
///
/// # Errors
/// Errors if either section does not hold a valid pack.
pub fn read_overlays(
    overlay_section: &impl TextSection,
    data_section: &impl TextSection,
) -> Result<OverlayGrid, PackError> {
    let mut grid = OverlayGrid::new();
    if let Some(types) = unpack_overlay_layer(&text::read_section_lines(overlay_section)?)? {
        grid.types = types;
    }
    if let Some(frames) = unpack_overlay_layer(&text::read_section_lines(data_section)?)? {
        grid.frames = frames;
    }
    debug!("read {} overlays", grid.occupied());
    Ok(grid)
}

/// Writes the overlays of a map into its `OverlayPack` and `OverlayDataPack` sections.
///
/// # Errors
/// Errors if the block size is invalid.
pub fn write_overlays(
    overlay_section: &mut impl TextSection,
    data_section: &mut impl TextSection,
    grid: &OverlayGrid,
    options: &PackOptions,
) -> Result<(), PackError> {
    let types = pack_overlay_layer(grid.types(), options)?;
    let frames = pack_overlay_layer(grid.frames(), options)?;
    text::write_section_lines(overlay_section, &types);
    text::write_section_lines(data_section, &frames);
    debug!("wrote {} overlays", grid.occupied());
    Ok(())
}
