//! Per-cell records carried by the map packs.

use crate::PackError;
use bytemuck::{cast_slice, Pod, Zeroable};
use byteorder::{ByteOrder, LittleEndian};
use log::warn;
use std::ops::Index;

/// Size of one tile record on the wire.
pub const TILE_RECORD_SIZE: usize = 11;

/// Tile index the game writes for a cell with no tile.
pub const NO_TILE: i32 = 0xFFFF;

/// Side length of the overlay grid, independent of the map's playable size.
pub const MAX_DIM: usize = 512;

/// Number of cells in the overlay grid.
pub const GRID_CELLS: usize = MAX_DIM * MAX_DIM;

/// Overlay type marking a cell with no overlay.
pub const NO_OVERLAY: u8 = 0xFF;

/// The terrain tile of a single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileRecord {
    /// X coordinate of the cell.
    pub x: i16,
    /// Y coordinate of the cell.
    pub y: i16,
    /// Index of the tile in the theater's tile set.
    pub tile_index: i32,
    /// Index of the sub-tile within a multi-cell tile.
    pub sub_tile_index: u8,
    /// Height level of the cell.
    pub level: u8,
    /// Ice growth state of the cell.
    pub ice_growth: u8,
}

impl TileRecord {
    /// Returns whether this record carries the "no tile" sentinel.
    #[inline]
    #[must_use]
    pub fn is_empty_tile(&self) -> bool {
        self.tile_index == NO_TILE
    }

    /// Returns this record with the "no tile" sentinel replaced by tile `0`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.is_empty_tile() {
            self.tile_index = 0;
        }
        self
    }

    /// Sorts records by X, level and tile index, which groups equal bytes
    /// together and makes the packed data compress better.
    pub fn sort_for_packing(tiles: &mut [TileRecord]) {
        tiles.sort_by_key(|tile| (tile.x, tile.level, tile.tile_index));
    }
}

/// The wire layout of [`TileRecord`], little endian and unaligned.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct WireTile {
    x: [u8; 2],
    y: [u8; 2],
    tile_index: [u8; 4],
    sub_tile_index: u8,
    level: u8,
    ice_growth: u8,
}

impl From<&TileRecord> for WireTile {
    fn from(tile: &TileRecord) -> Self {
        let mut wire = WireTile::zeroed();
        LittleEndian::write_i16(&mut wire.x, tile.x);
        LittleEndian::write_i16(&mut wire.y, tile.y);
        LittleEndian::write_i32(&mut wire.tile_index, tile.tile_index);
        wire.sub_tile_index = tile.sub_tile_index;
        wire.level = tile.level;
        wire.ice_growth = tile.ice_growth;
        wire
    }
}

impl From<&WireTile> for TileRecord {
    fn from(wire: &WireTile) -> Self {
        TileRecord {
            x: LittleEndian::read_i16(&wire.x),
            y: LittleEndian::read_i16(&wire.y),
            tile_index: LittleEndian::read_i32(&wire.tile_index),
            sub_tile_index: wire.sub_tile_index,
            level: wire.level,
            ice_growth: wire.ice_growth,
        }
    }
}

/// Serializes tile records in array order.
#[must_use]
pub fn encode_tiles(tiles: &[TileRecord]) -> Vec<u8> {
    let wire: Vec<WireTile> = tiles.iter().map(WireTile::from).collect();
    cast_slice::<WireTile, u8>(&wire).to_vec()
}

/// Deserializes tile records, dropping a trailing partial record.
#[must_use]
pub fn decode_tiles(buf: &[u8]) -> Vec<TileRecord> {
    let whole = buf.len() - buf.len() % TILE_RECORD_SIZE;
    if whole != buf.len() {
        warn!(
            "dropping {} trailing bytes of a partial tile record",
            buf.len() - whole
        );
    }
    cast_slice::<u8, WireTile>(&buf[..whole])
        .iter()
        .map(TileRecord::from)
        .collect()
}

/// Deserializes tile records, rejecting a buffer with a trailing partial record.
///
/// # Errors
/// Errors if the buffer length is not a multiple of [`TILE_RECORD_SIZE`].
pub fn decode_tiles_exact(buf: &[u8]) -> Result<Vec<TileRecord>, PackError> {
    if buf.len() % TILE_RECORD_SIZE != 0 {
        return Err(PackError::RecordLengthMismatch {
            len: buf.len(),
            record_size: TILE_RECORD_SIZE,
        });
    }
    Ok(decode_tiles(buf))
}

/// The overlay placed on a single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayCell {
    /// X coordinate of the cell.
    pub x: u16,
    /// Y coordinate of the cell.
    pub y: u16,
    /// Index of the overlay type.
    pub overlay_index: u8,
    /// Index of the frame the overlay is drawn with.
    pub frame_index: u8,
}

/// The two parallel overlay arrays, each [`MAX_DIM`] squared bytes,
/// indexed by `y * MAX_DIM + x`.
#[derive(Clone, PartialEq, Eq)]
pub struct OverlayGrid {
    pub(crate) types: Vec<u8>,
    pub(crate) frames: Vec<u8>,
}

impl Default for OverlayGrid {
    fn default() -> Self {
        OverlayGrid {
            types: vec![NO_OVERLAY; GRID_CELLS],
            frames: vec![0; GRID_CELLS],
        }
    }
}

impl OverlayGrid {
    /// Constructs an empty grid.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a grid from its raw overlay type and frame arrays.
    ///
    /// # Errors
    /// Errors if either array is not exactly [`GRID_CELLS`] bytes.
    pub fn from_raw(types: Vec<u8>, frames: Vec<u8>) -> Result<Self, PackError> {
        for actual in [types.len(), frames.len()] {
            if actual != GRID_CELLS {
                return Err(PackError::GridSizeMismatch {
                    expected: GRID_CELLS,
                    actual,
                });
            }
        }
        Ok(OverlayGrid { types, frames })
    }

    /// Returns the raw overlay type array.
    #[inline]
    #[must_use]
    pub fn types(&self) -> &[u8] {
        &self.types
    }

    /// Returns the raw frame array.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    /// Get the overlay on a cell.
    /// Returns None if the cell is empty or out of bounds.
    #[must_use]
    pub fn get(&self, (x, y): (usize, usize)) -> Option<OverlayCell> {
        if x >= MAX_DIM || y >= MAX_DIM {
            return None;
        }
        let index = y * MAX_DIM + x;
        let overlay_index = self.types[index];
        (overlay_index != NO_OVERLAY).then(|| OverlayCell {
            x: x as u16,
            y: y as u16,
            overlay_index,
            frame_index: self.frames[index],
        })
    }

    /// Places an overlay, replacing whatever was on its cell.
    /// Placing [`NO_OVERLAY`] clears the cell, frame included.
    /// Returns false, changing nothing, if the cell is out of bounds.
    pub fn set(&mut self, cell: OverlayCell) -> bool {
        let (x, y) = (usize::from(cell.x), usize::from(cell.y));
        if x >= MAX_DIM || y >= MAX_DIM {
            return false;
        }
        if cell.overlay_index == NO_OVERLAY {
            self.clear((x, y));
            return true;
        }
        let index = y * MAX_DIM + x;
        self.types[index] = cell.overlay_index;
        self.frames[index] = cell.frame_index;
        true
    }

    /// Removes the overlay from a cell, if any.
    pub fn clear(&mut self, (x, y): (usize, usize)) {
        if x < MAX_DIM && y < MAX_DIM {
            let index = y * MAX_DIM + x;
            self.types[index] = NO_OVERLAY;
            self.frames[index] = 0;
        }
    }

    /// Iterates over every occupied cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = OverlayCell> + '_ {
        self.types
            .iter()
            .zip(&self.frames)
            .enumerate()
            .filter(|(_, (overlay_index, _))| **overlay_index != NO_OVERLAY)
            .map(|(index, (&overlay_index, &frame_index))| OverlayCell {
                x: (index % MAX_DIM) as u16,
                y: (index / MAX_DIM) as u16,
                overlay_index,
                frame_index,
            })
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.types.iter().filter(|&&t| t != NO_OVERLAY).count()
    }
}

impl Index<(usize, usize)> for OverlayGrid {
    type Output = u8;

    /// Index by position and return the raw overlay type.
    ///
    /// # Panics
    /// Panics if index is out of bounds.
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        assert!(x < MAX_DIM, "x coordinate {x} is outside the overlay grid");
        &self.types[y * MAX_DIM + x]
    }
}

/// Builds an overlay grid from sparse placements; later placements on the
/// same cell win, and a [`NO_OVERLAY`] placement clears its cell.
/// Placements outside the grid are skipped.
#[must_use]
pub fn encode_overlay_grid(cells: &[OverlayCell]) -> OverlayGrid {
    let mut grid = OverlayGrid::new();
    for &cell in cells {
        if !grid.set(cell) {
            warn!(
                "skipping overlay {} at ({}, {}) outside the {MAX_DIM}x{MAX_DIM} grid",
                cell.overlay_index, cell.x, cell.y
            );
        }
    }
    grid
}

/// Lists the occupied cells of an overlay grid in row-major order.
#[must_use]
pub fn decode_overlay_grid(grid: &OverlayGrid) -> Vec<OverlayCell> {
    grid.cells().collect()
}
