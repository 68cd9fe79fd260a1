use const_str::concat_bytes;
use mappack::records::{decode_tiles_exact, GRID_CELLS, NO_TILE, TILE_RECORD_SIZE};
use mappack::{
    decode_overlay_grid, decode_tiles, encode_overlay_grid, encode_tiles, OverlayCell, OverlayGrid,
    PackError, TileRecord, MAX_DIM, NO_OVERLAY,
};

const TILE: TileRecord = TileRecord {
    x: 1,
    y: -2,
    tile_index: 0x0102_0304,
    sub_tile_index: 5,
    level: 6,
    ice_growth: 7,
};

const TILE_BYTES: &[u8] = concat_bytes!(
    1_i16.to_le_bytes(), // X
    (-2_i16).to_le_bytes(), // Y
    0x0102_0304_i32.to_le_bytes(), // Tile index
    5, 6, 7 // Sub-tile, level, ice growth
);

fn tiles(count: i16) -> Vec<TileRecord> {
    (0..count)
        .map(|i| TileRecord {
            x: 100 - i % 10,
            y: i / 10,
            tile_index: i32::from(i % 3) * 1000 - 1,
            sub_tile_index: (i % 4) as u8,
            level: (i % 5) as u8,
            ice_growth: (i % 2) as u8,
        })
        .collect()
}

#[test]
fn tile_layout() {
    assert_eq!(TILE_BYTES.len(), TILE_RECORD_SIZE);
    assert_eq!(encode_tiles(&[TILE]), TILE_BYTES);
    assert_eq!(decode_tiles(TILE_BYTES), [TILE]);
}

#[test]
fn tile_round_trip() -> Result<(), PackError> {
    let tiles = tiles(250);
    let encoded = encode_tiles(&tiles);
    assert_eq!(encoded.len(), 250 * TILE_RECORD_SIZE);
    assert_eq!(decode_tiles(&encoded), tiles);
    assert_eq!(decode_tiles_exact(&encoded)?, tiles);
    assert!(decode_tiles(&[]).is_empty());
    Ok(())
}

#[test]
fn partial_tile_records() {
    let mut encoded = encode_tiles(&tiles(2));
    encoded.extend_from_slice(&[1, 2, 3]);
    assert_eq!(decode_tiles(&encoded), tiles(2));
    assert!(matches!(
        decode_tiles_exact(&encoded),
        Err(PackError::RecordLengthMismatch { len: 25, record_size: 11 })
    ));
}

#[test]
fn empty_tile_sentinel() {
    let empty = TileRecord {
        tile_index: NO_TILE,
        level: 3,
        ..TILE
    };
    // Decoding leaves the sentinel alone
    assert_eq!(decode_tiles(&encode_tiles(&[empty])), [empty]);
    assert!(empty.is_empty_tile());
    let normalized = empty.normalized();
    assert_eq!(normalized.tile_index, 0);
    assert_eq!(normalized.level, 3);
    assert_eq!(TILE.normalized(), TILE);
}

#[test]
fn packing_order() {
    let mut tiles = tiles(40);
    TileRecord::sort_for_packing(&mut tiles);
    assert!(tiles
        .windows(2)
        .all(|w| (w[0].x, w[0].level, w[0].tile_index) <= (w[1].x, w[1].level, w[1].tile_index)));
    assert_eq!(tiles.first().map(|t| t.x), Some(91));
}

#[test]
fn overlay_round_trip() {
    let cells = vec![
        OverlayCell { x: 0, y: 0, overlay_index: 0, frame_index: 0 },
        OverlayCell { x: 511, y: 0, overlay_index: 4, frame_index: 11 },
        OverlayCell { x: 3, y: 7, overlay_index: 200, frame_index: 3 },
        OverlayCell { x: 511, y: 511, overlay_index: 1, frame_index: 255 },
    ];
    let grid = encode_overlay_grid(&cells);
    assert_eq!(grid.types().len(), GRID_CELLS);
    assert_eq!(grid.frames().len(), GRID_CELLS);
    assert_eq!(grid.occupied(), cells.len());
    assert_eq!(grid[(3, 7)], 200);
    assert_eq!(grid.types()[7 * MAX_DIM + 3], 200);
    assert_eq!(grid.frames()[7 * MAX_DIM + 3], 3);
    assert_eq!(grid[(4, 7)], NO_OVERLAY);
    assert_eq!(grid.get((4, 7)), None);

    let mut decoded = decode_overlay_grid(&grid);
    // Row-major order
    assert_eq!(decoded[1], cells[1]);
    decoded.sort();
    let mut expected = cells;
    expected.sort();
    assert_eq!(decoded, expected);
}

#[test]
fn overlay_edits() {
    let mut grid = OverlayGrid::new();
    assert_eq!(grid.occupied(), 0);
    let cell = OverlayCell { x: 20, y: 30, overlay_index: 9, frame_index: 2 };
    assert!(grid.set(cell));
    assert_eq!(grid.get((20, 30)), Some(cell));
    grid.clear((20, 30));
    assert_eq!(grid, OverlayGrid::new());
    assert!(!grid.set(OverlayCell { x: 512, ..cell }));
    assert_eq!(grid.get((512, 0)), None);
    // Out of grid placements are skipped
    let grid = encode_overlay_grid(&[cell, OverlayCell { y: 600, ..cell }]);
    assert_eq!(decode_overlay_grid(&grid), [cell]);
    assert_eq!(format!("{grid:?}"), "OverlayGrid { occupied: 1 }");
    assert_eq!(
        format!("{grid:#?}"),
        "OverlayGrid {\n    (20, 30) overlay 09 frame 2,\n}"
    );
}

#[test]
fn empty_overlay_placements() {
    let cell = OverlayCell { x: 5, y: 6, overlay_index: 9, frame_index: 4 };
    let empty = OverlayCell { overlay_index: NO_OVERLAY, frame_index: 7, ..cell };
    // An empty placement leaves no stray frame behind
    let grid = encode_overlay_grid(&[empty]);
    assert_eq!(grid, OverlayGrid::new());
    // and clears whatever was placed before it
    let grid = encode_overlay_grid(&[cell, empty]);
    assert_eq!(grid.frames()[6 * MAX_DIM + 5], 0);
    assert_eq!(grid, OverlayGrid::new());
}

#[test]
fn overlay_raw_arrays() {
    assert!(matches!(
        OverlayGrid::from_raw(vec![NO_OVERLAY; 10], vec![0; GRID_CELLS]),
        Err(PackError::GridSizeMismatch { actual: 10, .. })
    ));
    let mut types = vec![NO_OVERLAY; GRID_CELLS];
    types[MAX_DIM + 2] = 5;
    let grid = OverlayGrid::from_raw(types, vec![1; GRID_CELLS]).expect("grid is full size");
    assert_eq!(
        decode_overlay_grid(&grid),
        [OverlayCell { x: 2, y: 1, overlay_index: 5, frame_index: 1 }]
    );
}

#[test]
fn display() {
    assert_eq!(TILE.to_string(), "(1, -2) tile 16909060.5 level 6 ice 7");
    let plain = TileRecord { x: 4, y: 5, tile_index: 12, ..TileRecord::default() };
    assert_eq!(plain.to_string(), "(4, 5) tile 12 level 0");
}
