use std::collections::BTreeMap;

use mappack::chunks::BlockCodec;
use mappack::pack::{self, PackOptions};
use mappack::records::{GRID_CELLS, NO_TILE};
use mappack::text::write_section_lines;
use mappack::{OverlayCell, OverlayGrid, PackError, TextSection, TileRecord, MAX_DIM};

type Section = BTreeMap<String, String>;

fn map_tiles(width: i16, height: i16) -> Vec<TileRecord> {
    let mut tiles = Vec::new();
    for y in 0..height {
        for x in 0..width {
            tiles.push(TileRecord {
                x,
                y,
                tile_index: if (x + y) % 7 == 0 { NO_TILE } else { i32::from(x % 3) },
                sub_tile_index: 0,
                level: (y % 4) as u8,
                ice_growth: 0,
            });
        }
    }
    tiles
}

fn sorted(mut tiles: Vec<TileRecord>) -> Vec<TileRecord> {
    tiles.sort_by_key(|t| (t.x, t.y, t.level, t.tile_index));
    tiles
}

#[test]
fn tiles_round_trip() -> Result<(), PackError> {
    let tiles = map_tiles(64, 48);
    let mut section = Section::new();
    pack::write_tiles(&mut section, &tiles, &PackOptions::default())?;
    assert!(section.values().all(|line| line.len() <= 70));

    let read = pack::read_tiles(&section)?;
    assert_eq!(read.len(), tiles.len());
    // Written sorted, read back with the sentinel cleared
    let expected: Vec<TileRecord> = tiles.into_iter().map(TileRecord::normalized).collect();
    assert!(read.iter().all(|t| t.tile_index != NO_TILE));
    assert_eq!(sorted(read), sorted(expected));
    Ok(())
}

#[test]
fn tile_write_order() -> Result<(), PackError> {
    let tiles = map_tiles(20, 20);
    let unsorted = PackOptions {
        sort_tiles: false,
        ..PackOptions::default()
    };
    let packed = pack::pack_tiles(&tiles, &unsorted)?;
    assert_eq!(pack::unpack_tiles(&packed)?, tiles);

    let packed = pack::pack_tiles(&tiles, &PackOptions::default())?;
    let mut expected = tiles.clone();
    TileRecord::sort_for_packing(&mut expected);
    // Unpacking keeps the sentinel
    assert_eq!(pack::unpack_tiles(&packed)?, expected);
    Ok(())
}

#[test]
fn tile_chunking() -> Result<(), PackError> {
    let tiles = map_tiles(100, 100);
    let options = PackOptions {
        block_size: 1000,
        ..PackOptions::default()
    };
    let packed = pack::pack_tiles(&tiles, &options)?;
    let raw = BlockCodec::Lzo.read_chunks(&packed)?;
    assert_eq!(raw.len(), tiles.len() * 11);
    let mut expected = tiles;
    TileRecord::sort_for_packing(&mut expected);
    assert_eq!(pack::unpack_tiles(&packed)?, expected);
    Ok(())
}

#[test]
fn empty_sections() -> Result<(), PackError> {
    let empty = Section::new();
    assert!(pack::read_tiles(&empty)?.is_empty());
    assert_eq!(pack::read_overlays(&empty, &empty)?, OverlayGrid::new());
    Ok(())
}

#[test]
fn overlays_round_trip() -> Result<(), PackError> {
    let mut grid = OverlayGrid::new();
    for i in 0..500_u16 {
        grid.set(OverlayCell {
            x: i * 7 % MAX_DIM as u16,
            y: i * 13 % MAX_DIM as u16,
            overlay_index: (i % 30) as u8,
            frame_index: (i % 12) as u8,
        });
    }
    let (mut types, mut frames) = (Section::new(), Section::new());
    pack::write_overlays(&mut types, &mut frames, &grid, &PackOptions::default())?;
    // A mostly empty grid compresses well
    assert!(types.len() < 200);
    let read = pack::read_overlays(&types, &frames)?;
    assert_eq!(read, grid);
    assert_eq!(mappack::decode_overlay_grid(&read).len(), grid.occupied());
    Ok(())
}

#[test]
fn overlay_types_without_frames() -> Result<(), PackError> {
    let cell = OverlayCell { x: 1, y: 2, overlay_index: 3, frame_index: 0 };
    let grid = mappack::encode_overlay_grid(&[cell]);
    let (mut types, mut frames) = (Section::new(), Section::new());
    pack::write_overlays(&mut types, &mut frames, &grid, &PackOptions::default())?;
    frames.clear();
    let read = pack::read_overlays(&types, &frames)?;
    assert_eq!(read.get((1, 2)), Some(cell));
    Ok(())
}

#[test]
fn wrong_overlay_size() -> Result<(), PackError> {
    let options = PackOptions::default();
    let mut types = Section::new();
    write_section_lines(&mut types, &pack::pack_overlay_layer(&[0xFF; 1000], &options)?);
    assert!(matches!(
        pack::read_overlays(&types, &Section::new()),
        Err(PackError::GridSizeMismatch { expected: GRID_CELLS, actual: 1000 })
    ));
    Ok(())
}

#[test]
fn corrupt_sections() {
    let mut section = Section::new();
    section.set_value("1".into(), "not base64!".into());
    assert!(matches!(
        pack::read_tiles(&section),
        Err(PackError::InvalidBase64(_))
    ));
    // Valid base64, but the chunk claims more data than there is
    section.set_value("1".into(), "CgADAIM=".into());
    assert!(matches!(
        pack::read_tiles(&section),
        Err(PackError::TruncatedChunk { .. })
    ));
}

#[test]
fn section_names() {
    assert_eq!(pack::ISO_MAP_PACK_SECTION, "IsoMapPack5");
    assert_eq!(pack::OVERLAY_PACK_SECTION, "OverlayPack");
    assert_eq!(pack::OVERLAY_DATA_PACK_SECTION, "OverlayDataPack");
}
