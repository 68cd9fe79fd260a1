use crate::records::{OverlayCell, OverlayGrid, TileRecord};
use fmt::Debug;
use std::fmt;
use std::fmt::{Display, Formatter, Write};

impl Display for TileRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) tile {}", self.x, self.y, self.tile_index)?;
        if self.sub_tile_index != 0 {
            write!(f, ".{}", self.sub_tile_index)?;
        }
        write!(f, " level {}", self.level)?;
        if self.ice_growth != 0 {
            write!(f, " ice {}", self.ice_growth)?;
        }
        Ok(())
    }
}

impl Display for OverlayCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) overlay {:02X} frame {}",
            self.x, self.y, self.overlay_index, self.frame_index
        )
    }
}

impl Debug for OverlayGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // The grid is mostly empty, so list only occupied cells
            writeln!(f, "OverlayGrid {{")?;
            let mut buf = String::new();
            for cell in self.cells() {
                writeln!(buf, "{cell},")?;
            }
            // Pad lines
            for line in buf.lines() {
                writeln!(f, "    {line}")?;
            }
            write!(f, "}}")
        } else {
            write!(f, "OverlayGrid {{ occupied: {} }}", self.occupied())
        }
    }
}
