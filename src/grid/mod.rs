mod compositor;
mod labels;

pub use compositor::{Compositor, CoverFailurePolicy};
pub use labels::{LabelFont, FONT_SIZE, LABEL_BAND_HEIGHT};

use crate::models::GridSize;

/// Side length of one album cell, in pixels.
pub const CELL_SIZE: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub grid: GridSize,
    pub cell_size: u32,
    pub include_labels: bool,
}

impl GridConfig {
    pub fn new(grid: GridSize, include_labels: bool) -> Self {
        Self {
            grid,
            cell_size: CELL_SIZE,
            include_labels,
        }
    }

    pub fn canvas_side(&self) -> u32 {
        self.grid.side() as u32 * self.cell_size
    }

    /// Row-major cell for `index`, or `None` if the grid has no such cell.
    pub fn cell(&self, index: usize) -> Option<CellRect> {
        if index >= self.grid.count() {
            return None;
        }

        let side = self.grid.side();
        let row = (index / side) as u32;
        let col = (index % side) as u32;

        Some(CellRect {
            x: col * self.cell_size,
            y: row * self.cell_size,
            size: self.cell_size,
        })
    }
}

/// Square region of the canvas, top-left corner plus side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}
