//! Flip-aware duplicate finder for sprite sheets
//!
//! Each full tile gets a number in first-seen order. A tile that matches an
//! earlier one, possibly mirrored, reuses that number and is tagged with the
//! flip that maps it back: `R` (as is), `H`, `V` or `HV`.
//!
//! The output interleaves rows: a strip of colored label cells above each
//! row of original tiles.

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{Result, Transform, TransformContext, TransformOutput};
use crate::canvas;
use crate::color::{label_color, BLACK, WHITE};
use crate::dedup::TileIndex;
use crate::font;
use crate::params::Params;
use crate::tile::{EdgePolicy, Flip, TileGrid, TileSize};

/// Label drawn for a tile that repeats without flipping
const UNFLIPPED_LABEL: &str = "R";

/// Label for one tile of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLabel {
    /// 1-based number shared by all occurrences of a tile
    pub number: usize,
    /// `None` for the first occurrence
    pub flip: Option<Flip>,
}

impl TileLabel {
    pub fn flip_text(&self) -> &'static str {
        match self.flip {
            None => "",
            Some(Flip::None) => UNFLIPPED_LABEL,
            Some(flip) => flip.label(),
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        label_color(self.number)
    }
}

/// Label every tile of `grid` in walk order.
pub fn label_tiles(grid: &TileGrid) -> Vec<TileLabel> {
    let mut index = TileIndex::flip_normalized();
    grid.iter()
        .map(|cell| {
            let found = index.insert_or_match(&cell.tile, cell.x, cell.y);
            let label = TileLabel { number: found.id + 1, flip: found.existing.then_some(found.flip) };
            debug!(col = cell.col, row = cell.row, "tile labeled {}{}", label.number, label.flip_text());
            label
        })
        .collect()
}

fn label_cell(label: &TileLabel, size: TileSize) -> RgbaImage {
    let mut cell = canvas::blank(size.width, size.height, label.color());
    font::draw_text(&mut cell, 0, 1, &label.number.to_string(), WHITE);
    font::draw_text(&mut cell, 0, 7, label.flip_text(), WHITE);
    cell
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindDuplicates;

impl Transform for FindDuplicates {
    fn name(&self) -> &'static str {
        "find-duplicates"
    }

    fn description(&self) -> &'static str {
        "Number sprite tiles and tag repeats with the flip that matches them"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let size = TileSize::new(params.get_u32("twidth", 8)?, params.get_u32("theight", 16)?)?;
        let grid = TileGrid::extract(image, size, EdgePolicy::Skip);
        let labels = label_tiles(&grid);

        let (width, height) = image.dimensions();
        let mut sheet = canvas::blank(width, height * 2, BLACK);
        for (cell, label) in grid.iter().zip(&labels) {
            let x = cell.x as i64;
            let label_y = (2 * cell.row * size.height) as i64;
            canvas::paste(&mut sheet, &label_cell(label, size), x, label_y);
            canvas::paste_tile(&mut sheet, &cell.tile, x, label_y + size.height as i64);
        }

        let unique = labels.iter().filter(|l| l.flip.is_none()).count();
        debug!(tiles = labels.len(), unique, "labeled duplicate tiles");
        Ok(TransformOutput::image(sheet))
    }
}
