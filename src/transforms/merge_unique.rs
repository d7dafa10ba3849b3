//! Unique tiles across two images
//!
//! Full 8x8 tiles of the input and of a second image (`with=<path>`) are
//! deduplicated in that order and packed 20 per row, which is one Game Boy
//! screen width.

use std::path::Path;

use image::RgbaImage;
use tracing::{debug, warn};

use super::{Result, Transform, TransformContext, TransformError, TransformOutput};
use crate::canvas;
use crate::color::BLACK;
use crate::dedup::TileIndex;
use crate::output;
use crate::params::Params;
use crate::tile::{EdgePolicy, Tile, TileGrid, TileSize};

/// Tiles per row of the merged sheet
pub const TILES_PER_ROW: u32 = 20;

pub const MISSING_IMAGE_MESSAGE: &str = "Failed to open 2nd image";

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeUnique;

/// Distinct full tiles of `images`, in first-seen order.
pub fn unique_tiles<'a>(images: impl IntoIterator<Item = &'a RgbaImage>, size: TileSize) -> Vec<Tile> {
    let mut index = TileIndex::exact();
    let mut unique = Vec::new();
    for image in images {
        for cell in &TileGrid::extract(image, size, EdgePolicy::Skip) {
            if !index.insert_or_match(&cell.tile, cell.x, cell.y).existing {
                unique.push(cell.tile.clone());
            }
        }
    }
    unique
}

/// Pack tiles row-major, `per_row` to a row.
pub fn pack_tiles(tiles: &[Tile], size: TileSize, per_row: u32) -> RgbaImage {
    let n = tiles.len() as u32;
    let cols = n.min(per_row);
    let rows = n.div_ceil(per_row);
    let mut sheet = canvas::blank(cols * size.width, rows * size.height, BLACK);
    for (i, tile) in tiles.iter().enumerate() {
        let i = i as u32;
        let x = (i % per_row) * size.width;
        let y = (i / per_row) * size.height;
        canvas::paste_tile(&mut sheet, tile, x as i64, y as i64);
    }
    sheet
}

impl Transform for MergeUnique {
    fn name(&self) -> &'static str {
        "merge-unique"
    }

    fn description(&self) -> &'static str {
        "Unique 8x8 tiles of this image and a second one (with=<path>)"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let other_path = params.get_str("with").unwrap_or_default();
        if other_path.is_empty() || !Path::new(&other_path).exists() {
            warn!(path = %other_path, "second image not found");
            return Ok(TransformOutput::image(image.clone()).with_message(MISSING_IMAGE_MESSAGE));
        }
        let other = output::load_image(Path::new(&other_path))?;

        let size = TileSize::SQUARE_8;
        let tiles = unique_tiles([image, &other], size);
        if tiles.is_empty() {
            return Err(TransformError::Empty {
                op: self.name().into(),
                message: "neither image contains a full 8x8 tile".into(),
            });
        }

        debug!(unique = tiles.len(), "merged unique tiles");
        Ok(TransformOutput::image(pack_tiles(&tiles, size, TILES_PER_ROW)))
    }
}
