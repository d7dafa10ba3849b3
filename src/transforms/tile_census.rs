//! Tile census sheet
//!
//! Counts every distinct tile (edge tiles padded with black) and renders:
//!
//! - the original image, with rare tiles outlined by count
//!   (1 pink, 2 orange, 3 yellow)
//! - below it, each distinct tile once, rarest first, with its count
//!
//! The sheet keeps the input width. Unique tiles flow left to right,
//! `tile + gap` apart, in rows `tile + 20` pixels tall.

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{square_tile_param, Result, Transform, TransformContext, TransformError, TransformOutput};
use crate::canvas;
use crate::color::{BLACK, ORANGE, PINK, WHITE, YELLOW};
use crate::dedup::TileCensus;
use crate::font;
use crate::params::Params;
use crate::tile::{EdgePolicy, TileGrid};

/// Vertical space reserved under each row of listed tiles
const ROW_PADDING: u32 = 20;
/// Gap between a listed tile and its count
const LABEL_OFFSET: u32 = 2;

/// Largest census sheet, in pixels
const MAX_SHEET_PIXELS: u64 = 1 << 28;

/// Rows of listed tiles and total sheet height, `None` when the sheet grows past [`MAX_SHEET_PIXELS`].
fn sheet_layout(width: u32, height: u32, tile: u32, gap: u32, entries: usize) -> Option<(u32, u32)> {
    let stride = u64::from(tile) + u64::from(gap);
    let rows = (entries as u64).checked_mul(stride)? / u64::from(width) + 1;
    let sheet_height = (u64::from(tile) + u64::from(ROW_PADDING)).checked_mul(rows)?.checked_add(u64::from(height))?;
    if sheet_height.checked_mul(u64::from(width))? > MAX_SHEET_PIXELS {
        return None;
    }
    Some((u32::try_from(rows).ok()?, u32::try_from(sheet_height).ok()?))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TileCensusSheet;

fn outline_color(count: usize) -> Option<Rgba<u8>> {
    match count {
        1 => Some(PINK),
        2 => Some(ORANGE),
        3 => Some(YELLOW),
        _ => None,
    }
}

impl Transform for TileCensusSheet {
    fn name(&self) -> &'static str {
        "tile-census"
    }

    fn description(&self) -> &'static str {
        "Outline rare tiles and list every unique tile with its count"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let size = square_tile_param(self.name(), params)?;
        let gap = params.get_u32("gap", 5)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TransformError::Empty { op: self.name().into(), message: "image has no pixels".into() });
        }

        let grid = TileGrid::extract(image, size, EdgePolicy::Pad);
        let census = TileCensus::from_tiles(grid.iter().map(|c| (&c.tile, c.x, c.y)));
        let tile = size.width;
        let (rows, sheet_height) = sheet_layout(width, height, tile, gap, census.len()).ok_or_else(|| {
            TransformError::invalid(
                self.name(),
                format!("gap {} lists {} tiles on a sheet too large to draw", gap, census.len()),
            )
        })?;
        let mut sheet = canvas::blank(width, sheet_height, WHITE);
        canvas::paste(&mut sheet, image, 0, 0);

        for entry in census.entries() {
            if let Some(color) = outline_color(entry.count) {
                for &(x, y) in &entry.positions {
                    canvas::outline_rect(&mut sheet, x, y, tile, tile, color);
                }
            }
        }

        let (tile, stride) = (i64::from(tile), i64::from(tile) + i64::from(gap));
        let (mut x, mut y) = (0i64, i64::from(height) + i64::from(gap));
        for entry in census.sorted_by_count() {
            canvas::paste_tile(&mut sheet, &entry.tile, x, y);
            font::draw_text(&mut sheet, x, y + tile + i64::from(LABEL_OFFSET), &entry.count.to_string(), BLACK);

            x += stride;
            if x + tile > i64::from(width) {
                x = 0;
                y += tile + i64::from(ROW_PADDING);
            }
        }

        debug!(tiles = grid.len(), unique = census.len(), rows, "rendered tile census");
        Ok(TransformOutput::image(sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb;

    fn apply(image: &RgbaImage) -> RgbaImage {
        TileCensusSheet.apply(image, &Params::new(), &TransformContext::default()).unwrap().image
    }

    #[test]
    fn test_sheet_dimensions() {
        // 4 tiles wide, all identical: 1 unique tile, 1 row
        let image = canvas::blank(32, 8, rgb(10, 10, 10));
        let sheet = apply(&image);
        assert_eq!(sheet.dimensions(), (32, 8 + 28));
    }

    #[test]
    fn test_rows_wrap_by_count() {
        // 4 distinct tiles, stride 13: 52 / 16 + 1 = 4 rows
        let mut image = RgbaImage::new(16, 16);
        for (i, (x, y)) in [(0, 0), (8, 0), (0, 8), (8, 8)].into_iter().enumerate() {
            canvas::fill_rect(&mut image, x, y, 8, 8, rgb(i as u8 * 50, 0, 0));
        }
        let sheet = apply(&image);
        assert_eq!(sheet.dimensions(), (16, 16 + 28 * 4));

        // First listed tile at (0, h + gap); the second wraps to the next row
        assert_eq!(*sheet.get_pixel(1, 22), rgb(0, 0, 0));
        assert_eq!(*sheet.get_pixel(1, 22 + 28), rgb(50, 0, 0));
    }

    #[test]
    fn test_outlines_by_count() {
        // Tiles: A, A, B -> A twice (orange), B once (pink)
        let mut image = canvas::blank(24, 8, rgb(1, 1, 1));
        canvas::fill_rect(&mut image, 16, 0, 8, 8, rgb(2, 2, 2));
        let sheet = apply(&image);

        assert_eq!(*sheet.get_pixel(0, 0), ORANGE);
        assert_eq!(*sheet.get_pixel(15, 7), ORANGE);
        assert_eq!(*sheet.get_pixel(16, 0), PINK);
        assert_eq!(*sheet.get_pixel(4, 4), rgb(1, 1, 1));
    }

    #[test]
    fn test_frequent_tiles_not_outlined() {
        let image = canvas::blank(32, 8, rgb(1, 1, 1));
        let sheet = apply(&image);
        assert_eq!(*sheet.get_pixel(0, 0), rgb(1, 1, 1));
    }

    #[test]
    fn test_rarest_listed_first_with_count() {
        let mut image = canvas::blank(40, 8, rgb(1, 1, 1));
        canvas::fill_rect(&mut image, 32, 0, 8, 8, rgb(2, 2, 2));
        let sheet = apply(&image);

        // B (count 1) first, A (count 4) second at x = 13
        assert_eq!(*sheet.get_pixel(2, 15), rgb(2, 2, 2));
        assert_eq!(*sheet.get_pixel(15, 15), rgb(1, 1, 1));
        // Count label below the first tile: "1" has ink at (1, 0) of its glyph
        assert_eq!(*sheet.get_pixel(1, 13 + 8 + 2), BLACK);
    }

    #[test]
    fn test_edge_tiles_padded() {
        let image = canvas::blank(12, 8, rgb(5, 5, 5));
        let sheet = apply(&image);
        // Full tile and padded tile are distinct: 2 entries, 26 / 12 + 1 = 3 rows
        assert_eq!(sheet.dimensions(), (12, 8 + 28 * 3));
    }

    #[test]
    fn test_huge_gap_is_error() {
        let image = canvas::blank(16, 16, rgb(1, 1, 1));
        for gap in ["gap=4294967295", "gap=100000000"] {
            let err = TileCensusSheet.apply(&image, &Params::parse(gap), &TransformContext::default());
            assert!(matches!(err, Err(TransformError::InvalidParameter { .. })), "{} should be rejected", gap);
        }
        assert_eq!(sheet_layout(16, 16, 8, 5, 4), Some((4, 16 + 28 * 4)));
    }
}
