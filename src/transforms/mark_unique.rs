//! Mark unique background tiles
//!
//! The top-left pixel of every full tile is recolored: cyan for the first
//! occurrence of a tile, pink for each repeat. Tiles are compared on the
//! input pixels, so earlier marks never affect later matches.

use image::RgbaImage;
use tracing::debug;

use super::{square_tile_param, Result, Transform, TransformContext, TransformOutput};
use crate::color::{CYAN, HOT_PINK};
use crate::dedup::TileIndex;
use crate::params::Params;
use crate::tile::{EdgePolicy, TileGrid};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkUnique;

impl Transform for MarkUnique {
    fn name(&self) -> &'static str {
        "mark-unique"
    }

    fn description(&self) -> &'static str {
        "Mark first-seen tiles cyan and repeated tiles pink"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let size = square_tile_param(self.name(), params)?;
        let grid = TileGrid::extract(image, size, EdgePolicy::Skip);

        let mut index = TileIndex::exact();
        let mut marked = image.clone();
        let mut repeats = 0usize;
        for cell in &grid {
            let found = index.insert_or_match(&cell.tile, cell.x, cell.y);
            let mark = if found.existing {
                repeats += 1;
                HOT_PINK
            } else {
                CYAN
            };
            marked.put_pixel(cell.x, cell.y, mark);
        }

        debug!(tiles = grid.len(), unique = index.len(), repeats, "marked tiles");
        Ok(TransformOutput::image(marked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas;
    use crate::color::{rgb, BLACK, WHITE};

    #[test]
    fn test_marks_first_and_repeats() {
        // Three 8x8 tiles in a row: A, B, A
        let mut image = canvas::blank(24, 8, WHITE);
        canvas::fill_rect(&mut image, 8, 0, 8, 8, BLACK);

        let out = MarkUnique.apply(&image, &Params::new(), &TransformContext::default()).unwrap();
        assert_eq!(*out.image.get_pixel(0, 0), CYAN);
        assert_eq!(*out.image.get_pixel(8, 0), CYAN);
        assert_eq!(*out.image.get_pixel(16, 0), HOT_PINK);
        assert_eq!(*out.image.get_pixel(1, 0), WHITE);
    }

    #[test]
    fn test_partial_edge_tiles_untouched() {
        let image = canvas::blank(12, 12, rgb(3, 3, 3));
        let out = MarkUnique.apply(&image, &Params::new(), &TransformContext::default()).unwrap();
        assert_eq!(*out.image.get_pixel(0, 0), CYAN);
        assert_eq!(*out.image.get_pixel(8, 0), rgb(3, 3, 3));
        assert_eq!(*out.image.get_pixel(0, 8), rgb(3, 3, 3));
    }

    #[test]
    fn test_custom_tile_size() {
        let image = canvas::blank(8, 4, WHITE);
        let out = MarkUnique.apply(&image, &Params::parse("tile=4"), &TransformContext::default()).unwrap();
        assert_eq!(*out.image.get_pixel(0, 0), CYAN);
        assert_eq!(*out.image.get_pixel(4, 0), HOT_PINK);
    }

    #[test]
    fn test_zero_tile_rejected() {
        let image = canvas::blank(8, 8, WHITE);
        assert!(MarkUnique.apply(&image, &Params::parse("tile=0"), &TransformContext::default()).is_err());
    }
}
