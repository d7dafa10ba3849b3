//! Split extra sprite colors into palette bands
//!
//! A sprite may only use three fixed shades on a chroma-green background.
//! Every other ("new") color is removed from the top section and moved into
//! bands below it, three colors per band: inside a band, pixels of the k-th
//! color of that batch are painted with fixed shade k. The new colors of
//! each band are reported as extra data, keyed `palette <i>` by the index of
//! the band's first color.

use image::{Rgba, RgbaImage};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{Result, Transform, TransformContext, TransformOutput};
use crate::canvas;
use crate::palette::{unique_colors, SPRITE_BACKGROUND, SPRITE_SHADES};
use crate::params::Params;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractColors;

/// Colors of `image` that are neither the background nor a fixed shade.
pub fn new_colors(image: &RgbaImage) -> Vec<Rgba<u8>> {
    unique_colors(image)
        .into_iter()
        .filter(|c| *c != SPRITE_BACKGROUND && !SPRITE_SHADES.contains(c))
        .collect()
}

impl Transform for ExtractColors {
    fn name(&self) -> &'static str {
        "extract-colors"
    }

    fn description(&self) -> &'static str {
        "Move colors outside the fixed sprite palette into extra palette bands"
    }

    fn apply(&self, image: &RgbaImage, _params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let (width, height) = image.dimensions();
        let extra = new_colors(image);
        let batches: Vec<&[Rgba<u8>]> = extra.chunks(SPRITE_SHADES.len()).collect();

        let has_fixed = image.pixels().any(|p| SPRITE_SHADES.contains(p));
        let keep_top = has_fixed || batches.is_empty();
        let top_rows = if keep_top { 1 } else { 0 };

        let sheet_height = height * (top_rows + batches.len() as u32);
        let mut sheet = canvas::blank(width, sheet_height, SPRITE_BACKGROUND);
        let mut palettes = Map::new();

        if keep_top {
            for (x, y, p) in image.enumerate_pixels() {
                if !extra.contains(p) {
                    sheet.put_pixel(x, y, *p);
                }
            }
        }

        for (band, batch) in batches.iter().enumerate() {
            let band_y = height * (top_rows + band as u32);
            for (x, y, p) in image.enumerate_pixels() {
                if let Some(k) = batch.iter().position(|c| c == p) {
                    sheet.put_pixel(x, band_y + y, SPRITE_SHADES[k]);
                }
            }
            let colors: Vec<Value> = batch.iter().map(|c| json!([c.0[0], c.0[1], c.0[2]])).collect();
            palettes.insert(format!("palette {}", band * SPRITE_SHADES.len()), Value::Array(colors));
        }

        debug!(new_colors = extra.len(), bands = batches.len(), keep_top, "extracted colors");
        Ok(TransformOutput::image(sheet).with_data(Value::Object(palettes)))
    }
}
