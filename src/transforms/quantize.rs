//! Brightness/contrast grid reduced to a palette
//!
//! Renders one copy of the image per (brightness, contrast) pair: column `i`
//! uses `brightness[i]`, row `j` uses `contrast[j]`. Each copy is mapped to
//! the nearest colors of the palette so the variants can be compared side by
//! side before picking one for conversion.

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{Result, Transform, TransformContext, TransformError, TransformOutput};
use crate::canvas;
use crate::color::{luma, BLACK};
use crate::palette::{palette_by_name, quantize_to, PALETTE_NAMES};
use crate::params::Params;

pub const DEFAULT_LEVELS: [f32; 3] = [1.0, 1.2, 1.4];

#[derive(Debug, Clone, Copy, Default)]
pub struct Quantize;

/// `base + factor * (value - base)`, truncated and clamped to a channel.
fn blend(base: f32, value: u8, factor: f32) -> u8 {
    let v = base + factor * (value as f32 - base);
    if v <= 0.0 {
        0
    } else if v >= 255.0 {
        255
    } else {
        v as u8
    }
}

/// Scale every channel by `factor`.
pub fn adjust_brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        for c in 0..3 {
            p.0[c] = blend(0.0, p.0[c], factor);
        }
    }
    out
}

/// Blend every channel away from the image's mean luma by `factor`.
pub fn adjust_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let total: u64 = image.pixels().map(|p| luma(*p) as u64).sum();
    let mean = (total as f64 / count as f64 + 0.5).floor() as f32;

    let mut out = image.clone();
    for p in out.pixels_mut() {
        for c in 0..3 {
            p.0[c] = blend(mean, p.0[c], factor);
        }
    }
    out
}

fn levels(params: &Params, key: &str) -> Result<Vec<f32>> {
    let levels = params.get_f32_list(key)?.unwrap_or_else(|| DEFAULT_LEVELS.to_vec());
    if levels.is_empty() {
        return Err(TransformError::invalid("quantize", format!("{} needs at least one level", key)));
    }
    Ok(levels)
}

impl Transform for Quantize {
    fn name(&self) -> &'static str {
        "quantize"
    }

    fn description(&self) -> &'static str {
        "Grid of brightness/contrast variants mapped to a palette"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let brightness = levels(params, "brightness")?;
        let contrast = levels(params, "contrast")?;
        let palette_name = params.get_str("palette").unwrap_or_else(|| "dmg".to_string());
        let palette: &[Rgba<u8>] = palette_by_name(&palette_name).ok_or_else(|| {
            TransformError::invalid(
                self.name(),
                format!("unknown palette '{}', expected one of: {}", palette_name, PALETTE_NAMES.join(", ")),
            )
        })?;

        let (w, h) = image.dimensions();
        let mut grid = canvas::blank(w * brightness.len() as u32, h * contrast.len() as u32, BLACK);
        for (i, &b) in brightness.iter().enumerate() {
            let brightened = adjust_brightness(image, b);
            for (j, &c) in contrast.iter().enumerate() {
                let variant = quantize_to(&adjust_contrast(&brightened, c), palette);
                canvas::paste(&mut grid, &variant, (i as u32 * w) as i64, (j as u32 * h) as i64);
            }
        }

        debug!(palette = %palette_name, columns = brightness.len(), rows = contrast.len(), "quantized variants");
        Ok(TransformOutput::image(grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb;
    use crate::palette::DMG;

    #[test]
    fn test_brightness_scales_and_clamps() {
        let image = RgbaImage::from_pixel(1, 1, rgb(100, 200, 0));
        assert_eq!(*adjust_brightness(&image, 1.2).get_pixel(0, 0), rgb(120, 240, 0));
        assert_eq!(*adjust_brightness(&image, 1.5).get_pixel(0, 0), rgb(150, 255, 0));
        assert_eq!(*adjust_brightness(&image, 1.0).get_pixel(0, 0), rgb(100, 200, 0));
    }

    #[test]
    fn test_contrast_pushes_from_mean() {
        // Mean luma of one black and one white pixel: 127.5 -> 128
        let mut image = RgbaImage::from_pixel(2, 1, rgb(0, 0, 0));
        image.put_pixel(1, 0, rgb(255, 255, 255));
        let out = adjust_contrast(&image, 1.2);
        assert_eq!(*out.get_pixel(0, 0), rgb(0, 0, 0));
        assert_eq!(*out.get_pixel(1, 0), rgb(255, 255, 255));

        let flat = RgbaImage::from_pixel(2, 2, rgb(100, 100, 100));
        assert_eq!(adjust_contrast(&flat, 1.4), flat);
    }

    #[test]
    fn test_contrast_spreads_midtones() {
        let mut image = RgbaImage::from_pixel(2, 1, rgb(100, 100, 100));
        image.put_pixel(1, 0, rgb(140, 140, 140));
        let out = adjust_contrast(&image, 1.5);
        assert_eq!(*out.get_pixel(0, 0), rgb(90, 90, 90));
        assert_eq!(*out.get_pixel(1, 0), rgb(150, 150, 150));
    }

    #[test]
    fn test_grid_layout_and_palette() {
        let image = RgbaImage::from_pixel(2, 3, rgb(150, 150, 150));
        let out = Quantize.apply(&image, &Params::new(), &TransformContext::default()).unwrap();
        assert_eq!(out.image.dimensions(), (6, 9));
        assert!(out.image.pixels().all(|p| DMG.contains(p)));
        // Brighter columns never map to a darker shade
        let first = DMG.iter().position(|c| c == out.image.get_pixel(0, 0));
        let last = DMG.iter().position(|c| c == out.image.get_pixel(5, 0));
        assert!(last <= first);
    }

    #[test]
    fn test_custom_levels_and_palette() {
        let image = RgbaImage::from_pixel(2, 2, rgb(250, 250, 250));
        let params = Params::parse("brightness=1.0,0.1 contrast=1 palette=gray");
        let out = Quantize.apply(&image, &params, &TransformContext::default()).unwrap();
        assert_eq!(out.image.dimensions(), (4, 2));
        assert_eq!(*out.image.get_pixel(0, 0), rgb(255, 255, 255));
        assert_eq!(*out.image.get_pixel(3, 1), rgb(0, 0, 0));
    }

    #[test]
    fn test_unknown_palette() {
        let image = RgbaImage::from_pixel(1, 1, rgb(1, 1, 1));
        let err = Quantize.apply(&image, &Params::parse("palette=nes"), &TransformContext::default());
        assert!(matches!(err, Err(TransformError::InvalidParameter { .. })));
    }
}
