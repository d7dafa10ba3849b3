//! Spread pixels apart with transparent gaps

use image::{Rgba, RgbaImage};

use super::{Result, Transform, TransformContext, TransformError, TransformOutput};
use crate::params::Params;

/// Fill between spread pixels
pub const GAP_FILL: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Debug, Clone, Copy, Default)]
pub struct Gaps;

/// Largest spread output, in pixels
pub const MAX_SPREAD_PIXELS: u64 = 1 << 28;

/// Output dimensions for `spread`, `None` when they leave `u32` or exceed [`MAX_SPREAD_PIXELS`].
pub fn spread_size(width: u32, height: u32, gap: u32) -> Option<(u32, u32)> {
    let grow = |n: u32| n.checked_sub(1)?.checked_mul(gap)?.checked_add(n);
    let (w, h) = (grow(width)?, grow(height)?);
    (u64::from(w) * u64::from(h) <= MAX_SPREAD_PIXELS).then_some((w, h))
}

/// Copy pixel `(x, y)` to `(x * (gap + 1), y * (gap + 1))`.
pub fn spread(image: &RgbaImage, gap: u32) -> Option<RgbaImage> {
    let (w, h) = spread_size(image.width(), image.height(), gap)?;
    let step = gap.saturating_add(1);
    let mut out = RgbaImage::from_pixel(w, h, GAP_FILL);
    for (x, y, p) in image.enumerate_pixels() {
        out.put_pixel(x * step, y * step, *p);
    }
    Some(out)
}

impl Transform for Gaps {
    fn name(&self) -> &'static str {
        "gaps"
    }

    fn description(&self) -> &'static str {
        "Insert transparent gaps of `gap` pixels between all pixels"
    }

    fn apply(&self, image: &RgbaImage, params: &Params, _ctx: &TransformContext) -> Result<TransformOutput> {
        let gap = params.get_u32("gap", 1)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TransformError::Empty { op: self.name().into(), message: "image has no pixels".into() });
        }
        let out = spread(image, gap).ok_or_else(|| {
            TransformError::invalid(
                self.name(),
                format!("gap {} makes a {}x{} image too large", gap, image.width(), image.height()),
            )
        })?;
        Ok(TransformOutput::image(out))
    }
}
