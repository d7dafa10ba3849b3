//! Small drawing helpers on `RgbaImage`

use image::{Rgba, RgbaImage};

use crate::tile::Tile;

/// New image filled with one color.
pub fn blank(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Copy `src` into `dst` at `(x, y)`; whatever falls outside is dropped.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    image::imageops::replace(dst, src, x, y);
}

/// Copy a tile into `dst` at `(x, y)`.
pub fn paste_tile(dst: &mut RgbaImage, tile: &Tile, x: i64, y: i64) {
    paste(dst, &tile.to_image(), x, y);
}

/// Fill the rectangle `[x, x+w) × [y, y+h)`, clipped.
pub fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(image.width());
    let y_end = y.saturating_add(h).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}

/// One-pixel outline of the rectangle `[x, x+w) × [y, y+h)`, clipped.
pub fn outline_rect(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let (right, bottom) = (x + w - 1, y + h - 1);
    let mut plot = |px: u32, py: u32| {
        if px < image.width() && py < image.height() {
            image.put_pixel(px, py, color);
        }
    };
    for px in x..=right {
        plot(px, y);
        plot(px, bottom);
    }
    for py in y..=bottom {
        plot(x, py);
        plot(right, py);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn test_fill_rect_clips() {
        let mut image = blank(4, 4, WHITE);
        fill_rect(&mut image, 2, 2, 10, 10, BLACK);
        assert_eq!(*image.get_pixel(3, 3), BLACK);
        assert_eq!(*image.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn test_outline_rect_leaves_interior() {
        let mut image = blank(5, 5, WHITE);
        outline_rect(&mut image, 0, 0, 5, 5, BLACK);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
        assert_eq!(*image.get_pixel(4, 2), BLACK);
        assert_eq!(*image.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn test_paste_offsets() {
        let mut dst = blank(4, 4, WHITE);
        let src = blank(2, 2, BLACK);
        paste(&mut dst, &src, 3, 3);
        assert_eq!(*dst.get_pixel(3, 3), BLACK);
        assert_eq!(*dst.get_pixel(2, 2), WHITE);
    }
}
