//! Minimal 3x5 bitmap font for tile labels
//!
//! Covers digits and the flip letters. Unknown characters draw nothing but
//! still advance the cursor.

use image::{Rgba, RgbaImage};

/// Glyph width in pixels
pub const GLYPH_WIDTH: u32 = 3;
/// Glyph height in pixels
pub const GLYPH_HEIGHT: u32 = 5;
/// Horizontal advance per character (glyph plus one pixel of spacing)
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

// Each row is three bits, most significant bit on the left.
fn glyph(c: char) -> Option<[u8; 5]> {
    let rows = match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        _ => return None,
    };
    Some(rows)
}

/// Width in pixels of `text` when drawn.
pub fn text_width(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        n * ADVANCE - 1
    }
}

/// Draw `text` with its top-left corner at `(x, y)`, clipped to the image.
pub fn draw_text(image: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else { continue };
        let origin_x = x + i as i64 * ADVANCE as i64;
        for (dy, bits) in rows.iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                if bits & (0b100 >> dx) == 0 {
                    continue;
                }
                let (px, py) = (origin_x + dx as i64, y + dy as i64);
                if px >= 0 && py >= 0 && px < w && py < h {
                    image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}
