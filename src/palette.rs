//! Built-in palettes and palette helpers
//!
//! The handheld palettes here are the ones sprite and background assets are
//! reduced to before import into a game-engine project.

use std::collections::BTreeSet;

use image::{Rgba, RgbaImage};

use crate::color::rgb;

/// Four-shade green handheld background palette, lightest first
pub const DMG: [Rgba<u8>; 4] =
    [rgb(224, 248, 208), rgb(136, 192, 112), rgb(52, 104, 86), rgb(8, 24, 32)];

/// Fixed sprite shades (darkest, mid, lightest) used when splitting sprites
/// into palette layers
pub const SPRITE_SHADES: [Rgba<u8>; 3] = [rgb(7, 24, 33), rgb(134, 192, 108), rgb(224, 248, 207)];

/// Transparent key color for sprite sheets
pub const SPRITE_BACKGROUND: Rgba<u8> = rgb(0, 255, 0);

/// Grayscale four-shade palette, lightest first
pub const GRAY: [Rgba<u8>; 4] =
    [rgb(255, 255, 255), rgb(170, 170, 170), rgb(85, 85, 85), rgb(0, 0, 0)];

/// Names accepted by [`palette_by_name`]
pub const PALETTE_NAMES: &[&str] = &["dmg", "gray", "sprite", "gbstudio"];

/// Look up a built-in palette.
pub fn palette_by_name(name: &str) -> Option<&'static [Rgba<u8>]> {
    match name.to_ascii_lowercase().as_str() {
        "dmg" | "gameboy" => Some(&DMG),
        "gray" | "grey" => Some(&GRAY),
        "sprite" | "gbstudio" => Some(&SPRITE_SHADES),
        _ => None,
    }
}

fn distance_sq(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    (0..3)
        .map(|i| {
            let d = a.0[i] as i32 - b.0[i] as i32;
            (d * d) as u32
        })
        .sum()
}

/// Closest palette entry by Euclidean RGB distance; the first entry wins ties.
///
/// Alpha is ignored and the result is opaque. Returns `color` unchanged for an
/// empty palette.
pub fn nearest(color: Rgba<u8>, palette: &[Rgba<u8>]) -> Rgba<u8> {
    let mut best: Option<(u32, Rgba<u8>)> = None;
    for &candidate in palette {
        let d = distance_sq(color, candidate);
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, candidate));
        }
    }
    best.map(|(_, c)| rgb(c.0[0], c.0[1], c.0[2])).unwrap_or(color)
}

/// Map every pixel of `image` to its nearest palette color.
pub fn quantize_to(image: &RgbaImage, palette: &[Rgba<u8>]) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        *px = nearest(*px, palette);
    }
    out
}

/// Distinct RGB colors of an image in ascending `(r, g, b)` order.
pub fn unique_colors(image: &RgbaImage) -> Vec<Rgba<u8>> {
    let set: BTreeSet<[u8; 3]> = image.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    set.into_iter().map(|[r, g, b]| rgb(r, g, b)).collect()
}

/// True when any pixel matches `color` in RGB.
pub fn contains_color(image: &RgbaImage, color: Rgba<u8>) -> bool {
    image.pixels().any(|p| p.0[..3] == color.0[..3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_by_name() {
        assert_eq!(palette_by_name("DMG").unwrap().len(), 4);
        assert_eq!(palette_by_name("sprite").unwrap(), &SPRITE_SHADES);
        assert!(palette_by_name("nes").is_none());
        for name in PALETTE_NAMES {
            assert!(palette_by_name(name).is_some());
        }
    }

    #[test]
    fn test_nearest_picks_closest() {
        assert_eq!(nearest(rgb(250, 250, 250), &DMG), DMG[0]);
        assert_eq!(nearest(rgb(0, 0, 0), &DMG), DMG[3]);
        assert_eq!(nearest(rgb(130, 190, 110), &DMG), DMG[1]);
    }

    #[test]
    fn test_nearest_first_wins_ties() {
        let palette = [rgb(0, 0, 0), rgb(20, 0, 0)];
        assert_eq!(nearest(rgb(10, 0, 0), &palette), palette[0]);
    }

    #[test]
    fn test_nearest_empty_palette() {
        assert_eq!(nearest(rgb(1, 2, 3), &[]), rgb(1, 2, 3));
    }

    #[test]
    fn test_unique_colors_sorted() {
        let mut image = RgbaImage::from_pixel(2, 2, rgb(9, 9, 9));
        image.put_pixel(1, 1, rgb(1, 2, 3));
        image.put_pixel(0, 1, rgb(1, 2, 3));
        assert_eq!(unique_colors(&image), vec![rgb(1, 2, 3), rgb(9, 9, 9)]);
        assert!(contains_color(&image, rgb(9, 9, 9)));
        assert!(!contains_color(&image, rgb(0, 0, 0)));
    }
}
