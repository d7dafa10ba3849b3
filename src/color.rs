//! Color parsing and formatting
//!
//! Supports the following formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - A handful of named colors used by the marking transforms

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Not a hex color and not a known name
    #[error("unknown color '{0}'")]
    Unknown(String),
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const PINK: Rgba<u8> = Rgba([255, 192, 203, 255]);
pub const HOT_PINK: Rgba<u8> = Rgba([255, 105, 180, 255]);
pub const ORANGE: Rgba<u8> = Rgba([255, 165, 0, 255]);
pub const YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);
pub const CYAN: Rgba<u8> = Rgba([0, 255, 255, 255]);
pub const CHROMA_GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

const NAMED: &[(&str, Rgba<u8>)] = &[
    ("white", WHITE),
    ("black", BLACK),
    ("pink", PINK),
    ("hotpink", HOT_PINK),
    ("orange", ORANGE),
    ("yellow", YELLOW),
    ("cyan", CYAN),
    ("lime", CHROMA_GREEN),
    ("transparent", Rgba([0, 0, 0, 0])),
];

/// Parse a hex or named color into RGBA.
///
/// # Examples
///
/// ```
/// use tilesmith::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("#00FF00").unwrap(), image::Rgba([0, 255, 0, 255]));
/// assert_eq!(parse_color("cyan").unwrap(), image::Rgba([0, 255, 255, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if s.starts_with('#') {
        return parse_hex(s);
    }

    let lower = s.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
        .ok_or_else(|| ColorError::Unknown(s.to_string()))
}

/// Parse a hex color string (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
pub fn parse_hex(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    let Some(hex) = s.strip_prefix('#') else {
        return Err(if s.is_empty() { ColorError::Empty } else { ColorError::Unknown(s.to_string()) });
    };

    let digits = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(ColorError::InvalidHex(c)))
        .collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Format as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Opaque color from RGB components.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// ITU-R 601-2 luma in 16-bit fixed point, rounded.
pub fn luma(color: Rgba<u8>) -> u8 {
    let [r, g, b, _] = color.0;
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Stable, well-spread opaque color for a label number.
pub fn label_color(n: usize) -> Rgba<u8> {
    let mut h = (n as u32).wrapping_mul(0x9E37_79B9) ^ 0x5bd1_e995;
    h ^= h >> 15;
    h = h.wrapping_mul(0x2c1b_3c6d);
    h ^= h >> 12;
    // Keep channels away from white so white label text stays readable
    rgb((h & 0xBF) as u8, ((h >> 8) & 0xBF) as u8, ((h >> 16) & 0xBF) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_lengths() {
        assert_eq!(parse_color("#F00").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("#F008").unwrap(), Rgba([255, 0, 0, 136]));
        assert_eq!(parse_color("#071821").unwrap(), Rgba([7, 24, 33, 255]));
        assert_eq!(parse_color("#86c06c80").unwrap(), Rgba([134, 192, 108, 128]));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_color(""), Err(ColorError::Empty));
        assert_eq!(parse_color("#12345"), Err(ColorError::InvalidLength(5)));
        assert_eq!(parse_color("#GG0000"), Err(ColorError::InvalidHex('G')));
        assert!(matches!(parse_color("mauve"), Err(ColorError::Unknown(_))));
    }

    #[test]
    fn test_named_is_case_insensitive() {
        assert_eq!(parse_color("HotPink").unwrap(), HOT_PINK);
    }

    #[test]
    fn test_parse_hex_rejects_names() {
        assert_eq!(parse_hex(" #0f0 "), Ok(CHROMA_GREEN));
        assert_eq!(parse_hex("cyan"), Err(ColorError::Unknown("cyan".into())));
        assert_eq!(parse_hex(""), Err(ColorError::Empty));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(rgb(224, 248, 207)), "#E0F8CF");
        assert_eq!(to_hex(Rgba([1, 2, 3, 4])), "#01020304");
    }

    #[test]
    fn test_luma() {
        assert_eq!(luma(WHITE), 255);
        assert_eq!(luma(BLACK), 0);
        assert_eq!(luma(rgb(255, 0, 0)), 76);
    }

    #[test]
    fn test_label_color_is_deterministic_and_opaque() {
        assert_eq!(label_color(3), label_color(3));
        assert_ne!(label_color(1), label_color(2));
        assert_eq!(label_color(42).0[3], 255);
    }
}
