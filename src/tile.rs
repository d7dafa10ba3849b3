//! Tile geometry: fixed-size pixel blocks cut from a grid overlay
//!
//! Provides the `Tile` pixel block, the four flip variants used for
//! flip-normalized matching, and `TileGrid` for walking an image in
//! row-major grid order.

use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Errors raised while building tile geometry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Width or height was zero
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    /// Size string was not `WxH`
    #[error("invalid tile size '{0}', expected WxH (e.g. 8x16)")]
    InvalidFormat(String),
}

/// Reflection applied to a tile.
///
/// `Both` is a horizontal plus vertical flip, which equals a 180° rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    /// Lookup order used when matching a tile against known tiles
    pub const ALL: [Flip; 4] = [Flip::None, Flip::Horizontal, Flip::Vertical, Flip::Both];

    /// Build a flip from the two axis flags.
    pub fn from_axes(flip_x: bool, flip_y: bool) -> Self {
        match (flip_x, flip_y) {
            (false, false) => Flip::None,
            (true, false) => Flip::Horizontal,
            (false, true) => Flip::Vertical,
            (true, true) => Flip::Both,
        }
    }

    /// Mirrors left-to-right
    pub fn flip_x(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    /// Mirrors top-to-bottom
    pub fn flip_y(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }

    /// Short label: "", "H", "V" or "HV".
    pub fn label(self) -> &'static str {
        match self {
            Flip::None => "",
            Flip::Horizontal => "H",
            Flip::Vertical => "V",
            Flip::Both => "HV",
        }
    }
}

/// Tile dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    /// 8x8 background tile
    pub const SQUARE_8: TileSize = TileSize { width: 8, height: 8 };
    /// 8x16 sprite tile
    pub const SPRITE_8X16: TileSize = TileSize { width: 8, height: 16 };

    pub fn new(width: u32, height: u32) -> Result<Self, TileError> {
        if width == 0 || height == 0 {
            return Err(TileError::ZeroSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Square tile of the given edge length.
    pub fn square(edge: u32) -> Result<Self, TileError> {
        Self::new(edge, edge)
    }

    /// Parse a `WxH` string such as `8x16`.
    pub fn parse(s: &str) -> Result<Self, TileError> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| TileError::InvalidFormat(s.to_string()))?;
        let width = w.trim().parse().map_err(|_| TileError::InvalidFormat(s.to_string()))?;
        let height = h.trim().parse().map_err(|_| TileError::InvalidFormat(s.to_string()))?;
        Self::new(width, height)
    }

    /// Number of pixels in one tile
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for TileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An owned block of RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Tile {
    /// Build a tile from raw RGBA bytes (row-major, 4 bytes per pixel).
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Build a tile filled with one color.
    pub fn filled(size: TileSize, color: Rgba<u8>) -> Self {
        let pixels = color.0.iter().copied().cycle().take(size.area() * 4).collect();
        Self { width: size.width, height: size.height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> TileSize {
        TileSize { width: self.width, height: self.height }
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        let i = ((y * self.width + x) * 4) as usize;
        Rgba([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Return this tile reflected by `flip`.
    pub fn flipped(&self, flip: Flip) -> Tile {
        if flip == Flip::None {
            return self.clone();
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = vec![0u8; self.pixels.len()];
        for y in 0..h {
            let src_y = if flip.flip_y() { h - 1 - y } else { y };
            for x in 0..w {
                let src_x = if flip.flip_x() { w - 1 - x } else { x };
                let src = (src_y * w + src_x) * 4;
                let dst = (y * w + x) * 4;
                pixels[dst..dst + 4].copy_from_slice(&self.pixels[src..src + 4]);
            }
        }
        Tile { width: self.width, height: self.height, pixels }
    }

    /// True when every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgba<u8>) -> bool {
        self.pixels.chunks_exact(4).all(|px| px == color.0)
    }

    /// Convert into an image buffer for pasting.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// Crop one tile at pixel origin `(x, y)`.
///
/// Pixels outside the image are opaque black.
pub fn crop_tile(image: &RgbaImage, x: u32, y: u32, size: TileSize) -> Tile {
    let (img_w, img_h) = image.dimensions();
    let mut pixels = Vec::with_capacity(size.area() * 4);
    for ty in 0..size.height {
        for tx in 0..size.width {
            let (px, py) = (x + tx, y + ty);
            if px < img_w && py < img_h {
                pixels.extend_from_slice(&image.get_pixel(px, py).0);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }
    Tile { width: size.width, height: size.height, pixels }
}

/// What to do with tiles that hang over the right or bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Only complete tiles are extracted
    #[default]
    Skip,
    /// Partial tiles are padded with opaque black
    Pad,
}

/// One cell of a tile grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTile {
    /// Pixel x of the tile origin
    pub x: u32,
    /// Pixel y of the tile origin
    pub y: u32,
    /// Grid column
    pub col: u32,
    /// Grid row
    pub row: u32,
    pub tile: Tile,
}

/// Tiles of an image in row-major order
#[derive(Debug, Clone)]
pub struct TileGrid {
    size: TileSize,
    cols: u32,
    rows: u32,
    tiles: Vec<GridTile>,
}

impl TileGrid {
    /// Walk `image` with a stride of one tile, top row first.
    pub fn extract(image: &RgbaImage, size: TileSize, edge: EdgePolicy) -> Self {
        let (img_w, img_h) = image.dimensions();
        let (cols, rows) = match edge {
            EdgePolicy::Skip => (img_w / size.width, img_h / size.height),
            EdgePolicy::Pad => (img_w.div_ceil(size.width), img_h.div_ceil(size.height)),
        };

        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = (col * size.width, row * size.height);
                tiles.push(GridTile { x, y, col, row, tile: crop_tile(image, x, y, size) });
            }
        }

        Self { size, cols, rows, tiles }
    }

    pub fn size(&self) -> TileSize {
        self.size
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridTile> {
        self.tiles.iter()
    }

    /// Tile at grid cell `(col, row)`.
    pub fn get(&self, col: u32, row: u32) -> Option<&GridTile> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.cols + col) as usize)
    }
}

impl<'a> IntoIterator for &'a TileGrid {
    type Item = &'a GridTile;
    type IntoIter = std::slice::Iter<'a, GridTile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}
