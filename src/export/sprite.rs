//! Sprite sheet grid walk and the sprite document model.
//!
//! # Sheet layout
//!
//! Frames run left to right; each frame is `htiles` tiles wide. Tile rows run
//! top to bottom, grouped by state, then animation, then tile row within a
//! frame, then layer:
//!
//! ```text
//! sliceX = (h + frame * htiles) * tile_width
//! sliceY = (((state * anims + anim) * vtiles + v) * layers + layer) * tile_height
//! ```
//!
//! Tiles made only of the background color are left out of the document.
//! With deduplication on, a tile that repeats an earlier tile (optionally
//! under a flip) points at the earlier tile's slice and carries the flip.

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{ExportError, Result};
use crate::color::parse_color;
use crate::dedup::{MatchMode, TileIndex};
use crate::palette::SPRITE_BACKGROUND;
use crate::params::Params;
use crate::tile::{crop_tile, Flip, TileSize};

/// Default animation speed written to new documents
pub const DEFAULT_ANIM_SPEED: u32 = 15;

/// Geometry and naming for one sprite sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteLayout {
    pub name: String,
    pub checksum: String,
    pub tile: TileSize,
    pub states: u32,
    pub anims: u32,
    pub layers: u32,
    /// Tiles per frame, horizontally
    pub htiles: u32,
    /// Tiles per frame, vertically
    pub vtiles: u32,
    /// Palette index per layer
    pub palettes: Vec<u32>,
    /// Frame count per animation; missing entries fill the sheet width
    pub frames: Vec<u32>,
    pub background: Rgba<u8>,
    /// `None` disables deduplication
    pub dedup: Option<MatchMode>,
    pub anim_speed: u32,
}

impl SpriteLayout {
    /// Single state, single animation, one 8x16 tile per frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checksum: String::new(),
            tile: TileSize::SPRITE_8X16,
            states: 1,
            anims: 1,
            layers: 1,
            htiles: 1,
            vtiles: 1,
            palettes: vec![1],
            frames: Vec::new(),
            background: SPRITE_BACKGROUND,
            dedup: None,
            anim_speed: DEFAULT_ANIM_SPEED,
        }
    }

    /// Read a layout from transform parameters.
    ///
    /// `source` supplies the default name (file stem) and checksum (SHA-256
    /// of the file bytes).
    pub fn from_params(params: &Params, source: Option<&Path>) -> Result<Self> {
        let name = match params.get_str("name") {
            Some(name) => name,
            None => source
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sprite".to_string()),
        };

        let mut layout = SpriteLayout::new(name);
        layout.checksum = match params.get_str("chksum") {
            Some(sum) => sum,
            None => source.and_then(|p| file_checksum(p).ok()).unwrap_or_default(),
        };
        layout.tile = TileSize::new(params.get_u32("twidth", 8)?, params.get_u32("theight", 16)?)?;
        layout.states = params.get_u32("states", 1)?;
        layout.anims = params.get_u32("anims", 1)?;
        layout.layers = params.get_u32("layers", 1)?;
        layout.htiles = params.get_u32("htiles", 1)?;
        layout.vtiles = params.get_u32("vtiles", 1)?;
        layout.anim_speed = params.get_u32("speed", DEFAULT_ANIM_SPEED)?;
        if let Some(palettes) = params.get_u32_list("palettes")? {
            layout.palettes = palettes;
        }
        if let Some(frames) = params.get_u32_list("frames")? {
            layout.frames = frames;
        }
        if let Some(bg) = params.get_str("background") {
            layout.background = parse_color(&bg)?;
        }
        if params.get_bool("dedup", false)? {
            layout.dedup = Some(if params.get_bool("flips", true)? {
                MatchMode::FlipNormalized
            } else {
                MatchMode::Exact
            });
        }

        layout.validate()?;
        Ok(layout)
    }

    /// Check the tile counts and that a frame fits the document's `i32` coordinates.
    pub fn validate(&self) -> Result<()> {
        if self.htiles == 0 || self.vtiles == 0 || self.layers == 0 {
            return Err(ExportError::Config("htiles, vtiles and layers must be at least 1".into()));
        }
        let max = i32::MAX as u32;
        match (self.htiles.checked_mul(self.tile.width), self.vtiles.checked_mul(self.tile.height)) {
            (Some(w), Some(h)) if w <= max && h <= max => Ok(()),
            _ => Err(ExportError::Config(format!(
                "frame of {}x{} tiles of {} is too large",
                self.htiles, self.vtiles, self.tile
            ))),
        }
    }

    /// Frame count for animation `anim` on a sheet `sheet_width` pixels wide.
    pub fn frames_for(&self, anim: u32, sheet_width: u32) -> u32 {
        self.frames
            .get(anim as usize)
            .copied()
            .unwrap_or_else(|| sheet_width.checked_div(self.canvas_width()).unwrap_or(0))
    }

    /// Horizontal offset that keeps frames wider than two tiles centered.
    pub fn h_compensation(&self) -> i32 {
        if self.htiles <= 2 {
            0
        } else {
            i32::try_from(self.htiles - 2).unwrap_or(i32::MAX).saturating_mul(-4)
        }
    }

    /// Palette index for a layer; layers without an entry use 0.
    pub fn palette_for(&self, layer: u32) -> u32 {
        self.palettes.get(layer as usize).copied().unwrap_or(0)
    }

    pub fn canvas_width(&self) -> u32 {
        self.htiles.saturating_mul(self.tile.width)
    }

    pub fn canvas_height(&self) -> u32 {
        self.vtiles.saturating_mul(self.tile.height)
    }

    /// Pixel origin of one tile slice on the sheet, `None` past `u32` range.
    pub fn slice_origin(&self, state: u32, anim: u32, frame: u32, v: u32, h: u32, layer: u32) -> Option<(u32, u32)> {
        let x = frame.checked_mul(self.htiles)?.checked_add(h)?.checked_mul(self.tile.width)?;
        let row = state
            .checked_mul(self.anims)?
            .checked_add(anim)?
            .checked_mul(self.vtiles)?
            .checked_add(v)?
            .checked_mul(self.layers)?
            .checked_add(layer)?;
        Some((x, row.checked_mul(self.tile.height)?))
    }
}

/// SHA-256 of a file, lowercase hex.
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(Sha256::digest(&bytes).iter().map(|b| format!("{:02x}", b)).collect())
}

/// Source of document ids
#[derive(Debug, Clone)]
pub enum IdGen {
    /// Random v4 UUIDs
    Uuid,
    /// `prefix-0`, `prefix-1`, ... for reproducible output
    Sequential { prefix: String, next: u64 },
}

impl IdGen {
    pub fn uuid() -> Self {
        IdGen::Uuid
    }

    pub fn sequential(prefix: impl Into<String>) -> Self {
        IdGen::Sequential { prefix: prefix.into(), next: 0 }
    }

    pub fn next_id(&mut self) -> String {
        match self {
            IdGen::Uuid => uuid::Uuid::new_v4().to_string(),
            IdGen::Sequential { prefix, next } => {
                let id = format!("{}-{}", prefix, next);
                *next += 1;
                id
            }
        }
    }
}

/// Top-level sprite resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteDocument {
    #[serde(rename = "_resourceType")]
    pub resource_type: String,
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub num_frames: u32,
    pub filename: String,
    pub checksum: String,
    pub width: u32,
    pub height: u32,
    pub states: Vec<SpriteState>,
    pub num_tiles: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub bounds_x: i32,
    pub bounds_y: i32,
    pub bounds_width: u32,
    pub bounds_height: u32,
    pub anim_speed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteState {
    pub id: String,
    pub name: String,
    pub animation_type: String,
    pub flip_left: bool,
    pub animations: Vec<SpriteAnimation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteAnimation {
    pub id: String,
    pub frames: Vec<SpriteFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteFrame {
    pub id: String,
    pub tiles: Vec<SpriteTile>,
}

/// One hardware sprite tile placed within a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteTile {
    #[serde(rename = "_comment")]
    pub comment: String,
    pub id: String,
    /// Position within the frame canvas
    pub x: i32,
    pub y: i32,
    /// Source position on the sheet
    pub slice_x: u32,
    pub slice_y: u32,
    pub palette: u32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub obj_palette: String,
    pub palette_index: u32,
    pub priority: bool,
}

impl SpriteTile {
    pub fn flip(&self) -> Flip {
        Flip::from_axes(self.flip_x, self.flip_y)
    }
}

impl SpriteDocument {
    fn empty(layout: &SpriteLayout, width: u32, height: u32, ids: &mut IdGen) -> Self {
        Self {
            resource_type: "sprite".to_string(),
            id: ids.next_id(),
            name: layout.name.clone(),
            symbol: format!("sprite_{}", layout.name.replace(' ', "_")),
            num_frames: 0,
            filename: format!("{}.png", layout.name),
            checksum: layout.checksum.clone(),
            width,
            height,
            states: Vec::new(),
            num_tiles: 0,
            canvas_width: layout.canvas_width(),
            canvas_height: layout.canvas_height(),
            bounds_x: 0,
            bounds_y: 0,
            bounds_width: layout.canvas_width(),
            bounds_height: layout.canvas_height(),
            anim_speed: layout.anim_speed,
        }
    }

    /// Every tile in walk order.
    pub fn tiles(&self) -> impl Iterator<Item = &SpriteTile> {
        self.states
            .iter()
            .flat_map(|s| &s.animations)
            .flat_map(|a| &a.frames)
            .flat_map(|f| &f.tiles)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Walk the sheet and build its document.
pub fn build_sprite_document(image: &RgbaImage, layout: &SpriteLayout, ids: &mut IdGen) -> Result<SpriteDocument> {
    let (width, height) = image.dimensions();
    if width % layout.tile.width != 0 || height % layout.tile.height != 0 {
        return Err(ExportError::Dimensions { width, height, tile: layout.tile });
    }

    layout.validate()?;

    let mut doc = SpriteDocument::empty(layout, width, height, ids);
    let mut index = layout.dedup.map(TileIndex::new);
    let mut reused = 0usize;

    for state_index in 0..layout.states {
        let mut state = SpriteState {
            id: ids.next_id(),
            name: String::new(),
            animation_type: "fixed".to_string(),
            flip_left: false,
            animations: Vec::new(),
        };

        for anim_index in 0..layout.anims {
            let mut animation = SpriteAnimation { id: ids.next_id(), frames: Vec::new() };

            for frame_index in 0..layout.frames_for(anim_index, width) {
                doc.num_frames += 1;
                let mut frame = SpriteFrame { id: ids.next_id(), tiles: Vec::new() };
                let mut tile_in_frame = 0;

                for v in 0..layout.vtiles {
                    for h in 0..layout.htiles {
                        for layer in 0..layout.layers {
                            let (slice_x, slice_y) = layout
                                .slice_origin(state_index, anim_index, frame_index, v, h, layer)
                                .ok_or_else(|| {
                                    ExportError::Config(format!(
                                        "slice for state {} anim {} frame {} is out of range",
                                        state_index, anim_index, frame_index
                                    ))
                                })?;
                            if u64::from(slice_x) + u64::from(layout.tile.width) > u64::from(width)
                                || u64::from(slice_y) + u64::from(layout.tile.height) > u64::from(height)
                            {
                                return Err(ExportError::OutOfBounds { x: slice_x, y: slice_y, width, height });
                            }

                            let tile = crop_tile(image, slice_x, slice_y, layout.tile);
                            if tile.is_uniform(layout.background) {
                                continue;
                            }

                            let (src_x, src_y, flip) = match index.as_mut() {
                                Some(index) => {
                                    let found = index.insert_or_match(&tile, slice_x, slice_y);
                                    if found.existing {
                                        reused += 1;
                                    }
                                    (found.x, found.y, found.flip)
                                }
                                None => (slice_x, slice_y, Flip::None),
                            };

                            doc.num_tiles += 1;
                            frame.tiles.push(SpriteTile {
                                comment: format!(
                                    "item: {}   state: {}   anim: {}   frame: {}   tile: {}   layer: {}",
                                    doc.num_tiles, state_index, anim_index, frame_index, tile_in_frame, layer
                                ),
                                id: ids.next_id(),
                                x: (h * layout.tile.width) as i32 + layout.h_compensation(),
                                y: (v * layout.tile.height) as i32,
                                slice_x: src_x,
                                slice_y: src_y,
                                palette: 0,
                                flip_x: flip.flip_x(),
                                flip_y: flip.flip_y(),
                                obj_palette: "OBP0".to_string(),
                                palette_index: layout.palette_for(layer),
                                priority: false,
                            });
                            tile_in_frame += 1;
                        }
                    }
                }

                animation.frames.push(frame);
            }
            state.animations.push(animation);
        }
        doc.states.push(state);
    }

    debug!(
        name = %doc.name,
        frames = doc.num_frames,
        tiles = doc.num_tiles,
        reused,
        "built sprite document"
    );
    Ok(doc)
}
