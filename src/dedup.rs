//! Tile deduplication
//!
//! `TileIndex` remembers the first position at which each distinct tile was
//! seen. In flip-normalized mode a tile also matches a known tile when it
//! equals one of that tile's horizontal, vertical or 180° reflections.
//!
//! `TileCensus` counts how often each exact tile occurs and where.

use std::collections::HashMap;

use crate::tile::{Flip, Tile};

/// How tiles are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Byte-equal pixels only
    #[default]
    Exact,
    /// Byte-equal under any of the four flip variants
    FlipNormalized,
}

/// The canonical (first-seen) occurrence of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalTile {
    /// Dense id in first-seen order, starting at 0
    pub id: usize,
    pub x: u32,
    pub y: u32,
}

/// Result of looking a tile up in the index.
///
/// The tile being looked up equals `canonical.flipped(flip)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMatch {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub flip: Flip,
    /// False when the tile was registered by this call
    pub existing: bool,
}

/// Index of distinct tiles keyed by pixel bytes
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    mode: MatchMode,
    seen: HashMap<Vec<u8>, CanonicalTile>,
}

impl TileIndex {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode, seen: HashMap::new() }
    }

    pub fn exact() -> Self {
        Self::new(MatchMode::Exact)
    }

    pub fn flip_normalized() -> Self {
        Self::new(MatchMode::FlipNormalized)
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of canonical tiles
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Find a known tile matching `tile`.
    ///
    /// Flips are tried in `Flip::ALL` order and the first hit wins. Since
    /// every flip is its own inverse, `tile.flipped(f) == canonical` implies
    /// `tile == canonical.flipped(f)`.
    pub fn lookup(&self, tile: &Tile) -> Option<TileMatch> {
        if let Some(canon) = self.seen.get(tile.pixels()) {
            return Some(Self::matched(canon, Flip::None));
        }
        if self.mode == MatchMode::Exact {
            return None;
        }

        Flip::ALL[1..].iter().find_map(|&flip| {
            let flipped = tile.flipped(flip);
            self.seen.get(flipped.pixels()).map(|canon| Self::matched(canon, flip))
        })
    }

    /// Look `tile` up, registering it at `(x, y)` when it is new.
    pub fn insert_or_match(&mut self, tile: &Tile, x: u32, y: u32) -> TileMatch {
        if let Some(found) = self.lookup(tile) {
            return found;
        }

        let canon = CanonicalTile { id: self.seen.len(), x, y };
        self.seen.insert(tile.pixels().to_vec(), canon);
        TileMatch { id: canon.id, x, y, flip: Flip::None, existing: false }
    }

    fn matched(canon: &CanonicalTile, flip: Flip) -> TileMatch {
        TileMatch { id: canon.id, x: canon.x, y: canon.y, flip, existing: true }
    }
}

/// One distinct tile with its occurrences
#[derive(Debug, Clone)]
pub struct CensusEntry {
    pub tile: Tile,
    pub count: usize,
    /// Pixel origins of every occurrence, in walk order
    pub positions: Vec<(u32, u32)>,
}

/// Exact occurrence counts per distinct tile, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct TileCensus {
    entries: Vec<CensusEntry>,
    by_pixels: HashMap<Vec<u8>, usize>,
}

impl TileCensus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count tiles from an iterator of `(tile, x, y)`.
    pub fn from_tiles<'a>(tiles: impl IntoIterator<Item = (&'a Tile, u32, u32)>) -> Self {
        let mut census = Self::new();
        for (tile, x, y) in tiles {
            census.record(tile, x, y);
        }
        census
    }

    /// Record one occurrence; returns the number of occurrences so far.
    pub fn record(&mut self, tile: &Tile, x: u32, y: u32) -> usize {
        match self.by_pixels.get(tile.pixels()) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.count += 1;
                entry.positions.push((x, y));
                entry.count
            }
            None => {
                self.by_pixels.insert(tile.pixels().to_vec(), self.entries.len());
                self.entries.push(CensusEntry { tile: tile.clone(), count: 1, positions: vec![(x, y)] });
                1
            }
        }
    }

    /// Number of distinct tiles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn entries(&self) -> &[CensusEntry] {
        &self.entries
    }

    /// Entries by ascending count; equal counts keep first-seen order.
    pub fn sorted_by_count(&self) -> Vec<&CensusEntry> {
        let mut sorted: Vec<&CensusEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.count);
        sorted
    }
}
