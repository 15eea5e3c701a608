//! Tile decoding and the decoded-tile cache used by renderers.

/// Bytes per 8x8 tile in VRAM
pub const TILE_BYTES: usize = 16;
/// Tiles addressable in 0x8000-0x97FF
pub const TILE_COUNT: usize = 384;
/// Colour levels per tile, row-major
pub const TILE_PIXELS: usize = 64;

pub type TileBitmap = [u8; TILE_BYTES];
pub type TileLevels = [u8; TILE_PIXELS];

/// Decode a 2bpp tile into 64 colour levels (0-3), row by row.
///
/// Each row is a byte pair: the first byte supplies the high bit of every
/// pixel's level and the second byte the low bit, most significant bit for
/// the leftmost pixel.
pub fn tile_bitmap_to_levels(bitmap: &TileBitmap) -> TileLevels {
    let mut levels = [0u8; TILE_PIXELS];
    for (row, pair) in bitmap.chunks_exact(2).enumerate() {
        let (high, low) = (pair[0], pair[1]);
        for col in 0..8 {
            let shift = 7 - col;
            let level = (((high >> shift) & 1) << 1) | ((low >> shift) & 1);
            levels[row * 8 + col] = level;
        }
    }
    levels
}

#[derive(Debug, Clone, Copy)]
struct CachedTile {
    /// `None` until first decoded
    version: Option<u32>,
    levels: TileLevels,
}

const EMPTY: CachedTile = CachedTile { version: None, levels: [0; TILE_PIXELS] };

/// Lazily decoded tiles keyed by tile index.
///
/// Staleness is detected through the per-tile version counters the bus
/// bumps on every VRAM tile-data write; an entry is recomputed on the next
/// lookup after its version moved.
#[derive(Debug, Clone)]
pub struct TileCache {
    entries: Vec<CachedTile>,
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCache {
    pub fn new() -> Self {
        Self { entries: vec![EMPTY; TILE_COUNT] }
    }

    /// Decoded levels of tile `index` at `version`, decoding through `read`
    /// on a miss. Indices past the tile table wrap.
    pub fn levels<F>(&mut self, index: usize, version: u32, read: F) -> &TileLevels
    where
        F: FnOnce() -> TileBitmap,
    {
        let entry = &mut self.entries[index % TILE_COUNT];
        if entry.version != Some(version) {
            entry.levels = tile_bitmap_to_levels(&read());
            entry.version = Some(version);
        }
        &entry.levels
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.fill(EMPTY);
    }

    pub fn cached(&self) -> usize {
        self.entries.iter().filter(|entry| entry.version.is_some()).count()
    }
}
