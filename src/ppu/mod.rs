//! PPU Module
//!
//! Scanline-granularity video timing. The [`ScanlineClock`] walks LY and the
//! STAT mode through each 114 M-cycle line and reports finished lines; pixels
//! are left to a [`ScanlineRenderer`], which reads video memory through a
//! [`VideoView`].

pub mod modes;
pub mod tile;

use crate::common::{Byte, Word};
use crate::lcd::Lcd;
use modes::LcdMode;
use tile::{TileBitmap, TILE_BYTES, TILE_COUNT};

/// Screen dimensions
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// M-cycles per scanline
pub const LINE_CYCLES: u32 = 114;
/// Lines 0-143 are drawn, 144-153 are vertical blank
pub const VISIBLE_LINES: Byte = 144;
pub const LINES_PER_FRAME: Byte = 154;
/// M-cycles per full scan
pub const FRAME_CYCLES: u32 = LINE_CYCLES * LINES_PER_FRAME as u32;

/// First address of VRAM
pub const VRAM_BASE: Word = 0x8000;
pub const VRAM_SIZE: usize = 0x2000;

/// What a single clock tick produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// Line that finished on this tick
    pub completed_line: Option<Byte>,
    /// LY just moved to 144
    pub vblank: bool,
}

/// Line and mode sequencer.
#[derive(Debug, Clone, Default)]
pub struct ScanlineClock {
    /// M-cycles elapsed on the current line
    line_cycles: u32,
    /// False while the display is off
    running: bool,
    /// Current line is the first one since the display came on
    first_line: bool,
}

impl ScanlineClock {
    /// Stopped; starts with the display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mid-scan at the top of line 0, as the boot ROM leaves it.
    pub fn post_boot() -> Self {
        Self { line_cycles: 0, running: true, first_line: false }
    }

    pub fn line_cycles(&self) -> u32 {
        self.line_cycles
    }

    /// Advance one M-cycle.
    pub fn tick(&mut self, lcd: &mut Lcd) -> ClockTick {
        if !lcd.enabled() {
            self.running = false;
            return ClockTick::default();
        }
        if !self.running {
            self.running = true;
            self.line_cycles = 0;
            self.first_line = true;
        }

        self.line_cycles += 1;

        if self.line_cycles < LINE_CYCLES {
            if lcd.ly() < VISIBLE_LINES {
                let mode = match LcdMode::at_line_cycle(self.line_cycles) {
                    LcdMode::OamScan if self.first_line => LcdMode::HBlank,
                    mode => mode,
                };
                lcd.set_mode(mode);
            }
            return ClockTick::default();
        }

        self.line_cycles = 0;
        self.first_line = false;

        let completed = lcd.ly();
        let next = (completed + 1) % LINES_PER_FRAME;
        lcd.set_ly(next);

        let vblank = next == VISIBLE_LINES;
        if vblank {
            lcd.set_mode(LcdMode::VBlank);
        } else if next < VISIBLE_LINES {
            lcd.set_mode(LcdMode::OamScan);
        }

        ClockTick { completed_line: Some(completed), vblank }
    }
}

/// Read-only access to the video state a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct VideoView<'a> {
    lcd: &'a Lcd,
    vram: &'a [Byte],
    tile_versions: &'a [u32; TILE_COUNT],
}

impl<'a> VideoView<'a> {
    pub fn new(lcd: &'a Lcd, vram: &'a [Byte], tile_versions: &'a [u32; TILE_COUNT]) -> Self {
        Self { lcd, vram, tile_versions }
    }

    pub fn lcd(&self) -> &Lcd {
        self.lcd
    }

    pub fn display_enabled(&self) -> bool {
        self.lcd.enabled()
    }

    pub fn bg_enabled(&self) -> bool {
        self.lcd.bg_enabled()
    }

    pub fn sprites_enabled(&self) -> bool {
        self.lcd.sprites_enabled()
    }

    pub fn scroll_x(&self) -> Byte {
        self.lcd.scx
    }

    pub fn scroll_y(&self) -> Byte {
        self.lcd.scy
    }

    pub fn bgp(&self) -> Byte {
        self.lcd.bgp
    }

    fn vram_byte(&self, address: Word) -> Byte {
        self.vram
            .get(address.wrapping_sub(VRAM_BASE) as usize)
            .copied()
            .unwrap_or(0xFF)
    }

    /// Raw 16-byte bitmap of tile `index`, counted from 0x8000.
    pub fn read_tile(&self, index: usize) -> TileBitmap {
        let start = (index % TILE_COUNT) * TILE_BYTES;
        let mut bitmap = [0u8; TILE_BYTES];
        if let Some(bytes) = self.vram.get(start..start + TILE_BYTES) {
            bitmap.copy_from_slice(bytes);
        }
        bitmap
    }

    /// Bumped on every write into the tile's bytes
    pub fn tile_version(&self, index: usize) -> u32 {
        self.tile_versions[index % TILE_COUNT]
    }

    /// Tile index (0-383) under background pixel (`x`, `y`), resolving the
    /// map select and the signed 0x9000 addressing mode.
    pub fn background_tile_at(&self, x: Byte, y: Byte) -> usize {
        let entry = (y as Word / 8) * 32 + x as Word / 8;
        let raw = self.vram_byte(self.lcd.bg_tile_map() + entry);
        if self.lcd.unsigned_tile_data() {
            raw as usize
        } else {
            (256 + raw as i8 as i16) as usize
        }
    }
}

/// Rendering backend fed once per finished scanline.
pub trait ScanlineRenderer {
    fn draw_line(&mut self, line: Byte, video: &VideoView<'_>);
}

/// Discards every line
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ScanlineRenderer for NullRenderer {
    fn draw_line(&mut self, _line: Byte, _video: &VideoView<'_>) {}
}
