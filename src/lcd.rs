//! LCD Control
//!
//! LCD Registers:
//! - LCDC (0xFF40): LCD Control
//! - STAT (0xFF41): LCD Status
//! - SCY (0xFF42): Scroll Y
//! - SCX (0xFF43): Scroll X
//! - LY (0xFF44): Current scanline (read-only)
//! - LYC (0xFF45): LY Compare
//! - DMA (0xFF46): OAM DMA source page (the copy itself is done by the bus)
//! - BGP (0xFF47): Background Palette
//! - OBP0 (0xFF48): Object Palette 0
//! - OBP1 (0xFF49): Object Palette 1
//! - WY (0xFF4A): Window Y Position
//! - WX (0xFF4B): Window X Position
//!
//! Timing lives in [`crate::ppu::ScanlineClock`]; this module holds the
//! register file and the rules that apply on every register change.

use log::{debug, warn};

use crate::common::{bit, bit_set, Byte, Word};
use crate::ppu::modes::LcdMode;

pub const ADDR_LCDC: Word = 0xFF40;
pub const ADDR_STAT: Word = 0xFF41;
pub const ADDR_SCY: Word = 0xFF42;
pub const ADDR_SCX: Word = 0xFF43;
pub const ADDR_LY: Word = 0xFF44;
pub const ADDR_LYC: Word = 0xFF45;
pub const ADDR_DMA: Word = 0xFF46;
pub const ADDR_BGP: Word = 0xFF47;
pub const ADDR_OBP0: Word = 0xFF48;
pub const ADDR_OBP1: Word = 0xFF49;
pub const ADDR_WY: Word = 0xFF4A;
pub const ADDR_WX: Word = 0xFF4B;

/// STAT bits writable from the bus (3-6)
const STAT_WRITABLE: Byte = 0x78;
const STAT_COINCIDENCE: u8 = 2;
const STAT_LYC_ENABLE: u8 = 6;

#[derive(Debug, Clone, Default)]
pub struct Lcd {
    pub lcdc: Byte,
    stat: Byte,
    pub scy: Byte,
    pub scx: Byte,
    ly: Byte,
    lyc: Byte,
    pub dma: Byte,
    pub bgp: Byte,
    pub obp0: Byte,
    pub obp1: Byte,
    pub wy: Byte,
    pub wx: Byte,
    /// Set when a STAT source fires, drained by the bus into IF
    pub stat_interrupt: bool,
}

impl Lcd {
    /// Display off, every register zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register values left behind by the boot ROM.
    pub fn post_boot() -> Self {
        let mut lcd = Self {
            lcdc: 0x91,
            stat: LcdMode::OamScan as Byte,
            dma: 0xFF,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            ..Self::default()
        };
        lcd.compare_ly();
        lcd.stat_interrupt = false;
        lcd
    }

    pub fn read(&self, address: Word) -> Byte {
        match address {
            ADDR_LCDC => self.lcdc,
            ADDR_STAT => self.stat | 0x80,
            ADDR_SCY => self.scy,
            ADDR_SCX => self.scx,
            ADDR_LY => self.ly,
            ADDR_LYC => self.lyc,
            ADDR_DMA => self.dma,
            ADDR_BGP => self.bgp,
            ADDR_OBP0 => self.obp0,
            ADDR_OBP1 => self.obp1,
            ADDR_WY => self.wy,
            ADDR_WX => self.wx,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            ADDR_LCDC => self.write_lcdc(value),
            ADDR_STAT => self.stat = (self.stat & !STAT_WRITABLE) | (value & STAT_WRITABLE),
            ADDR_SCY => self.scy = value,
            ADDR_SCX => self.scx = value,
            ADDR_LY => warn!("ignoring write of {:#04x} to read-only LY", value),
            ADDR_LYC if value != self.lyc => {
                self.lyc = value;
                self.compare_ly();
            }
            ADDR_LYC => {}
            ADDR_DMA => self.dma = value,
            ADDR_BGP => self.bgp = value,
            ADDR_OBP0 => self.obp0 = value,
            ADDR_OBP1 => self.obp1 = value,
            ADDR_WY => self.wy = value,
            ADDR_WX => self.wx = value,
            _ => {}
        }
    }

    fn write_lcdc(&mut self, value: Byte) {
        let was_enabled = self.enabled();
        self.lcdc = value;

        match (was_enabled, self.enabled()) {
            (true, false) => {
                // LY pins to 0 at once; the mode bits keep their last value.
                self.ly = 0;
                bit_set(&mut self.stat, STAT_COINCIDENCE, self.ly == self.lyc);
                debug!("display disabled");
            }
            (false, true) => {
                self.ly = 0;
                self.stat = (self.stat & !0x03) | LcdMode::HBlank as Byte;
                self.compare_ly();
                debug!("display enabled");
            }
            _ => {}
        }
    }

    // ========== LCDC Bit Accessors ==========

    /// LCD Display Enable (bit 7)
    pub fn enabled(&self) -> bool {
        bit(self.lcdc, 7)
    }

    /// Window tile map base (bit 6)
    pub fn window_tile_map(&self) -> Word {
        if bit(self.lcdc, 6) {
            0x9C00
        } else {
            0x9800
        }
    }

    /// Window Enable (bit 5)
    pub fn window_enabled(&self) -> bool {
        bit(self.lcdc, 5)
    }

    /// BG/window tile data addressing (bit 4): true selects 0x8000 with
    /// unsigned indices, false selects 0x9000 with signed indices.
    pub fn unsigned_tile_data(&self) -> bool {
        bit(self.lcdc, 4)
    }

    /// BG tile map base (bit 3)
    pub fn bg_tile_map(&self) -> Word {
        if bit(self.lcdc, 3) {
            0x9C00
        } else {
            0x9800
        }
    }

    /// Sprite height in pixels (bit 2)
    pub fn sprite_height(&self) -> u8 {
        if bit(self.lcdc, 2) {
            16
        } else {
            8
        }
    }

    /// Sprite Enable (bit 1)
    pub fn sprites_enabled(&self) -> bool {
        bit(self.lcdc, 1)
    }

    /// BG & Window Enable (bit 0)
    pub fn bg_enabled(&self) -> bool {
        bit(self.lcdc, 0)
    }

    // ========== STAT ==========

    pub fn mode(&self) -> LcdMode {
        LcdMode::from_bits(self.stat)
    }

    /// Enter `mode`, raising STAT if that mode's interrupt is enabled.
    pub fn set_mode(&mut self, mode: LcdMode) {
        if self.mode() == mode {
            return;
        }
        self.stat = (self.stat & !0x03) | mode as Byte;
        if let Some(enable) = mode.stat_enable_bit() {
            if bit(self.stat, enable) {
                self.stat_interrupt = true;
            }
        }
    }

    /// LY == LYC flag (STAT bit 2)
    pub fn coincidence(&self) -> bool {
        bit(self.stat, STAT_COINCIDENCE)
    }

    pub fn ly(&self) -> Byte {
        self.ly
    }

    pub fn lyc(&self) -> Byte {
        self.lyc
    }

    /// Move to scanline `value` and compare it against LYC.
    pub fn set_ly(&mut self, value: Byte) {
        self.ly = value;
        self.compare_ly();
    }

    /// Refresh the coincidence flag; raise STAT on a match when STAT bit 6
    /// is set. Nothing fires while the display is off.
    fn compare_ly(&mut self) {
        let coincident = self.ly == self.lyc;
        bit_set(&mut self.stat, STAT_COINCIDENCE, coincident);
        if coincident && self.enabled() && bit(self.stat, STAT_LYC_ENABLE) {
            self.stat_interrupt = true;
        }
    }

    pub fn take_stat_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.stat_interrupt)
    }

    // ========== Palette ==========

    /// Shade (0-3) BGP maps colour `level` to
    pub fn bg_shade(&self, level: u8) -> u8 {
        (self.bgp >> ((level & 0x03) * 2)) & 0x03
    }
}
