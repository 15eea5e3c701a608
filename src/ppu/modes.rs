//! LCD modes and their position within a scanline.

/// Value of STAT bits 0-1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

/// First M-cycle of pixel transfer within a visible line
pub const TRANSFER_START: u32 = 20;
/// First M-cycle of HBlank within a visible line
pub const HBLANK_START: u32 = 63;

impl LcdMode {
    pub fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => LcdMode::HBlank,
            1 => LcdMode::VBlank,
            2 => LcdMode::OamScan,
            _ => LcdMode::Transfer,
        }
    }

    /// Mode of a visible line `elapsed` M-cycles after it started.
    pub fn at_line_cycle(elapsed: u32) -> Self {
        if elapsed < TRANSFER_START {
            LcdMode::OamScan
        } else if elapsed < HBLANK_START {
            LcdMode::Transfer
        } else {
            LcdMode::HBlank
        }
    }

    /// STAT bit enabling the interrupt on entry to this mode, if any.
    pub fn stat_enable_bit(self) -> Option<u8> {
        match self {
            LcdMode::HBlank => Some(3),
            LcdMode::VBlank => Some(4),
            LcdMode::OamScan => Some(5),
            LcdMode::Transfer => None,
        }
    }
}
