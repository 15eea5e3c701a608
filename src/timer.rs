//! Timer
//!
//! Timer registers:
//! - DIV (0xFF04): free-running divider, any write resets it
//! - TIMA (0xFF05): counter, reloads from TMA on overflow
//! - TMA (0xFF06): modulo
//! - TAC (0xFF07): bit 2 enables TIMA, bits 0-1 select its rate
//!
//! All counts are in M-cycles.

use crate::common::{bit, Byte, Word};

pub const ADDR_DIV: Word = 0xFF04;
pub const ADDR_TIMA: Word = 0xFF05;
pub const ADDR_TMA: Word = 0xFF06;
pub const ADDR_TAC: Word = 0xFF07;

/// M-cycles per TIMA increment, indexed by TAC bits 0-1
pub const TIMA_DIVISORS: [u32; 4] = [1024, 16, 64, 256];

/// DIV ticks at 16384 Hz, every 64 M-cycles.
const DIV_SHIFT: u32 = 6;

/// Divider value left behind by the boot ROM
const POST_BOOT_DIVIDER: Word = 0x2AF3;

#[derive(Debug, Clone, Default)]
pub struct Timer {
    divider: Word,
    /// M-cycles accumulated toward the next TIMA increment
    sub_counter: u32,
    tima: Byte,
    tma: Byte,
    tac: Byte,
    /// Set on TIMA overflow, drained by the bus into IF
    pub interrupt_requested: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_boot() -> Self {
        Self { divider: POST_BOOT_DIVIDER, ..Self::default() }
    }

    /// Read a timer register
    ///
    /// # Arguments
    /// * `address` - One of `ADDR_DIV`, `ADDR_TIMA`, `ADDR_TMA`, `ADDR_TAC`
    ///
    /// # Returns
    /// The register value; unused TAC bits read as 1, other addresses as 0xFF
    pub fn read(&self, address: Word) -> Byte {
        match address {
            ADDR_DIV => (self.divider >> DIV_SHIFT) as Byte,
            ADDR_TIMA => self.tima,
            ADDR_TMA => self.tma,
            ADDR_TAC => self.tac | 0xF8,
            _ => 0xFF,
        }
    }

    /// Write a timer register
    ///
    /// Any write to DIV clears the whole divider. Changing the TAC clock
    /// select restarts the TIMA sub-counter.
    ///
    /// # Arguments
    /// * `address` - Register address
    /// * `value` - Value written by the CPU
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            ADDR_DIV => self.divider = 0,
            ADDR_TIMA => self.tima = value,
            ADDR_TMA => self.tma = value,
            ADDR_TAC => {
                let value = value & 0x07;
                if (value ^ self.tac) & 0x03 != 0 {
                    self.sub_counter = 0;
                }
                self.tac = value;
            }
            _ => {}
        }
    }

    pub fn enabled(&self) -> bool {
        bit(self.tac, 2)
    }

    /// M-cycles per TIMA increment for the current clock select
    pub fn divisor(&self) -> u32 {
        TIMA_DIVISORS[(self.tac & 0x03) as usize]
    }

    /// Raw M-cycle divider
    pub fn divider(&self) -> Word {
        self.divider
    }

    /// Advance one M-cycle
    ///
    /// On overflow TIMA reloads from TMA and the interrupt request is latched
    /// until [`Timer::take_interrupt`].
    ///
    /// # Returns
    /// `true` when TIMA overflowed on this cycle
    pub fn tick(&mut self) -> bool {
        self.divider = self.divider.wrapping_add(1);

        if !self.enabled() {
            return false;
        }

        self.sub_counter += 1;
        if self.sub_counter < self.divisor() {
            return false;
        }
        self.sub_counter = 0;

        let (tima, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            self.interrupt_requested = true;
        } else {
            self.tima = tima;
        }
        overflow
    }

    /// Take and clear the pending overflow request
    pub fn take_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.interrupt_requested)
    }
}
