//! CPU Registers
//!
//! The Sharp LR35902 register file: eight 8-bit registers that pair up into
//! AF, BC, DE and HL, plus the 16-bit SP and PC.

use crate::common::{bit, bit_set, split, word, Byte, Word};

/// Flag bit positions inside F.
pub const FLAG_Z: u8 = 7;
pub const FLAG_N: u8 = 6;
pub const FLAG_H: u8 = 5;
pub const FLAG_C: u8 = 4;

/// CPU Registers
///
/// Pair views are computed from the two owned halves, so writing a pair
/// always writes through to its 8-bit registers. F is private: its low
/// nibble is masked to zero on every write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: Byte,
    f: Byte,
    pub b: Byte,
    pub c: Byte,
    pub d: Byte,
    pub e: Byte,
    pub h: Byte,
    pub l: Byte,
    pub pc: Word,
    pub sp: Word,
}

impl Registers {
    /// All registers zeroed, the state the boot ROM starts from.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register values left behind by the DMG boot ROM.
    pub fn post_boot() -> Self {
        let mut regs = Self::new();
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
        regs
    }

    #[inline]
    pub fn f(&self) -> Byte {
        self.f
    }

    #[inline]
    pub fn set_f(&mut self, value: Byte) {
        self.f = value & 0xF0;
    }

    // ========== 16-bit Register Pair Accessors ==========

    #[inline]
    pub fn af(&self) -> Word {
        word(self.a, self.f)
    }

    #[inline]
    pub fn set_af(&mut self, value: Word) {
        let (hi, lo) = split(value);
        self.a = hi;
        self.set_f(lo);
    }

    #[inline]
    pub fn bc(&self) -> Word {
        word(self.b, self.c)
    }

    #[inline]
    pub fn set_bc(&mut self, value: Word) {
        (self.b, self.c) = split(value);
    }

    #[inline]
    pub fn de(&self) -> Word {
        word(self.d, self.e)
    }

    #[inline]
    pub fn set_de(&mut self, value: Word) {
        (self.d, self.e) = split(value);
    }

    #[inline]
    pub fn hl(&self) -> Word {
        word(self.h, self.l)
    }

    #[inline]
    pub fn set_hl(&mut self, value: Word) {
        (self.h, self.l) = split(value);
    }

    // ========== Flag Accessors ==========
    // Bit 7: Z, bit 6: N, bit 5: H, bit 4: C, bits 0-3 always 0

    #[inline]
    pub fn flag_z(&self) -> bool {
        bit(self.f, FLAG_Z)
    }

    #[inline]
    pub fn set_flag_z(&mut self, value: bool) {
        bit_set(&mut self.f, FLAG_Z, value);
    }

    #[inline]
    pub fn flag_n(&self) -> bool {
        bit(self.f, FLAG_N)
    }

    #[inline]
    pub fn set_flag_n(&mut self, value: bool) {
        bit_set(&mut self.f, FLAG_N, value);
    }

    #[inline]
    pub fn flag_h(&self) -> bool {
        bit(self.f, FLAG_H)
    }

    #[inline]
    pub fn set_flag_h(&mut self, value: bool) {
        bit_set(&mut self.f, FLAG_H, value);
    }

    #[inline]
    pub fn flag_c(&self) -> bool {
        bit(self.f, FLAG_C)
    }

    #[inline]
    pub fn set_flag_c(&mut self, value: bool) {
        bit_set(&mut self.f, FLAG_C, value);
    }

    /// Set Z, N, H and C in one call
    #[inline]
    pub fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.f = ((z as Byte) << FLAG_Z)
            | ((n as Byte) << FLAG_N)
            | ((h as Byte) << FLAG_H)
            | ((c as Byte) << FLAG_C);
    }
}
