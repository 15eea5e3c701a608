//! 8-bit and 16-bit arithmetic with the LR35902 flag rules.
//!
//! Half-carry is the carry out of bit 3 (bit 11 for 16-bit adds), carry is
//! the carry out of bit 7 (bit 15). N is set only by the subtract family.

use crate::common::{Byte, Word};

use super::Cpu;

impl Cpu {
    #[inline]
    pub(super) fn alu_inc(&mut self, value: Byte) -> Byte {
        let result = value.wrapping_add(1);
        self.regs.set_flag_z(result == 0);
        self.regs.set_flag_n(false);
        self.regs.set_flag_h((value & 0x0F) == 0x0F);
        result
    }

    #[inline]
    pub(super) fn alu_dec(&mut self, value: Byte) -> Byte {
        let result = value.wrapping_sub(1);
        self.regs.set_flag_z(result == 0);
        self.regs.set_flag_n(true);
        self.regs.set_flag_h((value & 0x0F) == 0);
        result
    }

    /// A + value (+ carry for ADC)
    #[inline]
    pub(super) fn alu_add(&mut self, value: Byte, with_carry: bool) {
        let a = self.regs.a;
        let carry = (with_carry && self.regs.flag_c()) as Byte;
        let result = a as u16 + value as u16 + carry as u16;
        self.regs.set_flags(
            (result & 0xFF) == 0,
            false,
            (a & 0x0F) + (value & 0x0F) + carry > 0x0F,
            result > 0xFF,
        );
        self.regs.a = result as Byte;
    }

    /// A - value (- carry for SBC). Returns the difference without storing
    /// it so CP can share the flag logic.
    #[inline]
    pub(super) fn alu_sub(&mut self, value: Byte, with_carry: bool) -> Byte {
        let a = self.regs.a;
        let carry = (with_carry && self.regs.flag_c()) as Byte;
        let result = a.wrapping_sub(value).wrapping_sub(carry);
        self.regs.set_flags(
            result == 0,
            true,
            (a & 0x0F) < (value & 0x0F) + carry,
            (a as u16) < value as u16 + carry as u16,
        );
        result
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: Byte) {
        self.regs.a &= value;
        self.regs.set_flags(self.regs.a == 0, false, true, false);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: Byte) {
        self.regs.a ^= value;
        self.regs.set_flags(self.regs.a == 0, false, false, false);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: Byte) {
        self.regs.a |= value;
        self.regs.set_flags(self.regs.a == 0, false, false, false);
    }

    /// ADD HL,rr. Z is left untouched.
    #[inline]
    pub(super) fn alu_add_hl(&mut self, value: Word) {
        let hl = self.regs.hl();
        let result = hl as u32 + value as u32;
        self.regs.set_flag_n(false);
        self.regs.set_flag_h((hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.regs.set_flag_c(result > 0xFFFF);
        self.regs.set_hl(result as Word);
    }

    /// SP + signed offset, shared by ADD SP,r8 and LD HL,SP+r8.
    /// H and C come from the unsigned low-byte add; Z and N are cleared.
    #[inline]
    pub(super) fn alu_sp_offset(&mut self, offset: Byte) -> Word {
        let sp = self.regs.sp;
        let lo = offset as Word;
        self.regs.set_flags(
            false,
            false,
            (sp & 0x0F) + (lo & 0x0F) > 0x0F,
            (sp & 0xFF) + lo > 0xFF,
        );
        sp.wrapping_add(offset as i8 as i16 as Word)
    }

    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let mut carry = self.regs.flag_c();

        if self.regs.flag_n() {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if self.regs.flag_h() {
                a = a.wrapping_sub(0x06);
            }
        } else {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if self.regs.flag_h() || (a & 0x0F) > 0x09 {
                a = a.wrapping_add(0x06);
            }
        }

        self.regs.a = a;
        self.regs.set_flag_z(a == 0);
        self.regs.set_flag_h(false);
        self.regs.set_flag_c(carry);
    }

    // ========== Rotates and shifts ==========
    // All of these set Z from the result; the accumulator forms (RLCA etc)
    // clear Z afterwards.

    fn shifted(&mut self, result: Byte, carry: bool) -> Byte {
        self.regs.set_flags(result == 0, false, false, carry);
        result
    }

    pub(super) fn alu_rlc(&mut self, value: Byte) -> Byte {
        self.shifted(value.rotate_left(1), value & 0x80 != 0)
    }

    pub(super) fn alu_rrc(&mut self, value: Byte) -> Byte {
        self.shifted(value.rotate_right(1), value & 0x01 != 0)
    }

    pub(super) fn alu_rl(&mut self, value: Byte) -> Byte {
        let carry_in = self.regs.flag_c() as Byte;
        self.shifted((value << 1) | carry_in, value & 0x80 != 0)
    }

    pub(super) fn alu_rr(&mut self, value: Byte) -> Byte {
        let carry_in = (self.regs.flag_c() as Byte) << 7;
        self.shifted((value >> 1) | carry_in, value & 0x01 != 0)
    }

    pub(super) fn alu_sla(&mut self, value: Byte) -> Byte {
        self.shifted(value << 1, value & 0x80 != 0)
    }

    pub(super) fn alu_sra(&mut self, value: Byte) -> Byte {
        self.shifted((value >> 1) | (value & 0x80), value & 0x01 != 0)
    }

    pub(super) fn alu_swap(&mut self, value: Byte) -> Byte {
        self.shifted(value.rotate_left(4), false)
    }

    pub(super) fn alu_srl(&mut self, value: Byte) -> Byte {
        self.shifted(value >> 1, value & 0x01 != 0)
    }

    pub(super) fn alu_bit(&mut self, value: Byte, bit: u8) {
        self.regs.set_flag_z(value & (1 << bit) == 0);
        self.regs.set_flag_n(false);
        self.regs.set_flag_h(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cpu_with_a(a: Byte) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.regs.a = a;
        cpu
    }

    #[test]
    fn test_add_half_and_full_carry() {
        let mut cpu = cpu_with_a(0x3A);
        cpu.alu_add(0xC6, false);
        assert_eq!(cpu.regs.a, 0x00);
        assert_eq!(cpu.regs.f(), 0xB0); // Z H C

        let mut cpu = cpu_with_a(0x0F);
        cpu.alu_add(0x01, false);
        assert_eq!(cpu.regs.a, 0x10);
        assert!(cpu.regs.flag_h());
        assert!(!cpu.regs.flag_c());
    }

    #[test]
    fn test_adc_uses_carry() {
        let mut cpu = cpu_with_a(0xE1);
        cpu.regs.set_flag_c(true);
        cpu.alu_add(0x0F, true);
        assert_eq!(cpu.regs.a, 0xF1);
        assert!(!cpu.regs.flag_z());
        assert!(cpu.regs.flag_h());
        assert!(!cpu.regs.flag_c());
    }

    #[test]
    fn test_sub_and_sbc() {
        let mut cpu = cpu_with_a(0x3E);
        cpu.regs.a = cpu.alu_sub(0x3E, false);
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.f(), 0xC0); // Z N

        let mut cpu = cpu_with_a(0x3B);
        cpu.regs.set_flag_c(true);
        cpu.regs.a = cpu.alu_sub(0x2A, true);
        assert_eq!(cpu.regs.a, 0x10);
        assert!(cpu.regs.flag_n());
        assert!(!cpu.regs.flag_h());
        assert!(!cpu.regs.flag_c());

        let mut cpu = cpu_with_a(0x00);
        cpu.regs.a = cpu.alu_sub(0x01, false);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(cpu.regs.flag_h());
        assert!(cpu.regs.flag_c());
    }

    #[test]
    fn test_inc_dec_keep_carry() {
        let mut cpu = Cpu::new();
        cpu.regs.set_flag_c(true);
        assert_eq!(cpu.alu_inc(0xFF), 0x00);
        assert!(cpu.regs.flag_z());
        assert!(cpu.regs.flag_h());
        assert!(cpu.regs.flag_c());

        assert_eq!(cpu.alu_dec(0x10), 0x0F);
        assert!(cpu.regs.flag_n());
        assert!(cpu.regs.flag_h());
        assert!(cpu.regs.flag_c());
    }

    #[test]
    fn test_add_hl_leaves_zero_flag() {
        let mut cpu = Cpu::new();
        cpu.regs.set_flag_z(true);
        cpu.regs.set_hl(0x8A23);
        cpu.alu_add_hl(0x8A23);
        assert_eq!(cpu.regs.hl(), 0x1446);
        assert!(cpu.regs.flag_z());
        assert!(cpu.regs.flag_h());
        assert!(cpu.regs.flag_c());
    }

    #[test]
    fn test_sp_offset_negative() {
        let mut cpu = Cpu::new();
        cpu.regs.sp = 0xFFF8;
        assert_eq!(cpu.alu_sp_offset(0x02), 0xFFFA);
        assert_eq!(cpu.regs.f(), 0x00);

        cpu.regs.sp = 0x0001;
        assert_eq!(cpu.alu_sp_offset(0xFF), 0x0000);
        assert!(cpu.regs.flag_h());
        assert!(cpu.regs.flag_c());
    }

    #[test]
    fn test_daa_after_add_and_sub() {
        let mut cpu = cpu_with_a(0x45);
        cpu.alu_add(0x38, false);
        cpu.alu_daa();
        assert_eq!(cpu.regs.a, 0x83);
        assert!(!cpu.regs.flag_c());

        let mut cpu = cpu_with_a(0x83);
        cpu.regs.a = cpu.alu_sub(0x38, false);
        cpu.alu_daa();
        assert_eq!(cpu.regs.a, 0x45);
    }

    #[test]
    fn test_rotates() {
        let mut cpu = Cpu::new();
        assert_eq!(cpu.alu_rlc(0x85), 0x0B);
        assert!(cpu.regs.flag_c());

        cpu.regs.set_flag_c(false);
        assert_eq!(cpu.alu_rl(0x80), 0x00);
        assert!(cpu.regs.flag_z());
        assert!(cpu.regs.flag_c());

        assert_eq!(cpu.alu_rr(0x01), 0x80);
        assert!(cpu.regs.flag_c());

        assert_eq!(cpu.alu_sra(0x8A), 0xC5);
        assert!(!cpu.regs.flag_c());

        assert_eq!(cpu.alu_swap(0xF1), 0x1F);
        assert_eq!(cpu.alu_srl(0x01), 0x00);
        assert!(cpu.regs.flag_z());
        assert!(cpu.regs.flag_c());
    }

    proptest! {
        #[test]
        fn prop_flag_low_nibble_stays_clear(a: u8, value: u8, carry: bool) {
            let mut cpu = cpu_with_a(a);
            cpu.regs.set_flag_c(carry);
            cpu.alu_add(value, true);
            prop_assert_eq!(cpu.regs.f() & 0x0F, 0);
            cpu.regs.a = cpu.alu_sub(value, true);
            prop_assert_eq!(cpu.regs.f() & 0x0F, 0);
            cpu.alu_daa();
            prop_assert_eq!(cpu.regs.f() & 0x0F, 0);
        }

        #[test]
        fn prop_add_matches_wide_arithmetic(a: u8, value: u8) {
            let mut cpu = cpu_with_a(a);
            cpu.alu_add(value, false);
            let wide = a as u16 + value as u16;
            prop_assert_eq!(cpu.regs.a, wide as u8);
            prop_assert_eq!(cpu.regs.flag_c(), wide > 0xFF);
            prop_assert_eq!(cpu.regs.flag_z(), wide as u8 == 0);
            prop_assert!(!cpu.regs.flag_n());
        }

        #[test]
        fn prop_sub_sets_borrow(a: u8, value: u8) {
            let mut cpu = cpu_with_a(a);
            let result = cpu.alu_sub(value, false);
            prop_assert_eq!(result, a.wrapping_sub(value));
            prop_assert_eq!(cpu.regs.flag_c(), value > a);
            prop_assert!(cpu.regs.flag_n());
        }
    }
}
