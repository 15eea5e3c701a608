//! Register access and operand fetch.

use crate::bus::MemoryBus;
use crate::common::{Byte, Word};
use crate::error::{GbError, Result};

use super::instructions::{AddressingMode, Instruction, RegisterType};
use super::Cpu;

impl Cpu {
    pub fn read_reg(&self, reg: RegisterType) -> Word {
        match reg {
            RegisterType::None => 0,
            RegisterType::A => self.regs.a as Word,
            RegisterType::F => self.regs.f() as Word,
            RegisterType::B => self.regs.b as Word,
            RegisterType::C => self.regs.c as Word,
            RegisterType::D => self.regs.d as Word,
            RegisterType::E => self.regs.e as Word,
            RegisterType::H => self.regs.h as Word,
            RegisterType::L => self.regs.l as Word,
            RegisterType::Af => self.regs.af(),
            RegisterType::Bc => self.regs.bc(),
            RegisterType::De => self.regs.de(),
            RegisterType::Hl => self.regs.hl(),
            RegisterType::Sp => self.regs.sp,
            RegisterType::Pc => self.regs.pc,
        }
    }

    /// Write `value` to `reg`, rejecting values wider than the register.
    pub fn write_reg(&mut self, reg: RegisterType, value: u32) -> Result<()> {
        let limit = if reg.is_16bit() { 0xFFFF } else { 0xFF };
        if reg == RegisterType::None || value > limit {
            return Err(GbError::InvalidRegisterAccess { register: reg.name(), value });
        }

        let wide = value as Word;
        let narrow = value as Byte;
        match reg {
            RegisterType::None => {}
            RegisterType::A => self.regs.a = narrow,
            RegisterType::F => self.regs.set_f(narrow),
            RegisterType::B => self.regs.b = narrow,
            RegisterType::C => self.regs.c = narrow,
            RegisterType::D => self.regs.d = narrow,
            RegisterType::E => self.regs.e = narrow,
            RegisterType::H => self.regs.h = narrow,
            RegisterType::L => self.regs.l = narrow,
            RegisterType::Af => self.regs.set_af(wide),
            RegisterType::Bc => self.regs.set_bc(wide),
            RegisterType::De => self.regs.set_de(wide),
            RegisterType::Hl => self.regs.set_hl(wide),
            RegisterType::Sp => self.regs.sp = wide,
            RegisterType::Pc => self.regs.pc = wide,
        }
        Ok(())
    }

    pub(super) fn read_pc8<B: MemoryBus>(&mut self, bus: &B) -> Byte {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(super) fn read_pc16<B: MemoryBus>(&mut self, bus: &B) -> Word {
        let value = bus.read16(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(2);
        value
    }

    /// Resolve the operands of `inst` into `fetched_data` / `mem_dest`,
    /// advancing PC past any immediates.
    pub(super) fn fetch_data<B: MemoryBus>(&mut self, bus: &B, inst: &Instruction) {
        self.mem_dest = 0;
        self.dest_is_mem = false;
        self.fetched_data = 0;

        match inst.mode {
            AddressingMode::Implied => {}

            AddressingMode::Register => {
                self.fetched_data = self.read_reg(inst.reg1);
            }

            AddressingMode::RegisterRegister => {
                self.fetched_data = self.read_reg(inst.reg2);
            }

            AddressingMode::RegisterD8 | AddressingMode::D8 | AddressingMode::RegisterA8 | AddressingMode::HlSpr => {
                self.fetched_data = self.read_pc8(bus) as Word;
            }

            AddressingMode::RegisterD16 | AddressingMode::D16 => {
                self.fetched_data = self.read_pc16(bus);
            }

            AddressingMode::MemoryRegister => {
                self.fetched_data = self.read_reg(inst.reg2);
                self.mem_dest = high_page(inst.reg1, self.read_reg(inst.reg1));
                self.dest_is_mem = true;
            }

            AddressingMode::RegisterMemory => {
                let addr = high_page(inst.reg2, self.read_reg(inst.reg2));
                self.fetched_data = bus.read(addr) as Word;
            }

            AddressingMode::RegisterHli | AddressingMode::RegisterHld => {
                let hl = self.regs.hl();
                self.fetched_data = bus.read(hl) as Word;
                self.regs.set_hl(step_hl(hl, inst.mode));
            }

            AddressingMode::HliRegister | AddressingMode::HldRegister => {
                let hl = self.regs.hl();
                self.fetched_data = self.read_reg(inst.reg2);
                self.mem_dest = hl;
                self.dest_is_mem = true;
                self.regs.set_hl(step_hl(hl, inst.mode));
            }

            AddressingMode::A8Register => {
                self.mem_dest = 0xFF00 | self.read_pc8(bus) as Word;
                self.dest_is_mem = true;
                self.fetched_data = self.read_reg(inst.reg2);
            }

            AddressingMode::A16Register => {
                self.mem_dest = self.read_pc16(bus);
                self.dest_is_mem = true;
                self.fetched_data = self.read_reg(inst.reg2);
            }

            AddressingMode::RegisterA16 => {
                let addr = self.read_pc16(bus);
                self.fetched_data = bus.read(addr) as Word;
            }

            AddressingMode::MemoryRegisterD8 => {
                self.fetched_data = self.read_pc8(bus) as Word;
                self.mem_dest = self.read_reg(inst.reg1);
                self.dest_is_mem = true;
            }

            AddressingMode::MemoryRegisterOnly => {
                self.mem_dest = self.read_reg(inst.reg1);
                self.dest_is_mem = true;
                self.fetched_data = bus.read(self.mem_dest) as Word;
            }
        }
    }
}

/// `(C)` addresses the 0xFF00 page.
fn high_page(reg: RegisterType, value: Word) -> Word {
    if reg == RegisterType::C {
        0xFF00 | value
    } else {
        value
    }
}

fn step_hl(hl: Word, mode: AddressingMode) -> Word {
    match mode {
        AddressingMode::RegisterHli | AddressingMode::HliRegister => hl.wrapping_add(1),
        _ => hl.wrapping_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FlatBus;
    use crate::cpu::instructions::instruction_by_opcode;

    #[test]
    fn test_write_reg_rejects_wide_values() {
        let mut cpu = Cpu::new();
        assert!(cpu.write_reg(RegisterType::Hl, 0xBEEF).is_ok());
        assert_eq!(cpu.regs.h, 0xBE);

        let err = cpu.write_reg(RegisterType::B, 0x100).unwrap_err();
        assert_eq!(err, GbError::InvalidRegisterAccess { register: "B", value: 0x100 });

        let err = cpu.write_reg(RegisterType::Bc, 0x1_0000).unwrap_err();
        assert!(matches!(err, GbError::InvalidRegisterAccess { register: "BC", .. }));
        assert_eq!(cpu.regs.bc(), 0);
    }

    #[test]
    fn test_write_reg_f_masks_low_nibble() {
        let mut cpu = Cpu::new();
        cpu.write_reg(RegisterType::F, 0xFF).unwrap();
        assert_eq!(cpu.read_reg(RegisterType::F), 0xF0);
    }

    #[test]
    fn test_fetch_d16_advances_pc() {
        let bus = FlatBus::with_program(0x0100, &[0x01, 0x34, 0x12]);
        let mut cpu = Cpu::new();
        cpu.regs.pc = 0x0101;
        cpu.fetch_data(&bus, instruction_by_opcode(0x01));
        assert_eq!(cpu.fetched_data, 0x1234);
        assert_eq!(cpu.regs.pc, 0x0103);
    }

    #[test]
    fn test_fetch_hli_post_increments() {
        let mut bus = FlatBus::new();
        bus.write(0xC000, 0x5A);
        let mut cpu = Cpu::new();
        cpu.regs.set_hl(0xC000);
        cpu.fetch_data(&bus, instruction_by_opcode(0x2A)); // LD A,(HL+)
        assert_eq!(cpu.fetched_data, 0x5A);
        assert_eq!(cpu.regs.hl(), 0xC001);
    }

    #[test]
    fn test_fetch_c_indirect_uses_high_page() {
        let mut cpu = Cpu::new();
        cpu.regs.c = 0x44;
        cpu.regs.a = 0x99;
        cpu.fetch_data(&FlatBus::new(), instruction_by_opcode(0xE2)); // LD (C),A
        assert!(cpu.dest_is_mem);
        assert_eq!(cpu.mem_dest, 0xFF44);
        assert_eq!(cpu.fetched_data, 0x99);
    }
}
