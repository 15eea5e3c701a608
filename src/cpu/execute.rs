//! Instruction Execution

use crate::bus::MemoryBus;
use crate::common::{split, word, Byte, Word};
use crate::error::{GbError, Result};

use super::instructions::{
    cb_instruction_by_opcode, AddressingMode, ConditionType, Instruction, InstructionType, RegisterType,
};
use super::Cpu;

impl Cpu {
    fn check_condition(&self, cond: ConditionType) -> bool {
        match cond {
            ConditionType::None => true,
            ConditionType::Z => self.regs.flag_z(),
            ConditionType::Nz => !self.regs.flag_z(),
            ConditionType::C => self.regs.flag_c(),
            ConditionType::Nc => !self.regs.flag_c(),
        }
    }

    /// Evaluate a branch condition, charging `extra` M-cycles when a
    /// conditional branch is taken. Unconditional forms carry their full
    /// cost in the opcode table.
    fn branch(&mut self, cond: ConditionType, extra: u32) -> bool {
        if cond == ConditionType::None {
            return true;
        }
        let taken = self.check_condition(cond);
        if taken {
            self.step_cycles += extra;
        }
        taken
    }

    pub(super) fn execute<B: MemoryBus>(&mut self, bus: &mut B, inst: &'static Instruction) -> Result<()> {
        match inst.inst_type {
            InstructionType::None => {
                return Err(GbError::UnknownOpcode {
                    opcode: self.cur_opcode,
                    pc: self.regs.pc.wrapping_sub(1),
                })
            }
            InstructionType::Nop => {}
            InstructionType::Ld => self.proc_ld(bus, inst)?,
            InstructionType::Ldh => self.proc_ldh(bus, inst),
            InstructionType::Inc => self.proc_inc(bus, inst)?,
            InstructionType::Dec => self.proc_dec(bus, inst)?,
            InstructionType::Add => self.proc_add(inst),
            InstructionType::Adc => self.alu_add(self.fetched_data as Byte, true),
            InstructionType::Sub => self.regs.a = self.alu_sub(self.fetched_data as Byte, false),
            InstructionType::Sbc => self.regs.a = self.alu_sub(self.fetched_data as Byte, true),
            InstructionType::And => self.alu_and(self.fetched_data as Byte),
            InstructionType::Xor => self.alu_xor(self.fetched_data as Byte),
            InstructionType::Or => self.alu_or(self.fetched_data as Byte),
            InstructionType::Cp => {
                self.alu_sub(self.fetched_data as Byte, false);
            }
            InstructionType::Jr => {
                let target = self.regs.pc.wrapping_add(self.fetched_data as Byte as i8 as i16 as Word);
                if self.branch(inst.cond, 1) {
                    self.regs.pc = target;
                }
            }
            InstructionType::Jp => {
                if self.branch(inst.cond, 1) {
                    self.regs.pc = self.fetched_data;
                }
            }
            InstructionType::Call => {
                if self.branch(inst.cond, 3) {
                    self.push_word(bus, self.regs.pc);
                    self.regs.pc = self.fetched_data;
                }
            }
            InstructionType::Ret => {
                if self.branch(inst.cond, 3) {
                    self.regs.pc = self.pop_word(bus);
                }
            }
            InstructionType::Reti => {
                self.regs.pc = self.pop_word(bus);
                self.ime = true;
            }
            InstructionType::Rst => {
                self.push_word(bus, self.regs.pc);
                self.regs.pc = inst.param as Word;
            }
            InstructionType::Push => {
                let value = self.read_reg(inst.reg1);
                self.push_word(bus, value);
            }
            InstructionType::Pop => {
                let value = self.pop_word(bus);
                self.write_reg(inst.reg1, value as u32)?;
            }
            InstructionType::Rlca => self.accumulator_shift(Cpu::alu_rlc),
            InstructionType::Rrca => self.accumulator_shift(Cpu::alu_rrc),
            InstructionType::Rla => self.accumulator_shift(Cpu::alu_rl),
            InstructionType::Rra => self.accumulator_shift(Cpu::alu_rr),
            InstructionType::Stop => {
                // STOP is two bytes; the second is ignored.
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.halted = true;
            }
            InstructionType::Halt => self.halted = true,
            InstructionType::Daa => self.alu_daa(),
            InstructionType::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.set_flag_n(true);
                self.regs.set_flag_h(true);
            }
            InstructionType::Scf => {
                self.regs.set_flag_n(false);
                self.regs.set_flag_h(false);
                self.regs.set_flag_c(true);
            }
            InstructionType::Ccf => {
                self.regs.set_flag_n(false);
                self.regs.set_flag_h(false);
                self.regs.set_flag_c(!self.regs.flag_c());
            }
            InstructionType::Di => {
                self.ime = false;
                self.enabling_ime = false;
            }
            InstructionType::Ei => self.enabling_ime = true,
            InstructionType::Cb => {
                let prefixed = cb_instruction_by_opcode(self.fetched_data as Byte);
                self.step_cycles += prefixed.cycles as u32;
                self.execute(bus, prefixed)?;
            }
            InstructionType::Rlc
            | InstructionType::Rrc
            | InstructionType::Rl
            | InstructionType::Rr
            | InstructionType::Sla
            | InstructionType::Sra
            | InstructionType::Swap
            | InstructionType::Srl
            | InstructionType::Bit
            | InstructionType::Res
            | InstructionType::Set => self.proc_prefixed(bus, inst)?,
        }
        Ok(())
    }

    // ========== Instruction Processors ==========

    fn proc_ld<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) -> Result<()> {
        if self.dest_is_mem {
            if inst.reg2.is_16bit() {
                bus.write16(self.mem_dest, self.fetched_data);
            } else {
                bus.write(self.mem_dest, self.fetched_data as Byte);
            }
            return Ok(());
        }

        if inst.mode == AddressingMode::HlSpr {
            let value = self.alu_sp_offset(self.fetched_data as Byte);
            self.regs.set_hl(value);
            return Ok(());
        }

        self.write_reg(inst.reg1, self.fetched_data as u32)
    }

    fn proc_ldh<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) {
        if inst.reg1 == RegisterType::A {
            self.regs.a = bus.read(0xFF00 | self.fetched_data);
        } else {
            bus.write(self.mem_dest, self.regs.a);
        }
    }

    fn proc_inc<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) -> Result<()> {
        if self.dest_is_mem {
            let value = self.alu_inc(self.fetched_data as Byte);
            bus.write(self.mem_dest, value);
            Ok(())
        } else if inst.reg1.is_16bit() {
            self.write_reg(inst.reg1, self.fetched_data.wrapping_add(1) as u32)
        } else {
            let value = self.alu_inc(self.fetched_data as Byte);
            self.write_reg(inst.reg1, value as u32)
        }
    }

    fn proc_dec<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) -> Result<()> {
        if self.dest_is_mem {
            let value = self.alu_dec(self.fetched_data as Byte);
            bus.write(self.mem_dest, value);
            Ok(())
        } else if inst.reg1.is_16bit() {
            self.write_reg(inst.reg1, self.fetched_data.wrapping_sub(1) as u32)
        } else {
            let value = self.alu_dec(self.fetched_data as Byte);
            self.write_reg(inst.reg1, value as u32)
        }
    }

    fn proc_add(&mut self, inst: &Instruction) {
        match inst.reg1 {
            RegisterType::Hl => self.alu_add_hl(self.fetched_data),
            RegisterType::Sp => self.regs.sp = self.alu_sp_offset(self.fetched_data as Byte),
            _ => self.alu_add(self.fetched_data as Byte, false),
        }
    }

    fn accumulator_shift(&mut self, op: fn(&mut Cpu, Byte) -> Byte) {
        let a = self.regs.a;
        self.regs.a = op(self, a);
        self.regs.set_flag_z(false);
    }

    fn proc_prefixed<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) -> Result<()> {
        let indirect = inst.mode == AddressingMode::MemoryRegisterOnly;
        let value = if indirect {
            bus.read(self.regs.hl())
        } else {
            self.read_reg(inst.reg1) as Byte
        };

        let result = match inst.inst_type {
            InstructionType::Bit => {
                self.alu_bit(value, inst.param);
                return Ok(());
            }
            InstructionType::Res => value & !(1 << inst.param),
            InstructionType::Set => value | (1 << inst.param),
            InstructionType::Rlc => self.alu_rlc(value),
            InstructionType::Rrc => self.alu_rrc(value),
            InstructionType::Rl => self.alu_rl(value),
            InstructionType::Rr => self.alu_rr(value),
            InstructionType::Sla => self.alu_sla(value),
            InstructionType::Sra => self.alu_sra(value),
            InstructionType::Swap => self.alu_swap(value),
            InstructionType::Srl => self.alu_srl(value),
            _ => value,
        };

        if indirect {
            bus.write(self.regs.hl(), result);
            Ok(())
        } else {
            self.write_reg(inst.reg1, result as u32)
        }
    }

    // ========== Stack Operations ==========

    /// Push a word: high byte at SP-1, low byte at SP-2.
    pub fn push_word<B: MemoryBus>(&mut self, bus: &mut B, value: Word) {
        let (hi, lo) = split(value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    /// Pop a word, low byte first.
    pub fn pop_word<B: MemoryBus>(&mut self, bus: &mut B) -> Word {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        word(hi, lo)
    }
}
