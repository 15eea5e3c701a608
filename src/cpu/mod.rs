//! CPU Module
//!
//! Sharp LR35902 core: register file, interrupt-enable latch, halt state and
//! single-instruction execution. Interrupt arbitration lives in
//! [`crate::interrupts`]; the CPU only exposes the state it needs.

pub mod alu;
pub mod execute;
pub mod fetch;
pub mod instructions;
pub mod registers;

use std::fmt;

use crate::bus::MemoryBus;
use crate::common::{Byte, Word};
use crate::error::{GbError, Result};
use instructions::instruction_by_opcode;
use registers::Registers;

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Instruction fetch is suspended until an enabled interrupt is requested
    pub halted: bool,
    /// Interrupt Master Enable
    pub ime: bool,
    /// Set by EI; IME turns on once the following instruction completes
    enabling_ime: bool,
    fetched_data: Word,
    mem_dest: Word,
    dest_is_mem: bool,
    cur_opcode: Byte,
    /// M-cycles charged to the instruction in flight
    step_cycles: u32,
}

impl Cpu {
    /// Zeroed CPU, as seen by the first boot ROM instruction.
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU as left by the boot ROM at 0x0100.
    pub fn post_boot() -> Self {
        Self { regs: Registers::post_boot(), ..Self::default() }
    }

    /// True between an EI and the end of the instruction after it.
    pub fn ime_pending(&self) -> bool {
        self.enabling_ime
    }

    /// Opcode of the most recently executed instruction
    pub fn current_opcode(&self) -> Byte {
        self.cur_opcode
    }

    /// Execute one instruction at PC and return its cost in M-cycles.
    ///
    /// An undefined opcode is reported without touching any state, so PC
    /// still points at the offending byte.
    pub fn step<B: MemoryBus>(&mut self, bus: &mut B) -> Result<u32> {
        let pc = self.regs.pc;
        let opcode = bus.read(pc);
        let inst = instruction_by_opcode(opcode);
        if !inst.is_defined() {
            return Err(GbError::UnknownOpcode { opcode, pc });
        }

        let ime_due = self.enabling_ime;
        self.cur_opcode = opcode;
        self.regs.pc = pc.wrapping_add(1);
        self.step_cycles = inst.cycles as u32;

        self.fetch_data(bus, inst);
        self.execute(bus, inst)?;

        // DI in the delay slot cancels the pending enable.
        if ime_due && self.enabling_ime {
            self.enabling_ime = false;
            self.ime = true;
        }

        Ok(self.step_cycles)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "PC={:04X} F={}{}{}{} A={:02X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} IME={} HALT={}",
            self.regs.pc,
            flag(self.regs.flag_z(), 'Z'),
            flag(self.regs.flag_n(), 'N'),
            flag(self.regs.flag_h(), 'H'),
            flag(self.regs.flag_c(), 'C'),
            self.regs.a,
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.regs.sp,
            self.ime as u8,
            self.halted as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FlatBus;

    #[test]
    fn test_cpu_new() {
        let cpu = Cpu::new();
        assert_eq!(cpu.regs.pc, 0);
        assert_eq!(cpu.regs.sp, 0);
        assert!(!cpu.halted);
        assert!(!cpu.ime);
    }

    #[test]
    fn test_post_boot() {
        let cpu = Cpu::post_boot();
        assert_eq!(cpu.regs.pc, 0x0100);
        assert_eq!(cpu.regs.af(), 0x01B0);
        assert!(!cpu.ime);
    }

    #[test]
    fn test_unknown_opcode_leaves_pc() {
        let mut bus = FlatBus::with_program(0x0150, &[0xD3]);
        let mut cpu = Cpu::new();
        cpu.regs.pc = 0x0150;
        let err = cpu.step(&mut bus).unwrap_err();
        assert_eq!(err, GbError::UnknownOpcode { opcode: 0xD3, pc: 0x0150 });
        assert_eq!(cpu.regs.pc, 0x0150);
    }

    #[test]
    fn test_ei_takes_effect_after_next_instruction() {
        // EI; NOP; NOP
        let mut bus = FlatBus::with_program(0x0000, &[0xFB, 0x00, 0x00]);
        let mut cpu = Cpu::new();

        cpu.step(&mut bus).unwrap();
        assert!(!cpu.ime);
        assert!(cpu.ime_pending());

        cpu.step(&mut bus).unwrap();
        assert!(cpu.ime);
        assert!(!cpu.ime_pending());
    }

    #[test]
    fn test_di_after_ei_cancels_enable() {
        // EI; DI; NOP
        let mut bus = FlatBus::with_program(0x0000, &[0xFB, 0xF3, 0x00]);
        let mut cpu = Cpu::new();
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
        }
        assert!(!cpu.ime);
    }

    #[test]
    fn test_reti_enables_immediately() {
        let mut bus = FlatBus::with_program(0xC000, &[0xD9]);
        bus.load(0xDFFC, &[0x34, 0x12]);
        let mut cpu = Cpu::new();
        cpu.regs.pc = 0xC000;
        cpu.regs.sp = 0xDFFC;
        assert_eq!(cpu.step(&mut bus).unwrap(), 4);
        assert!(cpu.ime);
        assert_eq!(cpu.regs.pc, 0x1234);
    }

    #[test]
    fn test_display_trace_line() {
        let cpu = Cpu::post_boot();
        assert_eq!(
            cpu.to_string(),
            "PC=0100 F=Z-HC A=01 BC=0013 DE=00D8 HL=014D SP=FFFE IME=0 HALT=0"
        );
    }
}
