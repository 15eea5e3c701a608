//! Interrupts
//!
//! Five sources share the IE (0xFFFF) and IF (0xFF0F) bit layout. The
//! controller runs once per step: it wakes a halted CPU whenever an enabled
//! source is requested, and when IME is set it dispatches the highest
//! priority source like a CALL to its fixed vector.

use log::debug;

use crate::bus::MemoryBus;
use crate::common::{Byte, Word};
use crate::cpu::Cpu;

pub const ADDR_IF: Word = 0xFF0F;
pub const ADDR_IE: Word = 0xFFFF;

/// Bits of IE/IF that name a source
pub const SOURCE_MASK: Byte = 0x1F;

/// M-cycles taken by a dispatch (two wait states, two pushes, the jump).
pub const DISPATCH_CYCLES: u32 = 5;

/// Interrupt sources, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptType {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl InterruptType {
    /// Bit in IE/IF
    pub fn bit(&self) -> Byte {
        match self {
            InterruptType::VBlank => 0x01,
            InterruptType::LcdStat => 0x02,
            InterruptType::Timer => 0x04,
            InterruptType::Serial => 0x08,
            InterruptType::Joypad => 0x10,
        }
    }

    pub fn vector(&self) -> Word {
        match self {
            InterruptType::VBlank => 0x0040,
            InterruptType::LcdStat => 0x0048,
            InterruptType::Timer => 0x0050,
            InterruptType::Serial => 0x0058,
            InterruptType::Joypad => 0x0060,
        }
    }

    /// All sources, highest priority first
    pub fn all() -> &'static [InterruptType] {
        &[
            InterruptType::VBlank,
            InterruptType::LcdStat,
            InterruptType::Timer,
            InterruptType::Serial,
            InterruptType::Joypad,
        ]
    }

    /// Highest priority source set in `mask`.
    pub fn highest(mask: Byte) -> Option<InterruptType> {
        InterruptType::all().iter().copied().find(|source| mask & source.bit() != 0)
    }
}

/// Requested and enabled sources
pub fn pending<B: MemoryBus>(bus: &B) -> Byte {
    bus.read(ADDR_IE) & bus.read(ADDR_IF) & SOURCE_MASK
}

/// Run the controller once.
///
/// Returns the dispatched source, if any. A pending source always clears
/// `halted`; without IME the CPU just resumes after its HALT and the
/// request bit is left set.
pub fn service<B: MemoryBus>(cpu: &mut Cpu, bus: &mut B) -> Option<InterruptType> {
    let source = InterruptType::highest(pending(bus))?;

    cpu.halted = false;
    if !cpu.ime {
        return None;
    }

    let flags = bus.read(ADDR_IF);
    bus.write(ADDR_IF, flags & !source.bit());
    cpu.ime = false;

    let return_pc = cpu.regs.pc;
    cpu.push_word(bus, return_pc);
    cpu.regs.pc = source.vector();

    debug!("dispatch {:?} from {:#06x}", source, return_pc);
    Some(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::FlatBus;

    fn setup(ie: Byte, iflag: Byte) -> (Cpu, FlatBus) {
        let mut bus = FlatBus::new();
        bus.write(ADDR_IE, ie);
        bus.write(ADDR_IF, iflag);
        let mut cpu = Cpu::new();
        cpu.regs.pc = 0x0150;
        cpu.regs.sp = 0xFFFE;
        (cpu, bus)
    }

    #[test]
    fn test_interrupt_vectors() {
        assert_eq!(InterruptType::VBlank.vector(), 0x0040);
        assert_eq!(InterruptType::LcdStat.vector(), 0x0048);
        assert_eq!(InterruptType::Timer.vector(), 0x0050);
        assert_eq!(InterruptType::Serial.vector(), 0x0058);
        assert_eq!(InterruptType::Joypad.vector(), 0x0060);
    }

    #[test]
    fn test_highest_priority() {
        assert_eq!(InterruptType::highest(0b10100), Some(InterruptType::Timer));
        assert_eq!(InterruptType::highest(0b00111), Some(InterruptType::VBlank));
        assert_eq!(InterruptType::highest(0b10000), Some(InterruptType::Joypad));
        assert_eq!(InterruptType::highest(0), None);
    }

    #[test]
    fn test_requested_but_not_enabled_is_ignored() {
        let (mut cpu, mut bus) = setup(0x00, 0x01);
        cpu.ime = true;
        cpu.halted = true;
        assert_eq!(service(&mut cpu, &mut bus), None);
        assert!(cpu.halted);
        assert_eq!(cpu.regs.pc, 0x0150);
    }

    #[test]
    fn test_dispatch_pushes_pc_and_clears_request() {
        let (mut cpu, mut bus) = setup(0b111, 0b111);
        cpu.ime = true;

        assert_eq!(service(&mut cpu, &mut bus), Some(InterruptType::VBlank));
        assert_eq!(cpu.regs.pc, 0x0040);
        assert!(!cpu.ime);
        assert_eq!(bus.read(ADDR_IF), 0b110);
        assert_eq!(cpu.regs.sp, 0xFFFC);
        assert_eq!(bus.read(0xFFFC), 0x50);
        assert_eq!(bus.read(0xFFFD), 0x01);
    }

    #[test]
    fn test_wake_without_ime_keeps_request() {
        let (mut cpu, mut bus) = setup(0b100, 0b100);
        cpu.halted = true;

        assert_eq!(service(&mut cpu, &mut bus), None);
        assert!(!cpu.halted);
        assert_eq!(cpu.regs.pc, 0x0150);
        assert_eq!(bus.read(ADDR_IF), 0b100);
    }

    #[test]
    fn test_wake_with_ime_dispatches() {
        let (mut cpu, mut bus) = setup(0b010, 0b010);
        cpu.halted = true;
        cpu.ime = true;

        assert_eq!(service(&mut cpu, &mut bus), Some(InterruptType::LcdStat));
        assert!(!cpu.halted);
        assert_eq!(cpu.regs.pc, 0x0048);
        assert_eq!(bus.read(ADDR_IF), 0);
    }
}
