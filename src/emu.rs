//! Emulator Core
//!
//! This module contains the main emulator structure that integrates
//! all hardware components and drives the step loop.
//!
//! One step is one unit of machine time: an interrupt dispatch, one
//! instruction, or one idle cycle while halted. Its M-cycles are then fed to
//! the timer and scanline clock one at a time, so any request they raise is
//! seen by the interrupt controller at the start of the next step.

use log::{error, info, trace};

use crate::bus::{Bus, MemoryBus};
use crate::cart::Cartridge;
use crate::common::{Byte, Word};
use crate::config::EmulatorConfig;
use crate::cpu::registers::Registers;
use crate::cpu::Cpu;
use crate::error::Result;
use crate::interrupts::{self, DISPATCH_CYCLES};
use crate::lcd::ADDR_STAT;
use crate::ppu::{NullRenderer, ScanlineRenderer, FRAME_CYCLES};

/// M-cycles charged to a step spent halted
const IDLE_CYCLES: u32 = 1;

/// Main Emulator structure
pub struct Emulator<R: ScanlineRenderer = NullRenderer> {
    cpu: Cpu,
    bus: Bus,
    renderer: R,
    config: EmulatorConfig,
    /// Total M-cycles since power-on
    cycles: u64,
    /// Completed vertical blank transitions
    frames: u64,
}

impl Emulator<NullRenderer> {
    /// Headless emulator for the given ROM image
    pub fn new(rom: Vec<Byte>, config: EmulatorConfig) -> Result<Self> {
        Self::with_renderer(rom, config, NullRenderer)
    }
}

impl<R: ScanlineRenderer> Emulator<R> {
    /// Create an emulator that hands every finished scanline to `renderer`.
    pub fn with_renderer(rom: Vec<Byte>, mut config: EmulatorConfig, renderer: R) -> Result<Self> {
        let cart = Cartridge::from_rom(rom)?;

        let header = &cart.header;
        info!(
            "loaded {:?}: {} ({:#04x}), {} KB ROM, {} KB RAM",
            header.title,
            header.cart_type_name(),
            header.cart_type,
            cart.rom_len() / 1024,
            cart.ram_len() / 1024,
        );

        let boot_rom = config.boot_rom.take();
        let cpu = if boot_rom.is_some() {
            info!("starting from boot rom");
            Cpu::new()
        } else {
            info!("starting from post-boot state");
            Cpu::post_boot()
        };
        let bus = Bus::new(cart, boot_rom);

        Ok(Self { cpu, bus, renderer, config, cycles: 0, frames: 0 })
    }

    /// Run one step: dispatch a pending interrupt, or execute one
    /// instruction, or idle one cycle while halted.
    pub fn step(&mut self) -> Result<()> {
        let was_halted = self.cpu.halted;
        let cycles = match interrupts::service(&mut self.cpu, &mut self.bus) {
            Some(_) => DISPATCH_CYCLES,
            // still halted, or just woken with IME clear
            None if was_halted => IDLE_CYCLES,
            None => self.execute()?,
        };
        self.advance(cycles);
        Ok(())
    }

    fn execute(&mut self) -> Result<u32> {
        if self.config.trace && (self.config.trace_boot_rom || !self.bus.boot_rom_mapped()) {
            trace!("{}", self.state_line());
        }

        self.cpu.step(&mut self.bus).map_err(|err| {
            error!("{}: {}", err, self.state_line());
            err
        })
    }

    fn advance(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.cycles += 1;
            let tick = self.bus.tick();
            if let Some(line) = tick.completed_line {
                self.renderer.draw_line(line, &self.bus.video());
            }
            if tick.vblank {
                self.frames += 1;
            }
        }
    }

    /// Run until the next vertical blank begins. With the display off no
    /// vertical blank comes, so one frame's worth of cycles is run instead.
    pub fn frame(&mut self) -> Result<()> {
        let start_frame = self.frames;
        let start_cycle = self.cycles;
        loop {
            self.step()?;
            if self.frames != start_frame {
                return Ok(());
            }
            if !self.bus.lcd.enabled() && self.cycles - start_cycle >= FRAME_CYCLES as u64 {
                return Ok(());
            }
        }
    }

    /// CPU and I/O state as one trace line
    pub fn state_line(&self) -> String {
        let pc = self.cpu.regs.pc;
        format!(
            "{} OP={:02X} IF={:02X} IE={:02X} LY={:02X} LCDC={:02X} STAT={:02X}",
            self.cpu,
            self.bus.read(pc),
            self.bus.int_flags,
            self.bus.ie,
            self.bus.lcd.ly(),
            self.bus.lcd.lcdc,
            self.bus.read(ADDR_STAT),
        )
    }

    // ========== Accessors ==========

    pub fn pc(&self) -> Word {
        self.cpu.regs.pc
    }

    pub fn sp(&self) -> Word {
        self.cpu.regs.sp
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn flag_z(&self) -> bool {
        self.cpu.regs.flag_z()
    }

    pub fn flag_n(&self) -> bool {
        self.cpu.regs.flag_n()
    }

    pub fn flag_h(&self) -> bool {
        self.cpu.regs.flag_h()
    }

    pub fn flag_c(&self) -> bool {
        self.cpu.regs.flag_c()
    }

    pub fn ime(&self) -> bool {
        self.cpu.ime
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted
    }

    /// IE register
    pub fn interrupt_enable(&self) -> Byte {
        self.bus.ie
    }

    /// IF register, source bits only
    pub fn interrupt_flags(&self) -> Byte {
        self.bus.int_flags
    }

    pub fn ly(&self) -> Byte {
        self.bus.lcd.ly()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::test_rom;
    use crate::error::GbError;
    use crate::interrupts::{ADDR_IE, ADDR_IF};
    use crate::lcd::{ADDR_LCDC, ADDR_LYC};
    use crate::ppu::{VideoView, LINES_PER_FRAME, LINE_CYCLES};
    use crate::timer::{ADDR_TAC, ADDR_TIMA, ADDR_TMA};

    const PROGRAM_START: Word = 0x0150;
    const RETI: Byte = 0xD9;
    const HALT: Byte = 0x76;
    const EI: Byte = 0xFB;

    /// ROM with `program` at 0x0150 and RETI in every interrupt vector
    fn rom_with(program: &[Byte]) -> Vec<Byte> {
        let mut rom = test_rom(0x00, 2);
        for vector in [0x40, 0x48, 0x50, 0x58, 0x60] {
            rom[vector] = RETI;
        }
        let start = PROGRAM_START as usize;
        rom[start..start + program.len()].copy_from_slice(program);
        rom
    }

    fn emulator(program: &[Byte]) -> Emulator {
        let mut emu = Emulator::new(rom_with(program), EmulatorConfig::default()).unwrap();
        emu.cpu_mut().regs.pc = PROGRAM_START;
        emu
    }

    fn steps<R: ScanlineRenderer>(emu: &mut Emulator<R>, count: u32) {
        for _ in 0..count {
            emu.step().unwrap();
        }
    }

    #[derive(Default)]
    struct LineRecorder {
        lines: Vec<Byte>,
    }

    impl ScanlineRenderer for LineRecorder {
        fn draw_line(&mut self, line: Byte, _video: &VideoView<'_>) {
            self.lines.push(line);
        }
    }

    #[test]
    fn test_post_boot_registers() {
        let emu = Emulator::new(rom_with(&[]), EmulatorConfig::default()).unwrap();
        assert_eq!(emu.pc(), 0x0100);
        assert_eq!(emu.sp(), 0xFFFE);
        assert_eq!(emu.registers().af(), 0x01B0);
        assert_eq!(emu.registers().bc(), 0x0013);
        assert_eq!(emu.registers().de(), 0x00D8);
        assert_eq!(emu.registers().hl(), 0x014D);
        assert!(emu.flag_z() && !emu.flag_n() && emu.flag_h() && emu.flag_c());
        assert!(!emu.ime());
        assert!(!emu.halted());
        assert_eq!(emu.interrupt_enable(), 0);
    }

    #[test]
    fn test_construction_rejects_unsupported_cartridge() {
        let result = Emulator::new(test_rom(0x19, 2), EmulatorConfig::default());
        assert_eq!(result.err(), Some(GbError::UnsupportedCartridge { cart_type: 0x19 }));

        let result = Emulator::new(vec![0; 0x100], EmulatorConfig::default());
        assert_eq!(result.err(), Some(GbError::RomTooSmall { len: 0x100 }));
    }

    #[test]
    fn test_unknown_opcode_leaves_pc() {
        let mut emu = emulator(&[0x00, 0xD3]);
        emu.step().unwrap();
        let err = emu.step().unwrap_err();
        assert_eq!(err, GbError::UnknownOpcode { opcode: 0xD3, pc: 0x0151 });
        assert_eq!(emu.pc(), 0x0151);
        assert_eq!(emu.cycles(), 1);
    }

    #[test]
    fn test_timer_overflow_after_4096_cycles() {
        let mut emu = emulator(&[]);
        emu.bus_mut().write(ADDR_TIMA, 0x00);
        emu.bus_mut().write(ADDR_TMA, 0x00);
        emu.bus_mut().write(ADDR_TAC, 0x05);

        steps(&mut emu, 0x100 * 16 - 1);
        assert_eq!(emu.interrupt_flags() & 0x04, 0);
        assert_eq!(emu.bus().read(ADDR_TIMA), 0xFF);

        emu.step().unwrap();
        assert_eq!(emu.cycles(), 4096);
        assert_eq!(emu.bus().read(ADDR_TIMA), 0x00);
        assert_eq!(emu.interrupt_flags() & 0x04, 0x04);
    }

    #[test]
    fn test_dispatch_priority_and_reti() {
        let mut emu = emulator(&[]);
        emu.bus_mut().write(ADDR_IE, 0b111);
        emu.bus_mut().write(ADDR_IF, 0b111);
        emu.cpu_mut().ime = true;

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0040);
        assert_eq!(emu.interrupt_flags(), 0b110);
        assert!(!emu.ime());
        assert_eq!(emu.cycles(), DISPATCH_CYCLES as u64);
        assert_eq!(emu.bus().read16(emu.sp()), PROGRAM_START);

        emu.step().unwrap();
        assert_eq!(emu.pc(), PROGRAM_START);
        assert!(emu.ime());
        assert_eq!(emu.interrupt_flags(), 0b110);

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0048);
        assert_eq!(emu.interrupt_flags(), 0b100);

        steps(&mut emu, 2);
        assert_eq!(emu.pc(), 0x0050);
        assert_eq!(emu.interrupt_flags(), 0);
        assert!(!emu.ime());
    }

    /// Arms a timer overflow 16 cycles out with only the timer source enabled
    fn arm_timer<R: ScanlineRenderer>(emu: &mut Emulator<R>) {
        let bus = emu.bus_mut();
        bus.write(ADDR_IE, 0x04);
        bus.write(ADDR_TIMA, 0xFF);
        bus.write(ADDR_TAC, 0x05);
    }

    #[test]
    fn test_halt_without_ime_resumes_after_halt() {
        let mut emu = emulator(&[HALT, 0x00, 0x00]);
        arm_timer(&mut emu);

        emu.step().unwrap();
        assert!(emu.halted());
        assert_eq!(emu.pc(), 0x0151);

        let mut guard = 0;
        while emu.halted() {
            emu.step().unwrap();
            assert!(emu.pc() >= PROGRAM_START, "jumped to a vector");
            guard += 1;
            assert!(guard < 100, "never woke");
        }
        assert_eq!(emu.pc(), 0x0151);
        assert_eq!(emu.interrupt_flags() & 0x04, 0x04);

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0152);
        assert_eq!(emu.interrupt_flags() & 0x04, 0x04);
    }

    #[test]
    fn test_halt_with_ime_dispatches() {
        let mut emu = emulator(&[HALT, 0x00]);
        arm_timer(&mut emu);
        emu.cpu_mut().ime = true;

        emu.step().unwrap();
        let mut guard = 0;
        while emu.pc() != 0x0050 {
            emu.step().unwrap();
            guard += 1;
            assert!(guard < 100, "never dispatched");
        }
        assert!(!emu.halted());
        assert!(!emu.ime());
        assert_eq!(emu.interrupt_flags() & 0x04, 0);

        let sp = emu.sp();
        assert_eq!(emu.bus().read(sp), 0x51);
        assert_eq!(emu.bus().read(sp + 1), 0x01);
    }

    #[test]
    fn test_ei_runs_one_more_instruction() {
        let mut emu = emulator(&[EI, 0x00, 0x00]);
        emu.bus_mut().write(ADDR_IE, 0x01);
        emu.bus_mut().write(ADDR_IF, 0x01);

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0151);
        assert!(!emu.ime());

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0152);
        assert!(emu.ime());

        emu.step().unwrap();
        assert_eq!(emu.pc(), 0x0040);
        assert_eq!(emu.bus().read16(emu.sp()), 0x0152);
    }

    #[test]
    fn test_ly_reaches_144_after_144_lines() {
        let mut emu = emulator(&[]);
        steps(&mut emu, 144 * LINE_CYCLES - 1);
        assert_eq!(emu.ly(), 143);
        assert_eq!(emu.frames(), 0);

        emu.step().unwrap();
        assert_eq!(emu.ly(), 144);
        assert_eq!(emu.frames(), 1);
        assert_eq!(emu.interrupt_flags() & 0x01, 0x01);
    }

    #[test]
    fn test_display_off_pins_ly() {
        let mut emu = emulator(&[]);
        steps(&mut emu, 20 * LINE_CYCLES);
        assert_eq!(emu.ly(), 20);

        emu.bus_mut().write(ADDR_LCDC, 0x11);
        steps(&mut emu, 2 * FRAME_CYCLES);
        assert_eq!(emu.ly(), 0);
        assert_eq!(emu.frames(), 0);
    }

    #[test]
    fn test_every_line_notified_once() {
        let rom = rom_with(&[]);
        let mut emu =
            Emulator::with_renderer(rom, EmulatorConfig::default(), LineRecorder::default())
                .unwrap();
        emu.cpu_mut().regs.pc = PROGRAM_START;

        steps(&mut emu, FRAME_CYCLES);
        let expected: Vec<Byte> = (0..LINES_PER_FRAME).collect();
        assert_eq!(emu.renderer().lines, expected);

        emu.renderer_mut().lines.clear();
        steps(&mut emu, FRAME_CYCLES);
        assert_eq!(emu.renderer().lines, expected);
    }

    #[test]
    fn test_frame_stops_at_vblank() {
        let mut emu = emulator(&[]);
        emu.frame().unwrap();
        assert_eq!(emu.ly(), 144);
        assert_eq!(emu.frames(), 1);
        assert_eq!(emu.cycles(), (144 * LINE_CYCLES) as u64);

        emu.frame().unwrap();
        assert_eq!(emu.frames(), 2);
        assert_eq!(emu.cycles(), (144 * LINE_CYCLES + FRAME_CYCLES) as u64);
    }

    #[test]
    fn test_frame_with_display_off() {
        let mut emu = emulator(&[]);
        emu.bus_mut().write(ADDR_LCDC, 0x00);
        emu.frame().unwrap();
        assert_eq!(emu.cycles(), FRAME_CYCLES as u64);
        assert_eq!(emu.frames(), 0);
        assert_eq!(emu.ly(), 0);
    }

    #[test]
    fn test_stat_lyc_dispatch() {
        let mut emu = emulator(&[]);
        emu.bus_mut().write(ADDR_IE, 0x02);
        emu.bus_mut().write(ADDR_STAT, 0x40);
        emu.bus_mut().write(ADDR_LYC, 2);
        emu.cpu_mut().ime = true;

        let mut guard = 0;
        while emu.pc() != 0x0048 {
            emu.step().unwrap();
            guard += 1;
            assert!(guard < 1000, "never dispatched");
        }
        assert_eq!(emu.ly(), 2);
        assert_eq!(emu.cycles(), (2 * LINE_CYCLES + DISPATCH_CYCLES) as u64);
    }

    #[test]
    fn test_boot_rom_runs_from_zero_and_unmaps() {
        // LD A,1; LDH (0x50),A
        let boot = vec![0x3E, 0x01, 0xE0, 0x50];
        let config = EmulatorConfig::new().with_boot_rom(boot).with_trace(true);
        let mut emu = Emulator::new(rom_with(&[]), config).unwrap();

        assert_eq!(emu.pc(), 0x0000);
        assert!(emu.bus().boot_rom_mapped());
        assert_eq!(emu.bus().read(ADDR_LCDC), 0x00);

        steps(&mut emu, 2);
        assert_eq!(emu.pc(), 0x0004);
        assert!(!emu.bus().boot_rom_mapped());
        assert_eq!(emu.bus().read(0x0000), 0x00);
    }

    #[test]
    fn test_state_line() {
        let emu = emulator(&[0x00]);
        let line = emu.state_line();
        assert!(line.starts_with("PC=0150 F=Z-HC A=01"));
        assert!(line.contains("OP=00"));
        assert!(line.contains("LY=00 LCDC=91"));
    }
}
