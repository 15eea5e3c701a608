//! Memory Bus
//!
//! This module implements the Game Boy memory bus, which routes
//! memory accesses to the appropriate hardware components based on address.
//! It owns every memory-mapped register and is the only place interrupt
//! requests from the timer and LCD are folded into IF.

use log::debug;

use crate::cart::Cartridge;
use crate::common::{Byte, Word};
use crate::config::BOOT_ROM_SIZE;
use crate::interrupts::{InterruptType, ADDR_IF, SOURCE_MASK};
use crate::lcd::{Lcd, ADDR_DMA};
use crate::ppu::tile::{TILE_BYTES, TILE_COUNT};
use crate::ppu::{ClockTick, ScanlineClock, VideoView, VRAM_SIZE};
use crate::timer::Timer;

/// Memory bus trait for reading and writing memory
pub trait MemoryBus {
    /// Read a byte from the given address
    fn read(&self, address: Word) -> Byte;

    /// Write a byte to the given address
    fn write(&mut self, address: Word, value: Byte);

    /// Read a 16-bit word from the given address (little-endian)
    fn read16(&self, address: Word) -> Word {
        let lo = self.read(address) as Word;
        let hi = self.read(address.wrapping_add(1)) as Word;
        lo | (hi << 8)
    }

    /// Write a 16-bit word to the given address (little-endian)
    fn write16(&mut self, address: Word, value: Word) {
        self.write(address, (value & 0xFF) as Byte);
        self.write(address.wrapping_add(1), ((value >> 8) & 0xFF) as Byte);
    }
}

/// Writing non-zero here unmaps the boot ROM
pub const ADDR_BOOT_OFF: Word = 0xFF50;

const WRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;
const HRAM_SIZE: usize = 0x7F;
const IO_SIZE: usize = 0x80;
/// End of the tile data block in VRAM
const TILE_DATA_END: Word = 0x97FF;

/// Unmodeled I/O bytes as the boot ROM leaves them (joypad, sound)
const POST_BOOT_IO: [(Word, Byte); 21] = [
    (0xFF00, 0xCF),
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
    (0xFF50, 0x01),
    (0xFF4D, 0xFF),
];

/// Game Boy memory bus
///
/// Routes memory accesses to the appropriate hardware components:
/// - 0x0000-0x7FFF: Cartridge ROM (boot ROM over 0x0000-0x00FF while mapped)
/// - 0x8000-0x9FFF: VRAM
/// - 0xA000-0xBFFF: Cartridge RAM
/// - 0xC000-0xDFFF: WRAM
/// - 0xE000-0xFDFF: Echo RAM (mirror of WRAM)
/// - 0xFE00-0xFE9F: OAM
/// - 0xFEA0-0xFEFF: Unusable (reads 0xFF)
/// - 0xFF00-0xFF7F: I/O registers
/// - 0xFF80-0xFFFE: HRAM
/// - 0xFFFF: IE register
#[derive(Debug, Clone)]
pub struct Bus {
    cart: Cartridge,
    boot_rom: Option<Vec<Byte>>,
    vram: [Byte; VRAM_SIZE],
    wram: [Byte; WRAM_SIZE],
    oam: [Byte; OAM_SIZE],
    hram: [Byte; HRAM_SIZE],
    /// I/O bytes with no modeled hardware behind them
    io: [Byte; IO_SIZE],
    /// Per-tile counter bumped on every tile-data write
    tile_versions: [u32; TILE_COUNT],
    pub timer: Timer,
    pub lcd: Lcd,
    pub clock: ScanlineClock,
    /// IE register (0xFFFF)
    pub ie: Byte,
    /// IF register (0xFF0F), low five bits
    pub int_flags: Byte,
}

impl Bus {
    /// Power-on bus. With a boot image every register starts cleared and the
    /// image is mapped at 0x0000; without one the bus starts in the state the
    /// boot ROM hands over to the cartridge.
    ///
    /// # Arguments
    /// * `cart` - The loaded cartridge
    /// * `boot_rom` - Optional boot image, padded with 0xFF to 256 bytes
    pub fn new(cart: Cartridge, boot_rom: Option<Vec<Byte>>) -> Self {
        let mut bus = Self {
            cart,
            boot_rom: None,
            vram: [0; VRAM_SIZE],
            wram: [0; WRAM_SIZE],
            oam: [0; OAM_SIZE],
            hram: [0; HRAM_SIZE],
            io: [0; IO_SIZE],
            tile_versions: [0; TILE_COUNT],
            timer: Timer::new(),
            lcd: Lcd::new(),
            clock: ScanlineClock::new(),
            ie: 0,
            int_flags: 0,
        };

        match boot_rom {
            Some(mut image) => {
                image.resize(BOOT_ROM_SIZE, 0xFF);
                bus.boot_rom = Some(image);
            }
            None => {
                bus.timer = Timer::post_boot();
                bus.lcd = Lcd::post_boot();
                bus.clock = ScanlineClock::post_boot();
                for (address, value) in POST_BOOT_IO {
                    bus.io[(address - 0xFF00) as usize] = value;
                }
            }
        }
        bus
    }

    pub fn cart(&self) -> &Cartridge {
        &self.cart
    }

    pub fn boot_rom_mapped(&self) -> bool {
        self.boot_rom.is_some()
    }

    /// Set the IF bit for `source`
    pub fn request_interrupt(&mut self, source: InterruptType) {
        self.int_flags |= source.bit();
    }

    /// View handed to the rendering backend
    pub fn video(&self) -> VideoView<'_> {
        VideoView::new(&self.lcd, &self.vram, &self.tile_versions)
    }

    /// Advance the timer and scanline clock one M-cycle and latch their
    /// requests into IF.
    ///
    /// # Returns
    /// The scanline clock's report: the line just completed, if any, and
    /// whether vertical blank began on this cycle
    pub fn tick(&mut self) -> ClockTick {
        self.timer.tick();
        if self.timer.take_interrupt() {
            self.request_interrupt(InterruptType::Timer);
        }

        let tick = self.clock.tick(&mut self.lcd);
        if tick.vblank {
            self.request_interrupt(InterruptType::VBlank);
        }
        self.latch_stat();
        tick
    }

    fn latch_stat(&mut self) {
        if self.lcd.take_stat_interrupt() {
            self.request_interrupt(InterruptType::LcdStat);
        }
    }

    /// Copy 0xXX00-0xXX9F into OAM.
    fn oam_dma(&mut self, page: Byte) {
        let source = (page as Word) << 8;
        let mut block = [0u8; OAM_SIZE];
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = self.read(source.wrapping_add(i as Word));
        }
        self.oam = block;
    }

    fn read_io(&self, address: Word) -> Byte {
        match address {
            0xFF04..=0xFF07 => self.timer.read(address),
            ADDR_IF => self.int_flags | !SOURCE_MASK,
            0xFF40..=0xFF4B => self.lcd.read(address),
            _ => self.io[(address - 0xFF00) as usize],
        }
    }

    fn write_io(&mut self, address: Word, value: Byte) {
        match address {
            0xFF04..=0xFF07 => self.timer.write(address, value),
            ADDR_IF => self.int_flags = value & SOURCE_MASK,
            ADDR_DMA => {
                self.lcd.write(address, value);
                self.oam_dma(value);
            }
            0xFF40..=0xFF4B => {
                self.lcd.write(address, value);
                self.latch_stat();
            }
            ADDR_BOOT_OFF => {
                if value != 0 && self.boot_rom.take().is_some() {
                    debug!("boot rom unmapped");
                }
                self.io[(address - 0xFF00) as usize] = value;
            }
            _ => self.io[(address - 0xFF00) as usize] = value,
        }
    }
}

impl MemoryBus for Bus {
    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => match &self.boot_rom {
                Some(boot) if (address as usize) < BOOT_ROM_SIZE => boot[address as usize],
                _ => self.cart.read(address),
            },
            0x8000..=0x9FFF => self.vram[(address - 0x8000) as usize],
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize],
            0xFE00..=0xFE9F => self.oam[(address - 0xFE00) as usize],
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => self.read_io(address),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize],
            0xFFFF => self.ie,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.cart.write(address, value),
            0x8000..=0x9FFF => {
                self.vram[(address - 0x8000) as usize] = value;
                if address <= TILE_DATA_END {
                    let tile = (address - 0x8000) as usize / TILE_BYTES;
                    self.tile_versions[tile] = self.tile_versions[tile].wrapping_add(1);
                }
            }
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(address - 0xFE00) as usize] = value,
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(address, value),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize] = value,
            0xFFFF => self.ie = value,
        }
    }
}

/// Flat 64KB memory for exercising the CPU without any hardware attached
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FlatBus {
    memory: Vec<Byte>,
}

#[cfg(test)]
impl FlatBus {
    pub fn new() -> Self {
        Self { memory: vec![0; 0x10000] }
    }

    pub fn with_program(address: Word, program: &[Byte]) -> Self {
        let mut bus = Self::new();
        bus.load(address, program);
        bus
    }

    pub fn load(&mut self, address: Word, bytes: &[Byte]) {
        let start = address as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

#[cfg(test)]
impl MemoryBus for FlatBus {
    fn read(&self, address: Word) -> Byte {
        self.memory[address as usize]
    }

    fn write(&mut self, address: Word, value: Byte) {
        self.memory[address as usize] = value;
    }
}
