//! Cartridge
//!
//! ROM header metadata and the memory-bank controllers the core can map:
//! plain ROM (optionally with RAM) and MBC1.

use log::warn;

use crate::common::{Byte, Word};
use crate::error::{GbError, Result};

/// ROM header offsets
const HEADER_TITLE_START: usize = 0x134;
const HEADER_TITLE_END: usize = 0x143;
const HEADER_CART_TYPE: usize = 0x147;
const HEADER_ROM_SIZE: usize = 0x148;
const HEADER_RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;
/// First byte past the header
pub const HEADER_END: usize = 0x150;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Bank controller selected by the header's cartridge type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapper {
    /// 0x00, 0x08, 0x09
    RomOnly,
    /// 0x01-0x03
    Mbc1,
}

impl Mapper {
    pub fn from_cart_type(cart_type: Byte) -> Result<Self> {
        match cart_type {
            0x00 | 0x08 | 0x09 => Ok(Mapper::RomOnly),
            0x01..=0x03 => Ok(Mapper::Mbc1),
            _ => Err(GbError::UnsupportedCartridge { cart_type }),
        }
    }
}

/// ROM header information
#[derive(Debug, Clone)]
pub struct RomHeader {
    /// Game title (up to 16 characters)
    pub title: String,
    pub cart_type: Byte,
    /// ROM size code
    pub rom_size: Byte,
    /// RAM size code
    pub ram_size: Byte,
    pub checksum: Byte,
}

impl RomHeader {
    pub fn parse(rom: &[Byte]) -> Result<Self> {
        if rom.len() < HEADER_END {
            return Err(GbError::RomTooSmall { len: rom.len() });
        }

        let title = rom[HEADER_TITLE_START..=HEADER_TITLE_END]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();

        Ok(Self {
            title,
            cart_type: rom[HEADER_CART_TYPE],
            rom_size: rom[HEADER_ROM_SIZE],
            ram_size: rom[HEADER_RAM_SIZE],
            checksum: rom[HEADER_CHECKSUM],
        })
    }

    /// ROM size in bytes
    pub fn rom_size_bytes(&self) -> usize {
        32768 << (self.rom_size & 0x0F) as usize
    }

    /// RAM size in bytes
    pub fn ram_size_bytes(&self) -> usize {
        match self.ram_size {
            1 => 2048,
            2 => 8192,
            3 => 32768,
            4 => 131072,
            5 => 65536,
            _ => 0,
        }
    }

    pub fn cart_type_name(&self) -> &'static str {
        match self.cart_type {
            0x00 => "ROM ONLY",
            0x01 => "MBC1",
            0x02 => "MBC1+RAM",
            0x03 => "MBC1+RAM+BATTERY",
            0x08 => "ROM+RAM",
            0x09 => "ROM+RAM+BATTERY",
            _ => "UNKNOWN",
        }
    }
}

/// Header checksum over 0x134-0x14C
pub fn header_checksum(rom: &[Byte]) -> Byte {
    rom.iter()
        .take(HEADER_CHECKSUM)
        .skip(HEADER_TITLE_START)
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<Byte>,
    pub header: RomHeader,
    mapper: Mapper,
    ram: Vec<Byte>,
    ram_enabled: bool,
    /// MBC1 low five bank bits, never zero
    rom_bank: u8,
    /// MBC1 two-bit register: RAM bank or upper ROM bank bits
    ram_bank: u8,
    /// MBC1 mode select (0 = ROM banking, 1 = RAM banking)
    banking_mode: u8,
}

impl Cartridge {
    /// Wrap a ROM image, rejecting headers the core cannot map.
    pub fn from_rom(rom: Vec<Byte>) -> Result<Self> {
        let header = RomHeader::parse(&rom)?;
        let mapper = Mapper::from_cart_type(header.cart_type)?;

        if header_checksum(&rom) != header.checksum {
            warn!("header checksum mismatch for {:?}", header.title);
        }

        let ram = vec![0; header.ram_size_bytes()];
        Ok(Self {
            rom,
            header,
            mapper,
            ram,
            // plain RAM carts have no enable latch
            ram_enabled: mapper == Mapper::RomOnly,
            rom_bank: 1,
            ram_bank: 0,
            banking_mode: 0,
        })
    }

    pub fn mapper(&self) -> Mapper {
        self.mapper
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    pub fn ram_len(&self) -> usize {
        self.ram.len()
    }

    /// Number of 16KB ROM banks available in this cartridge
    fn rom_bank_count(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1)
    }

    /// Number of 8KB RAM banks available in this cartridge
    fn ram_bank_count(&self) -> usize {
        (self.ram.len() / RAM_BANK_SIZE).max(1)
    }

    /// Bank mapped at 0x0000-0x3FFF
    fn rom0_bank(&self) -> usize {
        match self.mapper {
            Mapper::Mbc1 if self.banking_mode == 1 => {
                (((self.ram_bank as usize) & 0x03) << 5) % self.rom_bank_count()
            }
            _ => 0,
        }
    }

    /// Bank mapped at 0x4000-0x7FFF
    fn romx_bank(&self) -> usize {
        let bank_count = self.rom_bank_count();
        if self.mapper == Mapper::RomOnly {
            return 1 % bank_count;
        }

        let mut bank = (self.rom_bank as usize) & 0x1F;
        if self.banking_mode == 0 {
            bank |= ((self.ram_bank as usize) & 0x03) << 5;
        }
        // the zero-to-one rule already applied to the register on write
        bank % bank_count
    }

    fn ram_offset(&self, address: Word) -> Option<usize> {
        if !self.ram_enabled || self.ram.is_empty() {
            return None;
        }
        let bank = match self.mapper {
            Mapper::Mbc1 if self.banking_mode == 1 => self.ram_bank as usize,
            _ => 0,
        } % self.ram_bank_count();
        let offset = bank * RAM_BANK_SIZE + (address as usize - 0xA000);
        (offset < self.ram.len()).then_some(offset)
    }

    pub fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x3FFF => {
                let offset = self.rom0_bank() * ROM_BANK_SIZE + address as usize;
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            0x4000..=0x7FFF => {
                let offset = self.romx_bank() * ROM_BANK_SIZE + (address as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            0xA000..=0xBFFF => self.ram_offset(address).map_or(0xFF, |offset| self.ram[offset]),
            _ => 0xFF,
        }
    }

    /// ROM-area writes program the bank registers; 0xA000-0xBFFF hits RAM.
    pub fn write(&mut self, address: Word, value: Byte) {
        match (self.mapper, address) {
            (Mapper::Mbc1, 0x0000..=0x1FFF) => self.ram_enabled = (value & 0x0F) == 0x0A,
            (Mapper::Mbc1, 0x2000..=0x3FFF) => self.rom_bank = (value & 0x1F).max(1),
            (Mapper::Mbc1, 0x4000..=0x5FFF) => self.ram_bank = value & 0x03,
            (Mapper::Mbc1, 0x6000..=0x7FFF) => self.banking_mode = value & 0x01,
            (_, 0xA000..=0xBFFF) => {
                if let Some(offset) = self.ram_offset(address) {
                    self.ram[offset] = value;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) fn test_rom(cart_type: Byte, banks: usize) -> Vec<Byte> {
    let mut rom = vec![0u8; banks.max(2) * ROM_BANK_SIZE];
    rom[HEADER_TITLE_START..HEADER_TITLE_START + 8].copy_from_slice(b"TEST ROM");
    rom[HEADER_CART_TYPE] = cart_type;
    rom[HEADER_ROM_SIZE] = (banks.max(2) / 2).trailing_zeros() as Byte;
    rom[HEADER_CHECKSUM] = header_checksum(&rom);
    rom
}
