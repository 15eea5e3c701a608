//! Error taxonomy for the emulator core.
//!
//! Construction faults abort construction; step faults abort the current
//! step and leave the machine state untouched at the faulting PC so the
//! caller can report or reproduce it.

use thiserror::Error;

use crate::common::{Byte, Word};

pub type Result<T> = std::result::Result<T, GbError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GbError {
    /// The cartridge header names a mapper this core does not implement.
    #[error("unsupported cartridge type {cart_type:#04x}")]
    UnsupportedCartridge { cart_type: Byte },

    /// The ROM image is too short to contain a cartridge header.
    #[error("rom image of {len} bytes is smaller than the cartridge header")]
    RomTooSmall { len: usize },

    /// A fetched byte decodes to no instruction. The 0xCB page is fully
    /// populated, so only unprefixed opcodes can fault.
    #[error("unknown opcode {opcode:#04x} at pc {pc:#06x}")]
    UnknownOpcode { opcode: Byte, pc: Word },

    /// A register was written with a value wider than the register.
    #[error("invalid write of {value:#x} to register {register}")]
    InvalidRegisterAccess { register: &'static str, value: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_opcode_message_carries_context() {
        let err = GbError::UnknownOpcode { opcode: 0xD3, pc: 0x0150 };
        assert_eq!(err.to_string(), "unknown opcode 0xd3 at pc 0x0150");
    }

    #[test]
    fn test_unsupported_cartridge_message() {
        let err = GbError::UnsupportedCartridge { cart_type: 0xFC };
        assert_eq!(err.to_string(), "unsupported cartridge type 0xfc");
    }
}
