//! Game Boy Core Library
//!
//! Cycle-stepped emulation of the Sharp LR35902 CPU together with the
//! hardware that shares its timeline: the interrupt controller, the
//! programmable timer and the scanline clock that drives LY and the STAT
//! mode. Pixels are produced by a pluggable [`ppu::ScanlineRenderer`].

pub mod bus;
pub mod cart;
pub mod common;
pub mod config;
pub mod cpu;
pub mod emu;
pub mod error;
pub mod interrupts;
pub mod lcd;
pub mod ppu;
pub mod timer;
pub mod ui;

pub use config::EmulatorConfig;
pub use emu::Emulator;
pub use error::{GbError, Result};
