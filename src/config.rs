//! Per-instance emulator configuration.

/// Size of the DMG boot ROM image mapped at 0x0000-0x00FF.
pub const BOOT_ROM_SIZE: usize = 0x100;

/// Options handed to [`crate::emu::Emulator`] at construction.
///
/// Tracing is scoped to one emulator instance; two emulators in the same
/// process can run with different settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Emit one `trace!` line per executed instruction.
    pub trace: bool,
    /// Also trace instructions executed from the boot ROM.
    pub trace_boot_rom: bool,
    /// Boot image to run from 0x0000. `None` starts from the post-boot state.
    pub boot_rom: Option<Vec<u8>>,
}

impl EmulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_boot_rom_trace(mut self, trace: bool) -> Self {
        self.trace_boot_rom = trace;
        self
    }

    /// Images longer than 256 bytes are truncated; shorter ones are padded
    /// with 0xFF when mapped.
    pub fn with_boot_rom(mut self, image: Vec<u8>) -> Self {
        self.boot_rom = Some(image);
        self
    }
}
