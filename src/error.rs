//! Error taxonomy for cartridge loading and CPU execution.

use thiserror::Error;

/// Failures that can occur while parsing an iNES/NES 2.0 image.
///
/// These are all recoverable from the host's point of view: `System::load`
/// returns one of these instead of mutating any emulator state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RomError {
    #[error("rom image is too short to contain a header ({len} bytes)")]
    TooShort { len: usize },

    #[error("invalid iNES magic bytes")]
    BadMagic,

    #[error("cartridge declares zero PRG-ROM pages")]
    NoPrgRom,

    #[error("trainer flagged in header but image is truncated before it ends")]
    TruncatedTrainer,

    #[error("image is truncated inside the PRG-ROM section")]
    TruncatedPrg,

    #[error("image is truncated inside the CHR-ROM section")]
    TruncatedChr,
}

/// Failures raised while the CPU is executing.
///
/// `Fatal` is the only variant the spec calls for: an unrecognized opcode
/// halts the core and is reported with the program counter it was fetched
/// from so a host can show a useful diagnostic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("fatal: opcode {opcode:#04X} at {pc:#06X} is not implemented")]
    Fatal { opcode: u8, pc: u16 },
}
