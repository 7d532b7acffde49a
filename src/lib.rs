//! NROM-only NES emulator core: 6502 CPU, PPU, memory bus, and cartridge
//! loader behind a single [`System`] façade.
//!
//! ```no_run
//! use nes_core::{Config, System};
//!
//! let rom = std::fs::read("game.nes").unwrap();
//! let mut system = System::new(Config::default());
//! system.load(&rom).unwrap();
//! system.run_frame().unwrap();
//! let frame = system.render().unwrap();
//! assert_eq!(frame.len(), 256 * 240);
//! ```

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod framedump;
pub mod ppu;
pub mod system;

pub use cartridge::{Cartridge, Mirroring};
pub use config::{Config, PaletteMode};
pub use controller::{Buttons, Controller};
pub use error::{CoreError, RomError};
pub use system::System;
