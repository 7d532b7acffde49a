//! Runtime configuration for a [`crate::System`].
//!
//! Kept deliberately small: the core has exactly two knobs a host ever
//! needs to set before or between frames, and both are plain data so a
//! frontend can persist them as JSON via `serde`.

use serde::{Deserialize, Serialize};

/// Which palette table the PPU uses to turn a 6-bit NES color index into
/// an RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteMode {
    Ntsc,
    Pal,
}

impl Default for PaletteMode {
    fn default() -> Self {
        PaletteMode::Ntsc
    }
}

/// Host-tunable knobs. Anything that affects emulated hardware behavior
/// (mirroring, mapper number, ...) lives on the cartridge instead, since
/// it's a property of the ROM rather than something a user picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub palette: PaletteMode,
    /// Number of CPU cycles `System::run` advances per call when a host
    /// doesn't pass an explicit budget. One NTSC frame is ~29780 cycles.
    pub cycles_per_frame: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            palette: PaletteMode::default(),
            cycles_per_frame: 29_780,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> serde_json::Result<Config> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_config() {
        let config = Config { palette: PaletteMode::Pal, cycles_per_frame: 12345 };
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        assert!(Config::from_json("not json").is_err());
    }
}
