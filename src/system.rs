//! `System`: the single owner tying the CPU, PPU, controllers and loaded
//! cartridge together, and the crate's public entry point.
//!
//! This is the redesign the spec's Design Notes call for: one struct owns
//! every piece of state, and a transient [`Bus`] borrow is built fresh for
//! each CPU step instead of any component holding a reference to another.

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::config::{Config, PaletteMode};
use crate::controller::{Buttons, Controller};
use crate::cpu::Cpu;
use crate::error::{CoreError, RomError};
use crate::ppu::Ppu;

pub struct System {
    cpu: Cpu,
    ram: Box<[u8; 0x10000]>,
    ppu: Ppu,
    controllers: [Controller; 2],
    cartridge: Option<Cartridge>,
    config: Config,
    paused: bool,
}

impl System {
    pub fn new(config: Config) -> Self {
        System {
            cpu: Cpu::new(),
            ram: Box::new([0u8; 0x10000]),
            ppu: Ppu::new(),
            controllers: [Controller::new(), Controller::new()],
            cartridge: None,
            config,
            paused: false,
        }
    }

    /// Parses `data` as an iNES/NES 2.0 image, copies its PRG-ROM into
    /// the CPU's address space, and resets every component to its
    /// power-on state. Mapper numbers other than 0 (NROM) are accepted
    /// but logged as a warning, since address decoding only wires NROM.
    pub fn load(&mut self, data: &[u8]) -> Result<(), RomError> {
        let cartridge = Cartridge::parse(data)?;
        if !cartridge.is_supported_mapper() {
            log::warn!("mapper {} is not supported; only NROM (mapper 0) is wired up", cartridge.mapper);
        }

        self.ram = Box::new([0u8; 0x10000]);
        for offset in 0..0x8000u32 {
            self.ram[0x8000 + offset as usize] = cartridge.read_prg(0x8000 + offset as u16);
        }

        self.cartridge = Some(cartridge);
        self.ppu.power_on();
        self.controllers = [Controller::new(), Controller::new()];

        let mut cart = self.cartridge.take().unwrap();
        {
            let mut bus = Bus::new(&mut self.ram, &mut self.ppu, &mut self.controllers, &mut cart);
            self.cpu.power_on(&mut bus);
        }
        self.cartridge = Some(cart);
        Ok(())
    }

    pub fn set_controller(&mut self, port: usize, buttons: Buttons) {
        if let Some(controller) = self.controllers.get_mut(port) {
            controller.set_state(buttons);
        }
    }

    /// Asserts the CPU's RESET line: zeroes `A`/`X`/`Y`, sets `S = $FD`
    /// and `P = $24`, and reloads `PC` from the reset vector — the same
    /// state [`System::load`]'s cold power-on produces (§3 Lifecycle).
    /// PPU and controller state are left untouched; the spec only calls
    /// out CPU state as cleared on reset. A no-op without a loaded
    /// cartridge.
    pub fn reset(&mut self) {
        let mut cart = match self.cartridge.take() {
            Some(c) => c,
            None => return,
        };
        {
            let mut bus = Bus::new(&mut self.ram, &mut self.ppu, &mut self.controllers, &mut cart);
            self.cpu.reset(&mut bus);
        }
        self.cartridge = Some(cart);
        self.paused = false;
    }

    /// Suspends or resumes `run`/`run_frame`: while paused, both return
    /// `Ok(0)` immediately without touching CPU, PPU, or bus state.
    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) {
        self.config.palette = mode;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Runs up to `max_cycles` CPU cycles (defaulting to one frame's
    /// worth when the host doesn't care to budget precisely), stepping
    /// the PPU three dots for every CPU cycle actually charged. Stops
    /// early, returning the fatal error, if the CPU hits an unimplemented
    /// opcode.
    pub fn run(&mut self, max_cycles: u32) -> Result<u32, CoreError> {
        if self.paused {
            return Ok(0);
        }
        let mut cart = match self.cartridge.take() {
            Some(c) => c,
            None => return Ok(0),
        };

        let mut cycles_run = 0u32;
        let result = (|| {
            while cycles_run < max_cycles {
                let mut bus = Bus::new(&mut self.ram, &mut self.ppu, &mut self.controllers, &mut cart);
                let charged = self.cpu.step(&mut bus)?;
                cycles_run += charged as u32;
                for _ in 0..(charged as u32 * 3) {
                    self.ppu.step();
                }
                if self.ppu.nmi_occurred {
                    self.ppu.nmi_occurred = false;
                    self.cpu.request_nmi();
                }
            }
            Ok(cycles_run)
        })();

        self.cartridge = Some(cart);
        result
    }

    /// Convenience wrapper over [`System::run`] using the configured
    /// per-frame cycle budget.
    pub fn run_frame(&mut self) -> Result<u32, CoreError> {
        let budget = self.config.cycles_per_frame;
        self.run(budget)
    }

    /// Renders the current frame buffer as packed RGBA8888, 256x240.
    /// Returns `None` if no cartridge is loaded.
    pub fn render(&self) -> Option<Vec<u32>> {
        let cart = self.cartridge.as_ref()?;
        Some(self.ppu.render(cart, self.config.palette))
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.halted.is_some()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }
}

impl Default for System {
    fn default() -> Self {
        System::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_rom_with_reset_vector(pc: u16) -> Vec<u8> {
        let mut data = vec![0u8; 16 + 16384];
        data[0..4].copy_from_slice(b"NES\x1A");
        data[4] = 1;
        let offset = 16 + (0xFFFC - 0x8000) as usize;
        data[offset] = (pc & 0xFF) as u8;
        data[offset + 1] = (pc >> 8) as u8;
        data
    }

    #[test]
    fn load_then_run_executes_from_reset_vector() {
        let mut rom = nrom_rom_with_reset_vector(0x8000);
        // LDA #$55 ; loops forever via JMP $8002
        rom[16] = 0xA9;
        rom[17] = 0x55;
        rom[18] = 0x4C;
        rom[19] = 0x02;
        rom[20] = 0x80;

        let mut system = System::default();
        system.load(&rom).unwrap();
        system.run(2).unwrap();
        assert_eq!(system.cpu().regs.a, 0x55);
    }

    #[test]
    fn run_reports_fatal_on_unimplemented_opcode() {
        let mut rom = nrom_rom_with_reset_vector(0x8000);
        rom[16] = 0x02; // JAM
        let mut system = System::default();
        system.load(&rom).unwrap();
        let err = system.run(100).unwrap_err();
        assert!(matches!(err, CoreError::Fatal { opcode: 0x02, .. }));
        assert!(system.is_halted());
    }

    #[test]
    fn render_returns_none_without_a_loaded_cartridge() {
        let system = System::default();
        assert!(system.render().is_none());
    }

    #[test]
    fn paused_run_does_not_advance_cpu() {
        let mut rom = nrom_rom_with_reset_vector(0x8000);
        rom[16] = 0xA9; // LDA #$55
        rom[17] = 0x55;
        let mut system = System::default();
        system.load(&rom).unwrap();
        system.pause(true);
        assert!(system.is_paused());
        let consumed = system.run(10).unwrap();
        assert_eq!(consumed, 0);
        assert_eq!(system.cpu().regs.a, 0);
    }

    #[test]
    fn reset_clears_registers_and_reloads_pc() {
        let mut rom = nrom_rom_with_reset_vector(0x8000);
        rom[16] = 0xA9; // LDA #$55
        rom[17] = 0x55;
        let mut system = System::default();
        system.load(&rom).unwrap();
        system.run(2).unwrap();
        assert_eq!(system.cpu().regs.a, 0x55);

        system.reset();
        assert_eq!(system.cpu().regs.pc, 0x8000);
        assert_eq!(system.cpu().regs.a, 0);
        assert_eq!(system.cpu().regs.x, 0);
        assert_eq!(system.cpu().regs.y, 0);
        assert_eq!(system.cpu().regs.s, 0xFD);
        assert_eq!(system.cpu().regs.p.bits(), 0x24);
        assert!(!system.is_halted());
    }

    #[test]
    fn set_palette_mode_updates_config() {
        let mut system = System::default();
        system.set_palette_mode(crate::config::PaletteMode::Pal);
        assert_eq!(system.config().palette, crate::config::PaletteMode::Pal);
    }

    #[test]
    fn rejects_malformed_rom_without_touching_state() {
        let mut system = System::default();
        let err = system.load(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, RomError::TooShort { .. }));
        assert!(system.render().is_none());
    }
}
