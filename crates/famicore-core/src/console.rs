//! The console: owns CPU and bus, drives the tick interleaving.

use famicore_cpu::{Bus, Cpu};
use famicore_mappers::{Cartridge, RomError};

use crate::bus::SystemBus;

/// Timing constants (NTSC).
pub mod timing {
    /// Master clock in Hz.
    pub const MASTER_CLOCK: u32 = 21_477_272;
    /// CPU clock in Hz.
    pub const CPU_CLOCK: u32 = MASTER_CLOCK / 12;
    /// PPU dots per CPU cycle.
    pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;
    /// CPU cycles per frame, rounded.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
    /// Frame rate.
    pub const FRAME_RATE: f64 = 60.0988;
}

/// Errors surfaced by the cartridge lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The ROM image failed to parse.
    #[error(transparent)]
    Rom(#[from] RomError),

    /// An operation needed a cartridge and none is inserted.
    #[error("no cartridge inserted")]
    NoCartridge,

    /// The ROM file could not be read.
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
}

/// The emulated console.
pub struct Console {
    cpu: Cpu,
    bus: SystemBus,
    total_cycles: u64,
}

impl Console {
    /// A console with nothing in the slot. It refuses to boot until a
    /// cartridge is inserted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: SystemBus::new(),
            total_cycles: 0,
        }
    }

    /// Parse an iNES image and insert it, then reset.
    pub fn insert_cartridge(&mut self, data: &[u8]) -> Result<(), ConsoleError> {
        let cartridge = Cartridge::from_bytes(data)?;
        log::debug!("inserted mapper {} cartridge", cartridge.mapper_id());
        self.bus.cartridge = Some(cartridge);
        self.reset();
        Ok(())
    }

    /// Read an iNES file from disk and insert it.
    pub fn insert_cartridge_file(&mut self, path: &std::path::Path) -> Result<(), ConsoleError> {
        let data = std::fs::read(path)?;
        self.insert_cartridge(&data)
    }

    /// Eject the cartridge.
    pub fn remove_cartridge(&mut self) {
        self.bus.cartridge = None;
    }

    /// Whether a cartridge is inserted.
    #[must_use]
    pub fn cartridge_present(&self) -> bool {
        self.bus.cartridge.is_some()
    }

    /// Console reset: PPU clears its nametables, the APU restarts, the
    /// CPU re-vectors. The cartridge (and its PRG-RAM) survives.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.total_cycles = 0;
    }

    /// One console tick: three PPU dots (each may raise the NMI line),
    /// one CPU cycle (or a stalled cycle owed to DMA), one APU cycle,
    /// then the IRQ line follows the APU. Returns true when the PPU
    /// finished a frame during this tick.
    pub fn clock(&mut self) -> bool {
        let mut frame_done = false;

        for _ in 0..timing::PPU_DOTS_PER_CPU_CYCLE {
            if self.bus.tick_ppu() {
                frame_done = true;
            }
            if self.bus.ppu.take_nmi() {
                self.cpu.nmi();
            }
        }

        if self.bus.apu.stall_pending() {
            self.bus.apu.consume_stall_cycle();
            self.cpu.halt_cycle(&mut self.bus);
        } else {
            self.cpu.clock(&mut self.bus);
        }

        self.bus.apu.clock();
        self.bus.service_dmc();
        self.cpu.set_irq(self.bus.apu.irq_pending());

        self.total_cycles += 1;
        frame_done
    }

    /// Clock until the next frame completes.
    pub fn step_frame(&mut self) {
        // Bounded in case rendering never completes a frame.
        for _ in 0..(timing::CPU_CYCLES_PER_FRAME * 4) {
            if self.clock() {
                return;
            }
        }
    }

    /// The 256x240 RGBA framebuffer.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu.framebuffer()
    }

    /// Drain up to `max` (capped at 4096) queued audio samples into
    /// `dst`; returns the number written.
    pub fn drain_audio(&mut self, dst: &mut [f32], max: usize) -> usize {
        let limit = max.min(4096).min(dst.len());
        self.bus.apu.drain_samples(&mut dst[..limit])
    }

    /// Push a controller state byte for a player (0 or 1).
    pub fn set_controller(&mut self, player: usize, buttons: u8) {
        self.bus.set_controller(player, buttons);
    }

    /// Total console ticks since reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// The CPU, for inspection.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The bus, for inspection.
    #[must_use]
    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// Mutable bus access (tests, front-end glue).
    pub fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }

    /// Side-effect-free memory view.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_image(program: &[u8]) -> Vec<u8> {
        let mut prg = vec![0xEA; 32 * 1024];
        prg[..program.len()].copy_from_slice(program);
        // Reset vector -> $8000.
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;

        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 0, 0x00, 0x00];
        image.extend_from_slice(&[0; 8]);
        image.extend_from_slice(&prg);
        image
    }

    #[test]
    fn boots_from_reset_vector() {
        let mut console = Console::new();
        console.insert_cartridge(&nrom_image(&[0xEA])).unwrap();
        assert_eq!(console.cpu().pc, 0x8000);
        assert_eq!(
            console.peek_memory(0xFFFC) as u16 | (console.peek_memory(0xFFFD) as u16) << 8,
            0x8000
        );
    }

    #[test]
    fn clock_advances_all_units() {
        let mut console = Console::new();
        console.insert_cartridge(&nrom_image(&[0xEA])).unwrap();
        for _ in 0..100 {
            console.clock();
        }
        assert_eq!(console.total_cycles(), 100);
        assert_eq!(console.bus().apu.cycles(), 100);
        assert_eq!(console.cpu().cycles(), 100);
    }

    #[test]
    fn step_frame_produces_a_frame() {
        let mut console = Console::new();
        console.insert_cartridge(&nrom_image(&[0xEA])).unwrap();
        console.step_frame();
        assert!(console.total_cycles() >= u64::from(timing::CPU_CYCLES_PER_FRAME) - 2);
        assert_eq!(console.framebuffer().len(), 256 * 240 * 4);
    }

    #[test]
    fn remove_cartridge_clears_slot() {
        let mut console = Console::new();
        console.insert_cartridge(&nrom_image(&[0xEA])).unwrap();
        assert!(console.cartridge_present());
        console.remove_cartridge();
        assert!(!console.cartridge_present());
    }

    #[test]
    fn bad_image_is_rejected() {
        let mut console = Console::new();
        let result = console.insert_cartridge(&[0x00, 0x01, 0x02]);
        assert!(result.is_err());
        assert!(!console.cartridge_present());
    }

    #[test]
    fn prg_ram_survives_reset() {
        let mut console = Console::new();
        console.insert_cartridge(&nrom_image(&[0xEA])).unwrap();
        console.bus_mut().write(0x6000, 0x42);
        console.reset();
        assert_eq!(console.peek_memory(0x6000), 0x42);
    }
}
