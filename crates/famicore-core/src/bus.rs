//! System bus: RAM, register routing, controllers, DMA and open bus.

use famicore_apu::Apu;
use famicore_cpu::Bus;
use famicore_mappers::{Cartridge, Mirroring};
use famicore_ppu::{Ppu, PpuBus};

use crate::controller::Controller;

/// CHR/mirroring view over the optional cartridge, handed to the PPU.
struct CartridgeView<'a> {
    cartridge: Option<&'a mut Cartridge>,
}

impl PpuBus for CartridgeView<'_> {
    fn chr_read(&mut self, addr: u16) -> u8 {
        self.cartridge.as_ref().map_or(0, |c| c.ppu_read(addr))
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(cartridge) = self.cartridge.as_mut() {
            cartridge.ppu_write(addr, value);
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_ref()
            .map_or(Mirroring::Horizontal, |c| c.mirroring())
    }
}

/// The CPU-visible system bus.
///
/// Owns the 2 KiB of work RAM, both controller shift registers, the PPU
/// and APU, the optional cartridge, and the CPU-side open-bus latch.
pub struct SystemBus {
    ram: [u8; 0x0800],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio processing unit.
    pub apu: Apu,
    /// Inserted cartridge, if any.
    pub cartridge: Option<Cartridge>,
    controllers: [Controller; 2],
    open_bus: u8,
}

impl SystemBus {
    /// Empty bus, no cartridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cartridge: None,
            controllers: [Controller::new(); 2],
            open_bus: 0,
        }
    }

    /// Console reset: PPU/APU re-initialize, the cartridge's mapper
    /// resets, work RAM and PRG-RAM survive.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        if let Some(cartridge) = self.cartridge.as_mut() {
            cartridge.reset();
        }
        self.controllers = [Controller::new(); 2];
        self.open_bus = 0;
    }

    /// Push front-end button state for a player; others are ignored.
    pub fn set_controller(&mut self, player: usize, buttons: u8) {
        if let Some(pad) = self.controllers.get_mut(player) {
            pad.set_buttons(buttons);
        }
    }

    /// Clock the PPU one dot; returns frame completion.
    pub fn tick_ppu(&mut self) -> bool {
        let mut view = CartridgeView {
            cartridge: self.cartridge.as_mut(),
        };
        self.ppu.tick(&mut view)
    }

    /// Service a pending DMC byte fetch: cartridge first, then work
    /// RAM. The APU charges the stall cycles.
    pub fn service_dmc(&mut self) {
        if self.apu.dmc_needs_sample() {
            let addr = self.apu.dmc_sample_address();
            let value = self.dma_read(addr);
            self.apu.dmc_fill_sample(value);
        }
    }

    /// Plain read used by the DMA engines; no open-bus side effects.
    fn dma_read(&self, addr: u16) -> u8 {
        if let Some(value) = self.cartridge.as_ref().and_then(|c| c.cpu_read(addr)) {
            value
        } else if addr < 0x2000 {
            self.ram[(addr & 0x07FF) as usize]
        } else {
            0
        }
    }

    /// $4014 write: stream 256 bytes from the page into OAM and charge
    /// the CPU 513 or 514 stall cycles by cycle parity at DMA start.
    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        for offset in 0..256 {
            let value = self.read(base + offset);
            self.ppu.oam_dma_write(value);
        }
        let cycles = if self.apu.cycles() & 1 == 1 { 514 } else { 513 };
        self.apu.add_stall_cycles(cycles);
    }

    fn read_controller(&mut self, player: usize) -> u8 {
        let bit = self.controllers[player].read_bit();
        (self.open_bus & 0xFE) | bit
    }

    /// Last value seen on the data bus.
    #[must_use]
    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = if addr == 0x4015 {
            // Bit 5 is undriven and floats on the open bus.
            self.apu.read_status() | (self.open_bus & 0x20)
        } else if let Some(value) = self.cartridge.as_ref().and_then(|c| c.cpu_read(addr)) {
            value
        } else if addr == 0x4016 {
            self.read_controller(0)
        } else if addr == 0x4017 {
            self.read_controller(1)
        } else {
            match addr {
                0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
                0x2000..=0x3FFF => {
                    let mut view = CartridgeView {
                        cartridge: self.cartridge.as_mut(),
                    };
                    self.ppu.read_register(addr & 0x0007, &mut view)
                }
                0x4020..=0xFFFF => 0,
                _ => self.open_bus,
            }
        };

        self.open_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;

        if matches!(addr, 0x4000..=0x4013 | 0x4015 | 0x4017) {
            self.apu.write(addr, value);
        }

        let claimed = self
            .cartridge
            .as_mut()
            .is_some_and(|c| c.cpu_write(addr, value));

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let mut view = CartridgeView {
                    cartridge: self.cartridge.as_mut(),
                };
                self.ppu.write_register(addr & 0x0007, value, &mut view);
            }
            0x4014 => self.oam_dma(value),
            0x4016 => {
                for pad in &mut self.controllers {
                    pad.write_strobe(value);
                }
            }
            _ => {
                if !claimed && addr >= 0x4020 {
                    log::trace!("write to unmapped ${addr:04X}");
                }
            }
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF | 0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self
                .cartridge
                .as_ref()
                .and_then(|c| c.cpu_read(addr))
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rom_image() -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 0, 0x00, 0x00];
        image.extend_from_slice(&[0; 8]);
        image.extend(std::iter::repeat(0xEA).take(32 * 1024));
        image
    }

    fn bus_with_cartridge() -> SystemBus {
        let mut bus = SystemBus::new();
        bus.cartridge = Some(Cartridge::from_bytes(&test_rom_image()).unwrap());
        bus
    }

    #[test]
    fn ram_mirrors_across_8k() {
        let mut bus = SystemBus::new();
        bus.write(0x0000, 0x42);
        assert_eq!(bus.read(0x0800), 0x42);
        assert_eq!(bus.read(0x1000), 0x42);
        assert_eq!(bus.read(0x1800), 0x42);

        bus.write(0x1FFF, 0x55);
        assert_eq!(bus.read(0x07FF), 0x55);
    }

    #[test]
    fn unmapped_reads_return_zero_without_cartridge() {
        let mut bus = SystemBus::new();
        assert_eq!(bus.read(0x8000), 0);
        assert_eq!(bus.read(0x5000), 0);
    }

    #[test]
    fn cartridge_claims_prg_space() {
        let mut bus = bus_with_cartridge();
        assert_eq!(bus.read(0x8000), 0xEA);
    }

    #[test]
    fn open_bus_returned_for_write_only_registers() {
        let mut bus = SystemBus::new();
        bus.write(0x0000, 0xAB);
        let _ = bus.read(0x0000); // latch 0xAB
        assert_eq!(bus.read(0x4009), 0xAB);
    }

    #[test]
    fn controller_round_trip_all_bytes() {
        for buttons in 0..=255u8 {
            let mut bus = SystemBus::new();
            bus.set_controller(0, buttons);
            bus.write(0x4016, 1);
            bus.write(0x4016, 0);

            let mut out = 0u8;
            for bit in 0..8 {
                out |= (bus.read(0x4016) & 1) << bit;
            }
            assert_eq!(out, buttons);
            // Ninth read shifts in a 1.
            assert_eq!(bus.read(0x4016) & 1, 1);
        }
    }

    #[test]
    fn controller_read_splices_open_bus() {
        let mut bus = SystemBus::new();
        bus.write(0x0000, 0x5A);
        let _ = bus.read(0x0000);
        bus.set_controller(0, 0x00);
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        // Bit 0 from the pad, the rest from the latch (0x00 strobe write
        // updated the latch last).
        let value = bus.read(0x4016);
        assert_eq!(value & 0x01, 0);
    }

    #[test]
    fn invalid_player_ignored() {
        let mut bus = SystemBus::new();
        bus.set_controller(5, 0xFF);
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        assert_eq!(bus.read(0x4017) & 1, 0);
    }

    #[test]
    fn oam_dma_copies_a_page_and_charges_stall() {
        let mut bus = bus_with_cartridge();
        // Release the PPU's post-reset write protection.
        for _ in 0..(262 * 341) {
            bus.tick_ppu();
        }
        for i in 0..256u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus.write(0x2003, 0x00);
        bus.write(0x4014, 0x02);

        assert!(bus.apu.stall_pending());

        // Verify through $2004 reads.
        for i in 0..4u8 {
            bus.write(0x2003, i);
            let expected = if i % 4 == 2 { i & 0xE3 } else { i };
            assert_eq!(bus.read(0x2004), expected);
        }
    }

    #[test]
    fn apu_status_bit5_is_open_bus() {
        let mut bus = SystemBus::new();
        bus.write(0x0000, 0x20);
        let _ = bus.read(0x0000);
        let status = bus.read(0x4015);
        assert_eq!(status & 0x20, 0x20);
    }

    #[test]
    fn prg_ram_round_trip() {
        let mut bus = bus_with_cartridge();
        bus.write(0x6123, 0x77);
        assert_eq!(bus.read(0x6123), 0x77);
    }
}
