//! Cartridge: storage owner routing accesses through the mapper.

use crate::mapper::{Mapper, Mirroring, PrgTarget};
use crate::rom::{Rom, RomError};
use crate::{Cnrom, Mmc1, Mmc3, Nrom, Uxrom};

/// A loaded cartridge.
///
/// Owns PRG-ROM, the fixed 8 KiB of PRG-RAM, and CHR (ROM or RAM per the
/// header), plus the mapper that translates every access. Created on
/// insertion, dropped on removal; PRG-RAM survives a console reset.
pub struct Cartridge {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    has_battery: bool,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Build a cartridge from a parsed ROM.
    pub fn new(rom: Rom) -> Result<Self, RomError> {
        let header = &rom.header;
        let mapper: Box<dyn Mapper> = match header.mapper {
            0 => Box::new(Nrom::new(header)),
            1 => Box::new(Mmc1::new(header)),
            2 => Box::new(Uxrom::new(header)),
            3 => Box::new(Cnrom::new(header)),
            4 => Box::new(Mmc3::new(header)),
            n => return Err(RomError::UnsupportedMapper(n)),
        };

        let chr_is_ram = rom.chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0; header.chr_size()]
        } else {
            rom.chr_rom
        };

        log::debug!(
            "cartridge: mapper {} prg {}K chr {}K{}",
            header.mapper,
            rom.prg_rom.len() / 1024,
            chr.len() / 1024,
            if chr_is_ram { " (ram)" } else { "" },
        );

        Ok(Self {
            prg_rom: rom.prg_rom,
            prg_ram: vec![0; 8 * 1024],
            chr,
            chr_is_ram,
            has_battery: header.has_battery,
            mapper,
        })
    }

    /// Parse an iNES image and build a cartridge from it.
    pub fn from_bytes(data: &[u8]) -> Result<Self, RomError> {
        Self::new(Rom::load(data)?)
    }

    /// CPU read. `None` means the cartridge does not decode this address.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        Some(match self.mapper.map_cpu_read(addr)? {
            PrgTarget::Rom(offset) => self.prg_rom.get(offset).copied().unwrap_or(0),
            PrgTarget::Ram(offset) => self.prg_ram[offset],
            PrgTarget::Open => 0,
        })
    }

    /// CPU write. Returns whether the cartridge claimed the address.
    pub fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        match self.mapper.map_cpu_write(addr, value) {
            Some(PrgTarget::Ram(offset)) => {
                self.prg_ram[offset] = value;
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// PPU pattern-table read ($0000-$1FFF).
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        let offset = self.mapper.map_ppu(addr);
        self.chr.get(offset).copied().unwrap_or(0)
    }

    /// PPU pattern-table write; ignored unless the cartridge has CHR-RAM.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let offset = self.mapper.map_ppu(addr);
            if let Some(byte) = self.chr.get_mut(offset) {
                *byte = value;
            }
        }
    }

    /// Current nametable mirroring.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    /// Reset the mapper's register state.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// iNES mapper id.
    #[must_use]
    pub fn mapper_id(&self) -> u8 {
        self.mapper.id()
    }

    /// Whether the header declared battery-backed PRG-RAM.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// PRG-RAM contents, for persisting battery saves.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.has_battery.then_some(self.prg_ram.as_slice())
    }

    /// Restore PRG-RAM contents from a battery save.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.prg_ram.len());
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::RomHeader;

    fn nrom_cartridge() -> Cartridge {
        let header = RomHeader {
            prg_rom_size: 32 * 1024,
            chr_rom_size: 0,
            mapper: 0,
            mirroring: Mirroring::Vertical,
            has_battery: true,
            has_trainer: false,
        };
        let mut prg_rom = vec![0xEA; 32 * 1024];
        prg_rom[0] = 0x42;
        Cartridge::new(Rom {
            header,
            prg_rom,
            chr_rom: Vec::new(),
        })
        .unwrap()
    }

    #[test]
    fn routes_prg_reads() {
        let cart = nrom_cartridge();
        assert_eq!(cart.cpu_read(0x8000), Some(0x42));
        assert_eq!(cart.cpu_read(0x8001), Some(0xEA));
        assert_eq!(cart.cpu_read(0x4020), None);
    }

    #[test]
    fn prg_ram_round_trip() {
        let mut cart = nrom_cartridge();
        assert!(cart.cpu_write(0x6123, 0x99));
        assert_eq!(cart.cpu_read(0x6123), Some(0x99));
    }

    #[test]
    fn chr_ram_is_writable() {
        let mut cart = nrom_cartridge();
        cart.ppu_write(0x1000, 0x7E);
        assert_eq!(cart.ppu_read(0x1000), 0x7E);
    }

    #[test]
    fn battery_ram_persists_through_accessors() {
        let mut cart = nrom_cartridge();
        cart.cpu_write(0x6000, 0xAB);
        let saved = cart.battery_ram().unwrap().to_vec();

        let mut other = nrom_cartridge();
        other.load_battery_ram(&saved);
        assert_eq!(other.cpu_read(0x6000), Some(0xAB));
    }

    #[test]
    fn unsupported_mapper_rejected() {
        let header = RomHeader {
            prg_rom_size: 16 * 1024,
            chr_rom_size: 0,
            mapper: 7,
            mirroring: Mirroring::Horizontal,
            has_battery: false,
            has_trainer: false,
        };
        let result = Cartridge::new(Rom {
            header,
            prg_rom: vec![0; 16 * 1024],
            chr_rom: Vec::new(),
        });
        assert!(matches!(result, Err(RomError::UnsupportedMapper(7))));
    }
}
