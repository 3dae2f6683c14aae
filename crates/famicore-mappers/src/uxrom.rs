//! Mapper 2: UxROM.
//!
//! A 4-bit register selects the 16 KiB bank behind $8000-$BFFF; the
//! upper window is fixed to the last bank. CHR is unbanked.

use crate::mapper::{Mapper, Mirroring, PrgTarget};
use crate::rom::RomHeader;

/// UxROM (mapper 2).
#[derive(Debug, Clone)]
pub struct Uxrom {
    prg_banks: usize,
    bank: usize,
    mirroring: Mirroring,
}

impl Uxrom {
    /// Build from a parsed header.
    #[must_use]
    pub fn new(header: &RomHeader) -> Self {
        Self {
            prg_banks: header.prg_banks().max(1),
            bank: 0,
            mirroring: header.mirroring,
        }
    }
}

impl Mapper for Uxrom {
    fn id(&self) -> u8 {
        2
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.bank = 0;
    }

    fn map_cpu_read(&self, addr: u16) -> Option<PrgTarget> {
        match addr {
            0x6000..=0x7FFF => Some(PrgTarget::Ram((addr & 0x1FFF) as usize)),
            0x8000..=0xBFFF => {
                Some(PrgTarget::Rom(self.bank * 0x4000 + (addr & 0x3FFF) as usize))
            }
            0xC000..=0xFFFF => Some(PrgTarget::Rom(
                (self.prg_banks - 1) * 0x4000 + (addr & 0x3FFF) as usize,
            )),
            _ => None,
        }
    }

    fn map_cpu_write(&mut self, addr: u16, value: u8) -> Option<PrgTarget> {
        match addr {
            0x6000..=0x7FFF => Some(PrgTarget::Ram((addr & 0x1FFF) as usize)),
            0x8000..=0xFFFF => {
                self.bank = (value & 0x0F) as usize % self.prg_banks;
                Some(PrgTarget::Open)
            }
            _ => None,
        }
    }

    fn map_ppu(&self, addr: u16) -> usize {
        (addr & 0x1FFF) as usize
    }
}
