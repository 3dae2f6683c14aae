//! Mapper 0: NROM.
//!
//! No banking at all. 16 KiB PRG-ROM images are mirrored across the
//! whole $8000-$FFFF window; 32 KiB images map straight through.

use crate::mapper::{Mapper, Mirroring, PrgTarget};
use crate::rom::RomHeader;

/// NROM (mapper 0).
#[derive(Debug, Clone)]
pub struct Nrom {
    prg_mask: usize,
    mirroring: Mirroring,
}

impl Nrom {
    /// Build from a parsed header.
    #[must_use]
    pub fn new(header: &RomHeader) -> Self {
        Self {
            // One bank mirrors 16 KiB across the window.
            prg_mask: if header.prg_banks() > 1 { 0x7FFF } else { 0x3FFF },
            mirroring: header.mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn id(&self) -> u8 {
        0
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn map_cpu_read(&self, addr: u16) -> Option<PrgTarget> {
        match addr {
            0x6000..=0x7FFF => Some(PrgTarget::Ram((addr & 0x1FFF) as usize)),
            0x8000..=0xFFFF => Some(PrgTarget::Rom(addr as usize & self.prg_mask)),
            _ => None,
        }
    }

    fn map_cpu_write(&mut self, addr: u16, _value: u8) -> Option<PrgTarget> {
        match addr {
            0x6000..=0x7FFF => Some(PrgTarget::Ram((addr & 0x1FFF) as usize)),
            0x8000..=0xFFFF => Some(PrgTarget::Open),
            _ => None,
        }
    }

    fn map_ppu(&self, addr: u16) -> usize {
        (addr & 0x1FFF) as usize
    }
}
