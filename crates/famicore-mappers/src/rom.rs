//! iNES ROM image parsing.
//!
//! Only the legacy iNES 1.0 format is accepted. NES 2.0 images are
//! recognised by the marker bits in flags 7 and rejected, since none of
//! the mappers in scope need the extended fields.

use crate::mapper::Mirroring;

/// Errors produced while parsing an iNES image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RomError {
    /// Image is shorter than the 16-byte header.
    #[error("ROM image too small: {0} bytes")]
    TooSmall(usize),

    /// Header does not start with `N E S 0x1A`.
    #[error("invalid iNES magic: {0:02X?}")]
    BadMagic([u8; 4]),

    /// NES 2.0 marker set in flags 7.
    #[error("NES 2.0 images are not supported")]
    Nes2Unsupported,

    /// Header declares zero PRG-ROM banks.
    #[error("ROM declares no PRG-ROM")]
    EmptyPrg,

    /// Image body is shorter than the header claims.
    #[error("invalid/truncated ROM: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// Header names a mapper this crate does not implement.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Parsed 16-byte iNES header.
///
/// ```text
/// Byte 0-3: "NES" 0x1A
/// Byte 4:   PRG-ROM banks (16 KiB units)
/// Byte 5:   CHR-ROM banks (8 KiB units, 0 => 8 KiB CHR-RAM)
/// Byte 6:   Flags 6 (mirroring, battery, trainer, four-screen, mapper low)
/// Byte 7:   Flags 7 (NES 2.0 marker, mapper high)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomHeader {
    /// PRG-ROM size in bytes.
    pub prg_rom_size: usize,

    /// CHR-ROM size in bytes (0 means 8 KiB of CHR-RAM).
    pub chr_rom_size: usize,

    /// Mapper id from the two header nibbles.
    pub mapper: u8,

    /// Nametable mirroring declared by flags 6.
    pub mirroring: Mirroring,

    /// Battery-backed PRG-RAM present (flags 6 bit 1).
    pub has_battery: bool,

    /// 512-byte trainer precedes PRG-ROM (flags 6 bit 2).
    pub has_trainer: bool,
}

impl RomHeader {
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parse the header from the start of an image.
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 {
            return Err(RomError::TooSmall(data.len()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(RomError::BadMagic(magic));
        }

        if data[7] & 0x0C == 0x08 {
            return Err(RomError::Nes2Unsupported);
        }

        let prg_banks = data[4] as usize;
        if prg_banks == 0 {
            return Err(RomError::EmptyPrg);
        }
        let chr_banks = data[5] as usize;

        let flags6 = data[6];
        let flags7 = data[7];

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Self {
            prg_rom_size: prg_banks * 16 * 1024,
            chr_rom_size: chr_banks * 8 * 1024,
            mapper: (flags7 & 0xF0) | (flags6 >> 4),
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
        })
    }

    /// PRG-ROM bank count in 16 KiB units.
    #[must_use]
    pub fn prg_banks(&self) -> usize {
        self.prg_rom_size / (16 * 1024)
    }

    /// CHR size in bytes after the CHR-RAM fallback is applied.
    #[must_use]
    pub fn chr_size(&self) -> usize {
        if self.chr_rom_size == 0 {
            8 * 1024
        } else {
            self.chr_rom_size
        }
    }
}

/// A parsed ROM image: header plus the PRG and CHR bodies.
///
/// Trainer bytes, when present, are validated and skipped.
#[derive(Debug, Clone)]
pub struct Rom {
    /// Header fields.
    pub header: RomHeader,

    /// PRG-ROM body.
    pub prg_rom: Vec<u8>,

    /// CHR-ROM body, empty when the cartridge uses CHR-RAM.
    pub chr_rom: Vec<u8>,
}

impl Rom {
    /// Parse a complete iNES image.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header = RomHeader::parse(data)?;

        let mut offset = 16;
        if header.has_trainer {
            offset += 512;
        }

        let expected = offset + header.prg_rom_size + header.chr_rom_size;
        if data.len() < expected {
            return Err(RomError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let prg_rom = data[offset..offset + header.prg_rom_size].to_vec();
        offset += header.prg_rom_size;
        let chr_rom = data[offset..offset + header.chr_rom_size].to_vec();

        Ok(Self {
            header,
            prg_rom,
            chr_rom,
        })
    }
}
