//! PPU control, mask and status registers.

use bitflags::bitflags;

bitflags! {
    /// $2000 PPUCTRL (write-only).
    ///
    /// ```text
    /// 7  bit  0
    /// VPHB SINN
    /// |||| ||++- Base nametable select
    /// |||| |+--- VRAM increment (0: +1, 1: +32)
    /// |||| +---- Sprite pattern table (8x8 sprites only)
    /// |||+------ Background pattern table
    /// ||+------- Sprite size (0: 8x8, 1: 8x16)
    /// |+-------- Master/slave (unused)
    /// +--------- NMI at vblank start
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        /// Nametable select, low bit.
        const NAMETABLE_X = 1 << 0;
        /// Nametable select, high bit.
        const NAMETABLE_Y = 1 << 1;
        /// $2007 access increments v by 32 instead of 1.
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table at $1000 (ignored for 8x16 sprites).
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table at $1000.
        const BG_TABLE = 1 << 4;
        /// 8x16 sprites.
        const SPRITE_SIZE = 1 << 5;
        /// Master/slave select; unused by the console.
        const MASTER_SLAVE = 1 << 6;
        /// Latch an NMI when the vblank flag sets.
        const NMI_ENABLE = 1 << 7;
    }
}

impl PpuCtrl {
    /// $2007 address increment.
    #[inline]
    #[must_use]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) { 32 } else { 1 }
    }

    /// Background pattern table base.
    #[inline]
    #[must_use]
    pub fn bg_table_addr(self) -> u16 {
        if self.contains(Self::BG_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Sprite pattern table base for 8x8 sprites.
    #[inline]
    #[must_use]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Sprite height in pixels.
    #[inline]
    #[must_use]
    pub fn sprite_height(self) -> u16 {
        if self.contains(Self::SPRITE_SIZE) { 16 } else { 8 }
    }

    /// Whether vblank raises an NMI.
    #[inline]
    #[must_use]
    pub fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// $2001 PPUMASK (write-only).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuMask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels.
        const BG_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels.
        const SPRITES_LEFT = 1 << 2;
        /// Background enable.
        const SHOW_BG = 1 << 3;
        /// Sprite enable.
        const SHOW_SPRITES = 1 << 4;
        /// Emphasize red.
        const EMPHASIZE_RED = 1 << 5;
        /// Emphasize green.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl PpuMask {
    /// Either layer enabled.
    #[inline]
    #[must_use]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BG | Self::SHOW_SPRITES)
    }

    /// Background visible at column `x`.
    #[inline]
    #[must_use]
    pub fn bg_visible_at(self, x: u16) -> bool {
        self.contains(Self::SHOW_BG) && (x >= 8 || self.contains(Self::BG_LEFT))
    }

    /// Sprites visible at column `x`.
    #[inline]
    #[must_use]
    pub fn sprites_visible_at(self, x: u16) -> bool {
        self.contains(Self::SHOW_SPRITES) && (x >= 8 || self.contains(Self::SPRITES_LEFT))
    }
}

bitflags! {
    /// $2002 PPUSTATUS (read-only). Bits 4-0 float on the open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        /// Sprite overflow (set by the buggy evaluation walk).
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 hit.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Vertical blank.
        const VBLANK = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_helpers() {
        let ctrl = PpuCtrl::from_bits_truncate(0x04 | 0x10 | 0x20);
        assert_eq!(ctrl.vram_increment(), 32);
        assert_eq!(ctrl.bg_table_addr(), 0x1000);
        assert_eq!(ctrl.sprite_height(), 16);
        assert!(!ctrl.nmi_enabled());
    }

    #[test]
    fn mask_left_column_rules() {
        let mask = PpuMask::SHOW_BG;
        assert!(!mask.bg_visible_at(3));
        assert!(mask.bg_visible_at(8));

        let mask = PpuMask::SHOW_BG | PpuMask::BG_LEFT;
        assert!(mask.bg_visible_at(3));
    }
}
