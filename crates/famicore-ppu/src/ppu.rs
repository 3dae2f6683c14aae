//! The picture processing unit.
//!
//! Clocked at three times CPU frequency through [`Ppu::tick`], one dot
//! per call. A frame is 262 scanlines of 341 dots; scanline 261 is the
//! pre-render line. Rendering is per-pixel from the scroll registers
//! latched at dot 1 of each scanline rather than through the hardware's
//! shift-register pipeline, which produces the same frames for
//! everything short of mid-scanline raster tricks.

use famicore_mappers::Mirroring;

use crate::oam::{ActiveSprites, Oam};
use crate::palette::SYSTEM_PALETTE;
use crate::registers::{PpuCtrl, PpuMask, PpuStatus};
use crate::scroll::Scroll;
use crate::sprites::sprite_pixel;
use crate::vram::Vram;

/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 240;
/// Framebuffer size in bytes (RGBA).
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;

/// Open-bus decay interval in PPU cycles, roughly a second.
const OPEN_BUS_DECAY_TICKS: u32 = 5_300_000;

/// CHR and mirroring access the PPU reaches through the cartridge.
pub trait PpuBus {
    /// Pattern-table read ($0000-$1FFF).
    fn chr_read(&mut self, addr: u16) -> u8;
    /// Pattern-table write (CHR-RAM cartridges).
    fn chr_write(&mut self, addr: u16, value: u8);
    /// The cartridge's current nametable mirroring.
    fn mirroring(&self) -> Mirroring;
}

/// The PPU.
pub struct Ppu {
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    scroll: Scroll,
    vram: Vram,
    oam: Oam,

    /// Sprites selected for the scanline being drawn.
    active_sprites: ActiveSprites,

    /// 256x240 RGBA output.
    frame: Vec<u8>,
    /// Background opacity per pixel, feeding sprite-0 hit.
    bg_opaque: Vec<bool>,

    /// One-entry read buffer behind $2007.
    read_buffer: u8,
    /// I/O latch for undriven register bits.
    open_bus: u8,
    decay_counter: u32,
    decay_period: u32,

    scanline: u16,
    dot: u16,
    frame_count: u64,
    cycles: u64,

    nmi_latch: bool,
    /// Writes to $2000/$2001/$2005/$2006 are dropped until the first
    /// pre-render line after power/reset.
    reset_protect: bool,
}

impl Ppu {
    /// Power-on state.
    #[must_use]
    pub fn new() -> Self {
        let mut frame = vec![0; FRAME_BYTES];
        for alpha in frame.iter_mut().skip(3).step_by(4) {
            *alpha = 0xFF;
        }
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            scroll: Scroll::new(),
            vram: Vram::new(),
            oam: Oam::new(),
            active_sprites: ActiveSprites::default(),
            frame,
            bg_opaque: vec![false; FRAME_WIDTH * FRAME_HEIGHT],
            read_buffer: 0,
            open_bus: 0,
            decay_counter: 0,
            decay_period: OPEN_BUS_DECAY_TICKS,
            scanline: 0,
            dot: 0,
            frame_count: 0,
            cycles: 0,
            nmi_latch: false,
            reset_protect: true,
        }
    }

    /// Reset: registers and nametable RAM clear; OAM and palette keep
    /// their contents. The register write protection re-arms.
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.scroll = Scroll::new();
        self.vram.clear();
        self.read_buffer = 0;
        self.scanline = 0;
        self.dot = 0;
        self.nmi_latch = false;
        self.reset_protect = true;
    }

    /// Override the open-bus decay interval (PPU cycles).
    pub fn set_open_bus_decay(&mut self, ticks: u32) {
        self.decay_period = ticks;
    }

    /// Consume a latched NMI.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_latch)
    }

    /// Current scanline (0-261).
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot (0-340).
    #[must_use]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames completed.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The RGBA framebuffer.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.frame
    }

    /// Raw status bits (tests/debug).
    #[must_use]
    pub fn status_bits(&self) -> u8 {
        self.status.bits()
    }

    /// Advance one dot. Returns true when a frame just completed.
    pub fn tick(&mut self, bus: &mut impl PpuBus) -> bool {
        self.cycles += 1;

        if self.decay_counter > 0 {
            self.decay_counter -= 1;
            if self.decay_counter == 0 {
                self.open_bus = 0;
            }
        }

        let mut frame_done = false;
        self.dot += 1;
        if self.dot > 340 {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > 261 {
                self.scanline = 0;
                self.frame_count += 1;
                frame_done = true;
            }
        }

        match (self.scanline, self.dot) {
            (241, 1) => {
                self.status.insert(PpuStatus::VBLANK);
                if self.ctrl.nmi_enabled() {
                    self.nmi_latch = true;
                }
            }
            (261, 1) => {
                self.status.remove(
                    PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
                );
                self.reset_protect = false;
            }
            (0..=239, 1) => {
                self.scroll.latch_scanline();
                if self.mask.rendering_enabled() {
                    let (active, overflow) = self
                        .oam
                        .evaluate_scanline(self.scanline, self.ctrl.sprite_height());
                    self.active_sprites = active;
                    if overflow {
                        self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                    }
                } else {
                    self.active_sprites = ActiveSprites::default();
                }
            }
            _ => {}
        }

        if self.scanline < 240 && (1..=256).contains(&self.dot) {
            self.render_pixel(self.dot - 1, self.scanline, bus);
        }

        frame_done
    }

    // =====================================================================
    // Pixel pipeline
    // =====================================================================

    /// Background color/palette at (x, y) from the latched scroll.
    fn background_pixel(&self, x: u16, y: u16, bus: &mut impl PpuBus) -> (u8, u8) {
        let px = (self.scroll.origin_x() + x) % 512;
        let py = (self.scroll.origin_y() + y) % 480;

        let page = u16::from(py >= 240) * 2 + u16::from(px >= 256);
        let tile_x = (px % 256) / 8;
        let tile_y = (py % 240) / 8;
        let fine_x = px % 8;
        let fine_y = py % 8;

        let mirroring = bus.mirroring();
        let nt_addr = 0x2000 + page * 0x400 + tile_y * 32 + tile_x;
        let tile = self.vram.nametable_read(nt_addr, mirroring);

        let attr_addr = 0x2000 + page * 0x400 + 0x3C0 + (tile_y / 4) * 8 + tile_x / 4;
        let attr = self.vram.nametable_read(attr_addr, mirroring);
        let quadrant = ((tile_y % 4) / 2) * 4 + ((tile_x % 4) / 2) * 2;
        let palette = (attr >> quadrant) & 0x03;

        let base = self.ctrl.bg_table_addr() + u16::from(tile) * 16 + fine_y;
        let low = bus.chr_read(base);
        let high = bus.chr_read(base + 8);
        let bit = 7 - fine_x;
        let color = ((high >> bit) & 1) << 1 | ((low >> bit) & 1);

        (color, palette)
    }

    fn render_pixel(&mut self, x: u16, y: u16, bus: &mut impl PpuBus) {
        let mut bg_color = 0u8;
        let mut bg_palette = 0u8;
        let bg_visible = self.mask.bg_visible_at(x);
        if bg_visible {
            (bg_color, bg_palette) = self.background_pixel(x, y, bus);
        }
        let bg_opaque = bg_color != 0;
        self.bg_opaque[usize::from(y) * FRAME_WIDTH + usize::from(x)] = bg_opaque;

        let mut entry = if bg_opaque {
            self.vram
                .palette_read(0x3F00 + u16::from(bg_palette) * 4 + u16::from(bg_color))
        } else {
            self.vram.palette_read(0x3F00)
        };

        if self.mask.sprites_visible_at(x) {
            let sprite = sprite_pixel(
                &self.oam,
                &self.active_sprites,
                self.ctrl,
                x,
                y,
                |addr| bus.chr_read(addr),
            );
            if let Some(sprite) = sprite {
                if sprite.is_sprite_zero && bg_opaque && bg_visible && x < 255 {
                    self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
                }
                if !(sprite.behind_background && bg_opaque && bg_visible) {
                    entry = self.vram.palette_read(
                        0x3F10 + u16::from(sprite.palette) * 4 + u16::from(sprite.color),
                    );
                }
            }
        }

        if !self.mask.rendering_enabled() {
            entry = self.vram.palette_read(0x3F00);
        }

        let (r, g, b) = SYSTEM_PALETTE[usize::from(entry & 0x3F)];
        let offset = (usize::from(y) * FRAME_WIDTH + usize::from(x)) * 4;
        self.frame[offset] = r;
        self.frame[offset + 1] = g;
        self.frame[offset + 2] = b;
        self.frame[offset + 3] = 0xFF;
    }

    // =====================================================================
    // Register interface ($2000-$2007)
    // =====================================================================

    /// CPU read of a PPU register.
    pub fn read_register(&mut self, addr: u16, bus: &mut impl PpuBus) -> u8 {
        match addr & 0x07 {
            2 => {
                let result = (self.status.bits() & 0xE0) | (self.open_bus & 0x1F);

                // Reading on the exact dot vblank sets suppresses the NMI.
                if self.scanline == 241 && self.dot == 1 {
                    self.nmi_latch = false;
                }
                self.status.remove(PpuStatus::VBLANK);
                self.scroll.reset_latch();

                self.open_bus = result;
                result
            }
            4 => {
                let value = self.oam.read();
                self.open_bus = value;
                self.refresh_open_bus();
                value
            }
            7 => {
                let addr = self.scroll.vram_addr();
                let mirroring = bus.mirroring();

                let result = if addr >= 0x3F00 {
                    // Palette reads bypass the buffer; the two undriven
                    // bits come from the latch. The buffer still refills
                    // from the nametable underneath.
                    self.read_buffer = self.vram.nametable_read(addr - 0x1000, mirroring);
                    (self.vram.palette_read(addr) & 0x3F) | (self.open_bus & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = if addr < 0x2000 {
                        bus.chr_read(addr)
                    } else {
                        self.vram.nametable_read(addr, mirroring)
                    };
                    buffered
                };

                self.scroll.increment_vram(self.ctrl.vram_increment());
                self.open_bus = result;
                self.refresh_open_bus();
                result
            }
            // Write-only registers float on the latch.
            _ => self.open_bus,
        }
    }

    /// CPU write of a PPU register.
    pub fn write_register(&mut self, addr: u16, value: u8, bus: &mut impl PpuBus) {
        self.open_bus = value;
        self.refresh_open_bus();

        let register = addr & 0x07;
        if self.reset_protect && matches!(register, 0 | 1 | 5 | 6) {
            return;
        }

        match register {
            0 => {
                let was_enabled = self.ctrl.nmi_enabled();
                self.ctrl = PpuCtrl::from_bits_truncate(value);
                self.scroll.write_ctrl(value);
                // Enabling NMI mid-vblank latches one immediately.
                if !was_enabled
                    && self.ctrl.nmi_enabled()
                    && self.status.contains(PpuStatus::VBLANK)
                {
                    self.nmi_latch = true;
                }
            }
            1 => self.mask = PpuMask::from_bits_truncate(value),
            2 => {}
            3 => self.oam.set_addr(value),
            4 => self.oam.write(value),
            5 => self.scroll.write_scroll(value),
            6 => self.scroll.write_addr(value),
            7 => {
                let addr = self.scroll.vram_addr();
                if addr >= 0x3F00 {
                    self.vram.palette_write(addr, value);
                } else if addr >= 0x2000 {
                    self.vram.nametable_write(addr, value, bus.mirroring());
                } else {
                    bus.chr_write(addr, value);
                }
                self.scroll.increment_vram(self.ctrl.vram_increment());
            }
            _ => unreachable!(),
        }
    }

    /// One byte of the $4014 OAM DMA stream.
    pub fn oam_dma_write(&mut self, value: u8) {
        self.oam.dma_write(value);
    }

    fn refresh_open_bus(&mut self) {
        self.decay_counter = self.decay_period;
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
