//! Picture processing unit.
//!
//! Produces a 256x240 RGBA framebuffer, decoded through the fixed
//! 64-entry system palette. The CPU-facing register file ($2000-$2007),
//! the open-bus latch with decay, the $2007 read buffer, OAM with the
//! buggy sprite-overflow evaluation, and NMI timing at (241, 1) are all
//! modeled; pattern tables and nametable mirroring come from the
//! cartridge through the [`PpuBus`] trait.

mod oam;
mod palette;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod vram;

pub use oam::{ActiveSprites, Oam};
pub use palette::SYSTEM_PALETTE;
pub use ppu::{Ppu, PpuBus, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::Scroll;
pub use sprites::SpritePixel;
pub use vram::Vram;
