//! Console integration layer.
//!
//! Wires the CPU, PPU, APU and cartridge together behind a single
//! [`Console`]:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                   Console                     │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │                SystemBus                │  │
//! │  │  RAM · PPU · APU · Cartridge · Pads     │  │
//! │  └─────────────────────────────────────────┘  │
//! │                      ▲                        │
//! │                 ┌────┴────┐                   │
//! │                 │   CPU   │                   │
//! │                 └─────────┘                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! One [`Console::clock`] is three PPU dots, one CPU cycle (or a DMA
//! stall), and one APU cycle, in that order.
//!
//! ```no_run
//! use famicore_core::Console;
//!
//! let image = std::fs::read("game.nes").unwrap();
//! let mut console = Console::new();
//! console.insert_cartridge(&image).unwrap();
//!
//! let mut audio = vec![0.0f32; 4096];
//! loop {
//!     console.step_frame();
//!     let _frame = console.framebuffer();
//!     let _n = console.drain_audio(&mut audio, 4096);
//! }
//! ```

mod bus;
mod console;
mod controller;
mod frontend;

pub use bus::SystemBus;
pub use console::{timing, Console, ConsoleError};
pub use controller::{Button, Controller};
pub use frontend::{run_driver, Frontend, FrontendError, UiAction};

// The component crates, re-exported for embedders.
pub use famicore_apu::Apu;
pub use famicore_cpu::{Bus, Cpu};
pub use famicore_mappers::{Cartridge, Mapper, Mirroring, Rom, RomError};
pub use famicore_ppu::Ppu;

/// Screen geometry.
pub mod screen {
    /// Width in pixels.
    pub const WIDTH: u32 = 256;
    /// Height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Framebuffer bytes (RGBA).
    pub const FRAMEBUFFER_SIZE: usize = (WIDTH * HEIGHT * 4) as usize;
}
