//! Audio processing unit.
//!
//! Five channels (two pulses, triangle, noise, DMC), the frame counter
//! that paces their envelope/length/sweep units, the non-linear mixer
//! with its high-pass/low-pass output filters, and a bounded PCM sample
//! queue at 44.1 kHz. The APU is clocked once per CPU cycle via
//! [`Apu::clock`]; DMC byte fetches are serviced by the system bus
//! through the needs-sample handshake and charge the CPU stall cycles.
//!
//! ```
//! use famicore_apu::Apu;
//!
//! let mut apu = Apu::new();
//! apu.write(0x4015, 0x01); // enable pulse 1
//! apu.write(0x4000, 0xBF); // 50% duty, constant volume 15
//! apu.write(0x4002, 0xFD);
//! apu.write(0x4003, 0x00);
//! for _ in 0..50_000 {
//!     apu.clock();
//! }
//! assert!(apu.samples_available() > 0);
//! ```

mod apu;
mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod sweep;
mod timer;
mod triangle;

pub use apu::{Apu, CPU_FREQ, SAMPLE_RATE};
pub use dmc::Dmc;
pub use envelope::Envelope;
pub use frame_counter::{FrameCounter, FrameSignals};
pub use length_counter::LengthCounter;
pub use noise::Noise;
pub use pulse::Pulse;
pub use sweep::{PulseChannel, Sweep};
pub use timer::Timer;
pub use triangle::Triangle;
