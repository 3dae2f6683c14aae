//! APU facade: register routing, clocking, mixing and the sample queue.

use std::collections::VecDeque;

use crate::dmc::Dmc;
use crate::frame_counter::{FrameCounter, FrameSignals};
use crate::noise::Noise;
use crate::pulse::Pulse;
use crate::sweep::PulseChannel;
use crate::triangle::Triangle;

/// CPU clock rate (NTSC), in Hz.
pub const CPU_FREQ: u32 = 1_789_773;

/// Output sample rate, in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Sample queue bound; beyond this the oldest samples are dropped.
const QUEUE_LIMIT: usize = (SAMPLE_RATE / 4) as usize;

/// The audio processing unit. Clocked once per CPU cycle.
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,

    cycles: u64,

    /// Fixed-point resampling accumulator.
    sample_accum: u32,
    samples: VecDeque<f32>,

    // One-pole filter state.
    highpass_prev_in: f32,
    highpass_prev_out: f32,
    lowpass_out: f32,

    /// CPU cycles owed to DMA (DMC fetches and OAM DMA).
    stall_cycles: u32,
}

impl Apu {
    /// Power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::One),
            pulse2: Pulse::new(PulseChannel::Two),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dmc: Dmc::new(),
            frame_counter: FrameCounter::new(),
            cycles: 0,
            sample_accum: 0,
            samples: VecDeque::with_capacity(QUEUE_LIMIT),
            highpass_prev_in: 0.0,
            highpass_prev_out: 0.0,
            lowpass_out: 0.0,
            stall_cycles: 0,
        }
    }

    /// Reset to power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Register write ($4000-$4013, $4015, $4017).
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 => self.pulse1.write_control(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_lo(value),
            0x4003 => self.pulse1.write_timer_hi(value),

            0x4004 => self.pulse2.write_control(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_lo(value),
            0x4007 => self.pulse2.write_timer_hi(value),

            0x4008 => self.triangle.write_linear(value),
            0x400A => self.triangle.write_timer_lo(value),
            0x400B => self.triangle.write_timer_hi(value),

            0x400C => self.noise.write_control(value),
            0x400E => self.noise.write_period(value),
            0x400F => self.noise.write_length(value),

            0x4010 => self.dmc.write_control(value),
            0x4011 => self.dmc.write_level(value),
            0x4012 => self.dmc.write_address(value),
            0x4013 => self.dmc.write_length(value),

            0x4015 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
                self.dmc.clear_irq();
            }

            0x4017 => {
                let signals = self.frame_counter.write(value);
                self.apply_signals(signals);
            }

            _ => {}
        }
    }

    /// $4015 read: channel-active and IRQ bits. Clears the frame IRQ.
    /// Bit 5 is left clear; the bus substitutes its open-bus latch.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// $4015 without the read side effect.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.active() {
            status |= 0x01;
        }
        if self.pulse2.active() {
            status |= 0x02;
        }
        if self.triangle.active() {
            status |= 0x04;
        }
        if self.noise.active() {
            status |= 0x08;
        }
        if self.dmc.active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        status
    }

    /// One CPU cycle: frame counter, channel timers, sample production.
    pub fn clock(&mut self) {
        let signals = self.frame_counter.clock();
        self.apply_signals(signals);

        // Triangle runs at CPU rate; the rest at APU rate.
        self.triangle.clock_timer();
        if self.cycles & 1 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }
        self.dmc.clock_timer();

        self.cycles = self.cycles.wrapping_add(1);

        self.sample_accum += SAMPLE_RATE;
        if self.sample_accum >= CPU_FREQ {
            self.sample_accum -= CPU_FREQ;
            let sample = self.filtered_output();
            if self.samples.len() >= QUEUE_LIMIT {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    fn apply_signals(&mut self, signals: FrameSignals) {
        if signals.quarter {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.triangle.clock_linear();
            self.noise.clock_envelope();
        }
        if signals.half {
            self.pulse1.clock_half_frame();
            self.pulse2.clock_half_frame();
            self.triangle.clock_length();
            self.noise.clock_length();
        }
    }

    // =====================================================================
    // Mixer
    // =====================================================================

    /// The non-linear mixer, computed from the reference formulas.
    #[must_use]
    pub fn mix(&self) -> f32 {
        let pulse_sum = f32::from(self.pulse1.output()) + f32::from(self.pulse2.output());
        let pulse_out = if pulse_sum > 0.0 {
            95.88 / (8128.0 / pulse_sum + 100.0)
        } else {
            0.0
        };

        let tnd_in = f32::from(self.triangle.output()) / 8227.0
            + f32::from(self.noise.output()) / 12241.0
            + f32::from(self.dmc.output()) / 22638.0;
        let tnd_out = if tnd_in > 0.0 {
            159.79 / (100.0 + 1.0 / tnd_in)
        } else {
            0.0
        };

        pulse_out + tnd_out
    }

    /// Mixer output through the high-pass and low-pass poles, clamped.
    fn filtered_output(&mut self) -> f32 {
        let x = self.mix();
        let highpass = 0.996 * (self.highpass_prev_out + x - self.highpass_prev_in);
        self.highpass_prev_in = x;
        self.highpass_prev_out = highpass;

        self.lowpass_out += 0.815 * (highpass - self.lowpass_out);
        self.lowpass_out.clamp(-1.0, 1.0)
    }

    // =====================================================================
    // Sample queue
    // =====================================================================

    /// Move up to `dst.len()` queued samples out; returns the count.
    pub fn drain_samples(&mut self, dst: &mut [f32]) -> usize {
        let count = dst.len().min(self.samples.len());
        for slot in dst.iter_mut().take(count) {
            *slot = self.samples.pop_front().unwrap_or(0.0);
        }
        count
    }

    /// Queued sample count.
    #[must_use]
    pub fn samples_available(&self) -> usize {
        self.samples.len()
    }

    // =====================================================================
    // DMC fetch handshake and CPU stalls
    // =====================================================================

    /// Whether the DMC wants a byte this cycle.
    #[must_use]
    pub fn dmc_needs_sample(&self) -> bool {
        self.dmc.needs_sample()
    }

    /// Address of the wanted DMC byte.
    #[must_use]
    pub fn dmc_sample_address(&self) -> u16 {
        self.dmc.sample_address()
    }

    /// Deliver a DMC byte; charges the CPU four stall cycles.
    pub fn dmc_fill_sample(&mut self, value: u8) {
        self.dmc.fill_sample(value);
        self.stall_cycles += 4;
    }

    /// Charge additional stall cycles (OAM DMA).
    pub fn add_stall_cycles(&mut self, cycles: u32) {
        self.stall_cycles += cycles;
    }

    /// Whether the CPU should be stalled this cycle.
    #[must_use]
    pub fn stall_pending(&self) -> bool {
        self.stall_cycles > 0
    }

    /// Consume one stall cycle.
    pub fn consume_stall_cycle(&mut self) {
        self.stall_cycles = self.stall_cycles.saturating_sub(1);
    }

    /// Either APU IRQ line pending.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    /// CPU cycles clocked.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_enabled_channels() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x0F);
        apu.write(0x4003, 0x08); // load pulse 1 length
        apu.write(0x4007, 0x08);
        apu.write(0x400B, 0x08);
        apu.write(0x400F, 0x08);

        let status = apu.read_status();
        assert_eq!(status & 0x0F, 0x0F);
    }

    #[test]
    fn disabling_channel_zeroes_length() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x08);
        assert_eq!(apu.read_status() & 0x01, 0x01);

        apu.write(0x4015, 0x00);
        assert_eq!(apu.read_status() & 0x01, 0x00);
    }

    #[test]
    fn frame_irq_sets_and_clears_via_status() {
        let mut apu = Apu::new();
        for _ in 0..14915 {
            apu.clock();
        }
        let status = apu.read_status();
        assert_eq!(status & 0x40, 0x40);
        // The read acknowledged the IRQ.
        assert!(!apu.irq_pending());
        let status = apu.read_status();
        assert_eq!(status & 0x40, 0x00);
    }

    #[test]
    fn inhibit_write_clears_pending_on_next_cycle() {
        let mut apu = Apu::new();
        for _ in 0..14915 {
            apu.clock();
        }
        assert!(apu.irq_pending());
        apu.write(0x4017, 0x40);
        assert!(apu.irq_pending());
        apu.clock();
        assert!(!apu.irq_pending());
    }

    #[test]
    fn sample_rate_close_to_target() {
        let mut apu = Apu::new();
        for _ in 0..CPU_FREQ {
            apu.clock();
        }
        let produced = apu.samples_available() as u32;
        // One simulated second, bounded by the drop-oldest queue.
        assert_eq!(produced, SAMPLE_RATE / 4);
    }

    #[test]
    fn queue_drops_oldest_beyond_limit() {
        let mut apu = Apu::new();
        for _ in 0..CPU_FREQ {
            apu.clock();
        }
        assert_eq!(apu.samples_available(), QUEUE_LIMIT);
        let mut out = vec![0.0f32; 100];
        assert_eq!(apu.drain_samples(&mut out), 100);
        assert_eq!(apu.samples_available(), QUEUE_LIMIT - 100);
    }

    #[test]
    fn mixer_is_silent_when_idle() {
        let apu = Apu::new();
        assert_eq!(apu.mix(), 0.0);
    }

    #[test]
    fn dmc_fetch_charges_four_stall_cycles() {
        let mut apu = Apu::new();
        apu.write(0x4013, 0x01);
        apu.write(0x4015, 0x10);
        assert!(apu.dmc_needs_sample());

        apu.dmc_fill_sample(0xAA);
        assert!(apu.stall_pending());
        for _ in 0..4 {
            assert!(apu.stall_pending());
            apu.consume_stall_cycle();
        }
        assert!(!apu.stall_pending());
    }

    #[test]
    fn filtered_samples_stay_in_range() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x0F);
        apu.write(0x4000, 0xBF); // pulse 1 at full constant volume
        apu.write(0x4002, 0xFD);
        apu.write(0x4003, 0x08);
        for _ in 0..200_000 {
            apu.clock();
        }
        let mut out = vec![0.0f32; 4096];
        let n = apu.drain_samples(&mut out);
        assert!(n > 0);
        for &s in &out[..n] {
            assert!((-1.0..=1.0).contains(&s));
        }
    }
}
