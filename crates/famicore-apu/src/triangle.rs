//! Triangle channel.

use crate::length_counter::LengthCounter;
use crate::timer::Timer;

/// 32-step ramp, 15 down to 0 and back up.
#[rustfmt::skip]
const SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// The triangle channel. Its timer runs at CPU rate, twice the pulse
/// channels' rate, and it has a linear counter gating the sequencer in
/// addition to the length counter.
#[derive(Debug, Clone)]
pub struct Triangle {
    timer: Timer,
    length: LengthCounter,
    step: u8,
    linear_counter: u8,
    linear_reload_value: u8,
    linear_reload_flag: bool,
    /// Control bit: halts length and keeps the reload flag set.
    control: bool,
}

impl Triangle {
    /// Silent channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: Timer::new(),
            length: LengthCounter::new(),
            step: 0,
            linear_counter: 0,
            linear_reload_value: 0,
            linear_reload_flag: false,
            control: false,
        }
    }

    /// $4008: control flag and linear counter reload value.
    pub fn write_linear(&mut self, value: u8) {
        self.control = value & 0x80 != 0;
        self.linear_reload_value = value & 0x7F;
        self.length.set_halt(self.control);
    }

    /// $400A: timer low.
    pub fn write_timer_lo(&mut self, value: u8) {
        self.timer.set_period_lo(value);
    }

    /// $400B: timer high, length load, linear reload flag.
    pub fn write_timer_hi(&mut self, value: u8) {
        self.timer.set_period_hi(value);
        self.length.load(value >> 3);
        self.linear_reload_flag = true;
    }

    /// $4015 enable bit.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.length.set_enabled(enabled);
    }

    /// Length counter still running.
    #[must_use]
    pub fn active(&self) -> bool {
        self.length.active()
    }

    /// CPU-cycle tick; the sequencer only advances while both counters
    /// run and the period is high enough to stay in the audible band.
    pub fn clock_timer(&mut self) {
        let gated =
            self.linear_counter > 0 && self.length.active() && self.timer.period() >= 2;
        if self.timer.clock() && gated {
            self.step = (self.step + 1) & 0x1F;
        }
    }

    /// Quarter-frame tick: linear counter.
    pub fn clock_linear(&mut self) {
        if self.linear_reload_flag {
            self.linear_counter = self.linear_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.linear_reload_flag = false;
        }
    }

    /// Half-frame tick: length counter.
    pub fn clock_length(&mut self) {
        self.length.clock();
    }

    /// Current output level (0-15). Periods below 2 are silenced
    /// instead of producing ultrasonic buzz.
    #[must_use]
    pub fn output(&self) -> u8 {
        if self.timer.period() < 2 {
            return 0;
        }
        SEQUENCE[self.step as usize]
    }

    /// Length counter value.
    #[must_use]
    pub fn length_value(&self) -> u8 {
        self.length.value()
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_triangle() -> Triangle {
        let mut tri = Triangle::new();
        tri.set_enabled(true);
        tri.write_linear(0x7F);
        tri.write_timer_lo(0x40);
        tri.write_timer_hi(0x00);
        tri.clock_linear(); // load the linear counter
        tri
    }

    #[test]
    fn sequence_ramps_down_then_up() {
        assert_eq!(SEQUENCE[0], 15);
        assert_eq!(SEQUENCE[15], 0);
        assert_eq!(SEQUENCE[16], 0);
        assert_eq!(SEQUENCE[31], 15);
    }

    #[test]
    fn sequencer_gated_by_linear_counter() {
        let mut tri = running_triangle();
        tri.write_timer_lo(0x02);
        tri.write_timer_hi(0x00);
        let start = tri.step;
        for _ in 0..3 {
            tri.clock_timer();
        }
        assert_ne!(tri.step, start);

        // Drain the linear counter; the sequencer freezes.
        let mut frozen = Triangle::new();
        frozen.set_enabled(true);
        frozen.write_timer_lo(0x02);
        frozen.write_timer_hi(0x00);
        frozen.write_linear(0x00);
        frozen.clock_linear();
        let start = frozen.step;
        for _ in 0..6 {
            frozen.clock_timer();
        }
        assert_eq!(frozen.step, start);
    }

    #[test]
    fn ultrasonic_period_silenced() {
        let mut tri = running_triangle();
        tri.write_timer_lo(0x01);
        tri.write_timer_hi(0x00);
        assert_eq!(tri.output(), 0);
    }

    #[test]
    fn reload_flag_cleared_without_control() {
        let mut tri = running_triangle();
        tri.write_linear(0x05); // control clear
        tri.write_timer_hi(0x00); // sets reload flag
        tri.clock_linear();
        assert_eq!(tri.linear_counter, 5);
        tri.clock_linear(); // reload flag now clear: counts down
        assert_eq!(tri.linear_counter, 4);
    }

    #[test]
    fn control_keeps_reloading() {
        let mut tri = running_triangle();
        tri.write_linear(0x85);
        tri.write_timer_hi(0x00);
        tri.clock_linear();
        tri.clock_linear();
        assert_eq!(tri.linear_counter, 5);
    }
}
