//! Frame counter: paces envelope, length and sweep updates.
//!
//! Counted in CPU cycles. Four-step mode wraps at 14915 and raises the
//! frame IRQ on its final tick unless inhibited; five-step mode wraps
//! at 18641 and never raises an IRQ.

/// Units to tick after a frame-counter clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSignals {
    /// Envelope / linear counter tick.
    pub quarter: bool,
    /// Length counter / sweep tick.
    pub half: bool,
}

impl FrameSignals {
    const QUARTER: Self = Self {
        quarter: true,
        half: false,
    };
    const QUARTER_HALF: Self = Self {
        quarter: true,
        half: true,
    };
}

/// The frame counter.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    cycle: u32,
    five_step: bool,
    irq_inhibit: bool,
    irq_pending: bool,
    /// Set by a $4017 write with the inhibit bit: the pending IRQ
    /// clears on the next cycle boundary rather than immediately.
    clear_irq_next: bool,
}

impl FrameCounter {
    const QUARTER_1: u32 = 3729;
    const HALF_1: u32 = 7457;
    const QUARTER_3: u32 = 11186;
    const FOUR_STEP_END: u32 = 14915;
    const FIVE_STEP_END: u32 = 18641;

    /// Four-step mode, no IRQ pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycle: 0,
            five_step: false,
            irq_inhibit: false,
            irq_pending: false,
            clear_irq_next: false,
        }
    }

    /// $4017 write. Resets the counter; entering five-step mode clocks
    /// quarter and half units immediately (returned to the caller).
    pub fn write(&mut self, value: u8) -> FrameSignals {
        self.five_step = value & 0x80 != 0;
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.clear_irq_next = true;
        }
        self.cycle = 0;

        if self.five_step {
            FrameSignals::QUARTER_HALF
        } else {
            FrameSignals::default()
        }
    }

    /// One CPU cycle.
    pub fn clock(&mut self) -> FrameSignals {
        if self.clear_irq_next {
            self.clear_irq_next = false;
            self.irq_pending = false;
        }

        self.cycle += 1;
        let end = if self.five_step {
            Self::FIVE_STEP_END
        } else {
            Self::FOUR_STEP_END
        };

        let signals = match self.cycle {
            Self::QUARTER_1 | Self::QUARTER_3 => FrameSignals::QUARTER,
            Self::HALF_1 => FrameSignals::QUARTER_HALF,
            c if c == end => {
                if !self.five_step && !self.irq_inhibit {
                    self.irq_pending = true;
                }
                self.cycle = 0;
                FrameSignals::QUARTER_HALF
            }
            _ => FrameSignals::default(),
        };
        signals
    }

    /// Frame IRQ line.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// $4015 read clears the frame IRQ.
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    /// Current cycle within the frame (tests).
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fc: &mut FrameCounter, cycles: u32) -> (u32, u32) {
        let mut quarters = 0;
        let mut halves = 0;
        for _ in 0..cycles {
            let s = fc.clock();
            quarters += u32::from(s.quarter);
            halves += u32::from(s.half);
        }
        (quarters, halves)
    }

    #[test]
    fn four_step_schedule() {
        let mut fc = FrameCounter::new();
        let (quarters, halves) = run(&mut fc, 14915);
        assert_eq!(quarters, 4);
        assert_eq!(halves, 2);
        assert!(fc.irq_pending());
        assert_eq!(fc.cycle(), 0);
    }

    #[test]
    fn five_step_schedule_without_irq() {
        let mut fc = FrameCounter::new();
        let immediate = fc.write(0x80);
        assert!(immediate.quarter && immediate.half);

        let (quarters, halves) = run(&mut fc, 18641);
        assert_eq!(quarters, 4);
        assert_eq!(halves, 2);
        assert!(!fc.irq_pending());
    }

    #[test]
    fn irq_inhibit_blocks_the_flag() {
        let mut fc = FrameCounter::new();
        let _ = fc.write(0x40);
        let _ = run(&mut fc, 30000);
        assert!(!fc.irq_pending());
    }

    #[test]
    fn inhibit_clears_pending_on_next_cycle() {
        let mut fc = FrameCounter::new();
        let _ = run(&mut fc, 14915);
        assert!(fc.irq_pending());

        let _ = fc.write(0x40);
        // Still pending until the next clock boundary.
        assert!(fc.irq_pending());
        let _ = fc.clock();
        assert!(!fc.irq_pending());
    }

    #[test]
    fn status_read_clears_irq() {
        let mut fc = FrameCounter::new();
        let _ = run(&mut fc, 14915);
        fc.clear_irq();
        assert!(!fc.irq_pending());
    }

    #[test]
    fn write_resets_the_counter() {
        let mut fc = FrameCounter::new();
        let _ = run(&mut fc, 5000);
        let _ = fc.write(0x00);
        assert_eq!(fc.cycle(), 0);
    }
}
