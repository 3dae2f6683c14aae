//! CPU status register (P).
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! ```
//!
//! U always reads back as 1. D is stored and restored like any other
//! flag but never changes ADC/SBC behavior, matching the console's CPU.

use bitflags::bitflags;

bitflags! {
    /// Processor status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable. Masks IRQ, never NMI.
        const I = 1 << 2;
        /// Decimal mode. Honored as a bit, ignored by the ALU.
        const D = 1 << 3;
        /// Break. Only meaningful in the pushed copy of the register.
        const B = 1 << 4;
        /// Unused; hardwired high.
        const U = 1 << 5;
        /// Signed overflow.
        const V = 1 << 6;
        /// Negative (bit 7 of the last result).
        const N = 1 << 7;
    }
}

impl Status {
    /// Register state after power-on/reset: I and U set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Set or clear Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// The byte pushed on the stack: U forced high, B per the push source
    /// (set by PHP/BRK, clear for hardware interrupts).
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut bits = self.bits() | Self::U.bits();
        if brk {
            bits |= Self::B.bits();
        }
        bits
    }

    /// Rebuild the register from a byte pulled off the stack.
    /// B is discarded, U forced high.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
