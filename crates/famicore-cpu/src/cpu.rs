//! 6502 CPU core.
//!
//! Execution is modeled at one-cycle granularity with a countdown: when
//! the remaining-cycle counter hits zero the CPU polls interrupts,
//! fetches the next opcode, computes the complete instruction effect and
//! its final cycle count up front, then idles for the remaining cycles.
//! The bus still observes the hardware access pattern where it matters:
//! page-crossed indexed reads, the read/write/write of RMW instructions,
//! the stack dummy read of JSR and the un-carried dummy read of every
//! indexed store are all emitted.
//!
//! The unstable stores (SHA/SHS/SHX/SHY) leave the countdown model and
//! run on the per-cycle sequencer in [`crate::unstable`], since their
//! behavior depends on the exact cycle a DMC steal lands on.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{OpcodeInfo, OPCODE_TABLE};
use crate::status::Status;
use crate::unstable::UnstableStore;

/// NMI vector location.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector location.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector location.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Idle cycles consumed after reset before the first opcode fetch.
const RESET_IDLE_CYCLES: u8 = 8;

/// Resolved operand location.
struct Operand {
    addr: u16,
    base: u16,
    crossed: bool,
}

/// The 6502 CPU.
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer into page 1.
    pub sp: u8,
    /// Status register.
    pub status: Status,

    cycles: u64,
    cycles_left: u8,

    nmi_pending: bool,
    irq_line: bool,
    /// I flag captured at the previous instruction boundary. IRQ
    /// recognition uses this latch, which yields the one-instruction
    /// deferral after CLI/SEI/PLP.
    irq_inhibit_latch: bool,
    /// NMI polling skipped for the instruction after BRK.
    suppress_nmi_once: bool,

    unstable: Option<UnstableStore>,
}

impl Cpu {
    /// Power-on state. `reset` must run before the first `clock`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycles: 0,
            cycles_left: 0,
            nmi_pending: false,
            irq_line: false,
            irq_inhibit_latch: true,
            suppress_nmi_once: false,
            unstable: None,
        }
    }

    /// Reset: A=X=Y=0, SP=$FD, status=I|U, PC from the reset vector,
    /// then eight idle cycles before the first instruction.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.status = Status::POWER_ON;
        self.pc = bus.read_u16(RESET_VECTOR);
        self.cycles = 0;
        self.cycles_left = RESET_IDLE_CYCLES;
        self.nmi_pending = false;
        self.irq_line = false;
        self.irq_inhibit_latch = true;
        self.suppress_nmi_once = false;
        self.unstable = None;
    }

    /// Advance one CPU cycle.
    pub fn clock(&mut self, bus: &mut impl Bus) {
        self.cycles += 1;

        if let Some(seq) = self.unstable.take() {
            self.unstable = seq.clock(self, bus);
            return;
        }

        if self.cycles_left == 0 {
            let cycles = self.begin_instruction(bus);
            if self.unstable.is_some() {
                // Opcode fetch consumed this cycle; the sequencer owns
                // the rest of the instruction.
                return;
            }
            self.cycles_left = cycles;
        }
        self.cycles_left -= 1;
    }

    /// A cycle stolen from the CPU (DMC fetch or OAM DMA). The countdown
    /// freezes; an in-flight unstable store observes the steal.
    pub fn halt_cycle(&mut self, bus: &mut impl Bus) {
        self.cycles += 1;
        if let Some(seq) = self.unstable.take() {
            self.unstable = seq.halt(self, bus);
        }
    }

    /// Assert the edge-triggered NMI line.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drive the level-sensitive IRQ line.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Total cycles executed since reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the next `clock` starts a new instruction.
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.cycles_left == 0 && self.unstable.is_none()
    }

    /// Clock until the current instruction retires and the next one is
    /// about to be fetched. Test/debug convenience.
    pub fn step_instruction(&mut self, bus: &mut impl Bus) {
        self.clock(bus);
        while !self.at_instruction_boundary() {
            self.clock(bus);
        }
    }

    // =====================================================================
    // Instruction boundary
    // =====================================================================

    /// Poll interrupts, fetch, and execute one instruction. Returns its
    /// total cycle count (or 1 when handing off to the SH* sequencer).
    fn begin_instruction(&mut self, bus: &mut impl Bus) -> u8 {
        let inhibit_now = self.status.contains(Status::I);

        if self.nmi_pending && !self.suppress_nmi_once {
            self.nmi_pending = false;
            self.irq_inhibit_latch = true;
            return self.interrupt(bus, NMI_VECTOR);
        }
        self.suppress_nmi_once = false;

        if self.irq_line && !self.irq_inhibit_latch {
            self.irq_inhibit_latch = true;
            return self.interrupt(bus, IRQ_VECTOR);
        }
        self.irq_inhibit_latch = inhibit_now;

        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        if UnstableStore::claims(opcode) {
            self.unstable = Some(UnstableStore::begin(opcode));
            return 1;
        }

        let info = &OPCODE_TABLE[opcode as usize];
        let extra = self.execute(opcode, info, bus);
        info.cycles + extra
    }

    /// Hardware interrupt entry: 7 cycles, pushes PC and status (B=0),
    /// sets I, loads PC from `vector`.
    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) -> u8 {
        self.push_u16(bus, self.pc);
        self.push(bus, self.status.to_stack_byte(false));
        self.status.insert(Status::I);
        self.pc = bus.read_u16(vector);
        7
    }

    // =====================================================================
    // Operand plumbing
    // =====================================================================

    fn resolve(&mut self, bus: &mut impl Bus, mode: AddrMode) -> Operand {
        match mode {
            AddrMode::Implied | AddrMode::Accumulator | AddrMode::Relative => Operand {
                addr: 0,
                base: 0,
                crossed: false,
            },
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Operand {
                    addr,
                    base: addr,
                    crossed: false,
                }
            }
            AddrMode::ZeroPage => {
                let addr = u16::from(bus.read(self.pc));
                self.pc = self.pc.wrapping_add(1);
                Operand {
                    addr,
                    base: addr,
                    crossed: false,
                }
            }
            AddrMode::ZeroPageX => {
                let base = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                Operand {
                    addr: u16::from(base.wrapping_add(self.x)),
                    base: u16::from(base),
                    crossed: false,
                }
            }
            AddrMode::ZeroPageY => {
                let base = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                Operand {
                    addr: u16::from(base.wrapping_add(self.y)),
                    base: u16::from(base),
                    crossed: false,
                }
            }
            AddrMode::Absolute => {
                let addr = self.fetch_u16(bus);
                Operand {
                    addr,
                    base: addr,
                    crossed: false,
                }
            }
            AddrMode::AbsoluteX => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.x));
                Operand {
                    addr,
                    base,
                    crossed: base & 0xFF00 != addr & 0xFF00,
                }
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.y));
                Operand {
                    addr,
                    base,
                    crossed: base & 0xFF00 != addr & 0xFF00,
                }
            }
            AddrMode::Indirect => {
                let ptr = self.fetch_u16(bus);
                let addr = bus.read_u16_wrap(ptr);
                Operand {
                    addr,
                    base: ptr,
                    crossed: false,
                }
            }
            AddrMode::IndexedIndirectX => {
                let zp = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                let ptr = zp.wrapping_add(self.x);
                let lo = bus.read(u16::from(ptr));
                let hi = bus.read(u16::from(ptr.wrapping_add(1)));
                let addr = u16::from_le_bytes([lo, hi]);
                Operand {
                    addr,
                    base: addr,
                    crossed: false,
                }
            }
            AddrMode::IndirectIndexedY => {
                let zp = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(self.y));
                Operand {
                    addr,
                    base,
                    crossed: base & 0xFF00 != addr & 0xFF00,
                }
            }
        }
    }

    fn fetch_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let hi = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    const fn indexed(mode: AddrMode) -> bool {
        matches!(
            mode,
            AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::IndirectIndexedY
        )
    }

    /// Fetch the operand value for a read instruction, emitting the
    /// page-cross dummy read, and report the extra cycle.
    fn load(&mut self, bus: &mut impl Bus, info: &OpcodeInfo) -> (u8, u8) {
        if info.mode == AddrMode::Accumulator {
            return (self.a, 0);
        }
        let op = self.resolve(bus, info.mode);
        if op.crossed && Self::indexed(info.mode) {
            let _ = bus.read((op.base & 0xFF00) | (op.addr & 0x00FF));
        }
        let value = bus.read(op.addr);
        (value, u8::from(op.crossed && info.page_penalty))
    }

    /// Store with the unconditional un-carried dummy read of indexed
    /// store addressing.
    fn store(&mut self, bus: &mut impl Bus, mode: AddrMode, value: u8) {
        let op = self.resolve(bus, mode);
        if Self::indexed(mode) {
            let _ = bus.read((op.base & 0xFF00) | (op.addr & 0x00FF));
        }
        bus.write(op.addr, value);
    }

    /// Read-modify-write: read, write back the original, write the result.
    fn rmw(&mut self, bus: &mut impl Bus, mode: AddrMode, f: impl FnOnce(&mut Self, u8) -> u8) {
        if mode == AddrMode::Accumulator {
            let result = f(self, self.a);
            self.a = result;
            return;
        }
        let op = self.resolve(bus, mode);
        if Self::indexed(mode) {
            let _ = bus.read((op.base & 0xFF00) | (op.addr & 0x00FF));
        }
        let value = bus.read(op.addr);
        bus.write(op.addr, value);
        let result = f(self, value);
        bus.write(op.addr, result);
    }

    fn branch(&mut self, bus: &mut impl Bus, taken: bool) -> u8 {
        let offset = bus.read(self.pc) as i8;
        self.pc = self.pc.wrapping_add(1);
        if !taken {
            return 0;
        }
        let target = self.pc.wrapping_add(offset as u16);
        let crossed = target & 0xFF00 != self.pc & 0xFF00;
        self.pc = target;
        1 + u8::from(crossed)
    }

    // =====================================================================
    // Stack helpers
    // =====================================================================

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, (value & 0xFF) as u8);
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn set_zn(&mut self, value: u8) {
        self.status.set_zn(value);
    }

    // =====================================================================
    // ALU helpers
    // =====================================================================

    /// Binary add with carry. The D flag is deliberately ignored: the
    /// console's CPU has no BCD unit.
    fn do_adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;
        self.status.set(Status::C, sum > 0xFF);
        self.status
            .set(Status::V, (!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0);
        self.a = result;
        self.set_zn(result);
    }

    fn do_sbc(&mut self, value: u8) {
        self.do_adc(!value);
    }

    fn do_compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    fn do_asl(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn do_lsr(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn do_rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1 | carry_in;
        self.set_zn(result);
        result
    }

    fn do_ror(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x01 != 0);
        let result = value >> 1 | carry_in << 7;
        self.set_zn(result);
        result
    }

    // =====================================================================
    // Dispatch
    // =====================================================================

    /// Execute one decoded instruction; returns extra cycles beyond the
    /// table's base count (page crossings, taken branches).
    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, opcode: u8, info: &OpcodeInfo, bus: &mut impl Bus) -> u8 {
        match opcode {
            // ---- loads ----
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => {
                let (value, extra) = self.load(bus, info);
                self.a = value;
                self.set_zn(value);
                extra
            }
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => {
                let (value, extra) = self.load(bus, info);
                self.x = value;
                self.set_zn(value);
                extra
            }
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => {
                let (value, extra) = self.load(bus, info);
                self.y = value;
                self.set_zn(value);
                extra
            }
            // LAX: load A and X together
            0xA7 | 0xB7 | 0xAF | 0xBF | 0xA3 | 0xB3 => {
                let (value, extra) = self.load(bus, info);
                self.a = value;
                self.x = value;
                self.set_zn(value);
                extra
            }
            // LAS: value & SP into A, X and SP
            0xBB => {
                let (value, extra) = self.load(bus, info);
                let result = value & self.sp;
                self.a = result;
                self.x = result;
                self.sp = result;
                self.set_zn(result);
                extra
            }

            // ---- stores ----
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => {
                self.store(bus, info.mode, self.a);
                0
            }
            0x86 | 0x96 | 0x8E => {
                self.store(bus, info.mode, self.x);
                0
            }
            0x84 | 0x94 | 0x8C => {
                self.store(bus, info.mode, self.y);
                0
            }
            0x87 | 0x97 | 0x8F | 0x83 => {
                self.store(bus, info.mode, self.a & self.x);
                0
            }

            // ---- arithmetic / logic reads ----
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => {
                let (value, extra) = self.load(bus, info);
                self.do_adc(value);
                extra
            }
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 | 0xEB => {
                let (value, extra) = self.load(bus, info);
                self.do_sbc(value);
                extra
            }
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => {
                let (value, extra) = self.load(bus, info);
                self.a &= value;
                self.set_zn(self.a);
                extra
            }
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => {
                let (value, extra) = self.load(bus, info);
                self.a |= value;
                self.set_zn(self.a);
                extra
            }
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => {
                let (value, extra) = self.load(bus, info);
                self.a ^= value;
                self.set_zn(self.a);
                extra
            }
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => {
                let (value, extra) = self.load(bus, info);
                self.do_compare(self.a, value);
                extra
            }
            0xE0 | 0xE4 | 0xEC => {
                let (value, extra) = self.load(bus, info);
                self.do_compare(self.x, value);
                extra
            }
            0xC0 | 0xC4 | 0xCC => {
                let (value, extra) = self.load(bus, info);
                self.do_compare(self.y, value);
                extra
            }
            0x24 | 0x2C => {
                let (value, extra) = self.load(bus, info);
                self.status.set(Status::Z, self.a & value == 0);
                self.status.set(Status::V, value & 0x40 != 0);
                self.status.set(Status::N, value & 0x80 != 0);
                extra
            }

            // ---- immediate-mode unofficial arithmetic ----
            0x0B | 0x2B => {
                // ANC: AND then copy N into C
                let (value, _) = self.load(bus, info);
                self.a &= value;
                self.set_zn(self.a);
                self.status.set(Status::C, self.a & 0x80 != 0);
                0
            }
            0x4B => {
                // ASR (ALR): AND then LSR A
                let (value, _) = self.load(bus, info);
                self.a &= value;
                self.a = self.do_lsr(self.a);
                0
            }
            0x6B => {
                // ARR: AND, ROR A, then C/V from bits 6 and 5
                let (value, _) = self.load(bus, info);
                self.a &= value;
                let carry_in = u8::from(self.status.contains(Status::C));
                self.a = self.a >> 1 | carry_in << 7;
                self.set_zn(self.a);
                self.status.set(Status::C, self.a & 0x40 != 0);
                self.status
                    .set(Status::V, ((self.a & 0x40) ^ ((self.a & 0x20) << 1)) != 0);
                0
            }
            0x8B => {
                // ANE (XAA): (A | magic) & X & operand
                let (value, _) = self.load(bus, info);
                self.a = (self.a | 0xEE) & self.x & value;
                self.set_zn(self.a);
                0
            }
            0xAB => {
                // LXA: (A | magic) & operand into A and X
                let (value, _) = self.load(bus, info);
                self.a = (self.a | 0xEE) & value;
                self.x = self.a;
                self.set_zn(self.a);
                0
            }
            0xCB => {
                // AXS (SBX): X = (A & X) - operand, carry like CMP
                let (value, _) = self.load(bus, info);
                let and = self.a & self.x;
                self.status.set(Status::C, and >= value);
                self.x = and.wrapping_sub(value);
                self.set_zn(self.x);
                0
            }

            // ---- shifts / rotates / inc / dec ----
            0x0A | 0x06 | 0x16 | 0x0E | 0x1E => {
                self.rmw(bus, info.mode, Self::do_asl);
                0
            }
            0x4A | 0x46 | 0x56 | 0x4E | 0x5E => {
                self.rmw(bus, info.mode, Self::do_lsr);
                0
            }
            0x2A | 0x26 | 0x36 | 0x2E | 0x3E => {
                self.rmw(bus, info.mode, Self::do_rol);
                0
            }
            0x6A | 0x66 | 0x76 | 0x6E | 0x7E => {
                self.rmw(bus, info.mode, Self::do_ror);
                0
            }
            0xE6 | 0xF6 | 0xEE | 0xFE => {
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = v.wrapping_add(1);
                    cpu.set_zn(r);
                    r
                });
                0
            }
            0xC6 | 0xD6 | 0xCE | 0xDE => {
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = v.wrapping_sub(1);
                    cpu.set_zn(r);
                    r
                });
                0
            }

            // ---- combined RMW unofficials ----
            0x07 | 0x17 | 0x0F | 0x1F | 0x1B | 0x03 | 0x13 => {
                // SLO: ASL then ORA
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = cpu.do_asl(v);
                    cpu.a |= r;
                    cpu.set_zn(cpu.a);
                    r
                });
                0
            }
            0x27 | 0x37 | 0x2F | 0x3F | 0x3B | 0x23 | 0x33 => {
                // RLA: ROL then AND
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = cpu.do_rol(v);
                    cpu.a &= r;
                    cpu.set_zn(cpu.a);
                    r
                });
                0
            }
            0x47 | 0x57 | 0x4F | 0x5F | 0x5B | 0x43 | 0x53 => {
                // SRE: LSR then EOR
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = cpu.do_lsr(v);
                    cpu.a ^= r;
                    cpu.set_zn(cpu.a);
                    r
                });
                0
            }
            0x67 | 0x77 | 0x6F | 0x7F | 0x7B | 0x63 | 0x73 => {
                // RRA: ROR then ADC
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = cpu.do_ror(v);
                    cpu.do_adc(r);
                    r
                });
                0
            }
            0xC7 | 0xD7 | 0xCF | 0xDF | 0xDB | 0xC3 | 0xD3 => {
                // DCP: DEC then CMP
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = v.wrapping_sub(1);
                    cpu.do_compare(cpu.a, r);
                    r
                });
                0
            }
            0xE7 | 0xF7 | 0xEF | 0xFF | 0xFB | 0xE3 | 0xF3 => {
                // ISC: INC then SBC
                self.rmw(bus, info.mode, |cpu, v| {
                    let r = v.wrapping_add(1);
                    cpu.do_sbc(r);
                    r
                });
                0
            }

            // ---- branches ----
            0x10 => {
                let taken = !self.status.contains(Status::N);
                self.branch(bus, taken)
            }
            0x30 => {
                let taken = self.status.contains(Status::N);
                self.branch(bus, taken)
            }
            0x50 => {
                let taken = !self.status.contains(Status::V);
                self.branch(bus, taken)
            }
            0x70 => {
                let taken = self.status.contains(Status::V);
                self.branch(bus, taken)
            }
            0x90 => {
                let taken = !self.status.contains(Status::C);
                self.branch(bus, taken)
            }
            0xB0 => {
                let taken = self.status.contains(Status::C);
                self.branch(bus, taken)
            }
            0xD0 => {
                let taken = !self.status.contains(Status::Z);
                self.branch(bus, taken)
            }
            0xF0 => {
                let taken = self.status.contains(Status::Z);
                self.branch(bus, taken)
            }

            // ---- jumps / subroutines / interrupts ----
            0x4C => {
                self.pc = self.fetch_u16(bus);
                0
            }
            0x6C => {
                let op = self.resolve(bus, AddrMode::Indirect);
                self.pc = op.addr;
                0
            }
            0x20 => {
                let lo = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                // Internal cycle touches the stack page.
                let _ = bus.read(0x0100 | u16::from(self.sp));
                self.push_u16(bus, self.pc);
                let hi = bus.read(self.pc);
                self.pc = u16::from_le_bytes([lo, hi]);
                0
            }
            0x60 => {
                let addr = self.pop_u16(bus);
                self.pc = addr.wrapping_add(1);
                0
            }
            0x40 => {
                let flags = self.pop(bus);
                self.status = Status::from_stack_byte(flags);
                // RTI's restored I masks the very next boundary.
                if self.status.contains(Status::I) {
                    self.irq_inhibit_latch = true;
                }
                self.pc = self.pop_u16(bus);
                0
            }
            0x00 => {
                // BRK: padding byte, push PC and status with B=1
                let _ = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                let hijack = self.nmi_pending;
                if hijack {
                    self.nmi_pending = false;
                }
                self.push(bus, self.status.to_stack_byte(true));
                self.status.remove(Status::B);
                self.status.insert(Status::I);
                self.suppress_nmi_once = true;
                self.pc = bus.read_u16(if hijack { NMI_VECTOR } else { IRQ_VECTOR });
                0
            }

            // ---- stack ----
            0x48 => {
                self.push(bus, self.a);
                0
            }
            0x08 => {
                self.push(bus, self.status.to_stack_byte(true));
                0
            }
            0x68 => {
                let value = self.pop(bus);
                self.a = value;
                self.set_zn(value);
                0
            }
            0x28 => {
                let value = self.pop(bus);
                self.status = Status::from_stack_byte(value);
                0
            }

            // ---- transfers ----
            0xAA => {
                self.x = self.a;
                self.set_zn(self.x);
                0
            }
            0xA8 => {
                self.y = self.a;
                self.set_zn(self.y);
                0
            }
            0x8A => {
                self.a = self.x;
                self.set_zn(self.a);
                0
            }
            0x98 => {
                self.a = self.y;
                self.set_zn(self.a);
                0
            }
            0xBA => {
                self.x = self.sp;
                self.set_zn(self.x);
                0
            }
            0x9A => {
                self.sp = self.x;
                0
            }
            0xE8 => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
                0
            }
            0xC8 => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
                0
            }
            0xCA => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
                0
            }
            0x88 => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
                0
            }

            // ---- flags ----
            0x18 => {
                self.status.remove(Status::C);
                0
            }
            0x38 => {
                self.status.insert(Status::C);
                0
            }
            0x58 => {
                self.status.remove(Status::I);
                0
            }
            0x78 => {
                self.status.insert(Status::I);
                0
            }
            0xB8 => {
                self.status.remove(Status::V);
                0
            }
            0xD8 => {
                self.status.remove(Status::D);
                0
            }
            0xF8 => {
                self.status.insert(Status::D);
                0
            }

            // ---- NOPs, official and otherwise ----
            _ => {
                match info.mode {
                    AddrMode::Implied | AddrMode::Accumulator => 0,
                    _ => {
                        // Reading NOPs still touch their operand.
                        let (_, extra) = self.load(bus, info);
                        extra
                    }
                }
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
