//! The Hack CPU datapath.
//!
//! Each clock cycle runs in two phases:
//! 1. [`Cpu::evaluate`] computes every combinational signal from the current
//!    register values and the cycle's inputs. It takes `&self`, so nothing
//!    clocked can change while signals settle.
//! 2. [`Cpu::commit`] applies the clock edge: A, D and PC latch the values
//!    computed in phase 1.
//!
//! [`Cpu::cycle`] runs both phases back to back.

use crate::cpu::decode::{self, Instruction};
use crate::cpu::Registers;
use crate::logic::{alu, gates, Address, AluControl, AluOutput, Word};
use serde::{Serialize, Deserialize};

/// Inputs sampled by the CPU during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuInput {
    /// The instruction fetched from ROM at the current PC.
    pub instruction: Word,
    /// The memory word at the address currently driven by A.
    pub in_m: Word,
    /// Synchronous reset: forces the next PC to 0.
    pub reset: bool,
}

/// Outputs of one cycle at the device boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuOutput {
    /// Value to write to memory (the ALU result).
    pub out_m: Word,
    /// Whether memory latches `out_m` on this edge.
    pub write_m: bool,
    /// Address memory writes to on this edge.
    pub address_m: Address,
    /// Program counter after the edge.
    pub pc: Address,
}

/// Every combinational signal of one cycle, settled before the clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// The decoded instruction (for tracing; the datapath wires raw bits).
    pub instruction: Instruction,
    /// ALU result and flags.
    pub alu: AluOutput,
    /// Value presented to the A register.
    pub a_in: Word,
    /// A samples `a_in` on the edge.
    pub load_a: bool,
    /// D samples the ALU result on the edge.
    pub load_d: bool,
    /// Memory samples the ALU result on the edge.
    pub write_m: bool,
    /// PC loads from A instead of incrementing.
    pub jump: bool,
    /// Reset was asserted this cycle.
    pub reset: bool,
    /// Address driven by A during this cycle.
    pub address_m: Address,
    /// PC value after the edge.
    pub next_pc: Address,
}

impl Signals {
    /// The boundary outputs for this cycle.
    pub fn output(&self) -> CpuOutput {
        CpuOutput {
            out_m: self.alu.out,
            write_m: self.write_m,
            address_m: self.address_m,
            pc: self.next_pc,
        }
    }
}

/// The Hack CPU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
}

impl Cpu {
    /// Create a new CPU with zeroed registers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: settle all combinational signals for this cycle.
    pub fn evaluate(&self, input: &CpuInput) -> Signals {
        let instr = input.instruction;
        let a = self.regs.a.out();
        let d = self.regs.d.out();

        // Instruction fields
        let is_compute = instr.bit(15);
        let use_memory = instr.bit(12);
        let control = AluControl::from_bits(((instr.bits() >> 6) & 0b111111) as u8);
        let dest_a = instr.bit(5);
        let dest_d = instr.bit(4);
        let dest_m = instr.bit(3);
        let jump_lt = instr.bit(2);
        let jump_eq = instr.bit(1);
        let jump_gt = instr.bit(0);

        // ALU: x is always D, y is M or A
        let y = gates::mux16(a, input.in_m, use_memory);
        let result = alu(d, y, control);

        // Register loads
        let a_in = gates::mux16(instr, result.out, is_compute);
        let load_a = gates::or(gates::not(is_compute), gates::and(is_compute, dest_a));
        let load_d = gates::and(is_compute, dest_d);
        let write_m = gates::and(is_compute, dest_m);

        // Jump: positive means neither zero nor negative
        let positive = gates::not(gates::or(result.zr, result.ng));
        let mut jump = gates::and(jump_lt, result.ng);
        jump = gates::or(jump, gates::and(jump_eq, result.zr));
        jump = gates::or(jump, gates::and(jump_gt, positive));
        let jump = gates::and(is_compute, jump);

        let next_pc = self.regs.pc.next(a.address(), jump, true, input.reset);

        Signals {
            instruction: decode::decode(instr),
            alu: result,
            a_in,
            load_a,
            load_d,
            write_m,
            jump,
            reset: input.reset,
            address_m: a.address(),
            next_pc,
        }
    }

    /// Phase 2: the clock edge. Latches A, D and PC from settled signals.
    pub fn commit(&mut self, signals: &Signals) {
        let jump_target = self.regs.address();
        self.regs.a.tick(signals.a_in, signals.load_a);
        self.regs.d.tick(signals.alu.out, signals.load_d);
        self.regs.pc.tick(jump_target, signals.jump, true, signals.reset);
    }

    /// Run one full cycle: evaluate, then commit.
    pub fn cycle(&mut self, input: &CpuInput) -> CpuOutput {
        let signals = self.evaluate(input);
        self.commit(&signals);
        signals.output()
    }

    /// The memory address currently driven by A.
    #[inline]
    pub fn address(&self) -> Address {
        self.regs.address()
    }

    /// The address of the instruction to fetch this cycle.
    #[inline]
    pub fn pc(&self) -> Address {
        self.regs.pc.out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::{encode, Dest, Jump};
    use proptest::prelude::*;

    fn at(value: u16) -> Word {
        encode(&Instruction::Address(value))
    }

    fn compute(use_memory: bool, alu_bits: u8, dest: u8, jump: u8) -> Word {
        encode(&Instruction::Compute {
            use_memory,
            control: AluControl::from_bits(alu_bits),
            dest: Dest::from_bits(dest),
            jump: Jump::from_bits(jump),
        })
    }

    fn input(instruction: Word) -> CpuInput {
        CpuInput { instruction, in_m: Word::zero(), reset: false }
    }

    const COMP_D_PLUS: u8 = 0b000010;
    const COMP_A: u8 = 0b110000;
    const COMP_D: u8 = 0b001100;
    const COMP_ZERO: u8 = 0b101010;
    const COMP_MINUS_ONE: u8 = 0b111010;

    #[test]
    fn test_address_instruction_loads_a() {
        let mut cpu = Cpu::new();
        let out = cpu.cycle(&input(at(1234)));

        assert!(!out.write_m);
        assert_eq!(cpu.regs.a.out().bits(), 1234);
        assert_eq!(out.pc, 1);
        assert_eq!(cpu.address(), 1234);
    }

    #[test]
    fn test_compute_writes_d_and_memory() {
        let mut cpu = Cpu::new();
        cpu.cycle(&input(at(10)));
        // D=A
        cpu.cycle(&input(compute(false, COMP_A, 0b010, 0)));
        assert_eq!(cpu.regs.d.out().bits(), 10);

        // M=D+M with M = 5
        let out = cpu.cycle(&CpuInput {
            instruction: compute(true, COMP_D_PLUS, 0b001, 0),
            in_m: Word::new(5),
            reset: false,
        });
        assert!(out.write_m);
        assert_eq!(out.out_m.bits(), 15);
        assert_eq!(out.address_m, 10);
        assert_eq!(cpu.regs.d.out().bits(), 10, "D untouched without its dest flag");
    }

    #[test]
    fn test_operand_select_between_a_and_m() {
        let mut cpu = Cpu::new();
        cpu.cycle(&input(at(3)));
        let signals = cpu.evaluate(&CpuInput {
            instruction: compute(false, COMP_D_PLUS, 0, 0),
            in_m: Word::new(100),
            reset: false,
        });
        assert_eq!(signals.alu.out.bits(), 3);

        let signals = cpu.evaluate(&CpuInput {
            instruction: compute(true, COMP_D_PLUS, 0, 0),
            in_m: Word::new(100),
            reset: false,
        });
        assert_eq!(signals.alu.out.bits(), 100);
    }

    #[test]
    fn test_evaluate_does_not_change_state() {
        let mut cpu = Cpu::new();
        cpu.cycle(&input(at(9)));
        let before = cpu.clone();
        let signals = cpu.evaluate(&input(compute(false, COMP_A, 0b111, 0b111)));
        assert_eq!(cpu, before);
        assert!(signals.load_a && signals.load_d && signals.write_m && signals.jump);
    }

    #[test]
    fn test_jump_targets_current_a() {
        let mut cpu = Cpu::new();
        cpu.cycle(&input(at(42)));
        // A=-1;JMP: A changes on the same edge, but the jump uses the old A.
        let out = cpu.cycle(&input(compute(false, COMP_MINUS_ONE, 0b100, 0b111)));
        assert_eq!(out.pc, 42);
        assert_eq!(cpu.regs.a.out(), Word::ONES);
    }

    #[test]
    fn test_jump_conditions() {
        // (value in D, jump bits, expected taken)
        let cases: [(i16, u8, bool); 12] = [
            (5, 0b001, true),
            (0, 0b001, false),
            (-5, 0b001, false),
            (0, 0b010, true),
            (5, 0b010, false),
            (-5, 0b100, true),
            (0, 0b100, false),
            (5, 0b011, true),
            (-5, 0b011, false),
            (0, 0b101, false),
            (-5, 0b110, true),
            (7, 0b000, false),
        ];

        for (value, jump_bits, taken) in cases {
            let mut cpu = Cpu::new();
            cpu.regs.d.tick(Word::from_i16(value), true);
            cpu.cycle(&input(at(500)));
            let out = cpu.cycle(&input(compute(false, COMP_D, 0, jump_bits)));
            let expected = if taken { 500 } else { 2 };
            assert_eq!(out.pc, expected, "D={} jump={:03b}", value, jump_bits);
        }
    }

    #[test]
    fn test_address_instruction_never_jumps() {
        let mut cpu = Cpu::new();
        // Literal 7 has low bits 111, which would be JMP in a compute-instruction.
        let out = cpu.cycle(&input(at(0b111)));
        assert_eq!(out.pc, 1);
    }

    #[test]
    fn test_reset_forces_pc_zero_only() {
        let mut cpu = Cpu::new();
        cpu.cycle(&input(at(77)));
        cpu.cycle(&input(compute(false, COMP_A, 0b010, 0)));
        assert_eq!(cpu.pc(), 2);

        let out = cpu.cycle(&CpuInput {
            instruction: compute(false, COMP_ZERO, 0, 0b111),
            in_m: Word::zero(),
            reset: true,
        });
        assert_eq!(out.pc, 0);
        assert_eq!(cpu.regs.a.out().bits(), 77, "reset leaves A alone");
        assert_eq!(cpu.regs.d.out().bits(), 77, "reset leaves D alone");
    }

    proptest! {
        #[test]
        fn prop_address_instruction_latches_literal(literal in 0u16..0x8000, d in any::<u16>()) {
            let mut cpu = Cpu::new();
            cpu.regs.d.tick(Word::new(d), true);
            let out = cpu.cycle(&input(Word::new(literal)));
            prop_assert!(!out.write_m);
            prop_assert_eq!(cpu.regs.a.out().bits(), literal);
            prop_assert_eq!(cpu.regs.d.out().bits(), d);
        }

        #[test]
        fn prop_write_m_iff_dest_m(bits in 0x8000u16..=0xFFFF, in_m in any::<u16>()) {
            let cpu = Cpu::new();
            let signals = cpu.evaluate(&CpuInput {
                instruction: Word::new(bits),
                in_m: Word::new(in_m),
                reset: false,
            });
            prop_assert_eq!(signals.write_m, bits & 0b1000 != 0);
        }

        #[test]
        fn prop_jump_matches_flag_composition(bits in 0x8000u16..=0xFFFF, a in any::<u16>(), d in any::<u16>(), m in any::<u16>()) {
            let mut cpu = Cpu::new();
            cpu.regs.a.tick(Word::new(a), true);
            cpu.regs.d.tick(Word::new(d), true);
            let signals = cpu.evaluate(&CpuInput {
                instruction: Word::new(bits),
                in_m: Word::new(m),
                reset: false,
            });
            let out = signals.alu.out;
            let zero = out.is_zero();
            let negative = out.is_negative();
            let positive = !zero && !negative;
            let expected = (bits & 0b001 != 0 && positive)
                || (bits & 0b010 != 0 && zero)
                || (bits & 0b100 != 0 && negative);
            prop_assert_eq!(signals.jump, expected);
            let next = if expected { a & 0x7FFF } else { 1 };
            prop_assert_eq!(signals.next_pc, next);
        }

        #[test]
        fn prop_reset_wins(bits in any::<u16>(), a in any::<u16>()) {
            let mut cpu = Cpu::new();
            cpu.regs.a.tick(Word::new(a), true);
            let signals = cpu.evaluate(&CpuInput {
                instruction: Word::new(bits),
                in_m: Word::zero(),
                reset: true,
            });
            prop_assert_eq!(signals.next_pc, 0);
        }
    }
}
