//! Instruction decoder for the Hack CPU.
//!
//! Instructions are 16-bit words in one of two forms, selected by bit 15:
//!
//! ```text
//! address-instruction:  0vvv vvvv vvvv vvvv      A := v (15-bit literal)
//! compute-instruction:  1xxa cccc ccdd djjj      dest := comp ; jump
//! ```
//!
//! - `a` (bit 12): ALU y operand is M (memory) instead of A
//! - `cccccc` (bits 11..6): ALU control bits zx nx zy ny f no
//! - `ddd` (bits 5..3): load A, D, M
//! - `jjj` (bits 2..0): jump if negative, zero, positive
//! - `xx` (bits 14..13): unused, ignored by the CPU
//!
//! Every 16-bit word decodes to some instruction; there is no invalid encoding.

use crate::logic::{AluControl, Word, ADDRESS_MASK};
use serde::{Serialize, Deserialize};

/// Bit 15: instruction tag.
const COMPUTE_BIT: u16 = 1 << 15;
/// Bit 12: operand source.
const A_BIT: u16 = 1 << 12;
/// Bits 14..13 are set to 1 by convention in assembled compute-instructions.
const UNUSED_BITS: u16 = 0b11 << 13;

/// Destination load flags of a compute-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    /// No destination.
    pub const NONE: Dest = Dest { a: false, d: false, m: false };

    /// Build from three bits `A D M` (bit 2 = A).
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }

    /// Pack into three bits.
    pub const fn bits(self) -> u8 {
        (self.a as u8) << 2 | (self.d as u8) << 1 | (self.m as u8)
    }

    /// True when no destination is loaded.
    pub const fn is_empty(self) -> bool {
        self.bits() == 0
    }
}

/// Jump condition flags of a compute-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Jump {
    /// Jump when the ALU result is negative (j1).
    pub lt: bool,
    /// Jump when the ALU result is zero (j2).
    pub eq: bool,
    /// Jump when the ALU result is positive (j3).
    pub gt: bool,
}

impl Jump {
    /// Never jump.
    pub const NEVER: Jump = Jump { lt: false, eq: false, gt: false };
    /// Always jump.
    pub const ALWAYS: Jump = Jump { lt: true, eq: true, gt: true };

    /// Build from three bits `j1 j2 j3` (bit 2 = negative).
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            lt: bits & 0b100 != 0,
            eq: bits & 0b010 != 0,
            gt: bits & 0b001 != 0,
        }
    }

    /// Pack into three bits.
    pub const fn bits(self) -> u8 {
        (self.lt as u8) << 2 | (self.eq as u8) << 1 | (self.gt as u8)
    }

    /// True when every outcome jumps.
    pub const fn is_unconditional(self) -> bool {
        self.lt && self.eq && self.gt
    }
}

/// A decoded Hack instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load a 15-bit literal into A: `@value`
    Address(u16),

    /// Drive the ALU and route its result: `dest=comp;jump`
    Compute {
        /// y operand is M (the addressed memory word) rather than A
        use_memory: bool,
        /// ALU function selection
        control: AluControl,
        /// Which of A, D, M latch the result
        dest: Dest,
        /// Which result signs redirect the program counter to A
        jump: Jump,
    },
}

impl Instruction {
    /// True for compute-instructions.
    pub const fn is_compute(&self) -> bool {
        matches!(self, Instruction::Compute { .. })
    }
}

/// Decode a 16-bit instruction word. Total: unused bits are ignored.
pub fn decode(word: Word) -> Instruction {
    let bits = word.bits();

    if bits & COMPUTE_BIT == 0 {
        return Instruction::Address(bits & ADDRESS_MASK);
    }

    Instruction::Compute {
        use_memory: bits & A_BIT != 0,
        control: AluControl::from_bits(((bits >> 6) & 0b111111) as u8),
        dest: Dest::from_bits(((bits >> 3) & 0b111) as u8),
        jump: Jump::from_bits((bits & 0b111) as u8),
    }
}

/// Encode an instruction back to its canonical 16-bit word.
///
/// Address literals are truncated to 15 bits; compute-instructions set the
/// two unused bits, as assemblers conventionally do.
pub fn encode(instr: &Instruction) -> Word {
    match *instr {
        Instruction::Address(value) => Word::new(value & ADDRESS_MASK),
        Instruction::Compute { use_memory, control, dest, jump } => {
            let mut bits = COMPUTE_BIT | UNUSED_BITS;
            if use_memory {
                bits |= A_BIT;
            }
            bits |= u16::from(control.bits()) << 6;
            bits |= u16::from(dest.bits()) << 3;
            bits |= u16::from(jump.bits());
            Word::new(bits)
        }
    }
}
