//! The arithmetic-logic unit.
//!
//! A purely combinational function of two 16-bit operands and six control
//! bits, producing a result and two status flags. The control bits are
//! applied in a fixed order:
//!
//! 1. `zx`/`nx`: zero the x input, then bitwise-negate it
//! 2. `zy`/`ny`: likewise for y
//! 3. `f`: add (wrapping) when set, bitwise AND when clear
//! 4. `no`: bitwise-negate the result
//!
//! The 18 documented functions (0, 1, -1, x, y, !x, -x, x+1, x-y, x&y, ...)
//! all fall out of these six switches.

use crate::logic::{gates, Word};
use serde::{Serialize, Deserialize};

/// The six ALU control bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AluControl {
    pub zx: bool,
    pub nx: bool,
    pub zy: bool,
    pub ny: bool,
    pub f: bool,
    pub no: bool,
}

impl AluControl {
    /// Build from six bits laid out `zx nx zy ny f no` (bit 5 = zx, bit 0 = no).
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            zx: bits & 0b100000 != 0,
            nx: bits & 0b010000 != 0,
            zy: bits & 0b001000 != 0,
            ny: bits & 0b000100 != 0,
            f: bits & 0b000010 != 0,
            no: bits & 0b000001 != 0,
        }
    }

    /// Pack into six bits, inverse of [`AluControl::from_bits`].
    pub const fn bits(self) -> u8 {
        (self.zx as u8) << 5
            | (self.nx as u8) << 4
            | (self.zy as u8) << 3
            | (self.ny as u8) << 2
            | (self.f as u8) << 1
            | (self.no as u8)
    }
}

/// ALU result and status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AluOutput {
    /// The computed value.
    pub out: Word,
    /// Set when `out` is zero.
    pub zr: bool,
    /// Set when `out` is negative (bit 15 set).
    pub ng: bool,
}

/// Evaluate the ALU.
pub fn alu(x: Word, y: Word, control: AluControl) -> AluOutput {
    let x = gates::mux16(x, Word::zero(), control.zx);
    let x = gates::mux16(x, gates::not16(x), control.nx);
    let y = gates::mux16(y, Word::zero(), control.zy);
    let y = gates::mux16(y, gates::not16(y), control.ny);

    let sum = Word::new(x.bits().wrapping_add(y.bits()));
    let out = gates::mux16(gates::and16(x, y), sum, control.f);
    let out = gates::mux16(out, gates::not16(out), control.no);

    AluOutput {
        out,
        zr: out.is_zero(),
        ng: out.is_negative(),
    }
}
