//! Hack CPU registers.
//!
//! The CPU has 3 clocked registers:
//! - A: 16-bit address/data register (also drives the memory address bus)
//! - D: 16-bit data register
//! - PC: 15-bit program counter
//!
//! Every register exposes its current value combinationally through `out()`
//! and changes only on `tick()`, the clock edge.

use crate::logic::{gates, Word, Address, ADDRESS_MASK};
use serde::{Serialize, Deserialize};

/// A 16-bit clocked storage primitive.
///
/// Samples its input on the clock edge when `load` is asserted and holds its
/// value otherwise. This is also the leaf of every RAM tree.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Register {
    value: Word,
}

impl Register {
    /// Create a register holding zero.
    pub const fn new() -> Self {
        Self { value: Word::zero() }
    }

    /// The value currently held.
    #[inline]
    pub const fn out(&self) -> Word {
        self.value
    }

    /// Clock edge.
    #[inline]
    pub fn tick(&mut self, input: Word, load: bool) {
        self.value = gates::mux16(self.value, input, load);
    }
}

impl std::fmt::Debug for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.value, self.value.to_i16())
    }
}

/// The 15-bit program counter.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramCounter {
    value: Address,
}

impl ProgramCounter {
    /// Create a counter at address 0.
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// The address of the instruction to fetch this cycle.
    #[inline]
    pub const fn out(&self) -> Address {
        self.value
    }

    /// The value the counter will hold after the next edge.
    ///
    /// Priority: `reset` > `load` > `inc`. With none asserted the value holds.
    /// Incrementing past the top of the 15-bit space wraps to 0.
    pub const fn next(&self, input: Address, load: bool, inc: bool, reset: bool) -> Address {
        let value = if reset {
            0
        } else if load {
            input
        } else if inc {
            self.value.wrapping_add(1)
        } else {
            self.value
        };
        value & ADDRESS_MASK
    }

    /// Clock edge.
    pub fn tick(&mut self, input: Address, load: bool, inc: bool, reset: bool) {
        self.value = self.next(input, load, inc, reset);
    }

    /// Set the counter directly (host-side, e.g. when loading a debugger state).
    pub fn jump(&mut self, addr: Address) {
        self.value = addr & ADDRESS_MASK;
    }
}

impl std::fmt::Debug for ProgramCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PC={}", self.value)
    }
}

/// The Hack register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: address register, also an ALU operand and the jump target
    pub a: Register,

    /// D: data register, always the ALU's first operand
    pub d: Register,

    /// PC: address of the next instruction
    pub pc: ProgramCounter,
}

impl Registers {
    /// Create a register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// The memory address currently driven by A (its low 15 bits).
    #[inline]
    pub fn address(&self) -> Address {
        self.a.out().address()
    }
}
