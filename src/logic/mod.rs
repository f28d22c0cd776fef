//! Binary logic primitives for the Hack machine.
//!
//! This module provides the combinational building blocks everything else
//! is wired from:
//! - [`Word`] - A 16-bit machine word (registers, memory cells, instructions)
//! - [`gates`] - NOT/AND/OR/MUX/DMUX at 1-bit and 16-bit width, plus 8-way fan-out
//! - [`alu`] - The arithmetic-logic unit, a pure function of two words and 6 control bits

mod word;
pub mod gates;
pub mod alu;

pub use word::{Word, Address, ADDRESS_MASK, ParseError};
pub use alu::{alu, AluControl, AluOutput};
