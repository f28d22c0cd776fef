//! CPU emulation for the Hack computer.
//!
//! This module implements the Hack CPU:
//! - 3 clocked registers: A (address/data), D (data), PC (15-bit program counter)
//! - Two instruction forms: address-instructions and compute-instructions
//! - One instruction per cycle, split into a combinational phase and a clock edge

pub mod registers;
pub mod decode;
pub mod datapath;

pub use registers::{Register, ProgramCounter, Registers};
pub use decode::{Instruction, Dest, Jump};
pub use datapath::{Cpu, CpuInput, CpuOutput, Signals};
