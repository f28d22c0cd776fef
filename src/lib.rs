//! # Hack Emulator
//!
//! A gate-level emulator of the Hack computer: a 16-bit CPU with two
//! registers and a program counter, a 32K-word instruction ROM, and a
//! 32K-word data RAM built as a recursive tree of 8-way fan-outs.
//!
//! Every clock cycle is evaluated in two phases: the combinational logic
//! (decoder, ALU, multiplexors, jump logic) settles first, then a single
//! clock edge commits A, D, PC and the addressed memory word together.

pub mod logic;
pub mod cpu;
pub mod memory;
pub mod computer;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use logic::{Word, Address, AluControl, AluOutput};
pub use cpu::{Cpu, CpuInput, CpuOutput, Instruction, Registers, Signals};
pub use memory::{MemoryBlock, MemoryError, Ram32K, Rom};
pub use computer::{Computer, ComputerError, MachineState, RunState};
pub use asm::{assemble, disassemble, AssemblerError, HackFile, HackFileError, load_hack, save_hack};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
