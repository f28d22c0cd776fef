//! Assembler and disassembler for Hack programs.
//!
//! This module provides:
//! - A two-pass assembler (`.asm` text → machine words)
//! - A disassembler (machine words → readable text)
//! - The `.hack` text format for assembled programs

pub mod code;
pub mod symbols;
pub mod assembler;
pub mod disasm;
pub mod hackfile;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_instruction};
pub use hackfile::{HackFile, HackFileError, load_hack, save_hack, parse_hack};
pub use symbols::SymbolTable;
