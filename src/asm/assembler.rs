//! Two-pass Hack assembler.
//!
//! Syntax:
//! ```text
//! // Comment
//! (LOOP)          // Label: binds the address of the next instruction
//!     @i          // Address-instruction: literal, label or variable
//!     M=M+1       // dest=comp
//!     D;JGT       // comp;jump
//!     AM=M-1;JNE  // dest=comp;jump
//! ```
//!
//! Whitespace is ignored everywhere, so `D = D + A` is the same as `D=D+A`.
//! Symbols that are neither predefined nor labels become variables,
//! allocated from RAM address 16 in order of first use.

use crate::asm::code;
use crate::asm::symbols::{is_valid_symbol, SymbolError, SymbolTable};
use crate::cpu::decode::encode;
use crate::cpu::Instruction;
use crate::logic::{Word, ADDRESS_MASK};
use crate::memory::rom::ROM_SIZE;
use thiserror::Error;

/// Assemble source code to machine words.
pub fn assemble(source: &str) -> Result<Vec<Word>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// A source line with comments and whitespace stripped.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Label(&'a str),
    Address(&'a str),
    Compute(&'a str),
}

/// The assembler state.
struct Assembler {
    /// Symbol table (predefined, labels, variables).
    symbols: SymbolTable,
    /// Output instructions.
    output: Vec<Word>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<Word>, AssemblerError> {
        let lines: Vec<(usize, String)> = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, clean(line)))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        // Pass 1: bind labels to ROM addresses
        let mut rom_addr = 0usize;
        for (line_num, text) in &lines {
            match classify(text, *line_num)? {
                Line::Label(label) => self.define_label(label, rom_addr, *line_num)?,
                Line::Address(_) | Line::Compute(_) => rom_addr += 1,
            }
        }

        if rom_addr > ROM_SIZE {
            return Err(AssemblerError::ProgramTooLarge { size: rom_addr });
        }

        // Pass 2: encode
        for (line_num, text) in &lines {
            let instr = match classify(text, *line_num)? {
                Line::Label(_) => continue,
                Line::Address(value) => self.parse_address(value, *line_num)?,
                Line::Compute(body) => parse_compute(body, *line_num)?,
            };
            self.output.push(encode(&instr));
        }

        tracing::debug!(
            instructions = self.output.len(),
            variables = self.symbols.variable_count(),
            "assembled program"
        );

        Ok(std::mem::take(&mut self.output))
    }

    fn define_label(&mut self, label: &str, address: usize, line_num: usize) -> Result<(), AssemblerError> {
        if !is_valid_symbol(label) {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("invalid label name '{}'", label),
            });
        }

        // Labels past the end of ROM are caught by the size check.
        let address = (address & usize::from(ADDRESS_MASK)) as u16;
        self.symbols
            .define_label(label, address)
            .map_err(|e| symbol_error(e, line_num))
    }

    fn parse_address(&mut self, value: &str, line_num: usize) -> Result<Instruction, AssemblerError> {
        if value.is_empty() {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: "'@' requires a value".into(),
            });
        }

        if value.chars().all(|c| c.is_ascii_digit()) {
            return match value.parse::<u16>() {
                Ok(n) if n <= ADDRESS_MASK => Ok(Instruction::Address(n)),
                _ => Err(AssemblerError::ValueOutOfRange {
                    line: line_num,
                    value: value.to_string(),
                }),
            };
        }

        if !is_valid_symbol(value) {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("invalid symbol '{}'", value),
            });
        }

        let address = self
            .symbols
            .resolve(value)
            .map_err(|e| symbol_error(e, line_num))?;
        Ok(Instruction::Address(address))
    }
}

/// Strip the comment and every whitespace character.
fn clean(line: &str) -> String {
    let text = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn classify(text: &str, line_num: usize) -> Result<Line<'_>, AssemblerError> {
    if let Some(rest) = text.strip_prefix('(') {
        return rest
            .strip_suffix(')')
            .map(Line::Label)
            .ok_or_else(|| AssemblerError::SyntaxError {
                line: line_num,
                message: "unterminated label".into(),
            });
    }

    if let Some(value) = text.strip_prefix('@') {
        return Ok(Line::Address(value));
    }

    Ok(Line::Compute(text))
}

fn parse_compute(body: &str, line_num: usize) -> Result<Instruction, AssemblerError> {
    let (dest_text, rest) = match body.split_once('=') {
        Some(("", _)) => {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("missing destination before '=' in '{}'", body),
            });
        }
        Some((dest, rest)) => (dest, rest),
        None => ("", body),
    };

    let (comp_text, jump_text) = match rest.split_once(';') {
        Some((_, "")) => {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("missing jump after ';' in '{}'", body),
            });
        }
        Some((comp, jump)) => (comp, jump),
        None => (rest, ""),
    };

    let dest = code::dest(dest_text).ok_or_else(|| AssemblerError::UnknownDest {
        line: line_num,
        mnemonic: dest_text.to_string(),
    })?;

    let (use_memory, control) = code::comp(comp_text).ok_or_else(|| AssemblerError::UnknownComp {
        line: line_num,
        mnemonic: comp_text.to_string(),
    })?;

    let jump = code::jump(jump_text).ok_or_else(|| AssemblerError::UnknownJump {
        line: line_num,
        mnemonic: jump_text.to_string(),
    })?;

    Ok(Instruction::Compute {
        use_memory,
        control,
        dest,
        jump,
    })
}

fn symbol_error(err: SymbolError, line_num: usize) -> AssemblerError {
    match err {
        SymbolError::Duplicate(label) => AssemblerError::DuplicateLabel { line: line_num, label },
        SymbolError::RamFull(symbol) => AssemblerError::RamFull { line: line_num, symbol },
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown computation on line {line}: '{mnemonic}'")]
    UnknownComp { line: usize, mnemonic: String },

    #[error("unknown destination on line {line}: '{mnemonic}'")]
    UnknownDest { line: usize, mnemonic: String },

    #[error("unknown jump on line {line}: '{mnemonic}'")]
    UnknownJump { line: usize, mnemonic: String },

    #[error("duplicate label on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value} (max 32767)")]
    ValueOutOfRange { line: usize, value: String },

    #[error("no RAM left for variable on line {line}: {symbol}")]
    RamFull { line: usize, symbol: String },

    #[error("program has {size} instructions, ROM holds 32768")]
    ProgramTooLarge { size: usize },
}
