//! Disassembler for Hack programs.
//!
//! Converts machine words back to assembly text. Every word decodes, so
//! this never fails; ALU patterns with no mnemonic are printed as raw
//! control bits.

use crate::asm::code;
use crate::cpu::decode::decode;
use crate::cpu::Instruction;
use crate::logic::Word;

/// Disassemble a single instruction to text.
pub fn disassemble_instruction(word: Word) -> String {
    format_instruction(&decode(word))
}

/// Disassemble a program as a listing: address, text, binary.
pub fn disassemble(program: &[Word]) -> String {
    let mut output = String::new();
    output.push_str("// Hack disassembly\n");
    output.push_str("// -----------------\n\n");

    for (addr, word) in program.iter().enumerate() {
        let line = disassemble_instruction(*word);
        output.push_str(&format!("{:<16} // {:05}: {}\n", line, addr, word));
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::Address(value) => format!("@{}", value),
        Instruction::Compute {
            use_memory,
            control,
            dest,
            jump,
        } => {
            let comp = match code::comp_mnemonic(use_memory, control) {
                Some(text) => text.to_string(),
                None => format!("alu[a={} {:06b}]", use_memory as u8, control.bits()),
            };

            let mut text = String::new();
            if !dest.is_empty() {
                text.push_str(&code::dest_mnemonic(dest));
                text.push('=');
            }
            text.push_str(&comp);
            let jump = code::jump_mnemonic(jump);
            if !jump.is_empty() {
                text.push(';');
                text.push_str(jump);
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;

    #[test]
    fn test_disassemble_address() {
        assert_eq!(disassemble_instruction(Word::new(21)), "@21");
        assert_eq!(disassemble_instruction(Word::new(0x7FFF)), "@32767");
    }

    #[test]
    fn test_disassemble_compute() {
        let source = "D=A\nAM=M-1;JNE\n0;JMP\nMD=D|M\nD;JLE";
        let program = assemble(source).unwrap();
        let text: Vec<_> = program.iter().map(|w| disassemble_instruction(*w)).collect();
        assert_eq!(text, vec!["D=A", "AM=M-1;JNE", "0;JMP", "MD=D|M", "D;JLE"]);
    }

    #[test]
    fn test_disassemble_unknown_alu_pattern() {
        // zx only, a=0, dest D
        let word = Word::parse("1110100000010000").unwrap();
        assert_eq!(disassemble_instruction(word), "D=alu[a=0 100000]");
    }

    #[test]
    fn test_listing_reassembles() {
        let source = "@5\nD=A\n@16\nM=D\n@0\n0;JMP";
        let program = assemble(source).unwrap();
        let listing = disassemble(&program);
        assert!(listing.contains("00001: 1110110000010000"));
        assert_eq!(assemble(&listing).unwrap(), program);
    }
}
