//! Mnemonic tables for the compute-instruction fields.
//!
//! Each table maps assembly text to the field it encodes and back. The
//! reverse lookups return `None` for bit patterns that have no mnemonic.

use crate::cpu::{Dest, Jump};
use crate::logic::AluControl;

/// `(mnemonic, a-bit, zx nx zy ny f no)` for every documented computation.
const COMP_TABLE: [(&str, bool, u8); 28] = [
    ("0", false, 0b101010),
    ("1", false, 0b111111),
    ("-1", false, 0b111010),
    ("D", false, 0b001100),
    ("A", false, 0b110000),
    ("!D", false, 0b001101),
    ("!A", false, 0b110001),
    ("-D", false, 0b001111),
    ("-A", false, 0b110011),
    ("D+1", false, 0b011111),
    ("A+1", false, 0b110111),
    ("D-1", false, 0b001110),
    ("A-1", false, 0b110010),
    ("D+A", false, 0b000010),
    ("D-A", false, 0b010011),
    ("A-D", false, 0b000111),
    ("D&A", false, 0b000000),
    ("D|A", false, 0b010101),
    ("M", true, 0b110000),
    ("!M", true, 0b110001),
    ("-M", true, 0b110011),
    ("M+1", true, 0b110111),
    ("M-1", true, 0b110010),
    ("D+M", true, 0b000010),
    ("D-M", true, 0b010011),
    ("M-D", true, 0b000111),
    ("D&M", true, 0b000000),
    ("D|M", true, 0b010101),
];

const JUMP_TABLE: [&str; 8] = ["", "JGT", "JEQ", "JGE", "JLT", "JNE", "JLE", "JMP"];

/// Look up a computation: returns the a-bit and the ALU control lines.
pub fn comp(mnemonic: &str) -> Option<(bool, AluControl)> {
    COMP_TABLE
        .iter()
        .find(|(text, _, _)| *text == mnemonic)
        .map(|&(_, use_memory, bits)| (use_memory, AluControl::from_bits(bits)))
}

/// Reverse of [`comp`].
pub fn comp_mnemonic(use_memory: bool, control: AluControl) -> Option<&'static str> {
    let bits = control.bits();
    COMP_TABLE
        .iter()
        .find(|&&(_, a, b)| a == use_memory && b == bits)
        .map(|(text, _, _)| *text)
}

/// Parse a destination: any arrangement of `A`, `D` and `M`, each at most
/// once. The empty string and `null` mean no destination.
pub fn dest(mnemonic: &str) -> Option<Dest> {
    if mnemonic == "null" {
        return Some(Dest::NONE);
    }

    let mut dest = Dest::NONE;
    for c in mnemonic.chars() {
        let slot = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return None,
        };
        if *slot {
            return None;
        }
        *slot = true;
    }

    Some(dest)
}

/// Canonical destination text (`AMD` order), empty when there is none.
pub fn dest_mnemonic(dest: Dest) -> String {
    let mut out = String::with_capacity(3);
    if dest.a {
        out.push('A');
    }
    if dest.m {
        out.push('M');
    }
    if dest.d {
        out.push('D');
    }
    out
}

/// Parse a jump condition. The empty string and `null` mean never.
pub fn jump(mnemonic: &str) -> Option<Jump> {
    if mnemonic == "null" {
        return Some(Jump::NEVER);
    }

    JUMP_TABLE
        .iter()
        .position(|&text| text == mnemonic)
        .map(|bits| Jump::from_bits(bits as u8))
}

/// Jump mnemonic, empty when the jump is never taken.
pub fn jump_mnemonic(jump: Jump) -> &'static str {
    JUMP_TABLE[usize::from(jump.bits() & 0b111)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_lookup() {
        let (use_memory, control) = comp("D+M").unwrap();
        assert!(use_memory);
        assert_eq!(control.bits(), 0b000010);

        let (use_memory, control) = comp("-1").unwrap();
        assert!(!use_memory);
        assert_eq!(control.bits(), 0b111010);

        assert!(comp("D*A").is_none());
        assert!(comp("A+M").is_none());
    }

    #[test]
    fn test_comp_table_is_reversible() {
        for (text, a, bits) in COMP_TABLE {
            assert_eq!(comp_mnemonic(a, AluControl::from_bits(bits)), Some(text));
        }
        // zx alone: x zeroed, then ANDed with y
        assert_eq!(comp_mnemonic(false, AluControl::from_bits(0b100000)), None);
    }

    #[test]
    fn test_dest_lookup() {
        assert_eq!(dest("null"), Some(Dest::NONE));
        assert_eq!(dest(""), Some(Dest::NONE));
        assert_eq!(dest("AMD"), Some(Dest { a: true, d: true, m: true }));
        assert_eq!(dest("DM"), dest("MD"));
        assert_eq!(dest("MM"), None);
        assert_eq!(dest("X"), None);
        assert_eq!(dest_mnemonic(Dest { a: true, d: false, m: true }), "AM");
    }

    #[test]
    fn test_jump_lookup() {
        assert_eq!(jump(""), Some(Jump::NEVER));
        assert_eq!(jump("JMP"), Some(Jump::ALWAYS));
        assert_eq!(jump("JGE"), Some(Jump { lt: false, eq: true, gt: true }));
        assert_eq!(jump("JNE"), Some(Jump { lt: true, eq: false, gt: true }));
        assert_eq!(jump("JXX"), None);

        for bits in 0..8u8 {
            let j = Jump::from_bits(bits);
            let text = jump_mnemonic(j);
            assert_eq!(jump(text), Some(j));
        }
    }
}
