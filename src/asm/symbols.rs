//! Assembler symbol table.

use crate::memory::map;
use std::collections::HashMap;
use thiserror::Error;

/// First RAM address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

/// Variables stop short of the screen region.
pub const VARIABLE_LIMIT: u16 = map::SCREEN;

const PREDEFINED: [(&str, u16); 23] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", map::SCREEN),
    ("KBD", map::KBD),
];

/// Maps label and variable names to addresses.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    /// A table holding only the predefined symbols.
    pub fn new() -> Self {
        Self {
            symbols: PREDEFINED
                .iter()
                .map(|&(name, address)| (name.to_string(), address))
                .collect(),
            next_variable: VARIABLE_BASE,
        }
    }

    /// Bind a label to a ROM address.
    pub fn define_label(&mut self, name: &str, address: u16) -> Result<(), SymbolError> {
        if self.symbols.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }
        self.symbols.insert(name.to_string(), address);
        Ok(())
    }

    /// Address of a known symbol, or a freshly allocated variable.
    pub fn resolve(&mut self, name: &str) -> Result<u16, SymbolError> {
        if let Some(&address) = self.symbols.get(name) {
            return Ok(address);
        }

        if self.next_variable >= VARIABLE_LIMIT {
            return Err(SymbolError::RamFull(name.to_string()));
        }

        let address = self.next_variable;
        self.next_variable += 1;
        self.symbols.insert(name.to_string(), address);
        tracing::trace!(name, address, "allocated variable");
        Ok(address)
    }

    /// Address of a symbol, without allocating.
    pub fn get(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    /// Check if a symbol is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of variables allocated so far.
    pub fn variable_count(&self) -> usize {
        usize::from(self.next_variable - VARIABLE_BASE)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Symbol table failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol '{0}' is already defined")]
    Duplicate(String),

    #[error("no RAM left for variable '{0}'")]
    RamFull(String),
}

/// True for a legal symbol: letters, digits, `_ . $ :`, not starting with a digit.
pub fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if !c.is_ascii_digit() && is_symbol_char(c) => chars.all(is_symbol_char),
        _ => false,
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined() {
        let table = SymbolTable::new();
        assert_eq!(table.get("SP"), Some(0));
        assert_eq!(table.get("THAT"), Some(4));
        assert_eq!(table.get("R15"), Some(15));
        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("KBD"), Some(24576));
        assert_eq!(table.get("R16"), None);
    }

    #[test]
    fn test_variables_allocate_upward() {
        let mut table = SymbolTable::new();
        assert_eq!(table.resolve("i").unwrap(), 16);
        assert_eq!(table.resolve("sum").unwrap(), 17);
        assert_eq!(table.resolve("i").unwrap(), 16);
        assert_eq!(table.resolve("R3").unwrap(), 3);
        assert_eq!(table.variable_count(), 2);
    }

    #[test]
    fn test_duplicate_label() {
        let mut table = SymbolTable::new();
        table.define_label("LOOP", 4).unwrap();
        assert_eq!(
            table.define_label("LOOP", 9),
            Err(SymbolError::Duplicate("LOOP".to_string()))
        );
        assert!(table.define_label("SP", 1).is_err());
    }

    #[test]
    fn test_ram_full() {
        let mut table = SymbolTable::new();
        for i in VARIABLE_BASE..VARIABLE_LIMIT {
            table.resolve(&format!("v{}", i)).unwrap();
        }
        assert_eq!(
            table.resolve("one_more"),
            Err(SymbolError::RamFull("one_more".to_string()))
        );
    }

    #[test]
    fn test_symbol_syntax() {
        assert!(is_valid_symbol("LOOP"));
        assert!(is_valid_symbol("Main.fib$ret.1"));
        assert!(is_valid_symbol("_x:y"));
        assert!(!is_valid_symbol("1abc"));
        assert!(!is_valid_symbol(""));
        assert!(!is_valid_symbol("a-b"));
    }
}
