//! Instruction memory.
//!
//! The ROM is written once by the host when a program is loaded and is
//! read-only from the CPU's point of view.

use crate::logic::{Address, Word, ADDRESS_MASK};
use crate::memory::MemoryError;
use serde::{Serialize, Deserialize};

/// The number of instruction words the PC can address.
pub const ROM_SIZE: usize = 32768;

/// Read-only instruction memory: 32K words.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rom {
    words: Vec<Word>,
}

impl Rom {
    /// Create an empty ROM (every word reads as zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Burn a program image starting at address 0.
    pub fn from_program(program: &[Word]) -> Result<Self, MemoryError> {
        if program.len() > ROM_SIZE {
            return Err(MemoryError::ImageTooLarge {
                size: program.len(),
                available: ROM_SIZE,
            });
        }

        Ok(Self {
            words: program.to_vec(),
        })
    }

    /// Combinational read. Words past the end of the program read as zero.
    #[inline]
    pub fn read(&self, address: Address) -> Word {
        self.words
            .get(usize::from(address & ADDRESS_MASK))
            .copied()
            .unwrap_or_default()
    }

    /// The loaded program.
    pub fn program(&self) -> &[Word] {
        &self.words
    }

    /// Number of words in the loaded program.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if no program is loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl std::fmt::Debug for Rom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rom")
            .field("program_words", &self.words.len())
            .field("total_words", &ROM_SIZE)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_reads_program() {
        let rom = Rom::from_program(&[Word::new(1), Word::new(2)]).unwrap();
        assert_eq!(rom.len(), 2);
        assert_eq!(rom.read(0).bits(), 1);
        assert_eq!(rom.read(1).bits(), 2);
        assert_eq!(rom.read(2), Word::zero());
        assert_eq!(rom.read(0x7FFF), Word::zero());
    }

    #[test]
    fn test_rom_rejects_oversized_program() {
        let program = vec![Word::zero(); ROM_SIZE + 1];
        assert_eq!(
            Rom::from_program(&program),
            Err(MemoryError::ImageTooLarge { size: ROM_SIZE + 1, available: ROM_SIZE })
        );
    }
}
