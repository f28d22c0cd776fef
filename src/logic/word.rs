//! Fixed-width binary words.
//!
//! The Hack machine has a single word size: 16 bits. Addresses are the low
//! 15 bits of a word, which is why bit 15 of an address-instruction is free
//! to act as the instruction tag.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A memory or instruction address. Only the low 15 bits are significant.
pub type Address = u16;

/// Mask selecting the 15 address bits of a word.
pub const ADDRESS_MASK: u16 = 0x7FFF;

/// A 16-bit word.
///
/// Used for:
/// - The A and D registers
/// - Every RAM and ROM cell
/// - Instructions, before they are decoded
///
/// Bits are numbered from least significant (bit 0) to most significant (bit 15).
/// Arithmetic interprets the word as two's complement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(u16);

impl Word {
    /// Number of bits in a word.
    pub const WIDTH: usize = 16;

    /// All bits clear.
    pub const ZERO: Word = Word(0);

    /// All bits set (-1 in two's complement).
    pub const ONES: Word = Word(0xFFFF);

    /// Create a word from its raw bits.
    #[inline]
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Create a zero word.
    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the raw bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Get a single bit by index (0 = LSB).
    #[inline]
    pub const fn bit(self, index: usize) -> bool {
        (self.0 >> index) & 1 == 1
    }

    /// Return a copy with one bit replaced.
    #[inline]
    pub const fn with_bit(self, index: usize, value: bool) -> Self {
        if value {
            Self(self.0 | (1 << index))
        } else {
            Self(self.0 & !(1 << index))
        }
    }

    /// Interpret as a two's complement integer.
    #[inline]
    pub const fn to_i16(self) -> i16 {
        self.0 as i16
    }

    /// Create from a two's complement integer.
    #[inline]
    pub const fn from_i16(value: i16) -> Self {
        Self(value as u16)
    }

    /// Check if every bit is clear.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check the sign bit (bit 15).
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.bit(15)
    }

    /// The low 15 bits, as driven onto an address bus.
    #[inline]
    pub const fn address(self) -> Address {
        self.0 & ADDRESS_MASK
    }

    /// Parse from a 16-character binary string, MSB first (e.g. "0000000000000101").
    ///
    /// An optional `0b` prefix and `_` digit separators are accepted.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        let s = s.strip_prefix("0b").unwrap_or(s);

        let mut bits: u16 = 0;
        let mut count = 0usize;
        for c in s.chars().filter(|&c| c != '_') {
            let bit = match c {
                '0' => 0,
                '1' => 1,
                _ => return Err(ParseError::InvalidChar(c)),
            };
            count += 1;
            bits = bits.wrapping_shl(1) | bit;
        }

        if count != Self::WIDTH {
            return Err(ParseError::WrongLength { expected: Self::WIDTH, got: count });
        }

        Ok(Self(bits))
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0b{:016b} = {})", self.0, self.to_i16())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

impl From<u16> for Word {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<Word> for u16 {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl From<i16> for Word {
    fn from(value: i16) -> Self {
        Self::from_i16(value)
    }
}

/// Errors that can occur when parsing binary strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input string had the wrong number of binary digits.
    #[error("expected {expected} binary digits, found {got}")]
    WrongLength { expected: usize, got: usize },
    /// A character other than 0 or 1 was encountered.
    #[error("invalid binary digit {0:?}")]
    InvalidChar(char),
}
