//! Hack memory subsystem.
//!
//! Data memory is a tree of 8-way fan-outs with single registers at the
//! leaves. Every level consumes the 3 most significant bits of the address
//! it receives and passes the rest down unchanged, so an N-word block is
//! exactly eight N/8-word blocks behind one demultiplexor/multiplexor pair.
//!
//! Instruction memory is a separate read-only [`Rom`].

pub mod ram;
pub mod rom;

pub use ram::{Fanout, Ram8, Ram64, Ram512, Ram4K, Ram32K};
pub use rom::Rom;

use crate::logic::{Address, Word};
use thiserror::Error;

/// Width of the CPU's address bus.
pub const MAX_ADDRESS_BITS: u32 = 15;

/// Memory-mapped I/O conventions used by client programs.
///
/// The CPU gives none of these addresses special treatment; they are
/// ordinary RAM words.
pub mod map {
    use crate::logic::Address;

    /// First word of the screen region.
    pub const SCREEN: Address = 0x4000;
    /// Screen width in pixels.
    pub const SCREEN_WIDTH: usize = 512;
    /// Screen height in pixels.
    pub const SCREEN_HEIGHT: usize = 256;
    /// Number of 16-pixel words in the screen region.
    pub const SCREEN_WORDS: usize = SCREEN_WIDTH * SCREEN_HEIGHT / 16;
    /// The keyboard word.
    pub const KBD: Address = 0x6000;
}

/// An addressable block of 16-bit words with clocked writes.
pub trait MemoryBlock: Sized {
    /// Number of address bits this block decodes.
    const ADDRESS_BITS: u32;

    /// Number of words held.
    const CAPACITY: usize = 1 << Self::ADDRESS_BITS;

    /// Create a block with every word zeroed.
    fn new() -> Self;

    /// Combinational read. Address bits above `ADDRESS_BITS` are not wired.
    fn read(&self, address: Address) -> Word;

    /// Clock edge: the addressed word samples `input` when `load` is asserted.
    fn tick(&mut self, address: Address, input: Word, load: bool);

    /// Host-side bounds-checked read.
    fn peek(&self, address: usize) -> Result<Word, MemoryError> {
        check_address::<Self>(address)?;
        Ok(self.read(address as Address))
    }

    /// Host-side bounds-checked write, committed immediately.
    fn poke(&mut self, address: usize, value: Word) -> Result<(), MemoryError> {
        check_address::<Self>(address)?;
        self.tick(address as Address, value, true);
        Ok(())
    }

    /// Write a contiguous image starting at `base`.
    fn load_image(&mut self, base: usize, image: &[Word]) -> Result<(), MemoryError> {
        let available = Self::CAPACITY.saturating_sub(base);
        if image.len() > available {
            return Err(MemoryError::ImageTooLarge {
                size: image.len(),
                available,
            });
        }

        for (offset, &word) in image.iter().enumerate() {
            self.tick((base + offset) as Address, word, true);
        }

        Ok(())
    }

    /// Dump a range of words (for debugging). The range is clipped to capacity.
    fn dump(&self, start: usize, count: usize) -> Vec<(usize, Word)> {
        let end = start.saturating_add(count).min(Self::CAPACITY);
        (start..end)
            .map(|i| (i, self.read(i as Address)))
            .collect()
    }
}

/// Mask covering the address bits a block decodes.
#[inline]
pub(crate) fn address_mask<B: MemoryBlock>() -> Address {
    ((1u32 << B::ADDRESS_BITS) - 1) as Address
}

fn check_address<B: MemoryBlock>(address: usize) -> Result<(), MemoryError> {
    if address >= B::CAPACITY {
        return Err(MemoryError::AddressOutOfRange {
            address,
            capacity: B::CAPACITY,
        });
    }
    Ok(())
}

/// Errors that can occur during host-side memory access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside the block's capacity.
    #[error("memory address {address} out of range (capacity {capacity})")]
    AddressOutOfRange { address: usize, capacity: usize },

    /// Image does not fit in the space after its base address.
    #[error("image size {size} exceeds available space {available}")]
    ImageTooLarge { size: usize, available: usize },
}
