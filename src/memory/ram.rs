//! Recursive RAM.
//!
//! [`Fanout<B>`] holds eight blocks of type `B` and adds 3 address bits.
//! A single [`Register`] is the leaf, decoding no address bits at all:
//!
//! | type      | children       | address bits | words  |
//! |-----------|----------------|--------------|--------|
//! | `Ram8`    | 8 × `Register` | 3            | 8      |
//! | `Ram64`   | 8 × `Ram8`     | 6            | 64     |
//! | `Ram512`  | 8 × `Ram64`    | 9            | 512    |
//! | `Ram4K`   | 8 × `Ram512`   | 12           | 4096   |
//! | `Ram32K`  | 8 × `Ram4K`    | 15           | 32768  |
//!
//! The address width is derived from the child type, so a tree whose width
//! disagrees with its capacity cannot be written down. Stacking past the
//! 15-bit address bus fails to compile.

use crate::cpu::Register;
use crate::logic::{gates, Address, Word};
use crate::memory::{address_mask, MemoryBlock, MAX_ADDRESS_BITS};
use serde::{Serialize, Deserialize};

/// 8 words.
pub type Ram8 = Fanout<Register>;
/// 64 words.
pub type Ram64 = Fanout<Ram8>;
/// 512 words.
pub type Ram512 = Fanout<Ram64>;
/// 4096 words.
pub type Ram4K = Fanout<Ram512>;
/// 32768 words: the full data address space.
pub type Ram32K = Fanout<Ram4K>;

impl MemoryBlock for Register {
    const ADDRESS_BITS: u32 = 0;

    fn new() -> Self {
        Register::new()
    }

    #[inline]
    fn read(&self, _address: Address) -> Word {
        self.out()
    }

    #[inline]
    fn tick(&mut self, _address: Address, input: Word, load: bool) {
        Register::tick(self, input, load);
    }
}

/// Eight child blocks behind an 8-way demultiplexor (write) and
/// multiplexor (read).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fanout<B> {
    children: Box<[B; 8]>,
}

impl<B: MemoryBlock> Fanout<B> {
    /// Split an address into the child selector (top 3 bits) and the
    /// address forwarded to that child (remaining bits).
    #[inline]
    fn split(address: Address) -> (u8, Address) {
        let sel = ((address >> B::ADDRESS_BITS) & 0b111) as u8;
        (sel, address & address_mask::<B>())
    }

    /// The child blocks, in selector order.
    pub fn children(&self) -> &[B; 8] {
        &self.children
    }
}

impl<B: MemoryBlock> MemoryBlock for Fanout<B> {
    const ADDRESS_BITS: u32 = {
        let bits = B::ADDRESS_BITS + 3;
        assert!(bits <= MAX_ADDRESS_BITS, "memory tree is wider than the address bus");
        bits
    };

    fn new() -> Self {
        Self {
            children: Box::new(std::array::from_fn(|_| B::new())),
        }
    }

    fn read(&self, address: Address) -> Word {
        let (sel, low) = Self::split(address & address_mask::<Self>());
        gates::mux8way(&*self.children, sel).read(low)
    }

    fn tick(&mut self, address: Address, input: Word, load: bool) {
        let (sel, low) = Self::split(address & address_mask::<Self>());
        let loads = gates::dmux8way(load, sel);

        // A child whose load line is low holds its value through the edge.
        for (child, load) in self.children.iter_mut().zip(loads) {
            if load {
                child.tick(low, input, true);
            }
        }
    }
}

impl<B: MemoryBlock> Default for Fanout<B> {
    fn default() -> Self {
        <Self as MemoryBlock>::new()
    }
}

impl<B: MemoryBlock> std::fmt::Debug for Fanout<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self
            .dump(0, Self::CAPACITY)
            .iter()
            .filter(|(_, word)| !word.is_zero())
            .count();

        f.debug_struct("Fanout")
            .field("address_bits", &Self::ADDRESS_BITS)
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &Self::CAPACITY)
            .finish()
    }
}
