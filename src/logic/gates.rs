//! Combinational gates.
//!
//! Every function here is pure and has zero propagation delay in the model.
//! Wider components are wired from these so that the datapath reads the way
//! the hardware is drawn.

use crate::logic::Word;

/// 1-bit NOT.
#[inline]
pub const fn not(a: bool) -> bool {
    !a
}

/// 1-bit AND.
#[inline]
pub const fn and(a: bool, b: bool) -> bool {
    a & b
}

/// 1-bit OR.
#[inline]
pub const fn or(a: bool, b: bool) -> bool {
    a | b
}

/// 1-bit multiplexor: `a` when `sel` is low, `b` when high.
#[inline]
pub const fn mux(a: bool, b: bool, sel: bool) -> bool {
    if sel { b } else { a }
}

/// 1-bit demultiplexor: routes `input` to the first output when `sel` is low,
/// to the second when high. The other output is low.
#[inline]
pub const fn dmux(input: bool, sel: bool) -> (bool, bool) {
    (and(input, not(sel)), and(input, sel))
}

/// 16-bit NOT.
#[inline]
pub const fn not16(a: Word) -> Word {
    Word::new(!a.bits())
}

/// 16-bit AND.
#[inline]
pub const fn and16(a: Word, b: Word) -> Word {
    Word::new(a.bits() & b.bits())
}

/// 16-bit OR.
#[inline]
pub const fn or16(a: Word, b: Word) -> Word {
    Word::new(a.bits() | b.bits())
}

/// 16-bit multiplexor: `a` when `sel` is low, `b` when high.
#[inline]
pub const fn mux16(a: Word, b: Word, sel: bool) -> Word {
    if sel { b } else { a }
}

/// 8-way fan-in over arbitrary inputs. Only the low 3 bits of `sel` are wired.
///
/// Returns the selected input by reference, so a caller can fan in over
/// whole sub-components without evaluating the seven unselected ones.
#[inline]
pub fn mux8way<T>(inputs: &[T; 8], sel: u8) -> &T {
    &inputs[usize::from(sel & 0b111)]
}

/// 8-way 16-bit multiplexor.
#[inline]
pub fn mux8way16(inputs: [Word; 8], sel: u8) -> Word {
    *mux8way(&inputs, sel)
}

/// 8-way demultiplexor. At most one output is high: the one selected by the
/// low 3 bits of `sel`, and only when `input` is high.
pub fn dmux8way(input: bool, sel: u8) -> [bool; 8] {
    let (lo, hi) = dmux(input, sel & 0b100 != 0);
    let (lo_lo, lo_hi) = dmux(lo, sel & 0b010 != 0);
    let (hi_lo, hi_hi) = dmux(hi, sel & 0b010 != 0);
    let low_bit = sel & 0b001 != 0;
    let (a, b) = dmux(lo_lo, low_bit);
    let (c, d) = dmux(lo_hi, low_bit);
    let (e, f) = dmux(hi_lo, low_bit);
    let (g, h) = dmux(hi_hi, low_bit);
    [a, b, c, d, e, f, g, h]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_dmux_truth_tables() {
        for a in [false, true] {
            for b in [false, true] {
                assert_eq!(mux(a, b, false), a);
                assert_eq!(mux(a, b, true), b);
            }
            assert_eq!(dmux(a, false), (a, false));
            assert_eq!(dmux(a, true), (false, a));
        }
    }

    #[test]
    fn test_word_gates() {
        let a = Word::new(0b1100);
        let b = Word::new(0b1010);
        assert_eq!(and16(a, b).bits(), 0b1000);
        assert_eq!(or16(a, b).bits(), 0b1110);
        assert_eq!(not16(Word::zero()), Word::ONES);
        assert_eq!(mux16(a, b, false), a);
        assert_eq!(mux16(a, b, true), b);
    }

    #[test]
    fn test_dmux8way_selects_exactly_one() {
        for sel in 0..8u8 {
            let outputs = dmux8way(true, sel);
            for (i, out) in outputs.iter().enumerate() {
                assert_eq!(*out, i == sel as usize, "sel={} output={}", sel, i);
            }
            assert_eq!(dmux8way(false, sel), [false; 8]);
        }
    }

    #[test]
    fn test_mux8way16_selects_input() {
        let inputs: [Word; 8] = std::array::from_fn(|i| Word::new(100 + i as u16));
        for sel in 0..8u8 {
            assert_eq!(mux8way16(inputs, sel).bits(), 100 + sel as u16);
        }
        // Only the low three selector bits are wired.
        assert_eq!(mux8way16(inputs, 0b1010).bits(), 102);
    }
}
