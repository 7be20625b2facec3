//! IUPAC nucleotide ambiguity codes as bitmasks.
//!
//! Each nucleotide owns one bit; an ambiguity code is the union of the
//! nucleotides it stands for. The same masks describe the per-position
//! choices of the mutation space.

use crate::types::NucleotideMask;

pub const MASK_A: NucleotideMask = 1;
pub const MASK_C: NucleotideMask = 2;
pub const MASK_G: NucleotideMask = 4;
pub const MASK_T: NucleotideMask = 8;
pub const MASK_N: NucleotideMask = MASK_A | MASK_C | MASK_G | MASK_T;

/// Bitmask of the nucleotides an IUPAC letter stands for, 0 if invalid.
#[must_use]
pub const fn iupac_mask(letter: u8) -> NucleotideMask {
    match letter.to_ascii_uppercase() {
        b'A' => MASK_A,
        b'C' => MASK_C,
        b'G' => MASK_G,
        b'T' | b'U' => MASK_T,
        b'W' => MASK_A | MASK_T,
        b'S' => MASK_C | MASK_G,
        b'M' => MASK_A | MASK_C,
        b'K' => MASK_G | MASK_T,
        b'R' => MASK_A | MASK_G,
        b'Y' => MASK_C | MASK_T,
        b'B' => MASK_C | MASK_G | MASK_T,
        b'D' => MASK_A | MASK_G | MASK_T,
        b'H' => MASK_A | MASK_C | MASK_T,
        b'V' => MASK_A | MASK_C | MASK_G,
        b'N' => MASK_N,
        _ => 0,
    }
}

/// Whether the letter is a valid IUPAC nucleotide code.
#[inline]
#[must_use]
pub const fn is_iupac_letter(letter: u8) -> bool {
    iupac_mask(letter) != 0
}

/// Whether `base` is one of the nucleotides allowed by `mask`.
#[inline]
#[must_use]
pub const fn mask_allows(mask: NucleotideMask, base: u8) -> bool {
    mask & iupac_mask(base) != 0 && iupac_mask(base).count_ones() == 1
}

/// Nucleotides allowed by a mask, in `ACGT` order.
#[must_use]
pub fn mask_nucleotides(mask: NucleotideMask) -> Vec<u8> {
    [(MASK_A, b'A'), (MASK_C, b'C'), (MASK_G, b'G'), (MASK_T, b'T')]
        .into_iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, base)| base)
        .collect()
}

/// Regex character class matching an IUPAC letter, `None` if invalid.
#[must_use]
pub fn iupac_regex_class(letter: u8) -> Option<String> {
    let nucleotides = mask_nucleotides(iupac_mask(letter));
    match nucleotides.len() {
        0 => None,
        1 => Some(char::from(nucleotides[0]).to_string()),
        _ => Some(format!(
            "[{}]",
            nucleotides.iter().map(|&b| char::from(b)).collect::<String>()
        )),
    }
}

/// Complementary IUPAC letter (`R` ↔ `Y`, `K` ↔ `M`, ...).
#[must_use]
pub const fn complement_iupac(letter: u8) -> u8 {
    match letter.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        other => other, // W, S, N
    }
}

/// Reverse complement of an IUPAC string.
#[must_use]
pub fn reverse_complement_iupac(pattern: &[u8]) -> Vec<u8> {
    pattern.iter().rev().map(|&l| complement_iupac(l)).collect()
}
