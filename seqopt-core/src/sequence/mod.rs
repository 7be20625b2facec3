//! Nucleotide sequence utilities.
//!
//! Sequences are plain uppercase ASCII byte slices over `A`, `C`, `G`, `T`.
//! This module provides the primitive services the specifications consume:
//! complement and reverse complement, windowed GC content, validation and
//! random sequence generation.
//!
//! ## Modules
//!
//! - [`io`]: FASTA reading and writing through rust-bio
//! - [`iupac`]: IUPAC ambiguity codes as nucleotide bitmasks
//! - [`random`]: seeded random sequence generation
//!
//! ## Examples
//!
//! ```rust
//! use seqopt_core::sequence::{gc_content, reverse_complement};
//!
//! assert_eq!(reverse_complement(b"ATGC"), b"GCAT".to_vec());
//!
//! let profile = gc_content(b"AAGGCCTT", Some(4));
//! assert_eq!(profile, vec![0.5, 0.75, 1.0, 0.75, 0.5]);
//! ```

pub mod io;
pub mod iupac;
pub mod random;

pub use io::*;
pub use random::random_dna_sequence;

use crate::constants::NUCLEOTIDES;
use crate::types::SeqoptError;

/// Complement of a single nucleotide; unknown symbols are returned unchanged.
#[must_use]
pub const fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

/// Base-wise complement, same orientation.
#[must_use]
pub fn complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().map(|&base| complement_base(base)).collect()
}

/// Reverse complement of a sequence.
#[must_use]
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&base| complement_base(base))
        .collect()
}

/// Test if nucleotide is G or C (case-insensitive)
#[inline]
#[must_use]
pub const fn is_gc(base: u8) -> bool {
    matches!(base, b'G' | b'C' | b'g' | b'c')
}

/// GC fraction of a whole sequence, 0.0 for an empty one.
#[must_use]
pub fn gc_fraction(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc = sequence.iter().filter(|&&base| is_gc(base)).count();
    gc as f64 / sequence.len() as f64
}

/// GC content profile of a sequence.
///
/// Without a window the result holds a single value, the GC fraction of the
/// whole sequence. With a window of `w` bases the result holds one value per
/// window start, `len - w + 1` values in total. A sequence shorter than the
/// window yields a single value over the whole sequence. An empty sequence
/// yields no values.
#[must_use]
pub fn gc_content(sequence: &[u8], window: Option<usize>) -> Vec<f64> {
    if sequence.is_empty() {
        return Vec::new();
    }
    let window = match window {
        Some(w) if w > 0 && w < sequence.len() => w,
        _ => return vec![gc_fraction(sequence)],
    };

    // prefix[i] = number of G/C in sequence[..i]
    let mut prefix = Vec::with_capacity(sequence.len() + 1);
    prefix.push(0usize);
    for &base in sequence {
        let last = prefix.last().copied().unwrap_or(0);
        prefix.push(last + usize::from(is_gc(base)));
    }

    (0..=sequence.len() - window)
        .map(|start| (prefix[start + window] - prefix[start]) as f64 / window as f64)
        .collect()
}

/// Uppercases a sequence and checks it only contains `A`, `C`, `G`, `T`.
///
/// `U` is read as `T`.
///
/// # Errors
///
/// Returns [`SeqoptError::InvalidSequence`] naming the first bad symbol.
pub fn normalize_sequence(sequence: &[u8]) -> Result<Vec<u8>, SeqoptError> {
    sequence
        .iter()
        .enumerate()
        .map(|(position, &base)| match base.to_ascii_uppercase() {
            b'U' => Ok(b'T'),
            upper if NUCLEOTIDES.contains(&upper) => Ok(upper),
            _ => Err(SeqoptError::InvalidSequence(format!(
                "unexpected symbol {:?} at position {position}",
                char::from(base)
            ))),
        })
        .collect()
}

/// Groups sorted positions into half-open runs of consecutive indices.
///
/// `[2, 3, 4, 9, 10]` becomes `[(2, 5), (9, 11)]`.
#[must_use]
pub fn group_consecutive(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &position in positions {
        match runs.last_mut() {
            Some((_, end)) if *end == position => *end = position + 1,
            _ => runs.push((position, position + 1)),
        }
    }
    runs
}
