use rand::Rng;

use crate::constants::NUCLEOTIDES;

/// Random sequence of `length` nucleotides drawn uniformly from `ACGT`.
///
/// # Examples
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_pcg::Pcg32;
/// use seqopt_core::sequence::random_dna_sequence;
///
/// let mut rng = Pcg32::seed_from_u64(7);
/// let sequence = random_dna_sequence(50, &mut rng);
/// assert_eq!(sequence.len(), 50);
/// ```
pub fn random_dna_sequence<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<u8> {
    (0..length)
        .map(|_| NUCLEOTIDES[rng.random_range(0..NUCLEOTIDES.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_sequence_alphabet() {
        let mut rng = Pcg32::seed_from_u64(1);
        let sequence = random_dna_sequence(500, &mut rng);
        assert_eq!(sequence.len(), 500);
        assert!(sequence.iter().all(|b| NUCLEOTIDES.contains(b)));
    }

    #[test]
    fn test_random_sequence_is_seeded() {
        let first = random_dna_sequence(100, &mut Pcg32::seed_from_u64(42));
        let second = random_dna_sequence(100, &mut Pcg32::seed_from_u64(42));
        let other = random_dna_sequence(100, &mut Pcg32::seed_from_u64(43));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
