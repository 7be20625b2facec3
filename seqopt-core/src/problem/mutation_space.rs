use bio::bio_types::strand::Strand;
use rand::Rng;
use rand::seq::index::sample;

use crate::location::Location;
use crate::sequence::iupac::{MASK_N, mask_nucleotides};
use crate::types::{Mutation, NucleotideMask, SeqoptError};

/// Nucleotides each position of the sequence may take.
///
/// Starts unrestricted; constraints such as
/// [`crate::specification::EnforceSequence`] and
/// [`crate::specification::AvoidChanges`] narrow it when a problem is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSpace {
    masks: Vec<NucleotideMask>,
}

impl MutationSpace {
    /// Every position may take any of `A`, `C`, `G`, `T`.
    #[must_use]
    pub fn unrestricted(length: usize) -> Self {
        Self {
            masks: vec![MASK_N; length],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Intersects the choices at `position` with `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::NoSolution`] when no nucleotide is left, which
    /// means two constraints contradict each other at that position.
    pub fn restrict(&mut self, position: usize, mask: NucleotideMask) -> Result<(), SeqoptError> {
        let Some(current) = self.masks.get_mut(position) else {
            return Err(SeqoptError::InvalidParameter(format!(
                "position {position} is outside the {}bp mutation space",
                self.masks.len()
            )));
        };
        *current &= mask;
        if *current == 0 {
            let location = Location::spanning(position, 1, Strand::Unknown);
            return Err(SeqoptError::NoSolution {
                message: format!("constraints leave no allowed nucleotide at position {position}"),
                location: Some(location),
            });
        }
        Ok(())
    }

    /// Whether `position` admits a single nucleotide (or is out of range).
    #[must_use]
    pub fn is_frozen(&self, position: usize) -> bool {
        self.masks
            .get(position)
            .is_none_or(|mask| mask.count_ones() <= 1)
    }

    /// Allowed nucleotides at `position`, in `ACGT` order.
    #[must_use]
    pub fn choices(&self, position: usize) -> Vec<u8> {
        self.masks
            .get(position)
            .map(|&mask| mask_nucleotides(mask))
            .unwrap_or_default()
    }

    /// Positions inside `location` that can still change.
    #[must_use]
    pub fn mutable_positions(&self, location: &Location) -> Vec<usize> {
        location
            .clipped(self.masks.len())
            .positions()
            .filter(|&position| !self.is_frozen(position))
            .collect()
    }

    /// Up to `count` point mutations at distinct mutable positions of
    /// `location`, each to an allowed nucleotide different from the current.
    pub fn random_mutations<R: Rng + ?Sized>(
        &self,
        location: &Location,
        count: usize,
        sequence: &[u8],
        rng: &mut R,
    ) -> Vec<Mutation> {
        let positions = self.mutable_positions(location);
        let amount = count.min(positions.len());
        if amount == 0 {
            return Vec::new();
        }

        sample(rng, positions.len(), amount)
            .into_iter()
            .filter_map(|index| {
                let position = positions[index];
                let alternatives: Vec<u8> = self
                    .choices(position)
                    .into_iter()
                    .filter(|&base| Some(&base) != sequence.get(position))
                    .collect();
                (!alternatives.is_empty())
                    .then(|| (position, alternatives[rng.random_range(0..alternatives.len())]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sequence::iupac::{MASK_A, MASK_C, MASK_G, iupac_mask};

    #[test]
    fn test_unrestricted_space() {
        let space = MutationSpace::unrestricted(10);
        assert_eq!(space.len(), 10);
        assert!(!space.is_frozen(3));
        assert_eq!(space.choices(3), b"ACGT".to_vec());
        assert!(space.is_frozen(10));
        assert!(space.choices(10).is_empty());
    }

    #[test]
    fn test_restrict_narrows_and_detects_contradictions() {
        let mut space = MutationSpace::unrestricted(5);
        space.restrict(1, iupac_mask(b'R')).unwrap();
        assert_eq!(space.choices(1), b"AG".to_vec());
        space.restrict(1, MASK_A | MASK_C).unwrap();
        assert!(space.is_frozen(1));

        let error = space.restrict(1, MASK_G).unwrap_err();
        assert_eq!(error.location(), Some(&Location::new(1, 2).unwrap()));
        assert!(space.restrict(9, MASK_G).is_err());
    }

    #[test]
    fn test_mutable_positions_skip_frozen() {
        let mut space = MutationSpace::unrestricted(8);
        space.restrict(2, MASK_A).unwrap();
        space.restrict(3, MASK_C).unwrap();
        let positions = space.mutable_positions(&Location::new(1, 6).unwrap());
        assert_eq!(positions, vec![1, 4, 5]);
        // clipped to the space
        assert_eq!(space.mutable_positions(&Location::new(6, 40).unwrap()), vec![6, 7]);
    }

    #[test]
    fn test_random_mutations_change_allowed_positions() {
        let mut space = MutationSpace::unrestricted(20);
        space.restrict(5, MASK_A).unwrap();
        let sequence = vec![b'A'; 20];
        let location = Location::new(3, 8).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);

        for _ in 0..100 {
            let mutations = space.random_mutations(&location, 3, &sequence, &mut rng);
            assert_eq!(mutations.len(), 3);
            let mut positions: Vec<usize> = mutations.iter().map(|&(p, _)| p).collect();
            positions.sort_unstable();
            positions.dedup();
            assert_eq!(positions.len(), 3);
            for (position, base) in mutations {
                assert!(location.contains(position));
                assert_ne!(position, 5);
                assert_ne!(base, b'A');
            }
        }
    }

    #[test]
    fn test_random_mutations_in_frozen_region() {
        let mut space = MutationSpace::unrestricted(4);
        for position in 0..4 {
            space.restrict(position, MASK_G).unwrap();
        }
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(space
            .random_mutations(&Location::full(4), 2, b"GGGG", &mut rng)
            .is_empty());
    }
}
