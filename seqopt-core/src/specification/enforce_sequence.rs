use std::fmt;

use bio::bio_types::strand::Strand;

use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::{DnaOptimizationProblem, MutationSpace};
use crate::sequence::group_consecutive;
use crate::sequence::iupac::{iupac_mask, is_iupac_letter, mask_allows, reverse_complement_iupac};
use crate::types::{SeqoptError, SpecificationRole};

const DISPLAY_LIMIT: usize = 20;

/// Requires a region to match an IUPAC sequence, e.g. `ATGNNNNNNTAA`.
///
/// The IUPAC string reads in the orientation of the location's strand. As a
/// constraint it also removes the disallowed nucleotides from the mutation
/// space.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforceSequence {
    base: SpecificationBase,
    iupac: Vec<u8>,
}

impl EnforceSequence {
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] for an empty string or a
    /// non-IUPAC letter.
    pub fn new(sequence: &str) -> Result<Self, SeqoptError> {
        let iupac = sequence.trim().to_ascii_uppercase().into_bytes();
        if iupac.is_empty() {
            return Err(SeqoptError::InvalidParameter(
                "enforced sequence is empty".to_string(),
            ));
        }
        if let Some(position) = iupac.iter().position(|&letter| !is_iupac_letter(letter)) {
            return Err(SeqoptError::InvalidParameter(format!(
                "enforced sequence has a non-IUPAC letter {:?} at position {position}",
                char::from(iupac[position])
            )));
        }
        Ok(Self {
            base: SpecificationBase::default(),
            iupac,
        })
    }

    /// Binds the sequence to `location`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when the location length
    /// differs from the IUPAC string length.
    pub fn at_location(mut self, location: Location) -> Result<Self, SeqoptError> {
        self.check_length(&location)?;
        self.base.location = Some(location);
        Ok(self)
    }

    /// The IUPAC string, in the location's orientation.
    #[must_use]
    pub fn iupac(&self) -> &[u8] {
        &self.iupac
    }

    /// IUPAC letters in forward-strand order.
    fn forward_iupac(&self, strand: Strand) -> Vec<u8> {
        match strand {
            Strand::Reverse => reverse_complement_iupac(&self.iupac),
            _ => self.iupac.clone(),
        }
    }

    fn check_length(&self, location: &Location) -> Result<(), SeqoptError> {
        if location.len() == self.iupac.len() {
            Ok(())
        } else {
            Err(SeqoptError::InvalidParameter(format!(
                "{self}: sequence of {}bp does not fit location {location}",
                self.iupac.len()
            )))
        }
    }

    /// Forward positions of `sequence` not allowed at `location`.
    fn mismatches(&self, sequence: &[u8], location: &Location) -> Vec<usize> {
        self.forward_iupac(location.strand())
            .iter()
            .zip(location.positions())
            .filter(|&(&letter, position)| {
                sequence
                    .get(position)
                    .is_none_or(|&base| !mask_allows(iupac_mask(letter), base))
            })
            .map(|(_, position)| position)
            .collect()
    }
}

impl SpecificationRule for EnforceSequence {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let location = self.base.require_location(self)?;
        let mismatches = self.mismatches(problem.sequence(), &location);
        let locations: Vec<Location> = group_consecutive(&mismatches)
            .into_iter()
            .map(|(start, end)| Location::spanning(start, end - start, location.strand()))
            .collect();

        let message = if locations.is_empty() {
            "Passed. Sequence matches IUPAC constraint".to_string()
        } else {
            format!(
                "Failed. {} positions do not match the IUPAC constraint",
                mismatches.len()
            )
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            -(mismatches.len() as f64),
            locations,
            message,
        ))
    }

    fn localized(&self, location: &Location) -> Specification {
        let Some(own) = self.base.location else {
            return Specification::from(self.clone());
        };
        let Some(overlap) = own.overlap_region(location) else {
            return Specification::from(self.clone()).void();
        };

        let offset = overlap.start() - own.start();
        let forward = self.forward_iupac(own.strand());
        // a copy moved to a location of another length has nothing to slice
        let Some(sliced) = forward.get(offset..offset + overlap.len()) else {
            return Specification::from(self.clone()).void();
        };
        let iupac = match own.strand() {
            Strand::Reverse => reverse_complement_iupac(sliced),
            _ => sliced.to_vec(),
        };
        Specification::from(Self {
            base: self
                .base
                .with_changes(&SpecChanges::new().with_location(overlap)),
            iupac,
        })
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            iupac: self.iupac.clone(),
        })
    }

    /// Binds to `[0, len)` of the IUPAC string when unbound and checks the
    /// location fits both the string and the sequence.
    fn initialize_on_problem(
        &self,
        problem: &DnaOptimizationProblem,
        _role: SpecificationRole,
    ) -> Result<Specification, SeqoptError> {
        let location = self
            .base
            .location
            .unwrap_or(Location::full(self.iupac.len()));
        self.check_length(&location)?;
        if location.end() > problem.len() {
            return Err(SeqoptError::InvalidParameter(format!(
                "{self}: location {location} exceeds the {}bp sequence",
                problem.len()
            )));
        }
        Ok(self.copy_with_changes(&SpecChanges::new().with_location(location)))
    }

    fn restrict_mutation_space(
        &self,
        _problem: &DnaOptimizationProblem,
        space: &mut MutationSpace,
    ) -> Result<(), SeqoptError> {
        let location = self.base.require_location(self)?;
        for (letter, position) in self
            .forward_iupac(location.strand())
            .into_iter()
            .zip(location.positions())
        {
            space.restrict(position, iupac_mask(letter))?;
        }
        Ok(())
    }
}

impl fmt::Display for EnforceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = String::from_utf8_lossy(&self.iupac);
        write!(f, "EnforceSequence[{}](", LocationLabel(&self.base.location))?;
        if text.len() > DISPLAY_LIMIT {
            write!(f, "{}...)", &text[..DISPLAY_LIMIT - 3])
        } else {
            write!(f, "{text})")
        }
    }
}
