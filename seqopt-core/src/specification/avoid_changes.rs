use std::fmt;

use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::{DnaOptimizationProblem, MutationSpace};
use crate::sequence::group_consecutive;
use crate::sequence::iupac::iupac_mask;
use crate::types::SeqoptError;

/// Penalizes every position differing from the problem's original sequence.
///
/// As a constraint the region is frozen in the mutation space; as an
/// objective it keeps edits to a minimum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvoidChanges {
    base: SpecificationBase,
}

impl AvoidChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }
}

impl SpecificationRule for AvoidChanges {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let location = self.base.require_location(self)?.clipped(problem.len());
        let (current, before) = (problem.sequence(), problem.sequence_before());
        let changed: Vec<usize> = location
            .positions()
            .filter(|&position| current[position] != before[position])
            .collect();

        let locations: Vec<Location> = group_consecutive(&changed)
            .into_iter()
            .map(|(start, end)| Location::spanning(start, end - start, location.strand()))
            .collect();
        let message = if changed.is_empty() {
            "Passed. No changes".to_string()
        } else {
            format!("Failed. {} positions changed", changed.len())
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            -(changed.len() as f64),
            locations,
            message,
        ))
    }

    fn localized(&self, location: &Location) -> Specification {
        match self.base.location {
            Some(own) => match own.overlap_region(location) {
                Some(overlap) => self.copy_with_changes(&SpecChanges::new().with_location(overlap)),
                None => Specification::from(self.clone()).void(),
            },
            None => Specification::from(self.clone()),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
        })
    }

    fn restrict_mutation_space(
        &self,
        problem: &DnaOptimizationProblem,
        space: &mut MutationSpace,
    ) -> Result<(), SeqoptError> {
        let location = self.base.require_location(self)?.clipped(problem.len());
        for position in location.positions() {
            space.restrict(position, iupac_mask(problem.sequence_before()[position]))?;
        }
        Ok(())
    }
}

impl fmt::Display for AvoidChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AvoidChanges[{}]", LocationLabel(&self.base.location))
    }
}
