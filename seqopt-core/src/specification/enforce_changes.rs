use std::fmt;

use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::{DnaOptimizationProblem, MutationSpace};
use crate::sequence::group_consecutive;
use crate::sequence::iupac::{MASK_N, iupac_mask};
use crate::types::{SeqoptError, SpecificationRole};

/// Requires positions to differ from the problem's original sequence.
///
/// By default every position of the region must change. With
/// [`EnforceChanges::between`] the number of changed positions must fall
/// within `[minimum, maximum]` instead.
///
/// ```rust
/// use seqopt_core::specification::EnforceChanges;
///
/// // between 2 and 5 edits anywhere in the region
/// let some = EnforceChanges::between(2, Some(5))?;
/// assert_eq!(some.to_string(), "EnforceChanges[global](min 2, max 5)");
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnforceChanges {
    base: SpecificationBase,
    minimum: Option<usize>,
    maximum: Option<usize>,
}

impl EnforceChanges {
    /// Every position of the region must change.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of changed positions within `[minimum, maximum]`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when `minimum > maximum`.
    pub fn between(minimum: usize, maximum: Option<usize>) -> Result<Self, SeqoptError> {
        if let Some(maximum) = maximum {
            if minimum > maximum {
                return Err(SeqoptError::InvalidParameter(format!(
                    "minimum of {minimum} changes is above maximum {maximum}"
                )));
            }
        }
        Ok(Self {
            base: SpecificationBase::default(),
            minimum: Some(minimum),
            maximum,
        })
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    /// Whether each position is constrained on its own.
    const fn changes_everywhere(&self) -> bool {
        self.minimum.is_none()
    }
}

impl SpecificationRule for EnforceChanges {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let location = self.base.require_location(self)?.clipped(problem.len());
        let (current, before) = (problem.sequence(), problem.sequence_before());
        let (changed, unchanged): (Vec<usize>, Vec<usize>) = location
            .positions()
            .partition(|&position| current[position] != before[position]);

        let minimum = self.minimum.unwrap_or(location.len());
        let deficit = minimum.saturating_sub(changed.len());
        let excess = self
            .maximum
            .map_or(0, |maximum| changed.len().saturating_sub(maximum));

        // too few edits point at what is left to change, too many at the edits
        let breaching: &[usize] = if deficit > 0 {
            unchanged.as_slice()
        } else if excess > 0 {
            changed.as_slice()
        } else {
            &[]
        };
        let locations: Vec<Location> = group_consecutive(breaching)
            .into_iter()
            .map(|(start, end)| Location::spanning(start, end - start, location.strand()))
            .collect();

        let message = if deficit + excess == 0 {
            format!("Passed. {} positions changed", changed.len())
        } else {
            format!(
                "Failed. {} positions changed, {deficit} missing, {excess} in excess",
                changed.len()
            )
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            -((deficit + excess) as f64),
            locations,
            message,
        ))
    }

    /// Narrows to the overlap when every position must change; a count over
    /// the region is re-evaluated in full.
    fn localized(&self, location: &Location) -> Specification {
        let Some(own) = self.base.location else {
            return Specification::from(self.clone());
        };
        match own.overlap_region(location) {
            Some(overlap) if self.changes_everywhere() => {
                self.copy_with_changes(&SpecChanges::new().with_location(overlap))
            }
            Some(_) => Specification::from(self.clone()),
            None => Specification::from(self.clone()).void(),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }

    fn initialize_on_problem(
        &self,
        problem: &DnaOptimizationProblem,
        _role: SpecificationRole,
    ) -> Result<Specification, SeqoptError> {
        let location = self.base.location.unwrap_or(Location::full(problem.len()));
        if let Some(minimum) = self.minimum {
            if minimum > location.len() {
                return Err(SeqoptError::InvalidParameter(format!(
                    "{self}: {minimum} changes cannot fit in the {}bp of {location}",
                    location.len()
                )));
            }
        }
        Ok(self.copy_with_changes(&SpecChanges::new().with_location(location)))
    }

    /// Removes the original nucleotide from the choices when every position
    /// must change.
    fn restrict_mutation_space(
        &self,
        problem: &DnaOptimizationProblem,
        space: &mut MutationSpace,
    ) -> Result<(), SeqoptError> {
        if !self.changes_everywhere() {
            return Ok(());
        }
        let location = self.base.require_location(self)?.clipped(problem.len());
        for position in location.positions() {
            space.restrict(position, MASK_N & !iupac_mask(problem.sequence_before()[position]))?;
        }
        Ok(())
    }
}

impl fmt::Display for EnforceChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnforceChanges[{}](", LocationLabel(&self.base.location))?;
        match (self.minimum, self.maximum) {
            (None, _) => write!(f, "all)"),
            (Some(minimum), None) => write!(f, "min {minimum})"),
            (Some(minimum), Some(maximum)) => write!(f, "min {minimum}, max {maximum})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizerConfig;

    fn loc(start: usize, end: usize) -> Location {
        Location::new(start, end).unwrap()
    }

    fn bound_objective(sequence: &[u8], spec: EnforceChanges) -> (DnaOptimizationProblem, Specification) {
        let problem = DnaOptimizationProblem::new(
            sequence,
            Vec::new(),
            vec![Specification::from(spec)],
            OptimizerConfig::default(),
        )
        .unwrap();
        let bound = problem.objectives()[0].clone();
        (problem, bound)
    }

    #[test]
    fn test_every_position_must_change() {
        let (mut problem, spec) =
            bound_objective(b"AAAAAAAAAA", EnforceChanges::new().at_location(loc(2, 6)));
        let evaluation = spec.evaluate(&problem).unwrap();
        assert_eq!(evaluation.score, -4.0);
        assert_eq!(evaluation.locations, vec![loc(2, 6)]);

        problem.apply_mutations(&[(2, b'C'), (3, b'G')]);
        let evaluation = spec.evaluate(&problem).unwrap();
        assert_eq!(evaluation.score, -2.0);
        assert_eq!(evaluation.locations, vec![loc(4, 6)]);

        problem.apply_mutations(&[(4, b'T'), (5, b'T')]);
        assert!(spec.evaluate(&problem).unwrap().passes());
    }

    #[test]
    fn test_bounded_number_of_changes() {
        let (mut problem, spec) =
            bound_objective(b"AAAAAAAAAA", EnforceChanges::between(1, Some(2)).unwrap());
        assert_eq!(spec.evaluate(&problem).unwrap().score, -1.0);

        problem.apply_mutations(&[(0, b'C')]);
        assert!(spec.evaluate(&problem).unwrap().passes());

        problem.apply_mutations(&[(4, b'C'), (5, b'G')]);
        let evaluation = spec.evaluate(&problem).unwrap();
        assert_eq!(evaluation.score, -1.0);
        // too many changes point at the edits
        assert_eq!(evaluation.locations, vec![loc(0, 1), loc(4, 6)]);
    }

    #[test]
    fn test_construction_and_binding_errors() {
        assert!(matches!(
            EnforceChanges::between(5, Some(2)),
            Err(SeqoptError::InvalidParameter(_))
        ));
        let result = DnaOptimizationProblem::new(
            b"ACGT",
            vec![Specification::from(EnforceChanges::between(10, None).unwrap())],
            Vec::new(),
            OptimizerConfig::default(),
        );
        assert!(matches!(result, Err(SeqoptError::InvalidParameter(_))));
    }

    #[test]
    fn test_constraint_removes_original_nucleotide() {
        let problem = DnaOptimizationProblem::new(
            b"ACGTACGTAC",
            vec![Specification::from(EnforceChanges::new().at_location(loc(0, 2)))],
            Vec::new(),
            OptimizerConfig::default(),
        )
        .unwrap();
        let space = problem.mutation_space();
        assert_eq!(space.choices(0), b"CGT".to_vec());
        assert_eq!(space.choices(1), b"AGT".to_vec());
        assert_eq!(space.choices(2), b"ACGT".to_vec());
    }

    #[test]
    fn test_localized() {
        let everywhere = EnforceChanges::new().at_location(loc(10, 20));
        assert_eq!(everywhere.localized(&loc(15, 30)).location(), Some(loc(15, 20)));
        assert!(everywhere.localized(&loc(0, 10)).is_void());

        let counted = EnforceChanges::between(3, None)
            .unwrap()
            .at_location(loc(10, 20));
        assert_eq!(counted.localized(&loc(15, 30)).location(), Some(loc(10, 20)));
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(EnforceChanges::new().at_location(loc(0, 50)).to_string(), @"EnforceChanges[0-50](all)");
        insta::assert_snapshot!(EnforceChanges::between(3, None).unwrap().to_string(), @"EnforceChanges[global](min 3)");
    }
}
