use std::fmt;

use super::{SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::types::SeqoptError;

/// Bounds on the total sequence length.
///
/// Point mutations never change the length, so this rule only checks the
/// input: it localizes to [`Specification::Void`] everywhere and a failing
/// constraint ends resolution with no breach location to search.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLengthBounds {
    base: SpecificationBase,
    min_length: usize,
    max_length: Option<usize>,
}

impl SequenceLengthBounds {
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when `min_length` is above
    /// `max_length`.
    pub fn new(min_length: usize, max_length: Option<usize>) -> Result<Self, SeqoptError> {
        if let Some(max_length) = max_length {
            if min_length > max_length {
                return Err(SeqoptError::InvalidParameter(format!(
                    "minimum length {min_length} is above maximum {max_length}"
                )));
            }
        }
        Ok(Self {
            base: SpecificationBase::default(),
            min_length,
            max_length,
        })
    }

    /// Distance in bases between `length` and the allowed range.
    fn distance(&self, length: usize) -> usize {
        self.min_length.saturating_sub(length)
            + self
                .max_length
                .map_or(0, |max_length| length.saturating_sub(max_length))
    }
}

impl SpecificationRule for SequenceLengthBounds {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let distance = self.distance(problem.len());
        let message = if distance == 0 {
            format!("Passed. Length {}bp within bounds", problem.len())
        } else {
            format!("Failed. Length {}bp is {distance}bp out of bounds", problem.len())
        };
        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            -(distance as f64),
            Vec::new(),
            message,
        ))
    }

    fn localized(&self, _location: &Location) -> Specification {
        Specification::from(self.clone()).void()
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }
}

impl fmt::Display for SequenceLengthBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_length {
            Some(max_length) => write!(f, "SequenceLengthBounds({}-{max_length})", self.min_length),
            None => write!(f, "SequenceLengthBounds({}-)", self.min_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizerConfig;

    fn problem(sequence: &[u8], constraints: Vec<Specification>) -> DnaOptimizationProblem {
        DnaOptimizationProblem::new(sequence, constraints, Vec::new(), OptimizerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_distance_to_bounds() {
        let spec = SequenceLengthBounds::new(5, Some(8)).unwrap();
        assert!(spec.evaluate(&problem(b"ACGTAC", Vec::new())).unwrap().passes());
        assert_eq!(spec.evaluate(&problem(b"ACG", Vec::new())).unwrap().score, -2.0);

        let evaluation = spec.evaluate(&problem(b"ACGTACGTAC", Vec::new())).unwrap();
        assert_eq!(evaluation.score, -2.0);
        assert!(evaluation.locations.is_empty());

        let open = SequenceLengthBounds::new(2, None).unwrap();
        assert!(open.evaluate(&problem(&[b'A'; 500], Vec::new())).unwrap().passes());
    }

    #[test]
    fn test_always_localizes_to_void() {
        let spec = SequenceLengthBounds::new(5, Some(8)).unwrap();
        assert!(spec.localized(&Location::new(0, 3).unwrap()).is_void());
    }

    #[test]
    fn test_failing_constraint_cannot_be_resolved() {
        let mut problem = problem(
            b"ACGT",
            vec![Specification::from(SequenceLengthBounds::new(10, None).unwrap())],
        );
        assert!(matches!(
            problem.resolve_constraints(true),
            Err(SeqoptError::NoSolution { location: None, .. })
        ));
        assert_eq!(problem.sequence(), b"ACGT");
    }

    #[test]
    fn test_construction_and_display() {
        assert!(SequenceLengthBounds::new(10, Some(5)).is_err());
        insta::assert_snapshot!(SequenceLengthBounds::new(100, Some(500)).unwrap().to_string(), @"SequenceLengthBounds(100-500)");
        insta::assert_snapshot!(SequenceLengthBounds::new(100, None).unwrap().to_string(), @"SequenceLengthBounds(100-)");
    }
}
