use std::fmt;

use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::patterns::SequencePattern;
use crate::problem::DnaOptimizationProblem;
use crate::types::SeqoptError;

/// Forbids any occurrence of a motif, e.g. a restriction site.
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidPattern {
    base: SpecificationBase,
    pattern: SequencePattern,
}

impl AvoidPattern {
    #[must_use]
    pub fn new(pattern: SequencePattern) -> Self {
        Self {
            base: SpecificationBase::default(),
            pattern,
        }
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    #[must_use]
    pub const fn pattern(&self) -> &SequencePattern {
        &self.pattern
    }
}

impl SpecificationRule for AvoidPattern {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.location_or_full(problem.len());
        let matches = self.pattern.find_matches(problem.sequence(), &region);
        let score = -(matches.len() as f64);
        let message = if matches.is_empty() {
            "Passed. Pattern not found !".to_string()
        } else {
            format!("Failed. Pattern found at positions {}", join_locations(&matches))
        };
        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            score,
            matches,
            message,
        ))
    }

    /// A match overlapping the change starts at most `size - 1` bases before it.
    fn localized(&self, location: &Location) -> Specification {
        let extended = location.extended(self.pattern.size() - 1);
        match self.base.location {
            Some(own) => match own.overlap_region(&extended) {
                Some(narrowed) => self.copy_with_changes(&SpecChanges::new().with_location(narrowed)),
                None => Specification::from(self.clone()).void(),
            },
            None => self.copy_with_changes(&SpecChanges::new().with_location(extended)),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            pattern: self.pattern.clone(),
        })
    }
}

impl fmt::Display for AvoidPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AvoidPattern[{}]({})", LocationLabel(&self.base.location), self.pattern)
    }
}

pub(super) fn join_locations(locations: &[Location]) -> String {
    locations
        .iter()
        .map(Location::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
