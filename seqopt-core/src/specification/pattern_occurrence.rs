use std::fmt;

use super::avoid_pattern::join_locations;
use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::patterns::SequencePattern;
use crate::problem::DnaOptimizationProblem;
use crate::types::SeqoptError;

/// Requires a motif to occur exactly `occurrences` times in a region.
///
/// The count is only meaningful over the whole region, so this rule must be
/// bound before evaluation and localizing keeps the whole region.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcePatternOccurrence {
    base: SpecificationBase,
    pattern: SequencePattern,
    occurrences: usize,
}

impl EnforcePatternOccurrence {
    #[must_use]
    pub fn new(pattern: SequencePattern, occurrences: usize) -> Self {
        Self {
            base: SpecificationBase::default(),
            pattern,
            occurrences,
        }
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    #[must_use]
    pub const fn occurrences(&self) -> usize {
        self.occurrences
    }
}

impl SpecificationRule for EnforcePatternOccurrence {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.require_location(self)?.clipped(problem.len());
        let matches = self.pattern.find_matches(problem.sequence(), &region);
        let found = matches.len();
        let score = -(found.abs_diff(self.occurrences) as f64);

        let (locations, message) = match found.cmp(&self.occurrences) {
            std::cmp::Ordering::Equal => (
                Vec::new(),
                format!("Passed. Pattern found at positions {}", join_locations(&matches)),
            ),
            std::cmp::Ordering::Less => (
                vec![region],
                format!(
                    "Failed. Pattern found {found} times instead of {} wanted",
                    self.occurrences
                ),
            ),
            std::cmp::Ordering::Greater => {
                let message = format!(
                    "Failed. Pattern found {found} times instead of {} wanted, at locations {}",
                    self.occurrences,
                    join_locations(&matches)
                );
                (matches, message)
            }
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            score,
            locations,
            message,
        ))
    }

    fn localized(&self, location: &Location) -> Specification {
        match self.base.location {
            Some(own) if !own.overlaps(location) => Specification::from(self.clone()).void(),
            _ => Specification::from(self.clone()),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }
}

impl fmt::Display for EnforcePatternOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EnforcePatternOccurrence[{}]({}x {})",
            LocationLabel(&self.base.location),
            self.occurrences,
            self.pattern
        )
    }
}
