use std::collections::HashMap;
use std::fmt;

use super::{SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::sequence::reverse_complement;
use crate::types::SeqoptError;

/// Forbids any `min_length`-mer from occurring more than once in a region.
///
/// With `include_reverse_complement` a k-mer also repeats when its reverse
/// complement occurs elsewhere, and a k-mer equal to its own reverse
/// complement counts as a repeat by itself.
///
/// Uniqueness is a whole-region property: localizing only discards the rule
/// when the change is outside its region. A localized copy does not give the
/// same score delta as the full rule for a local change, so the optimizer
/// re-evaluates it over its whole region.
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidNonuniqueSegments {
    base: SpecificationBase,
    min_length: usize,
    include_reverse_complement: bool,
}

impl AvoidNonuniqueSegments {
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when `min_length` is zero.
    pub fn new(min_length: usize, include_reverse_complement: bool) -> Result<Self, SeqoptError> {
        if min_length == 0 {
            return Err(SeqoptError::InvalidParameter(
                "non-unique segment length must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            base: SpecificationBase::default(),
            min_length,
            include_reverse_complement,
        })
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    #[must_use]
    pub const fn include_reverse_complement(&self) -> bool {
        self.include_reverse_complement
    }

    /// First occurrence, relative to the region, of every repeated k-mer.
    fn first_repeats(&self, region: &[u8]) -> Vec<(usize, usize)> {
        let k = self.min_length;
        if region.len() < k {
            return Vec::new();
        }

        let reverse = if self.include_reverse_complement {
            reverse_complement(region)
        } else {
            Vec::new()
        };

        let mut occurrences: HashMap<&[u8], Vec<(usize, usize)>> = HashMap::new();
        for (start, kmer) in region.windows(k).enumerate() {
            occurrences.entry(kmer).or_default().push((start, start + k));
        }
        if self.include_reverse_complement {
            let len = region.len();
            for (start, kmer) in reverse.windows(k).enumerate() {
                occurrences
                    .entry(kmer)
                    .or_default()
                    .push((len - start - k, len - start));
            }
        }

        occurrences
            .into_values()
            .filter(|positions| positions.len() > 1)
            .filter_map(|positions| positions.into_iter().min())
            .collect()
    }
}

impl SpecificationRule for AvoidNonuniqueSegments {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.location_or_full(problem.len());
        let repeats = self.first_repeats(&problem.sequence()[region.positions()]);

        let mut locations: Vec<Location> = repeats
            .into_iter()
            .map(|(start, end)| Location::spanning(region.start() + start, end - start, region.strand()))
            .collect();
        locations.sort();

        let score = -(locations.len() as f64);
        let message = if locations.is_empty() {
            format!("Passed: no non-unique {}-mer found", self.min_length)
        } else {
            format!(
                "Failed: first occurrences of non-unique segments at {}",
                locations
                    .iter()
                    .map(Location::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
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

impl fmt::Display for AvoidNonuniqueSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AvoidNonuniqueSegments({})", self.min_length)
    }
}
