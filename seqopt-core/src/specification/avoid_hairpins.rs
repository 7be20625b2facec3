use std::fmt;

use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule, merge_runs};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::sequence::reverse_complement;
use crate::types::SeqoptError;

/// Forbids hairpins: a `stem_size`-mer whose reverse complement occurs
/// downstream within `hairpin_window` bases.
///
/// Every window of `hairpin_window` bases is checked for a stem at its start
/// pairing with any later part of the window; a region shorter than the
/// window is checked as one window. A change at `p` only affects windows
/// starting in `[p - hairpin_window + 1, p]`.
///
/// ```rust
/// use seqopt_core::specification::AvoidHairpins;
///
/// let hairpins = AvoidHairpins::new(20, 200)?;
/// assert_eq!(hairpins.to_string(), "AvoidHairpins[global](stem 20, window 200)");
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidHairpins {
    base: SpecificationBase,
    stem_size: usize,
    hairpin_window: usize,
}

impl AvoidHairpins {
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when the stem is empty or
    /// when two stems do not fit in the window.
    pub fn new(stem_size: usize, hairpin_window: usize) -> Result<Self, SeqoptError> {
        if stem_size == 0 || hairpin_window < 2 * stem_size {
            return Err(SeqoptError::InvalidParameter(format!(
                "hairpin window of {hairpin_window}bp cannot hold two {stem_size}bp stems"
            )));
        }
        Ok(Self {
            base: SpecificationBase::default(),
            stem_size,
            hairpin_window,
        })
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    /// Windows of `region` holding a hairpin, relative to the region.
    fn hairpin_windows(&self, region: &[u8]) -> Vec<(usize, usize)> {
        let stem = self.stem_size;
        let window = self.hairpin_window.min(region.len());
        if window < 2 * stem {
            return Vec::new();
        }

        (0..=region.len() - window)
            .filter(|&start| {
                let arm = reverse_complement(&region[start..start + stem]);
                region[start + stem..start + window]
                    .windows(stem)
                    .any(|candidate| candidate == arm.as_slice())
            })
            .map(|start| (start, start + window))
            .collect()
    }
}

impl SpecificationRule for AvoidHairpins {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    /// Score is minus the number of windows holding a hairpin; overlapping
    /// windows are merged into breach locations.
    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.location_or_full(problem.len());
        let windows = self.hairpin_windows(&problem.sequence()[region.positions()]);

        let locations: Vec<Location> = merge_runs(&windows, 0)
            .into_iter()
            .map(|(start, end)| Location::spanning(region.start() + start, end - start, region.strand()))
            .collect();
        let message = if windows.is_empty() {
            "Passed. No hairpin found".to_string()
        } else {
            format!("Failed. {} windows with a hairpin", windows.len())
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            -(windows.len() as f64),
            locations,
            message,
        ))
    }

    fn localized(&self, location: &Location) -> Specification {
        let margin = self.hairpin_window - 1;
        let Some(own) = self.base.location else {
            return self.copy_with_changes(&SpecChanges::new().with_location(location.extended(margin)));
        };
        if !own.overlaps(location) {
            return Specification::from(self.clone()).void();
        }
        match own.overlap_region(&location.extended(margin)) {
            Some(narrowed) => self.copy_with_changes(&SpecChanges::new().with_location(narrowed)),
            None => Specification::from(self.clone()).void(),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }
}

impl fmt::Display for AvoidHairpins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AvoidHairpins[{}](stem {}, window {})",
            LocationLabel(&self.base.location),
            self.stem_size,
            self.hairpin_window
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::config::OptimizerConfig;
    use crate::sequence::random_dna_sequence;

    fn loc(start: usize, end: usize) -> Location {
        Location::new(start, end).unwrap()
    }

    fn problem(sequence: &[u8]) -> DnaOptimizationProblem {
        DnaOptimizationProblem::new(sequence, Vec::new(), Vec::new(), OptimizerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_stem_pairing_downstream() {
        // GGGCC pairs with its reverse complement GGCCC six bases later
        let spec = AvoidHairpins::new(5, 20).unwrap();
        let sequence = b"AAAAAGGGCCAAAAAAGGCCCAAAAAAAAAAAAAAAAAAA";
        let evaluation = spec.evaluate(&problem(sequence)).unwrap();
        assert_eq!(evaluation.score, -1.0);
        assert_eq!(evaluation.locations, vec![loc(5, 25)]);
    }

    #[test]
    fn test_pairing_beyond_window_is_ignored() {
        let spec = AvoidHairpins::new(5, 12).unwrap();
        let sequence = b"AAAAAGGGCCAAAAAAGGCCCAAAAAA";
        assert!(spec.evaluate(&problem(sequence)).unwrap().passes());
    }

    #[test]
    fn test_short_region_is_one_window() {
        let spec = AvoidHairpins::new(3, 100).unwrap();
        let evaluation = spec.evaluate(&problem(b"GGCTTTGCC")).unwrap();
        assert_eq!(evaluation.score, -1.0);
        assert_eq!(evaluation.locations, vec![loc(0, 9)]);
        assert!(spec.evaluate(&problem(b"ACG")).unwrap().passes());
    }

    #[test]
    fn test_construction_errors() {
        assert!(AvoidHairpins::new(0, 10).is_err());
        assert!(matches!(
            AvoidHairpins::new(10, 15),
            Err(SeqoptError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_localized_narrows_to_window_radius() {
        let spec = AvoidHairpins::new(4, 20).unwrap().at_location(loc(0, 200));
        assert_eq!(spec.localized(&loc(100, 101)).location(), Some(loc(81, 120)));
        assert!(spec.localized(&loc(300, 310)).is_void());
    }

    #[test]
    fn test_localization_soundness_for_point_mutations() {
        let mut rng = Pcg32::seed_from_u64(11);
        let sequence = random_dna_sequence(300, &mut rng);
        let spec = Specification::from(AvoidHairpins::new(4, 30).unwrap().at_location(Location::full(300)));

        let before = problem(&sequence);
        for position in [0, 17, 150, 299] {
            let mut mutated = sequence.clone();
            mutated[position] = if mutated[position] == b'G' { b'C' } else { b'G' };
            let after = problem(&mutated);

            let full_delta = spec.evaluate(&after).unwrap().score - spec.evaluate(&before).unwrap().score;
            let local = spec.localized(&Location::new(position, position + 1).unwrap());
            let local_delta = local.evaluate(&after).unwrap().score - local.evaluate(&before).unwrap().score;
            assert_eq!(full_delta, local_delta, "mutation at {position}");
        }
    }

    #[test]
    fn test_display() {
        let spec = AvoidHairpins::new(20, 200).unwrap().at_location(loc(0, 500));
        insta::assert_snapshot!(spec.to_string(), @"AvoidHairpins[0-500](stem 20, window 200)");
    }
}
