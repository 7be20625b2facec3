use std::fmt;

use super::avoid_pattern::join_locations;
use super::{LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::sequence::gc_fraction;
use crate::types::SeqoptError;

/// Bounds on the GC fraction of the first and last `window_size` bases.
///
/// Sequence ends anneal primers, so their GC content matters independently
/// of the rest of the sequence. A region shorter than the window is checked
/// as a whole, once.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforceTerminalGcContent {
    base: SpecificationBase,
    mini: f64,
    maxi: f64,
    window_size: usize,
}

impl EnforceTerminalGcContent {
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when a bound is outside
    /// `[0, 1]`, when `mini > maxi` or when the window is zero.
    pub fn new(mini: f64, maxi: f64, window_size: usize) -> Result<Self, SeqoptError> {
        if !(0.0..=1.0).contains(&mini) || !(0.0..=1.0).contains(&maxi) || mini > maxi {
            return Err(SeqoptError::InvalidParameter(format!(
                "terminal GC bounds must satisfy 0 <= min <= max <= 1, got min {mini} and max {maxi}"
            )));
        }
        if window_size == 0 {
            return Err(SeqoptError::InvalidParameter(
                "terminal GC window must be at least 1bp".to_string(),
            ));
        }
        Ok(Self {
            base: SpecificationBase::default(),
            mini,
            maxi,
            window_size,
        })
    }

    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// The two terminal windows of `region`, a single one when they coincide.
    fn terminal_windows(&self, region: &Location) -> Vec<Location> {
        let size = self.window_size.min(region.len());
        let left = Location::spanning(region.start(), size, region.strand());
        let right = Location::spanning(region.end() - size, size, region.strand());
        if left == right { vec![left] } else { vec![left, right] }
    }
}

impl SpecificationRule for EnforceTerminalGcContent {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    /// Score is minus the summed distance of each end's GC fraction to the
    /// bounds; failing ends are the breach locations.
    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.location_or_full(problem.len());
        let mut score = 0.0;
        let mut locations = Vec::new();
        for window in self.terminal_windows(&region) {
            let gc = gc_fraction(&problem.sequence()[window.positions()]);
            let breach = (self.mini - gc).max(0.0) + (gc - self.maxi).max(0.0);
            if breach > 0.0 {
                score -= breach;
                locations.push(window);
            }
        }

        let message = if locations.is_empty() {
            "Passed. Terminal GC content within bounds".to_string()
        } else {
            format!("Failed. GC content out of bounds at {}", join_locations(&locations))
        };

        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            score,
            locations,
            message,
        ))
    }

    /// Void unless the change touches one of the terminal windows.
    fn localized(&self, location: &Location) -> Specification {
        let Some(own) = self.base.location else {
            return Specification::from(self.clone());
        };
        if self
            .terminal_windows(&own)
            .iter()
            .any(|window| window.overlaps(location))
        {
            Specification::from(self.clone())
        } else {
            Specification::from(self.clone()).void()
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }
}

impl fmt::Display for EnforceTerminalGcContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EnforceTerminalGCContent[{}](min {:.2}, max {:.2}, {}bp ends)",
            LocationLabel(&self.base.location),
            self.mini,
            self.maxi,
            self.window_size
        )
    }
}
