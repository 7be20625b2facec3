use std::fmt;

use super::{
    LocationLabel, SpecChanges, SpecEvaluation, Specification, SpecificationBase,
    SpecificationRule, merge_runs, validate_boost,
};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::sequence::gc_content;
use crate::types::SeqoptError;

/// Bounds on the proportion of G/C nucleotides, globally or per window.
///
/// Without a window the GC fraction of the whole region is checked. With a
/// window of `w` bases every `w`-long window of the region is checked, and a
/// change at position `p` only affects windows starting in `[p - w + 1, p]`.
///
/// # Examples
///
/// ```rust
/// use seqopt_core::specification::EnforceGcContent;
///
/// // 30-80% GC over every 50bp window
/// let local = EnforceGcContent::new(0.3, 0.8, Some(50))?;
/// // exactly 50% GC over the whole sequence
/// let global = EnforceGcContent::with_target(0.5, None)?;
/// assert_eq!(global.mini(), global.maxi());
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnforceGcContent {
    base: SpecificationBase,
    mini: f64,
    maxi: f64,
    window: Option<usize>,
}

impl EnforceGcContent {
    /// GC fraction must stay within `[mini, maxi]`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] when a bound is outside
    /// `[0, 1]`, when `mini > maxi` or when the window is zero.
    pub fn new(mini: f64, maxi: f64, window: Option<usize>) -> Result<Self, SeqoptError> {
        if !(0.0..=1.0).contains(&mini) || !(0.0..=1.0).contains(&maxi) {
            return Err(SeqoptError::InvalidParameter(format!(
                "GC bounds must be within [0, 1], got min {mini} and max {maxi}"
            )));
        }
        if mini > maxi {
            return Err(SeqoptError::InvalidParameter(format!(
                "GC minimum {mini} is above maximum {maxi}"
            )));
        }
        if window == Some(0) {
            return Err(SeqoptError::InvalidParameter(
                "GC window must be at least 1bp".to_string(),
            ));
        }
        Ok(Self {
            base: SpecificationBase::default(),
            mini,
            maxi,
            window,
        })
    }

    /// GC fraction must equal `target`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EnforceGcContent::new`].
    pub fn with_target(target: f64, window: Option<usize>) -> Result<Self, SeqoptError> {
        Self::new(target, target, window)
    }

    /// Restricts the rule to `location`.
    #[must_use]
    pub const fn at_location(mut self, location: Location) -> Self {
        self.base.location = Some(location);
        self
    }

    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] for a negative or
    /// non-finite boost.
    pub fn with_boost(mut self, boost: f64) -> Result<Self, SeqoptError> {
        self.base.boost = validate_boost(boost)?;
        Ok(self)
    }

    #[must_use]
    pub const fn mini(&self) -> f64 {
        self.mini
    }

    #[must_use]
    pub const fn maxi(&self) -> f64 {
        self.maxi
    }

    #[must_use]
    pub const fn window(&self) -> Option<usize> {
        self.window
    }

    fn breach(&self, gc: f64) -> f64 {
        (self.mini - gc).max(0.0) + (gc - self.maxi).max(0.0)
    }

    fn with_location(&self, location: Location) -> Specification {
        self.copy_with_changes(&SpecChanges::new().with_location(location))
    }
}

impl SpecificationRule for EnforceGcContent {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    /// Score is minus the summed breach magnitudes of every value of the GC
    /// profile; breaching windows closer than one window length are merged.
    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        let region = self.base.location_or_full(problem.len());
        // GC fraction is strand independent, windows are indexed on the forward strand
        let profile = gc_content(&problem.sequence()[region.positions()], self.window);

        let breaches: Vec<f64> = profile.iter().map(|&gc| self.breach(gc)).collect();
        let score = -breaches.iter().sum::<f64>();
        let breaching_starts: Vec<usize> = breaches
            .iter()
            .enumerate()
            .filter(|&(_, &breach)| breach > 0.0)
            .map(|(start, _)| start)
            .collect();

        let locations: Vec<Location> = match self.window {
            _ if breaching_starts.is_empty() => Vec::new(),
            Some(window) if profile.len() > 1 => {
                let runs: Vec<(usize, usize)> = breaching_starts
                    .iter()
                    .map(|&start| (start, start + window))
                    .collect();
                merge_runs(&runs, window)
                    .into_iter()
                    .map(|(start, end)| {
                        Location::spanning(region.start() + start, end - start, region.strand())
                            .clipped(region.end())
                    })
                    .collect()
            }
            _ => vec![region],
        };

        let message = if locations.is_empty() {
            "Passed".to_string()
        } else {
            format!(
                "Out of bound on segments {}",
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
        match (self.base.location, self.window) {
            // Global GC content is always re-evaluated in full.
            (Some(_), None) | (None, None) => Specification::from(self.clone()),
            (Some(own), Some(window)) => {
                if !own.overlaps(location) {
                    return Specification::from(self.clone()).void();
                }
                match own.overlap_region(&location.extended(window - 1)) {
                    Some(narrowed) => self.with_location(narrowed),
                    None => Specification::from(self.clone()).void(),
                }
            }
            (None, Some(window)) => self.with_location(location.extended(window - 1)),
        }
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            ..self.clone()
        })
    }
}

impl fmt::Display for EnforceGcContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EnforceGCContent[{}](min {:.2}, max {:.2}",
            LocationLabel(&self.base.location),
            self.mini,
            self.maxi
        )?;
        if let Some(window) = self.window {
            write!(f, ", {window}bp window")?;
        }
        write!(f, ")")
    }
}
