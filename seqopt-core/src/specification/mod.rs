//! Scorable, localizable rules over a DNA sequence.
//!
//! Every rule implements [`SpecificationRule`]; the closed [`Specification`]
//! enum holds one variant per built-in rule and dispatches to it. Rules are
//! immutable values: binding to a problem, localizing to a sub-region and
//! changing the location or boost all return new instances.
//!
//! ## Lifecycle
//!
//! 1. Build a rule directly (or from a [`crate::config::SpecificationConfig`]);
//!    invalid parameters are rejected here.
//! 2. [`SpecificationRule::initialize_on_problem`] resolves the location
//!    against a problem. The problem only ever holds bound rules.
//! 3. [`SpecificationRule::evaluate`] scores the current sequence;
//!    [`SpecificationRule::localized`] restricts the evaluation to the
//!    neighbourhood of a local change, or returns [`Specification::Void`]
//!    when the change cannot affect the rule.
//!
//! ## Examples
//!
//! ```rust
//! use seqopt_core::config::OptimizerConfig;
//! use seqopt_core::location::Location;
//! use seqopt_core::problem::DnaOptimizationProblem;
//! use seqopt_core::specification::{EnforceGcContent, Specification, SpecificationRule};
//!
//! let gc = EnforceGcContent::new(0.4, 0.6, Some(8))?;
//! let problem = DnaOptimizationProblem::new(
//!     b"AAAATTTTGCGCGCGCAAAATTTT",
//!     vec![Specification::from(gc)],
//!     Vec::new(),
//!     OptimizerConfig::default(),
//! )?;
//!
//! let bound = &problem.constraints()[0];
//! let evaluation = bound.evaluate(&problem)?;
//! assert!(!evaluation.passes());
//!
//! let far_away = Location::new(100, 110)?;
//! assert!(bound.localized(&far_away).is_void());
//! # Ok::<(), seqopt_core::types::SeqoptError>(())
//! ```

mod avoid_changes;
mod avoid_hairpins;
mod avoid_pattern;
mod enforce_changes;
mod enforce_sequence;
pub mod evaluation;
mod gc_content;
mod length_bounds;
mod nonunique_segments;
mod pattern_occurrence;
mod terminal_gc_content;
mod void;

pub use avoid_changes::AvoidChanges;
pub use avoid_hairpins::AvoidHairpins;
pub use avoid_pattern::AvoidPattern;
pub use enforce_changes::EnforceChanges;
pub use enforce_sequence::EnforceSequence;
pub use evaluation::{BreachFeature, EvaluationFilter, SpecEvaluation, SpecEvaluations};
pub use gc_content::EnforceGcContent;
pub use length_bounds::SequenceLengthBounds;
pub use nonunique_segments::AvoidNonuniqueSegments;
pub use pattern_occurrence::EnforcePatternOccurrence;
pub use terminal_gc_content::EnforceTerminalGcContent;
pub use void::VoidSpecification;

use std::fmt;

use crate::constants::{DEFAULT_BEST_POSSIBLE_SCORE, DEFAULT_BOOST};
use crate::location::Location;
use crate::problem::{DnaOptimizationProblem, MutationSpace};
use crate::types::{SeqoptError, SpecificationRole};

/// Fields shared by every rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecificationBase {
    /// Region the rule applies to, `None` until bound to a problem.
    pub location: Option<Location>,
    /// Weight applied when aggregating scores.
    pub boost: f64,
}

impl Default for SpecificationBase {
    fn default() -> Self {
        Self {
            location: None,
            boost: DEFAULT_BOOST,
        }
    }
}

impl SpecificationBase {
    /// Base with the given location and default boost.
    #[must_use]
    pub const fn at(location: Option<Location>) -> Self {
        Self {
            location,
            boost: DEFAULT_BOOST,
        }
    }

    /// Copy with `changes` applied.
    #[must_use]
    pub fn with_changes(&self, changes: &SpecChanges) -> Self {
        Self {
            location: changes.location.or(self.location),
            boost: changes.boost.unwrap_or(self.boost),
        }
    }

    /// Bound location, or an error naming the rule.
    pub(crate) fn require_location(&self, label: &dyn fmt::Display) -> Result<Location, SeqoptError> {
        self.location
            .ok_or_else(|| SeqoptError::UnboundSpecification(label.to_string()))
    }

    /// Bound location, or the whole sequence when unbound.
    pub(crate) fn location_or_full(&self, sequence_len: usize) -> Location {
        self.location
            .unwrap_or(Location::full(sequence_len))
            .clipped(sequence_len)
    }
}

/// Builder for [`SpecificationRule::copy_with_changes`].
///
/// Unset fields keep the current value.
///
/// ```rust
/// use seqopt_core::location::Location;
/// use seqopt_core::specification::SpecChanges;
///
/// let changes = SpecChanges::new()
///     .with_location(Location::new(0, 50)?)
///     .with_boost(2.0)?;
/// assert_eq!(changes.boost, Some(2.0));
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpecChanges {
    pub location: Option<Location>,
    pub boost: Option<f64>,
}

impl SpecChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidParameter`] for a negative or
    /// non-finite boost.
    pub fn with_boost(mut self, boost: f64) -> Result<Self, SeqoptError> {
        self.boost = Some(validate_boost(boost)?);
        Ok(self)
    }
}

/// Boosts weight objective scores, so they must be finite and non-negative.
pub(crate) fn validate_boost(boost: f64) -> Result<f64, SeqoptError> {
    if boost.is_finite() && boost >= 0.0 {
        Ok(boost)
    } else {
        Err(SeqoptError::InvalidParameter(format!(
            "boost must be a non-negative number, got {boost}"
        )))
    }
}

/// Capability shared by every built-in rule.
pub trait SpecificationRule: fmt::Display + fmt::Debug + Send + Sync {
    /// Location and boost.
    fn base(&self) -> &SpecificationBase;

    /// Scores the problem's current sequence.
    ///
    /// Deterministic and side-effect free. A failing rule is a negative
    /// score, not an error; errors are reserved for invalid state such as a
    /// rule that requires binding but was never bound.
    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError>;

    /// Copy restricted to what a change inside `location` can affect, or
    /// [`Specification::Void`] when it cannot affect this rule at all.
    fn localized(&self, location: &Location) -> Specification;

    /// New instance with `changes` applied.
    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification;

    /// Resolves the rule against a problem. Unbound rules are bound to the
    /// whole sequence; already bound rules are returned unchanged.
    fn initialize_on_problem(
        &self,
        problem: &DnaOptimizationProblem,
        _role: SpecificationRole,
    ) -> Result<Specification, SeqoptError> {
        let changes = match self.base().location {
            Some(_) => SpecChanges::new(),
            None => SpecChanges::new().with_location(Location::full(problem.len())),
        };
        Ok(self.copy_with_changes(&changes))
    }

    /// Score at or above which the rule passes.
    fn best_possible_score(&self) -> Option<f64> {
        Some(DEFAULT_BEST_POSSIBLE_SCORE)
    }

    /// Narrows the allowed nucleotides. Only called for constraints.
    fn restrict_mutation_space(
        &self,
        _problem: &DnaOptimizationProblem,
        _space: &mut MutationSpace,
    ) -> Result<(), SeqoptError> {
        Ok(())
    }

    /// One-line description used in reports and annotations.
    fn label(&self) -> String {
        self.to_string()
    }
}

/// Closed set of built-in rules.
#[derive(Debug, Clone)]
pub enum Specification {
    EnforceGcContent(EnforceGcContent),
    AvoidNonuniqueSegments(AvoidNonuniqueSegments),
    AvoidPattern(AvoidPattern),
    EnforcePatternOccurrence(EnforcePatternOccurrence),
    EnforceSequence(EnforceSequence),
    AvoidChanges(AvoidChanges),
    EnforceChanges(EnforceChanges),
    EnforceTerminalGcContent(EnforceTerminalGcContent),
    SequenceLengthBounds(SequenceLengthBounds),
    AvoidHairpins(AvoidHairpins),
    /// Neutral rule produced by localizing to an unrelated region.
    Void(VoidSpecification),
}

impl Specification {
    /// The variant as a trait object.
    #[must_use]
    pub fn rule(&self) -> &dyn SpecificationRule {
        match self {
            Self::EnforceGcContent(spec) => spec,
            Self::AvoidNonuniqueSegments(spec) => spec,
            Self::AvoidPattern(spec) => spec,
            Self::EnforcePatternOccurrence(spec) => spec,
            Self::EnforceSequence(spec) => spec,
            Self::AvoidChanges(spec) => spec,
            Self::EnforceChanges(spec) => spec,
            Self::EnforceTerminalGcContent(spec) => spec,
            Self::SequenceLengthBounds(spec) => spec,
            Self::AvoidHairpins(spec) => spec,
            Self::Void(spec) => spec,
        }
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void(_))
    }

    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.base().location
    }

    #[must_use]
    pub fn boost(&self) -> f64 {
        self.base().boost
    }

    /// Void rule standing in for `self`.
    #[must_use]
    pub fn void(&self) -> Self {
        Self::Void(VoidSpecification::from_parent(self.label()))
    }

    /// Shortcut for a location-only [`SpecificationRule::copy_with_changes`].
    #[must_use]
    pub fn copy_with_location(&self, location: Location) -> Self {
        self.copy_with_changes(&SpecChanges::new().with_location(location))
    }
}

impl SpecificationRule for Specification {
    fn base(&self) -> &SpecificationBase {
        self.rule().base()
    }

    fn evaluate(&self, problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        self.rule().evaluate(problem)
    }

    fn localized(&self, location: &Location) -> Specification {
        self.rule().localized(location)
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        self.rule().copy_with_changes(changes)
    }

    fn initialize_on_problem(
        &self,
        problem: &DnaOptimizationProblem,
        role: SpecificationRole,
    ) -> Result<Specification, SeqoptError> {
        self.rule().initialize_on_problem(problem, role)
    }

    fn best_possible_score(&self) -> Option<f64> {
        self.rule().best_possible_score()
    }

    fn restrict_mutation_space(
        &self,
        problem: &DnaOptimizationProblem,
        space: &mut MutationSpace,
    ) -> Result<(), SeqoptError> {
        self.rule().restrict_mutation_space(problem, space)
    }

    fn label(&self) -> String {
        self.rule().label()
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.rule(), f)
    }
}

macro_rules! impl_from_rule {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Specification {
                fn from(spec: $variant) -> Self {
                    Self::$variant(spec)
                }
            }
        )*
    };
}

impl_from_rule!(
    EnforceGcContent,
    AvoidNonuniqueSegments,
    AvoidPattern,
    EnforcePatternOccurrence,
    EnforceSequence,
    AvoidChanges,
    EnforceChanges,
    EnforceTerminalGcContent,
    SequenceLengthBounds,
    AvoidHairpins,
);

impl From<VoidSpecification> for Specification {
    fn from(spec: VoidSpecification) -> Self {
        Self::Void(spec)
    }
}

/// Renders an optional location, `global` when unbound.
pub(crate) struct LocationLabel<'a>(pub &'a Option<Location>);

impl fmt::Display for LocationLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, "{location}"),
            None => write!(f, "global"),
        }
    }
}

/// Merges sorted half-open runs whose gap is at most `max_gap`.
pub(crate) fn merge_runs(runs: &[(usize, usize)], max_gap: usize) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for &(start, end) in runs {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end + max_gap => *last_end = (*last_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
