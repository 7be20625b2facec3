//! Search loops over a [`DnaOptimizationProblem`].
//!
//! ## Modules
//!
//! - [`resolution`]: make every constraint pass
//! - [`optimization`]: improve objectives while constraints keep passing
//!
//! ## Algorithm Overview
//!
//! Both loops share the same local scheme. For a breach location `L`:
//!
//! 1. Localize every rule to `L` and drop the [`Specification::Void`] ones
//! 2. Propose a few random point mutations inside `L`
//! 3. Re-evaluate only the localized rules
//! 4. Keep the mutations if the local score is acceptable, revert otherwise
//!
//! ```text
//! constraints: accept  <=>  failing_score(after) >= failing_score(before)
//! objectives:  accept  <=>  constraints pass && objective(after) > objective(before)
//! ```
//!
//! One mutation batch is fully evaluated and accepted or reverted before the
//! next one is proposed.

pub mod optimization;
pub mod resolution;

use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::specification::{SpecEvaluations, Specification, SpecificationRule};
use crate::types::{SeqoptError, SpecificationRole};

/// Localized copies of `specifications`, without the void ones.
pub(crate) fn localize_all(specifications: &[Specification], location: &Location) -> Vec<Specification> {
    specifications
        .iter()
        .map(|specification| specification.localized(location))
        .filter(|specification| !specification.is_void())
        .collect()
}

/// Evaluates a handful of localized rules in order, on the calling thread.
pub(crate) fn evaluate_local(
    problem: &DnaOptimizationProblem,
    specifications: &[Specification],
    role: SpecificationRole,
) -> Result<SpecEvaluations, SeqoptError> {
    let evaluations = specifications
        .iter()
        .map(|specification| specification.evaluate(problem))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpecEvaluations::new(role, evaluations))
}

/// Sum of the raw scores of failing evaluations; 0 when all pass.
pub(crate) fn failing_score(evaluations: &SpecEvaluations) -> f64 {
    evaluations
        .iter()
        .filter(|evaluation| !evaluation.passes())
        .map(|evaluation| evaluation.score)
        .sum()
}
