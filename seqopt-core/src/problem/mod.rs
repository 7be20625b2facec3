//! The optimization problem: a mutable sequence and the rules it is judged by.
//!
//! [`DnaOptimizationProblem`] owns the working sequence, a copy of the
//! original, bound constraints and objectives, the [`MutationSpace`] and a
//! seeded PRNG. Evaluation borrows the problem immutably; only the search
//! loops in [`crate::algorithms`] mutate it, one mutation batch at a time.
//!
//! ```rust
//! use seqopt_core::config::OptimizerConfig;
//! use seqopt_core::problem::DnaOptimizationProblem;
//! use seqopt_core::specification::{AvoidPattern, Specification};
//!
//! let mut problem = DnaOptimizationProblem::new(
//!     b"AAAAGAATTCAAAAGAATTCAAAA",
//!     vec![Specification::from(AvoidPattern::new("GAATTC".parse()?))],
//!     Vec::new(),
//!     OptimizerConfig::default(),
//! )?;
//! assert!(!problem.all_constraints_pass()?);
//!
//! problem.resolve_constraints(true)?;
//! assert!(problem.all_constraints_pass()?);
//! # Ok::<(), seqopt_core::types::SeqoptError>(())
//! ```

mod mutation_space;

pub use mutation_space::MutationSpace;

use log::debug;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use rayon::prelude::*;

use crate::config::OptimizerConfig;
use crate::location::Location;
use crate::sequence::normalize_sequence;
use crate::specification::{SpecEvaluation, SpecEvaluations, Specification, SpecificationRule};
use crate::types::{Mutation, SeqoptError, SpecificationRole};

/// A sequence under optimization.
#[derive(Debug, Clone)]
pub struct DnaOptimizationProblem {
    sequence: Vec<u8>,
    sequence_before: Vec<u8>,
    constraints: Vec<Specification>,
    objectives: Vec<Specification>,
    mutation_space: MutationSpace,
    pub(crate) config: OptimizerConfig,
    rng: Pcg32,
}

impl DnaOptimizationProblem {
    /// Validates the sequence, binds every rule and builds the mutation space.
    ///
    /// # Errors
    ///
    /// - [`SeqoptError::InvalidSequence`] for symbols outside `ACGTU`
    /// - any binding error of a rule (e.g. an IUPAC string that does not fit
    ///   its location)
    /// - [`SeqoptError::NoSolution`] when constraints leave a position with no
    ///   allowed nucleotide
    pub fn new(
        sequence: &[u8],
        constraints: Vec<Specification>,
        objectives: Vec<Specification>,
        config: OptimizerConfig,
    ) -> Result<Self, SeqoptError> {
        let sequence = normalize_sequence(sequence)?;
        let mut problem = Self {
            sequence_before: sequence.clone(),
            mutation_space: MutationSpace::unrestricted(sequence.len()),
            sequence,
            constraints: Vec::new(),
            objectives: Vec::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            config,
        };

        problem.constraints = problem.bind(&constraints, SpecificationRole::Constraint)?;
        problem.objectives = problem.bind(&objectives, SpecificationRole::Objective)?;

        let mut space = MutationSpace::unrestricted(problem.len());
        for constraint in &problem.constraints {
            constraint.restrict_mutation_space(&problem, &mut space)?;
        }
        problem.mutation_space = space;

        debug!(
            "Problem on {}bp with {} constraints and {} objectives",
            problem.len(),
            problem.constraints.len(),
            problem.objectives.len()
        );
        Ok(problem)
    }

    fn bind(
        &self,
        specifications: &[Specification],
        role: SpecificationRole,
    ) -> Result<Vec<Specification>, SeqoptError> {
        specifications
            .iter()
            .map(|specification| specification.initialize_on_problem(self, role))
            .collect()
    }

    /// Current sequence.
    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Sequence as given at construction.
    #[must_use]
    pub fn sequence_before(&self) -> &[u8] {
        &self.sequence_before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn constraints(&self) -> &[Specification] {
        &self.constraints
    }

    #[must_use]
    pub fn objectives(&self) -> &[Specification] {
        &self.objectives
    }

    #[must_use]
    pub const fn mutation_space(&self) -> &MutationSpace {
        &self.mutation_space
    }

    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Evaluates `specifications` on the current sequence.
    ///
    /// Rules are independent pure functions of the sequence, so a full
    /// sweep runs them in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error, e.g. of an unbound rule.
    pub fn evaluate_specifications(
        &self,
        specifications: &[Specification],
        role: SpecificationRole,
    ) -> Result<SpecEvaluations, SeqoptError> {
        let evaluations = specifications
            .par_iter()
            .map(|specification| specification.evaluate(self))
            .collect::<Result<Vec<SpecEvaluation>, SeqoptError>>()?;
        Ok(SpecEvaluations::new(role, evaluations))
    }

    pub fn constraints_evaluations(&self) -> Result<SpecEvaluations, SeqoptError> {
        self.evaluate_specifications(&self.constraints, SpecificationRole::Constraint)
    }

    pub fn objectives_evaluations(&self) -> Result<SpecEvaluations, SeqoptError> {
        self.evaluate_specifications(&self.objectives, SpecificationRole::Objective)
    }

    pub fn all_constraints_pass(&self) -> Result<bool, SeqoptError> {
        Ok(self.constraints_evaluations()?.all_passing())
    }

    /// Boost-weighted sum of the objective scores.
    pub fn objective_score(&self) -> Result<f64, SeqoptError> {
        Ok(self.objectives_evaluations()?.scores_sum())
    }

    /// Number of positions differing from the original sequence.
    #[must_use]
    pub fn number_of_edits(&self) -> usize {
        self.sequence
            .iter()
            .zip(&self.sequence_before)
            .filter(|(current, before)| current != before)
            .count()
    }

    pub fn constraints_text_summary(&self) -> Result<String, SeqoptError> {
        Ok(self.constraints_evaluations()?.text_summary())
    }

    pub fn objectives_text_summary(&self) -> Result<String, SeqoptError> {
        Ok(self.objectives_evaluations()?.text_summary())
    }

    /// Applies point mutations and returns what is needed to undo them.
    ///
    /// Positions outside the sequence are ignored.
    pub fn apply_mutations(&mut self, mutations: &[Mutation]) -> Vec<Mutation> {
        mutations
            .iter()
            .filter_map(|&(position, base)| {
                let slot = self.sequence.get_mut(position)?;
                let previous = std::mem::replace(slot, base);
                Some((position, previous))
            })
            .collect()
    }

    /// Undoes [`DnaOptimizationProblem::apply_mutations`].
    pub fn revert_mutations(&mut self, previous: &[Mutation]) {
        for &(position, base) in previous.iter().rev() {
            self.sequence[position] = base;
        }
    }

    /// Random point mutations inside `location`, drawn from the problem's PRNG.
    pub(crate) fn draw_mutations(&mut self, location: &Location) -> Vec<Mutation> {
        self.mutation_space.random_mutations(
            location,
            self.config.mutations_per_iteration,
            &self.sequence,
            &mut self.rng,
        )
    }

    /// Current sequence as a string.
    #[must_use]
    pub fn sequence_string(&self) -> String {
        String::from_utf8_lossy(&self.sequence).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::{
        AvoidChanges, AvoidPattern, EnforceGcContent, EnforceSequence,
    };

    #[test]
    fn test_sequence_is_normalized() {
        let problem =
            DnaOptimizationProblem::new(b"acgu", Vec::new(), Vec::new(), OptimizerConfig::default())
                .unwrap();
        assert_eq!(problem.sequence(), b"ACGT");
        assert_eq!(problem.sequence_before(), b"ACGT");

        let invalid =
            DnaOptimizationProblem::new(b"ACXT", Vec::new(), Vec::new(), OptimizerConfig::default());
        assert!(matches!(invalid, Err(SeqoptError::InvalidSequence(_))));
    }

    #[test]
    fn test_specifications_are_bound_on_construction() {
        let problem = DnaOptimizationProblem::new(
            b"ATGCATGCAT",
            vec![Specification::from(EnforceGcContent::new(0.3, 0.7, None).unwrap())],
            vec![Specification::from(AvoidChanges::new())],
            OptimizerConfig::default(),
        )
        .unwrap();
        assert_eq!(problem.constraints()[0].location(), Some(Location::full(10)));
        assert_eq!(problem.objectives()[0].location(), Some(Location::full(10)));
    }

    #[test]
    fn test_contradictory_constraints_fail_early() {
        let result = DnaOptimizationProblem::new(
            b"AAAAAAAA",
            vec![
                Specification::from(EnforceSequence::new("AAAA").unwrap()),
                Specification::from(EnforceSequence::new("CC").unwrap()),
            ],
            Vec::new(),
            OptimizerConfig::default(),
        );
        assert!(matches!(result, Err(SeqoptError::NoSolution { .. })));
    }

    #[test]
    fn test_apply_and_revert_mutations() {
        let mut problem = DnaOptimizationProblem::new(
            b"AAAAAAAA",
            Vec::new(),
            Vec::new(),
            OptimizerConfig::default(),
        )
        .unwrap();
        let previous = problem.apply_mutations(&[(1, b'C'), (6, b'G'), (40, b'T')]);
        assert_eq!(problem.sequence(), b"ACAAAAGA");
        assert_eq!(problem.number_of_edits(), 2);
        assert_eq!(previous, vec![(1, b'A'), (6, b'A')]);

        problem.revert_mutations(&previous);
        assert_eq!(problem.sequence(), b"AAAAAAAA");
        assert_eq!(problem.number_of_edits(), 0);
    }

    #[test]
    fn test_evaluation_summaries() {
        let problem = DnaOptimizationProblem::new(
            b"AAAAGAATTCAAAA",
            vec![Specification::from(AvoidPattern::new("GAATTC".parse().unwrap()))],
            vec![Specification::from(EnforceGcContent::new(0.4, 0.6, None).unwrap())],
            OptimizerConfig::default(),
        )
        .unwrap();

        assert!(!problem.all_constraints_pass().unwrap());
        assert!(problem.objective_score().unwrap() < 0.0);
        let summary = problem.constraints_text_summary().unwrap();
        assert!(summary.contains("1 failing"));
        assert!(summary.contains("AvoidPattern"));
        assert!(problem.objectives_text_summary().unwrap().contains("Total score"));
    }
}
