//! Constraint resolution by local random search.

use log::{debug, info};

use super::{evaluate_local, failing_score, localize_all};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::specification::{EvaluationFilter, SpecificationRule};
use crate::types::{SeqoptError, SpecificationRole};

impl DnaOptimizationProblem {
    /// Mutates the sequence until every constraint passes.
    ///
    /// Each breach location of each failing constraint is searched in turn.
    /// When the budget of a location runs out, the search is retried on a
    /// location twice as wide, up to the whole sequence.
    ///
    /// With `final_check`, a last full sweep must pass as well.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::NoSolution`] carrying the breach location that
    /// could not be fixed.
    pub fn resolve_constraints(&mut self, final_check: bool) -> Result<(), SeqoptError> {
        let failing = self
            .constraints_evaluations()?
            .filter(EvaluationFilter::Failing);
        if failing.is_empty() {
            info!("All {} constraints already pass", self.constraints().len());
            return Ok(());
        }
        info!("Resolving {} failing constraints", failing.len());

        for evaluation in &failing {
            // earlier fixes may already have resolved this one
            let current = evaluation.specification.evaluate(self)?;
            if current.passes() {
                continue;
            }
            let label = current.specification.label();
            debug!("{label}: {} breach locations", current.locations.len());
            for location in &current.locations {
                self.resolve_location(location, &label)?;
            }
        }

        if final_check {
            let evaluations = self.constraints_evaluations()?;
            if !evaluations.all_passing() {
                return Err(SeqoptError::NoSolution {
                    message: format!(
                        "constraints still failing after resolution\n{}",
                        evaluations.text_summary()
                    ),
                    location: evaluations.failing_locations().first().copied(),
                });
            }
        }
        info!("Constraints resolved with {} edits", self.number_of_edits());
        Ok(())
    }

    fn resolve_location(&mut self, location: &Location, label: &str) -> Result<(), SeqoptError> {
        let mut window = location.clipped(self.len());
        loop {
            if self.search_constraints_at(&window)? {
                return Ok(());
            }
            let widened = window.extended(window.len().max(1)).clipped(self.len());
            if widened == window {
                return Err(SeqoptError::NoSolution {
                    message: format!(
                        "{label}: no mutation fixes location {location} within {} iterations",
                        self.config.max_random_iters
                    ),
                    location: Some(*location),
                });
            }
            debug!("Widening search around {location} to {widened}");
            window = widened;
        }
    }

    /// Random search inside `window`; `true` once the localized constraints pass.
    fn search_constraints_at(&mut self, window: &Location) -> Result<bool, SeqoptError> {
        let constraints = localize_all(self.constraints(), window);
        let evaluations = evaluate_local(self, &constraints, SpecificationRole::Constraint)?;
        if evaluations.all_passing() {
            return Ok(true);
        }
        let mut score = failing_score(&evaluations);

        for _ in 0..self.config.max_random_iters {
            let mutations = self.draw_mutations(window);
            if mutations.is_empty() {
                debug!("No mutable position in {window}");
                return Ok(false);
            }

            let previous = self.apply_mutations(&mutations);
            let candidate = evaluate_local(self, &constraints, SpecificationRole::Constraint)?;
            if candidate.all_passing() {
                return Ok(true);
            }
            let candidate_score = failing_score(&candidate);
            if candidate_score >= score {
                score = candidate_score;
            } else {
                self.revert_mutations(&previous);
            }
        }
        Ok(false)
    }
}
