//! Objective optimization by local random search.

use log::{debug, info};

use super::{evaluate_local, localize_all};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::specification::SpecificationRule;
use crate::types::{SeqoptError, SpecificationRole};

impl DnaOptimizationProblem {
    /// Improves the objectives without breaking any constraint.
    ///
    /// Objectives already at their best possible score are skipped. Every
    /// other objective is searched around each of its breach locations, or
    /// over its whole location when it reports none. A mutation batch is only
    /// kept when all localized constraints pass and the localized objective
    /// score strictly improves.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::NoSolution`] when constraints fail on entry;
    /// call [`DnaOptimizationProblem::resolve_constraints`] first.
    pub fn optimize(&mut self) -> Result<(), SeqoptError> {
        let constraints = self.constraints_evaluations()?;
        if !constraints.all_passing() {
            return Err(SeqoptError::NoSolution {
                message: "optimization requires every constraint to pass, resolve constraints first"
                    .to_string(),
                location: constraints.failing_locations().first().copied(),
            });
        }
        if self.objectives().is_empty() {
            return Ok(());
        }

        let objectives = self.objectives_evaluations()?;
        let initial_score = objectives.scores_sum();
        info!(
            "Optimizing {} objectives, initial score {initial_score:.2}",
            objectives.len()
        );

        for evaluation in &objectives {
            if evaluation.passes() {
                continue;
            }
            let locations: Vec<Location> = if evaluation.locations.is_empty() {
                evaluation.specification.location().into_iter().collect()
            } else {
                evaluation.locations.clone()
            };
            debug!(
                "{}: optimizing {} locations",
                evaluation.specification.label(),
                locations.len()
            );
            for location in &locations {
                self.optimize_location(location)?;
            }
        }

        info!(
            "Objective score {initial_score:.2} -> {:.2}",
            self.objective_score()?
        );
        Ok(())
    }

    fn optimize_location(&mut self, location: &Location) -> Result<(), SeqoptError> {
        let window = location.clipped(self.len());
        let objectives = localize_all(self.objectives(), &window);
        let constraints = localize_all(self.constraints(), &window);
        if objectives.is_empty() {
            return Ok(());
        }

        let current = evaluate_local(self, &objectives, SpecificationRole::Objective)?;
        if current.all_passing() {
            return Ok(());
        }
        let mut best = current.scores_sum();

        for _ in 0..self.config.optimization_iters {
            let mutations = self.draw_mutations(&window);
            if mutations.is_empty() {
                debug!("No mutable position in {window}");
                break;
            }
            let previous = self.apply_mutations(&mutations);

            if evaluate_local(self, &constraints, SpecificationRole::Constraint)?.all_passing() {
                let candidate = evaluate_local(self, &objectives, SpecificationRole::Objective)?;
                let score = candidate.scores_sum();
                if score > best {
                    best = score;
                    if candidate.all_passing() {
                        break;
                    }
                    continue;
                }
            }
            self.revert_mutations(&previous);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::OptimizerConfig;
    use crate::problem::DnaOptimizationProblem;
    use crate::specification::{AvoidChanges, AvoidPattern, EnforceGcContent, Specification};
    use crate::types::SeqoptError;

    #[test]
    fn test_optimize_requires_passing_constraints() {
        let mut problem = DnaOptimizationProblem::new(
            b"AAAAGAATTCAAAA",
            vec![Specification::from(AvoidPattern::new("GAATTC".parse().unwrap()))],
            vec![Specification::from(EnforceGcContent::with_target(0.5, None).unwrap())],
            OptimizerConfig::default(),
        )
        .unwrap();
        assert!(matches!(
            problem.optimize(),
            Err(SeqoptError::NoSolution { .. })
        ));
    }

    #[test]
    fn test_optimize_improves_objective_and_keeps_constraints() {
        let mut problem = DnaOptimizationProblem::new(
            &[b'A'; 40],
            vec![Specification::from(AvoidPattern::new("GGGG".parse().unwrap()))],
            vec![Specification::from(EnforceGcContent::with_target(0.5, None).unwrap())],
            OptimizerConfig::default(),
        )
        .unwrap();
        let before = problem.objective_score().unwrap();

        problem.optimize().unwrap();

        assert!(problem.objective_score().unwrap() > before);
        assert!(problem.all_constraints_pass().unwrap());
        assert!(problem.number_of_edits() > 0);
    }

    #[test]
    fn test_passing_objectives_are_left_alone() {
        let mut problem = DnaOptimizationProblem::new(
            b"ATGCATGCATGC",
            Vec::new(),
            vec![Specification::from(AvoidChanges::new())],
            OptimizerConfig::default(),
        )
        .unwrap();
        problem.optimize().unwrap();
        assert_eq!(problem.number_of_edits(), 0);
    }

    #[test]
    fn test_optimization_is_reproducible_with_seed() {
        let run = || {
            let mut problem = DnaOptimizationProblem::new(
                &[b'T'; 60],
                Vec::new(),
                vec![Specification::from(EnforceGcContent::new(0.4, 0.6, Some(10)).unwrap())],
                OptimizerConfig {
                    seed: 7,
                    ..Default::default()
                },
            )
            .unwrap();
            problem.optimize().unwrap();
            problem.sequence_string()
        };
        assert_eq!(run(), run());
    }
}
