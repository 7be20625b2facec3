//! Evaluation results and their aggregation.

use std::fmt;

use super::{Specification, SpecificationRule};
use crate::constants::DEFAULT_BEST_POSSIBLE_SCORE;
use crate::location::Location;
use crate::types::SpecificationRole;

/// Result of evaluating one rule on one sequence state.
#[derive(Debug, Clone)]
pub struct SpecEvaluation {
    /// The rule that was evaluated, possibly a localized copy.
    pub specification: Specification,
    /// Higher is better; built-in rules pass at 0.
    pub score: f64,
    /// Breach regions, sorted by `(start, end)`.
    pub locations: Vec<Location>,
    pub message: String,
}

impl SpecEvaluation {
    #[must_use]
    pub fn new(
        specification: Specification,
        score: f64,
        mut locations: Vec<Location>,
        message: String,
    ) -> Self {
        locations.sort();
        Self {
            specification,
            score,
            locations,
            message,
        }
    }

    /// Whether the score reached the rule's best possible score.
    #[must_use]
    pub fn passes(&self) -> bool {
        let best = self
            .specification
            .best_possible_score()
            .unwrap_or(DEFAULT_BEST_POSSIBLE_SCORE);
        self.score >= best
    }

    /// Score weighted by the rule's boost.
    #[must_use]
    pub fn weighted_score(&self) -> f64 {
        self.score * self.specification.boost()
    }
}

impl fmt::Display for SpecEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passes() { "✔PASS" } else { "✘FAIL" };
        write!(
            f,
            "{status} ┍ {}\n      │ {}",
            self.specification.label(),
            self.message
        )
    }
}

/// Which evaluations [`SpecEvaluations::filter`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationFilter {
    Passing,
    Failing,
}

/// Annotation derived from a breach, ready for a feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct BreachFeature {
    pub location: Location,
    pub label: String,
    pub role: SpecificationRole,
}

/// Evaluations of every constraint, or every objective, of a problem.
#[derive(Debug, Clone)]
pub struct SpecEvaluations {
    pub role: SpecificationRole,
    pub evaluations: Vec<SpecEvaluation>,
}

impl SpecEvaluations {
    /// Collects evaluations in order, dropping those of void rules.
    #[must_use]
    pub fn new(role: SpecificationRole, evaluations: Vec<SpecEvaluation>) -> Self {
        let evaluations = evaluations
            .into_iter()
            .filter(|evaluation| !evaluation.specification.is_void())
            .collect();
        Self { role, evaluations }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpecEvaluation> {
        self.evaluations.iter()
    }

    /// New set keeping only passing or only failing evaluations.
    #[must_use]
    pub fn filter(&self, which: EvaluationFilter) -> Self {
        let keep_passing = which == EvaluationFilter::Passing;
        Self {
            role: self.role,
            evaluations: self
                .evaluations
                .iter()
                .filter(|evaluation| evaluation.passes() == keep_passing)
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn all_passing(&self) -> bool {
        self.evaluations.iter().all(SpecEvaluation::passes)
    }

    /// Sum of boost-weighted scores.
    #[must_use]
    pub fn scores_sum(&self) -> f64 {
        self.evaluations.iter().map(SpecEvaluation::weighted_score).sum()
    }

    /// Breach locations of the failing evaluations, flattened and sorted.
    #[must_use]
    pub fn failing_locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = self
            .evaluations
            .iter()
            .filter(|evaluation| !evaluation.passes())
            .flat_map(|evaluation| evaluation.locations.iter().copied())
            .collect();
        locations.sort();
        locations
    }

    /// One feature per breach location of every evaluation.
    #[must_use]
    pub fn locations_as_features(&self) -> Vec<BreachFeature> {
        self.evaluations
            .iter()
            .flat_map(|evaluation| {
                let label = evaluation.specification.label();
                evaluation.locations.iter().map(move |&location| BreachFeature {
                    location,
                    label: label.clone(),
                    role: self.role,
                })
            })
            .collect()
    }

    /// Multi-line report, failing evaluations first.
    #[must_use]
    pub fn text_summary(&self) -> String {
        let failing = self.filter(EvaluationFilter::Failing);
        let passing = self.filter(EvaluationFilter::Passing);
        let mut summary = format!(
            "===> {} {}s: {} failing, {} passing\n",
            self.len(),
            self.role,
            failing.len(),
            passing.len()
        );
        if self.role == SpecificationRole::Objective {
            summary.push_str(&format!("Total score: {:.2}\n", self.scores_sum()));
        }
        for evaluation in failing.iter().chain(passing.iter()) {
            summary.push_str(&format!("{evaluation}\n"));
        }
        summary
    }
}

impl<'a> IntoIterator for &'a SpecEvaluations {
    type Item = &'a SpecEvaluation;
    type IntoIter = std::slice::Iter<'a, SpecEvaluation>;

    fn into_iter(self) -> Self::IntoIter {
        self.evaluations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::{
        AvoidNonuniqueSegments, EnforceGcContent, SpecChanges, VoidSpecification,
    };

    fn loc(start: usize, end: usize) -> Location {
        Location::new(start, end).unwrap()
    }

    fn gc_spec(boost: f64) -> Specification {
        Specification::from(EnforceGcContent::new(0.4, 0.6, Some(10)).unwrap())
            .copy_with_changes(&SpecChanges::new().with_boost(boost).unwrap())
    }

    fn sample() -> SpecEvaluations {
        let kmers = Specification::from(AvoidNonuniqueSegments::new(4, false).unwrap());
        SpecEvaluations::new(
            SpecificationRole::Objective,
            vec![
                SpecEvaluation::new(gc_spec(2.0), -1.5, vec![loc(40, 60), loc(0, 10)], "gc".into()),
                SpecEvaluation::new(kmers, 0.0, Vec::new(), "kmers".into()),
                SpecEvaluation::new(
                    gc_spec(1.0).void(),
                    0.0,
                    Vec::new(),
                    "void".into(),
                ),
                SpecEvaluation::new(gc_spec(1.0), -0.5, vec![loc(5, 15)], "gc".into()),
            ],
        )
    }

    #[test]
    fn test_locations_sorted_on_construction() {
        let evaluation =
            SpecEvaluation::new(gc_spec(1.0), -1.0, vec![loc(8, 9), loc(1, 30), loc(1, 2)], String::new());
        assert_eq!(evaluation.locations, vec![loc(1, 2), loc(1, 30), loc(8, 9)]);
    }

    #[test]
    fn test_void_evaluations_are_dropped() {
        let evaluations = sample();
        assert_eq!(evaluations.len(), 3);
        let lone_void = SpecEvaluations::new(
            SpecificationRole::Constraint,
            vec![SpecEvaluation::new(
                Specification::from(VoidSpecification::from_parent("x")),
                0.0,
                Vec::new(),
                String::new(),
            )],
        );
        assert!(lone_void.is_empty());
        assert!(lone_void.all_passing());
    }

    #[test]
    fn test_filter_and_all_passing() {
        let evaluations = sample();
        assert!(!evaluations.all_passing());
        assert_eq!(evaluations.filter(EvaluationFilter::Failing).len(), 2);
        assert_eq!(evaluations.filter(EvaluationFilter::Passing).len(), 1);
        assert!(evaluations.filter(EvaluationFilter::Passing).all_passing());
    }

    #[test]
    fn test_scores_sum_is_boost_weighted() {
        let evaluations = sample();
        assert!((evaluations.scores_sum() - (-1.5 * 2.0 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_failing_locations_flattened_and_sorted() {
        let evaluations = sample();
        assert_eq!(
            evaluations.failing_locations(),
            vec![loc(0, 10), loc(5, 15), loc(40, 60)]
        );
    }

    #[test]
    fn test_locations_as_features() {
        let features = sample().locations_as_features();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.role == SpecificationRole::Objective));
        assert!(features[0].label.starts_with("EnforceGCContent"));
    }

    #[test]
    fn test_text_summary_lists_failures_first() {
        let summary = sample().text_summary();
        assert!(summary.starts_with("===> 3 objectives: 2 failing, 1 passing"));
        assert!(summary.contains("Total score: -3.50"));
        let first_fail = summary.find("FAIL").unwrap();
        let first_pass = summary.find("PASS").unwrap();
        assert!(first_fail < first_pass);
    }
}
