use std::fmt;

use super::{SpecChanges, SpecEvaluation, Specification, SpecificationBase, SpecificationRule};
use crate::location::Location;
use crate::problem::DnaOptimizationProblem;
use crate::types::{SeqoptError, SpecificationRole};

/// Neutral rule: always passes with score 0 and no breach.
///
/// Produced when a rule is localized to a region it does not depend on.
/// Evaluation sets drop it, so callers never special-case it.
#[derive(Debug, Clone, Default)]
pub struct VoidSpecification {
    base: SpecificationBase,
    parent: String,
}

impl VoidSpecification {
    /// Void rule standing in for the rule labelled `parent`.
    #[must_use]
    pub fn from_parent(parent: impl Into<String>) -> Self {
        Self {
            base: SpecificationBase::default(),
            parent: parent.into(),
        }
    }

    /// Label of the rule this one replaces.
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }
}

impl SpecificationRule for VoidSpecification {
    fn base(&self) -> &SpecificationBase {
        &self.base
    }

    fn evaluate(&self, _problem: &DnaOptimizationProblem) -> Result<SpecEvaluation, SeqoptError> {
        Ok(SpecEvaluation::new(
            Specification::from(self.clone()),
            0.0,
            Vec::new(),
            "Void specification".to_string(),
        ))
    }

    fn localized(&self, _location: &Location) -> Specification {
        Specification::from(self.clone())
    }

    fn copy_with_changes(&self, changes: &SpecChanges) -> Specification {
        Specification::from(Self {
            base: self.base.with_changes(changes),
            parent: self.parent.clone(),
        })
    }

    fn initialize_on_problem(
        &self,
        _problem: &DnaOptimizationProblem,
        _role: SpecificationRole,
    ) -> Result<Specification, SeqoptError> {
        Ok(Specification::from(self.clone()))
    }
}

impl fmt::Display for VoidSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Void({})", self.parent)
    }
}
