use std::fmt;

use thiserror::Error;

use crate::location::Location;

/// Nucleotide choices at one position, as a bitmask (A=1, C=2, G=4, T=8).
pub type NucleotideMask = u8;

/// A single point mutation: sequence index and the new nucleotide.
pub type Mutation = (usize, u8);

/// Role a specification plays once attached to a problem.
///
/// Constraints must pass for a sequence to be accepted; objectives are
/// only maximized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecificationRole {
    /// Hard requirement
    Constraint,
    /// Soft, boost-weighted score to maximize
    Objective,
}

impl fmt::Display for SpecificationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constraint => write!(f, "constraint"),
            Self::Objective => write!(f, "objective"),
        }
    }
}

/// Error types raised while configuring, binding or solving a problem.
///
/// A specification that evaluates to a failing score is not an error;
/// these variants cover malformed configuration and invalid state only.
#[derive(Error, Debug)]
pub enum SeqoptError {
    /// Location with `end < start`
    #[error("Invalid location: end {end} is before start {start}")]
    InvalidLocation { start: usize, end: usize },
    /// Invalid parameter combination at construction time
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Pattern notation could not be parsed or compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    /// Sequence contains symbols outside the nucleotide alphabet
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
    /// Specification evaluated before being bound to a problem
    #[error("Unbound specification: {0} has no location, bind it to a problem first")]
    UnboundSpecification(String),
    /// The search budget was exhausted without satisfying every constraint
    #[error("No solution found: {message}")]
    NoSolution {
        message: String,
        location: Option<Location>,
    },
    /// File I/O operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Error parsing input data
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Malformed JSON specification file
    #[error("Specification file error: {0}")]
    SpecificationFile(#[from] serde_json::Error),
}

impl SeqoptError {
    /// Location of the breach the solver gave up on, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::NoSolution { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(SpecificationRole::Constraint.to_string(), "constraint");
        assert_eq!(SpecificationRole::Objective.to_string(), "objective");
    }

    #[test]
    fn test_error_messages() {
        let error = SeqoptError::InvalidLocation { start: 10, end: 5 };
        assert_eq!(
            error.to_string(),
            "Invalid location: end 5 is before start 10"
        );

        let error = SeqoptError::UnboundSpecification("AvoidChanges".to_string());
        assert!(error.to_string().contains("AvoidChanges"));
    }

    #[test]
    fn test_no_solution_location() {
        let location = Location::new(3, 9).unwrap();
        let error = SeqoptError::NoSolution {
            message: "stuck".to_string(),
            location: Some(location),
        };
        assert_eq!(error.location(), Some(&location));
        assert!(SeqoptError::ParseError("x".to_string()).location().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: SeqoptError = io_error.into();
        assert!(matches!(error, SeqoptError::IoError(_)));
    }
}
