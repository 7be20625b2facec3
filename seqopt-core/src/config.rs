//! Optimizer settings and serde-backed specification files.
//!
//! Specifications are declared in two phases: a [`SpecificationConfig`]
//! holds user parameters exactly as written (JSON, CLI flags) and
//! [`SpecificationConfig::into_specification`] validates them into a
//! [`Specification`]. Binding to a sequence happens later, when the problem
//! is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HAIRPIN_STEM_SIZE, DEFAULT_HAIRPIN_WINDOW, DEFAULT_MAX_RANDOM_ITERS,
    DEFAULT_MUTATIONS_PER_ITERATION, DEFAULT_OPTIMIZATION_ITERS, DEFAULT_RANDOM_SEED,
    DEFAULT_TERMINAL_GC_WINDOW,
};
use crate::location::{Location, strand_from_sign};
use crate::patterns::SequencePattern;
use crate::specification::{
    AvoidChanges, AvoidHairpins, AvoidNonuniqueSegments, AvoidPattern, EnforceChanges,
    EnforceGcContent, EnforcePatternOccurrence, EnforceSequence, EnforceTerminalGcContent,
    SequenceLengthBounds, SpecChanges, Specification, SpecificationRule,
};
use crate::types::SeqoptError;

/// Report format for optimization results.
///
/// # Formats
///
/// - **Summary**: human readable constraint and objective report
/// - **GFF**: General Feature Format version 3, one line per breach
/// - **FASTA**: the optimized sequence only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Constraint and objective evaluations, failing first.
    #[default]
    Summary,

    /// General Feature Format version 3.
    ///
    /// Breaches that remain after optimization, as features on the
    /// optimized sequence.
    Gff,

    /// Optimized sequence as a FASTA record.
    Fasta,
}

/// Configuration of the search loops.
///
/// # Examples
///
/// ```rust
/// use seqopt_core::config::OptimizerConfig;
///
/// let config = OptimizerConfig {
///     seed: 42,
///     max_random_iters: 5_000,
///     num_threads: Some(4),
///     ..Default::default()
/// };
/// assert_eq!(config.mutations_per_iteration, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Random mutation batches tried per breach location while resolving
    /// constraints.
    ///
    /// **Default**: 1000
    pub max_random_iters: usize,

    /// Point mutations proposed per batch.
    ///
    /// **Default**: 2
    pub mutations_per_iteration: usize,

    /// Random mutation batches tried per location while optimizing
    /// objectives.
    ///
    /// **Default**: 1000
    pub optimization_iters: usize,

    /// Seed of the problem's PRNG. Identical seeds give identical runs.
    ///
    /// **Default**: 123
    pub seed: u64,

    /// Number of threads to use for parallel processing.
    ///
    /// When set, configures the Rayon thread pool used for full evaluation
    /// sweeps and multi-record FASTA files.
    ///
    /// **Default**: `None` (use all available cores)
    pub num_threads: Option<usize>,

    /// Format written by [`crate::output::write_results`].
    ///
    /// **Default**: [`ReportFormat::Summary`]
    pub report_format: ReportFormat,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_random_iters: DEFAULT_MAX_RANDOM_ITERS,
            mutations_per_iteration: DEFAULT_MUTATIONS_PER_ITERATION,
            optimization_iters: DEFAULT_OPTIMIZATION_ITERS,
            seed: DEFAULT_RANDOM_SEED,
            num_threads: None,
            report_format: ReportFormat::default(),
        }
    }
}

/// Location as written in a specification file.
///
/// `strand` is `1`, `-1` or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<i8>,
}

impl TryFrom<LocationConfig> for Location {
    type Error = SeqoptError;

    fn try_from(config: LocationConfig) -> Result<Self, Self::Error> {
        Self::with_strand(config.start, config.end, strand_from_sign(config.strand))
    }
}

/// User parameters of one specification.
///
/// ```rust
/// use seqopt_core::config::SpecificationConfig;
///
/// let config: SpecificationConfig = serde_json::from_str(
///     r#"{"type": "enforce_gc_content", "mini": 0.4, "maxi": 0.6, "window": 50}"#,
/// )?;
/// let specification = config.into_specification()?;
/// assert_eq!(
///     specification.to_string(),
///     "EnforceGCContent[global](min 0.40, max 0.60, 50bp window)"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecificationConfig {
    EnforceGcContent {
        #[serde(default)]
        mini: Option<f64>,
        #[serde(default)]
        maxi: Option<f64>,
        /// Sets both bounds.
        #[serde(default)]
        target: Option<f64>,
        #[serde(default)]
        window: Option<usize>,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    AvoidNonuniqueSegments {
        min_length: usize,
        #[serde(default)]
        include_reverse_complement: bool,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    AvoidPattern {
        /// DNA notation (`GGTCTC`) or homopolymer (`6xA`).
        pattern: String,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    EnforcePatternOccurrence {
        pattern: String,
        #[serde(default = "default_occurrences")]
        occurrences: usize,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    EnforceSequence {
        /// IUPAC string.
        sequence: String,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    AvoidChanges {
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    /// Every position must change unless `minimum` or `maximum` is given.
    EnforceChanges {
        #[serde(default)]
        minimum: Option<usize>,
        #[serde(default)]
        maximum: Option<usize>,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    EnforceTerminalGcContent {
        mini: f64,
        maxi: f64,
        #[serde(default = "default_terminal_window")]
        window_size: usize,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    SequenceLengthBounds {
        #[serde(default)]
        min_length: usize,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
    AvoidHairpins {
        #[serde(default = "default_stem_size")]
        stem_size: usize,
        #[serde(default = "default_hairpin_window")]
        hairpin_window: usize,
        #[serde(default)]
        location: Option<LocationConfig>,
        #[serde(default)]
        boost: Option<f64>,
    },
}

const fn default_occurrences() -> usize {
    1
}

const fn default_terminal_window() -> usize {
    DEFAULT_TERMINAL_GC_WINDOW
}

const fn default_stem_size() -> usize {
    DEFAULT_HAIRPIN_STEM_SIZE
}

const fn default_hairpin_window() -> usize {
    DEFAULT_HAIRPIN_WINDOW
}

impl SpecificationConfig {
    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Any construction error of the target rule, an invalid location, or a
    /// negative boost.
    pub fn into_specification(self) -> Result<Specification, SeqoptError> {
        let (specification, location, boost) = match self {
            Self::EnforceGcContent {
                mini,
                maxi,
                target,
                window,
                location,
                boost,
            } => {
                let rule = match target {
                    Some(target) => EnforceGcContent::with_target(target, window)?,
                    None => EnforceGcContent::new(mini.unwrap_or(0.0), maxi.unwrap_or(1.0), window)?,
                };
                (Specification::from(rule), location, boost)
            }
            Self::AvoidNonuniqueSegments {
                min_length,
                include_reverse_complement,
                location,
                boost,
            } => (
                Specification::from(AvoidNonuniqueSegments::new(
                    min_length,
                    include_reverse_complement,
                )?),
                location,
                boost,
            ),
            Self::AvoidPattern {
                pattern,
                location,
                boost,
            } => (
                Specification::from(AvoidPattern::new(pattern.parse::<SequencePattern>()?)),
                location,
                boost,
            ),
            Self::EnforcePatternOccurrence {
                pattern,
                occurrences,
                location,
                boost,
            } => (
                Specification::from(EnforcePatternOccurrence::new(
                    pattern.parse::<SequencePattern>()?,
                    occurrences,
                )),
                location,
                boost,
            ),
            Self::EnforceSequence {
                sequence,
                location,
                boost,
            } => {
                let mut rule = EnforceSequence::new(&sequence)?;
                if let Some(location) = location {
                    rule = rule.at_location(Location::try_from(location)?)?;
                }
                (Specification::from(rule), location, boost)
            }
            Self::AvoidChanges { location, boost } => {
                (Specification::from(AvoidChanges::new()), location, boost)
            }
            Self::EnforceChanges {
                minimum,
                maximum,
                location,
                boost,
            } => {
                let rule = match (minimum, maximum) {
                    (None, None) => EnforceChanges::new(),
                    (minimum, maximum) => EnforceChanges::between(minimum.unwrap_or(0), maximum)?,
                };
                (Specification::from(rule), location, boost)
            }
            Self::EnforceTerminalGcContent {
                mini,
                maxi,
                window_size,
                location,
                boost,
            } => (
                Specification::from(EnforceTerminalGcContent::new(mini, maxi, window_size)?),
                location,
                boost,
            ),
            Self::SequenceLengthBounds {
                min_length,
                max_length,
                location,
                boost,
            } => (
                Specification::from(SequenceLengthBounds::new(min_length, max_length)?),
                location,
                boost,
            ),
            Self::AvoidHairpins {
                stem_size,
                hairpin_window,
                location,
                boost,
            } => (
                Specification::from(AvoidHairpins::new(stem_size, hairpin_window)?),
                location,
                boost,
            ),
        };

        let mut changes = SpecChanges::new();
        if let Some(location) = location {
            changes = changes.with_location(Location::try_from(location)?);
        }
        if let Some(boost) = boost {
            changes = changes.with_boost(boost)?;
        }
        Ok(specification.copy_with_changes(&changes))
    }
}

/// Constraints and objectives of a specification file.
///
/// ```json
/// {
///   "constraints": [
///     {"type": "avoid_pattern", "pattern": "GGTCTC"},
///     {"type": "enforce_gc_content", "mini": 0.3, "maxi": 0.7, "window": 50}
///   ],
///   "objectives": [
///     {"type": "enforce_gc_content", "target": 0.5, "boost": 2.0}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemSpecifications {
    pub constraints: Vec<SpecificationConfig>,
    pub objectives: Vec<SpecificationConfig>,
}

impl ProblemSpecifications {
    /// # Errors
    ///
    /// Returns [`SeqoptError::SpecificationFile`] for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, SeqoptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON specification file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeqoptError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.objectives.is_empty()
    }

    /// Appends another set of specifications.
    pub fn extend(&mut self, other: Self) {
        self.constraints.extend(other.constraints);
        self.objectives.extend(other.objectives);
    }

    /// Validated `(constraints, objectives)`.
    pub fn build(&self) -> Result<(Vec<Specification>, Vec<Specification>), SeqoptError> {
        let build_all = |configs: &[SpecificationConfig]| {
            configs
                .iter()
                .cloned()
                .map(SpecificationConfig::into_specification)
                .collect::<Result<Vec<_>, _>>()
        };
        Ok((build_all(&self.constraints)?, build_all(&self.objectives)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OptimizerConfig::default();
        assert_eq!(config.max_random_iters, 1000);
        assert_eq!(config.mutations_per_iteration, 2);
        assert_eq!(config.seed, 123);
        assert_eq!(config.num_threads, None);
        assert_eq!(config.report_format, ReportFormat::Summary);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"seed": 9, "report_format": "gff"}"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.report_format, ReportFormat::Gff);
        assert_eq!(config.max_random_iters, 1000);
    }

    #[test]
    fn test_problem_specifications_from_json() {
        let specifications = ProblemSpecifications::from_json(
            r#"{
                "constraints": [
                    {"type": "avoid_pattern", "pattern": "GGTCTC"},
                    {"type": "enforce_gc_content", "mini": 0.3, "maxi": 0.7, "window": 50,
                     "location": {"start": 0, "end": 500, "strand": 1}},
                    {"type": "avoid_nonunique_segments", "min_length": 10,
                     "include_reverse_complement": true}
                ],
                "objectives": [
                    {"type": "enforce_gc_content", "target": 0.5, "boost": 2.0},
                    {"type": "avoid_changes"}
                ]
            }"#,
        )
        .unwrap();
        let (constraints, objectives) = specifications.build().unwrap();
        assert_eq!(constraints.len(), 3);
        assert_eq!(objectives.len(), 2);
        assert_eq!(constraints[1].location().unwrap().to_string(), "0-500(+)");
        assert_eq!(objectives[0].boost(), 2.0);
        assert_eq!(constraints[2].to_string(), "AvoidNonuniqueSegments(10)");
    }

    #[test]
    fn test_configuration_errors_surface_at_build() {
        let inverted = ProblemSpecifications::from_json(
            r#"{"constraints": [{"type": "enforce_gc_content", "mini": 0.8, "maxi": 0.2}]}"#,
        )
        .unwrap();
        assert!(matches!(
            inverted.build(),
            Err(SeqoptError::InvalidParameter(_))
        ));

        let bad_location = ProblemSpecifications::from_json(
            r#"{"constraints": [{"type": "avoid_changes", "location": {"start": 9, "end": 2}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            bad_location.build(),
            Err(SeqoptError::InvalidLocation { start: 9, end: 2 })
        ));

        let bad_boost = SpecificationConfig::AvoidChanges {
            location: None,
            boost: Some(-1.0),
        };
        assert!(bad_boost.into_specification().is_err());

        let misfit_sequence = ProblemSpecifications::from_json(
            r#"{"constraints": [{"type": "enforce_sequence", "sequence": "AC",
                "location": {"start": 0, "end": 10}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            misfit_sequence.build(),
            Err(SeqoptError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_extended_rules_from_json() {
        let specifications = ProblemSpecifications::from_json(
            r#"{
                "constraints": [
                    {"type": "avoid_pattern", "pattern": "4x3mer"},
                    {"type": "avoid_hairpins"},
                    {"type": "sequence_length_bounds", "min_length": 100, "max_length": 5000},
                    {"type": "enforce_terminal_gc_content", "mini": 0.4, "maxi": 0.6}
                ],
                "objectives": [
                    {"type": "enforce_changes", "location": {"start": 0, "end": 30}},
                    {"type": "enforce_changes", "maximum": 12}
                ]
            }"#,
        )
        .unwrap();
        let (constraints, objectives) = specifications.build().unwrap();
        let labels: Vec<String> = constraints.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "AvoidPattern[global](4x3mer)",
                "AvoidHairpins[global](stem 20, window 200)",
                "SequenceLengthBounds(100-5000)",
                "EnforceTerminalGCContent[global](min 0.40, max 0.60, 30bp ends)",
            ]
        );
        assert_eq!(objectives[0].to_string(), "EnforceChanges[0-30](all)");
        assert_eq!(objectives[1].to_string(), "EnforceChanges[global](min 0, max 12)");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProblemSpecifications::from_json(r#"{"constraints": [{"type": "no_such_rule"}]}"#),
            Err(SeqoptError::SpecificationFile(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.json");
        fs::write(&path, r#"{"objectives": [{"type": "avoid_changes"}]}"#).unwrap();
        let specifications = ProblemSpecifications::from_file(&path).unwrap();
        assert!(specifications.constraints.is_empty());
        assert_eq!(specifications.objectives.len(), 1);
    }
}
