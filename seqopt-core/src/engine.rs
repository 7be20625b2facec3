use std::io::Read;
use std::path::Path;

use log::info;
use rayon::prelude::*;

use crate::config::{OptimizerConfig, ProblemSpecifications};
use crate::constants::DEFAULT_SEQUENCE_HEADER;
use crate::problem::DnaOptimizationProblem;
use crate::results::{OptimizationResults, SequenceInfo};
use crate::sequence::{FastaRecord, gc_fraction, read_fasta_from, read_fasta_sequences};
use crate::specification::Specification;
use crate::types::SeqoptError;

/// High-level optimizer: one set of specifications applied to any number of
/// sequences.
///
/// Specifications are validated once, when the optimizer is built. Every
/// sequence then gets its own [`DnaOptimizationProblem`], which binds the
/// specifications to that sequence, resolves the constraints and optimizes
/// the objectives.
///
/// # Examples
///
/// ## Optimize a sequence string
///
/// ```rust
/// use seqopt_core::SequenceOptimizer;
/// use seqopt_core::config::{OptimizerConfig, ProblemSpecifications};
///
/// let specifications = ProblemSpecifications::from_json(
///     r#"{"constraints": [{"type": "avoid_pattern", "pattern": "GAATTC"}]}"#,
/// )?;
/// let optimizer = SequenceOptimizer::with_config(OptimizerConfig::default(), specifications)?;
///
/// let results = optimizer.optimize_sequence("AAAAGAATTCAAAA", Some("insert".to_string()))?;
/// assert!(results.constraints.all_passing());
/// assert!(!results.sequence_string().contains("GAATTC"));
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
///
/// ## Optimize a FASTA file
///
/// ```rust,no_run
/// use seqopt_core::SequenceOptimizer;
/// use seqopt_core::config::{OptimizerConfig, ProblemSpecifications};
///
/// let optimizer = SequenceOptimizer::with_config(
///     OptimizerConfig { num_threads: Some(4), ..Default::default() },
///     ProblemSpecifications::from_file("specs.json")?,
/// )?;
/// for result in optimizer.optimize_fasta_file("constructs.fasta")? {
///     println!("{}: {} edits", result.sequence_info.header, result.sequence_info.num_edits);
/// }
/// # Ok::<(), seqopt_core::types::SeqoptError>(())
/// ```
#[derive(Debug)]
pub struct SequenceOptimizer {
    /// Search settings shared by every sequence
    pub config: OptimizerConfig,
    constraints: Vec<Specification>,
    objectives: Vec<Specification>,
}

impl SequenceOptimizer {
    /// Validates `specifications` and applies the thread settings.
    ///
    /// # Errors
    ///
    /// Returns the first construction error of a specification, or
    /// [`SeqoptError::InvalidParameter`] if the thread pool cannot be
    /// configured (e.g. it was already initialized).
    pub fn with_config(
        config: OptimizerConfig,
        specifications: ProblemSpecifications,
    ) -> Result<Self, SeqoptError> {
        let (constraints, objectives) = specifications.build()?;

        if let Some(num_threads) = config.num_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    SeqoptError::InvalidParameter(format!("Failed to configure thread pool: {e}"))
                })?;
        }

        Ok(Self::from_specifications(config, constraints, objectives))
    }

    /// Builds an optimizer from already validated specifications.
    ///
    /// Leaves the global thread pool untouched.
    #[must_use]
    pub const fn from_specifications(
        config: OptimizerConfig,
        constraints: Vec<Specification>,
        objectives: Vec<Specification>,
    ) -> Self {
        Self {
            config,
            constraints,
            objectives,
        }
    }

    #[must_use]
    pub fn constraints(&self) -> &[Specification] {
        &self.constraints
    }

    #[must_use]
    pub fn objectives(&self) -> &[Specification] {
        &self.objectives
    }

    /// Optimizes every record of a FASTA file.
    ///
    /// Records are independent problems and run in parallel; record `i` is
    /// seeded with `seed + i`. Results keep the file order.
    ///
    /// # Errors
    ///
    /// I/O and parse errors of the file, or the first record that fails.
    pub fn optimize_fasta_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<OptimizationResults>, SeqoptError> {
        let records = read_fasta_sequences(path)?;
        self.optimize_records(records)
    }

    /// Same as [`SequenceOptimizer::optimize_fasta_file`] for any reader.
    pub fn optimize_fasta_from<R: Read>(
        &self,
        source: R,
    ) -> Result<Vec<OptimizationResults>, SeqoptError> {
        let records = read_fasta_from(source)?;
        self.optimize_records(records)
    }

    fn optimize_records(
        &self,
        records: Vec<FastaRecord>,
    ) -> Result<Vec<OptimizationResults>, SeqoptError> {
        info!("Optimizing {} records", records.len());
        records
            .into_par_iter()
            .enumerate()
            .map(|(i, (header, description, sequence))| {
                let seed = self.config.seed.wrapping_add(i as u64);
                self.optimize_with_seed(&sequence, header, description, seed)
            })
            .collect()
    }

    /// Optimizes a sequence given as a string.
    ///
    /// `header` defaults to `seqopt_sequence_1`.
    pub fn optimize_sequence(
        &self,
        sequence: &str,
        header: Option<String>,
    ) -> Result<OptimizationResults, SeqoptError> {
        let header = header.unwrap_or_else(|| DEFAULT_SEQUENCE_HEADER.to_string());
        self.optimize_sequence_bytes(sequence.as_bytes(), header, None)
    }

    /// Resolves the constraints, then optimizes the objectives.
    ///
    /// # Errors
    ///
    /// - [`SeqoptError::InvalidSequence`] for symbols outside `ACGTU`
    /// - binding errors of the specifications on this sequence
    /// - [`SeqoptError::NoSolution`] when a constraint cannot be satisfied
    pub fn optimize_sequence_bytes(
        &self,
        sequence: &[u8],
        header: String,
        description: Option<String>,
    ) -> Result<OptimizationResults, SeqoptError> {
        self.optimize_with_seed(sequence, header, description, self.config.seed)
    }

    fn optimize_with_seed(
        &self,
        sequence: &[u8],
        header: String,
        description: Option<String>,
        seed: u64,
    ) -> Result<OptimizationResults, SeqoptError> {
        let config = OptimizerConfig {
            seed,
            ..self.config.clone()
        };
        let mut problem = DnaOptimizationProblem::new(
            sequence,
            self.constraints.clone(),
            self.objectives.clone(),
            config,
        )?;
        info!("{header}: {}bp", problem.len());

        problem.resolve_constraints(true)?;
        problem.optimize()?;

        let constraints = problem.constraints_evaluations()?;
        let objectives = problem.objectives_evaluations()?;
        info!(
            "{header}: {} edits, objective score {:.2}",
            problem.number_of_edits(),
            objectives.scores_sum()
        );

        Ok(OptimizationResults {
            sequence_info: SequenceInfo {
                header,
                description,
                length: problem.len(),
                gc_content: gc_fraction(problem.sequence()),
                num_edits: problem.number_of_edits(),
            },
            sequence: problem.sequence().to_vec(),
            constraints,
            objectives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn specifications(json: &str) -> ProblemSpecifications {
        ProblemSpecifications::from_json(json).unwrap()
    }

    fn optimizer(json: &str) -> SequenceOptimizer {
        SequenceOptimizer::with_config(OptimizerConfig::default(), specifications(json)).unwrap()
    }

    #[test]
    fn test_invalid_specifications_fail_at_construction() {
        let result = SequenceOptimizer::with_config(
            OptimizerConfig::default(),
            specifications(r#"{"constraints": [{"type": "avoid_nonunique_segments", "min_length": 0}]}"#),
        );
        assert!(matches!(result, Err(SeqoptError::InvalidParameter(_))));
    }

    #[test]
    fn test_optimize_sequence_resolves_constraints() {
        let optimizer = optimizer(
            r#"{"constraints": [{"type": "avoid_pattern", "pattern": "GAATTC"}],
                "objectives": [{"type": "avoid_changes"}]}"#,
        );
        let results = optimizer
            .optimize_sequence("ttttGAATTCttttGAATTCtttt", None)
            .unwrap();

        assert_eq!(results.sequence_info.header, "seqopt_sequence_1");
        assert_eq!(results.sequence_info.length, 24);
        assert!(results.sequence_info.num_edits > 0);
        assert!(results.constraints.all_passing());
        assert!(!results.sequence_string().contains("GAATTC"));
    }

    #[test]
    fn test_untouched_sequence_reports_zero_edits() {
        let optimizer = optimizer(r#"{"constraints": [{"type": "avoid_pattern", "pattern": "6xA"}]}"#);
        let results = optimizer
            .optimize_sequence_bytes(b"ATGCATGCAT", "s".to_string(), Some("desc".to_string()))
            .unwrap();
        assert_eq!(results.sequence, b"ATGCATGCAT");
        assert_eq!(results.sequence_info.num_edits, 0);
        assert_eq!(results.sequence_info.gc_content, 0.4);
        assert_eq!(results.sequence_info.description.as_deref(), Some("desc"));
        assert!(results.remaining_breaches().is_empty());
    }

    #[test]
    fn test_impossible_constraint_is_an_error() {
        let optimizer = optimizer(
            r#"{"constraints": [
                {"type": "avoid_changes"},
                {"type": "avoid_pattern", "pattern": "AAAA"}
            ]}"#,
        );
        let result = optimizer.optimize_sequence("CCAAAACC", None);
        assert!(matches!(result, Err(SeqoptError::NoSolution { .. })));
    }

    #[test]
    fn test_optimize_fasta_file_keeps_record_order() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            ">first\nAAAAGAATTCAAAA\n>second one\nCCCCGAATTCCCCC\n>third\nATATATAT\n",
        )
        .unwrap();
        let optimizer = optimizer(r#"{"constraints": [{"type": "avoid_pattern", "pattern": "GAATTC"}]}"#);

        let results = optimizer.optimize_fasta_file(temp_file.path()).unwrap();

        let headers: Vec<&str> = results
            .iter()
            .map(|r| r.sequence_info.header.as_str())
            .collect();
        assert_eq!(headers, ["first", "second", "third"]);
        assert_eq!(results[1].sequence_info.description.as_deref(), Some("one"));
        assert!(results.iter().all(|r| r.constraints.all_passing()));
        assert_eq!(results[2].sequence, b"ATATATAT");
    }

    #[test]
    fn test_fasta_runs_are_reproducible() {
        let fasta = ">a\nTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT\n>b\nTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT\n";
        let optimizer = optimizer(r#"{"objectives": [{"type": "enforce_gc_content", "target": 0.5}]}"#);

        let first = optimizer.optimize_fasta_from(fasta.as_bytes()).unwrap();
        let second = optimizer.optimize_fasta_from(fasta.as_bytes()).unwrap();

        assert_eq!(first[0].sequence, second[0].sequence);
        assert_eq!(first[1].sequence, second[1].sequence);
    }
}
