use crate::specification::{BreachFeature, EvaluationFilter, SpecEvaluations};

/// Outcome of optimizing one sequence.
///
/// Holds the optimized sequence together with the final constraint and
/// objective evaluations, so reports can be written without re-evaluating.
///
/// # Examples
///
/// ```rust,no_run
/// use seqopt_core::SequenceOptimizer;
/// use seqopt_core::config::{OptimizerConfig, ProblemSpecifications, ReportFormat};
/// use seqopt_core::output::write_results;
///
/// let specifications = ProblemSpecifications::from_file("specs.json")?;
/// let optimizer = SequenceOptimizer::with_config(OptimizerConfig::default(), specifications)?;
/// let results = optimizer.optimize_sequence("ATGCGATCG...", None)?;
///
/// println!("Sequence: {}", results.sequence_info.header);
/// println!("Edits: {}", results.sequence_info.num_edits);
/// println!("GC%: {:.2}", results.sequence_info.gc_content * 100.0);
///
/// let mut output = std::fs::File::create("report.gff")?;
/// write_results(&mut output, &results, ReportFormat::Gff)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct OptimizationResults {
    /// Information about the optimized sequence.
    pub sequence_info: SequenceInfo,

    /// Optimized sequence, uppercase `ACGT`.
    pub sequence: Vec<u8>,

    /// Constraint evaluations on the optimized sequence.
    pub constraints: SpecEvaluations,

    /// Objective evaluations on the optimized sequence.
    ///
    /// Failing objectives are expected; their score is what was maximized.
    pub objectives: SpecEvaluations,
}

impl OptimizationResults {
    /// Breaches of failing evaluations, constraints first.
    #[must_use]
    pub fn remaining_breaches(&self) -> Vec<BreachFeature> {
        let mut features = self
            .constraints
            .filter(EvaluationFilter::Failing)
            .locations_as_features();
        features.extend(
            self.objectives
                .filter(EvaluationFilter::Failing)
                .locations_as_features(),
        );
        features
    }

    #[must_use]
    pub fn sequence_string(&self) -> String {
        String::from_utf8_lossy(&self.sequence).into_owned()
    }
}

/// Information about a processed sequence.
///
/// # Examples
///
/// ```rust
/// # use seqopt_core::results::SequenceInfo;
/// let info = SequenceInfo {
///     header: "pUC19_insert".to_string(),
///     description: Some("cloning fragment".to_string()),
///     length: 1_200,
///     gc_content: 0.5042,
///     num_edits: 14,
/// };
///
/// println!("{}: {} bp, {:.2}% GC, {} edits",
///          info.header,
///          info.length,
///          info.gc_content * 100.0,
///          info.num_edits);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceInfo {
    /// Sequence identifier from FASTA header.
    pub header: String,

    /// Everything after the first word in the FASTA header line.
    pub description: Option<String>,

    /// Length of the sequence in base pairs.
    pub length: usize,

    /// GC content of the optimized sequence as a fraction (0.0 to 1.0).
    pub gc_content: f64,

    /// Positions that differ from the input sequence.
    pub num_edits: usize,
}
