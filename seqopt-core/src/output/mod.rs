//! Report writers for [`OptimizationResults`].
//!
//! ## Supported Formats
//!
//! - **Summary**: constraint and objective evaluations as text
//! - **GFF3**: remaining breaches as features of the optimized sequence
//! - **FASTA**: the optimized sequence
//!
//! ## Examples
//!
//! ```rust,no_run
//! use seqopt_core::SequenceOptimizer;
//! use seqopt_core::config::{OptimizerConfig, ProblemSpecifications, ReportFormat};
//! use seqopt_core::output::write_results;
//! use std::fs::File;
//!
//! let optimizer = SequenceOptimizer::with_config(
//!     OptimizerConfig::default(),
//!     ProblemSpecifications::from_file("specs.json")?,
//! )?;
//! let results = optimizer.optimize_fasta_file("constructs.fasta")?;
//!
//! let mut fasta = File::create("optimized.fasta")?;
//! let mut report = File::create("report.gff")?;
//! for result in &results {
//!     write_results(&mut fasta, result, ReportFormat::Fasta)?;
//!     write_results(&mut report, result, ReportFormat::Gff)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Write;

use crate::config::ReportFormat;
use crate::results::OptimizationResults;
use crate::types::SeqoptError;

mod formats {
    pub mod fasta;
    pub mod gff;
    pub mod summary;
}

use formats::{fasta::write_fasta_format, gff::write_gff_format, summary::write_summary_format};

/// Writes optimization results in the specified format.
///
/// # Errors
///
/// Returns [`SeqoptError::IoError`] if writing fails.
pub fn write_results<W: Write>(
    writer: &mut W,
    results: &OptimizationResults,
    format: ReportFormat,
) -> Result<(), SeqoptError> {
    match format {
        ReportFormat::Summary => write_summary_format(writer, results),
        ReportFormat::Gff => write_gff_format(writer, results),
        ReportFormat::Fasta => write_fasta_format(writer, results),
    }
}
