//! # seqopt - Constraint-based DNA sequence optimization
//!
//! Mutates a DNA sequence until it satisfies a set of hard constraints, then
//! improves a set of soft objectives without breaking any constraint.
//!
//! ## Overview
//!
//! A problem is a sequence plus two lists of [`Specification`]s. Each
//! specification scores the sequence: a score at or above its best possible
//! score (`0` for every built-in rule) passes, anything lower fails, and a
//! failing evaluation reports the breach locations responsible.
//!
//! The solver fixes one breach at a time. It proposes random point mutations
//! inside the breach and re-evaluates *localized* copies of the rules, that
//! is, copies restricted to the part of the sequence a mutation there can
//! affect. Rules a breach cannot influence localize to a void specification
//! and are skipped.
//!
//! ## Features
//!
//! - **Built-in rules**: GC content bounds (global, windowed or at the
//!   ends), unique k-mers, hairpins, forbidden and counted patterns including
//!   tandem repeats, enforced IUPAC sequences, frozen or forced-change
//!   regions, length bounds
//! - **Localized evaluation**: cost of a mutation proportional to the rules it
//!   touches, not to the sequence length
//! - **Reproducible**: seeded PRNG, identical seeds give identical runs
//! - **Parallel processing**: full evaluation sweeps and FASTA records on Rayon
//! - **Reports**: text summary, GFF3 breaches, FASTA
//!
//! ## Quick Start
//!
//! ```rust
//! use seqopt_core::config::OptimizerConfig;
//! use seqopt_core::problem::DnaOptimizationProblem;
//! use seqopt_core::specification::{AvoidPattern, EnforceGcContent, Specification};
//!
//! let mut problem = DnaOptimizationProblem::new(
//!     b"ATATATATATGAATTCATATATATATATATATATATATATAT",
//!     vec![Specification::from(AvoidPattern::new("GAATTC".parse()?))],
//!     vec![Specification::from(EnforceGcContent::with_target(0.4, None)?)],
//!     OptimizerConfig::default(),
//! )?;
//!
//! problem.resolve_constraints(true)?;
//! problem.optimize()?;
//!
//! assert!(problem.all_constraints_pass()?);
//! println!("{}", problem.objectives_text_summary()?);
//! # Ok::<(), seqopt_core::types::SeqoptError>(())
//! ```
//!
//! For FASTA files and JSON specification files, see [`SequenceOptimizer`].
//!
//! ## Module Organization
//!
//! - [`location`]: half-open stranded intervals
//! - [`specification`]: the rule contract, built-in rules and evaluations
//! - [`problem`]: the mutable sequence, bound rules and mutation space
//! - [`algorithms`]: constraint resolution and objective optimization
//! - [`patterns`]: IUPAC pattern matching on both strands
//! - [`sequence`]: nucleotide utilities and FASTA I/O
//! - [`config`]: search settings and specification files
//! - [`engine`]: high-level driver for sequences and FASTA files
//! - [`results`]: per-sequence outcome
//! - [`output`]: report writers
//! - [`types`]: errors and shared aliases
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, SeqoptError>`](types::SeqoptError).
//! A failing specification is not an error; errors cover:
//!
//! - Invalid parameters, locations, patterns and sequences
//! - Specifications used before being bound to a problem
//! - Constraints the search could not satisfy
//! - I/O and file format errors

pub mod algorithms;
pub mod config;
pub mod constants;
pub mod engine;
pub mod location;
pub mod output;
pub mod patterns;
pub mod problem;
pub mod results;
pub mod sequence;
pub mod specification;
pub mod types;

pub use engine::SequenceOptimizer;
pub use location::Location;
pub use problem::DnaOptimizationProblem;
pub use specification::{Specification, SpecificationRule};
pub use types::SeqoptError;
