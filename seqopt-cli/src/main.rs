//! # seqopt CLI - Command-Line DNA Sequence Optimizer
//!
//! Resolves constraints and optimizes objectives on every record of a FASTA
//! file.
//!
//! ## Usage
//!
//! ```bash
//! # Remove BsaI sites and keep GC between 40% and 60% in 50bp windows
//! seqopt -i insert.fasta -o optimized.fasta \
//!     --avoid-pattern GGTCTC --gc-min 0.4 --gc-max 0.6 --gc-window 50
//!
//! # Rules from a JSON file, remaining breaches as GFF
//! seqopt -i constructs.fasta -s specs.json -r breaches.gff -f gff
//! ```
//!
//! ## Options
//!
//! - `-i, --input <FILE>`: Input FASTA file (default: stdin)
//! - `-o, --output <FILE>`: Optimized FASTA file (default: stdout)
//! - `-r, --report <FILE>`: Report file
//! - `-f, --format <FORMAT>`: Report format: summary or gff (default: summary)
//! - `-s, --specs <FILE>`: JSON specification file
//! - `--gc-min <FRACTION>`, `--gc-max <FRACTION>`: GC content constraint
//! - `--gc-window <BP>`: Window of the GC content constraint
//! - `--unique-kmers <K>`: Forbid repeated k-mers
//! - `--avoid-pattern <PATTERN>`: Forbidden pattern, repeatable
//! - `--seed <SEED>`: Random seed (default: 123)
//! - `--max-iters <N>`: Mutation batches tried per location (default: 1000)
//! - `--threads <N>`: Worker threads (default: all cores)
//! - `-q, --quiet`: Only log warnings and errors
//!
//! Specifications given as flags are added to the constraints of the
//! specification file.

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::info;
use seqopt_core::config::{
    OptimizerConfig, ProblemSpecifications, ReportFormat, SpecificationConfig,
};
use seqopt_core::output::write_results;
use seqopt_core::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};

fn cli() -> Command {
    Command::new("seqopt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Constraint-based DNA sequence optimizer")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input FASTA file (default: stdin)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Optimized FASTA file (default: stdout)"),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .value_name("FILE")
                .help("Report file"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Report format: summary or gff")
                .default_value("summary"),
        )
        .arg(
            Arg::new("specs")
                .short('s')
                .long("specs")
                .value_name("FILE")
                .help("JSON specification file"),
        )
        .arg(
            Arg::new("gc-min")
                .long("gc-min")
                .value_name("FRACTION")
                .value_parser(value_parser!(f64))
                .help("Minimum GC content"),
        )
        .arg(
            Arg::new("gc-max")
                .long("gc-max")
                .value_name("FRACTION")
                .value_parser(value_parser!(f64))
                .help("Maximum GC content"),
        )
        .arg(
            Arg::new("gc-window")
                .long("gc-window")
                .value_name("BP")
                .value_parser(value_parser!(usize))
                .help("Sliding window of the GC content constraint"),
        )
        .arg(
            Arg::new("unique-kmers")
                .long("unique-kmers")
                .value_name("K")
                .value_parser(value_parser!(usize))
                .help("Forbid k-mers occurring more than once"),
        )
        .arg(
            Arg::new("avoid-pattern")
                .long("avoid-pattern")
                .value_name("PATTERN")
                .action(ArgAction::Append)
                .help("Forbidden pattern, IUPAC (GGTCTC) or homopolymer (6xA)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Random seed"),
        )
        .arg(
            Arg::new("max-iters")
                .long("max-iters")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Mutation batches tried per location"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Number of worker threads"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Quiet mode"),
        )
}

/// Rules from the specification file followed by the rules given as flags.
fn collect_specifications(
    matches: &ArgMatches,
) -> Result<ProblemSpecifications, Box<dyn std::error::Error>> {
    let mut specifications = match matches.get_one::<String>("specs") {
        Some(path) => ProblemSpecifications::from_file(path)?,
        None => ProblemSpecifications::default(),
    };

    let gc_min = matches.get_one::<f64>("gc-min").copied();
    let gc_max = matches.get_one::<f64>("gc-max").copied();
    if gc_min.is_some() || gc_max.is_some() {
        specifications.constraints.push(SpecificationConfig::EnforceGcContent {
            mini: gc_min,
            maxi: gc_max,
            target: None,
            window: matches.get_one::<usize>("gc-window").copied(),
            location: None,
            boost: None,
        });
    } else if matches.contains_id("gc-window") {
        return Err("--gc-window requires --gc-min or --gc-max".into());
    }

    if let Some(&min_length) = matches.get_one::<usize>("unique-kmers") {
        specifications
            .constraints
            .push(SpecificationConfig::AvoidNonuniqueSegments {
                min_length,
                include_reverse_complement: false,
                location: None,
                boost: None,
            });
    }

    if let Some(patterns) = matches.get_many::<String>("avoid-pattern") {
        for pattern in patterns {
            specifications.constraints.push(SpecificationConfig::AvoidPattern {
                pattern: pattern.clone(),
                location: None,
                boost: None,
            });
        }
    }

    if specifications.is_empty() {
        return Err("No specification given, use --specs or a specification flag".into());
    }
    Ok(specifications)
}

fn optimizer_config(matches: &ArgMatches) -> Result<OptimizerConfig, Box<dyn std::error::Error>> {
    let mut config = OptimizerConfig {
        num_threads: matches.get_one::<usize>("threads").copied(),
        ..Default::default()
    };
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = seed;
    }
    if let Some(&iters) = matches.get_one::<usize>("max-iters") {
        config.max_random_iters = iters;
        config.optimization_iters = iters;
    }
    config.report_format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("summary") | None => ReportFormat::Summary,
        Some("gff") => ReportFormat::Gff,
        Some(other) => return Err(format!("Invalid report format: {other}").into()),
    };
    Ok(config)
}

/// Main entry point for the seqopt CLI application.
///
/// Parses command-line arguments, builds the specifications, optimizes every
/// input record and writes the optimized sequences and the report.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let quiet = matches.get_flag("quiet");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if quiet { "warn" } else { "info" }),
    )
    .init();

    let config = optimizer_config(&matches)?;
    let report_format = config.report_format;
    let specifications = collect_specifications(&matches)?;
    let optimizer = SequenceOptimizer::with_config(config, specifications)?;
    info!(
        "{} constraints, {} objectives",
        optimizer.constraints().len(),
        optimizer.objectives().len()
    );

    let results = if let Some(input_file) = matches.get_one::<String>("input") {
        optimizer.optimize_fasta_file(input_file)?
    } else {
        optimizer.optimize_fasta_from(io::stdin().lock())?
    };

    let mut writer: Box<dyn Write> = if let Some(output_file) = matches.get_one::<String>("output")
    {
        Box::new(BufWriter::new(File::create(output_file)?))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    for result in &results {
        write_results(&mut writer, result, ReportFormat::Fasta)?;
    }
    writer.flush()?;

    if let Some(report_file) = matches.get_one::<String>("report") {
        let mut report = BufWriter::new(File::create(report_file)?);
        for result in &results {
            write_results(&mut report, result, report_format)?;
        }
        report.flush()?;
    }

    info!(
        "Optimization complete! {} edits in {} sequences.",
        results
            .iter()
            .map(|r| r.sequence_info.num_edits)
            .sum::<usize>(),
        results.len()
    );

    Ok(())
}
