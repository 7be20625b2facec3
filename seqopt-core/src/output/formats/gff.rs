use std::io::Write;

use bio::bio_types::strand::Strand;

use crate::{SeqoptError, constants::VERSION, results::OptimizationResults};

/// Escapes the characters GFF3 reserves in column 9.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => escaped.push_str("%3B"),
            '=' => escaped.push_str("%3D"),
            '&' => escaped.push_str("%26"),
            ',' => escaped.push_str("%2C"),
            '\t' => escaped.push_str("%09"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write remaining breaches in GFF format
pub fn write_gff_format<W: Write>(
    writer: &mut W,
    results: &OptimizationResults,
) -> Result<(), SeqoptError> {
    let info = &results.sequence_info;
    writeln!(writer, "##gff-version 3")?;
    writeln!(writer, "##sequence-region {} 1 {}", info.header, info.length)?;
    writeln!(
        writer,
        "# Optimization Data: version=seqopt.v{};edits={};gc_cont={:.2};objective_score={:.2}",
        VERSION,
        info.num_edits,
        info.gc_content * 100.0,
        results.objectives.scores_sum()
    )?;

    for (index, feature) in results.remaining_breaches().iter().enumerate() {
        let strand_char = match feature.location.strand() {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        };
        writeln!(
            writer,
            "{}\tseqopt_v{}\t{}_breach\t{}\t{}\t.\t{}\t.\tID={}_breach_{};Note={}",
            info.header,
            VERSION,
            feature.role,
            feature.location.start() + 1,
            feature.location.end(),
            strand_char,
            info.header,
            index + 1,
            escape_attribute(&feature.label)
        )?;
    }
    Ok(())
}
