use std::io::Write;

use crate::{SeqoptError, results::OptimizationResults};

/// Write results as a text report
pub fn write_summary_format<W: Write>(
    writer: &mut W,
    results: &OptimizationResults,
) -> Result<(), SeqoptError> {
    let info = &results.sequence_info;
    match &info.description {
        Some(desc) => writeln!(writer, "# {} {}", info.header, desc)?,
        None => writeln!(writer, "# {}", info.header)?,
    }
    writeln!(
        writer,
        "# {} bp, {:.2}% GC, {} edits",
        info.length,
        info.gc_content * 100.0,
        info.num_edits
    )?;
    write!(writer, "{}", results.constraints.text_summary())?;
    if !results.objectives.is_empty() {
        write!(writer, "{}", results.objectives.text_summary())?;
    }
    writeln!(writer)?;
    Ok(())
}
