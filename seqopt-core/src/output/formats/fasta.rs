use std::io::Write;

use crate::{SeqoptError, results::OptimizationResults, sequence::write_fasta_record};

/// Write the optimized sequence as a FASTA record
pub fn write_fasta_format<W: Write>(
    writer: &mut W,
    results: &OptimizationResults,
) -> Result<(), SeqoptError> {
    write_fasta_record(
        writer,
        &results.sequence_info.header,
        results.sequence_info.description.as_deref(),
        &results.sequence,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::create_test_results;

    #[test]
    fn test_fasta_record() {
        let mut buffer = Vec::new();
        write_fasta_format(&mut buffer, &create_test_results()).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            ">test_seq Test sequence\nAAAATTTTGCGCGCGCAAAATTTT\n"
        );
    }
}
