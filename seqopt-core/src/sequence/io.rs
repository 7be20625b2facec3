use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use bio::io::fasta;

use crate::types::SeqoptError;

/// Sequence record: identifier, optional description, raw sequence bytes.
pub type FastaRecord = (String, Option<String>, Vec<u8>);

/// Read every record of a FASTA file using rust-bio.
pub fn read_fasta_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>, SeqoptError> {
    let file = File::open(path)?;
    read_fasta_from(file)
}

/// Read every record from any FASTA source (file, stdin, buffer).
pub fn read_fasta_from<R: Read>(source: R) -> Result<Vec<FastaRecord>, SeqoptError> {
    let reader = fasta::Reader::new(source);
    let mut sequences = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| SeqoptError::ParseError(e.to_string()))?;
        let id = record.id().to_string();
        let description = record.desc().map(String::from);
        let seq = record.seq().to_vec();
        sequences.push((id, description, seq));
    }

    Ok(sequences)
}

/// Write one FASTA record.
pub fn write_fasta_record<W: Write>(
    writer: W,
    id: &str,
    description: Option<&str>,
    sequence: &[u8],
) -> Result<(), SeqoptError> {
    let mut fasta_writer = fasta::Writer::new(writer);
    fasta_writer.write(id, description, sequence)?;
    fasta_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_fasta_sequences_basic() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), ">test_sequence\nATCG\nGCTA\n").unwrap();

        let sequences = read_fasta_sequences(temp_file.path()).unwrap();
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].0, "test_sequence");
        assert_eq!(sequences[0].2, b"ATCGGCTA".to_vec());
    }

    #[test]
    fn test_read_fasta_sequences_with_description() {
        let fasta_content = ">seq1 This is a test sequence\nATCG\n>seq2\nGCTA\n";
        let sequences = read_fasta_from(fasta_content.as_bytes()).unwrap();

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].1, Some("This is a test sequence".to_string()));
        assert_eq!(sequences[1].0, "seq2");
        assert_eq!(sequences[1].1, None);
    }

    #[test]
    fn test_read_fasta_sequences_empty_source() {
        let sequences = read_fasta_from(&b""[..]).unwrap();
        assert!(sequences.is_empty());
    }

    #[test]
    fn test_read_fasta_sequences_file_not_found() {
        match read_fasta_sequences("nonexistent_file.fa") {
            Err(SeqoptError::IoError(_)) => {}
            other => panic!("Expected IoError for missing file, got {other:?}"),
        }
    }

    #[test]
    fn test_write_then_read_record() {
        let mut buffer = Vec::new();
        write_fasta_record(&mut buffer, "optimized", Some("gc fixed"), b"ATGCATGC").unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with(">optimized gc fixed\n"));

        let records = read_fasta_from(buffer.as_slice()).unwrap();
        assert_eq!(records[0].2, b"ATGCATGC".to_vec());
    }
}
