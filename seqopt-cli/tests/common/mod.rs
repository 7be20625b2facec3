#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use seqopt_core::sequence::read_fasta_from;
use tempfile::TempDir;

/// Two records: one carrying two EcoRI sites, one already clean.
pub const TWO_RECORDS: &str = "\
>with_sites construct A
TTTTTTTTTTGAATTCTTTTTTTTTTTTTTGAATTCTTTTTTTTTT
>clean
ATGCATGCATGCATGCATGC
";

/// Writes `content` to `name` inside `dir` and returns the path as a string.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// The seqopt binary with logging silenced.
pub fn seqopt() -> Command {
    let mut cmd = Command::cargo_bin("seqopt").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

/// Records of a FASTA file as `(id, description, sequence)`.
pub fn read_records<P: AsRef<Path>>(path: P) -> Vec<(String, Option<String>, String)> {
    parse_records(fs::read(path).unwrap().as_slice())
}

/// Records of FASTA text, parsed with the library reader.
pub fn parse_records(text: &[u8]) -> Vec<(String, Option<String>, String)> {
    read_fasta_from(text)
        .unwrap()
        .into_iter()
        .map(|(id, description, sequence)| (id, description, String::from_utf8(sequence).unwrap()))
        .collect()
}
