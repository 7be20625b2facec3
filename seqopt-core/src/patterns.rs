//! DNA motif matchers.
//!
//! A [`SequencePattern`] compiles an IUPAC/DNA-notation motif (or a
//! homopolymer run) into a byte regex and reports every overlapping
//! occurrence as a [`Location`], on both strands when the motif is not its
//! own reverse complement. Tandem repeats of any k-mer (`"3x2mer"`) need a
//! back-reference, so they are matched by direct comparison instead.
//!
//! ```rust
//! use seqopt_core::location::Location;
//! use seqopt_core::patterns::SequencePattern;
//!
//! let site: SequencePattern = "GAATTC".parse()?;
//! let matches = site.find_matches(b"AAGAATTCAA", &Location::full(10));
//! assert_eq!(matches.len(), 1);
//! assert_eq!((matches[0].start(), matches[0].end()), (2, 8));
//! # Ok::<(), seqopt_core::types::SeqoptError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use bio::bio_types::strand::Strand;
use regex::bytes::Regex;

use crate::location::Location;
use crate::sequence::iupac::{is_iupac_letter, iupac_regex_class, reverse_complement_iupac};
use crate::types::SeqoptError;

/// A fixed-length motif searched in a sequence.
#[derive(Debug, Clone)]
pub struct SequencePattern {
    name: String,
    expression: String,
    size: usize,
    in_both_strands: bool,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex {
        forward: Regex,
        reverse: Option<Regex>,
    },
    /// `repeats` consecutive copies of the same `kmer_size`-mer.
    TandemRepeat { kmer_size: usize, repeats: usize },
}

impl SequencePattern {
    /// Pattern in IUPAC notation, e.g. `"GGTCTC"` or `"ATGNNR"`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidPattern`] for empty patterns or
    /// non-IUPAC letters.
    pub fn dna_notation(notation: &str) -> Result<Self, SeqoptError> {
        let notation = notation.trim().to_ascii_uppercase();
        if notation.is_empty() {
            return Err(SeqoptError::InvalidPattern("empty pattern".to_string()));
        }
        if let Some(bad) = notation.bytes().find(|&letter| !is_iupac_letter(letter)) {
            return Err(SeqoptError::InvalidPattern(format!(
                "{notation}: {:?} is not an IUPAC nucleotide",
                char::from(bad)
            )));
        }

        let reverse_notation = String::from_utf8_lossy(&reverse_complement_iupac(notation.as_bytes()))
            .into_owned();
        let is_palindromic = reverse_notation == notation;
        let forward = compile_iupac(&notation)?;
        let reverse = if is_palindromic {
            None
        } else {
            Some(compile_iupac(&reverse_notation)?)
        };

        Ok(Self {
            name: notation.clone(),
            size: notation.len(),
            expression: notation,
            in_both_strands: true,
            matcher: Matcher::Regex { forward, reverse },
        })
    }

    /// Run of `length` identical nucleotides, written `"<length>x<N>"`.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidPattern`] for a zero length or a
    /// letter other than `A`, `C`, `G`, `T`.
    pub fn homopolymer(nucleotide: u8, length: usize) -> Result<Self, SeqoptError> {
        let nucleotide = nucleotide.to_ascii_uppercase();
        if length == 0 || !matches!(nucleotide, b'A' | b'C' | b'G' | b'T') {
            return Err(SeqoptError::InvalidPattern(format!(
                "{length}x{}",
                char::from(nucleotide)
            )));
        }
        let run = String::from(char::from(nucleotide)).repeat(length);
        let mut pattern = Self::dna_notation(&run)?;
        pattern.name = format!("{length}x{}", char::from(nucleotide));
        Ok(pattern)
    }

    /// `repeats` consecutive copies of any `kmer_size`-mer, written
    /// `"<repeats>x<kmer_size>mer"`, e.g. `"3x2mer"` matches `ATATAT`.
    ///
    /// The reverse complement of a tandem repeat is a tandem repeat over the
    /// same positions, so hits are reported on the forward strand only.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidPattern`] for a zero k-mer size or fewer
    /// than two repeats.
    pub fn repeated_kmer(repeats: usize, kmer_size: usize) -> Result<Self, SeqoptError> {
        if kmer_size == 0 || repeats < 2 {
            return Err(SeqoptError::InvalidPattern(format!(
                "{repeats}x{kmer_size}mer: needs a k-mer of at least 1bp repeated at least twice"
            )));
        }
        let name = format!("{repeats}x{kmer_size}mer");
        Ok(Self {
            expression: name.clone(),
            name,
            size: repeats * kmer_size,
            in_both_strands: true,
            matcher: Matcher::TandemRepeat { kmer_size, repeats },
        })
    }

    /// Restricts the search to the forward strand.
    #[must_use]
    pub fn forward_only(mut self) -> Self {
        self.in_both_strands = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Motif length in bases.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether the reverse strand is searched too.
    #[must_use]
    pub const fn in_both_strands(&self) -> bool {
        self.in_both_strands
    }

    /// All overlapping occurrences inside `location`, sorted.
    ///
    /// Forward-strand hits carry [`Strand::Forward`], hits of the reverse
    /// complement carry [`Strand::Reverse`]. Palindromic motifs are only
    /// reported once.
    #[must_use]
    pub fn find_matches(&self, sequence: &[u8], location: &Location) -> Vec<Location> {
        let region = location.clipped(sequence.len());
        let haystack = &sequence[region.start()..region.end()];

        let (forward, reverse) = match &self.matcher {
            Matcher::Regex { forward, reverse } => (forward, reverse),
            Matcher::TandemRepeat { kmer_size, .. } => {
                return tandem_repeat_starts(haystack, self.size, *kmer_size)
                    .map(|start| self.hit(region.start() + start, Strand::Forward))
                    .collect();
            }
        };

        let mut matches: Vec<Location> = overlapping_starts(forward, haystack)
            .map(|start| self.hit(region.start() + start, Strand::Forward))
            .collect();

        if self.in_both_strands {
            if let Some(reverse) = reverse {
                matches.extend(
                    overlapping_starts(reverse, haystack)
                        .map(|start| self.hit(region.start() + start, Strand::Reverse)),
                );
            }
        }

        matches.sort();
        matches
    }

    const fn hit(&self, start: usize, strand: Strand) -> Location {
        Location::spanning(start, self.size, strand)
    }
}

fn compile_iupac(notation: &str) -> Result<Regex, SeqoptError> {
    let expression: String = notation
        .bytes()
        .filter_map(iupac_regex_class)
        .collect();
    Regex::new(&expression).map_err(|e| SeqoptError::InvalidPattern(e.to_string()))
}

/// Start offsets of every (possibly overlapping) match.
fn overlapping_starts<'a>(regex: &'a Regex, haystack: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    let mut position = 0;
    std::iter::from_fn(move || {
        if position > haystack.len() {
            return None;
        }
        let found = regex.find_at(haystack, position)?;
        position = found.start() + 1;
        Some(found.start())
    })
}

/// Starts of every window of `span` bases that repeats with period `period`.
fn tandem_repeat_starts(haystack: &[u8], span: usize, period: usize) -> impl Iterator<Item = usize> + '_ {
    haystack
        .windows(span)
        .enumerate()
        .filter(move |(_, window)| {
            window.iter().all(|&base| matches!(base, b'A' | b'C' | b'G' | b'T'))
                && window[period..].iter().zip(window.iter()).all(|(a, b)| a == b)
        })
        .map(|(start, _)| start)
}

impl FromStr for SequencePattern {
    type Err = SeqoptError;

    /// `"6xA"` parses as a homopolymer, `"3x2mer"` as a repeated k-mer,
    /// anything else as DNA notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Some((count, kmer)) = text.to_ascii_lowercase().split_once('x') {
            if let (Ok(repeats), Some(Ok(kmer_size))) = (
                count.parse::<usize>(),
                kmer.strip_suffix("mer").map(str::parse::<usize>),
            ) {
                return Self::repeated_kmer(repeats, kmer_size);
            }
        }
        if let Some((count, letter)) = text.split_once(['x', 'X']) {
            if let (Ok(length), [nucleotide]) = (count.parse::<usize>(), letter.as_bytes()) {
                return Self::homopolymer(*nucleotide, length);
            }
        }
        Self::dna_notation(text)
    }
}

impl fmt::Display for SequencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for SequencePattern {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.in_both_strands == other.in_both_strands
    }
}
