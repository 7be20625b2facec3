//! Half-open intervals over a sequence.
//!
//! [`Location`] is the coordinate primitive shared by every specification,
//! evaluation and mutation: a zero-based `[start, end)` range with an
//! optional strand.
//!
//! ```rust
//! use seqopt_core::location::Location;
//!
//! let window = Location::new(10, 20)?;
//! let query = Location::new(15, 40)?;
//! assert_eq!(window.overlap_region(&query), Some(Location::new(15, 20)?));
//! assert_eq!(window.extended(12), Location::new(0, 32)?);
//! # Ok::<(), seqopt_core::types::SeqoptError>(())
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bio::bio_types::strand::Strand;

use crate::sequence::reverse_complement;
use crate::types::SeqoptError;

/// Zero-based half-open interval `[start, end)` with strand orientation.
///
/// Ordering is lexicographic on `(start, end)`; strand only breaks ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    start: usize,
    end: usize,
    strand: Strand,
}

impl Location {
    /// Creates an unstranded location.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidLocation`] when `end < start`.
    pub fn new(start: usize, end: usize) -> Result<Self, SeqoptError> {
        Self::with_strand(start, end, Strand::Unknown)
    }

    /// Creates a location on the given strand.
    ///
    /// # Errors
    ///
    /// Returns [`SeqoptError::InvalidLocation`] when `end < start`.
    pub fn with_strand(start: usize, end: usize, strand: Strand) -> Result<Self, SeqoptError> {
        if end < start {
            return Err(SeqoptError::InvalidLocation { start, end });
        }
        Ok(Self { start, end, strand })
    }

    /// Location spanning a whole sequence of `length` bases.
    #[must_use]
    pub const fn full(length: usize) -> Self {
        Self {
            start: 0,
            end: length,
            strand: Strand::Unknown,
        }
    }

    /// Location of `length` bases starting at `start`.
    #[must_use]
    pub const fn spanning(start: usize, length: usize, strand: Strand) -> Self {
        Self {
            start,
            end: start + length,
            strand,
        }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[inline]
    #[must_use]
    pub const fn strand(&self) -> Strand {
        self.strand
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Whether `position` falls inside `[start, end)`.
    #[must_use]
    pub const fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }

    /// Whether the two intervals share at least one position.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlap_region(other).is_some()
    }

    /// Returns `sequence[start..end]`, reverse-complemented on the reverse strand.
    ///
    /// The range is clipped to the sequence length.
    #[must_use]
    pub fn extract_sequence(&self, sequence: &[u8]) -> Vec<u8> {
        let end = self.end.min(sequence.len());
        let start = self.start.min(end);
        let slice = &sequence[start..end];
        match self.strand {
            Strand::Reverse => reverse_complement(slice),
            _ => slice.to_vec(),
        }
    }

    /// Intersection of the two intervals, `None` when it has zero length.
    ///
    /// The result keeps `self`'s strand.
    #[must_use]
    pub fn overlap_region(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self {
            start,
            end,
            strand: self.strand,
        })
    }

    /// Grows the interval by `margin` on both sides.
    ///
    /// The start saturates at zero; the end is not clipped, see [`Location::clipped`].
    #[must_use]
    pub const fn extended(&self, margin: usize) -> Self {
        Self {
            start: self.start.saturating_sub(margin),
            end: self.end + margin,
            strand: self.strand,
        }
    }

    /// Clips both bounds to `upper` (typically the sequence length).
    #[must_use]
    pub fn clipped(&self, upper: usize) -> Self {
        let end = self.end.min(upper);
        Self {
            start: self.start.min(end),
            end,
            strand: self.strand,
        }
    }

    /// Same interval on another strand.
    #[must_use]
    pub const fn on_strand(&self, strand: Strand) -> Self {
        Self {
            start: self.start,
            end: self.end,
            strand,
        }
    }

    /// Iterator over the positions covered.
    pub fn positions(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

const fn strand_rank(strand: Strand) -> u8 {
    match strand {
        Strand::Forward => 0,
        Strand::Reverse => 1,
        Strand::Unknown => 2,
    }
}

impl Eq for Location {}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start, self.end, strand_rank(self.strand)).cmp(&(
            other.start,
            other.end,
            strand_rank(other.strand),
        ))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strand {
            Strand::Forward => write!(f, "{}-{}(+)", self.start, self.end),
            Strand::Reverse => write!(f, "{}-{}(-)", self.start, self.end),
            Strand::Unknown => write!(f, "{}-{}", self.start, self.end),
        }
    }
}

impl FromStr for Location {
    type Err = SeqoptError;

    /// Parses `start-end`, optionally followed by `(+)` or `(-)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (range, strand) = if let Some(range) = text.strip_suffix("(+)") {
            (range, Strand::Forward)
        } else if let Some(range) = text.strip_suffix("(-)") {
            (range, Strand::Reverse)
        } else {
            (text, Strand::Unknown)
        };

        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| SeqoptError::ParseError(format!("Missing '-' in location {s:?}")))?;
        let start = start
            .trim()
            .parse()
            .map_err(|e| SeqoptError::ParseError(format!("Bad start in {s:?}: {e}")))?;
        let end = end
            .trim()
            .parse()
            .map_err(|e| SeqoptError::ParseError(format!("Bad end in {s:?}: {e}")))?;

        Self::with_strand(start, end, strand)
    }
}

/// Converts `+1`, `-1` and `0`/absent into a strand.
#[must_use]
pub const fn strand_from_sign(sign: Option<i8>) -> Strand {
    match sign {
        Some(s) if s > 0 => Strand::Forward,
        Some(s) if s < 0 => Strand::Reverse,
        _ => Strand::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(start: usize, end: usize) -> Location {
        Location::new(start, end).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let result = Location::new(10, 5);
        assert!(matches!(
            result,
            Err(SeqoptError::InvalidLocation { start: 10, end: 5 })
        ));
        assert!(Location::new(5, 5).unwrap().is_empty());
    }

    #[test]
    fn test_extract_sequence_forward_and_reverse() {
        let sequence = b"AAACCCGGGTTT";
        assert_eq!(loc(3, 9).extract_sequence(sequence), b"CCCGGG".to_vec());

        let reverse = Location::with_strand(0, 4, Strand::Reverse).unwrap();
        assert_eq!(reverse.extract_sequence(sequence), b"GTTT".to_vec());
    }

    #[test]
    fn test_extract_sequence_clips_to_sequence() {
        assert_eq!(loc(8, 50).extract_sequence(b"ATGCATGCAT"), b"AT".to_vec());
        assert!(loc(20, 30).extract_sequence(b"ATGC").is_empty());
    }

    #[test]
    fn test_overlap_region() {
        assert_eq!(loc(0, 10).overlap_region(&loc(5, 20)), Some(loc(5, 10)));
        assert_eq!(loc(5, 20).overlap_region(&loc(0, 10)), Some(loc(5, 10)));
        assert_eq!(loc(0, 10).overlap_region(&loc(2, 3)), Some(loc(2, 3)));
        // Touching half-open intervals share no position
        assert_eq!(loc(0, 10).overlap_region(&loc(10, 20)), None);
        assert_eq!(loc(0, 10).overlap_region(&loc(30, 40)), None);
    }

    #[test]
    fn test_extended_saturates_at_zero_only() {
        assert_eq!(loc(3, 10).extended(5), loc(0, 15));
        assert_eq!(loc(10, 12).extended(0), loc(10, 12));
        assert_eq!(loc(10, 12).extended(4).clipped(14), loc(6, 14));
    }

    #[test]
    fn test_ordering_is_start_then_end() {
        let mut locations = vec![loc(5, 9), loc(0, 20), loc(5, 7), loc(1, 2)];
        locations.sort();
        assert_eq!(locations, vec![loc(0, 20), loc(1, 2), loc(5, 7), loc(5, 9)]);
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        assert_eq!(loc(4, 12).to_string(), "4-12");
        let forward = Location::with_strand(4, 12, Strand::Forward).unwrap();
        assert_eq!(forward.to_string(), "4-12(+)");

        assert_eq!("4-12".parse::<Location>().unwrap(), loc(4, 12));
        assert_eq!("4-12(+)".parse::<Location>().unwrap(), forward);
        assert_eq!(
            "7-9(-)".parse::<Location>().unwrap().strand(),
            Strand::Reverse
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "12".parse::<Location>(),
            Err(SeqoptError::ParseError(_))
        ));
        assert!(matches!(
            "a-b".parse::<Location>(),
            Err(SeqoptError::ParseError(_))
        ));
        assert!(matches!(
            "12-4".parse::<Location>(),
            Err(SeqoptError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_strand_from_sign() {
        assert_eq!(strand_from_sign(Some(1)), Strand::Forward);
        assert_eq!(strand_from_sign(Some(-1)), Strand::Reverse);
        assert_eq!(strand_from_sign(None), Strand::Unknown);
        assert_eq!(strand_from_sign(Some(0)), Strand::Unknown);
    }
}
