// =============================================================================
// VERSION
// =============================================================================

/// Version string for seqopt
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// ALPHABET AND SCORING
// =============================================================================

/// Nucleotide alphabet, in mask bit order
pub const NUCLEOTIDES: [u8; 4] = *b"ACGT";

/// Default weight of a specification when aggregating scores
pub const DEFAULT_BOOST: f64 = 1.0;

/// Score at or above which a built-in specification passes
pub const DEFAULT_BEST_POSSIBLE_SCORE: f64 = 0.0;

// =============================================================================
// RULE DEFAULTS
// =============================================================================

/// Length of the stem of a hairpin
pub const DEFAULT_HAIRPIN_STEM_SIZE: usize = 20;

/// Span within which a stem and its reverse complement form a hairpin
pub const DEFAULT_HAIRPIN_WINDOW: usize = 200;

/// Bases at each end checked by the terminal GC content rule
pub const DEFAULT_TERMINAL_GC_WINDOW: usize = 30;

// =============================================================================
// SEARCH DEFAULTS
// =============================================================================

/// Random mutation attempts per breach location before giving up
pub const DEFAULT_MAX_RANDOM_ITERS: usize = 1000;

/// Point mutations proposed per search iteration
pub const DEFAULT_MUTATIONS_PER_ITERATION: usize = 2;

/// Objective optimization attempts per location
pub const DEFAULT_OPTIMIZATION_ITERS: usize = 1000;

/// Seed used when none is configured, keeps runs reproducible
pub const DEFAULT_RANDOM_SEED: u64 = 123;

/// Header used when a sequence is optimized without a name
pub const DEFAULT_SEQUENCE_HEADER: &str = "seqopt_sequence_1";
